// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Tokio-based sleeping for pasign.
//!
//! `TokioSleep` suspends the current task with [`tokio::time::sleep`]
//! between throttled attempts. Dropping the `execute` future while it
//! sleeps abandons the remaining attempts.
//!
//! ## Example
//!
//! ```no_run
//! use pasign_core::Context;
//! use pasign_sleep_tokio::TokioSleep;
//!
//! let ctx = Context::new().with_sleep(TokioSleep);
//! ```

use async_trait::async_trait;
use pasign_core::{Result, Sleep};
use std::time::Duration;

/// Tokio-based implementation of the `Sleep` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, dur: Duration) -> Result<()> {
        tokio::time::sleep(dur).await;
        Ok(())
    }
}
