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

use crate::constants::AWS4_REQUEST;
use pasign_core::time::{format_date, DateTime};
use pasign_core::utils::Redact;
use pasign_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credential that holds the access_key and secret_key.
#[derive(Default, Clone)]
pub struct Credential {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}

/// Scope that a signing key is derived for.
///
/// `date` must be the UTC date of the timestamp carried in `x-amz-date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// UTC date as `YYYYMMDD`.
    pub date: String,
    /// Region name, for example `us-east-1`.
    pub region: String,
    /// Service name, for example `ProductAdvertisingAPI`.
    pub service: String,
}

impl Scope {
    /// Build the scope for a signing operation at `now`.
    pub fn new(now: DateTime, region: &str, service: &str) -> Self {
        Self {
            date: format_date(now),
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Credential scope: `20220313/<region>/<service>/aws4_request`
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.date, self.region, self.service, AWS4_REQUEST
        )
    }
}
