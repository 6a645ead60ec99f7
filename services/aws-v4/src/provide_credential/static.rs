use crate::Credential;
use async_trait::async_trait;
use pasign_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider provides a fixed access key pair.
///
/// This provider is used when the access key and secret key are known up
/// front, for example read from configuration.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider with access key ID and secret access key.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            credential: Credential::new(access_key_id, secret_access_key),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
