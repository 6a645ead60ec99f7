use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use bytes::Bytes;
use log::debug;
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// The credential is loaded lazily and reloaded only when the cached one is
/// no longer valid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Sign request with the exact body that will be sent.
    pub async fn sign(&self, req: &mut http::request::Parts, body: &Bytes) -> Result<()> {
        let credential = self.credential.lock().expect("lock poisoned").clone();
        let credential = if credential.is_valid() {
            credential
        } else {
            debug!("no valid credential cached, loading from provider");
            let loaded = self.loader.provide_credential(&self.ctx).await?;
            *self.credential.lock().expect("lock poisoned") = loaded.clone();
            loaded
        };

        let credential = match credential {
            Some(cred) if cred.is_valid() => cred,
            _ => {
                return Err(Error::credential_invalid(
                    "no valid credential available for signing",
                ))
            }
        };

        self.builder
            .sign_request(&self.ctx, req, body, Some(&credential))
            .await
    }
}
