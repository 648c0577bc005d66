use crate::error::TransferError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection settings for the LiveKit control plane.
///
/// Supplied once at startup; an incomplete set of credentials is a fatal
/// configuration error, never a transfer-time error.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    pub url: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
}

impl fmt::Debug for ControlPlaneConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlPlaneConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl ControlPlaneConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Rejects incomplete credentials eagerly so a process never accepts
    /// calls it cannot transfer.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.url.is_empty() {
            return Err(TransferError::Config("url is not set".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(TransferError::Config("api_key is not set".to_string()));
        }
        if self.api_secret.is_empty() {
            return Err(TransferError::Config("api_secret is not set".to_string()));
        }
        Ok(())
    }
}
