//! Credential port.
//!
//! Tokens are produced by an external refresher process; the orchestrator
//! only reads whatever it has deposited.

use async_trait::async_trait;

use super::broker::Credential;
use crate::error::Result;

/// Source of the broker authentication token.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Fetch the current token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Credential`] when no usable token is
    /// available.
    async fn credential(&self) -> Result<Credential>;
}
