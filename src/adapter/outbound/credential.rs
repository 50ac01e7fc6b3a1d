//! Broker token sources.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::application::{Attempt, RetryPolicy};
use crate::error::{Error, Result};
use crate::port::{Credential, CredentialSource};

/// Environment variable consulted before the token file.
pub const TOKEN_ENV_VAR: &str = "STAKELADDER_BROKER_TOKEN";

/// Reads the token from an environment variable, falling back to the file
/// written by the external refresher. The file is polled while it is
/// missing or empty, up to the retry bound.
pub struct TokenStore {
    env_var: String,
    file: Option<PathBuf>,
    retry: RetryPolicy,
}

impl TokenStore {
    #[must_use]
    pub fn new(file: Option<PathBuf>) -> Self {
        Self {
            env_var: TOKEN_ENV_VAR.to_string(),
            file,
            retry: RetryPolicy::fixed(Duration::from_secs(1), 5),
        }
    }

    #[must_use]
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = name.into();
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether any source is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.file.is_some() || std::env::var(&self.env_var).is_ok_and(|t| !t.trim().is_empty())
    }
}

#[async_trait]
impl CredentialSource for TokenStore {
    async fn credential(&self) -> Result<Credential> {
        if let Ok(token) = std::env::var(&self.env_var) {
            let token = token.trim();
            if !token.is_empty() {
                debug!(source = %self.env_var, "Using broker token from environment");
                return Ok(Credential::new(token));
            }
        }

        let Some(path) = self.file.as_deref() else {
            return Err(Error::Credential(format!(
                "{} is not set and no token_file is configured",
                self.env_var
            )));
        };

        self.retry
            .run(|_| async move {
                match tokio::fs::read_to_string(path).await {
                    Ok(contents) if !contents.trim().is_empty() => {
                        Attempt::Done(Credential::new(contents.trim()))
                    }
                    Ok(_) => Attempt::Retry("token file is empty".to_string()),
                    Err(e) => Attempt::Retry(e.to_string()),
                }
            })
            .await
            .map_err(|e| Error::Credential(format!("{}: {e}", path.display())))
    }
}

/// A fixed token, for the paper broker and tests.
pub struct StaticCredential(Credential);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Credential::new(token))
    }
}

#[async_trait]
impl CredentialSource for StaticCredential {
    async fn credential(&self) -> Result<Credential> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn quick() -> RetryPolicy {
        RetryPolicy::fixed(Duration::from_millis(10), 3)
    }

    #[tokio::test]
    async fn environment_wins_over_file() {
        std::env::set_var("STAKELADDER_TEST_TOKEN_ENV", " from-env \n");
        let store = TokenStore::new(Some(PathBuf::from("/nonexistent")))
            .with_env_var("STAKELADDER_TEST_TOKEN_ENV");
        assert_eq!(store.credential().await.unwrap().token(), "from-env");
    }

    #[tokio::test]
    async fn reads_trimmed_token_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  file-token  ").unwrap();
        let store = TokenStore::new(Some(file.path().to_path_buf()))
            .with_env_var("STAKELADDER_TEST_TOKEN_UNSET_A")
            .with_retry(quick());
        assert_eq!(store.credential().await.unwrap().token(), "file-token");
    }

    #[tokio::test]
    async fn empty_file_exhausts_retries() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store = TokenStore::new(Some(file.path().to_path_buf()))
            .with_env_var("STAKELADDER_TEST_TOKEN_UNSET_B")
            .with_retry(quick());
        let err = store.credential().await.unwrap_err();
        assert!(matches!(err, Error::Credential(msg) if msg.contains("empty")));
    }

    #[tokio::test]
    async fn no_source_is_an_error() {
        let store = TokenStore::new(None).with_env_var("STAKELADDER_TEST_TOKEN_UNSET_C");
        assert!(!store.is_configured());
        assert!(matches!(
            store.credential().await,
            Err(Error::Credential(_))
        ));
    }
}
