use ledger_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("account `{0}` not found")]
    AccountNotFound(String),

    #[error("account `{0}` already exists")]
    AccountAlreadyExists(String),

    #[error("insufficient fund on account `{0}`")]
    InsufficientFund(String),

    #[error("read model document `{0}` not found")]
    DocumentNotFound(String),

    #[error("read model document `{0}` already exists")]
    DocumentAlreadyExists(String),

    #[error("store `{0}`")]
    Store(#[from] StoreError),

    #[error("serde_json `{0}`")]
    SerdeJson(#[from] serde_json::Error),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

impl Error {
    /// Domain validation failures reproduce on resubmission of the identical
    /// input; retrying them is pointless.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_)
                | Self::AccountAlreadyExists(_)
                | Self::InsufficientFund(_)
                | Self::DocumentNotFound(_)
                | Self::DocumentAlreadyExists(_)
        )
    }

    pub fn is_transient(&self) -> bool {
        !self.is_domain()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
