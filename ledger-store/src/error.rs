#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unexpected original version while saving event")]
    UnexpectedOriginalVersion,

    #[error("unexpected empty events when trying to write single event")]
    EmptyWriteEvent,

    #[error("unknown aggregate type code `{0}`")]
    UnknownAggregateType(i32),

    #[error("serde_json `{0}`")]
    SerdeJson(#[from] serde_json::Error),

    #[error("std::num `{0}`")]
    TryFromInt(#[from] std::num::TryFromIntError),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
