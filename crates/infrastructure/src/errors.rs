use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// データアクセス層のエラー
///
/// すべてバックエンド起因で、呼び出し側へそのまま伝播する（リトライはしない）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(&'static str),

    #[error("Todo not found: user_id={user_id}, todo_id={todo_id}")]
    NotFound { user_id: String, todo_id: String },

    #[error("Backend throttled: {0}")]
    Throttled(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Malformed item: {0}")]
    Malformed(String),
}

impl StoreError {
    /// 呼び出し側がリトライを判断するための分類
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Throttled(_) | StoreError::Unavailable(_))
    }
}

const THROTTLING_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ThrottlingException",
];

/// AWS SDK のエラーを StoreError に変換
pub(crate) fn from_sdk_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();

    if matches!(err, SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)) {
        return StoreError::Unavailable(message);
    }

    match err.code() {
        Some(code) if THROTTLING_CODES.contains(&code) => StoreError::Throttled(message),
        _ => StoreError::Backend(message),
    }
}

impl From<serde_dynamo::Error> for StoreError {
    fn from(e: serde_dynamo::Error) -> Self {
        StoreError::Malformed(e.to_string())
    }
}
