/// Failures raised by stores, registries and subscriber installation.
///
/// Errors carried inside captured records are data, not variants of this type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No store was ever created for the category, i.e. nothing was logged under it.
    #[error("no captured log store exists for category {category}")]
    NotFound { category: String },

    #[error("log index {index} is out of range for a store holding {count} records")]
    OutOfRange { index: usize, count: usize },

    #[error("unknown severity: {0:?}")]
    InvalidSeverity(String),

    #[error("failed to install capturing subscriber: {0}")]
    SubscriberInstall(String),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
