pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A traffic share outside (0, 1].
    #[error("invalid traffic share '{value}': {reason}")]
    InvalidShare { value: String, reason: &'static str },
}

impl Error {
    pub(crate) fn invalid_share(value: impl Into<String>, reason: &'static str) -> Self {
        Error::InvalidShare {
            value: value.into(),
            reason,
        }
    }
}
