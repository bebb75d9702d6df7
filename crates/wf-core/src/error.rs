/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing core values from untrusted text.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A copy key was not a hyphenated UUID.
    #[error("invalid copy key: \"{0}\"")]
    InvalidCopyKey(String),

    /// A language code was empty or contained unsupported characters.
    #[error("invalid language code: \"{0}\"")]
    InvalidLanguageCode(String),
}
