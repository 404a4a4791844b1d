/// Convenience result type used across the composer.
pub type OgResult<T> = Result<T, OgError>;

/// Top-level error taxonomy used by composer APIs.
///
/// `Surface`, `Assemble` and `Output` are fatal for a run. `Asset` describes a single input that
/// could not be loaded; the composer consumes it and skips the draw.
#[derive(thiserror::Error, Debug)]
pub enum OgError {
    /// The drawing surface could not be allocated.
    #[error("surface error: {0}")]
    Surface(String),

    /// The finished pixels could not be assembled into an image.
    #[error("image assembly error: {0}")]
    Assemble(String),

    /// The output destination could not be created or written.
    #[error("output error: {0}")]
    Output(String),

    /// An input asset could not be read or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Invalid geometry, text or color parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OgError {
    /// Build an [`OgError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build an [`OgError::Assemble`] value.
    pub fn assemble(msg: impl Into<String>) -> Self {
        Self::Assemble(msg.into())
    }

    /// Build an [`OgError::Output`] value.
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    /// Build an [`OgError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build an [`OgError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Return `true` for errors that must abort a run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Asset(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
