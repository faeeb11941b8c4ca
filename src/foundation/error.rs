/// Convenience result type used across ctaforge.
pub type CtaResult<T> = Result<T, CtaError>;

/// Top-level error taxonomy used by renderer, encoder and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum CtaError {
    /// Invalid configuration, asset, or argument data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The scene evaluator failed while producing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// A frame sink rejected a frame or reported an asynchronous fault.
    #[error("encode error: {0}")]
    Encode(String),

    /// The external encoder executable could not be found or launched.
    #[error("encoder binary '{0}' not found (is it installed and on PATH?)")]
    MissingEncoderBinary(String),

    /// The external encoder stopped reading its input before the export finished.
    #[error("encoder closed unexpectedly: {0}")]
    EncoderClosedUnexpectedly(String),

    /// The export was cancelled through its cancellation token.
    #[error("export cancelled after {frames_rendered} frames")]
    Cancelled {
        /// Frames fully rendered before the cancellation was observed.
        frames_rendered: u64,
    },

    /// Errors when serializing or deserializing configuration data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CtaError {
    /// Build a [`CtaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CtaError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CtaError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CtaError::EncoderClosedUnexpectedly`] value.
    pub fn encoder_closed(msg: impl Into<String>) -> Self {
        Self::EncoderClosedUnexpectedly(msg.into())
    }

    /// Build a [`CtaError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
