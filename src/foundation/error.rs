/// Convenience result type used across the crate.
pub type BlitResult<T> = Result<T, BlitError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is a precondition violation: nothing in this crate performs
/// IO or talks to external resources, so there is no transient-failure class
/// and no internal retry. A failed draw leaves the destination buffer in
/// whatever partial state the aborted operation produced; callers that need
/// atomicity draw into a scratch buffer first and swap.
#[derive(thiserror::Error, Debug)]
pub enum BlitError {
    /// A requested rectangle falls outside the addressable region of its
    /// buffer.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// An unrecognized or unsupported pixel format descriptor was supplied.
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// A buffer does not meet a documented precondition of a fast-path call.
    #[error("incompatible buffer: {0}")]
    IncompatibleBuffer(String),

    /// Invalid caller-supplied parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BlitError {
    /// Build a [`BlitError::OutOfBounds`] value.
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    /// Build a [`BlitError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`BlitError::IncompatibleBuffer`] value.
    pub fn incompatible_buffer(msg: impl Into<String>) -> Self {
        Self::IncompatibleBuffer(msg.into())
    }

    /// Build a [`BlitError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_prefix() {
        let e = BlitError::out_of_bounds("rect 4x4 at (-1, 0)");
        assert_eq!(e.to_string(), "out of bounds: rect 4x4 at (-1, 0)");

        let e = BlitError::validation("stride must be >= width");
        assert_eq!(e.to_string(), "validation error: stride must be >= width");
    }

    #[test]
    fn anyhow_errors_pass_through() {
        let e: BlitError = anyhow::anyhow!("boom").into();
        assert_eq!(e.to_string(), "boom");
    }
}
