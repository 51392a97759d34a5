use thiserror::Error;

/// Reasons a palette could not be computed.
///
/// [`crate::quantize`] folds all of these into `None`; use [`crate::Quantizer::quantize`] to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantizeError {
    #[error("cannot quantize an empty pixel sequence")]
    EmptyInput,

    #[error("color count must be between {min} and {max}, got {count}")]
    InvalidColorCount { count: usize, min: usize, max: usize },

    #[error("histogram has no populated colors")]
    EmptyHistogram,
}
