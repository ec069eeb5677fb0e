//! Error types shared by the serialization paths.

use thiserror::Error;

/// Error generated when encoding to JSON.
///
/// The only way a [`MashStep`](crate::MashStep) fails to encode is holding
/// a non-finite float, which JSON cannot represent. When any element of a
/// [`MashSteps`](crate::MashSteps) fails, the whole encode fails and no
/// output is returned.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize mash step: {0}")]
    Json(#[from] serde_json::Error),
}
