//! Domain-specific errors.

use thiserror::Error;

use crate::domain::model::{MAX_CAPACITY, MAX_ITEMS};

/// Failure raised while turning a package line into a validated [`Package`].
///
/// [`Package`]: crate::domain::model::Package
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageError {
    #[error("invalid capacity '{0}': expected a number between 0 and {max}", max = MAX_CAPACITY)]
    InvalidCapacity(String),
    #[error("package holds {0} items but at most {max} are allowed", max = MAX_ITEMS)]
    TooManyItems(usize),
    #[error("malformed item '{text}': {reason}")]
    MalformedItem { text: String, reason: String },
    #[error("item index {0} is not positive or appears more than once")]
    DuplicateOrInvalidIndex(i64),
}

impl PackageError {
    pub(crate) fn malformed(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedItem {
            text: text.into(),
            reason: reason.into(),
        }
    }
}
