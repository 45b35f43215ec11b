//! Conversion of SDK errors into core errors

use aws_smithy_types::error::display::DisplayErrorContext;
use kmsctl_core::Error;

/// Error codes meaning the addressed resource does not exist
const NOT_FOUND_CODES: &[&str] = &["NoSuchBucket", "NoSuchKey", "NotFound", "NotFoundException"];

/// Render an SDK error with its full source chain
pub(crate) fn describe<E: std::error::Error>(err: &E) -> String {
    DisplayErrorContext(err).to_string()
}

/// Whether a rendered SDK error reports a missing resource
pub(crate) fn is_not_found(message: &str) -> bool {
    NOT_FOUND_CODES.iter().any(|code| message.contains(code))
}

/// Map an SDK error, turning not-found responses into `not_found`
pub(crate) fn classify<E: std::error::Error>(err: &E, not_found: impl FnOnce() -> Error) -> Error {
    let message = describe(err);
    if is_not_found(&message) {
        not_found()
    } else if message.contains("AlreadyExists") || message.contains("BucketAlreadyOwnedByYou") {
        Error::AlreadyExists(message)
    } else {
        Error::Provider(message)
    }
}
