//! Error types shared by every scoreplay crate.

use thiserror::Error;

/// Top-level error type for spec-level operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A MIDI bank label outside the fixed enumeration.
    #[error("unknown MIDI bank '{label}'")]
    UnknownMidiBank { label: String },

    /// A file was loaded but does not carry a MIDI header.
    #[error("'{name}' is not a Standard MIDI File")]
    NotMidi { name: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Common trait for backend errors.
///
/// Every backend error type implements this trait so callers can report
/// failures with a stable code without depending on the backend crate's
/// concrete error enum.
///
/// # Example
///
/// ```ignore
/// use scoreplay_spec::error::BackendError;
///
/// fn handle_error<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "RENDER_004". These codes are stable and
    /// can be used for programmatic error handling.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category for grouping related errors.
    fn category(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("synthetic failure")]
    struct Synthetic;

    impl BackendError for Synthetic {
        fn code(&self) -> &'static str {
            "TEST_001"
        }

        fn category(&self) -> &'static str {
            "test"
        }
    }

    #[test]
    fn test_default_message_is_display() {
        let err = Synthetic;
        assert_eq!(err.message(), "synthetic failure");
        assert_eq!(err.code(), "TEST_001");
    }

    #[test]
    fn test_spec_error_display() {
        let err = SpecError::UnknownMidiBank {
            label: "invalid-bank".to_string(),
        };
        assert!(err.to_string().contains("invalid-bank"));
    }
}
