use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for disc operations
pub type Result<T> = std::result::Result<T, DiscError>;

/// Errors that can occur when loading, creating or ejecting disc images
#[derive(Debug, Error)]
pub enum DiscError {
    /// I/O error occurred while reading or writing an image file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Filename has no extension and could not be probed
    #[error("No extension on {}", .0.display())]
    MissingExtension(PathBuf),

    /// Extension is not in the format registry and the file size matches
    /// no known raw image geometry
    #[error("Unrecognised image {} ({size} bytes)", .path.display())]
    UnrecognisedImage {
        /// Path of the image that failed to resolve
        path: PathBuf,
        /// Probed file size in bytes
        size: u64,
    },

    /// Extension is not in the format registry (strict resolution, used by
    /// image creation where no size fallback applies)
    #[error("Unknown format extension: {0}")]
    UnknownExtension(String),

    /// Blank-image creation was requested for a format without a canonical
    /// size (self-describing containers cannot be synthesised)
    #[error("Cannot create blank image: {0} has no fixed size")]
    VariableSize(&'static str),

    /// Image file does not carry the signature its format requires
    #[error("Bad signature in {}", .0.display())]
    BadSignature(PathBuf),

    /// Drive index outside the two-slot range
    #[error("Invalid drive {0} (only drives 0 and 1 exist)")]
    InvalidDrive(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DiscError::UnrecognisedImage {
            path: PathBuf::from("disc.img"),
            size: 12345,
        };
        assert_eq!(err.to_string(), "Unrecognised image disc.img (12345 bytes)");
    }

    #[test]
    fn test_invalid_drive_display() {
        let err = DiscError::InvalidDrive(3);
        assert_eq!(
            err.to_string(),
            "Invalid drive 3 (only drives 0 and 1 exist)"
        );
    }
}
