// Error types shared by the capture pipeline and its platform adapters.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::geometry::{Rect, WindowHandle};

/// A shortcut for `Result<T, capture_window::Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by a single capture-and-crop invocation.
///
/// Every variant is terminal for the call that produced it; nothing is retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Window {window} cannot be captured:\n{source}")]
    UnsupportedWindow {
        window: WindowHandle,
        #[source]
        source: NativeError,
    },

    #[error("Failed to query geometry of window {window}:\n{source}")]
    GeometryUnavailable {
        window: WindowHandle,
        #[source]
        source: NativeError,
    },

    #[error("No frame arrived for window {window} within {}ms", timeout.as_millis())]
    CaptureTimedOut {
        window: WindowHandle,
        timeout: Duration,
    },

    #[error("Failed to encode PNG:\n{0}")]
    EncodeFailed(#[source] image::ImageError),

    #[error("Failed to decode image '{}':\n{source}", path.display())]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Crop rect {rect} does not fit inside a {width}x{height} image")]
    InvalidCropRect { rect: Rect, width: u32, height: u32 },

    #[error(
        "Captured image is {}x{} but the window bounds are {}x{}",
        actual.0, actual.1, expected.0, expected.1
    )]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Unsupported texture format {0}, expected B8G8R8A8_UNORM")]
    UnsupportedFormat(i32),

    #[error("Graphics device operation failed:\n{0}")]
    Device(#[source] NativeError),

    #[error("I/O error on '{}':\n{source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A failed native call, labelled with the call that triggered it.
#[derive(Debug, Clone, Error)]
#[error("{call} failed (0x{code:08X}): {message}")]
pub struct NativeError {
    /// Name of the native function or method that failed.
    pub call: &'static str,
    /// Platform error code (`HRESULT` on Windows).
    pub code: i32,
    /// System-provided description of the failure.
    pub message: String,
}

impl NativeError {
    pub fn new(call: &'static str, code: i32, message: impl Into<String>) -> Self {
        Self {
            call,
            code,
            message: message.into(),
        }
    }

    /// Label a `windows` crate error with the call that produced it.
    #[cfg(windows)]
    pub fn windows(source: windows::core::Error, call: &'static str) -> Self {
        Self {
            call,
            code: source.code().0,
            message: source.message(),
        }
    }
}
