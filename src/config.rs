use std::time::Duration;

/// How long to wait for the compositor to deliver the first frame.
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// What to do when the captured image and the window bounds disagree in size.
///
/// - `Strict`: fail the call with [`Error::SizeMismatch`](crate::Error::SizeMismatch).
/// - `Warn`: log a warning and crop anyway (the result may be geometrically wrong).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeCheck {
    #[default]
    Strict,
    Warn,
}

impl SizeCheck {
    /// Parse from a mode string ("strict", "warn").
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode {
            "strict" => Some(Self::Strict),
            "warn" => Some(Self::Warn),
            _ => None,
        }
    }
}

/// PNG compression preset. All presets are lossless.
///
/// - `Fast`: fast deflate with the Sub filter, good for large captures.
/// - `Default`: the encoder's balanced setting.
/// - `Best`: smallest files, slowest encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PngCompression {
    #[default]
    Fast,
    Default,
    Best,
}

impl PngCompression {
    /// Parse from a mode string ("fast", "default", "best").
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode {
            "fast" => Some(Self::Fast),
            "default" => Some(Self::Default),
            "best" => Some(Self::Best),
            _ => None,
        }
    }
}

/// Settings for one capture-and-crop invocation.
///
/// ```
/// use std::time::Duration;
/// use capture_window::config::{CaptureOptions, SizeCheck};
///
/// let options = CaptureOptions::default()
///     .with_frame_timeout(Duration::from_millis(500))
///     .with_size_check(SizeCheck::Warn);
/// assert_eq!(options.frame_timeout, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Upper bound on the wait for a frame; exceeded -> `CaptureTimedOut`.
    pub frame_timeout: Duration,
    /// Policy for captured-size vs. window-bounds disagreement.
    pub size_check: SizeCheck,
    /// Compression preset for every PNG written.
    pub compression: PngCompression,
    /// Include the mouse cursor in the capture.
    pub capture_cursor: bool,
    /// Ask the compositor to draw its yellow capture border around the window.
    pub draw_border: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            frame_timeout: DEFAULT_FRAME_TIMEOUT,
            size_check: SizeCheck::default(),
            compression: PngCompression::default(),
            capture_cursor: false,
            draw_border: false,
        }
    }
}

impl CaptureOptions {
    pub fn with_frame_timeout(mut self, timeout: Duration) -> Self {
        self.frame_timeout = timeout;
        self
    }

    pub fn with_size_check(mut self, size_check: SizeCheck) -> Self {
        self.size_check = size_check;
        self
    }

    pub fn with_compression(mut self, compression: PngCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_cursor(mut self, capture_cursor: bool) -> Self {
        self.capture_cursor = capture_cursor;
        self
    }

    pub fn with_border(mut self, draw_border: bool) -> Self {
        self.draw_border = draw_border;
        self
    }
}
