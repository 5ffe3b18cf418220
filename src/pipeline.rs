// Capture pipeline: geometry query → frame capture → PNG encode → crop in place
//
// The uncropped capture is written to the output path first, then cropped to
// the window bounds or client area. If cropping fails the uncropped file stays
// on disk; callers must treat the file as indeterminate after an error.

pub mod modes;

use std::path::Path;

use tracing::{debug, info_span, instrument};

use crate::capture::FrameSource;
use crate::config::CaptureOptions;
use crate::error::Result;
use crate::geometry::{WindowGeometry, WindowHandle};
use crate::image::{check_captured_size, crop_image_file, save_png};

pub use modes::CaptureMode;

/// Captures windows to PNG files through a frame source and a geometry provider.
///
/// # Examples
/// ```no_run
/// # #[cfg(windows)] {
/// use capture_window::pipeline::WindowCapturer;
/// use capture_window::{CaptureOptions, WindowHandle};
///
/// let mut capturer = WindowCapturer::windows(CaptureOptions::default()).unwrap();
/// capturer
///     .capture_client_area(WindowHandle(0x1234), "client.png".as_ref())
///     .unwrap();
/// # }
/// ```
pub struct WindowCapturer<S, G> {
    source: S,
    geometry: G,
    options: CaptureOptions,
}

impl<S: FrameSource, G: WindowGeometry> WindowCapturer<S, G> {
    pub fn new(source: S, geometry: G, options: CaptureOptions) -> Self {
        Self {
            source,
            geometry,
            options,
        }
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Capture the whole window (borders, title bar, shadow-free bounds) to `path`.
    pub fn capture_full_window(&mut self, window: WindowHandle, path: &Path) -> Result<()> {
        self.capture(window, path, CaptureMode::FullWindow)
    }

    /// Capture only the client area of the window to `path`.
    pub fn capture_client_area(&mut self, window: WindowHandle, path: &Path) -> Result<()> {
        self.capture(window, path, CaptureMode::ClientArea)
    }

    /// Capture `window` to `path`, cropped according to `mode`.
    ///
    /// Geometry is resolved before anything is captured, so an invalid window fails
    /// without touching `path`.
    #[instrument(skip(self, path), fields(path = %path.display()), err)]
    pub fn capture(&mut self, window: WindowHandle, path: &Path, mode: CaptureMode) -> Result<()> {
        let bounds = self.geometry.bounds_rect(window)?;
        let crop_rect = mode.crop_rect(&self.geometry, window)?;
        debug!(%bounds, %crop_rect, "resolved window geometry");

        let pixels = {
            let _span = info_span!("capture_frame").entered();
            self.source.capture_frame(window)?
        };

        save_png(&pixels, path, self.options.compression)?;
        drop(pixels);

        check_captured_size(path, bounds.size(), self.options.size_check)?;
        crop_image_file(path, crop_rect, self.options.compression)
    }
}

#[cfg(windows)]
mod windows_capture {
    use super::*;
    use crate::capture::{enable_dpi_awareness, DwmWindowGeometry, WgcFrameSource};

    impl WindowCapturer<WgcFrameSource, DwmWindowGeometry> {
        /// Capturer backed by Windows Graphics Capture and DWM geometry.
        ///
        /// Enables per-monitor DPI awareness so every rectangle is in physical pixels.
        pub fn windows(options: CaptureOptions) -> Result<Self> {
            enable_dpi_awareness();
            let source = WgcFrameSource::new(options)?;
            Ok(Self::new(source, DwmWindowGeometry::new(), options))
        }
    }

    /// Capture the whole window to a PNG file with default options.
    pub fn capture_full_window(window: impl Into<WindowHandle>, path: impl AsRef<Path>) -> Result<()> {
        WindowCapturer::windows(CaptureOptions::default())?
            .capture_full_window(window.into(), path.as_ref())
    }

    /// Capture the client area of the window to a PNG file with default options.
    pub fn capture_client_area(window: impl Into<WindowHandle>, path: impl AsRef<Path>) -> Result<()> {
        WindowCapturer::windows(CaptureOptions::default())?
            .capture_client_area(window.into(), path.as_ref())
    }
}

#[cfg(windows)]
pub use windows_capture::{capture_client_area, capture_full_window};
