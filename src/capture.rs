// Frame acquisition.
//
// `FrameSource` is the seam between the platform-neutral pipeline and the
// native capture stack. On Windows it is backed by Windows Graphics Capture
// (`wgc`) plus a D3D11 staging readback; window rectangles come from DWM and
// user32 (`window`).

#[cfg(windows)]
pub mod frame_source;
#[cfg(windows)]
pub mod wgc;
#[cfg(windows)]
pub mod window;

use crate::error::Result;
use crate::geometry::WindowHandle;
use crate::image::PixelBuffer;

#[cfg(windows)]
pub use frame_source::WgcFrameSource;
#[cfg(windows)]
pub use window::{enable_dpi_awareness, DwmWindowGeometry};

/// Produces exactly one CPU-readable frame of a window's composited surface.
pub trait FrameSource {
    /// Capture one frame of `window` and read it back as BGRA8 pixels.
    ///
    /// Every native resource acquired for the capture is released before returning,
    /// on success and on error alike.
    fn capture_frame(&mut self, window: WindowHandle) -> Result<PixelBuffer>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn capture_frame(&mut self, window: WindowHandle) -> Result<PixelBuffer> {
        (**self).capture_frame(window)
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn capture_frame(&mut self, window: WindowHandle) -> Result<PixelBuffer> {
        (**self).capture_frame(window)
    }
}
