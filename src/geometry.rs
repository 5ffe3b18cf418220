// Window geometry: handles, rectangles and the query seam for window managers.
//
// Three rectangles are tracked per window and are deliberately kept apart:
// - window rect: the raw rectangle, may include invisible resize borders
// - bounds rect: DWM extended frame bounds, what the compositor actually draws
// - client rect: the drawable interior, in screen coordinates

use core::fmt;

use crate::error::{Error, NativeError, Result};

/// Opaque native window identifier.
///
/// Not owned by this crate; it must stay valid for the duration of a capture call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    /// The null handle never names a window.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Convert to a Win32 `HWND`.
    #[cfg(windows)]
    pub fn as_hwnd(self) -> windows::Win32::Foundation::HWND {
        windows::Win32::Foundation::HWND(self.0 as *mut core::ffi::c_void)
    }
}

impl From<isize> for WindowHandle {
    fn from(raw: isize) -> Self {
        Self(raw)
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Axis-aligned rectangle, edges exclusive on the right and bottom.
///
/// Invariant: `right >= left` and `bottom >= top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Rect {
    /// Returns `None` when the edges are inverted.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Option<Self> {
        (right >= left && bottom >= top).then_some(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Rectangle of `width` x `height` with its top-left corner at `(left, top)`.
    pub fn from_origin_size(left: i32, top: i32, width: u32, height: u32) -> Option<Self> {
        let right = left.checked_add(i32::try_from(width).ok()?)?;
        let bottom = top.checked_add(i32::try_from(height).ok()?)?;
        Self::new(left, top, right, bottom)
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn width(&self) -> u32 {
        self.left.abs_diff(self.right)
    }

    pub fn height(&self) -> u32 {
        self.top.abs_diff(self.bottom)
    }

    /// `(width, height)`
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.left, self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Same size, moved so the top-left corner sits at `(0, 0)`.
    ///
    /// Returns `None` when the size does not fit in `i32` coordinates.
    pub fn at_origin(&self) -> Option<Self> {
        Self::from_origin_size(0, 0, self.width(), self.height())
    }

    /// Express this rectangle in the coordinate space whose origin is `origin`.
    ///
    /// Returns `None` when an edge overflows `i32`.
    pub fn relative_to(&self, origin: (i32, i32)) -> Option<Self> {
        let (x, y) = origin;
        Self::new(
            self.left.checked_sub(x)?,
            self.top.checked_sub(y)?,
            self.right.checked_sub(x)?,
            self.bottom.checked_sub(y)?,
        )
    }

    /// Whether this rectangle lies fully inside a `width` x `height` image at origin.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.left >= 0
            && self.top >= 0
            && i64::from(self.right) <= i64::from(width)
            && i64::from(self.bottom) <= i64::from(height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.left,
            self.top,
            self.width(),
            self.height()
        )
    }
}

#[cfg(windows)]
impl From<Rect> for windows::Win32::Foundation::RECT {
    fn from(rect: Rect) -> Self {
        Self {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        }
    }
}

/// Window-manager queries needed to crop a capture.
///
/// Each query fails with [`Error::GeometryUnavailable`](crate::Error::GeometryUnavailable)
/// when the handle does not name a live window.
pub trait WindowGeometry {
    /// The raw window rectangle, in screen coordinates.
    fn window_rect(&self, window: WindowHandle) -> Result<Rect>;

    /// The visually accurate outer bounds (DWM extended frame bounds), in screen coordinates.
    ///
    /// This is the rectangle that matches what the compositor captures.
    fn bounds_rect(&self, window: WindowHandle) -> Result<Rect>;

    /// The client area, in screen coordinates.
    fn client_rect_on_screen(&self, window: WindowHandle) -> Result<Rect>;

    /// Crop rectangle selecting the whole captured image.
    fn bounds_crop_rect(&self, window: WindowHandle) -> Result<Rect> {
        let bounds = self.bounds_rect(window)?;
        bounds
            .at_origin()
            .ok_or_else(|| out_of_range(window, format!("bounds {bounds} exceed i32 coordinates")))
    }

    /// Crop rectangle selecting the client area of an image captured in bounds coordinates.
    fn client_crop_rect(&self, window: WindowHandle) -> Result<Rect> {
        let bounds = self.bounds_rect(window)?;
        let client = self.client_rect_on_screen(window)?;
        client.relative_to(bounds.origin()).ok_or_else(|| {
            out_of_range(
                window,
                format!("client {client} relative to bounds {bounds} overflows i32 coordinates"),
            )
        })
    }
}

fn out_of_range(window: WindowHandle, message: String) -> Error {
    Error::GeometryUnavailable {
        window,
        source: NativeError::new("WindowGeometry", 0, message),
    }
}

impl<G: WindowGeometry + ?Sized> WindowGeometry for &G {
    fn window_rect(&self, window: WindowHandle) -> Result<Rect> {
        (**self).window_rect(window)
    }

    fn bounds_rect(&self, window: WindowHandle) -> Result<Rect> {
        (**self).bounds_rect(window)
    }

    fn client_rect_on_screen(&self, window: WindowHandle) -> Result<Rect> {
        (**self).client_rect_on_screen(window)
    }
}
