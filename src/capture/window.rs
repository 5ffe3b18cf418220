// Window rectangles from DWM and user32, plus process DPI awareness.

use tracing::instrument;
use windows::Win32::Foundation::{HWND, POINT, RECT};
use windows::Win32::Graphics::Dwm::{DwmGetWindowAttribute, DWMWA_EXTENDED_FRAME_BOUNDS};
use windows::Win32::Graphics::Gdi::ClientToScreen;
use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows::Win32::UI::WindowsAndMessaging::{GetClientRect, GetWindowRect};

use crate::error::{Error, NativeError, Result};
use crate::geometry::{Rect, WindowGeometry, WindowHandle};

/// Enable per-monitor DPI awareness for the process.
///
/// Without it user32 reports scaled logical rectangles while DWM and the compositor
/// work in physical pixels. Best-effort: fails silently if the awareness was
/// already set (e.g. by a manifest or a GUI framework).
pub fn enable_dpi_awareness() {
    unsafe {
        // SAFETY: best-effort call, failure indicates it was already set
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}

/// [`WindowGeometry`] backed by `DwmGetWindowAttribute`, `GetWindowRect` and `GetClientRect`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DwmWindowGeometry;

impl DwmWindowGeometry {
    pub fn new() -> Self {
        Self
    }
}

fn hwnd_for(window: WindowHandle, call: &'static str) -> Result<HWND> {
    if window.is_null() {
        return Err(Error::GeometryUnavailable {
            window,
            source: NativeError::new(call, 0, "null window handle"),
        });
    }
    Ok(window.as_hwnd())
}

fn to_rect(window: WindowHandle, raw: RECT, call: &'static str) -> Result<Rect> {
    Rect::new(raw.left, raw.top, raw.right, raw.bottom).ok_or_else(|| Error::GeometryUnavailable {
        window,
        source: NativeError::new(call, 0, format!("inverted rectangle {raw:?}")),
    })
}

fn unavailable(window: WindowHandle, call: &'static str) -> impl FnOnce(windows::core::Error) -> Error {
    move |e| Error::GeometryUnavailable {
        window,
        source: NativeError::windows(e, call),
    }
}

impl WindowGeometry for DwmWindowGeometry {
    #[instrument(skip(self), err)]
    fn window_rect(&self, window: WindowHandle) -> Result<Rect> {
        const CALL: &str = "GetWindowRect";
        let hwnd = hwnd_for(window, CALL)?;

        let mut raw = RECT::default();
        // SAFETY: writes into a local RECT; invalid handles fail the call.
        unsafe { GetWindowRect(hwnd, &mut raw) }.map_err(unavailable(window, CALL))?;
        to_rect(window, raw, CALL)
    }

    #[instrument(skip(self), err)]
    fn bounds_rect(&self, window: WindowHandle) -> Result<Rect> {
        const CALL: &str = "DwmGetWindowAttribute(DWMWA_EXTENDED_FRAME_BOUNDS)";
        let hwnd = hwnd_for(window, CALL)?;

        let mut raw = RECT::default();
        // SAFETY: the attribute is a RECT and the buffer is exactly one RECT.
        unsafe {
            DwmGetWindowAttribute(
                hwnd,
                DWMWA_EXTENDED_FRAME_BOUNDS,
                &mut raw as *mut RECT as *mut core::ffi::c_void,
                core::mem::size_of::<RECT>() as u32,
            )
        }
        .map_err(unavailable(window, CALL))?;
        to_rect(window, raw, CALL)
    }

    #[instrument(skip(self), err)]
    fn client_rect_on_screen(&self, window: WindowHandle) -> Result<Rect> {
        let hwnd = hwnd_for(window, "GetClientRect")?;

        let mut client = RECT::default();
        // SAFETY: writes into a local RECT; invalid handles fail the call.
        unsafe { GetClientRect(hwnd, &mut client) }.map_err(unavailable(window, "GetClientRect"))?;

        // Client rect is origin-relative; translate its origin to screen coordinates.
        let mut origin = POINT::default();
        // SAFETY: writes into a local POINT.
        if !unsafe { ClientToScreen(hwnd, &mut origin) }.as_bool() {
            return Err(Error::GeometryUnavailable {
                window,
                source: NativeError::new("ClientToScreen", 0, "window handle is invalid"),
            });
        }

        let width = client.left.abs_diff(client.right);
        let height = client.top.abs_diff(client.bottom);
        Rect::from_origin_size(origin.x, origin.y, width, height).ok_or_else(|| {
            Error::GeometryUnavailable {
                window,
                source: NativeError::new(
                    "ClientToScreen",
                    0,
                    format!("client rect {client:?} at {origin:?} overflows screen coordinates"),
                ),
            }
        })
    }
}
