// Windows Graphics Capture session for a single window frame
//
// The frame pool holds one BGRA8 buffer sized to the window at session creation.
// FrameArrived only signals a kernel event; the caller waits on it with a deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, instrument, warn, Level};
use windows::core::{IInspectable, Interface};
use windows::Foundation::TypedEventHandler;
use windows::Graphics::Capture::{
    Direct3D11CaptureFrame, Direct3D11CaptureFramePool, GraphicsCaptureItem, GraphicsCaptureSession,
};
use windows::Graphics::DirectX::Direct3D11::IDirect3DSurface;
use windows::Graphics::DirectX::DirectXPixelFormat;
use windows::Win32::Foundation::{CloseHandle, GetLastError, HANDLE};
use windows::Win32::Graphics::Direct3D11::ID3D11Texture2D;
use windows::Win32::System::Threading::{CreateEventW, SetEvent, WaitForSingleObject};
use windows::Win32::System::WinRT::Direct3D11::IDirect3DDxgiInterfaceAccess;
use windows::Win32::System::WinRT::Graphics::Capture::IGraphicsCaptureItemInterop;

use crate::config::CaptureOptions;
use crate::d3d11::D3D11Context;
use crate::error::{Error, NativeError, Result};
use crate::geometry::WindowHandle;

fn device_error(call: &'static str) -> impl FnOnce(windows::core::Error) -> Error {
    move |e| Error::Device(NativeError::windows(e, call))
}

/// One capture session bound to one window. Never reused across captures.
///
/// Dropping the session unregisters the frame handler, closes the session and the
/// frame pool, closes the frame event, then releases the capture item.
pub struct WgcSession {
    window: WindowHandle,
    frame_pool: Direct3D11CaptureFramePool,
    session: GraphicsCaptureSession,
    /// FrameArrived callback token (for unregistering on drop)
    frame_arrived_token: i64,
    /// FrameArrived signal event (auto-reset kernel event)
    frame_event: HANDLE,
    /// Set once teardown starts so the callback stops signalling
    shutting_down: Arc<AtomicBool>,
    width: u32,
    height: u32,
    // Declared last: released after the pool and session.
    _item: GraphicsCaptureItem,
}

impl WgcSession {
    /// Create a capture item for `window` and a started session with a one-frame pool.
    ///
    /// Fails with [`Error::UnsupportedWindow`] when the window cannot be captured.
    #[instrument("WgcSession::open", skip(d3d_ctx, options), err)]
    pub fn open(
        d3d_ctx: &D3D11Context,
        window: WindowHandle,
        options: &CaptureOptions,
    ) -> Result<Self> {
        let item = create_capture_item_for_window(window)?;
        let size = item.Size().map_err(|e| Error::UnsupportedWindow {
            window,
            source: NativeError::windows(e, "GraphicsCaptureItem::Size"),
        })?;

        let frame_pool = Direct3D11CaptureFramePool::CreateFreeThreaded(
            &d3d_ctx.direct3d_device,
            DirectXPixelFormat::B8G8R8A8UIntNormalized,
            1,
            size,
        )
        .map_err(device_error("Direct3D11CaptureFramePool::CreateFreeThreaded"))?;

        // SAFETY: anonymous auto-reset event, closed in Drop (or below on failure).
        let frame_event = unsafe { CreateEventW(None, false, false, None) }
            .map_err(device_error("CreateEventW"))?;

        // The callback only signals; the HANDLE travels as usize to satisfy Send.
        let shutting_down = Arc::new(AtomicBool::new(false));
        let shutting_down_cb = Arc::clone(&shutting_down);
        let event_ptr = frame_event.0 as usize;
        let handler = TypedEventHandler::<Direct3D11CaptureFramePool, IInspectable>::new(
            move |_, _| {
                if !shutting_down_cb.load(Ordering::Relaxed) {
                    // SAFETY: kernel event handles may be signalled from any thread;
                    // the event outlives the registration (removed before CloseHandle).
                    if let Err(e) = unsafe { SetEvent(HANDLE(event_ptr as *mut _)) } {
                        error!("SetEvent failed in FrameArrived callback: {e}");
                    }
                }
                Ok(())
            },
        );

        let frame_arrived_token = match frame_pool.FrameArrived(&handler) {
            Ok(token) => token,
            Err(e) => {
                // SAFETY: the event was created above and is not shared yet.
                unsafe {
                    let _ = CloseHandle(frame_event);
                }
                let _ = frame_pool.Close();
                return Err(device_error("Direct3D11CaptureFramePool::FrameArrived")(e));
            }
        };

        let session = match frame_pool.CreateCaptureSession(&item) {
            Ok(session) => session,
            Err(e) => {
                let _ = frame_pool.RemoveFrameArrived(frame_arrived_token);
                // SAFETY: handler removed above, nothing signals the event anymore.
                unsafe {
                    let _ = CloseHandle(frame_event);
                }
                let _ = frame_pool.Close();
                return Err(Error::UnsupportedWindow {
                    window,
                    source: NativeError::windows(e, "Direct3D11CaptureFramePool::CreateCaptureSession"),
                });
            }
        };

        let wgc = Self {
            window,
            frame_pool,
            session,
            frame_arrived_token,
            frame_event,
            shutting_down,
            width: size.Width.max(0) as u32,
            height: size.Height.max(0) as u32,
            _item: item,
        };

        // Older Windows builds lack these properties; capture still works without them.
        if let Err(e) = wgc.session.SetIsCursorCaptureEnabled(options.capture_cursor) {
            warn!("Failed to set cursor capture: {e}");
        }
        if let Err(e) = wgc.session.SetIsBorderRequired(options.draw_border) {
            warn!("Failed to set capture border: {e}");
        }

        wgc.session
            .StartCapture()
            .map_err(device_error("GraphicsCaptureSession::StartCapture"))?;

        debug!(width = wgc.width, height = wgc.height, "capture session started");
        Ok(wgc)
    }

    /// Size of the capture item when the session was opened.
    pub fn item_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Block until the compositor delivers a frame or `timeout` elapses.
    ///
    /// Uses the kernel event, so no CPU is burned while waiting.
    #[instrument(level = Level::DEBUG, skip(self), err)]
    pub fn wait_for_frame(&self, timeout: Duration) -> Result<Direct3D11CaptureFrame> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(frame) = self.frame_pool.TryGetNextFrame() {
                return Ok(frame);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::CaptureTimedOut {
                    window: self.window,
                    timeout,
                });
            }

            let timeout_ms = remaining.as_millis().min(u128::from(u32::MAX - 1)) as u32;
            // SAFETY: frame_event lives as long as self.
            let result = unsafe { WaitForSingleObject(self.frame_event, timeout_ms) };
            match result.0 {
                // WAIT_OBJECT_0 / WAIT_TIMEOUT: re-check the pool and the deadline
                0 | 0x102 => {}
                code => {
                    // SAFETY: reads the calling thread's last-error value.
                    let last_error = unsafe { GetLastError() };
                    return Err(Error::Device(NativeError::new(
                        "WaitForSingleObject",
                        last_error.to_hresult().0,
                        format!("wait returned 0x{code:X}"),
                    )));
                }
            }
        }
    }

    /// View the frame's surface as a D3D11 texture, without copying.
    ///
    /// The frame must not be dropped until the texture has been copied.
    pub fn frame_to_texture(frame: &Direct3D11CaptureFrame) -> Result<ID3D11Texture2D> {
        let surface: IDirect3DSurface = frame
            .Surface()
            .map_err(device_error("Direct3D11CaptureFrame::Surface"))?;
        let access: IDirect3DDxgiInterfaceAccess = surface
            .cast()
            .map_err(device_error("IDirect3DSurface::cast"))?;

        // SAFETY: access was obtained from a live surface above.
        unsafe { access.GetInterface() }
            .map_err(device_error("IDirect3DDxgiInterfaceAccess::GetInterface"))
    }
}

impl Drop for WgcSession {
    fn drop(&mut self) {
        self.shutting_down.store(true, Ordering::Relaxed);

        if let Err(e) = self.frame_pool.RemoveFrameArrived(self.frame_arrived_token) {
            warn!("Failed to unregister FrameArrived handler: {e}");
        }
        if let Err(e) = self.session.Close() {
            error!("Failed to close capture session: {e}");
        }
        if let Err(e) = self.frame_pool.Close() {
            error!("Failed to close frame pool: {e}");
        }

        if !self.frame_event.is_invalid() {
            // SAFETY: frame_event is a handle we created, closed exactly once here.
            unsafe {
                let _ = CloseHandle(self.frame_event);
            }
        }
    }
}

/// Create a GraphicsCaptureItem from a window handle.
fn create_capture_item_for_window(window: WindowHandle) -> Result<GraphicsCaptureItem> {
    let interop: IGraphicsCaptureItemInterop =
        windows::core::factory::<GraphicsCaptureItem, IGraphicsCaptureItemInterop>()
            .map_err(device_error("IGraphicsCaptureItemInterop factory"))?;

    // SAFETY: an invalid or non-capturable window makes the call fail, it does not crash.
    unsafe { interop.CreateForWindow(window.as_hwnd()) }.map_err(|e| Error::UnsupportedWindow {
        window,
        source: NativeError::windows(e, "IGraphicsCaptureItemInterop::CreateForWindow"),
    })
}
