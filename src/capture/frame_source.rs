use tracing::{debug, instrument};

use super::wgc::WgcSession;
use super::FrameSource;
use crate::config::CaptureOptions;
use crate::d3d11::texture::TextureReader;
use crate::d3d11::{create_d3d11_device, D3D11Context};
use crate::error::{Error, NativeError, Result};
use crate::geometry::WindowHandle;
use crate::image::PixelBuffer;

/// [`FrameSource`] backed by Windows Graphics Capture and a D3D11 staging readback.
///
/// The D3D11 device is created once; every capture opens and tears down its own session.
pub struct WgcFrameSource {
    // Declared before the device so it is released first.
    reader: TextureReader,
    d3d_ctx: D3D11Context,
    options: CaptureOptions,
}

impl WgcFrameSource {
    pub fn new(options: CaptureOptions) -> Result<Self> {
        let d3d_ctx = create_d3d11_device()?;
        let reader = TextureReader::new(d3d_ctx.device.clone(), d3d_ctx.context.clone());
        Ok(Self {
            reader,
            d3d_ctx,
            options,
        })
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }
}

impl FrameSource for WgcFrameSource {
    #[instrument("WgcFrameSource::capture_frame", skip(self), err)]
    fn capture_frame(&mut self, window: WindowHandle) -> Result<PixelBuffer> {
        if window.is_null() {
            return Err(Error::UnsupportedWindow {
                window,
                source: NativeError::new("WgcFrameSource::capture_frame", 0, "null window handle"),
            });
        }

        let session = WgcSession::open(&self.d3d_ctx, window, &self.options)?;
        let item_size = session.item_size();
        let frame = session.wait_for_frame(self.options.frame_timeout)?;

        // The frame must stay alive until CopyResource inside read_pixels has run.
        let texture = WgcSession::frame_to_texture(&frame)?;
        let pixels = self.reader.read_pixels(&texture)?;

        drop(texture);
        if let Err(e) = frame.Close() {
            debug!("Failed to close capture frame: {e}");
        }
        drop(frame);
        drop(session);

        // Release the device's transient state (staging texture, bindings) between captures.
        // SAFETY: no resources of this capture are in use anymore.
        unsafe { self.d3d_ctx.context.ClearState() };

        debug!(
            ?item_size,
            frame_size = ?pixels.size(),
            row_pitch = pixels.row_pitch(),
            "frame read back"
        );
        Ok(pixels)
    }
}
