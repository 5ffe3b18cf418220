// GPU texture readback: copy into a staging twin, map, copy rows out, unmap.

use tracing::{instrument, Level};
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use crate::error::{Error, NativeError, Result};
use crate::image::PixelBuffer;

/// Reads GPU textures back to CPU memory through a staging texture.
pub struct TextureReader {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
}

/// Keeps a staging subresource mapped; unmaps on drop.
struct MappedTexture<'a> {
    context: &'a ID3D11DeviceContext,
    texture: &'a ID3D11Texture2D,
    mapped: D3D11_MAPPED_SUBRESOURCE,
}

impl<'a> MappedTexture<'a> {
    fn map(context: &'a ID3D11DeviceContext, texture: &'a ID3D11Texture2D) -> Result<Self> {
        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
        // SAFETY: texture is a staging resource created with CPU read access.
        unsafe { context.Map(texture, 0, D3D11_MAP_READ, 0, Some(&mut mapped)) }
            .map_err(|e| Error::Device(NativeError::windows(e, "ID3D11DeviceContext::Map")))?;

        Ok(Self {
            context,
            texture,
            mapped,
        })
    }

    /// Mapped bytes covering `height` rows of `RowPitch` bytes.
    ///
    /// # Safety
    /// The mapping must cover at least `height * RowPitch` bytes, which holds for a
    /// 2D staging texture of `height` rows.
    unsafe fn bytes(&self, height: u32) -> &[u8] {
        let len = height as usize * self.mapped.RowPitch as usize;
        core::slice::from_raw_parts(self.mapped.pData as *const u8, len)
    }
}

impl Drop for MappedTexture<'_> {
    fn drop(&mut self) {
        // SAFETY: paired with the successful Map in `MappedTexture::map`.
        unsafe { self.context.Unmap(self.texture, 0) };
    }
}

impl TextureReader {
    pub fn new(device: ID3D11Device, context: ID3D11DeviceContext) -> Self {
        Self { device, context }
    }

    /// Create a CPU-readable staging texture matching `desc` in size and format.
    fn create_staging_texture(&self, desc: &D3D11_TEXTURE2D_DESC) -> Result<ID3D11Texture2D> {
        let staging_desc = D3D11_TEXTURE2D_DESC {
            Width: desc.Width,
            Height: desc.Height,
            MipLevels: 1,
            ArraySize: 1,
            Format: desc.Format,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_STAGING,
            BindFlags: 0,
            CPUAccessFlags: D3D11_CPU_ACCESS_READ.0 as u32,
            MiscFlags: 0,
        };

        let mut texture = None;
        // SAFETY: staging_desc is fully initialized; the out-pointer references a local.
        unsafe {
            self.device
                .CreateTexture2D(&staging_desc, None, Some(&mut texture))
                .map_err(|e| Error::Device(NativeError::windows(e, "ID3D11Device::CreateTexture2D")))?;
        }

        texture.ok_or_else(|| {
            Error::Device(NativeError::new(
                "ID3D11Device::CreateTexture2D",
                0,
                "no texture returned",
            ))
        })
    }

    /// Copy a GPU texture into CPU memory.
    ///
    /// The returned buffer keeps the driver's row pitch, which may exceed `width * 4`.
    /// Only `DXGI_FORMAT_B8G8R8A8_UNORM` is supported.
    #[instrument(level = Level::DEBUG, skip_all, err)]
    pub fn read_pixels(&self, source_texture: &ID3D11Texture2D) -> Result<PixelBuffer> {
        let mut desc = D3D11_TEXTURE2D_DESC::default();
        // SAFETY: GetDesc writes into a local descriptor.
        unsafe { source_texture.GetDesc(&mut desc) };

        if desc.Format != DXGI_FORMAT_B8G8R8A8_UNORM {
            return Err(Error::UnsupportedFormat(desc.Format.0));
        }

        let staging = self.create_staging_texture(&desc)?;

        // SAFETY: both resources share size and format; CopyResource copies the whole texture.
        unsafe { self.context.CopyResource(&staging, source_texture) };

        let mapped = MappedTexture::map(&self.context, &staging)?;
        let row_pitch = mapped.mapped.RowPitch as usize;

        // SAFETY: staging is a 2D texture with desc.Height rows of RowPitch bytes.
        let bytes = unsafe { mapped.bytes(desc.Height) };
        let buffer = PixelBuffer::from_pitched(bytes, desc.Width, desc.Height, row_pitch);
        drop(mapped);

        buffer.ok_or_else(|| {
            Error::Device(NativeError::new(
                "ID3D11DeviceContext::Map",
                0,
                format!(
                    "row pitch {row_pitch} too small for a {}x{} BGRA texture",
                    desc.Width, desc.Height
                ),
            ))
        })
    }
}
