// D3D11 device creation and ownership

pub mod texture;

use tracing::{debug, error, instrument, warn};
use windows::core::Interface;
use windows::Graphics::DirectX::Direct3D11::IDirect3DDevice;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::System::WinRT::Direct3D11::CreateDirect3D11DeviceFromDXGIDevice;

use crate::error::{Error, NativeError};

/// D3D11 device, its immediate context and the WinRT device wrapper used by WGC.
///
/// The WinRT wrapper is closed on drop.
pub struct D3D11Context {
    pub device: ID3D11Device,
    pub context: ID3D11DeviceContext,
    pub dxgi_device: IDXGIDevice,
    /// Used to create capture frame pools.
    pub direct3d_device: IDirect3DDevice,
}

impl Drop for D3D11Context {
    fn drop(&mut self) {
        if let Err(e) = self.direct3d_device.Close() {
            error!("Failed to close Direct3D device:\n{e}");
        }
    }
}

/// Create a BGRA-capable D3D11 device, falling back to WARP when no hardware device exists.
#[instrument(err)]
pub fn create_d3d11_device() -> Result<D3D11Context, Error> {
    let (device, context) = match create_device_with_type(D3D_DRIVER_TYPE_HARDWARE) {
        Err(e) if e.code() == DXGI_ERROR_UNSUPPORTED => {
            warn!("No hardware D3D11 device, falling back to WARP");
            create_device_with_type(D3D_DRIVER_TYPE_WARP)
        }
        result => result,
    }
    .map_err(|e| Error::Device(NativeError::windows(e, "D3D11CreateDevice")))?;

    let dxgi_device: IDXGIDevice = device
        .cast()
        .map_err(|e| Error::Device(NativeError::windows(e, "ID3D11Device::cast")))?;

    // SAFETY: dxgi_device was obtained from a live D3D11 device above.
    let direct3d_device: IDirect3DDevice = unsafe {
        CreateDirect3D11DeviceFromDXGIDevice(&dxgi_device)
    }
    .and_then(|inspectable| inspectable.cast())
    .map_err(|e| Error::Device(NativeError::windows(e, "CreateDirect3D11DeviceFromDXGIDevice")))?;

    log_device_info(&dxgi_device);

    Ok(D3D11Context {
        device,
        context,
        dxgi_device,
        direct3d_device,
    })
}

fn create_device_with_type(
    driver_type: D3D_DRIVER_TYPE,
) -> windows::core::Result<(ID3D11Device, ID3D11DeviceContext)> {
    let mut device = None;
    let mut context = None;

    // SAFETY: out-pointers reference locals that outlive the call.
    unsafe {
        D3D11CreateDevice(
            None,
            driver_type,
            HMODULE::default(),
            D3D11_CREATE_DEVICE_BGRA_SUPPORT,
            Some(&[D3D_FEATURE_LEVEL_11_0]),
            D3D11_SDK_VERSION,
            Some(&mut device),
            None,
            Some(&mut context),
        )?;
    }

    match (device, context) {
        (Some(device), Some(context)) => Ok((device, context)),
        _ => Err(windows::core::Error::from_hresult(
            windows::Win32::Foundation::E_POINTER,
        )),
    }
}

fn log_device_info(dxgi_device: &IDXGIDevice) {
    // SAFETY: plain COM queries on a live device.
    let desc = unsafe { dxgi_device.GetAdapter().and_then(|adapter| adapter.GetDesc()) };
    match desc {
        Ok(desc) => {
            let name = String::from_utf16_lossy(&desc.Description);
            debug!(
                gpu = name.trim_end_matches('\0'),
                vram_mb = desc.DedicatedVideoMemory / 1024 / 1024,
                "D3D11 device created"
            );
        }
        Err(e) => debug!("D3D11 device created, adapter description unavailable: {e}"),
    }
}
