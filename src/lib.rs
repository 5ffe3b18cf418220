//! # capture-window
//!
//! Capture a single window to a PNG file, either the full window (borders and
//! title bar included) or just its client area.
//!
//! On Windows the frame comes from Windows Graphics Capture, is read back through
//! a D3D11 staging texture, encoded losslessly and then cropped to the window's
//! DWM extended frame bounds or to its client rectangle.
//!
//! The pipeline itself is platform-neutral: [`pipeline::WindowCapturer`] is generic
//! over a [`FrameSource`] and a [`WindowGeometry`], and the Windows adapters
//! (`WgcFrameSource`, `DwmWindowGeometry`) are only compiled on Windows.
//!
//! ## Rust usage
//!
//! ```no_run
//! # #[cfg(windows)] {
//! use capture_window::pipeline;
//!
//! let hwnd: isize = 0x000A_0F3C;
//!
//! // Whole window, including borders and title bar
//! pipeline::capture_full_window(hwnd, "window.png").unwrap();
//!
//! // Client area only
//! pipeline::capture_client_area(hwnd, "client.png").unwrap();
//! # }
//! ```

pub mod capture;
pub mod config;
#[cfg(windows)]
pub mod d3d11;
pub mod error;
pub mod geometry;
pub mod image;
pub mod pipeline;

pub use crate::capture::FrameSource;
pub use crate::config::{CaptureOptions, PngCompression, SizeCheck};
pub use crate::error::{Error, NativeError, Result};
pub use crate::geometry::{Rect, WindowGeometry, WindowHandle};
pub use crate::image::PixelBuffer;
pub use crate::pipeline::{CaptureMode, WindowCapturer};
