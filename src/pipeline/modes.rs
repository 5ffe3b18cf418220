use crate::error::Result;
use crate::geometry::{Rect, WindowGeometry, WindowHandle};

/// Which part of the window ends up in the output image.
///
/// - `FullWindow`: the DWM extended frame bounds, including borders and title bar.
/// - `ClientArea`: the client rectangle only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    #[default]
    FullWindow,
    ClientArea,
}

impl CaptureMode {
    /// Parse from a mode string ("window", "client").
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "window" => Some(Self::FullWindow),
            "client" => Some(Self::ClientArea),
            _ => None,
        }
    }

    /// Crop rectangle for this mode, relative to an image captured in bounds coordinates.
    pub fn crop_rect<G: WindowGeometry + ?Sized>(
        self,
        geometry: &G,
        window: WindowHandle,
    ) -> Result<Rect> {
        match self {
            Self::FullWindow => geometry.bounds_crop_rect(window),
            Self::ClientArea => geometry.client_crop_rect(window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!(CaptureMode::from_name("window"), Some(CaptureMode::FullWindow));
        assert_eq!(CaptureMode::from_name("client"), Some(CaptureMode::ClientArea));
        assert_eq!(CaptureMode::from_name("monitor"), None);
        assert_eq!(CaptureMode::default(), CaptureMode::FullWindow);
    }
}
