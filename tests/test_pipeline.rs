// Integration test: capture-and-crop pipeline with in-memory platform adapters
//
// The fake frame source renders a synthetic 800x600 window whose pixel (x, y)
// encodes its coordinates, so crops can be checked against screen rows.

use std::cell::Cell;
use std::path::Path;
use std::time::Duration;

use capture_window::{
    CaptureMode, CaptureOptions, Error, FrameSource, NativeError, PixelBuffer, Rect, Result,
    SizeCheck, WindowCapturer, WindowGeometry, WindowHandle,
};

const WINDOW: WindowHandle = WindowHandle(0x5A5A);

/// 800x600 window at (100, 50) on screen with a 32px title bar.
struct FakeGeometry {
    bounds: Rect,
    client: Rect,
}

impl FakeGeometry {
    fn titled_800x600() -> Self {
        Self {
            bounds: Rect::new(100, 50, 900, 650).unwrap(),
            client: Rect::new(100, 82, 900, 650).unwrap(),
        }
    }

    fn check(&self, window: WindowHandle) -> Result<()> {
        if window != WINDOW {
            return Err(Error::GeometryUnavailable {
                window,
                source: NativeError::new(
                    "FakeGeometry",
                    0x8007_0578_u32 as i32,
                    "Invalid window handle.",
                ),
            });
        }
        Ok(())
    }
}

impl WindowGeometry for FakeGeometry {
    fn window_rect(&self, window: WindowHandle) -> Result<Rect> {
        self.check(window)?;
        // Raw rect includes 8px invisible resize borders.
        Ok(Rect::new(92, 50, 908, 658).unwrap())
    }

    fn bounds_rect(&self, window: WindowHandle) -> Result<Rect> {
        self.check(window)?;
        Ok(self.bounds)
    }

    fn client_rect_on_screen(&self, window: WindowHandle) -> Result<Rect> {
        self.check(window)?;
        Ok(self.client)
    }
}

/// Renders frames of a fixed size with padded rows, or fails with a preset error.
struct FakeSource {
    size: (u32, u32),
    timeout: Option<Duration>,
    calls: Cell<u32>,
}

impl FakeSource {
    fn sized(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            timeout: None,
            calls: Cell::new(0),
        }
    }

    fn timing_out(timeout: Duration) -> Self {
        Self {
            size: (0, 0),
            timeout: Some(timeout),
            calls: Cell::new(0),
        }
    }
}

impl FrameSource for FakeSource {
    fn capture_frame(&mut self, window: WindowHandle) -> Result<PixelBuffer> {
        self.calls.set(self.calls.get() + 1);
        if let Some(timeout) = self.timeout {
            return Err(Error::CaptureTimedOut { window, timeout });
        }

        let (width, height) = self.size;
        let row_pitch = width as usize * 4 + 64;
        let mut data = vec![0xEE; row_pitch * height as usize];
        for y in 0..height {
            for x in 0..width {
                let offset = y as usize * row_pitch + x as usize * 4;
                // BGRA: B = x low, G = y low, R = y high
                data[offset..offset + 4].copy_from_slice(&[x as u8, y as u8, (y >> 8) as u8, 0xFF]);
            }
        }
        Ok(PixelBuffer::from_pitched(&data, width, height, row_pitch).unwrap())
    }
}

fn load(path: &Path) -> image::RgbaImage {
    image::open(path).unwrap().to_rgba8()
}

/// Image row `y` of a capture, recovered from the pixel encoding.
fn encoded_row(image: &image::RgbaImage, y: u32) -> u32 {
    let [r, g, _, _] = image.get_pixel(0, y).0;
    (u32::from(r) << 8) | u32::from(g)
}

#[test]
fn full_window_matches_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("window.png");
    let geometry = FakeGeometry::titled_800x600();
    let mut capturer =
        WindowCapturer::new(FakeSource::sized(800, 600), &geometry, CaptureOptions::default());

    capturer.capture_full_window(WINDOW, &path).unwrap();

    let image = load(&path);
    assert_eq!(image.dimensions(), geometry.bounds_rect(WINDOW).unwrap().size());
    assert_eq!(image.dimensions(), (800, 600));
    // BGRA -> RGBA: pixel (7, 3) is [R = 0, G = 3, B = 7]
    assert_eq!(image.get_pixel(7, 3).0, [0, 3, 7, 0xFF]);
}

#[test]
fn client_area_drops_title_bar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("client.png");
    let geometry = FakeGeometry::titled_800x600();
    let mut capturer =
        WindowCapturer::new(FakeSource::sized(800, 600), &geometry, CaptureOptions::default());

    capturer.capture_client_area(WINDOW, &path).unwrap();

    let image = load(&path);
    assert_eq!(image.dimensions(), (800, 568));
    assert_eq!(image.dimensions(), geometry.client.size());
    // Top row of the output is screen row windowTop + 32.
    assert_eq!(encoded_row(&image, 0), 32);
    assert_eq!(encoded_row(&image, 567), 599);
}

#[test]
fn client_area_is_never_larger_than_full_window() {
    let dir = tempfile::tempdir().unwrap();
    let full = dir.path().join("full.png");
    let client = dir.path().join("client.png");
    let geometry = FakeGeometry::titled_800x600();
    let mut capturer =
        WindowCapturer::new(FakeSource::sized(800, 600), &geometry, CaptureOptions::default());

    capturer.capture(WINDOW, &full, CaptureMode::FullWindow).unwrap();
    capturer.capture(WINDOW, &client, CaptureMode::ClientArea).unwrap();

    let (fw, fh) = load(&full).dimensions();
    let (cw, ch) = load(&client).dimensions();
    assert!(cw <= fw && ch <= fh);
}

#[test]
fn invalid_window_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.png");
    let geometry = FakeGeometry::titled_800x600();
    let mut capturer =
        WindowCapturer::new(FakeSource::sized(800, 600), &geometry, CaptureOptions::default());

    for mode in [CaptureMode::FullWindow, CaptureMode::ClientArea] {
        let err = capturer.capture(WindowHandle(0), &path, mode).unwrap_err();
        assert!(
            matches!(err, Error::GeometryUnavailable { .. } | Error::UnsupportedWindow { .. }),
            "{err}"
        );
    }
    assert!(!path.exists());
}

#[test]
fn invalid_window_never_reaches_frame_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.png");
    let geometry = FakeGeometry::titled_800x600();
    let mut source = FakeSource::sized(800, 600);

    {
        let mut capturer = WindowCapturer::new(&mut source, &geometry, CaptureOptions::default());
        capturer.capture_full_window(WindowHandle(0), &path).unwrap_err();
    }

    assert_eq!(source.calls.get(), 0);
}

#[test]
fn frame_timeout_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timeout.png");
    let timeout = Duration::from_millis(250);
    let mut capturer = WindowCapturer::new(
        FakeSource::timing_out(timeout),
        FakeGeometry::titled_800x600(),
        CaptureOptions::default().with_frame_timeout(timeout),
    );

    let err = capturer.capture_full_window(WINDOW, &path).unwrap_err();

    assert!(
        matches!(err, Error::CaptureTimedOut { timeout: t, .. } if t == timeout),
        "{err}"
    );
    assert!(!path.exists());
}

#[test]
fn strict_size_check_rejects_resized_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resized.png");
    // Window grew after the frame pool was sized.
    let mut capturer = WindowCapturer::new(
        FakeSource::sized(780, 590),
        FakeGeometry::titled_800x600(),
        CaptureOptions::default(),
    );

    let err = capturer.capture_full_window(WINDOW, &path).unwrap_err();

    assert!(
        matches!(
            err,
            Error::SizeMismatch {
                expected: (800, 600),
                actual: (780, 590)
            }
        ),
        "{err}"
    );
    // The uncropped capture is left behind.
    assert_eq!(load(&path).dimensions(), (780, 590));
}

#[test]
fn warn_size_check_normalizes_larger_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("larger.png");
    let mut capturer = WindowCapturer::new(
        FakeSource::sized(820, 640),
        FakeGeometry::titled_800x600(),
        CaptureOptions::default().with_size_check(SizeCheck::Warn),
    );

    capturer.capture_full_window(WINDOW, &path).unwrap();

    assert_eq!(load(&path).dimensions(), (800, 600));
}

#[test]
fn warn_size_check_still_rejects_out_of_bounds_crop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smaller.png");
    let mut capturer = WindowCapturer::new(
        FakeSource::sized(640, 480),
        FakeGeometry::titled_800x600(),
        CaptureOptions::default().with_size_check(SizeCheck::Warn),
    );

    let err = capturer.capture_client_area(WINDOW, &path).unwrap_err();

    assert!(matches!(err, Error::InvalidCropRect { .. }), "{err}");
    assert_eq!(load(&path).dimensions(), (640, 480));
}

#[test]
fn repeated_captures_overwrite_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("again.png");
    let mut capturer = WindowCapturer::new(
        FakeSource::sized(800, 600),
        FakeGeometry::titled_800x600(),
        CaptureOptions::default(),
    );

    capturer.capture_client_area(WINDOW, &path).unwrap();
    capturer.capture_full_window(WINDOW, &path).unwrap();

    assert_eq!(load(&path).dimensions(), (800, 600));
    assert_eq!(capturer.geometry().window_rect(WINDOW).unwrap().size(), (816, 608));
}

#[test]
fn output_path_extension_is_not_required() {
    let dir = tempfile::tempdir().unwrap();
    let mut capturer = WindowCapturer::new(
        FakeSource::sized(800, 600),
        FakeGeometry::titled_800x600(),
        CaptureOptions::default(),
    );

    for name in ["client", "client.tmp", "client.PNG"] {
        let path = dir.path().join(name);
        capturer.capture_client_area(WINDOW, &path).unwrap();

        let image = image::load_from_memory_with_format(
            &std::fs::read(&path).unwrap(),
            image::ImageFormat::Png,
        )
        .unwrap();
        assert_eq!((image.width(), image.height()), (800, 568), "{name}");
    }
}
