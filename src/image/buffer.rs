// CPU-side pixel storage: the bridge between a mapped GPU texture and the encoder.

/// Bytes per BGRA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// BGRA8 pixels copied out of a mapped texture, rows separated by `row_pitch` bytes.
///
/// `row_pitch` reflects hardware alignment and may exceed `width * 4`.
/// Always index rows through [`PixelBuffer::row`], never by assuming packed rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    row_pitch: usize,
}

impl PixelBuffer {
    /// Copy `height` rows out of pitched memory.
    ///
    /// The source may end right after the last row's pixels (drivers are not required
    /// to pad the final row). Returns `None` when `row_pitch < width * 4` or `source`
    /// is too short to hold every row.
    pub fn from_pitched(source: &[u8], width: u32, height: u32, row_pitch: usize) -> Option<Self> {
        let row_bytes = width as usize * BYTES_PER_PIXEL;
        if row_pitch < row_bytes {
            return None;
        }
        let required = match height as usize {
            0 => 0,
            rows => (rows - 1) * row_pitch + row_bytes,
        };
        if source.len() < required {
            return None;
        }

        // Keep the pitch so every row is addressed the same way; pad the last row.
        let mut data = Vec::with_capacity(height as usize * row_pitch);
        data.extend_from_slice(&source[..required]);
        data.resize(height as usize * row_pitch, 0);

        Some(Self {
            data,
            width,
            height,
            row_pitch,
        })
    }

    /// Wrap tightly packed BGRA8 rows.
    pub fn from_packed(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        let row_pitch = width as usize * BYTES_PER_PIXEL;
        (data.len() == row_pitch * height as usize).then_some(Self {
            data,
            width,
            height,
            row_pitch,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn row_pitch(&self) -> usize {
        self.row_pitch
    }

    /// Pixel bytes of row `y`, without pitch padding.
    ///
    /// # Panics
    /// If `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row {y} out of range (height {})", self.height);
        let start = y as usize * self.row_pitch;
        &self.data[start..start + self.width as usize * BYTES_PER_PIXEL]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// BGRA bytes of the pixel at `(x, y)`.
    ///
    /// # Panics
    /// If `x >= width` or `y >= height`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width, "column {x} out of range (width {})", self.width);
        let offset = x as usize * BYTES_PER_PIXEL;
        let row = self.row(y);
        [row[offset], row[offset + 1], row[offset + 2], row[offset + 3]]
    }

    /// Tightly packed BGRA8 copy (`width * 4` bytes per row).
    pub fn to_packed(&self) -> Vec<u8> {
        let mut packed = Vec::with_capacity(self.width as usize * self.height as usize * BYTES_PER_PIXEL);
        for row in self.rows() {
            packed.extend_from_slice(row);
        }
        packed
    }

    /// Tightly packed RGBA8 copy, the layout the PNG encoder expects.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = self.to_packed();
        for pixel in rgba.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.swap(0, 2);
        }
        rgba
    }
}
