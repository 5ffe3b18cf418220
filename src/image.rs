// Image side of the pipeline: CPU pixel buffers, PNG encoding and in-place cropping.
//
// - `buffer`: pitched BGRA8 storage read back from the GPU
// - `encode`: lossless BGRA8 -> PNG via the `image` crate
// - `crop`: decode, crop and overwrite an existing PNG file

pub mod buffer;
pub mod crop;
pub mod encode;

pub use buffer::PixelBuffer;
pub use crop::{check_captured_size, crop_image_file, image_size};
pub use encode::{encode_bgra_to_png, save_png};
