use std::path::Path;

use image::RgbaImage;
use log::info;

use crate::error::{FractalError, Result};
use crate::raster::RasterBuffer;

pub fn to_image(buffer: &RasterBuffer) -> Result<RgbaImage> {
    RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.to_rgba8())
        .ok_or_else(|| FractalError::invalid("pixel buffer does not match its dimensions"))
}

/// Writes the finished surface as a PNG.
pub fn save_png<P: AsRef<Path>>(buffer: &RasterBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let img = to_image(buffer)?;
    img.save_with_format(path, image::ImageFormat::Png)?;
    info!("exported {}x{} png to {}", buffer.width(), buffer.height(), path.display());
    Ok(())
}
