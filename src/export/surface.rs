use crate::{error::ExportError, models::ExportFormat};
use image::{
    codecs::{jpeg::JpegEncoder, png::PngEncoder, webp::WebPEncoder},
    imageops, DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, Rgb, RgbImage,
    RgbaImage,
};

/// Quality used for lossy output, matching what a browser canvas picks when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Offscreen RGBA drawing surface sized to an image's natural dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// A fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Decodes encoded image bytes and draws them onto a surface of the same size.
    pub fn decode(bytes: &[u8]) -> Result<Self, ExportError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| ExportError::Decode(format!("unreadable image data: {}", e)))?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ExportError::Decode("image has no pixels".into()));
        }

        let mut surface = Self::new(width, height);
        surface.draw(&image);
        Ok(surface)
    }

    /// Draws `image` at the origin without scaling; anything outside the surface is clipped.
    pub fn draw(&mut self, image: &DynamicImage) {
        imageops::replace(&mut self.pixels, &image.to_rgba8(), 0, 0);
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether the surface's own encoder can emit `format`.
    pub fn supports(format: ExportFormat) -> bool {
        !format.is_vector()
    }

    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        let (width, height) = (self.width(), self.height());
        let mut buf = Vec::new();

        let written = match format {
            ExportFormat::Png => PngEncoder::new(&mut buf).write_image(
                self.pixels.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            ExportFormat::Jpeg => {
                let flattened = self.flatten_over_black();
                JpegEncoder::new_with_quality(&mut buf, DEFAULT_JPEG_QUALITY).write_image(
                    flattened.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            ExportFormat::WebP => WebPEncoder::new_lossless(&mut buf).write_image(
                self.pixels.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            ExportFormat::Svg => {
                return Err(ExportError::Encode(
                    "SVG cannot be produced by the raster encoder".into(),
                ))
            }
        };

        written.map_err(|e| ExportError::Encode(format!("{} encoding failed: {}", format, e)))?;

        if buf.is_empty() {
            return Err(ExportError::Encode(format!("{} encoder produced no bytes", format)));
        }
        Ok(buf)
    }

    /// JPEG has no alpha channel; transparent pixels end up black, as on a canvas.
    fn flatten_over_black(&self) -> RgbImage {
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b, a] = self.pixels.get_pixel(x, y).0;
            let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
            Rgb([scale(r), scale(g), scale(b)])
        })
    }
}
