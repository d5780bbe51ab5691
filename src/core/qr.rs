use crate::utils::error::Result;
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};

pub const BOX_SIZE_RANGE: (u32, u32) = (5, 20);
pub const BORDER_RANGE: (u32, u32) = (2, 10);

/// Pixel size of one module and width of the light frame, in modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrSettings {
    pub box_size: u32,
    pub border: u32,
}

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            box_size: 10,
            border: 4,
        }
    }
}

impl Validate for QrSettings {
    fn validate(&self) -> Result<()> {
        validate_range("qr.box_size", self.box_size, BOX_SIZE_RANGE.0, BOX_SIZE_RANGE.1)?;
        validate_range("qr.border", self.border, BORDER_RANGE.0, BORDER_RANGE.1)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder {
    settings: QrSettings,
}

impl QrEncoder {
    pub fn new(settings: QrSettings) -> Self {
        Self { settings }
    }

    pub fn is_available() -> bool {
        cfg!(feature = "qr")
    }
}

#[cfg(feature = "qr")]
mod backend {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma};
    use qrcode::{Color, EcLevel, QrCode};
    use std::io::Cursor;

    const DARK: Luma<u8> = Luma([0]);
    const LIGHT: Luma<u8> = Luma([255]);

    /// Two-tone raster of a QR symbol, frame included.
    #[derive(Debug, Clone)]
    pub struct QrImage {
        pixels: GrayImage,
    }

    impl QrImage {
        pub fn width(&self) -> u32 {
            self.pixels.width()
        }

        pub fn height(&self) -> u32 {
            self.pixels.height()
        }

        pub fn to_png(&self) -> Result<Vec<u8>> {
            let mut bytes = Vec::new();
            self.pixels
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
            Ok(bytes)
        }
    }

    impl QrEncoder {
        /// Encodes `link` at medium error correction in the smallest version
        /// that fits. `Ok(None)` never happens with the backend compiled in.
        /// Out-of-range settings are rejected before any pixel is allocated.
        pub fn encode(&self, link: &str) -> Result<Option<QrImage>> {
            self.settings.validate()?;
            let code = QrCode::with_error_correction_level(link.as_bytes(), EcLevel::M)?;
            let modules = code.width() as u32;
            let QrSettings { box_size, border } = self.settings;
            let side = (modules + 2 * border) * box_size;

            tracing::debug!(
                "QR {:?}: {} modules, {}px per module, {} px image",
                code.version(),
                modules,
                box_size,
                side
            );

            let pixels = GrayImage::from_fn(side, side, |x, y| {
                let (mx, my) = (x / box_size, y / box_size);
                if mx < border || my < border || mx >= border + modules || my >= border + modules
                {
                    return LIGHT;
                }
                match code[((mx - border) as usize, (my - border) as usize)] {
                    Color::Dark => DARK,
                    Color::Light => LIGHT,
                }
            });

            Ok(Some(QrImage { pixels }))
        }
    }
}

#[cfg(feature = "qr")]
pub use backend::QrImage;

// Without the backend there is no image to hand out.
#[cfg(not(feature = "qr"))]
#[derive(Debug, Clone)]
pub struct QrImage {
    never: std::convert::Infallible,
}

#[cfg(not(feature = "qr"))]
impl QrImage {
    pub fn width(&self) -> u32 {
        match self.never {}
    }

    pub fn height(&self) -> u32 {
        match self.never {}
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        match self.never {}
    }
}

#[cfg(not(feature = "qr"))]
impl QrEncoder {
    pub fn encode(&self, _link: &str) -> Result<Option<QrImage>> {
        self.settings.validate()?;
        Ok(None)
    }
}
