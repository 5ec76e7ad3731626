//! QR code rendering.
//!
//! The backend hands out either raw pairing data, which is encoded here, or a
//! pre-rendered image, which is sampled back into a module grid. Both end up
//! as a [`QrMatrix`] drawn with half-block characters, two module rows per
//! terminal line.

use image::GrayImage;
use qrcode::{Color, QrCode};
use thiserror::Error;
use wabot_api::QrPayload;
use wabot_app::{App, ConnectionState};

/// Light border required around the code for scanners to lock on.
const QUIET_ZONE: usize = 4;

/// Luma values below this are dark modules.
const DARK_THRESHOLD: u8 = 128;

/// Finder patterns are seven modules wide.
const FINDER_MODULES: f64 = 7.0;

/// QR rendering errors.
#[derive(Debug, Error)]
pub enum QrError {
    /// Raw payload could not be encoded.
    #[error("cannot encode QR payload: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// Image payload could not be decoded.
    #[error("cannot decode QR image: {0}")]
    Image(#[from] image::ImageError),

    /// Image decoded but holds no recognisable code.
    #[error("no QR code found in image: {0}")]
    NotFound(&'static str),
}

/// Square grid of QR modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Build a matrix for either payload kind.
    pub fn from_payload(payload: &QrPayload) -> Result<Self, QrError> {
        match payload {
            QrPayload::Raw(data) => Self::encode(data),
            QrPayload::DataUrl { bytes, .. } => Self::sample(bytes),
        }
    }

    /// Encode raw pairing data.
    pub fn encode(data: &str) -> Result<Self, QrError> {
        let code = QrCode::new(data.as_bytes())?;
        let dark = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
        Ok(Self { width: code.width(), dark })
    }

    /// Recover the module grid from a rendered code image.
    ///
    /// The top-left finder pattern gives the module size, the top-right one
    /// gives the module count, then the centre of every module is sampled.
    pub fn sample(bytes: &[u8]) -> Result<Self, QrError> {
        let image = image::load_from_memory(bytes)?.to_luma8();
        let is_dark = |x: u32, y: u32| image.get_pixel(x, y).0[0] < DARK_THRESHOLD;

        let (x0, y0) = first_dark(&image, is_dark).ok_or(QrError::NotFound("image is blank"))?;
        let run = (x0..image.width()).take_while(|&x| is_dark(x, y0)).count();
        let module = run as f64 / FINDER_MODULES;
        if module < 1.0 {
            return Err(QrError::NotFound("finder pattern too small"));
        }

        let x1 = (x0..image.width()).rev().find(|&x| is_dark(x, y0)).unwrap_or(x0);
        let width = ((f64::from(x1 - x0 + 1)) / module).round() as usize;
        if !(21..=177).contains(&width) || (width - 17) % 4 != 0 {
            return Err(QrError::NotFound("module count is not a QR version"));
        }

        let centre = |origin: u32, index: usize, limit: u32| {
            let offset = ((index as f64 + 0.5) * module) as u32;
            (origin + offset).min(limit - 1)
        };
        let mut dark = Vec::with_capacity(width * width);
        for row in 0..width {
            let y = centre(y0, row, image.height());
            for col in 0..width {
                dark.push(is_dark(centre(x0, col, image.width()), y));
            }
        }
        Ok(Self { width, dark })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether module (`x`, `y`) is dark. Outside the grid is light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Half-block lines including the quiet zone.
    ///
    /// Dark modules are drawn as filled glyphs, so the lines must be shown
    /// dark-on-light.
    pub fn lines(&self) -> Vec<String> {
        let total = self.width + QUIET_ZONE * 2;
        let module = |x: usize, y: usize| {
            x >= QUIET_ZONE
                && y >= QUIET_ZONE
                && self.is_dark(x - QUIET_ZONE, y - QUIET_ZONE)
        };

        (0..total)
            .step_by(2)
            .map(|y| {
                (0..total)
                    .map(|x| match (module(x, y), module(x, y + 1)) {
                        (false, false) => ' ',
                        (true, true) => '\u{2588}',
                        (true, false) => '\u{2580}',
                        (false, true) => '\u{2584}',
                    })
                    .collect()
            })
            .collect()
    }
}

fn first_dark(image: &GrayImage, is_dark: impl Fn(u32, u32) -> bool) -> Option<(u32, u32)> {
    (0..image.height()).find_map(|y| (0..image.width()).find(|&x| is_dark(x, y)).map(|x| (x, y)))
}

/// Matrix for the QR code on screen, rebuilt only when the payload changes.
#[derive(Debug, Default)]
pub struct QrCache {
    source: Option<QrPayload>,
    matrix: Option<Result<QrMatrix, QrError>>,
}

impl QrCache {
    /// Sync with the payload the connection screen shows.
    pub fn refresh(&mut self, app: &App) {
        let payload = match app.connection().state() {
            ConnectionState::DisplayingQr { qr } => Some(qr),
            _ => None,
        };
        if self.source.as_ref() == payload {
            return;
        }

        self.source = payload.cloned();
        self.matrix = payload.map(|qr| {
            let matrix = QrMatrix::from_payload(qr);
            if let Err(e) = &matrix {
                tracing::warn!(error = %e, "failed to render QR code");
            }
            matrix
        });
    }

    /// Matrix for the displayed payload, if one is displayed.
    pub fn matrix(&self) -> Option<&Result<QrMatrix, QrError>> {
        self.matrix.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageOutputFormat, Luma};

    use super::*;

    /// Render `matrix` as a PNG with `scale` pixels per module.
    fn png(matrix: &QrMatrix, scale: u32) -> Vec<u8> {
        let quiet = QUIET_ZONE as u32;
        let side = (matrix.width() as u32 + quiet * 2) * scale;
        let image = GrayImage::from_fn(side, side, |x, y| {
            let (mx, my) = (x / scale, y / scale);
            let dark = mx >= quiet
                && my >= quiet
                && matrix.is_dark((mx - quiet) as usize, (my - quiet) as usize);
            Luma([if dark { 0 } else { 255 }])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn raw_payload_encodes_square_matrix() {
        let matrix = QrMatrix::encode("2@sim-pairing-1").unwrap();
        assert!(matrix.width() >= 21);
        // Top-left finder pattern corner
        assert!(matrix.is_dark(0, 0));
        assert!(matrix.is_dark(6, 6));
        assert!(!matrix.is_dark(7, 7));
    }

    #[test]
    fn sampled_image_matches_encoded_matrix() {
        let encoded = QrMatrix::encode("2@abcdef,ghijkl,mnopqr").unwrap();

        let sampled = QrMatrix::sample(&png(&encoded, 5)).unwrap();

        assert_eq!(sampled, encoded);
    }

    #[test]
    fn data_url_payload_is_sampled() {
        let encoded = QrMatrix::encode("pairing").unwrap();
        let payload = QrPayload::DataUrl { mime: "image/png".into(), bytes: png(&encoded, 3) };

        assert_eq!(QrMatrix::from_payload(&payload).unwrap(), encoded);
    }

    #[test]
    fn blank_image_is_rejected() {
        let blank = QrMatrix { width: 21, dark: vec![false; 21 * 21] };
        let result = QrMatrix::sample(&png(&blank, 2));
        assert!(matches!(result, Err(QrError::NotFound(_))));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(QrMatrix::sample(b"not an image"), Err(QrError::Image(_))));
    }

    #[test]
    fn lines_pack_two_rows_and_keep_quiet_zone() {
        let matrix = QrMatrix::encode("x").unwrap();
        let lines = matrix.lines();
        let total = matrix.width() + QUIET_ZONE * 2;

        assert_eq!(lines.len(), total.div_ceil(2));
        assert!(lines.iter().all(|l| l.chars().count() == total));
        assert!(lines[0].trim().is_empty());
        assert!(lines[QUIET_ZONE / 2].contains('\u{2588}'));
    }
}
