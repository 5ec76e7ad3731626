//! Fuzz target for QR payload parsing and image sampling
//!
//! The backend may hand out any string as a QR payload. Whatever it is, the
//! console must either draw a code or show an error.
//!
//! # Invariants
//!
//! - Parsing never panics
//! - A successfully built matrix is square, at least version 1 sized
//! - Rendered lines all have the same width

#![no_main]

use libfuzzer_sys::fuzz_target;
use wabot_api::QrPayload;
use wabot_tui::QrMatrix;

fuzz_target!(|data: &[u8]| {
    let candidates = [
        QrPayload::parse(String::from_utf8_lossy(data)),
        QrPayload::DataUrl { mime: "image/png".into(), bytes: data.to_vec() },
    ];

    for payload in candidates {
        let Ok(matrix) = QrMatrix::from_payload(&payload) else {
            continue;
        };

        assert!(matrix.width() >= 21, "matrix narrower than version 1: {}", matrix.width());
        let lines = matrix.lines();
        let width = lines.first().map_or(0, |l| l.chars().count());
        assert!(lines.iter().all(|l| l.chars().count() == width), "ragged QR lines");
    }
});
