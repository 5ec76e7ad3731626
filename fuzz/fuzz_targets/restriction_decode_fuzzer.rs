//! Fuzz target for restriction row decoding
//!
//! Rows must carry exactly one of `restriction` and `restrictionNumber`.
//!
//! # Invariants
//!
//! - Decoding never panics, malformed rows are errors
//! - A decoded row encodes back to the same row

#![no_main]

use libfuzzer_sys::fuzz_target;
use wabot_api::Restriction;

fuzz_target!(|data: &[u8]| {
    let Ok(rows) = serde_json::from_slice::<Vec<Restriction>>(data) else {
        return;
    };

    for row in rows {
        let encoded = serde_json::to_value(&row).expect("decoded row must encode");
        let decoded: Restriction =
            serde_json::from_value(encoded).expect("encoded row must decode");
        assert_eq!(decoded, row);
    }
});
