//! Fuzz target for column name cleaning.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sifter::transform::{clean_colname, MAX_COLUMN_NAME_LEN};

fuzz_target!(|data: &[u8]| {
    let Ok(label) = std::str::from_utf8(data) else {
        return;
    };

    let cleaned = clean_colname(label);
    assert!(!cleaned.is_empty());
    assert!(cleaned.len() <= MAX_COLUMN_NAME_LEN);
    assert!(cleaned
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_'));
    assert_eq!(clean_colname(&cleaned), cleaned);
});
