//! src/util/humanize.rs

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Byte count as shown on file cards: the largest unit up to GB in which the
/// value is at least one, rounded to two decimals with trailing zeros dropped.
///
/// `0` is special-cased to `"0 Bytes"`.
#[must_use]
pub fn human_readable_size(size: u64) -> String {
    if size == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit_idx: usize = 0;
    let mut divisor: u64 = 1;

    while unit_idx < UNITS.len() - 1 && size / divisor >= 1024 {
        divisor *= 1024;
        unit_idx += 1;
    }

    let scaled: f64 = (size as f64 / divisor as f64 * 100.0).round() / 100.0;

    format!("{} {}", scaled, UNITS[unit_idx])
}

/// Size of a staged upload in MB with two fixed decimals, e.g. `"0.05 MB"`.
#[must_use]
pub fn megabytes(size: u64) -> String {
    format!("{:.2} MB", size as f64 / 1024.0 / 1024.0)
}
