//! Human-readable byte sizes for bundle log lines.

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count with the largest fitting binary unit.
///
/// The scaled value is rounded to a whole number; zero is `0 Byte`.
///
/// # Examples
///
/// - `format_bytes(0)` -> `"0 Byte"`
/// - `format_bytes(512)` -> `"512 Bytes"`
/// - `format_bytes(1536)` -> `"2 KB"`
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Byte".to_string();
    }

    let mut unit = 0;
    let mut scale: u64 = 1;
    while unit + 1 < UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let value = (bytes as f64 / scale as f64).round();
    format!("{} {}", value, UNITS[unit])
}
