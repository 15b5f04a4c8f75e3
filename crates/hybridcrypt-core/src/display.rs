//! Small formatting helpers shared by the result panels and the performance view.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Render a byte count with 1024-based units, e.g. `1536` -> `1.5 KB`.
///
/// Values keep up to two decimals with trailing zeros removed. Negative values
/// (size deltas) keep their sign.
pub fn format_bytes(bytes: i64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let sign = if bytes < 0 { "-" } else { "" };
    let mut scaled = bytes.unsigned_abs() as f64;
    let mut exponent = 0;
    while scaled >= 1024.0 && exponent < UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }

    let mut value = format!("{scaled:.2}");
    if value.contains('.') {
        while value.ends_with('0') {
            value.pop();
        }
        if value.ends_with('.') {
            value.pop();
        }
    }

    format!("{sign}{value} {}", UNITS[exponent])
}

pub fn format_size(bytes: u64) -> String {
    format_bytes(i64::try_from(bytes).unwrap_or(i64::MAX))
}

/// `Ya` / `Tidak` flag used by the exchange summary.
pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Ya"
    } else {
        "Tidak"
    }
}

/// Elapsed seconds as shown in result panels: `Waktu: 0.0300s`.
pub fn elapsed_label(seconds: f64) -> String {
    format!("Waktu: {seconds:.4}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_use_binary_units_and_trim_zeros() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_234_567), "1.18 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn negative_deltas_keep_sign() {
        assert_eq!(format_bytes(-16), "-16 B");
        assert_eq!(format_bytes(-2048), "-2 KB");
    }

    #[test]
    fn labels() {
        assert_eq!(yes_no(true), "Ya");
        assert_eq!(yes_no(false), "Tidak");
        assert_eq!(elapsed_label(0.03), "Waktu: 0.0300s");
    }
}
