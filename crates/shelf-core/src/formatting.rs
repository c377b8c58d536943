/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use shelf_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// # Examples
///
/// ```
/// use shelf_core::formatting::percentage;
///
/// assert!((percentage(1, 3, 1) - 33.3).abs() < 1e-9);
/// assert_eq!(percentage(5, 0, 2), 0.0);
/// ```
pub fn percentage(part: u64, whole: u64, decimal_places: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = (part as f64 / whole as f64) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

/// `"1 book"`, `"3 books"`.
///
/// ```
/// use shelf_core::formatting::pluralize;
///
/// assert_eq!(pluralize(1, "book", "books"), "1 book");
/// assert_eq!(pluralize(2, "book", "books"), "2 books");
/// ```
pub fn pluralize(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", format_count(count), singular)
    } else {
        format!("{} {}", format_count(count), plural)
    }
}

/// Insert `,` every three digits from the right of a string of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
