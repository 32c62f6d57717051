/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = group_thousands(int_part);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }

    // "-0.00" reads as noise on a chart label.
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{}", out)
    } else {
        out
    }
}

/// Energy with two decimals and unit, e.g. `"1,234.50 kWh"`.
///
/// ```
/// use dashboard_core::formatting::format_kwh;
///
/// assert_eq!(format_kwh(1234.5), "1,234.50 kWh");
/// ```
pub fn format_kwh(kwh: f64) -> String {
    format!("{} kWh", format_number(kwh, 2))
}

/// Temperature with one decimal, e.g. `"-5.0 °C"`.
pub fn format_temperature(celsius: f64) -> String {
    format!("{} °C", format_number(celsius, 1))
}

/// Daylight duration with one decimal, e.g. `"16.2 h"`.
pub fn format_hours(hours: f64) -> String {
    format!("{} h", format_number(hours, 1))
}

/// Compact axis tick: `12.3k` above a thousand, otherwise no decimals.
pub fn format_compact(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

/// Insert `,` every three digits from the right.
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
