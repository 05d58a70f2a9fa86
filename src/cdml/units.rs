//! Coordinate strings. Documents store centimetres; older files and other
//! producers also use millimetres, inches, points and pixels.

const CM_PER_INCH: f64 = 2.54;
const PX_PER_INCH: f64 = 72.0;

/// Parses `"1.5cm"`, `"3mm"`, `"0.2in"`, `"12pt"`, `"40px"` or a bare
/// number (taken as centimetres) into centimetres.
pub fn parse_length(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let factor = match unit {
        "" | "cm" => 1.0,
        "mm" => 0.1,
        "in" => CM_PER_INCH,
        "pt" | "px" => CM_PER_INCH / PX_PER_INCH,
        _ => return None,
    };
    Some(value * factor)
}

pub fn format_length(cm: f64) -> String {
    format!("{cm}cm")
}
