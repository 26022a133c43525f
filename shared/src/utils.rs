/// Clamps `value` into `[min, max]`.
///
/// Unlike `f32::clamp` this never panics: if `min > max` the result is `max`,
/// and a NaN input collapses to `min`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Splits a `0xRRGGBB` color into sRGB components in `[0, 1]`.
pub fn hex_to_rgb(color: u32) -> [f32; 3] {
    let [_, r, g, b] = color.to_be_bytes();
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}

/// Parses `#21896`, `0x021896` or `021896` style colors.
pub fn parse_hex_color(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
