// SPDX-License-Identifier: MIT OR Apache-2.0
//! Color parsing and formatting.
//!
//! Colors are interpolated as `[r, g, b, a]` with channels in `0..=255` and
//! alpha in `0..=1`. Formatting floors the color channels and emits
//! `rgba(r,g,b,a)`.

/// RGBA color as animated by color tracks
pub type Rgba = [f64; 4];

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aqua", [0, 255, 255]),
    ("black", [0, 0, 0]),
    ("blue", [0, 0, 255]),
    ("brown", [165, 42, 42]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkred", [139, 0, 0]),
    ("fuchsia", [255, 0, 255]),
    ("gold", [255, 215, 0]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("grey", [128, 128, 128]),
    ("indigo", [75, 0, 130]),
    ("lightblue", [173, 216, 230]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lime", [0, 255, 0]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("navy", [0, 0, 128]),
    ("olive", [128, 128, 0]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("steelblue", [70, 130, 180]),
    ("teal", [0, 128, 128]),
    ("tomato", [255, 99, 71]),
    ("violet", [238, 130, 238]),
    ("white", [255, 255, 255]),
    ("yellow", [255, 255, 0]),
];

/// Parse a CSS-style color expression.
///
/// Supports named colors, `transparent`, `#rgb`, `#rgba`, `#rrggbb`,
/// `#rrggbbaa`, `rgb()`, `rgba()`, `hsl()` and `hsla()`.
pub fn parse(text: &str) -> Option<Rgba> {
    let text: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    if text.is_empty() {
        return None;
    }

    if text == "transparent" {
        return Some([0.0, 0.0, 0.0, 0.0]);
    }

    if let Some((_, [r, g, b])) = NAMED_COLORS.iter().find(|(name, _)| *name == text) {
        return Some([f64::from(*r), f64::from(*g), f64::from(*b), 1.0]);
    }

    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }

    let open = text.find('(')?;
    let body = text[open + 1..].strip_suffix(')')?;
    let params: Vec<&str> = body.split(',').collect();

    match &text[..open] {
        "rgb" | "rgba" => {
            if params.len() != 3 && params.len() != 4 {
                return None;
            }
            let r = parse_channel(params[0])?;
            let g = parse_channel(params[1])?;
            let b = parse_channel(params[2])?;
            let a = match params.get(3) {
                Some(alpha) => parse_alpha(alpha)?,
                None => 1.0,
            };
            Some([r, g, b, a])
        }
        "hsl" | "hsla" => {
            if params.len() != 3 && params.len() != 4 {
                return None;
            }
            let h = params[0].trim_end_matches("deg").parse::<f64>().ok()?;
            let s = parse_percent(params[1])?;
            let l = parse_percent(params[2])?;
            let a = match params.get(3) {
                Some(alpha) => parse_alpha(alpha)?,
                None => 1.0,
            };
            let [r, g, b] = hsl_to_rgb(h, s, l);
            Some([r, g, b, a])
        }
        _ => None,
    }
}

/// Format an RGBA vector as `rgba(r,g,b,a)`, flooring the color channels
pub fn format(rgba: &[f64]) -> String {
    let channel = |i: usize| rgba.get(i).copied().unwrap_or(0.0).floor();
    let alpha = rgba.get(3).copied().unwrap_or(1.0);
    format!("rgba({},{},{},{})", channel(0), channel(1), channel(2), alpha)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(f64::from);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(f64::from);

    match hex.len() {
        3 => Some([digit(0)? * 17.0, digit(1)? * 17.0, digit(2)? * 17.0, 1.0]),
        4 => Some([
            digit(0)? * 17.0,
            digit(1)? * 17.0,
            digit(2)? * 17.0,
            digit(3)? / 15.0,
        ]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 1.0]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)? / 255.0]),
        _ => None,
    }
}

fn parse_channel(text: &str) -> Option<f64> {
    let value = match text.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().ok()? / 100.0 * 255.0,
        None => text.parse::<f64>().ok()?,
    };
    Some(value.round().clamp(0.0, 255.0))
}

fn parse_alpha(text: &str) -> Option<f64> {
    let value = match text.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().ok()? / 100.0,
        None => text.parse::<f64>().ok()?,
    };
    Some(value.clamp(0.0, 1.0))
}

fn parse_percent(text: &str) -> Option<f64> {
    let value = text.strip_suffix('%').unwrap_or(text).parse::<f64>().ok()?;
    Some((value / 100.0).clamp(0.0, 1.0))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    let h = h.rem_euclid(360.0) / 360.0;
    let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let m1 = l * 2.0 - m2;
    [
        (hue_to_channel(m1, m2, h + 1.0 / 3.0) * 255.0).round(),
        (hue_to_channel(m1, m2, h) * 255.0).round(),
        (hue_to_channel(m1, m2, h - 1.0 / 3.0) * 255.0).round(),
    ]
}

fn hue_to_channel(m1: f64, m2: f64, h: f64) -> f64 {
    let h = h.rem_euclid(1.0);
    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse("#000000"), Some([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse("#fff"), Some([255.0, 255.0, 255.0, 1.0]));
        assert_eq!(parse("#FF000080"), Some([255.0, 0.0, 0.0, 128.0 / 255.0]));
        assert_eq!(parse("#12"), None);
        assert_eq!(parse("#zzzzzz"), None);
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(parse("rgb(10, 20, 30)"), Some([10.0, 20.0, 30.0, 1.0]));
        assert_eq!(parse("rgba(10,20,30,0.5)"), Some([10.0, 20.0, 30.0, 0.5]));
        assert_eq!(parse("rgb(100%, 0%, 0%)"), Some([255.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse("rgba(300, 0, 0, 2)"), Some([255.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse("rgb(1, 2)"), None);
    }

    #[test]
    fn test_parse_hsl() {
        assert_eq!(parse("hsl(0, 100%, 50%)"), Some([255.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse("hsla(120, 100%, 50%, 0.25)"), Some([0.0, 255.0, 0.0, 0.25]));
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse("Red"), Some([255.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse("transparent"), Some([0.0, 0.0, 0.0, 0.0]));
        assert_eq!(parse("not-a-color"), None);
        assert_eq!(parse("left"), None);
    }

    #[test]
    fn test_format_floors_channels() {
        assert_eq!(format(&[127.5, 127.9, 0.2, 1.0]), "rgba(127,127,0,1)");
        assert_eq!(format(&[255.0, 0.0, 0.0, 0.5]), "rgba(255,0,0,0.5)");
    }
}
