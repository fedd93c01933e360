//! CSS color parsing for the export path.
//!
//! The rasterizer only consumes sRGB forms: `#rgb`, `#rrggbb`, `rgb()`,
//! `rgba()`, `transparent` and a few named colors. `oklch()` values are
//! converted to sRGB through OKLab. Every other color space is unsupported
//! and normalizes to black.

/// Replacement for any color the export target cannot consume.
pub const FALLBACK_COLOR: &str = "rgb(0, 0, 0)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            let alpha = f32::from(self.a) / 255.0;
            format!("rgba({}, {}, {}, {alpha:.3})", self.r, self.g, self.b)
        }
    }
}

/// Outcome of normalizing one color value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorFix {
    /// Already consumable; left as is.
    Unchanged,
    /// Converted exactly (oklch → rgb).
    Converted(String),
    /// Unsupported; replaced with [`FALLBACK_COLOR`].
    Fallback,
}

/// Parses a color the rasterizer can paint. Returns `None` for anything else.
pub fn parse_srgb(value: &str) -> Option<Rgba> {
    let v = value.trim().to_ascii_lowercase();
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = function_args(&v, "rgba").or_else(|| function_args(&v, "rgb")) {
        return parse_rgb_args(args);
    }
    named(&v)
}

/// Decides how a style color must change before rasterization.
pub fn normalize(value: &str) -> ColorFix {
    if parse_srgb(value).is_some() {
        return ColorFix::Unchanged;
    }
    let lower = value.trim().to_ascii_lowercase();
    match function_args(&lower, "oklch").and_then(parse_oklch_args) {
        Some(rgba) => ColorFix::Converted(rgba.to_css()),
        None => ColorFix::Fallback,
    }
}

fn function_args<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    value
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn named(value: &str) -> Option<Rgba> {
    let rgba = match value {
        "transparent" => Rgba { r: 0, g: 0, b: 0, a: 0 },
        "black" => Rgba::opaque(0, 0, 0),
        "white" => Rgba::opaque(255, 255, 255),
        "red" => Rgba::opaque(255, 0, 0),
        "green" => Rgba::opaque(0, 128, 0),
        "blue" => Rgba::opaque(0, 0, 255),
        "gray" | "grey" => Rgba::opaque(128, 128, 128),
        _ => return None,
    };
    Some(rgba)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                out[i] = channel(&c.to_string())? * 17;
            }
            Some(Rgba::opaque(out[0], out[1], out[2]))
        }
        6 => Some(Rgba::opaque(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

/// Splits `a, b, c` or `a b c / d` argument lists.
fn split_args(args: &str) -> (Vec<&str>, Option<&str>) {
    let (main, alpha) = match args.split_once('/') {
        Some((m, a)) => (m, Some(a.trim())),
        None => (args, None),
    };
    let parts: Vec<&str> = main
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    (parts, alpha)
}

fn parse_number(s: &str) -> Option<f32> {
    s.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// A number or percentage; percentages are scaled so that `100%` equals `full`.
fn parse_scaled(s: &str, full: f32) -> Option<f32> {
    match s.trim().strip_suffix('%') {
        Some(pct) => parse_number(pct).map(|p| p / 100.0 * full),
        None => parse_number(s),
    }
}

fn parse_alpha(s: Option<&str>) -> Option<u8> {
    match s {
        None => Some(255),
        Some(a) => parse_scaled(a, 1.0).map(|a| (a.clamp(0.0, 1.0) * 255.0).round() as u8),
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let (mut parts, mut alpha) = split_args(args);
    if parts.len() == 4 && alpha.is_none() {
        alpha = parts.pop();
    }
    if parts.len() != 3 {
        return None;
    }
    let mut ch = [0u8; 3];
    for (slot, part) in ch.iter_mut().zip(&parts) {
        *slot = parse_scaled(part, 255.0)?.clamp(0.0, 255.0).round() as u8;
    }
    Some(Rgba {
        r: ch[0],
        g: ch[1],
        b: ch[2],
        a: parse_alpha(alpha)?,
    })
}

fn parse_oklch_args(args: &str) -> Option<Rgba> {
    let (parts, alpha) = split_args(args);
    if parts.len() != 3 {
        return None;
    }
    let l = parse_scaled(parts[0], 1.0)?;
    let c = parse_scaled(parts[1], 0.4)?;
    let h = parse_number(parts[2].trim_end_matches("deg"))?;
    let [r, g, b] = oklch_to_srgb(l, c, h);
    Some(Rgba {
        r,
        g,
        b,
        a: parse_alpha(alpha)?,
    })
}

/// OKLCH → OKLab → linear sRGB → gamma-encoded sRGB, clamped into gamut.
pub fn oklch_to_srgb(l: f32, c: f32, hue_deg: f32) -> [u8; 3] {
    let (l, c, h) = (f64::from(l), f64::from(c), f64::from(hue_deg).to_radians());
    let a = c * h.cos();
    let b = c * h.sin();

    let l_ = l + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
    let m_ = l - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
    let s_ = l - 0.089_484_177_5 * a - 1.291_485_548_0 * b;
    let (l3, m3, s3) = (l_.powi(3), m_.powi(3), s_.powi(3));

    let linear = [
        4.076_741_662_1 * l3 - 3.307_711_591_3 * m3 + 0.230_969_929_2 * s3,
        -1.268_438_004_6 * l3 + 2.609_757_401_1 * m3 - 0.341_319_396_5 * s3,
        -0.004_196_086_3 * l3 - 0.703_418_614_7 * m3 + 1.707_614_701_0 * s3,
    ];

    linear.map(|v| {
        let v = v.clamp(0.0, 1.0);
        let encoded = if v <= 0.003_130_8 {
            12.92 * v
        } else {
            1.055 * v.powf(1.0 / 2.4) - 0.055
        };
        (encoded * 255.0).round().clamp(0.0, 255.0) as u8
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_srgb_forms() {
        assert_eq!(parse_srgb("#fff"), Some(Rgba::opaque(255, 255, 255)));
        assert_eq!(parse_srgb("#1D4ED8"), Some(Rgba::opaque(29, 78, 216)));
        assert_eq!(parse_srgb("rgb(29, 78, 216)"), Some(Rgba::opaque(29, 78, 216)));
        assert_eq!(parse_srgb("rgb(29 78 216)"), Some(Rgba::opaque(29, 78, 216)));
        assert_eq!(
            parse_srgb("rgba(0, 0, 0, 0.5)").map(|c| c.a),
            Some(128)
        );
        assert_eq!(parse_srgb("transparent").map(|c| c.a), Some(0));
        assert_eq!(parse_srgb("oklch(50% 0.1 200)"), None);
        assert_eq!(parse_srgb("#12345"), None);
    }

    #[test]
    fn test_oklch_converts_to_rgb() {
        // Tailwind gray-900.
        assert_eq!(
            normalize("oklch(21% 0.034 264.665)"),
            ColorFix::Converted("rgb(16, 24, 40)".to_string())
        );
        assert_eq!(
            normalize("oklch(0.62796 0.25768 29.23389)"),
            ColorFix::Converted("rgb(255, 0, 0)".to_string())
        );
    }

    #[test]
    fn test_oklch_extremes() {
        assert_eq!(oklch_to_srgb(1.0, 0.0, 0.0), [255, 255, 255]);
        assert_eq!(oklch_to_srgb(0.0, 0.0, 0.0), [0, 0, 0]);
    }

    #[test]
    fn test_oklch_alpha_kept() {
        match normalize("oklch(100% 0 0 / 50%)") {
            ColorFix::Converted(css) => assert!(css.starts_with("rgba(255, 255, 255, 0.5")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_spaces_fall_back() {
        for value in ["lab(50% 40 59)", "lch(52% 72 56)", "oklab(0.5 0.1 0.1)", "color(display-p3 1 0 0)", "oklch(oops)", "bogus"] {
            assert_eq!(normalize(value), ColorFix::Fallback, "{value}");
        }
    }

    #[test]
    fn test_srgb_values_unchanged() {
        assert_eq!(normalize("rgb(0, 0, 0)"), ColorFix::Unchanged);
        assert_eq!(normalize("#ffffff"), ColorFix::Unchanged);
    }
}
