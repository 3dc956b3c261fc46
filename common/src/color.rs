//! sRGB colors as they travel through pet records and the customisation UI.

use std::fmt;
use std::str::FromStr;

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRgbError {
    input: String,
}

impl fmt::Display for ParseRgbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex color '{}'", self.input)
    }
}

impl std::error::Error for ParseRgbError {}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `#RGB` (leading `#` optional, case-insensitive).
    pub fn from_hex(input: &str) -> Result<Self, ParseRgbError> {
        let err = || ParseRgbError {
            input: input.to_string(),
        };
        let digits = input.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return Err(err());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        match digits.len() {
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |s: &str| channel(s).map(|v| v * 17);
                Ok(Self::new(
                    expand(&digits[0..1])?,
                    expand(&digits[1..2])?,
                    expand(&digits[2..3])?,
                ))
            }
            _ => Err(err()),
        }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build from hue in degrees, saturation and lightness in percent.
    pub fn from_hsl(hue_degrees: f32, saturation_pct: f32, lightness_pct: f32) -> Self {
        let h = hue_degrees.rem_euclid(360.0);
        let s = (saturation_pct / 100.0).clamp(0.0, 1.0);
        let l = (lightness_pct / 100.0).clamp(0.0, 1.0);
        let a = s * l.min(1.0 - l);
        let f = |n: f32| {
            let k = (n + h / 30.0) % 12.0;
            let value = l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0);
            (value * 255.0).round().clamp(0.0, 255.0) as u8
        };
        Self::new(f(0.0), f(8.0), f(4.0))
    }

    /// Push a color toward black (`brightness < 0.5`) or white (`> 0.5`).
    /// `0.5` leaves it untouched.
    pub fn with_brightness(self, brightness: f32) -> Self {
        let brightness = brightness.clamp(0.0, 1.0);
        let map = |c: u8| -> u8 {
            let c = c as f32;
            let out = if brightness < 0.5 {
                c * (brightness / 0.5)
            } else {
                let factor = (brightness - 0.5) / 0.5;
                c + (255.0 - c) * factor
            };
            out.floor().clamp(0.0, 255.0) as u8
        };
        Self::new(map(self.r), map(self.g), map(self.b))
    }

    /// Channels normalised to `[0, 1]`.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_forms() {
        assert_eq!(Rgb::from_hex("#008EFF").unwrap(), Rgb::new(0x00, 0x8E, 0xFF));
        assert_eq!(Rgb::from_hex("ffff00").unwrap(), Rgb::new(0xFF, 0xFF, 0x00));
        assert_eq!(Rgb::from_hex("#fa0").unwrap(), Rgb::new(0xFF, 0xAA, 0x00));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgb::from_hex("").is_err());
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert!(Rgb::from_hex("#ü0000").is_err());
    }

    #[test]
    fn test_hex_output_is_lowercase() {
        assert_eq!(Rgb::new(0xD5, 0xB6, 0xFB).to_hex(), "#d5b6fb");
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(Rgb::from_hsl(0.0, 100.0, 50.0), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsl(120.0, 100.0, 50.0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsl(240.0, 100.0, 50.0), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsl(480.0, 100.0, 50.0), Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_brightness_mid_is_identity() {
        let c = Rgb::new(10, 100, 200);
        assert_eq!(c.with_brightness(0.5), c);
        assert_eq!(c.with_brightness(1.0), Rgb::WHITE);
        assert_eq!(c.with_brightness(0.0), Rgb::new(0, 0, 0));
    }
}
