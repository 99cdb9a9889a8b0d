/*!
 * Caption styling configuration.
 *
 * Colors are configured as `#RRGGBB` or `#RRGGBBAA` (AA is transparency,
 * `00` opaque, as the renderer expects) and emitted in the renderer's
 * `&HAABBGGRR` channel order.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CaptionError;

/// An RGB color with renderer-style transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaptionColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Transparency, 0 = opaque, 255 = invisible
    pub alpha: u8,
}

impl CaptionColor {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Encode as `&HAABBGGRR`
    pub fn to_ass(&self) -> String {
        format!(
            "&H{:02X}{:02X}{:02X}{:02X}",
            self.alpha, self.blue, self.green, self.red
        )
    }

    fn hex_byte(text: &str, at: usize) -> Option<u8> {
        text.get(at..at + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    }
}

impl FromStr for CaptionColor {
    type Err = CaptionError;

    /// Accepts `#RRGGBB`, `#RRGGBBAA` or the renderer's own `&HAABBGGRR`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CaptionError::InvalidColor(s.to_string());
        let trimmed = s.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let red = Self::hex_byte(hex, 0).ok_or_else(invalid)?;
            let green = Self::hex_byte(hex, 2).ok_or_else(invalid)?;
            let blue = Self::hex_byte(hex, 4).ok_or_else(invalid)?;
            let alpha = if hex.len() == 8 {
                Self::hex_byte(hex, 6).ok_or_else(invalid)?
            } else {
                0
            };
            return Ok(Self::new(red, green, blue, alpha));
        }

        if let Some(hex) = trimmed.strip_prefix("&H").or_else(|| trimmed.strip_prefix("&h")) {
            if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let alpha = Self::hex_byte(hex, 0).ok_or_else(invalid)?;
            let blue = Self::hex_byte(hex, 2).ok_or_else(invalid)?;
            let green = Self::hex_byte(hex, 4).ok_or_else(invalid)?;
            let red = Self::hex_byte(hex, 6).ok_or_else(invalid)?;
            return Ok(Self::new(red, green, blue, alpha));
        }

        Err(invalid())
    }
}

impl TryFrom<String> for CaptionColor {
    type Error = CaptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CaptionColor> for String {
    fn from(color: CaptionColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for CaptionColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

/// Style of the single caption style block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    /// Font family
    pub font_name: String,

    /// Font size in points on the 1080x1920 canvas
    pub font_size: u32,

    /// Distance from the bottom edge in canvas pixels
    pub margin_vertical: u32,

    /// Left and right margins in canvas pixels
    pub margin_horizontal: u32,

    /// Outline (box padding with border style 3) width
    pub outline_width: f32,

    /// Shadow depth
    pub shadow_depth: f32,

    pub bold: bool,

    /// Numpad-style alignment, 2 = bottom center
    pub alignment: u8,

    /// Color of highlighted text
    pub primary_color: CaptionColor,

    /// Color of text not yet highlighted
    pub secondary_color: CaptionColor,

    pub outline_color: CaptionColor,

    /// Opaque box color behind the text
    pub background_color: CaptionColor,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_name: "DejaVu Sans".to_string(),
            font_size: 30,
            margin_vertical: 150,
            margin_horizontal: 70,
            outline_width: 3.0,
            shadow_depth: 0.6,
            bold: true,
            alignment: 2,
            primary_color: CaptionColor::new(0xFF, 0xFF, 0xFF, 0x00),
            secondary_color: CaptionColor::new(0xFF, 0xFF, 0xFF, 0x00),
            outline_color: CaptionColor::new(0x00, 0x00, 0x00, 0x80),
            // violet 8A2BE2, about a third opaque
            background_color: CaptionColor::new(0x8A, 0x2B, 0xE2, 0x55),
        }
    }
}
