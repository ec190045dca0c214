// src/color.rs

//! Defines the packed pixel `Color`, the 16-entry ANSI palette (`NamedColor`)
//! and the text forms both accept in configuration files.
//!
//! Pixels are packed as ABGR8888: `a << 24 | b << 16 | g << 8 | r`. Written out as
//! little-endian bytes that is `[r, g, b, a]`, the layout the presentation
//! surfaces consume without a conversion step.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single pixel value: four 8-bit channels packed into a `u32`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color::opaque(0, 0, 0);
    pub const WHITE: Color = Color::opaque(255, 255, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    /// Packs four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_le_bytes([r, g, b, a]))
    }

    /// Packs a fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Reinterprets an already packed ABGR8888 value.
    pub const fn from_packed(packed: u32) -> Self {
        Self(packed)
    }

    /// The packed ABGR8888 value.
    pub const fn packed(self) -> u32 {
        self.0
    }

    pub const fn r(self) -> u8 {
        self.to_bytes()[0]
    }

    pub const fn g(self) -> u8 {
        self.to_bytes()[1]
    }

    pub const fn b(self) -> u8 {
        self.to_bytes()[2]
    }

    pub const fn a(self) -> u8 {
        self.to_bytes()[3]
    }

    /// Channels in memory order: `[r, g, b, a]`.
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r(), self.g(), self.b(), a)
    }

    pub const fn is_opaque(self) -> bool {
        self.a() == 255
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Color({}, {}, {}, {})",
            self.r(),
            self.g(),
            self.b(),
            self.a()
        )
    }
}

impl fmt::Display for Color {
    /// Formats as `#RRGGBBAA`, the same form `FromStr` accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.r(),
            self.g(),
            self.b(),
            self.a()
        )
    }
}

impl From<[u8; 4]> for Color {
    fn from(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }
}

impl From<NamedColor> for Color {
    fn from(named: NamedColor) -> Self {
        named.to_color()
    }
}

/// Error returned when a color string is neither hex nor a palette name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseColorError {
    #[error("expected #RRGGBB or #RRGGBBAA, got {0:?}")]
    BadHex(String),
    #[error("unknown color name {0:?}")]
    UnknownName(String),
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts `#RRGGBB`, `#RRGGBBAA` or a palette name such as `bright_blue`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(hex) = s.strip_prefix('#') else {
            return NamedColor::from_name(s)
                .map(NamedColor::to_color)
                .ok_or_else(|| ParseColorError::UnknownName(s.to_string()));
        };

        let bad = || ParseColorError::BadHex(s.to_string());
        if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Standard ANSI named colors (indices 0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum NamedColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
    BrightBlack = 8,
    BrightRed = 9,
    BrightGreen = 10,
    BrightYellow = 11,
    BrightBlue = 12,
    BrightMagenta = 13,
    BrightCyan = 14,
    BrightWhite = 15,
}

impl NamedColor {
    /// Every palette entry, in index order.
    pub const ALL: [NamedColor; 16] = [
        NamedColor::Black,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Yellow,
        NamedColor::Blue,
        NamedColor::Magenta,
        NamedColor::Cyan,
        NamedColor::White,
        NamedColor::BrightBlack,
        NamedColor::BrightRed,
        NamedColor::BrightGreen,
        NamedColor::BrightYellow,
        NamedColor::BrightBlue,
        NamedColor::BrightMagenta,
        NamedColor::BrightCyan,
        NamedColor::BrightWhite,
    ];

    /// Converts a palette index (0-15). Returns `None` past the end.
    pub fn from_index(idx: u8) -> Option<Self> {
        Self::ALL.get(usize::from(idx)).copied()
    }

    /// Opaque color for this palette entry.
    pub const fn to_color(self) -> Color {
        match self {
            NamedColor::Black => Color::opaque(0, 0, 0),
            NamedColor::Red => Color::opaque(205, 49, 49),
            NamedColor::Green => Color::opaque(13, 188, 121),
            NamedColor::Yellow => Color::opaque(229, 229, 16),
            NamedColor::Blue => Color::opaque(36, 114, 200),
            NamedColor::Magenta => Color::opaque(188, 63, 188),
            NamedColor::Cyan => Color::opaque(17, 168, 205),
            NamedColor::White => Color::opaque(229, 229, 229),
            NamedColor::BrightBlack => Color::opaque(102, 102, 102),
            NamedColor::BrightRed => Color::opaque(241, 76, 76),
            NamedColor::BrightGreen => Color::opaque(35, 209, 139),
            NamedColor::BrightYellow => Color::opaque(245, 245, 67),
            NamedColor::BrightBlue => Color::opaque(59, 142, 234),
            NamedColor::BrightMagenta => Color::opaque(214, 112, 214),
            NamedColor::BrightCyan => Color::opaque(41, 184, 219),
            NamedColor::BrightWhite => Color::opaque(255, 255, 255),
        }
    }

    /// Looks a palette entry up by name. Case and `_`/`-` separators are ignored,
    /// so `BrightRed`, `bright_red` and `bright-red` all match.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|named| format!("{named:?}").to_ascii_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn packing_is_abgr8888() {
        let c = Color::new(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.packed(), 0x4433_2211);
        assert_eq!(c.to_bytes(), [0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn palette_matches_packed_constants() {
        assert_eq!(NamedColor::Black.to_color().packed(), 0xFF00_0000);
        assert_eq!(NamedColor::Red.to_color().packed(), 0xFF31_31CD);
        assert_eq!(NamedColor::Green.to_color().packed(), 0xFF79_BC0D);
        assert_eq!(NamedColor::Blue.to_color().packed(), 0xFFC8_7224);
        assert!(NamedColor::ALL.iter().all(|n| n.to_color().is_opaque()));
    }

    #[test]
    fn from_index_rejects_out_of_range() {
        assert_eq!(NamedColor::from_index(9), Some(NamedColor::BrightRed));
        assert_eq!(NamedColor::from_index(16), None);
    }

    #[test]
    fn parses_hex_and_names() {
        assert_eq!("#FF8000".parse::<Color>(), Ok(Color::opaque(255, 128, 0)));
        assert_eq!(
            "#ff800040".parse::<Color>(),
            Ok(Color::new(255, 128, 0, 0x40))
        );
        assert_eq!(
            "bright-blue".parse::<Color>(),
            Ok(NamedColor::BrightBlue.to_color())
        );
        assert!(matches!(
            "#12345".parse::<Color>(),
            Err(ParseColorError::BadHex(_))
        ));
        assert!(matches!(
            "mauve".parse::<Color>(),
            Err(ParseColorError::UnknownName(_))
        ));
    }

    #[test]
    fn sign_characters_are_not_hex_digits() {
        for text in ["#+F+F+F", "#-1FFFF", "#FF FF0", "#+FFFFFFF"] {
            assert!(
                matches!(text.parse::<Color>(), Err(ParseColorError::BadHex(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn serializes_as_hex_string() {
        let c = Color::new(1, 2, 3, 4);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#01020304\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        let named: Color = serde_json::from_str("\"cyan\"").unwrap();
        assert_eq!(named, NamedColor::Cyan.to_color());
    }

    proptest! {
        #[test]
        fn prop_pack_unpack_roundtrip(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), a in any::<u8>()) {
            let c = Color::new(r, g, b, a);
            prop_assert_eq!((c.r(), c.g(), c.b(), c.a()), (r, g, b, a));
            prop_assert_eq!(Color::from_packed(c.packed()), c);
            prop_assert_eq!(Color::from(c.to_bytes()), c);
        }
    }
}
