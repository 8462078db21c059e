//! Color parsing and canonical hex form.
//!
//! Every color that enters a scene document is normalized to lowercase hex
//! (`#rrggbb`, or `#rrggbbaa` when not fully opaque). The live scene may hold
//! named colors, short hex or `rgb()` notation; the document never does.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Failure to understand a color string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognised color '{input}'")]
pub struct ColorParseError {
    /// The rejected input.
    pub input: String,
}

/// RGBA color stored in canonical form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("black", [0x00, 0x00, 0x00, 0xff]),
    ("white", [0xff, 0xff, 0xff, 0xff]),
    ("red", [0xff, 0x00, 0x00, 0xff]),
    ("lime", [0x00, 0xff, 0x00, 0xff]),
    ("green", [0x00, 0x80, 0x00, 0xff]),
    ("blue", [0x00, 0x00, 0xff, 0xff]),
    ("yellow", [0xff, 0xff, 0x00, 0xff]),
    ("cyan", [0x00, 0xff, 0xff, 0xff]),
    ("aqua", [0x00, 0xff, 0xff, 0xff]),
    ("magenta", [0xff, 0x00, 0xff, 0xff]),
    ("fuchsia", [0xff, 0x00, 0xff, 0xff]),
    ("silver", [0xc0, 0xc0, 0xc0, 0xff]),
    ("gray", [0x80, 0x80, 0x80, 0xff]),
    ("grey", [0x80, 0x80, 0x80, 0xff]),
    ("maroon", [0x80, 0x00, 0x00, 0xff]),
    ("olive", [0x80, 0x80, 0x00, 0xff]),
    ("purple", [0x80, 0x00, 0x80, 0xff]),
    ("teal", [0x00, 0x80, 0x80, 0xff]),
    ("navy", [0x00, 0x00, 0x80, 0xff]),
    ("orange", [0xff, 0xa5, 0x00, 0xff]),
    ("pink", [0xff, 0xc0, 0xcb, 0xff]),
    ("brown", [0xa5, 0x2a, 0x2a, 0xff]),
    ("transparent", [0x00, 0x00, 0x00, 0x00]),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    /// Opaque color from components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse any accepted notation
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        let parsed = if let Some(hex) = lower.strip_prefix('#') {
            parse_hex(hex)
        } else if let Some(args) = function_args(&lower, "rgba") {
            parse_rgb_function(args, true)
        } else if let Some(args) = function_args(&lower, "rgb") {
            parse_rgb_function(args, false)
        } else {
            NAMED_COLORS
                .iter()
                .find(|(name, _)| *name == lower)
                .map(|(_, [r, g, b, a])| Color {
                    r: *r,
                    g: *g,
                    b: *b,
                    a: *a,
                })
        };

        parsed.ok_or_else(|| ColorParseError {
            input: input.to_string(),
        })
    }

    /// Parse, falling back to `default` with a warning
    pub fn parse_or(input: Option<&str>, default: Color) -> Self {
        match input {
            None => default,
            Some(raw) => Self::parse(raw).unwrap_or_else(|err| {
                tracing::warn!("{}, using {}", err, default.to_hex());
                default
            }),
        }
    }

    /// Canonical lowercase hex form
    pub fn to_hex(&self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color {
            r: nibble(0)?,
            g: nibble(1)?,
            b: nibble(2)?,
            a: nibble(3)?,
        }),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: byte(6)?,
        }),
        _ => None,
    }
}

fn function_args<'a>(input: &'a str, name: &str) -> Option<&'a str> {
    input
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rgb_function(args: &str, with_alpha: bool) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let value: f64 = s.parse().ok()?;
        (0.0..=255.0)
            .contains(&value)
            .then(|| value.round() as u8)
    };

    let a = if with_alpha {
        let alpha: f64 = parts[3].parse().ok()?;
        if !(0.0..=1.0).contains(&alpha) {
            return None;
        }
        (alpha * 255.0).round() as u8
    } else {
        0xff
    };

    Some(Color {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a,
    })
}
