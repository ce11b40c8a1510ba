use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of entries in a pre-sampled gradient lookup table
pub const LUT_SIZE: usize = 256;

/// Plain 8-bit RGB colour, serialized as a `#rrggbb` hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or the short `#rgb` form
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        match hex.len() {
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            3 => {
                let r = channel(0..1)?;
                let g = channel(1..2)?;
                let b = channel(2..3)?;
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }

    /// Linear interpolation between two colours (t in 0..=1)
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or_else(|| format!("invalid colour '{}'", value))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

const EMBER_STOPS: [Rgb; 4] = [
    Rgb::new(0xFF, 0x77, 0x4D),
    Rgb::new(0xFF, 0xC6, 0xA8),
    Rgb::new(0x8C, 0x7B, 0xFF),
    Rgb::new(0x4D, 0xC3, 0xFF),
];

const DUSK_STOPS: [Rgb; 4] = [
    Rgb::new(0x2B, 0x3A, 0x8C),
    Rgb::new(0x8E, 0x44, 0xAD),
    Rgb::new(0xF3, 0x6F, 0x8F),
    Rgb::new(0xFF, 0xD1, 0x66),
];

const MONO_STOPS: [Rgb; 3] = [
    Rgb::new(0x55, 0x55, 0x55),
    Rgb::new(0xD4, 0xD4, 0xD4),
    Rgb::new(0xFF, 0xFF, 0xFF),
];

/// Ordered colour stops for the splash field gradient
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Palette {
    /// Warm studio orange fading into violet and cyan
    #[default]
    Ember,
    /// Evening blues and pinks
    Dusk,
    /// Greyscale
    Mono,
}

impl Palette {
    pub fn name(&self) -> &str {
        match self {
            Palette::Ember => "Ember",
            Palette::Dusk => "Dusk",
            Palette::Mono => "Mono",
        }
    }

    pub fn next(&self) -> Palette {
        match self {
            Palette::Ember => Palette::Dusk,
            Palette::Dusk => Palette::Mono,
            Palette::Mono => Palette::Ember,
        }
    }

    pub fn prev(&self) -> Palette {
        match self {
            Palette::Ember => Palette::Mono,
            Palette::Dusk => Palette::Ember,
            Palette::Mono => Palette::Dusk,
        }
    }

    /// Parse a palette name, falling back to the default
    pub fn parse(s: &str) -> Palette {
        match s.to_lowercase().as_str() {
            "dusk" => Palette::Dusk,
            "mono" | "grey" | "gray" => Palette::Mono,
            _ => Palette::Ember,
        }
    }

    /// Evenly spaced colour stops, first to last
    pub fn stops(&self) -> &'static [Rgb] {
        match self {
            Palette::Ember => &EMBER_STOPS,
            Palette::Dusk => &DUSK_STOPS,
            Palette::Mono => &MONO_STOPS,
        }
    }

    /// Sample the palette at t in 0..=1
    pub fn sample(&self, t: f32) -> Rgb {
        let stops = self.stops();
        if stops.len() == 1 {
            return stops[0];
        }
        let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
        let idx = (scaled.floor() as usize).min(stops.len() - 2);
        stops[idx].lerp(stops[idx + 1], scaled - idx as f32)
    }

    /// Pre-sample the gradient so per-particle lookups avoid interpolation
    pub fn build_lut(&self) -> ColorLut {
        let mut lut = [Rgb::new(0, 0, 0); LUT_SIZE];
        for (i, entry) in lut.iter_mut().enumerate() {
            *entry = self.sample(i as f32 / (LUT_SIZE - 1) as f32);
        }
        ColorLut(lut)
    }
}

/// Pre-sampled palette gradient
#[derive(Clone)]
pub struct ColorLut([Rgb; LUT_SIZE]);

impl ColorLut {
    pub fn get(&self, t: f32) -> Rgb {
        let idx = (t.clamp(0.0, 1.0) * (LUT_SIZE - 1) as f32).round() as usize;
        self.0[idx]
    }
}
