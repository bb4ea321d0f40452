// Color scales for bar fills and scatter symbols

use crate::data::GroupKey;
use plotters::style::RGBColor;

/// Light-to-dark blue ramp sampled at nine evenly spaced stops
const BLUES: [(u8, u8, u8); 9] = [
    (0xf7, 0xfb, 0xff),
    (0xde, 0xeb, 0xf7),
    (0xc6, 0xdb, 0xef),
    (0x9e, 0xca, 0xe1),
    (0x6b, 0xae, 0xd6),
    (0x42, 0x92, 0xc6),
    (0x21, 0x71, 0xb5),
    (0x08, 0x51, 0x9c),
    (0x08, 0x30, 0x6b),
];

/// Used for keys an ordinal scale does not know
const UNKNOWN: RGBColor = RGBColor(0x99, 0x99, 0x99);

#[derive(Debug, Clone, PartialEq)]
pub enum ColorScale {
    /// Continuous value → blue ramp over `domain`
    Sequential { domain: (f64, f64) },
    /// Category label → fixed color
    Ordinal { domain: Vec<String>, range: Vec<RGBColor> },
}

impl ColorScale {
    pub fn blues(max: f64) -> Self {
        ColorScale::Sequential { domain: (0.0, max) }
    }

    /// Easy / Intermediate / Difficult greens used by the trails dashboard
    pub fn difficulty() -> Self {
        ColorScale::Ordinal {
            domain: vec!["Easy".into(), "Intermediate".into(), "Difficult".into()],
            range: vec![
                RGBColor(0xa1, 0xd9, 0x9b),
                RGBColor(0x74, 0xc4, 0x76),
                RGBColor(0x23, 0x8b, 0x45),
            ],
        }
    }

    /// Replace the domain of a sequential scale; ordinal scales are left alone
    pub fn with_max(self, max: f64) -> Self {
        match self {
            ColorScale::Sequential { .. } => ColorScale::Sequential { domain: (0.0, max) },
            ordinal => ordinal,
        }
    }

    /// Color for an aggregated point: sequential scales look at the value, ordinal at the key
    pub fn color_for(&self, key: &GroupKey, value: f64) -> RGBColor {
        match self {
            ColorScale::Sequential { domain } => interpolate_blues(normalize(value, *domain)),
            ColorScale::Ordinal { domain, range } => {
                let label = key.label();
                domain
                    .iter()
                    .position(|d| *d == label)
                    .and_then(|idx| range.get(idx % range.len().max(1)))
                    .copied()
                    .unwrap_or(UNKNOWN)
            }
        }
    }

    /// Endpoint colors of a sequential scale, for legends
    pub fn gradient(&self) -> Option<(RGBColor, RGBColor)> {
        match self {
            ColorScale::Sequential { .. } => Some((interpolate_blues(0.0), interpolate_blues(1.0))),
            ColorScale::Ordinal { .. } => None,
        }
    }
}

fn normalize(value: f64, (d0, d1): (f64, f64)) -> f64 {
    if d1 == d0 {
        return 0.5;
    }
    ((value - d0) / (d1 - d0)).clamp(0.0, 1.0)
}

/// `t` in `[0, 1]` → color on the blue ramp
pub fn interpolate_blues(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let segments = (BLUES.len() - 1) as f64;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(BLUES.len() - 2);
    let frac = pos - i as f64;

    let (a, b) = (BLUES[i], BLUES[i + 1]);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Linear blend between two colors
pub fn mix(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}
