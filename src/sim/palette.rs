//! Ball fill and border colors
//!
//! Fills are one reserved black plus evenly spaced hues. Borders come from a
//! fixed palette and never match the fill they are paired with.

use serde::{Deserialize, Serialize};

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Fully saturated color at 50% lightness
    pub fn from_hue(hue: u16) -> Self {
        let h = f32::from(hue % 360) / 60.0;
        let x = 1.0 - (h % 2.0 - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let to_u8 = |c: f32| (c * 255.0).round() as u8;
        Self::new(to_u8(r), to_u8(g), to_u8(b))
    }

    /// `#rrggbb`
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fill color of a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallColor {
    /// Reserved first color of every level
    Black,
    /// Hue in degrees on the color wheel
    Hue(u16),
}

impl BallColor {
    pub fn rgb(&self) -> Rgb {
        match self {
            BallColor::Black => Rgb::new(0, 0, 0),
            BallColor::Hue(h) => Rgb::from_hue(*h),
        }
    }

    pub fn to_css(&self) -> String {
        match self {
            BallColor::Black => "#000000".to_string(),
            BallColor::Hue(h) => format!("hsl({}, 100%, 50%)", h),
        }
    }

    /// Short token used in serialized board states
    pub fn key(&self) -> String {
        match self {
            BallColor::Black => "k".to_string(),
            BallColor::Hue(h) => h.to_string(),
        }
    }
}

/// Border colors in preference order
pub const BORDER_PALETTE: [Rgb; 12] = [
    Rgb::new(0xff, 0xff, 0xff), // white
    Rgb::new(0xff, 0xd7, 0x00), // gold
    Rgb::new(0x00, 0x00, 0x00), // black
    Rgb::new(0xff, 0x00, 0x00), // red
    Rgb::new(0x00, 0xff, 0xff), // cyan
    Rgb::new(0xff, 0x00, 0xff), // magenta
    Rgb::new(0xc0, 0xc0, 0xc0), // silver
    Rgb::new(0x00, 0x00, 0x80), // navy
    Rgb::new(0x00, 0xff, 0x00), // lime
    Rgb::new(0xff, 0xa5, 0x00), // orange
    Rgb::new(0x80, 0x00, 0x80), // purple
    Rgb::new(0x00, 0x80, 0x80), // teal
];

/// `count` distinct fills: black first, then `count - 1` evenly spaced hues
pub fn generate_colors(count: usize) -> Vec<BallColor> {
    if count == 0 {
        return Vec::new();
    }
    let hues = count - 1;
    let mut colors = Vec::with_capacity(count);
    colors.push(BallColor::Black);
    for i in 0..hues {
        colors.push(BallColor::Hue((i * 360 / hues) as u16));
    }
    colors
}

/// One border per position, starting at `BORDER_PALETTE[i]` and skipping
/// forward (wrapping) past entries equal to that position's fill or already
/// taken by an earlier position.
///
/// Once the palette is exhausted borders repeat; they still never match
/// their own fill.
pub fn generate_borders(count: usize, colors: &[BallColor]) -> Vec<Rgb> {
    let len = BORDER_PALETTE.len();
    let mut borders: Vec<Rgb> = Vec::with_capacity(count);
    for i in 0..count {
        let start = i % len;
        let fill = colors.get(i).map(BallColor::rgb);
        let mut candidates = (0..len)
            .map(|offset| BORDER_PALETTE[(start + offset) % len])
            .filter(|border| Some(*border) != fill);
        let border = candidates
            .clone()
            .find(|border| !borders.contains(border))
            .or_else(|| candidates.next())
            .unwrap_or(BORDER_PALETTE[start]);
        borders.push(border);
    }
    borders
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generate_colors_black_first() {
        let colors = generate_colors(4);
        assert_eq!(
            colors,
            vec![
                BallColor::Black,
                BallColor::Hue(0),
                BallColor::Hue(120),
                BallColor::Hue(240)
            ]
        );
        assert!(generate_colors(0).is_empty());
        assert_eq!(generate_colors(1), vec![BallColor::Black]);
    }

    #[test]
    fn test_from_hue_primaries() {
        assert_eq!(Rgb::from_hue(0), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hue(120), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hue(180), Rgb::new(0, 255, 255));
        assert_eq!(Rgb::from_hue(240), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::new(255, 0, 16).to_css(), "#ff0010");
    }

    #[test]
    fn test_borders_skip_matching_fill() {
        // Position 2 prefers black, position 3 prefers red
        let colors = [
            BallColor::Black,
            BallColor::Black,
            BallColor::Black,
            BallColor::Hue(0),
        ];
        let borders = generate_borders(4, &colors);
        assert_eq!(borders[0], BORDER_PALETTE[0]);
        assert_eq!(borders[1], BORDER_PALETTE[1]);
        assert_eq!(borders[2], BORDER_PALETTE[3]);
        assert_eq!(borders[3], BORDER_PALETTE[4]);
    }

    #[test]
    fn test_borders_wrap_past_palette() {
        let borders = generate_borders(BORDER_PALETTE.len() + 1, &[]);
        assert_eq!(borders[BORDER_PALETTE.len()], BORDER_PALETTE[0]);
    }

    #[test]
    fn test_borders_distinct_at_every_level() {
        for tube_count in 4..=10 {
            let colors = generate_colors(tube_count - 1);
            let borders = generate_borders(colors.len(), &colors);
            for (i, a) in borders.iter().enumerate() {
                for (j, b) in borders.iter().enumerate().skip(i + 1) {
                    assert_ne!(
                        a, b,
                        "tube_count {}: positions {} and {} share a border",
                        tube_count, i, j
                    );
                }
            }
        }
    }

    #[test]
    fn test_borders_skip_taken_entry() {
        // Cyan fill at position 4 moves on to magenta, so position 5 must not take it
        let colors = generate_colors(7);
        assert_eq!(colors[4], BallColor::Hue(180));
        let borders = generate_borders(7, &colors);
        assert_eq!(borders[4], BORDER_PALETTE[5]);
        assert_eq!(borders[5], BORDER_PALETTE[6]);
    }

    proptest! {
        #[test]
        fn prop_colors_distinct(count in 1usize..40) {
            let colors = generate_colors(count);
            prop_assert_eq!(colors.len(), count);
            for (i, a) in colors.iter().enumerate() {
                for b in &colors[i + 1..] {
                    prop_assert_ne!(a, b);
                }
            }
        }

        #[test]
        fn prop_border_differs_from_fill(count in 1usize..40) {
            let colors = generate_colors(count);
            let borders = generate_borders(count, &colors);
            prop_assert_eq!(borders.len(), count);
            for (fill, border) in colors.iter().zip(&borders) {
                prop_assert_ne!(fill.rgb(), *border);
            }
        }
    }
}
