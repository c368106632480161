//! Pass colors.

use std::fmt;

/// An RGB color with each channel in `0..=255`.
///
/// Fields are private; the only constructor is [`rgb`], which rejects
/// out-of-range channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

/// Build a color from integer channels.
///
/// Returns `None` when any of `r`, `g`, `b` is outside `0..=255`.
///
/// ```
/// use pkpass::model::rgb;
///
/// assert_eq!(rgb(255, 128, 0).unwrap().to_string(), "rgb(255,128,0)");
/// assert!(rgb(256, 0, 0).is_none());
/// ```
pub fn rgb(r: i64, g: i64, b: i64) -> Option<RgbColor> {
    Some(RgbColor {
        red: u8::try_from(r).ok()?,
        green: u8::try_from(g).ok()?,
        blue: u8::try_from(b).ok()?,
    })
}

impl RgbColor {
    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    /// Parse the `rgb(R,G,B)` form produced by [`fmt::Display`].
    ///
    /// Whitespace around each channel is tolerated.
    pub fn parse(s: &str) -> Option<Self> {
        let inner = s.trim().strip_prefix("rgb(")?.strip_suffix(')')?;
        let mut channels = inner.split(',').map(|c| c.trim().parse::<i64>());
        let r = channels.next()?.ok()?;
        let g = channels.next()?.ok()?;
        let b = channels.next()?.ok()?;
        if channels.next().is_some() {
            return None;
        }
        rgb(r, g, b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.red, self.green, self.blue)
    }
}
