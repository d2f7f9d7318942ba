/// A fully resolved sRGB color with alpha
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const TRANSPARENT: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 0,
    };

    #[must_use]
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }
}

/// <https://drafts.csswg.org/css-color/#color-type>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    /// <https://drafts.csswg.org/css-color/#currentcolor-color>
    CurrentColor,
    Rgba(Rgba),
}

impl Color {
    /// Substitute `currentColor` with the value of the `color` property
    #[must_use]
    pub fn resolve_against(&self, current_color: Rgba) -> Rgba {
        match self {
            Self::CurrentColor => current_color,
            Self::Rgba(rgba) => *rgba,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::Rgba(Rgba::BLACK)
    }
}

impl From<Rgba> for Color {
    fn from(value: Rgba) -> Self {
        Self::Rgba(value)
    }
}
