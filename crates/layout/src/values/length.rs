use crate::units::Subpixels;

/// <https://drafts.csswg.org/css-values/#percentage-value>
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Percentage(f32);

impl Percentage {
    pub const ZERO: Self = Self(0.);
    pub const HUNDRED: Self = Self(1.);

    /// Construct from a fraction, so `0.5` is `50%`
    #[must_use]
    pub const fn from_fraction(fraction: f32) -> Self {
        Self(fraction)
    }

    #[must_use]
    pub const fn as_fraction(&self) -> f32 {
        self.0
    }
}

/// A computed length or a percentage of a not-yet-known base
///
/// Lengths are fully absolute at computed-value time; percentages survive
/// until a containing block provides the base to resolve them against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LengthPercentage {
    Length(Subpixels),
    Percentage(Percentage),
}

impl LengthPercentage {
    pub const ZERO: Self = Self::Length(Subpixels::ZERO);

    #[must_use]
    pub const fn pixels(pixels: i32) -> Self {
        Self::Length(Subpixels::from_pixels(pixels))
    }

    /// Resolve a possible percentage against the given base length
    #[must_use]
    pub fn resolve_against(&self, base: Subpixels) -> Subpixels {
        match self {
            Self::Length(length) => *length,
            Self::Percentage(percentage) => {
                Subpixels((base.0 as f32 * percentage.as_fraction()) as i32)
            },
        }
    }

    /// Resolve against a base that may not be known yet
    ///
    /// Percentages of an unknown base have no value; lengths always do.
    #[must_use]
    pub fn try_resolve_against(&self, base: Option<Subpixels>) -> Option<Subpixels> {
        match self {
            Self::Length(length) => Some(*length),
            Self::Percentage(_) => base.map(|base| self.resolve_against(base)),
        }
    }
}

impl Default for LengthPercentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Subpixels> for LengthPercentage {
    fn from(value: Subpixels) -> Self {
        Self::Length(value)
    }
}

/// <https://drafts.csswg.org/css2/#min-max-widths>
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MaxSize {
    /// No upper bound on the size
    #[default]
    None,
    LengthPercentage(LengthPercentage),
}

impl MaxSize {
    #[must_use]
    pub const fn pixels(pixels: i32) -> Self {
        Self::LengthPercentage(LengthPercentage::pixels(pixels))
    }

    /// Resolve to a concrete bound, mapping `none` to the largest
    /// representable length
    #[must_use]
    pub fn resolve_against(&self, base: Subpixels) -> Subpixels {
        match self {
            Self::None => Subpixels::MAX,
            Self::LengthPercentage(value) => value.resolve_against(base),
        }
    }
}
