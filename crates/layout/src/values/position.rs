/// <https://drafts.csswg.org/css-position/#position-property>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    #[inline]
    #[must_use]
    pub const fn is_relative(&self) -> bool {
        matches!(self, Self::Relative)
    }

    /// `true` for any value other than `static`
    #[inline]
    #[must_use]
    pub const fn is_positioned(&self) -> bool {
        !matches!(self, Self::Static)
    }

    /// `true` for the position schemes this engine does not lay out
    #[inline]
    #[must_use]
    pub const fn is_out_of_flow(&self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed | Self::Sticky)
    }
}
