/// <https://drafts.csswg.org/css-display/#the-display-properties>
///
/// Only the CSS 2.2 subset relevant to block and inline formatting is
/// supported; table display types are rejected upstream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    Block,
    #[default]
    Inline,
    InlineBlock,
    None,
}

impl Display {
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// `true` for boxes that participate in an inline formatting context
    #[inline]
    #[must_use]
    pub const fn is_inline_level(&self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock)
    }

    /// The display of the root box
    ///
    /// CSS 2.2 §9.7: the root's display computes to `block` for any
    /// in-flow value.
    #[must_use]
    pub const fn used_value_for_root(&self) -> Self {
        match self {
            Self::None => Self::None,
            _ => Self::Block,
        }
    }
}

/// <https://drafts.csswg.org/css2/#propdef-float>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

impl Float {
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
