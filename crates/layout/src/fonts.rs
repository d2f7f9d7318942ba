//! Contract with the text shaping collaborator
//!
//! All measurements cross this boundary in 26.6 fixed point font units
//! (1/64ths of a pixel); [Subpixels::from_font_units](crate::units::Subpixels::from_font_units)
//! converts them into layout units.

/// Identifies a font held by the collaborator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// A glyph index within a particular font
///
/// Index 0 conventionally names the missing-glyph; the inline formatting
/// context escapes it in its stream encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphId(pub u16);

/// One glyph produced by shaping
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapedGlyph {
    pub glyph: GlyphId,
}

/// Horizontal extents of a single glyph, in 26.6 fixed point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphExtents {
    pub x_bearing: i32,
    pub width: i32,
}

/// Horizontal line metrics of a font, in 26.6 fixed point
///
/// `descender` is negative for fonts that extend below the baseline,
/// matching the usual sfnt convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FontExtents {
    pub ascender: i32,
    pub descender: i32,
    pub line_gap: i32,
}

/// The text shaping and font metrics collaborator
///
/// Calls are synchronous and must be reentrant-safe per inline formatting
/// context; the engine never caches results across layout passes.
pub trait FontSource {
    /// Shape a run of text into glyphs, in visual order
    fn shape(&self, text: &str, font: FontId) -> Vec<ShapedGlyph>;

    fn glyph_extents(&self, font: FontId, glyph: GlyphId) -> GlyphExtents;

    fn glyph_h_advance(&self, font: FontId, glyph: GlyphId) -> i32;

    fn font_h_extents(&self, font: FontId) -> FontExtents;
}
