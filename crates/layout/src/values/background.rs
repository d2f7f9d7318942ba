use crate::images::ImageHandle;

/// <https://drafts.csswg.org/css-backgrounds/#background-image>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundImage {
    #[default]
    None,
    Image(ImageHandle),
}

impl BackgroundImage {
    #[must_use]
    pub const fn handle(&self) -> Option<ImageHandle> {
        match self {
            Self::None => None,
            Self::Image(handle) => Some(*handle),
        }
    }
}
