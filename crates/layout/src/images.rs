//! Contract with the image decoding collaborator

use math::Size;

/// Identifies a decoded image held by the collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// Supplies natural image dimensions for background sizing
pub trait ImageSource {
    /// The natural size of the image in CSS pixels, or `None` if it is
    /// not (yet) available
    fn natural_size(&self, image: ImageHandle) -> Option<Size<i32>>;
}

/// An [ImageSource] with no images, for documents without them
#[derive(Clone, Copy, Debug, Default)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn natural_size(&self, _: ImageHandle) -> Option<Size<i32>> {
        None
    }
}
