use super::{Rectangle, Vec2D};

use std::ops;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Self { width, height }
    }
}

impl<T> Size<T>
where
    T: ops::Add<Output = T> + ops::Sub<Output = T> + Copy,
{
    #[must_use]
    pub fn at_position(&self, position: Vec2D<T>) -> Rectangle<T> {
        Rectangle::from_position_and_size(position, self.width, self.height)
    }
}
