//! The input element forest
//!
//! Elements are stored in pre-order with a per-element *skip*: the size of
//! the element's subtree, including itself. Skips make sibling iteration a
//! single addition and keep the whole tree in three flat arrays.

use crate::error::LayoutError;

/// Index of an element within an [ElementTree]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u16);

impl ElementId {
    pub const ROOT: Self = Self(0);

    #[inline]
    #[must_use]
    const fn to_index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of content an element carries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Element,
    Text,
}

/// An immutable element tree in pre-order storage
#[derive(Clone, Debug, Default)]
pub struct ElementTree {
    skips: Vec<u16>,
    categories: Vec<Category>,
    texts: Vec<Option<Box<str>>>,
}

impl ElementTree {
    #[must_use]
    pub fn size(&self) -> usize {
        self.skips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skips.is_empty()
    }

    #[must_use]
    pub fn skip_of(&self, element: ElementId) -> u16 {
        self.skips[element.to_index()]
    }

    #[must_use]
    pub fn category_of(&self, element: ElementId) -> Category {
        self.categories[element.to_index()]
    }

    /// The text content of a [Category::Text] element
    #[must_use]
    pub fn text_of(&self, element: ElementId) -> &str {
        self.texts[element.to_index()]
            .as_deref()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn first_child(&self, element: ElementId) -> Option<ElementId> {
        if self.skip_of(element) > 1 {
            Some(ElementId(element.0 + 1))
        } else {
            None
        }
    }

    /// The next sibling of `element` within the subtree ending at
    /// `subtree_end` (exclusive, in pre-order positions)
    #[must_use]
    pub fn next_sibling(&self, element: ElementId, subtree_end: u16) -> Option<ElementId> {
        let next = element.0 + self.skip_of(element);
        if next < subtree_end {
            Some(ElementId(next))
        } else {
            None
        }
    }

    /// Pre-order position one past the end of `element`'s subtree
    #[must_use]
    pub fn subtree_end(&self, element: ElementId) -> u16 {
        element.0 + self.skip_of(element)
    }
}

/// Builds an [ElementTree] through nested open/close calls
#[derive(Clone, Debug, Default)]
pub struct ElementTreeBuilder {
    tree: ElementTree,
    open: Vec<usize>,
}

impl ElementTreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new element; children are appended until the matching
    /// [close_element](Self::close_element)
    pub fn open_element(&mut self) -> Result<ElementId, LayoutError> {
        let id = self.append(Category::Element, None)?;
        self.open.push(id.to_index());
        Ok(id)
    }

    pub fn close_element(&mut self) {
        let index = self
            .open
            .pop()
            .expect("no element is open");
        self.tree.skips[index] = (self.tree.skips.len() - index) as u16;
    }

    /// Append a text leaf to the currently open element
    pub fn text(&mut self, content: &str) -> Result<ElementId, LayoutError> {
        self.append(Category::Text, Some(content))
    }

    pub fn finish(self) -> ElementTree {
        assert!(self.open.is_empty(), "unclosed elements remain");
        self.tree
    }

    fn append(
        &mut self,
        category: Category,
        text: Option<&str>,
    ) -> Result<ElementId, LayoutError> {
        let index = self.tree.skips.len();
        if index >= u16::MAX as usize {
            return Err(LayoutError::Overflow);
        }
        self.tree.skips.push(1);
        self.tree.categories.push(category);
        self.tree.texts.push(text.map(Box::from));
        Ok(ElementId(index as u16))
    }
}
