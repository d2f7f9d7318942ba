//! Turns cascaded values into computed values while walking the element tree
//!
//! The computer owns one stack of computed values per property group. The
//! walk protocol is strict: `set_current_element`, then any number of group
//! reads, then `push_element` before descending into children and a matching
//! `pop_element` afterwards, on every exit path.

use bitflags::bitflags;

use crate::{
    element_tree::ElementId,
    properties::{
        Background, BorderColors, BorderStyles, BoxStyle, CascadedValueStore, ColorStyle,
        ContentHeight, ContentWidth, FontStyle, HorizontalEdges, Insets, VerticalEdges,
        ZIndexStyle,
    },
    values::{Color, Rgba},
};

bitflags! {
    /// Which property groups have been computed for the current element
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    struct ComputedGroups: u16 {
        const BOX_STYLE = 1 << 0;
        const CONTENT_WIDTH = 1 << 1;
        const CONTENT_HEIGHT = 1 << 2;
        const HORIZONTAL_EDGES = 1 << 3;
        const VERTICAL_EDGES = 1 << 4;
        const BORDER_STYLES = 1 << 5;
        const BORDER_COLORS = 1 << 6;
        const BACKGROUND = 1 << 7;
        const INSETS = 1 << 8;
        const Z_INDEX = 1 << 9;
        const COLOR = 1 << 10;
        const FONT = 1 << 11;
    }
}

/// Emits the per-group fields, accessors and push/pop bodies once per
/// property group
macro_rules! style_computer_groups {
    (
        $( $field:ident, $getter:ident, $flag:ident, $computed:ident; )*
    ) => {
        #[derive(Clone, Debug, Default)]
        struct InheritanceStacks {
            $( $field: Vec<$computed>, )*
        }

        #[derive(Clone, Copy, Debug, Default)]
        struct CurrentValues {
            $( $field: $computed, )*
        }

        /// See the [module documentation](self) for the walk protocol
        #[derive(Clone, Debug)]
        pub struct StyleComputer<'store> {
            store: &'store CascadedValueStore,
            stacks: InheritanceStacks,
            current: CurrentValues,
            computed: ComputedGroups,
            element: Option<ElementId>,
        }

        impl<'store> StyleComputer<'store> {
            #[must_use]
            pub fn new(store: &'store CascadedValueStore) -> Self {
                Self {
                    store,
                    stacks: InheritanceStacks::default(),
                    current: CurrentValues::default(),
                    computed: ComputedGroups::empty(),
                    element: None,
                }
            }

            /// Begin computing values for `element`
            ///
            /// Resets the per-element computation state; previously pushed
            /// ancestors keep supplying inherited values.
            pub fn set_current_element(&mut self, element: ElementId) {
                self.element = Some(element);
                self.computed = ComputedGroups::empty();
            }

            $(
                pub fn $getter(&mut self) -> $computed {
                    if !self.computed.contains(ComputedGroups::$flag) {
                        let element = self
                            .element
                            .expect("no current element set");
                        let all = self.store.all.get(&element).copied();
                        let cascaded = self
                            .store
                            .$field
                            .get(&element)
                            .copied()
                            .unwrap_or_default();
                        self.current.$field =
                            cascaded.compute(all, self.stacks.$field.last());
                        self.computed.insert(ComputedGroups::$flag);
                    }
                    self.current.$field
                }
            )*

            /// Snapshot the current element's computed values as the
            /// inheritance parent for its children
            ///
            /// Groups not read since [set_current_element](Self::set_current_element)
            /// are computed on the spot so the snapshot is always complete.
            pub fn push_element(&mut self) {
                debug_assert!(self.element.is_some(), "push without a current element");
                $(
                    let value = self.$getter();
                    self.stacks.$field.push(value);
                )*
                self.element = None;
                self.computed = ComputedGroups::empty();
            }

            /// Discard the most recently pushed element
            pub fn pop_element(&mut self) {
                $(
                    self.stacks
                        .$field
                        .pop()
                        .expect("unbalanced pop_element");
                )*
            }
        }
    };
}

style_computer_groups! {
    box_style, box_style, BOX_STYLE, BoxStyle;
    content_width, content_width, CONTENT_WIDTH, ContentWidth;
    content_height, content_height, CONTENT_HEIGHT, ContentHeight;
    horizontal_edges, horizontal_edges, HORIZONTAL_EDGES, HorizontalEdges;
    vertical_edges, vertical_edges, VERTICAL_EDGES, VerticalEdges;
    border_styles, border_styles, BORDER_STYLES, BorderStyles;
    border_colors, border_colors, BORDER_COLORS, BorderColors;
    background, background, BACKGROUND, Background;
    insets, insets, INSETS, Insets;
    z_index, z_index_style, Z_INDEX, ZIndexStyle;
    color, color_style, COLOR, ColorStyle;
    font, font_style, FONT, FontStyle;
}

impl StyleComputer<'_> {
    /// The used value of the `color` property for the current element
    pub fn current_color(&mut self) -> Rgba {
        match self.color_style().color {
            Color::Rgba(rgba) => rgba,
            // currentColor computes to the inherited value on `color`
            // itself, so it can never remain at computed-value time
            Color::CurrentColor => unreachable!("unresolved currentColor in computed style"),
        }
    }

    /// The inherited font for text runs, which carry no declarations of
    /// their own
    #[must_use]
    pub fn inherited_font(&self) -> FontStyle {
        self.stacks.font.last().copied().unwrap_or_default()
    }

    /// The inherited text color, for text runs
    #[must_use]
    pub fn inherited_color(&self) -> Rgba {
        let color = self.stacks.color.last().copied().unwrap_or_default();
        match color.color {
            Color::Rgba(rgba) => rgba,
            Color::CurrentColor => unreachable!("unresolved currentColor in computed style"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        properties::{Cascaded, CascadedBoxStyle, CascadedColorStyle},
        values::Display,
    };

    #[test]
    fn values_inherit_through_pushed_elements() {
        let mut store = CascadedValueStore::new();
        store.color.insert(
            ElementId(0),
            CascadedColorStyle {
                color: Cascaded::Value(Color::Rgba(Rgba::WHITE)),
            },
        );

        let mut computer = StyleComputer::new(&store);
        computer.set_current_element(ElementId(0));
        assert_eq!(computer.current_color(), Rgba::WHITE);
        computer.push_element();

        // child declared nothing, color inherits
        computer.set_current_element(ElementId(1));
        assert_eq!(computer.current_color(), Rgba::WHITE);

        // but reset properties fall back to their initial values
        assert_eq!(computer.box_style().display, Display::Inline);
        computer.pop_element();
    }

    #[test]
    fn current_color_on_color_inherits() {
        let mut store = CascadedValueStore::new();
        store.color.insert(
            ElementId(0),
            CascadedColorStyle {
                color: Cascaded::Value(Color::Rgba(Rgba::WHITE)),
            },
        );
        store.color.insert(
            ElementId(1),
            CascadedColorStyle {
                color: Cascaded::Value(Color::CurrentColor),
            },
        );

        let mut computer = StyleComputer::new(&store);
        computer.set_current_element(ElementId(0));
        computer.push_element();
        computer.set_current_element(ElementId(1));
        assert_eq!(computer.current_color(), Rgba::WHITE);
        computer.pop_element();
    }

    #[test]
    fn cascaded_display_wins_over_initial() {
        let mut store = CascadedValueStore::new();
        store.box_style.insert(
            ElementId(0),
            CascadedBoxStyle {
                display: Cascaded::Value(Display::Block),
                ..CascadedBoxStyle::default()
            },
        );

        let mut computer = StyleComputer::new(&store);
        computer.set_current_element(ElementId(0));
        assert_eq!(computer.box_style().display, Display::Block);
    }
}
