//! Property groups ("aggregates").
//!
//! Related longhands are stored and resolved together: a block that sets
//! `padding-left` creates one [`HorizontalEdges`] header rather than one
//! allocation per property. The catalog below is the single source of truth
//! for which properties exist and how they are grouped.

#[macro_use]
mod macros;

use std::collections::TryReserveError;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::cascaded::{CascadedValues, InArena, Inline, SlotKind, StorageClass};
use crate::declarations::list::{self, FieldLayout, ListStorage};
use crate::declarations::{AggregateStore, DeclBlock, Declarations};
use crate::error::DeclarationError;
use crate::values::{
    BackgroundAttachment, BackgroundImage, BackgroundRepeat, BorderStyle, BorderWidth, BoxArea,
    ColorValue, CssWideKeyword, Direction, DisplayValue, Float, FontFamily, FontSize, FontWeight,
    Importance, LengthPercentage, LengthPercentageAuto, MaxSize, Position, SpecifiedValue,
    UnicodeBidi, ValueList, ZIndexValue,
};

/// The cascaded slot type of aggregate `A`.
pub type SlotOf<A> = <<A as Aggregate>::Storage as SlotKind<A>>::Slot;

/// A property group: a fixed bundle of fields declared, stored and
/// cascaded as one unit.
///
/// Implemented only by the structs generated from the catalog.
pub trait Aggregate: Clone + Default + PartialEq + fmt::Debug + 'static {
    /// Tag identifying this group.
    const TAG: AggregateTag;
    /// Per-block storage for one importance.
    type Header: Clone + Default + fmt::Debug;
    /// Whether cascaded values keep this group inline or in the arena.
    type Storage: SlotKind<Self>;

    /// Whether every field is still undeclared.
    fn is_undeclared(&self) -> bool;

    /// Check list lengths without writing anything.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::EmptyList`] or [`DeclarationError::TooManyValues`]
    /// for the first list field whose length is out of range.
    fn validate(&self) -> Result<(), DeclarationError>;

    /// Copy declared fields into `header` where the header is still
    /// undeclared. Returns whether anything was written.
    fn write_header(&self, header: &mut Self::Header) -> bool;

    /// Copy header fields into `self` where `self` is still undeclared.
    fn read_header(&mut self, header: &Self::Header);

    /// Set every undeclared field to `keyword`.
    fn fill_with_keyword(&mut self, keyword: CssWideKeyword);

    #[doc(hidden)]
    fn store(stores: &AggregateStores) -> &AggregateStore<Self>;
    #[doc(hidden)]
    fn store_mut(stores: &mut AggregateStores) -> &mut AggregateStore<Self>;
    #[doc(hidden)]
    fn slab(arena: &CascadeArena) -> &[Self];
    #[doc(hidden)]
    fn slab_mut(arena: &mut CascadeArena) -> &mut Vec<Self>;
    #[doc(hidden)]
    fn wrap(slot: SlotOf<Self>) -> StoredAggregate;
    #[doc(hidden)]
    fn unwrap_ref(stored: &StoredAggregate) -> Option<&SlotOf<Self>>;
    #[doc(hidden)]
    fn unwrap_mut(stored: &mut StoredAggregate) -> Option<&mut SlotOf<Self>>;
}

aggregates! {
    /// `display`, `position` and `float`.
    BoxStyle, box_style, Inline {
        scalars {
            /// [§ 2 display](https://www.w3.org/TR/css-display-3/#the-display-properties)
            display: DisplayValue,
            /// [§ 3.1 position](https://www.w3.org/TR/css-position-3/#position-property)
            position: Position,
            /// [§ 9.5.1 float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
            float: Float,
        }
        lists {}
    }

    /// `width`, `min-width` and `max-width`.
    ContentWidth, content_width, InArena {
        scalars {
            /// `width`
            width: LengthPercentageAuto,
            /// `min-width`
            min_width: LengthPercentageAuto,
            /// `max-width`
            max_width: MaxSize,
        }
        lists {}
    }

    /// `height`, `min-height` and `max-height`.
    ContentHeight, content_height, InArena {
        scalars {
            /// `height`
            height: LengthPercentageAuto,
            /// `min-height`
            min_height: LengthPercentageAuto,
            /// `max-height`
            max_height: MaxSize,
        }
        lists {}
    }

    /// Padding, border width and margin on the left and right sides.
    HorizontalEdges, horizontal_edges, InArena {
        scalars {
            /// `padding-left`
            padding_left: LengthPercentage,
            /// `padding-right`
            padding_right: LengthPercentage,
            /// `border-left-width`
            border_left: BorderWidth,
            /// `border-right-width`
            border_right: BorderWidth,
            /// `margin-left`
            margin_left: LengthPercentageAuto,
            /// `margin-right`
            margin_right: LengthPercentageAuto,
        }
        lists {}
    }

    /// Padding, border width and margin on the top and bottom sides.
    VerticalEdges, vertical_edges, InArena {
        scalars {
            /// `padding-top`
            padding_top: LengthPercentage,
            /// `padding-bottom`
            padding_bottom: LengthPercentage,
            /// `border-top-width`
            border_top: BorderWidth,
            /// `border-bottom-width`
            border_bottom: BorderWidth,
            /// `margin-top`
            margin_top: LengthPercentageAuto,
            /// `margin-bottom`
            margin_bottom: LengthPercentageAuto,
        }
        lists {}
    }

    /// `top`, `right`, `bottom` and `left`.
    Insets, insets, InArena {
        scalars {
            /// `top`
            top: LengthPercentageAuto,
            /// `right`
            right: LengthPercentageAuto,
            /// `bottom`
            bottom: LengthPercentageAuto,
            /// `left`
            left: LengthPercentageAuto,
        }
        lists {}
    }

    /// `z-index`.
    ZIndex, z_index, Inline {
        scalars {
            /// [§ 9.9.1 z-index](https://www.w3.org/TR/CSS2/visuren.html#z-index)
            z_index: ZIndexValue,
        }
        lists {}
    }

    /// The foreground `color`.
    Color, color, Inline {
        scalars {
            /// [§ 3.1 color](https://www.w3.org/TR/css-color-4/#the-color-property)
            color: ColorValue,
        }
        lists {}
    }

    /// `background-color`.
    BackgroundColor, background_color, Inline {
        scalars {
            /// [§ 3.2 background-color](https://www.w3.org/TR/css-backgrounds-3/#background-color)
            color: ColorValue,
        }
        lists {}
    }

    /// Border colors on all four sides.
    BorderColors, border_colors, InArena {
        scalars {
            /// `border-top-color`
            top: ColorValue,
            /// `border-right-color`
            right: ColorValue,
            /// `border-bottom-color`
            bottom: ColorValue,
            /// `border-left-color`
            left: ColorValue,
        }
        lists {}
    }

    /// Border styles on all four sides.
    BorderStyles, border_styles, Inline {
        scalars {
            /// `border-top-style`
            top: BorderStyle,
            /// `border-right-style`
            right: BorderStyle,
            /// `border-bottom-style`
            bottom: BorderStyle,
            /// `border-left-style`
            left: BorderStyle,
        }
        lists {}
    }

    /// `direction` and `unicode-bidi`.
    TextDirection, text_direction, Inline {
        scalars {
            /// [§ 2.1 direction](https://www.w3.org/TR/css-writing-modes-4/#direction)
            direction: Direction,
            /// [§ 2.2 unicode-bidi](https://www.w3.org/TR/css-writing-modes-4/#unicode-bidi)
            unicode_bidi: UnicodeBidi,
        }
        lists {}
    }

    /// `font-size`, `font-weight` and `font-family`.
    Font, font, InArena {
        scalars {
            /// `font-size`
            font_size: FontSize,
            /// `font-weight`
            font_weight: FontWeight,
        }
        lists {
            /// `font-family`, in fallback order.
            font_family: FontFamily,
        }
    }

    /// Background layers. Every field holds one entry per layer.
    Background, background, InArena {
        scalars {}
        lists {
            /// `background-image`
            image: BackgroundImage,
            /// `background-repeat`
            repeat: BackgroundRepeat,
            /// `background-attachment`
            attachment: BackgroundAttachment,
            /// `background-clip`
            clip: BoxArea,
            /// `background-origin`
            origin: BoxArea,
        }
    }
}

/// A set of property groups, one bit per [`AggregateTag`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<AggregateTag>", into = "Vec<AggregateTag>")]
pub struct AggregateSet(u32);

const _: () = assert!(AggregateTag::COUNT <= u32::BITS as usize);

impl AggregateSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Build a set from a list of tags.
    #[must_use]
    pub fn from_tags(tags: &[AggregateTag]) -> Self {
        tags.iter().fold(Self::EMPTY, |set, &tag| set.with(tag))
    }

    const fn bit(tag: AggregateTag) -> u32 {
        1 << (tag as u32)
    }

    /// This set plus `tag`.
    #[must_use]
    pub const fn with(self, tag: AggregateTag) -> Self {
        Self(self.0 | Self::bit(tag))
    }

    /// Add `tag` to the set.
    pub fn insert(&mut self, tag: AggregateTag) {
        *self = self.with(tag);
    }

    /// Whether `tag` is in the set.
    #[must_use]
    pub const fn contains(self, tag: AggregateTag) -> bool {
        self.0 & Self::bit(tag) != 0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The tags in the set, in catalog order.
    pub fn iter(self) -> impl Iterator<Item = AggregateTag> {
        AggregateTag::ALL
            .iter()
            .copied()
            .filter(move |&tag| self.contains(tag))
    }
}

impl From<Vec<AggregateTag>> for AggregateSet {
    fn from(tags: Vec<AggregateTag>) -> Self {
        Self::from_tags(&tags)
    }
}

impl From<AggregateSet> for Vec<AggregateTag> {
    fn from(set: AggregateSet) -> Self {
        set.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_set_membership() {
        let mut set = AggregateSet::from_tags(&[AggregateTag::Font, AggregateTag::Color]);
        assert!(set.contains(AggregateTag::Font));
        assert!(!set.contains(AggregateTag::BoxStyle));

        set.insert(AggregateTag::BoxStyle);
        let tags: Vec<AggregateTag> = set.iter().collect();
        assert_eq!(
            tags,
            vec![AggregateTag::BoxStyle, AggregateTag::Color, AggregateTag::Font]
        );
    }

    #[test]
    fn test_tag_catalog() {
        assert_eq!(AggregateTag::ALL.len(), AggregateTag::COUNT);
        assert_eq!(AggregateTag::ALL[0], AggregateTag::BoxStyle);
        assert_eq!(AggregateTag::HorizontalEdges.to_string(), "HorizontalEdges");
    }

    #[test]
    fn test_is_undeclared() {
        let mut style = BoxStyle::default();
        assert!(style.is_undeclared());
        style.float = SpecifiedValue::Inherit;
        assert!(!style.is_undeclared());
    }

    #[test]
    fn test_write_header_keeps_first_value() {
        let mut header = box_style::Header::default();
        let first = BoxStyle {
            display: SpecifiedValue::Declared(DisplayValue::Flex),
            ..BoxStyle::default()
        };
        let second = BoxStyle {
            display: SpecifiedValue::Declared(DisplayValue::Grid),
            position: SpecifiedValue::Declared(Position::Absolute),
            ..BoxStyle::default()
        };
        assert!(first.write_header(&mut header));
        assert!(second.write_header(&mut header));
        assert!(!second.write_header(&mut header));

        let mut read = BoxStyle::default();
        read.read_header(&header);
        assert_eq!(read.display, SpecifiedValue::Declared(DisplayValue::Flex));
        assert_eq!(read.position, SpecifiedValue::Declared(Position::Absolute));
        assert!(read.float.is_undeclared());
    }

    #[test]
    fn test_fill_with_keyword_spares_declared_fields() {
        let mut edges = HorizontalEdges {
            margin_left: SpecifiedValue::Declared(LengthPercentageAuto::Auto),
            ..HorizontalEdges::default()
        };
        edges.fill_with_keyword(CssWideKeyword::Initial);
        assert_eq!(edges.margin_left, SpecifiedValue::Declared(LengthPercentageAuto::Auto));
        assert_eq!(edges.padding_right, SpecifiedValue::Initial);
        assert_eq!(edges.border_left, SpecifiedValue::Initial);
    }
}
