//! Byte-packed storage for list-valued fields.
//!
//! Every list field of a header keeps a one-byte state. Declared items of all
//! list fields share one byte buffer, laid out in field order with each field
//! aligned to its item type. Field offsets are not stored: they are recomputed
//! from the states whenever a field is read or written.

use std::ops::Range;

use bytemuck::checked;
use smallvec::SmallVec;

use crate::error::DeclarationError;
use crate::properties::AggregateTag;
use crate::values::{CssWideKeyword, ListItem, SpecifiedValue, ValueList};

/// Maximum number of items a single list-valued declaration may carry.
pub const MAX_LIST_LEN: usize = 63;

/// One list field's state, packed into a byte.
///
/// `0` is undeclared, `1..=63` is a declared item count, and the three
/// values above that are the CSS-wide keywords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PackedListState(u8);

impl PackedListState {
    pub(crate) const UNDECLARED: Self = Self(0);
    const INITIAL: Self = Self(64);
    const INHERIT: Self = Self(65);
    const UNSET: Self = Self(66);

    fn declared(count: usize) -> Option<Self> {
        match u8::try_from(count) {
            Ok(count) if (1..=MAX_LIST_LEN as u8).contains(&count) => Some(Self(count)),
            _ => None,
        }
    }

    const fn from_keyword(keyword: CssWideKeyword) -> Self {
        match keyword {
            CssWideKeyword::Initial => Self::INITIAL,
            CssWideKeyword::Inherit => Self::INHERIT,
            CssWideKeyword::Unset => Self::UNSET,
        }
    }

    const fn keyword(self) -> Option<CssWideKeyword> {
        match self {
            Self::INITIAL => Some(CssWideKeyword::Initial),
            Self::INHERIT => Some(CssWideKeyword::Inherit),
            Self::UNSET => Some(CssWideKeyword::Unset),
            _ => None,
        }
    }

    /// Number of items this field occupies in the byte buffer.
    pub(crate) const fn item_count(self) -> usize {
        if self.0 as usize <= MAX_LIST_LEN {
            self.0 as usize
        } else {
            0
        }
    }
}

/// Size and alignment of one list field's item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldLayout {
    size: usize,
    align: usize,
}

impl FieldLayout {
    pub(crate) const fn of<T>() -> Self {
        Self {
            size: size_of::<T>(),
            align: align_of::<T>(),
        }
    }

    #[cfg(test)]
    const fn new(size: usize, align: usize) -> Self {
        Self { size, align }
    }
}

/// Byte range of `field` within a header's buffer.
///
/// Each field starts at the end of the previous one, rounded up to its own
/// alignment. Fields without declared items take no bytes.
pub(crate) fn byte_range(
    layout: &[FieldLayout],
    states: &[PackedListState],
    field: usize,
) -> Range<usize> {
    let mut offset: usize = 0;
    for (index, (field_layout, state)) in layout.iter().zip(states).enumerate() {
        offset = offset.next_multiple_of(field_layout.align);
        let len = field_layout.size * state.item_count();
        if index == field {
            return offset..offset + len;
        }
        offset += len;
    }
    offset..offset
}

/// Check a list field before anything is written.
pub(crate) fn validate<T>(
    group: AggregateTag,
    field: &'static str,
    value: &SpecifiedValue<ValueList<T>>,
) -> Result<(), DeclarationError>
where
    T: ListItem,
{
    match value.declared() {
        Some(items) if items.is_empty() => Err(DeclarationError::EmptyList { group, field }),
        Some(items) if items.len() > MAX_LIST_LEN => Err(DeclarationError::TooManyValues {
            group,
            field,
            count: items.len(),
        }),
        _ => Ok(()),
    }
}

/// Packed list fields of one header.
#[derive(Debug, Clone, Default)]
pub(crate) struct ListStorage {
    states: SmallVec<[PackedListState; 8]>,
    bytes: Vec<u8>,
}

impl ListStorage {
    /// State of `field`, undeclared if nothing was ever written.
    pub(crate) fn state(&self, field: usize) -> PackedListState {
        self.states
            .get(field)
            .copied()
            .unwrap_or(PackedListState::UNDECLARED)
    }

    /// Store `value` in `field` unless the field is already declared.
    /// Returns whether anything was written.
    pub(crate) fn write<T>(
        &mut self,
        layout: &[FieldLayout],
        field: usize,
        value: &SpecifiedValue<ValueList<T>>,
    ) -> bool
    where
        T: ListItem,
    {
        if value.is_undeclared() || self.state(field) != PackedListState::UNDECLARED {
            return false;
        }
        if self.states.len() < layout.len() {
            self.states.resize(layout.len(), PackedListState::UNDECLARED);
        }

        let items = match value {
            SpecifiedValue::Declared(items) => items,
            other => {
                if let Some(keyword) = other.keyword() {
                    self.states[field] = PackedListState::from_keyword(keyword);
                }
                return true;
            }
        };
        let Some(state) = PackedListState::declared(items.len()) else {
            log::error!(
                "list field {field} declared with {} items, not stored",
                items.len()
            );
            return false;
        };

        // Later fields move, so rebuild the buffer in field order.
        let mut bytes = Vec::with_capacity(self.bytes.len() + items.len() * layout[field].size);
        for (index, field_layout) in layout.iter().enumerate() {
            bytes.resize(bytes.len().next_multiple_of(field_layout.align), 0);
            if index == field {
                for item in items {
                    bytes.extend_from_slice(bytemuck::bytes_of(item));
                }
            } else {
                bytes.extend_from_slice(&self.bytes[byte_range(layout, &self.states, index)]);
            }
        }
        self.bytes = bytes;
        self.states[field] = state;
        true
    }

    /// Decode `field` back into a value-state.
    pub(crate) fn read<T>(&self, layout: &[FieldLayout], field: usize) -> SpecifiedValue<ValueList<T>>
    where
        T: ListItem,
    {
        let state = self.state(field);
        if state == PackedListState::UNDECLARED {
            return SpecifiedValue::Undeclared;
        }
        if let Some(keyword) = state.keyword() {
            return SpecifiedValue::from_keyword(keyword);
        }

        let range = byte_range(layout, &self.states, field);
        let items: Result<ValueList<T>, _> = self.bytes[range]
            .chunks_exact(size_of::<T>())
            .map(checked::try_pod_read_unaligned::<T>)
            .collect();
        match items {
            Ok(items) => SpecifiedValue::Declared(items),
            Err(err) => {
                log::error!("list field {field} holds an invalid item: {err:?}");
                SpecifiedValue::Undeclared
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;
    use crate::values::{BackgroundImage, FontFamily};

    const LAYOUT: &[FieldLayout] = &[
        FieldLayout::of::<FontFamily>(),
        FieldLayout::of::<BackgroundImage>(),
    ];

    #[test]
    fn test_byte_range_pads_to_alignment() {
        let layout = [FieldLayout::new(1, 1), FieldLayout::new(4, 4), FieldLayout::new(1, 1)];
        let states = [PackedListState(3), PackedListState(2), PackedListState(1)];
        assert_eq!(byte_range(&layout, &states, 0), 0..3);
        assert_eq!(byte_range(&layout, &states, 1), 4..12);
        assert_eq!(byte_range(&layout, &states, 2), 12..13);
    }

    #[test]
    fn test_byte_range_skips_keyword_fields() {
        let layout = [FieldLayout::new(4, 4), FieldLayout::new(4, 4)];
        let states = [PackedListState::INHERIT, PackedListState(2)];
        assert_eq!(byte_range(&layout, &states, 0), 0..0);
        assert_eq!(byte_range(&layout, &states, 1), 0..8);
    }

    #[test]
    fn test_write_later_field_first() {
        let mut storage = ListStorage::default();
        let images: SpecifiedValue<ValueList<BackgroundImage>> =
            SpecifiedValue::Declared(smallvec![BackgroundImage(7), BackgroundImage(9)]);
        let families: SpecifiedValue<ValueList<FontFamily>> =
            SpecifiedValue::Declared(smallvec![FontFamily::Serif, FontFamily::Monospace, FontFamily::Cursive]);

        assert!(storage.write(LAYOUT, 1, &images));
        assert!(storage.write(LAYOUT, 0, &families));

        assert_eq!(storage.read::<FontFamily>(LAYOUT, 0), families);
        assert_eq!(storage.read::<BackgroundImage>(LAYOUT, 1), images);
    }

    #[test]
    fn test_first_write_wins() {
        let mut storage = ListStorage::default();
        let first: SpecifiedValue<ValueList<FontFamily>> =
            SpecifiedValue::Declared(smallvec![FontFamily::SansSerif]);
        assert!(storage.write(LAYOUT, 0, &first));
        assert!(!storage.write(LAYOUT, 0, &SpecifiedValue::<ValueList<FontFamily>>::Inherit));
        assert_eq!(storage.read::<FontFamily>(LAYOUT, 0), first);
    }

    #[test]
    fn test_keyword_states() {
        let mut storage = ListStorage::default();
        assert!(storage.write(LAYOUT, 1, &SpecifiedValue::<ValueList<BackgroundImage>>::Unset));
        assert_eq!(
            storage.read::<BackgroundImage>(LAYOUT, 1),
            SpecifiedValue::Unset
        );
        assert_eq!(
            storage.read::<FontFamily>(LAYOUT, 0),
            SpecifiedValue::Undeclared
        );
    }

    #[test]
    fn test_max_list_len_round_trips() {
        let items: ValueList<BackgroundImage> = (1..=63).map(BackgroundImage).collect();
        let value = SpecifiedValue::Declared(items);
        assert!(validate(AggregateTag::Background, "image", &value).is_ok());

        let mut storage = ListStorage::default();
        assert!(storage.write(LAYOUT, 1, &value));
        assert_eq!(storage.read::<BackgroundImage>(LAYOUT, 1), value);
    }

    #[test]
    fn test_validate_rejects_bad_lengths() {
        let too_many: ValueList<BackgroundImage> = (1..=64).map(BackgroundImage).collect();
        assert_eq!(
            validate(AggregateTag::Background, "image", &SpecifiedValue::Declared(too_many)),
            Err(DeclarationError::TooManyValues {
                group: AggregateTag::Background,
                field: "image",
                count: 64,
            })
        );

        let empty: ValueList<FontFamily> = ValueList::new();
        assert_eq!(
            validate(AggregateTag::Font, "font_family", &SpecifiedValue::Declared(empty)),
            Err(DeclarationError::EmptyList {
                group: AggregateTag::Font,
                field: "font_family",
            })
        );
    }
}
