//! Value-states and property value types.
//!
//! [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
//!
//! The cascade never converts units or resolves keywords to computed values.
//! It only decides which declared value wins, so the types here are the
//! declared forms that a stylesheet parser hands over.

use std::fmt;

use bytemuck::{CheckedBitPattern, NoUninit, Pod, Zeroable};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum_macros::Display;

/// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
///
/// "Several CSS-wide property values are defined below; declaring a property
/// to have these values explicitly specifies a particular defaulting behavior."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum CssWideKeyword {
    /// "The initial CSS-wide keyword represents the value defined as the
    /// property's initial value."
    Initial,
    /// "The inherit CSS-wide keyword represents the property's computed value
    /// on the parent element."
    Inherit,
    /// "acts as either inherit or initial, depending on whether the property
    /// is inherited or not."
    Unset,
}

/// [§ 6.4 Important Declarations](https://www.w3.org/TR/css-cascade-4/#importance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Importance {
    /// A declaration without `!important`.
    Normal,
    /// A declaration marked `!important`.
    Important,
}

impl Importance {
    /// Both importances, important first (the order cascade phases visit them).
    pub const ALL: [Self; 2] = [Self::Important, Self::Normal];

    /// Map the parser's `!important` flag to an importance.
    #[must_use]
    pub const fn from_flag(important: bool) -> Self {
        if important { Self::Important } else { Self::Normal }
    }
}

/// The status of one property on one block or element.
///
/// `Undeclared` means "nothing has claimed this property yet"; every other
/// state is final for the block or element that holds it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum SpecifiedValue<T> {
    /// No declaration has been seen.
    #[default]
    Undeclared,
    /// `initial`
    Initial,
    /// `inherit`
    Inherit,
    /// `unset`
    Unset,
    /// A concrete declared value.
    Declared(T),
}

impl<T: Clone> SpecifiedValue<T> {
    /// The value-state a CSS-wide keyword produces.
    #[must_use]
    pub const fn from_keyword(keyword: CssWideKeyword) -> Self {
        match keyword {
            CssWideKeyword::Initial => Self::Initial,
            CssWideKeyword::Inherit => Self::Inherit,
            CssWideKeyword::Unset => Self::Unset,
        }
    }

    /// Whether nothing has been declared yet.
    #[must_use]
    pub const fn is_undeclared(&self) -> bool {
        matches!(self, Self::Undeclared)
    }

    /// The CSS-wide keyword this state represents, if any.
    #[must_use]
    pub const fn keyword(&self) -> Option<CssWideKeyword> {
        match self {
            Self::Initial => Some(CssWideKeyword::Initial),
            Self::Inherit => Some(CssWideKeyword::Inherit),
            Self::Unset => Some(CssWideKeyword::Unset),
            Self::Undeclared | Self::Declared(_) => None,
        }
    }

    /// The declared value, if this state carries one.
    #[must_use]
    pub const fn declared(&self) -> Option<&T> {
        match self {
            Self::Declared(value) => Some(value),
            _ => None,
        }
    }

    /// Take `other` only while this slot is still undeclared.
    pub fn fill_from(&mut self, other: &Self) {
        if self.is_undeclared() {
            self.clone_from(other);
        }
    }

    /// Set this slot to `keyword` only while it is still undeclared.
    pub fn fill_with_keyword(&mut self, keyword: CssWideKeyword) {
        if self.is_undeclared() {
            *self = Self::from_keyword(keyword);
        }
    }
}

impl<T> From<T> for SpecifiedValue<T> {
    fn from(value: T) -> Self {
        Self::Declared(value)
    }
}

/// Items of a list-valued property (e.g. one entry per background layer).
pub type ValueList<T> = SmallVec<[T; 1]>;

/// Bound for list-item types: they are stored as raw bytes in the
/// declaration store, so they must be plain data with checked bit patterns.
pub trait ListItem: NoUninit + CheckedBitPattern + Copy + PartialEq + fmt::Debug {}

impl<T: NoUninit + CheckedBitPattern + Copy + PartialEq + fmt::Debug> ListItem for T {}

// ============================================================================
// Box generation
// ============================================================================

/// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayValue {
    /// `display: block`
    Block,
    /// `display: inline`
    Inline,
    /// `display: inline-block`
    InlineBlock,
    /// `display: flex`
    Flex,
    /// `display: grid`
    Grid,
    /// `display: list-item`
    ListItem,
    /// `display: table`
    Table,
    /// `display: none`
    None,
}

/// [§ 3.1 position](https://www.w3.org/TR/css-position-3/#position-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Position {
    /// `static`
    Static,
    /// `relative`
    Relative,
    /// `absolute`
    Absolute,
    /// `sticky`
    Sticky,
    /// `fixed`
    Fixed,
}

/// [§ 9.5.1 float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Float {
    /// `float: left`
    Left,
    /// `float: right`
    Right,
    /// `float: none`
    None,
}

// ============================================================================
// Lengths
// ============================================================================

/// `<length-percentage>`: padding values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthPercentage {
    /// Absolute length in CSS pixels.
    Px(f32),
    /// Percentage of the containing block.
    Percentage(f32),
}

/// `<length-percentage> | auto`: margins, widths, heights and insets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthPercentageAuto {
    /// Absolute length in CSS pixels.
    Px(f32),
    /// Percentage of the containing block.
    Percentage(f32),
    /// `auto`
    Auto,
}

/// `<length-percentage> | none`: `max-width` and `max-height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MaxSize {
    /// Absolute length in CSS pixels.
    Px(f32),
    /// Percentage of the containing block.
    Percentage(f32),
    /// `none`
    None,
}

/// [§ 3.3 Line Thickness](https://www.w3.org/TR/css-backgrounds-3/#border-width)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BorderWidth {
    /// Absolute length in CSS pixels.
    Px(f32),
    /// `thin`
    Thin,
    /// `medium`
    Medium,
    /// `thick`
    Thick,
}

/// [§ 3.2 Line Patterns](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BorderStyle {
    /// `none`
    None,
    /// `hidden`
    Hidden,
    /// `dotted`
    Dotted,
    /// `dashed`
    Dashed,
    /// `solid`
    Solid,
    /// `double`
    Double,
    /// `groove`
    Groove,
    /// `ridge`
    Ridge,
    /// `inset`
    Inset,
    /// `outset`
    Outset,
}

/// [§ 9.9.1 z-index](https://www.w3.org/TR/CSS2/visuren.html#z-index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ZIndexValue {
    /// `auto`
    Auto,
    /// An explicit stack level.
    Integer(i32),
}

// ============================================================================
// Colors
// ============================================================================

/// An sRGB color with alpha, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Parse-free constructor from a packed `0xRRGGBBAA` value.
    #[must_use]
    pub const fn from_u32(rgba: u32) -> Self {
        let [r, g, b, a] = rgba.to_be_bytes();
        Self { r, g, b, a }
    }
}

/// [§ 4 Representing Colors](https://www.w3.org/TR/css-color-4/#color-type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorValue {
    /// An explicit color.
    Rgba(Rgba),
    /// `currentcolor`
    CurrentColor,
    /// `transparent`
    Transparent,
}

// ============================================================================
// Writing modes
// ============================================================================

/// [§ 2.1 direction](https://www.w3.org/TR/css-writing-modes-4/#direction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// `ltr`
    Ltr,
    /// `rtl`
    Rtl,
}

/// [§ 2.2 unicode-bidi](https://www.w3.org/TR/css-writing-modes-4/#unicode-bidi)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnicodeBidi {
    /// `normal`
    Normal,
    /// `embed`
    Embed,
    /// `isolate`
    Isolate,
    /// `bidi-override`
    BidiOverride,
    /// `isolate-override`
    IsolateOverride,
    /// `plaintext`
    Plaintext,
}

// ============================================================================
// Fonts
// ============================================================================

/// [§ 2.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FontSize {
    /// Absolute length in CSS pixels.
    Px(f32),
    /// Percentage of the parent's font size.
    Percentage(f32),
    /// `medium`, the initial value.
    Medium,
}

/// [§ 2.2 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FontWeight(pub u16);

/// [§ 2.1 font-family](https://www.w3.org/TR/css-fonts-4/#font-family-prop),
/// generic families only. Named families are resolved by the font subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, NoUninit, CheckedBitPattern)]
#[repr(u8)]
pub enum FontFamily {
    /// `serif`
    Serif,
    /// `sans-serif`
    SansSerif,
    /// `monospace`
    Monospace,
    /// `cursive`
    Cursive,
    /// `fantasy`
    Fantasy,
    /// `system-ui`
    SystemUi,
}

// ============================================================================
// Backgrounds (one list entry per layer)
// ============================================================================

/// [§ 2.2 background-image](https://www.w3.org/TR/css-backgrounds-3/#background-image)
///
/// Images are identified by a handle into the host's image table; `0` is `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Pod, Zeroable)]
#[repr(transparent)]
pub struct BackgroundImage(pub u32);

impl BackgroundImage {
    /// `background-image: none`
    pub const NONE: Self = Self(0);

    /// The host image handle, or `None` for `none`.
    #[must_use]
    pub const fn image_id(self) -> Option<u32> {
        match self.0 {
            0 => None,
            id => Some(id),
        }
    }
}

/// [§ 2.3 background-repeat](https://www.w3.org/TR/css-backgrounds-3/#background-repeat)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, NoUninit, CheckedBitPattern)]
#[repr(u8)]
pub enum BackgroundRepeat {
    /// `repeat`
    Repeat,
    /// `repeat-x`
    RepeatX,
    /// `repeat-y`
    RepeatY,
    /// `no-repeat`
    NoRepeat,
    /// `space`
    Space,
    /// `round`
    Round,
}

/// [§ 2.4 background-attachment](https://www.w3.org/TR/css-backgrounds-3/#background-attachment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, NoUninit, CheckedBitPattern)]
#[repr(u8)]
pub enum BackgroundAttachment {
    /// `scroll`
    Scroll,
    /// `fixed`
    Fixed,
    /// `local`
    Local,
}

/// [§ 2.7 background-clip](https://www.w3.org/TR/css-backgrounds-3/#background-clip) and
/// [§ 2.8 background-origin](https://www.w3.org/TR/css-backgrounds-3/#background-origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, NoUninit, CheckedBitPattern)]
#[repr(u8)]
pub enum BoxArea {
    /// `border-box`
    BorderBox,
    /// `padding-box`
    PaddingBox,
    /// `content-box`
    ContentBox,
}
