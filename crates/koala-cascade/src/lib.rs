//! CSS cascade engine for the Koala browser.
//!
//! # Scope
//!
//! Given declaration blocks from user-agent, user and author style sheets and
//! a document tree, this crate decides for every element which declared value
//! (or CSS-wide keyword) wins for every property, per
//! [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
//!
//! - **Declaration Store** ([`Declarations`]): declared values per block and
//!   importance, grouped by property group, first declaration wins.
//! - **Cascaded values** ([`CascadedValues`], [`CascadedStore`]): per-element
//!   fold of matched blocks, small groups inline and large ones in a
//!   per-run arena.
//! - **Selector ordering** ([`order_rules`]): specificity, then source order.
//! - **Traversal** ([`run`]): the six origin/importance passes.
//!
//! Parsing, computed values, inheritance arithmetic and layout live
//! elsewhere: this crate only picks winners.
//!
//! # Example
//!
//! ```
//! use koala_cascade::{
//!     BoxStyle, CascadeConfig, CascadeSource, CompoundSelector, DisplayValue, Environment,
//!     Importance, Origin, RuleEntry, SpecifiedValue, run,
//! };
//! use koala_dom::{DomTree, ElementData, NodeId, NodeType};
//!
//! let mut tree = DomTree::new();
//! let p = tree.alloc(NodeType::Element(ElementData::new("p")));
//! tree.append_child(NodeId::ROOT, p);
//!
//! let mut env = Environment::new(CascadeConfig::default());
//! let block = env.decls.new_block()?;
//! let inline = BoxStyle {
//!     display: SpecifiedValue::Declared(DisplayValue::Inline),
//!     ..BoxStyle::default()
//! };
//! env.decls.add_aggregate(block, Importance::Normal, &inline)?;
//! let rule = RuleEntry {
//!     selector: env.selectors.push(CompoundSelector::tag("p")),
//!     block,
//! };
//! let sheet = CascadeSource::from_rules("page", &env.selectors, &env.decls, &[rule]);
//! env.cascade_list.push(Origin::Author, sheet);
//!
//! run(&mut env, &tree, NodeId::ROOT)?;
//! let style = env.cascaded.get(p).and_then(|view| view.get::<BoxStyle>());
//! assert_eq!(style.map(|s| s.display.clone()), Some(SpecifiedValue::Declared(DisplayValue::Inline)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Cascade traversal per [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading).
pub mod cascade;
/// Per-element cascaded values per [§ 6.1](https://www.w3.org/TR/css-cascade-4/#cascaded).
pub mod cascaded;
/// Engine configuration.
pub mod config;
/// Declaration blocks and their stored values.
pub mod declarations;
/// Error types.
pub mod error;
/// Rule ranking per [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort).
pub mod ordering;
/// Property groups.
pub mod properties;
/// Selector data and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Value-states and property value types.
pub mod values;

pub use cascade::{
    CASCADE_ORDER, CascadeList, CascadeNode, CascadeSource, Environment, Origin, run,
};
pub use cascaded::{CascadedStore, CascadedValues, CascadedView, INLINE_CAPACITY};
pub use config::CascadeConfig;
pub use declarations::{BlockMeta, DeclBlock, Declarations, MAX_LIST_LEN};
pub use error::{CascadeError, DeclarationError};
pub use ordering::{OrderedRules, RuleEntry, order_rules};
pub use properties::{
    Aggregate, AggregateSet, AggregateTag, Background, BackgroundColor, BorderColors,
    BorderStyles, BoxStyle, Color, ContentHeight, ContentWidth, DeclaredValues, Font,
    HorizontalEdges, Insets, TextDirection, VerticalEdges, ZIndex,
};
pub use selector::{
    AttributeOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    PseudoClass, SelectorData, SelectorIndex, SimpleSelector, Specificity,
};
pub use values::{
    BackgroundAttachment, BackgroundImage, BackgroundRepeat, BorderStyle, BorderWidth, BoxArea,
    ColorValue, CssWideKeyword, Direction, DisplayValue, Float, FontFamily, FontSize, FontWeight,
    Importance, LengthPercentage, LengthPercentageAuto, MaxSize, Position, Rgba, SpecifiedValue,
    UnicodeBidi, ValueList, ZIndexValue,
};
