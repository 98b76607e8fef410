//! Selector data and matching.
//!
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//!
//! Selectors arrive already parsed: a stylesheet front end builds them with
//! the constructors below and registers them in a [`SelectorData`] table.
//! The cascade refers to them by [`SelectorIndex`] and asks the table
//! whether a given element matches.

use std::fmt;

use koala_dom::{DomTree, ElementData, NodeId, NodeType};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
///
/// A single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    Type(String),
    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    Class(String),
    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    Id(String),
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,
    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes),
    /// tree-structural ones only.
    PseudoClass(PseudoClass),
}

/// Tree-structural pseudo-classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    Root,
    /// [§ 14.3.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 14.3.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.3.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    ///
    /// Comments and whitespace-only text do not count as content.
    Empty,
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name.
    pub name: String,
    /// Condition on the attribute's value.
    pub operator: AttributeOperator,
}

/// How an attribute selector compares the attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[att]`
    Exists,
    /// `[att=val]`
    Equals(String),
    /// `[att~=val]`: one whitespace-separated word equals `val`.
    Includes(String),
    /// `[att|=val]`: equals `val` or starts with `val-`.
    DashMatch(String),
    /// `[att^=val]`
    Prefix(String),
    /// `[att$=val]`
    Suffix(String),
    /// `[att*=val]`
    Substring(String),
}

impl AttributeSelector {
    fn matches(&self, element: &ElementData) -> bool {
        let Some(value) = element.attrs.get(&self.name) else {
            return false;
        };
        match &self.operator {
            AttributeOperator::Exists => true,
            AttributeOperator::Equals(val) => value == val,
            AttributeOperator::Includes(val) => value.split_ascii_whitespace().any(|word| word == val),
            AttributeOperator::DashMatch(val) => value
                .strip_prefix(val.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-')),
            AttributeOperator::Prefix(val) => !val.is_empty() && value.starts_with(val.as_str()),
            AttributeOperator::Suffix(val) => !val.is_empty() && value.ends_with(val.as_str()),
            AttributeOperator::Substring(val) => !val.is_empty() && value.contains(val.as_str()),
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// Simple selectors that must all hold for the same element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The conditions, in source order.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// A compound of a single simple selector.
    #[must_use]
    pub fn new(simple: SimpleSelector) -> Self {
        Self {
            simple_selectors: vec![simple],
        }
    }

    /// `name`
    #[must_use]
    pub fn tag(name: &str) -> Self {
        Self::new(SimpleSelector::Type(name.to_string()))
    }

    /// `.name`
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self::new(SimpleSelector::Class(name.to_string()))
    }

    /// `#name`
    #[must_use]
    pub fn id(name: &str) -> Self {
        Self::new(SimpleSelector::Id(name.to_string()))
    }

    /// `*`
    #[must_use]
    pub fn universal() -> Self {
        Self::new(SimpleSelector::Universal)
    }

    /// Add another condition on the same element.
    #[must_use]
    pub fn and(mut self, simple: SimpleSelector) -> Self {
        self.simple_selectors.push(simple);
        self
    }

    /// Add a class condition, e.g. `.a` becomes `.a.b`.
    #[must_use]
    pub fn and_class(self, name: &str) -> Self {
        self.and(SimpleSelector::Class(name.to_string()))
    }

    fn specificity(&self) -> Specificity {
        self.simple_selectors
            .iter()
            .fold(Specificity::default(), |spec, simple| match simple {
                SimpleSelector::Id(_) => Specificity(spec.0 + 1, spec.1, spec.2),
                SimpleSelector::Class(_)
                | SimpleSelector::Attribute(_)
                | SimpleSelector::PseudoClass(_) => Specificity(spec.0, spec.1 + 1, spec.2),
                SimpleSelector::Type(_) => Specificity(spec.0, spec.1, spec.2 + 1),
                SimpleSelector::Universal => spec,
            })
    }

    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(element) = tree.as_element(node) else {
            return false;
        };
        self.simple_selectors.iter().all(|simple| match simple {
            SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            SimpleSelector::Class(name) => element.classes().contains(name.as_str()),
            SimpleSelector::Id(id) => element.id().is_some_and(|own| own == id),
            SimpleSelector::Universal => true,
            SimpleSelector::Attribute(attr) => attr.matches(element),
            SimpleSelector::PseudoClass(pc) => pseudo_class_matches(*pc, tree, node),
        })
    }
}

fn element_siblings(tree: &DomTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.parent(node)
        .map(|parent| tree.children(parent))
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|&child| tree.as_element(child).is_some())
}

fn pseudo_class_matches(pc: PseudoClass, tree: &DomTree, node: NodeId) -> bool {
    match pc {
        PseudoClass::Root => tree.document_element() == Some(node),
        PseudoClass::FirstChild => element_siblings(tree, node).next() == Some(node),
        PseudoClass::LastChild => element_siblings(tree, node).last() == Some(node),
        PseudoClass::OnlyChild => element_siblings(tree, node).count() == 1,
        PseudoClass::Empty => tree.children(node).iter().all(|&child| {
            match tree.get(child).map(|n| &n.node_type) {
                Some(NodeType::Text(text)) => text.trim().is_empty(),
                Some(NodeType::Comment(_)) => true,
                _ => false,
            }
        }),
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`
    Descendant,
    /// `A > B`
    Child,
    /// `A + B`
    NextSibling,
    /// `A ~ B`
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// A subject compound plus the chain of compounds to its left, stored
/// right-to-left: `div > p span` is subject `span` with
/// `[(Descendant, p), (Child, div)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The compound the selected element itself must match.
    pub subject: CompoundSelector,
    /// `(combinator, compound)` pairs walking outward from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

impl From<CompoundSelector> for ComplexSelector {
    fn from(subject: CompoundSelector) -> Self {
        Self {
            subject,
            combinators: Vec::new(),
        }
    }
}

impl ComplexSelector {
    /// Extend the chain to the left: `self.combined(Child, div)` turns
    /// `p` into `div > p`.
    #[must_use]
    pub fn combined(mut self, combinator: Combinator, compound: CompoundSelector) -> Self {
        self.combinators.push((combinator, compound));
        self
    }

    /// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.combinators
            .iter()
            .map(|(_, compound)| compound.specificity())
            .fold(self.subject.specificity(), |total, spec| {
                Specificity(total.0 + spec.0, total.1 + spec.1, total.2 + spec.2)
            })
    }

    /// [§ 4.1 Selector matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.subject.matches(tree, node) && matches_chain(&self.combinators, tree, node)
    }
}

/// Match the remaining chain from an already matched element, trying every
/// candidate for descendant and subsequent-sibling steps.
fn matches_chain(chain: &[(Combinator, CompoundSelector)], tree: &DomTree, node: NodeId) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };
    let accept = |candidate: NodeId| {
        compound.matches(tree, candidate) && matches_chain(rest, tree, candidate)
    };
    match combinator {
        Combinator::Descendant => tree.ancestors(node).any(accept),
        Combinator::Child => tree.parent(node).is_some_and(accept),
        Combinator::NextSibling => tree
            .preceding_siblings(node)
            .find(|&sibling| tree.as_element(sibling).is_some())
            .is_some_and(accept),
        Combinator::SubsequentSibling => tree.preceding_siblings(node).any(accept),
    }
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// `(ids, classes + attributes + pseudo-classes, types)`, compared
/// component-wise in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0, self.1, self.2)
    }
}

/// Handle of a selector registered in a [`SelectorData`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorIndex(usize);

impl SelectorIndex {
    /// Position in the table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Every complex selector of a parsed stylesheet, with its specificity.
#[derive(Debug, Clone, Default)]
pub struct SelectorData {
    selectors: Vec<(ComplexSelector, Specificity)>,
}

impl SelectorData {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a selector and return its handle.
    pub fn push(&mut self, selector: impl Into<ComplexSelector>) -> SelectorIndex {
        let selector = selector.into();
        let specificity = selector.specificity();
        self.selectors.push((selector, specificity));
        SelectorIndex(self.selectors.len() - 1)
    }

    /// The selector behind `index`.
    #[must_use]
    pub fn get(&self, index: SelectorIndex) -> Option<&ComplexSelector> {
        self.selectors.get(index.index()).map(|(selector, _)| selector)
    }

    /// Specificity of `index`, zero for an unknown handle.
    #[must_use]
    pub fn specificity(&self, index: SelectorIndex) -> Specificity {
        self.selectors
            .get(index.index())
            .map(|&(_, specificity)| specificity)
            .unwrap_or_default()
    }

    /// Whether the selector behind `index` matches `node`. Non-element nodes
    /// and unknown handles never match.
    #[must_use]
    pub fn matches(&self, index: SelectorIndex, tree: &DomTree, node: NodeId) -> bool {
        self.get(index)
            .is_some_and(|selector| selector.matches(tree, node))
    }

    /// Number of registered selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether no selector is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_compound(classes: &[&str]) -> CompoundSelector {
        CompoundSelector {
            simple_selectors: classes
                .iter()
                .map(|name| SimpleSelector::Class((*name).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_specificity_components() {
        let selector = ComplexSelector::from(
            CompoundSelector::tag("a").and(SimpleSelector::PseudoClass(PseudoClass::FirstChild)),
        )
        .combined(Combinator::Descendant, CompoundSelector::id("nav").and_class("menu"));
        assert_eq!(selector.specificity(), Specificity(1, 2, 1));
        assert_eq!(selector.specificity().to_string(), "1-2-1");
    }

    #[test]
    fn test_universal_adds_nothing() {
        let selector = ComplexSelector::from(CompoundSelector::universal());
        assert_eq!(selector.specificity(), Specificity::default());
    }

    #[test]
    fn test_specificity_ordering() {
        assert!(Specificity(1, 0, 0) > Specificity(0, 2, 0));
        assert!(Specificity(0, 1, 0) > Specificity(0, 0, 9));
        assert_eq!(
            ComplexSelector::from(class_compound(&["a", "b"])).specificity(),
            Specificity(0, 2, 0)
        );
    }

    #[test]
    fn test_dash_match() {
        let attr = AttributeSelector {
            name: "lang".to_string(),
            operator: AttributeOperator::DashMatch("en".to_string()),
        };
        assert!(attr.matches(&ElementData::new("p").with_attr("lang", "en")));
        assert!(attr.matches(&ElementData::new("p").with_attr("lang", "en-US")));
        assert!(!attr.matches(&ElementData::new("p").with_attr("lang", "english")));
        assert!(!attr.matches(&ElementData::new("p")));
    }

    #[test]
    fn test_empty_operand_never_matches() {
        let attr = AttributeSelector {
            name: "href".to_string(),
            operator: AttributeOperator::Prefix(String::new()),
        };
        assert!(!attr.matches(&ElementData::new("a").with_attr("href", "/")));
    }
}
