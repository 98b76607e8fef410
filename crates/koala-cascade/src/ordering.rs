//! Selector Priority Ordering.
//!
//! [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
//!
//! Within one stylesheet, rules are ranked by
//! [specificity](https://www.w3.org/TR/css-cascade-4/#cascade-specificity)
//! and then by [order of appearance](https://www.w3.org/TR/css-cascade-4/#cascade-order),
//! the later rule winning ties. The ranking is computed once per stylesheet
//! and never changes afterwards.

use std::cmp::Reverse;

use crate::declarations::{DeclBlock, Declarations};
use crate::selector::{SelectorData, SelectorIndex};
use crate::values::Importance;

/// One style rule: a selector and the block it applies.
///
/// A rule with a selector list contributes one entry per complex selector,
/// all sharing the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleEntry {
    /// The rule's selector.
    pub selector: SelectorIndex,
    /// The rule's declarations.
    pub block: DeclBlock,
}

/// Rules of one stylesheet, highest priority first, split by importance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedRules {
    /// Rules whose block declares something `!important`.
    pub important: Vec<RuleEntry>,
    /// Rules whose block declares something without `!important`.
    pub normal: Vec<RuleEntry>,
}

impl OrderedRules {
    /// The list used for `importance`.
    #[must_use]
    pub fn get(&self, importance: Importance) -> &[RuleEntry] {
        match importance {
            Importance::Important => &self.important,
            Importance::Normal => &self.normal,
        }
    }
}

/// Rank `rules`, given in source order.
///
/// A rule lands in a list only if its block has values at that importance,
/// so a block with both normal and important declarations appears in both.
#[must_use]
pub fn order_rules(selectors: &SelectorData, decls: &Declarations, rules: &[RuleEntry]) -> OrderedRules {
    let mut ranked: Vec<(usize, &RuleEntry)> = rules.iter().enumerate().collect();
    ranked.sort_by_key(|&(position, rule)| {
        (Reverse(selectors.specificity(rule.selector)), Reverse(position))
    });

    let mut ordered = OrderedRules::default();
    for (_, rule) in ranked {
        let Some(meta) = decls.meta(rule.block) else {
            continue;
        };
        if meta.has_values(Importance::Important) {
            ordered.important.push(*rule);
        }
        if meta.has_values(Importance::Normal) {
            ordered.normal.push(*rule);
        }
    }
    ordered
}
