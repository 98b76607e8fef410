//! Cascade traversal.
//!
//! [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
//!
//! A run makes six passes, one per origin and importance, in the order of
//! [`CASCADE_ORDER`]. Each pass walks its origin's [`CascadeList`] depth
//! first and records, per element, the blocks that apply to it. Recording
//! order is priority order, so once every pass is done each element's
//! blocks are folded into its [`CascadedValues`](crate::CascadedValues) as
//! recorded.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use koala_dom::{DomTree, NodeId};
use rustc_hash::FxHashMap;

use crate::cascaded::CascadedStore;
use crate::config::CascadeConfig;
use crate::declarations::{DeclBlock, Declarations};
use crate::error::{CascadeError, DeclarationError};
use crate::ordering::{OrderedRules, RuleEntry, order_rules};
use crate::selector::SelectorData;
use crate::values::Importance;

/// [§ 6.3 Cascading Origins](https://www.w3.org/TR/css-cascade-4/#cascading-origins)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Engine defaults.
    UserAgent,
    /// Preferences of the person viewing the document.
    User,
    /// The document's own style sheets and `style` attributes.
    Author,
}

/// [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// "Declarations from origins earlier in this list win over declarations
/// from later origins."
///
/// Important declarations reverse the origin order, so user-agent
/// `!important` beats everything and user-agent normal loses to everything.
pub const CASCADE_ORDER: [(Origin, Importance); 6] = [
    (Origin::UserAgent, Importance::Important),
    (Origin::User, Importance::Important),
    (Origin::Author, Importance::Important),
    (Origin::Author, Importance::Normal),
    (Origin::User, Importance::Normal),
    (Origin::UserAgent, Importance::Normal),
];

/// One style sheet's contribution to the cascade: its ranked rules and
/// the `style` attributes it carries.
#[derive(Debug, Clone, Default)]
pub struct CascadeSource {
    /// Label used in log output.
    pub name: String,
    rules: OrderedRules,
    style_important: FxHashMap<NodeId, DeclBlock>,
    style_normal: FxHashMap<NodeId, DeclBlock>,
}

impl CascadeSource {
    /// Create a source with no rules.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Create a source from rules in source order.
    #[must_use]
    pub fn from_rules(
        name: &str,
        selectors: &SelectorData,
        decls: &Declarations,
        rules: &[RuleEntry],
    ) -> Self {
        Self {
            rules: order_rules(selectors, decls, rules),
            ..Self::new(name)
        }
    }

    /// Rules applied at `importance`, highest priority first.
    #[must_use]
    pub fn rules(&self, importance: Importance) -> &[RuleEntry] {
        self.rules.get(importance)
    }

    /// [CSS Style Attributes § 3](https://www.w3.org/TR/css-style-attr/#interpret)
    ///
    /// Attach `block` as the `style` attribute of `node`. The block is
    /// registered for each importance it has values at; a later call for
    /// the same node replaces the earlier block.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::UnknownBlock`] if `decls` never issued `block`.
    pub fn set_style_attribute(
        &mut self,
        decls: &Declarations,
        node: NodeId,
        block: DeclBlock,
    ) -> Result<(), DeclarationError> {
        let meta = decls.meta(block).ok_or(DeclarationError::UnknownBlock(block))?;
        for importance in Importance::ALL {
            let map = match importance {
                Importance::Important => &mut self.style_important,
                Importance::Normal => &mut self.style_normal,
            };
            if meta.has_values(importance) {
                let _ = map.insert(node, block);
            } else {
                let _ = map.remove(&node);
            }
        }
        Ok(())
    }

    /// `style` attribute blocks applied at `importance`.
    #[must_use]
    pub const fn style_attributes(&self, importance: Importance) -> &FxHashMap<NodeId, DeclBlock> {
        match importance {
            Importance::Important => &self.style_important,
            Importance::Normal => &self.style_normal,
        }
    }
}

/// A node of a [`CascadeList`]: one source, or an ordered group of nodes.
#[derive(Debug, Clone)]
pub enum CascadeNode {
    /// A single source.
    Leaf(CascadeSource),
    /// Children in priority order, highest first.
    Inner(Vec<CascadeNode>),
}

impl From<CascadeSource> for CascadeNode {
    fn from(source: CascadeSource) -> Self {
        Self::Leaf(source)
    }
}

/// Sources grouped by origin. Within an origin, earlier nodes take
/// priority over later ones.
#[derive(Debug, Clone, Default)]
pub struct CascadeList {
    /// User-agent sources.
    pub user_agent: Vec<CascadeNode>,
    /// User sources.
    pub user: Vec<CascadeNode>,
    /// Author sources.
    pub author: Vec<CascadeNode>,
}

impl CascadeList {
    /// Top-level nodes of `origin`.
    #[must_use]
    pub fn origin(&self, origin: Origin) -> &[CascadeNode] {
        match origin {
            Origin::UserAgent => &self.user_agent,
            Origin::User => &self.user,
            Origin::Author => &self.author,
        }
    }

    /// Append a node to `origin`, below every node already there.
    pub fn push(&mut self, origin: Origin, node: impl Into<CascadeNode>) {
        let nodes = match origin {
            Origin::UserAgent => &mut self.user_agent,
            Origin::User => &mut self.user,
            Origin::Author => &mut self.author,
        };
        nodes.push(node.into());
    }
}

/// Everything one document's cascade needs: declarations and selectors of
/// its style sheets, how the sheets are layered, and the cascaded output.
#[derive(Debug, Default)]
pub struct Environment {
    /// Declaration blocks of every source.
    pub decls: Declarations,
    /// Selectors of every source.
    pub selectors: SelectorData,
    /// Sources by origin.
    pub cascade_list: CascadeList,
    /// Output of the last successful [`run`].
    pub cascaded: CascadedStore,
}

impl Environment {
    /// Create an empty environment.
    #[must_use]
    pub fn new(config: CascadeConfig) -> Self {
        Self {
            decls: Declarations::with_config(config),
            ..Self::default()
        }
    }
}

/// Blocks recorded per element, in priority order.
type MatchList = FxHashMap<NodeId, Vec<(DeclBlock, Importance)>>;

struct Pass<'a> {
    tree: &'a DomTree,
    root: NodeId,
    selectors: &'a SelectorData,
    #[cfg_attr(not(feature = "cascade-trace"), allow(dead_code))]
    origin: Origin,
    importance: Importance,
    matches: &'a mut MatchList,
}

impl Pass<'_> {
    fn visit(&mut self, node: &CascadeNode) -> Result<(), CascadeError> {
        match node {
            CascadeNode::Leaf(source) => self.visit_source(source),
            CascadeNode::Inner(children) => {
                for child in children {
                    self.visit(child)?;
                }
                Ok(())
            }
        }
    }

    fn visit_source(&mut self, source: &CascadeSource) -> Result<(), CascadeError> {
        for (&node, &block) in source.style_attributes(self.importance) {
            if !self.in_scope(node) {
                continue;
            }
            #[cfg(feature = "cascade-trace")]
            log::trace!(
                "[{} {}] {}: style attribute {block:?} on {node:?}",
                self.origin,
                self.importance,
                source.name
            );
            self.record(node, block)?;
        }

        for rule in source.rules(self.importance) {
            for node in self.tree.descendants(self.root) {
                if self.tree.as_element(node).is_none()
                    || !self.selectors.matches(rule.selector, self.tree, node)
                {
                    continue;
                }
                #[cfg(feature = "cascade-trace")]
                log::trace!(
                    "[{} {}] {}: {:?} matched {node:?}",
                    self.origin,
                    self.importance,
                    source.name,
                    rule.selector
                );
                self.record(node, rule.block)?;
            }
        }
        Ok(())
    }

    /// Elements at or below the run's root.
    fn in_scope(&self, node: NodeId) -> bool {
        self.tree.as_element(node).is_some()
            && (node == self.root || self.tree.ancestors(node).any(|ancestor| ancestor == self.root))
    }

    fn record(&mut self, node: NodeId, block: DeclBlock) -> Result<(), CascadeError> {
        self.matches.try_reserve(1)?;
        let blocks = self.matches.entry(node).or_default();
        blocks.try_reserve(1)?;
        blocks.push((block, self.importance));
        Ok(())
    }
}

/// Run the cascade over `root` and its descendants, replacing
/// `env.cascaded`.
///
/// # Errors
///
/// [`CascadeError::OutOfMemory`] if an allocation fails. `env.cascaded` is
/// left empty in that case.
pub fn run(env: &mut Environment, tree: &DomTree, root: NodeId) -> Result<(), CascadeError> {
    env.cascaded.reset();
    let outcome = cascade(env, tree, root);
    if let Err(err) = &outcome {
        log::error!("cascade aborted: {err}");
        env.cascaded.reset();
    }
    outcome
}

fn cascade(env: &mut Environment, tree: &DomTree, root: NodeId) -> Result<(), CascadeError> {
    let mut matches = MatchList::default();
    for (origin, importance) in CASCADE_ORDER {
        let mut pass = Pass {
            tree,
            root,
            selectors: &env.selectors,
            origin,
            importance,
            matches: &mut matches,
        };
        for node in env.cascade_list.origin(origin) {
            pass.visit(node)?;
        }
    }

    let mut applied = 0usize;
    for (&node, blocks) in &matches {
        for &(block, importance) in blocks {
            env.cascaded
                .apply_decl_block(node, &env.decls, block, importance)?;
        }
        applied += blocks.len();
    }
    log::debug!(
        "cascade: {} elements matched, {applied} blocks applied, {} groups in arena",
        matches.len(),
        env.cascaded.arena().len()
    );
    Ok(())
}
