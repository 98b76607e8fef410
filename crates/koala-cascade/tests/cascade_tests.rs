//! Integration tests for cascade traversal and priority.

use koala_cascade::{
    BoxStyle, CascadeConfig, CascadeNode, CascadeSource, Color, ColorValue, ComplexSelector,
    Combinator, CompoundSelector, CssWideKeyword, DeclBlock, DeclaredValues, DisplayValue,
    Environment, Importance, Origin, Rgba, RuleEntry, SpecifiedValue, run,
};
use koala_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

const RED: ColorValue = ColorValue::Rgba(Rgba::from_u32(0xff00_00ff));
const BLUE: ColorValue = ColorValue::Rgba(Rgba::from_u32(0x0000_ffff));
const GREEN: ColorValue = ColorValue::Rgba(Rgba::from_u32(0x00ff_00ff));

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Helper to create element node types
fn make_element(tag: &str, id: Option<&str>, classes: &[&str]) -> NodeType {
    let mut attrs = AttributesMap::new();
    if let Some(id_val) = id {
        let _ = attrs.insert("id".to_string(), id_val.to_string());
    }
    if !classes.is_empty() {
        let _ = attrs.insert("class".to_string(), classes.join(" "));
    }
    NodeType::Element(ElementData {
        tag_name: tag.to_string(),
        attrs,
    })
}

/// `<html><body><p id="main" class="a b">text</p></body></html>`
fn sample_tree() -> (DomTree, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let html = tree.alloc(make_element("html", None, &[]));
    let body = tree.alloc(make_element("body", None, &[]));
    let p = tree.alloc(make_element("p", Some("main"), &["a", "b"]));
    let text = tree.alloc(NodeType::Text("text".to_string()));
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, body);
    tree.append_child(body, p);
    tree.append_child(p, text);
    (tree, body, p)
}

fn display_block(env: &mut Environment, importance: Importance, display: DisplayValue) -> DeclBlock {
    let block = env.decls.new_block().unwrap();
    let style = BoxStyle {
        display: SpecifiedValue::Declared(display),
        ..BoxStyle::default()
    };
    env.decls.add_aggregate(block, importance, &style).unwrap();
    block
}

fn color_block(env: &mut Environment, importance: Importance, color: ColorValue) -> DeclBlock {
    let block = env.decls.new_block().unwrap();
    let value = Color {
        color: SpecifiedValue::Declared(color),
    };
    env.decls.add_aggregate(block, importance, &value).unwrap();
    block
}

fn rule(env: &mut Environment, selector: impl Into<ComplexSelector>, block: DeclBlock) -> RuleEntry {
    RuleEntry {
        selector: env.selectors.push(selector),
        block,
    }
}

fn sheet(env: &Environment, name: &str, rules: &[RuleEntry]) -> CascadeSource {
    CascadeSource::from_rules(name, &env.selectors, &env.decls, rules)
}

fn display_of(env: &Environment, node: NodeId) -> Option<SpecifiedValue<DisplayValue>> {
    env.cascaded
        .get(node)
        .and_then(|view| view.get::<BoxStyle>())
        .map(|style| style.display.clone())
}

fn color_of(env: &Environment, node: NodeId) -> Option<SpecifiedValue<ColorValue>> {
    env.cascaded
        .get(node)
        .and_then(|view| view.get::<Color>())
        .map(|value| value.color.clone())
}

#[test]
fn test_important_beats_every_normal() {
    init_logging();
    let (tree, _, p) = sample_tree();
    let mut env = Environment::default();

    let ua_block = display_block(&mut env, Importance::Normal, DisplayValue::Block);
    let ua_important = display_block(&mut env, Importance::Important, DisplayValue::None);
    let author_block = display_block(&mut env, Importance::Normal, DisplayValue::Inline);

    let ua_rules = [
        rule(&mut env, CompoundSelector::tag("p"), ua_block),
        rule(&mut env, CompoundSelector::tag("p"), ua_important),
    ];
    let author_rules = [rule(&mut env, CompoundSelector::class("a"), author_block)];
    let ua = sheet(&env, "ua", &ua_rules);
    let author = sheet(&env, "author", &author_rules);
    env.cascade_list.push(Origin::UserAgent, ua);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert_eq!(display_of(&env, p), Some(SpecifiedValue::Declared(DisplayValue::None)));
}

#[test]
fn test_author_normal_beats_user_agent_normal() {
    let (tree, _, p) = sample_tree();
    let mut env = Environment::default();

    let ua_block = display_block(&mut env, Importance::Normal, DisplayValue::Block);
    let author_block = display_block(&mut env, Importance::Normal, DisplayValue::Inline);
    let ua_rules = [rule(&mut env, CompoundSelector::id("main"), ua_block)];
    let author_rules = [rule(&mut env, CompoundSelector::tag("p"), author_block)];
    let ua = sheet(&env, "ua", &ua_rules);
    let author = sheet(&env, "author", &author_rules);
    env.cascade_list.push(Origin::UserAgent, ua);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert_eq!(display_of(&env, p), Some(SpecifiedValue::Declared(DisplayValue::Inline)));
}

#[test]
fn test_user_important_beats_author_important() {
    let (tree, _, p) = sample_tree();
    let mut env = Environment::default();

    let user_block = color_block(&mut env, Importance::Important, GREEN);
    let author_block = color_block(&mut env, Importance::Important, RED);
    let user_rules = [rule(&mut env, CompoundSelector::tag("p"), user_block)];
    let author_rules = [rule(&mut env, CompoundSelector::id("main"), author_block)];
    let user = sheet(&env, "user", &user_rules);
    let author = sheet(&env, "author", &author_rules);
    env.cascade_list.push(Origin::User, user);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert_eq!(color_of(&env, p), Some(SpecifiedValue::Declared(GREEN)));
}

#[test]
fn test_id_beats_two_classes() {
    let (tree, _, p) = sample_tree();
    let mut env = Environment::default();

    let red = color_block(&mut env, Importance::Normal, RED);
    let blue = color_block(&mut env, Importance::Normal, BLUE);
    let rules = [
        rule(&mut env, CompoundSelector::id("main"), red),
        rule(&mut env, CompoundSelector::class("a").and_class("b"), blue),
    ];
    let author = sheet(&env, "author", &rules);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert_eq!(color_of(&env, p), Some(SpecifiedValue::Declared(RED)));
}

#[test]
fn test_later_rule_wins_tie() {
    let (tree, _, p) = sample_tree();
    let mut env = Environment::default();

    let red = color_block(&mut env, Importance::Normal, RED);
    let blue = color_block(&mut env, Importance::Normal, BLUE);
    let rules = [
        rule(&mut env, CompoundSelector::tag("p"), red),
        rule(&mut env, CompoundSelector::tag("p"), blue),
    ];
    let author = sheet(&env, "author", &rules);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert_eq!(color_of(&env, p), Some(SpecifiedValue::Declared(BLUE)));
}

#[test]
fn test_style_attribute_applies_before_rules() {
    let (tree, _, p) = sample_tree();
    let mut env = Environment::default();

    let attr = color_block(&mut env, Importance::Normal, GREEN);
    let by_id = color_block(&mut env, Importance::Normal, RED);
    let rules = [rule(&mut env, CompoundSelector::id("main"), by_id)];
    let mut author = sheet(&env, "author", &rules);
    author.set_style_attribute(&env.decls, p, attr).unwrap();
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert_eq!(color_of(&env, p), Some(SpecifiedValue::Declared(GREEN)));
}

#[test]
fn test_earlier_list_node_takes_priority() {
    let (tree, body, p) = sample_tree();
    let mut env = Environment::default();

    let overrides = color_block(&mut env, Importance::Normal, BLUE);
    let base = color_block(&mut env, Importance::Normal, RED);
    let override_rules = [rule(&mut env, CompoundSelector::tag("p"), overrides)];
    let base_rules = [rule(&mut env, CompoundSelector::universal(), base)];
    let first = sheet(&env, "overrides", &override_rules);
    let second = sheet(&env, "base", &base_rules);
    env.cascade_list.push(
        Origin::Author,
        CascadeNode::Inner(vec![CascadeNode::Leaf(first), CascadeNode::Leaf(second)]),
    );

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert_eq!(color_of(&env, p), Some(SpecifiedValue::Declared(BLUE)));
    assert_eq!(color_of(&env, body), Some(SpecifiedValue::Declared(RED)));
}

#[test]
fn test_combinator_rule_matches_only_in_context() {
    let (tree, body, p) = sample_tree();
    let mut env = Environment::default();

    let block = display_block(&mut env, Importance::Normal, DisplayValue::Flex);
    let selector = ComplexSelector::from(CompoundSelector::tag("p"))
        .combined(Combinator::Child, CompoundSelector::tag("body"))
        .combined(Combinator::Descendant, CompoundSelector::tag("html"));
    let rules = [rule(&mut env, selector, block)];
    let author = sheet(&env, "author", &rules);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert_eq!(display_of(&env, p), Some(SpecifiedValue::Declared(DisplayValue::Flex)));
    assert!(env.cascaded.get(body).is_none());
}

#[test]
fn test_all_from_higher_priority_block() {
    let (tree, _, p) = sample_tree();
    let mut env = Environment::default();

    let reset = env.decls.new_block().unwrap();
    env.decls
        .add_all(reset, Importance::Normal, CssWideKeyword::Initial)
        .unwrap();
    let color = color_block(&mut env, Importance::Normal, RED);
    let rules = [
        rule(&mut env, CompoundSelector::tag("p"), color),
        rule(&mut env, CompoundSelector::id("main"), reset),
    ];
    let author = sheet(&env, "author", &rules);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    let view = env.cascaded.get(p).unwrap();
    assert_eq!(view.all(), Some(CssWideKeyword::Initial));
    assert!(view.get::<Color>().is_none());
}

#[test]
fn test_rerun_replaces_previous_results() {
    let (mut tree, body, p) = sample_tree();
    let mut env = Environment::new(CascadeConfig::default());

    let block = env.decls.new_block().unwrap();
    let mut values = DeclaredValues::default();
    values.box_style.display = SpecifiedValue::Declared(DisplayValue::Block);
    values.color.color = SpecifiedValue::Declared(BLUE);
    env.decls.add_values(block, Importance::Normal, &values).unwrap();
    let rules = [rule(&mut env, CompoundSelector::tag("div"), block)];
    let author = sheet(&env, "author", &rules);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert!(env.cascaded.is_empty());

    let div = tree.alloc(make_element("div", None, &[]));
    tree.append_child(body, div);
    run(&mut env, &tree, NodeId::ROOT).unwrap();
    assert_eq!(env.cascaded.len(), 1);
    assert_eq!(color_of(&env, div), Some(SpecifiedValue::Declared(BLUE)));
    assert!(env.cascaded.get(p).is_none());
}

#[test]
fn test_run_on_subtree() {
    let (tree, body, p) = sample_tree();
    let mut env = Environment::default();

    let block = display_block(&mut env, Importance::Normal, DisplayValue::Grid);
    let rules = [rule(&mut env, CompoundSelector::universal(), block)];
    let author = sheet(&env, "author", &rules);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, p).unwrap();
    assert!(env.cascaded.get(p).is_some());
    assert!(env.cascaded.get(body).is_none());
}

#[test]
fn test_style_attribute_only_reaches_elements_in_scope() {
    let mut tree = DomTree::new();
    let body = tree.alloc(make_element("body", None, &[]));
    let p = tree.alloc(make_element("p", None, &[]));
    let span = tree.alloc(make_element("span", None, &[]));
    let text = tree.alloc(NodeType::Text("text".to_string()));
    tree.append_child(NodeId::ROOT, body);
    tree.append_child(body, p);
    tree.append_child(p, span);
    tree.append_child(p, text);

    let mut env = Environment::default();
    let block = display_block(&mut env, Importance::Normal, DisplayValue::Flex);
    let mut author = CascadeSource::new("inline");
    for node in [body, p, span, text] {
        author.set_style_attribute(&env.decls, node, block).unwrap();
    }
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, p).unwrap();
    assert_eq!(display_of(&env, p), Some(SpecifiedValue::Declared(DisplayValue::Flex)));
    assert_eq!(display_of(&env, span), Some(SpecifiedValue::Declared(DisplayValue::Flex)));
    assert!(env.cascaded.get(text).is_none());
    assert!(env.cascaded.get(body).is_none());
    assert_eq!(env.cascaded.len(), 2);
}

#[test]
fn test_all_leaves_fields_declared_before_it() {
    let (tree, _, p) = sample_tree();
    let mut env = Environment::default();

    let block = display_block(&mut env, Importance::Normal, DisplayValue::Flex);
    env.decls
        .add_all(block, Importance::Normal, CssWideKeyword::Initial)
        .unwrap();
    let rules = [rule(&mut env, CompoundSelector::tag("p"), block)];
    let author = sheet(&env, "author", &rules);
    env.cascade_list.push(Origin::Author, author);

    run(&mut env, &tree, NodeId::ROOT).unwrap();
    let view = env.cascaded.get(p).unwrap();
    assert_eq!(view.all(), Some(CssWideKeyword::Initial));
    let style = view.get::<BoxStyle>().unwrap();
    assert_eq!(style.display, SpecifiedValue::Declared(DisplayValue::Flex));
    assert!(style.position.is_undeclared());
    assert!(view.get::<Color>().is_none());
}
