use std::sync::Arc;

use tracing::debug;

use super::document::Element;
use super::error::MalformedXml;
use crate::types::{Catalog, Comparator, Logic, RuleNode};

/// Decode an XML rule document against a catalog.
///
/// The root is the `group` inside a `rules` element, or a bare top-level
/// `group`. Rule type and comparator keys missing from the catalog fall back
/// to the catalog's first type and that type's first comparator; this is not
/// an error.
///
/// # Errors
///
/// Returns [`MalformedXml`] if the input is not well-formed XML or contains
/// no rule tree.
pub fn decode(input: &str, catalog: &Catalog) -> Result<RuleNode, MalformedXml> {
    let root = super::parse_document(input)?;
    match root.name.as_str() {
        "group" => Ok(decode_group(&root, catalog)),
        "rules" => decode_rules(&root, catalog),
        other => Err(MalformedXml::new(format!(
            "unexpected root element <{other}>, expected <rules> or <group>"
        ))),
    }
}

fn decode_rules(rules: &Element, catalog: &Catalog) -> Result<RuleNode, MalformedXml> {
    if let Some(group) = rules.child("group") {
        return Ok(decode_group(group, catalog));
    }
    // A lone rule is what the encoder writes for a rule-rooted tree.
    let mut elements = rules.elements();
    match (elements.next(), elements.next()) {
        (Some(only), None) if only.name != "logic" => Ok(decode_rule(only, catalog)),
        _ => Err(MalformedXml::new("document has no root group")),
    }
}

fn decode_group(el: &Element, catalog: &Catalog) -> RuleNode {
    let logic = el
        .attr("logic")
        .map(str::to_owned)
        .or_else(|| el.child("logic").map(Element::trimmed_text))
        .map_or(Logic::And, |s| Logic::from_lenient(&s));

    let members = el.elements().filter(|e| e.name != "logic");
    let has_legacy = el.elements().any(|e| e.name == "rule");

    let children = if has_legacy {
        merged_children(members.collect(), catalog)
    } else {
        members.map(|e| decode_node(e, catalog)).collect()
    };
    RuleNode::group(logic, children)
}

/// Mixed legacy and typed content: legacy rules first, then typed rules in
/// catalog order (unknown keys last), then nested groups.
fn merged_children(members: Vec<&Element>, catalog: &Catalog) -> Vec<RuleNode> {
    let (groups, rules): (Vec<&Element>, Vec<&Element>) =
        members.into_iter().partition(|e| e.name == "group");
    let (legacy, mut typed): (Vec<&Element>, Vec<&Element>) =
        rules.into_iter().partition(|e| e.name == "rule");
    typed.sort_by_key(|e| catalog.position(&e.name).unwrap_or(usize::MAX));

    legacy
        .into_iter()
        .chain(typed)
        .map(|e| decode_rule(e, catalog))
        .chain(groups.into_iter().map(|e| decode_group(e, catalog)))
        .collect()
}

fn decode_node(el: &Element, catalog: &Catalog) -> RuleNode {
    if el.name == "group" {
        decode_group(el, catalog)
    } else {
        decode_rule(el, catalog)
    }
}

fn decode_rule(el: &Element, catalog: &Catalog) -> RuleNode {
    if el.name == "rule" {
        let key = |name: &str| el.child(name).map(Element::trimmed_text).unwrap_or_default();
        let value = el.child("value").map(Element::text).unwrap_or_default();
        resolve(catalog, &key("name"), &key("comparator"), value)
    } else {
        let comparator = el.attr("comparator").unwrap_or_default();
        resolve(catalog, &el.name, comparator, el.text())
    }
}

fn resolve(catalog: &Catalog, type_key: &str, comp_key: &str, value: String) -> RuleNode {
    let rule_type = match catalog.get(type_key) {
        Some(t) => t,
        None => {
            let fallback = catalog.first();
            debug!(
                rule_type = type_key,
                fallback = %fallback.value,
                "unknown rule type in document"
            );
            fallback
        }
    };
    let comparator = match rule_type.find_comparator(comp_key) {
        Some(c) => Some(c),
        None => {
            debug!(
                rule_type = %rule_type.value,
                comparator = comp_key,
                "unknown comparator in document"
            );
            rule_type.first_comparator()
        }
    };
    let comparator = comparator.cloned().unwrap_or_else(|| Comparator::new("", ""));
    RuleNode::rule(Arc::clone(rule_type), comparator, value)
}
