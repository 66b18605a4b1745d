use super::document::Element;
use crate::types::RuleNode;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Presentation options for [`encode_with`]. Both forms decode to the same
/// tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Put nested elements on their own lines.
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set.
    pub indent: usize,
}

impl EncodeOptions {
    /// Single-line output.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent: 0,
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 2,
        }
    }
}

/// Encode a tree as an indented XML document.
#[must_use]
pub fn encode(tree: &RuleNode) -> String {
    encode_with(tree, &EncodeOptions::default())
}

/// Encode a tree as an XML document.
///
/// The encoder does not validate; an invalid tree is written as is.
#[must_use]
pub fn encode_with(tree: &RuleNode, options: &EncodeOptions) -> String {
    let root = Element::new("rules").with_child(node_element(tree));
    let indent = options.pretty.then_some(options.indent);

    let mut out = String::from(DECLARATION);
    if indent.is_some() {
        out.push('\n');
    }
    root.write(&mut out, indent, 0);
    out
}

fn node_element(node: &RuleNode) -> Element {
    match node {
        RuleNode::Rule(rule) => Element::new(&rule.rule_type.value)
            .with_attr("comparator", &rule.comparator.value)
            .with_text(&rule.value),
        RuleNode::Group(group) => group.children.iter().fold(
            Element::new("group").with_attr("logic", group.logic.as_str()),
            |el, child| el.with_child(node_element(child)),
        ),
    }
}
