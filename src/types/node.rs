use std::fmt;
use std::sync::Arc;

use super::catalog::Catalog;
use super::error::EditError;
use super::rule_type::{Comparator, RuleType};

/// How a group combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }

    /// Lenient parse used for stored documents: only the literal `OR`
    /// selects [`Logic::Or`], anything else is [`Logic::And`].
    #[must_use]
    pub fn from_lenient(input: &str) -> Self {
        if input == "OR" {
            Logic::Or
        } else {
            Logic::And
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf comparison: `rule_type` `comparator` `value`.
///
/// `comparator` is expected to be one of `rule_type.comparators`; the edit
/// operations keep it that way.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub rule_type: Arc<RuleType>,
    pub comparator: Comparator,
    pub value: String,
}

/// An interior node combining its children with [`Logic`].
///
/// May be empty while being edited; the validator reports empty groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub logic: Logic,
    pub children: Vec<RuleNode>,
}

/// A node of a rule tree.
///
/// Nodes are immutable and reference counted: cloning a node is cheap, and
/// the [`edit`](crate::edit) operations rebuild only the nodes on the edited
/// path, sharing every other subtree with the input tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    Rule(Arc<Rule>),
    Group(Arc<Group>),
}

impl RuleNode {
    #[must_use]
    pub fn rule(
        rule_type: Arc<RuleType>,
        comparator: Comparator,
        value: impl Into<String>,
    ) -> Self {
        RuleNode::Rule(Arc::new(Rule {
            rule_type,
            comparator,
            value: value.into(),
        }))
    }

    #[must_use]
    pub fn group(logic: Logic, children: Vec<RuleNode>) -> Self {
        RuleNode::Group(Arc::new(Group { logic, children }))
    }

    /// A rule of the catalog's first type with its first comparator and an
    /// empty value.
    #[must_use]
    pub fn default_rule(catalog: &Catalog) -> Self {
        let rule_type = Arc::clone(catalog.first());
        Self::blank_rule(rule_type)
    }

    /// An `AND` group holding one default rule. This is the root of a new
    /// editing session.
    #[must_use]
    pub fn default_group(catalog: &Catalog) -> Self {
        Self::group(Logic::And, vec![Self::default_rule(catalog)])
    }

    /// A blank rule of the given catalog type.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownRuleType`] if the catalog has no such type.
    pub fn rule_with_type(catalog: &Catalog, type_value: &str) -> Result<Self, EditError> {
        let rule_type = catalog
            .get(type_value)
            .ok_or_else(|| EditError::UnknownRuleType {
                value: type_value.to_owned(),
            })?;
        Ok(Self::blank_rule(Arc::clone(rule_type)))
    }

    fn blank_rule(rule_type: Arc<RuleType>) -> Self {
        let comparator = rule_type
            .first_comparator()
            .cloned()
            .unwrap_or_else(|| Comparator::new("", ""));
        Self::rule(rule_type, comparator, "")
    }

    #[must_use]
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            RuleNode::Rule(rule) => Some(rule),
            RuleNode::Group(_) => None,
        }
    }

    #[must_use]
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            RuleNode::Group(group) => Some(group),
            RuleNode::Rule(_) => None,
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, RuleNode::Group(_))
    }

    /// Children of a group; empty for a rule.
    #[must_use]
    pub fn children(&self) -> &[RuleNode] {
        match self {
            RuleNode::Group(group) => &group.children,
            RuleNode::Rule(_) => &[],
        }
    }

    /// Whether two nodes are the same shared allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &RuleNode) -> bool {
        match (self, other) {
            (RuleNode::Rule(a), RuleNode::Rule(b)) => Arc::ptr_eq(a, b),
            (RuleNode::Group(a), RuleNode::Group(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Total number of rules (leaves) in this subtree.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        match self {
            RuleNode::Rule(_) => 1,
            RuleNode::Group(group) => group.children.iter().map(RuleNode::rule_count).sum(),
        }
    }

    /// Nesting depth; a single rule has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            RuleNode::Rule(_) => 1,
            RuleNode::Group(group) => {
                1 + group.children.iter().map(RuleNode::depth).max().unwrap_or(0)
            }
        }
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNode::Rule(rule) => write!(
                f,
                "{} {} {:?}",
                rule.rule_type.value, rule.comparator.value, rule.value
            ),
            RuleNode::Group(group) => {
                write!(f, "(")?;
                for (i, child) in group.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", group.logic)?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}
