//! Path-addressed, copy-on-write edits over a [`RuleNode`] tree.
//!
//! A path is a sequence of child indices from the root; the empty path is the
//! root itself. Every operation borrows the input tree and returns a new one.
//! Only the nodes on the path are rebuilt, all other subtrees are shared with
//! the input. Edits aimed at a node of the wrong kind, or at a path that does
//! not exist, return the tree unchanged.

use std::sync::Arc;

use tracing::debug;

use crate::types::{Catalog, EditError, Group, Logic, Rule, RuleNode};

/// Apply `f` to the node at `path`, rebuilding its ancestors.
///
/// If the path descends through a rule or past the end of a group's
/// children, the tree is returned unchanged.
#[must_use]
pub fn update_at<F>(tree: &RuleNode, path: &[usize], f: F) -> RuleNode
where
    F: FnOnce(&RuleNode) -> RuleNode,
{
    let Some((&head, rest)) = path.split_first() else {
        return f(tree);
    };
    let RuleNode::Group(group) = tree else {
        return tree.clone();
    };
    let Some(child) = group.children.get(head) else {
        return tree.clone();
    };

    let updated = update_at(child, rest, f);
    if updated.ptr_eq(child) {
        return tree.clone();
    }
    let mut children = group.children.clone();
    children[head] = updated;
    RuleNode::Group(Arc::new(Group {
        logic: group.logic,
        children,
    }))
}

/// The node at `path`, if it exists.
#[must_use]
pub fn node_at<'a>(tree: &'a RuleNode, path: &[usize]) -> Option<&'a RuleNode> {
    path.iter()
        .try_fold(tree, |node, &idx| node.children().get(idx))
}

/// Replace the subtree at `path` with `node`.
#[must_use]
pub fn replace_subtree(tree: &RuleNode, path: &[usize], node: RuleNode) -> RuleNode {
    update_at(tree, path, |_| node)
}

/// Switch the rule at `path` to another catalog type, resetting its
/// comparator to the type's first one and clearing its value.
///
/// # Errors
///
/// Returns [`EditError::UnknownRuleType`] if the catalog has no such type.
pub fn set_field_type(
    tree: &RuleNode,
    path: &[usize],
    type_value: &str,
    catalog: &Catalog,
) -> Result<RuleNode, EditError> {
    let replacement = RuleNode::rule_with_type(catalog, type_value)?;
    Ok(update_at(tree, path, |node| match node {
        RuleNode::Rule(_) => replacement,
        RuleNode::Group(_) => node.clone(),
    }))
}

/// Set the comparator of the rule at `path`. Keys outside the rule's type
/// leave the rule unchanged.
#[must_use]
pub fn set_comparator(tree: &RuleNode, path: &[usize], comp_value: &str) -> RuleNode {
    update_rule(tree, path, |rule| {
        let Some(comparator) = rule.rule_type.find_comparator(comp_value) else {
            debug!(
                rule_type = %rule.rule_type.value,
                comparator = comp_value,
                "comparator not offered by rule type, edit ignored"
            );
            return None;
        };
        Some(Rule {
            rule_type: Arc::clone(&rule.rule_type),
            comparator: comparator.clone(),
            value: rule.value.clone(),
        })
    })
}

/// Set the literal value of the rule at `path`. The value is not checked;
/// run the validator for that.
#[must_use]
pub fn set_value(tree: &RuleNode, path: &[usize], value: &str) -> RuleNode {
    update_rule(tree, path, |rule| {
        Some(Rule {
            rule_type: Arc::clone(&rule.rule_type),
            comparator: rule.comparator.clone(),
            value: value.to_owned(),
        })
    })
}

/// Set the combinator of the group at `path`.
#[must_use]
pub fn set_logic(tree: &RuleNode, path: &[usize], logic: Logic) -> RuleNode {
    update_group(tree, path, |group| {
        Some(Group {
            logic,
            children: group.children.clone(),
        })
    })
}

/// Insert `child` right after position `after` of the group at `path`.
///
/// `None` inserts at the head; a position past the end appends.
#[must_use]
pub fn insert_child(
    tree: &RuleNode,
    path: &[usize],
    after: Option<usize>,
    child: RuleNode,
) -> RuleNode {
    update_group(tree, path, |group| {
        let at = after.map_or(0, |idx| (idx + 1).min(group.children.len()));
        let mut children = group.children.clone();
        children.insert(at, child);
        Some(Group {
            logic: group.logic,
            children,
        })
    })
}

/// Insert a blank rule of the catalog's first type after position `after`.
#[must_use]
pub fn add_default_rule(
    tree: &RuleNode,
    path: &[usize],
    after: Option<usize>,
    catalog: &Catalog,
) -> RuleNode {
    insert_child(tree, path, after, RuleNode::default_rule(catalog))
}

/// Insert an `AND` group holding one blank rule after position `after`.
#[must_use]
pub fn add_default_group(
    tree: &RuleNode,
    path: &[usize],
    after: Option<usize>,
    catalog: &Catalog,
) -> RuleNode {
    insert_child(tree, path, after, RuleNode::default_group(catalog))
}

/// Remove the child at `index` of the group at `path`.
///
/// A group's last remaining child is never removed, and out-of-range
/// indices are ignored.
#[must_use]
pub fn remove_child(tree: &RuleNode, path: &[usize], index: usize) -> RuleNode {
    update_group(tree, path, |group| {
        if group.children.len() <= 1 || index >= group.children.len() {
            debug!(
                index,
                children = group.children.len(),
                "child removal ignored"
            );
            return None;
        }
        let mut children = group.children.clone();
        children.remove(index);
        Some(Group {
            logic: group.logic,
            children,
        })
    })
}

fn update_rule<F>(tree: &RuleNode, path: &[usize], f: F) -> RuleNode
where
    F: FnOnce(&Rule) -> Option<Rule>,
{
    update_at(tree, path, |node| match node {
        RuleNode::Rule(rule) => {
            f(rule).map_or_else(|| node.clone(), |r| RuleNode::Rule(Arc::new(r)))
        }
        RuleNode::Group(_) => node.clone(),
    })
}

fn update_group<F>(tree: &RuleNode, path: &[usize], f: F) -> RuleNode
where
    F: FnOnce(&Group) -> Option<Group>,
{
    update_at(tree, path, |node| match node {
        RuleNode::Group(group) => {
            f(group).map_or_else(|| node.clone(), |g| RuleNode::Group(Arc::new(g)))
        }
        RuleNode::Rule(_) => node.clone(),
    })
}
