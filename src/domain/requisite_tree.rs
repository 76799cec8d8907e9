//! A parsed requisite is a boolean tree of module codes.
//!
//! Serialised form, shared with downstream consumers:
//!
//! - a leaf is a bare module code string: `"CS1010"`
//! - a conjunction is `{ "and": [...] }`
//! - a disjunction is `{ "or": [...] }`

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::domain::ModuleCode;

/// A node in a parsed requisite tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequisiteNode {
    /// All children must be satisfied.
    And(Vec<RequisiteNode>),
    /// Any one child must be satisfied.
    Or(Vec<RequisiteNode>),
    /// A single module.
    #[serde(untagged)]
    Leaf(ModuleCode),
}

impl RequisiteNode {
    /// Builds an `And` node, dropping repeated children while keeping the
    /// order of first appearance.
    #[must_use]
    pub fn and(children: impl IntoIterator<Item = Self>) -> Self {
        Self::And(dedup(children))
    }

    /// Builds an `Or` node, dropping repeated children while keeping the
    /// order of first appearance.
    #[must_use]
    pub fn or(children: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(dedup(children))
    }

    /// Returns the children of a branch node, or an empty slice for a leaf.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::And(children) | Self::Or(children) => children,
            Self::Leaf(_) => &[],
        }
    }

    /// Every module code mentioned anywhere in the tree.
    #[must_use]
    pub fn modules(&self) -> BTreeSet<&ModuleCode> {
        let mut modules = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Self::Leaf(code) = node {
                modules.insert(code);
            }
            stack.extend(node.children());
        }
        modules
    }
}

fn dedup(children: impl IntoIterator<Item = RequisiteNode>) -> Vec<RequisiteNode> {
    let mut unique: Vec<RequisiteNode> = Vec::new();
    for child in children {
        if !unique.contains(&child) {
            unique.push(child);
        }
    }
    unique
}

impl fmt::Display for RequisiteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (children, operator) = match self {
            Self::Leaf(code) => return write!(f, "{code}"),
            Self::And(children) => (children, " and "),
            Self::Or(children) => (children, " or "),
        };
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                f.write_str(operator)?;
            }
            match child {
                Self::Leaf(_) => write!(f, "{child}")?,
                _ => write!(f, "({child})")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn leaf(code: &str) -> RequisiteNode {
        RequisiteNode::Leaf(ModuleCode::try_from(code).unwrap())
    }

    #[test]
    fn constructors_deduplicate_children() {
        let node = RequisiteNode::or([leaf("CS1000"), leaf("CS1001"), leaf("CS1000")]);
        assert_eq!(node, RequisiteNode::Or(vec![leaf("CS1000"), leaf("CS1001")]));
    }

    #[test]
    fn serialises_to_nested_objects() {
        let tree = RequisiteNode::and([
            leaf("CS1010"),
            RequisiteNode::or([leaf("CS1231"), leaf("MA1100")]),
        ]);
        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value, json!({ "and": ["CS1010", { "or": ["CS1231", "MA1100"] }] }));
    }

    #[test]
    fn deserialises_from_nested_objects() {
        let tree: RequisiteNode =
            serde_json::from_value(json!({ "or": ["CS1010", { "and": ["CS1231", "MA1100"] }] }))
                .unwrap();
        assert_eq!(
            tree,
            RequisiteNode::Or(vec![
                leaf("CS1010"),
                RequisiteNode::And(vec![leaf("CS1231"), leaf("MA1100")]),
            ])
        );
        let single: RequisiteNode = serde_json::from_value(json!("CS2040")).unwrap();
        assert_eq!(single, leaf("CS2040"));
    }

    #[test]
    fn modules_flattens_every_branch() {
        let tree = RequisiteNode::and([
            leaf("CS1010"),
            RequisiteNode::or([leaf("CS1231"), RequisiteNode::and([leaf("MA1100"), leaf("CS1010")])]),
        ]);
        let modules: Vec<&str> = tree.modules().into_iter().map(ModuleCode::as_str).collect();
        assert_eq!(modules, ["CS1010", "CS1231", "MA1100"]);
    }

    #[test]
    fn display_parenthesises_branches() {
        let tree = RequisiteNode::and([
            leaf("CS1010"),
            RequisiteNode::or([leaf("CS1231"), leaf("MA1100")]),
        ]);
        assert_eq!(tree.to_string(), "CS1010 and (CS1231 or MA1100)");
    }
}
