use serde::{Deserialize, Serialize};

use crate::domain::{ModuleCode, RequisiteNode};

/// A display-oriented unfolding of a requisite tree.
///
/// Module codes become named leaves and `and`/`or` branches become named
/// containers. The root is always the owning module, so a module without a
/// prerequisite is a root with no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationNode {
    /// Module code or operator name.
    pub name: String,
    /// Child nodes, in the order of the requisite tree.
    pub children: Vec<PresentationNode>,
}

impl PresentationNode {
    /// A node without children.
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Builds the presentation tree rooted at `module`.
    #[must_use]
    pub fn for_module(module: &ModuleCode, prerequisite: Option<&RequisiteNode>) -> Self {
        Self {
            name: module.to_string(),
            children: prerequisite.map(Self::from).into_iter().collect(),
        }
    }
}

impl From<&RequisiteNode> for PresentationNode {
    fn from(node: &RequisiteNode) -> Self {
        let name = match node {
            RequisiteNode::Leaf(code) => return Self::leaf(code.as_str()),
            RequisiteNode::And(_) => "and",
            RequisiteNode::Or(_) => "or",
        };
        Self {
            name: name.to_string(),
            children: node.children().iter().map(Self::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn code(s: &str) -> ModuleCode {
        ModuleCode::try_from(s).unwrap()
    }

    #[test]
    fn module_without_prerequisite_is_bare_root() {
        let tree = PresentationNode::for_module(&code("CS1010"), None);
        assert_eq!(tree, PresentationNode::leaf("CS1010"));
    }

    #[test]
    fn branches_become_named_containers() {
        let prerequisite = RequisiteNode::and([
            RequisiteNode::Leaf(code("CS1010")),
            RequisiteNode::or([
                RequisiteNode::Leaf(code("CS1231")),
                RequisiteNode::Leaf(code("MA1100")),
            ]),
        ]);
        let tree = PresentationNode::for_module(&code("CS2040"), Some(&prerequisite));
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({
                "name": "CS2040",
                "children": [{
                    "name": "and",
                    "children": [
                        { "name": "CS1010", "children": [] },
                        {
                            "name": "or",
                            "children": [
                                { "name": "CS1231", "children": [] },
                                { "name": "MA1100", "children": [] },
                            ],
                        },
                    ],
                }],
            })
        );
    }
}
