use crate::store::Node;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The computed, read-time value of a key. Never stored: rebuilt from the
/// root's raw reply list on every read.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueTree {
    pub value: String,
    pub children: Vec<ValueTree>,
}

impl ValueTree {
    pub fn leaf(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: Vec::new(),
        }
    }
}

/// Folds a root's ordered top-level replies into one logical value tree.
///
/// Zero replies means the key holds no value and reads as absent. A single
/// reply converts 1:1. With several top-level replies the first reply's text
/// becomes the tree's value and its children are, in order, the remaining
/// top-level replies followed by the first reply's own nested replies.
///
/// Set writes exactly one top-level reply and a root-level Append adds a
/// sibling next to it rather than nesting under it; this merge is what makes
/// those siblings visible as children of the logical root.
pub fn merge_replies(replies: &[Node]) -> Option<ValueTree> {
    let (first, rest) = replies.split_first()?;
    if rest.is_empty() {
        return Some(to_tree(first));
    }
    let mut children = Vec::with_capacity(rest.len() + first.children.len());
    children.extend(rest.iter().map(to_tree));
    children.extend(first.children.iter().map(to_tree));
    Some(ValueTree {
        value: first.text.clone(),
        children,
    })
}

/// Converts one reply and its nested replies 1:1. Below the top level every
/// reply has a real parent node, so there are no orphan siblings to fold in
/// and the merge never reapplies.
fn to_tree(node: &Node) -> ValueTree {
    ValueTree {
        value: node.text.clone(),
        children: node.children.iter().map(to_tree).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ChildId;

    fn node(id: &str, text: &str, children: Vec<Node>) -> Node {
        Node {
            id: ChildId::new(id),
            text: text.to_string(),
            children,
        }
    }

    #[test]
    fn zero_replies_is_no_value() {
        assert_eq!(merge_replies(&[]), None);
    }

    #[test]
    fn single_reply_converts_unchanged() {
        let replies = vec![node(
            "1",
            "root",
            vec![node("2", "a", vec![node("3", "b", vec![])])],
        )];
        let tree = merge_replies(&replies).unwrap();
        assert_eq!(tree.value, "root");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].value, "a");
        assert_eq!(tree.children[0].children[0].value, "b");
    }

    #[test]
    fn siblings_merge_under_the_first_reply() {
        let replies = vec![
            node("1", "root", vec![]),
            node("2", "s1", vec![]),
            node("3", "s2", vec![]),
        ];
        let tree = merge_replies(&replies).unwrap();
        assert_eq!(tree.value, "root");
        let values: Vec<_> = tree.children.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["s1", "s2"]);
    }

    #[test]
    fn siblings_come_before_the_first_replys_own_children() {
        let replies = vec![
            node("1", "root", vec![node("2", "child", vec![])]),
            node("3", "sibling", vec![]),
        ];
        let tree = merge_replies(&replies).unwrap();
        let values: Vec<_> = tree.children.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["sibling", "child"]);
    }

    #[test]
    fn nested_replies_do_not_remerge() {
        // A node with several children keeps them as plain children; the
        // fold only applies to the top-level reply list.
        let replies = vec![node(
            "1",
            "root",
            vec![node(
                "2",
                "mid",
                vec![node("3", "a", vec![]), node("4", "b", vec![])],
            )],
        )];
        let tree = merge_replies(&replies).unwrap();
        assert_eq!(tree.children[0].value, "mid");
        let values: Vec<_> = tree.children[0]
            .children
            .iter()
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(values, ["a", "b"]);
    }

    #[test]
    fn merged_siblings_keep_their_subtrees() {
        let replies = vec![
            node("1", "root", vec![]),
            node("2", "sibling", vec![node("3", "deep", vec![])]),
        ];
        let tree = merge_replies(&replies).unwrap();
        assert_eq!(tree.children[0].value, "sibling");
        assert_eq!(tree.children[0].children[0].value, "deep");
    }
}
