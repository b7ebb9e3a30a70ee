use crate::error::{Error, Result};
use crate::store::Node;

/// Walks an index path through a raw reply list and returns the addressed
/// node. Each element selects the 0-based nth child at that depth, starting
/// from the root's top-level replies.
///
/// Paths address the raw nested-reply structure, not the merged value tree;
/// the two differ whenever a root has more than one top-level reply.
pub fn resolve<'a>(replies: &'a [Node], path: &[usize]) -> Result<&'a Node> {
    // An empty path has no node to name; "attach at the root" is expressed
    // by the caller not resolving a path at all.
    let (&first, rest) = path
        .split_first()
        .ok_or_else(|| Error::InvalidPath(Vec::new()))?;
    let mut node = replies
        .get(first)
        .ok_or_else(|| Error::InvalidPath(path.to_vec()))?;
    for &index in rest {
        node = node
            .children
            .get(index)
            .ok_or_else(|| Error::InvalidPath(path.to_vec()))?;
    }
    Ok(node)
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

    fn sample() -> Vec<Node> {
        vec![
            node(
                "1",
                "first",
                vec![
                    node("2", "first.0", vec![node("3", "first.0.0", vec![])]),
                    node("4", "first.1", vec![]),
                ],
            ),
            node("5", "second", vec![]),
        ]
    }

    #[test]
    fn resolves_top_level_indices() {
        let replies = sample();
        assert_eq!(resolve(&replies, &[0]).unwrap().text, "first");
        assert_eq!(resolve(&replies, &[1]).unwrap().text, "second");
    }

    #[test]
    fn resolves_nested_indices() {
        let replies = sample();
        assert_eq!(resolve(&replies, &[0, 1]).unwrap().text, "first.1");
        assert_eq!(resolve(&replies, &[0, 0, 0]).unwrap().text, "first.0.0");
    }

    #[test]
    fn empty_path_is_invalid() {
        let err = resolve(&sample(), &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(ref p) if p.is_empty()));
    }

    #[test]
    fn out_of_range_index_is_invalid() {
        let err = resolve(&sample(), &[2]).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(ref p) if p == &[2]));
    }

    #[test]
    fn descending_past_a_leaf_is_invalid() {
        let err = resolve(&sample(), &[1, 0]).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(ref p) if p == &[1, 0]));
    }
}
