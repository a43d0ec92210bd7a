use std::collections::HashSet;

use crate::model::NodeId;
use crate::model::PathNode;
use crate::model::SearchForest;

/// Custom assertions for domain-specific testing
pub struct TestAssertions;

impl TestAssertions {
    /// Assert the structural bounds every search result must respect.
    pub fn assert_forest_bounded(
        forest: &SearchForest,
        depth: usize,
        breadth: usize,
    ) {
        assert!(forest.max_depth() <= depth, "forest depth {} exceeds {}", forest.max_depth(), depth);
        for start in &forest.starts {
            let roots = forest
                .paths
                .iter()
                .filter(|path| Self::origin(path) == &start.node.id);
            assert!(roots.count() <= breadth, "start {} expanded more than {} children", start.node.id, breadth);
        }
        for path in &forest.paths {
            Self::assert_path_bounded(path, Self::origin(path), breadth);
        }
    }

    /// The start node a root path was grown from: the endpoint of its relation that is not the
    /// node it reached.
    fn origin(path: &PathNode) -> &NodeId {
        if path.relation.src == path.node.id {
            &path.relation.dst
        } else {
            &path.relation.src
        }
    }

    fn assert_path_bounded(
        path: &PathNode,
        start: &NodeId,
        breadth: usize,
    ) {
        for walk in path.walks() {
            let mut seen = HashSet::from([start.clone()]);
            for node in walk {
                assert!(seen.insert(node.id.clone()), "node {} repeated on one path from {}", node.id, start);
            }
        }
        Self::assert_breadth(path, breadth);
    }

    fn assert_breadth(
        path: &PathNode,
        breadth: usize,
    ) {
        assert!(path.paths.len() <= breadth, "node {} expanded {} children", path.node.id, path.paths.len());
        for child in &path.paths {
            Self::assert_breadth(child, breadth);
        }
    }
}
