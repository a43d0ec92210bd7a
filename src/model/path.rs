use serde::Deserialize;
use serde::Serialize;

use super::node::Node;
use super::relation::Relation;

/// One hop of a search tree: the relation walked, the node it reached and everything explored
/// beyond it. `relations_truncated` is set when `paths` was ranked from a partial relation scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub relation:            Relation,
    pub node:                Node,
    pub matching_addresses:  Vec<String>,
    pub paths:               Vec<PathNode>,
    #[serde(default)]
    pub relations_truncated: bool,
}

impl PathNode {
    /// Number of hops in the longest path below and including this one.
    pub fn depth(&self) -> usize {
        1 + self.paths.iter().map(PathNode::depth).max().unwrap_or(0)
    }

    /// Every root-to-leaf path as the sequence of nodes it visits after the start node.
    pub fn walks(&self) -> Vec<Vec<&Node>> {
        if self.paths.is_empty() {
            return vec![vec![&self.node]];
        }
        self.paths
            .iter()
            .flat_map(PathNode::walks)
            .map(|mut walk| {
                walk.insert(0, &self.node);
                walk
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartNode {
    pub node:                Node,
    pub matching_addresses:  Vec<String>,
    #[serde(default)]
    pub relations_truncated: bool,
}

/// Result of one search: the resolved start nodes and the path trees grown from them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchForest {
    pub starts: Vec<StartNode>,
    pub paths:  Vec<PathNode>,
}

impl SearchForest {
    pub fn max_depth(&self) -> usize {
        self.paths.iter().map(PathNode::depth).max().unwrap_or(0)
    }
}
