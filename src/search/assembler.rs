use serde::Deserialize;
use serde::Serialize;

use crate::model::Label;
use crate::model::MonetaryValue;
use crate::model::Node;
use crate::model::NodeId;
use crate::model::NodeType;
use crate::model::PathNode;
use crate::model::Relation;
use crate::model::SearchForest;
use crate::model::StartNode;
use crate::model::TxSummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub node_type:       NodeType,
    pub id:              String,
    pub balance:         MonetaryValue,
    pub first_tx:        TxSummary,
    pub last_tx:         TxSummary,
    pub in_degree:       u64,
    pub out_degree:      u64,
    pub no_incoming_txs: u64,
    pub no_outgoing_txs: u64,
    pub total_received:  MonetaryValue,
    pub total_spent:     MonetaryValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_addresses:    Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity:          Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels:          Option<Vec<Label>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses:       Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDocument {
    pub src:             NodeId,
    pub dst:             NodeId,
    pub tx_hash:         String,
    pub height:          u64,
    pub timestamp:       i64,
    pub input_value:     MonetaryValue,
    pub output_value:    MonetaryValue,
    pub no_txs:          u64,
    pub estimated_value: MonetaryValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartDocument {
    pub node:                NodeDocument,
    pub matching_addresses:  Vec<String>,
    // only present when the children were ranked from a partial relation scan
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub relations_truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDocument {
    pub node:                NodeDocument,
    pub relation:            RelationDocument,
    pub matching_addresses:  Vec<String>,
    pub paths:               Vec<PathDocument>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub relations_truncated: bool,
}

/// The externally visible search result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchDocument {
    pub nodes: Vec<StartDocument>,
    pub paths: Vec<PathDocument>,
}

impl From<&Node> for NodeDocument {
    fn from(node: &Node) -> Self {
        Self {
            node_type:       node.id.node_type(),
            id:              node.id.id_string(),
            balance:         node.balance,
            first_tx:        node.first_tx.clone(),
            last_tx:         node.last_tx.clone(),
            in_degree:       node.in_degree,
            out_degree:      node.out_degree,
            no_incoming_txs: node.no_incoming_txs,
            no_outgoing_txs: node.no_outgoing_txs,
            total_received:  node.total_received,
            total_spent:     node.total_spent,
            no_addresses:    node.no_addresses,
            entity:          node.entity,
            labels:          node.labels.clone(),
            addresses:       node.addresses.clone(),
        }
    }
}

impl From<&Relation> for RelationDocument {
    fn from(relation: &Relation) -> Self {
        Self {
            src:             relation.src.clone(),
            dst:             relation.dst.clone(),
            tx_hash:         relation.tx_hash.clone(),
            height:          relation.height,
            timestamp:       relation.timestamp,
            input_value:     relation.input_value,
            output_value:    relation.output_value,
            no_txs:          relation.no_txs,
            estimated_value: relation.estimated_value,
        }
    }
}

impl From<&StartNode> for StartDocument {
    fn from(start: &StartNode) -> Self {
        Self {
            node:                NodeDocument::from(&start.node),
            matching_addresses:  start.matching_addresses.clone(),
            relations_truncated: start.relations_truncated,
        }
    }
}

impl From<&PathNode> for PathDocument {
    fn from(path: &PathNode) -> Self {
        Self {
            node:                NodeDocument::from(&path.node),
            relation:            RelationDocument::from(&path.relation),
            matching_addresses:  path.matching_addresses.clone(),
            paths:               path.paths.iter().map(PathDocument::from).collect(),
            relations_truncated: path.relations_truncated,
        }
    }
}

pub fn assemble(forest: &SearchForest) -> SearchDocument {
    SearchDocument {
        nodes: forest.starts.iter().map(StartDocument::from).collect(),
        paths: forest.paths.iter().map(PathDocument::from).collect(),
    }
}

impl PathDocument {
    pub fn depth(&self) -> usize {
        1 + self.paths.iter().map(PathDocument::depth).max().unwrap_or(0)
    }
}
