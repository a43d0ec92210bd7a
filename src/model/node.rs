use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::label::Label;
use super::value::MonetaryValue;
use crate::error::TraceError;
use crate::error::TraceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Address,
    Entity,
}

impl fmt::Display for NodeType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            NodeType::Address => write!(f, "address"),
            NodeType::Entity => write!(f, "entity"),
        }
    }
}

impl FromStr for NodeType {
    type Err = TraceError;

    fn from_str(s: &str) -> TraceResult<Self> {
        match s {
            "address" => Ok(NodeType::Address),
            "entity" => Ok(NodeType::Entity),
            other => Err(TraceError::InvalidFilter(format!("unknown node type: {}", other))),
        }
    }
}

/// Identity of a node in the funds-flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "node_type", content = "id", rename_all = "lowercase")]
pub enum NodeId {
    Address(String),
    Entity(u64),
}

impl NodeId {
    /// Validate a raw id against the shape expected for its node type: addresses are non-empty
    /// ASCII alphanumeric strings, entities are non-negative integers.
    pub fn parse(
        node_type: NodeType,
        raw: &str,
    ) -> TraceResult<Self> {
        let invalid = || TraceError::InvalidId {
            node_type,
            id: raw.to_string(),
        };
        match node_type {
            NodeType::Address => {
                if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(invalid());
                }
                Ok(NodeId::Address(raw.to_string()))
            },
            NodeType::Entity => raw.parse::<u64>().map(NodeId::Entity).map_err(|_| invalid()),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeId::Address(_) => NodeType::Address,
            NodeId::Entity(_) => NodeType::Entity,
        }
    }

    /// The bare id without the node type prefix.
    pub fn id_string(&self) -> String {
        match self {
            NodeId::Address(address) => address.clone(),
            NodeId::Entity(entity) => entity.to_string(),
        }
    }

    pub fn as_address(&self) -> Option<&str> {
        match self {
            NodeId::Address(address) => Some(address),
            NodeId::Entity(_) => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.node_type(), self.id_string())
    }
}

// Accepts `address:<id>` or `entity:<id>`
impl FromStr for NodeId {
    type Err = TraceError;

    fn from_str(s: &str) -> TraceResult<Self> {
        match s.split_once(':') {
            Some((node_type, raw)) => NodeId::parse(node_type.parse()?, raw),
            None => Err(TraceError::InvalidId {
                node_type: NodeType::Address,
                id: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TxSummary {
    pub height:    u64,
    pub timestamp: i64,
    pub tx_hash:   String,
}

/// Node properties as the graph store keeps them, amounts in native units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(flatten)]
    pub id:              NodeId,
    pub first_tx:        TxSummary,
    pub last_tx:         TxSummary,
    pub in_degree:       u64,
    pub out_degree:      u64,
    pub no_incoming_txs: u64,
    pub no_outgoing_txs: u64,
    pub total_received:  i64,
    pub total_spent:     i64,
    #[serde(default)]
    pub no_addresses:    Option<u64>,
    #[serde(default)]
    pub entity:          Option<u64>,
}

impl NodeRecord {
    pub fn balance(&self) -> i64 {
        self.total_received.saturating_sub(self.total_spent)
    }
}

/// A resolved node snapshot with converted amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id:              NodeId,
    pub balance:         MonetaryValue,
    pub first_tx:        TxSummary,
    pub last_tx:         TxSummary,
    pub in_degree:       u64,
    pub out_degree:      u64,
    pub no_incoming_txs: u64,
    pub no_outgoing_txs: u64,
    pub total_received:  MonetaryValue,
    pub total_spent:     MonetaryValue,
    pub no_addresses:    Option<u64>,
    pub entity:          Option<u64>,
    pub labels:          Option<Vec<Label>>,
    pub addresses:       Option<Vec<String>>,
}

impl Node {
    pub fn is_entity(&self) -> bool {
        self.id.node_type() == NodeType::Entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_ids() {
        assert_eq!(NodeId::parse(NodeType::Address, "1Abc9").unwrap(), NodeId::Address("1Abc9".to_string()));
        assert!(NodeId::parse(NodeType::Address, "").is_err());
        assert!(NodeId::parse(NodeType::Address, "1A-bc").is_err());
    }

    #[test]
    fn test_parse_entity_ids() {
        assert_eq!(NodeId::parse(NodeType::Entity, "42").unwrap(), NodeId::Entity(42));
        let err = NodeId::parse(NodeType::Entity, "-1").unwrap_err();
        assert_eq!(err, TraceError::InvalidId {
            node_type: NodeType::Entity,
            id: "-1".to_string()
        });
        assert!(NodeId::parse(NodeType::Entity, "abc").is_err());
    }

    #[test]
    fn test_node_id_round_trips_through_display() {
        let id: NodeId = "entity:17".parse().unwrap();
        assert_eq!(id, NodeId::Entity(17));
        assert_eq!(id.to_string(), "entity:17");
        assert!("bogus:17".parse::<NodeId>().is_err());
        assert!("A1".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_node_record_json_shape() {
        let json = r#"{
            "node_type": "address", "id": "A1",
            "first_tx": {"height": 1, "timestamp": 10, "tx_hash": "ab"},
            "last_tx": {"height": 2, "timestamp": 20, "tx_hash": "cd"},
            "in_degree": 1, "out_degree": 2, "no_incoming_txs": 3, "no_outgoing_txs": 4,
            "total_received": 500, "total_spent": 200
        }"#;
        let record: NodeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, NodeId::Address("A1".to_string()));
        assert_eq!(record.balance(), 300);
        assert_eq!(record.no_addresses, None);
    }

    #[test]
    fn test_balance_saturates_on_corrupt_totals() {
        let json = r#"{
            "node_type": "entity", "id": 3,
            "first_tx": {"height": 1, "timestamp": 10, "tx_hash": "ab"},
            "last_tx": {"height": 2, "timestamp": 20, "tx_hash": "cd"},
            "in_degree": 0, "out_degree": 0, "no_incoming_txs": 0, "no_outgoing_txs": 0,
            "total_received": -9223372036854775808, "total_spent": 1
        }"#;
        let record: NodeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.balance(), i64::MIN);
    }
}
