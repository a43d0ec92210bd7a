use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use super::RequestScope;
use crate::error::TraceError;
use crate::error::TraceResult;
use crate::model::Node;
use crate::model::NodeId;
use crate::model::NodeRecord;
use crate::model::RelationFilter;
use crate::rates::RateConverter;
use crate::storage::GraphStore;
use crate::storage::LabelStore;

/// Turns stored node records into converted `Node` snapshots.
#[derive(Clone)]
pub struct NodeResolver {
    graph:     Arc<dyn GraphStore>,
    labels:    Arc<dyn LabelStore>,
    converter: Arc<RateConverter>,
}

impl NodeResolver {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        labels: Arc<dyn LabelStore>,
        converter: Arc<RateConverter>,
    ) -> Self {
        Self {
            graph,
            labels,
            converter,
        }
    }

    pub fn converter(&self) -> &Arc<RateConverter> {
        &self.converter
    }

    /// Fetch one node. With `with_tags` its labels are attached, and entities also carry their
    /// member addresses.
    pub async fn resolve(
        &self,
        currency: &str,
        id: &NodeId,
        with_tags: bool,
        scope: &RequestScope,
    ) -> TraceResult<Node> {
        let record = scope
            .call(self.graph.resolve_node(currency, id))
            .await?
            .ok_or_else(|| TraceError::NotFound(id.clone()))?;
        let mut node = self.node_from_record(currency, record)?;

        if with_tags {
            node.labels = Some(scope.call(self.labels.labels_for(currency, id)).await?);
            if let NodeId::Entity(entity) = id {
                node.addresses = Some(self.member_addresses(currency, *entity, scope).await?);
            }
        }
        debug!("node_resolved::currency::{}::node::{}::with_tags::{}", currency, id, with_tags);
        Ok(node)
    }

    pub fn node_from_record(
        &self,
        currency: &str,
        record: NodeRecord,
    ) -> TraceResult<Node> {
        let balance = self.converter.convert_latest(currency, record.balance())?;
        Ok(Node {
            balance,
            total_received: self.converter.convert_latest(currency, record.total_received)?,
            total_spent: self.converter.convert_latest(currency, record.total_spent)?,
            id: record.id,
            first_tx: record.first_tx,
            last_tx: record.last_tx,
            in_degree: record.in_degree,
            out_degree: record.out_degree,
            no_incoming_txs: record.no_incoming_txs,
            no_outgoing_txs: record.no_outgoing_txs,
            no_addresses: record.no_addresses,
            entity: record.entity,
            labels: None,
            addresses: None,
        })
    }

    /// Addresses clustered under `entity`, sorted.
    pub async fn member_addresses(
        &self,
        currency: &str,
        entity: u64,
        scope: &RequestScope,
    ) -> TraceResult<Vec<String>> {
        let mut addresses = scope.call(self.graph.entity_addresses(currency, entity)).await?;
        addresses.sort();
        addresses.dedup();
        Ok(addresses)
    }

    /// Member addresses of an entity that satisfy the category and target parts of `filter` on
    /// their own. Empty for addresses and for filters without either part.
    pub async fn matching_addresses(
        &self,
        currency: &str,
        node: &Node,
        filter: &RelationFilter,
        scope: &RequestScope,
    ) -> TraceResult<Vec<String>> {
        let NodeId::Entity(entity) = node.id else {
            return Ok(Vec::new());
        };
        if !filter.has_address_predicate() {
            return Ok(Vec::new());
        }

        let members = match &node.addresses {
            Some(addresses) => addresses.clone(),
            None => self.member_addresses(currency, entity, scope).await?,
        };
        let candidates: Vec<NodeId> = members
            .into_iter()
            .map(NodeId::Address)
            .filter(|address| filter.is_target(address))
            .collect();

        let matching = match &filter.category {
            None => candidates,
            Some(_) => {
                let lookups = candidates
                    .iter()
                    .map(|address| scope.call(self.labels.labels_for(currency, address)));
                let labels = try_join_all(lookups).await?;
                candidates
                    .into_iter()
                    .zip(labels)
                    .filter(|(_, labels)| filter.matches_category(labels))
                    .map(|(address, _)| address)
                    .collect()
            },
        };

        let mut matching: Vec<String> = matching.into_iter().filter_map(|id| id.as_address().map(str::to_string)).collect();
        matching.sort();
        debug!("matching_addresses::entity::{}::count::{}", entity, matching.len());
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::fixtures::TestFixtures;

    fn resolver() -> NodeResolver {
        let (graph, labels) = TestFixtures::entity_cluster();
        NodeResolver::new(Arc::new(graph), Arc::new(labels), TestFixtures::converter())
    }

    #[tokio::test]
    async fn test_resolve_converts_totals_at_latest_height() {
        let node = resolver()
            .resolve("btc", &TestFixtures::address("A1"), false, &TestFixtures::scope())
            .await
            .unwrap();
        assert_eq!(node.balance.value, 150_000_000);
        assert!((node.balance.usd - 30_000.0).abs() < TestFixtures::EPSILON);
        assert!((node.total_received.eur - 36_000.0).abs() < TestFixtures::EPSILON);
        assert_eq!(node.labels, None);
    }

    #[tokio::test]
    async fn test_resolve_missing_node_is_not_found() {
        let missing = TestFixtures::address("Z9");
        let err = resolver().resolve("btc", &missing, false, &TestFixtures::scope()).await.unwrap_err();
        assert_eq!(err, TraceError::NotFound(missing));
    }

    #[tokio::test]
    async fn test_with_tags_attaches_labels_and_members() {
        let node = resolver().resolve("btc", &NodeId::Entity(7), true, &TestFixtures::scope()).await.unwrap();
        assert_eq!(node.labels.as_ref().map(Vec::len), Some(1));
        assert_eq!(node.addresses, Some(vec!["E1".to_string(), "E2".to_string(), "E3".to_string()]));
    }

    #[tokio::test]
    async fn test_matching_addresses_by_category_and_target() {
        let resolver = resolver();
        let scope = TestFixtures::scope();
        let entity = resolver.resolve("btc", &NodeId::Entity(7), false, &scope).await.unwrap();

        let by_category = RelationFilter {
            category: Some("exchange".to_string()),
            ..Default::default()
        };
        assert_eq!(resolver.matching_addresses("btc", &entity, &by_category, &scope).await.unwrap(), vec![
            "E1".to_string(),
            "E3".to_string()
        ]);

        let by_target = RelationFilter {
            targets: Some(BTreeSet::from([TestFixtures::address("E2")])),
            ..Default::default()
        };
        assert_eq!(resolver.matching_addresses("btc", &entity, &by_target, &scope).await.unwrap(), vec![
            "E2".to_string()
        ]);

        let unrestricted = RelationFilter::default();
        assert!(resolver.matching_addresses("btc", &entity, &unrestricted, &scope).await.unwrap().is_empty());
    }
}
