#![allow(dead_code)]

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use athar::config::CurrencyConfig;
use athar::config::RatesConfig;
use athar::config::TracerConfig;
use athar::model::Label;
use athar::model::NodeId;
use athar::model::NodeRecord;
use athar::model::RelationRow;
use athar::model::TxSummary;
use athar::rates::ExchangeRate;
use athar::rates::RateCache;
use athar::rates::RateConverter;
use athar::rates::RateTable;
use athar::search::Traversal;
use athar::storage::GraphStore;
use athar::storage::LabelStore;
use athar::storage::in_memory::GraphSnapshot;
use athar::storage::in_memory::InMemoryGraphStore;
use athar::storage::in_memory::InMemoryLabelStore;

pub const BTC: i64 = 100_000_000;
pub const USD_RATE: f64 = 20_000.0;
pub const EUR_RATE: f64 = 18_000.0;
pub const LAST_HEIGHT: u64 = 100;

pub fn address(id: &str) -> NodeId {
    NodeId::Address(id.to_string())
}

pub fn label(category: &str) -> Label {
    Label {
        label:       format!("{} tag", category),
        source:      "integration".to_string(),
        tagpack_uri: "tagpack://integration".to_string(),
        currency:    "btc".to_string(),
        lastmod:     1_700_000_000,
        category:    Some(category.to_string()),
        abuse:       None,
        active:      true,
    }
}

/// Builds one btc graph snapshot edge by edge. Every endpoint gets a node record unless it is
/// explicitly left out.
#[derive(Default)]
pub struct GraphBuilder {
    records:          BTreeMap<NodeId, NodeRecord>,
    missing:          Vec<NodeId>,
    relations:        Vec<RelationRow>,
    entity_addresses: BTreeMap<u64, Vec<String>>,
    labels:           InMemoryLabelStore,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(id: &NodeId) -> NodeRecord {
        NodeRecord {
            id:              id.clone(),
            first_tx:        TxSummary {
                height:    1,
                timestamp: 600,
                tx_hash:   "genesis".to_string(),
            },
            last_tx:         TxSummary {
                height:    LAST_HEIGHT,
                timestamp: 60_000,
                tx_hash:   "tip".to_string(),
            },
            in_degree:       0,
            out_degree:      0,
            no_incoming_txs: 0,
            no_outgoing_txs: 0,
            total_received:  0,
            total_spent:     0,
            no_addresses:    None,
            entity:          None,
        }
    }

    /// Relation `src -> dst` worth `value` native units, mined at `height`.
    pub fn edge(
        mut self,
        src: &NodeId,
        dst: &NodeId,
        value: i64,
        height: u64,
    ) -> Self {
        for id in [src, dst] {
            self.records.entry(id.clone()).or_insert_with(|| Self::record(id));
        }
        if let Some(record) = self.records.get_mut(src) {
            record.out_degree += 1;
            record.no_outgoing_txs += 1;
            record.total_spent += value;
        }
        if let Some(record) = self.records.get_mut(dst) {
            record.in_degree += 1;
            record.no_incoming_txs += 1;
            record.total_received += value;
        }
        self.relations.push(RelationRow {
            src: src.clone(),
            dst: dst.clone(),
            tx_hash: format!("{}_{}_{}", src.id_string(), dst.id_string(), self.relations.len()),
            height,
            timestamp: height as i64 * 600,
            input_value: value,
            output_value: value,
            no_txs: 1,
            estimated_value: value,
            neighbor_received: 0,
            neighbor_spent: 0,
        });
        self
    }

    /// Record of `id` is dropped from the store while its relations stay.
    pub fn without_record(
        mut self,
        id: &NodeId,
    ) -> Self {
        self.missing.push(id.clone());
        self
    }

    pub fn members(
        mut self,
        entity: u64,
        addresses: &[&str],
    ) -> Self {
        self.entity_addresses.insert(entity, addresses.iter().map(|a| a.to_string()).collect());
        if let Some(record) = self.records.get_mut(&NodeId::Entity(entity)) {
            record.no_addresses = Some(addresses.len() as u64);
        }
        self
    }

    pub fn tag(
        mut self,
        id: &NodeId,
        category: &str,
    ) -> Self {
        self.labels.insert("btc", id.clone(), vec![label(category)]);
        self
    }

    pub fn build(self) -> (InMemoryGraphStore, InMemoryLabelStore) {
        let missing = self.missing;
        let snapshot = GraphSnapshot {
            currency:         "btc".to_string(),
            nodes:            self.records.into_values().filter(|record| !missing.contains(&record.id)).collect(),
            relations:        self.relations,
            entity_addresses: self.entity_addresses,
        };
        (InMemoryGraphStore::from_snapshot(snapshot), self.labels)
    }
}

pub fn rates_config(dummy_rates: bool) -> RatesConfig {
    RatesConfig {
        dummy_rates,
        refresh_interval_secs: 0,
        currencies: HashMap::from([("btc".to_string(), CurrencyConfig { unit_divisor: 100_000_000 })]),
    }
}

/// Rate cache with a flat btc rate at every height up to `LAST_HEIGHT` except `gaps`.
pub fn rate_cache(gaps: &[u64]) -> Arc<RateCache> {
    let cache = Arc::new(RateCache::new());
    let table = (0..=LAST_HEIGHT)
        .filter(|height| !gaps.contains(height))
        .fold(RateTable::new(LAST_HEIGHT), |table, height| {
            table.with_rate(height, ExchangeRate {
                usd: USD_RATE,
                eur: EUR_RATE,
            })
        });
    cache.refresh("btc", table);
    cache
}

pub fn converter(gaps: &[u64]) -> Arc<RateConverter> {
    Arc::new(RateConverter::new(rate_cache(gaps), &rates_config(false)))
}

pub fn traversal_with(
    graph: Arc<dyn GraphStore>,
    labels: Arc<dyn LabelStore>,
    converter: Arc<RateConverter>,
    config: TracerConfig,
) -> Traversal {
    Traversal::new(graph, labels, converter, config)
}

pub fn traversal(builder: GraphBuilder) -> Traversal {
    let (graph, labels) = builder.build();
    traversal_with(Arc::new(graph), Arc::new(labels), converter(&[]), TracerConfig::default())
}
