use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::CurrencyConfig;
use crate::config::RatesConfig;
use crate::model::Label;
use crate::model::NodeId;
use crate::model::NodeRecord;
use crate::model::RelationRow;
use crate::model::TxSummary;
use crate::rates::ExchangeRate;
use crate::rates::RateCache;
use crate::rates::RateConverter;
use crate::rates::RateTable;
use crate::search::RequestScope;
use crate::storage::in_memory::GraphSnapshot;
use crate::storage::in_memory::InMemoryGraphStore;
use crate::storage::in_memory::InMemoryLabelStore;

/// Test fixtures for creating consistent test data
pub struct TestFixtures;

impl TestFixtures {
    pub const EPSILON: f64 = 1e-6;
    pub const LAST_HEIGHT: u64 = 100;
    pub const USD_RATE: f64 = 20_000.0;
    pub const EUR_RATE: f64 = 18_000.0;

    pub fn address(id: &str) -> NodeId {
        NodeId::Address(id.to_string())
    }

    pub fn record(
        id: NodeId,
        total_received: i64,
        total_spent: i64,
    ) -> NodeRecord {
        NodeRecord {
            id,
            first_tx: TxSummary {
                height: 1,
                timestamp: 1_000,
                tx_hash: "first".to_string(),
            },
            last_tx: TxSummary {
                height: Self::LAST_HEIGHT,
                timestamp: 2_000,
                tx_hash: "last".to_string(),
            },
            in_degree: 1,
            out_degree: 1,
            no_incoming_txs: 1,
            no_outgoing_txs: 1,
            total_received,
            total_spent,
            no_addresses: None,
            entity: None,
        }
    }

    pub fn relation(
        src: &NodeId,
        dst: &NodeId,
        estimated_value: i64,
        height: u64,
    ) -> RelationRow {
        RelationRow {
            src: src.clone(),
            dst: dst.clone(),
            tx_hash: format!("{}>{}", src.id_string(), dst.id_string()),
            height,
            timestamp: height as i64 * 600,
            input_value: estimated_value,
            output_value: estimated_value,
            no_txs: 1,
            estimated_value,
            neighbor_received: 0,
            neighbor_spent: 0,
        }
    }

    pub fn label(category: &str) -> Label {
        Label {
            label:       format!("{} tag", category),
            source:      "fixture".to_string(),
            tagpack_uri: "tagpack://fixture".to_string(),
            currency:    "btc".to_string(),
            lastmod:     0,
            category:    Some(category.to_string()),
            abuse:       None,
            active:      true,
        }
    }

    pub fn rates_config(dummy_rates: bool) -> RatesConfig {
        RatesConfig {
            dummy_rates,
            refresh_interval_secs: 0,
            currencies: HashMap::from([("btc".to_string(), CurrencyConfig { unit_divisor: 100_000_000 })]),
        }
    }

    /// Flat btc rates for every height up to `LAST_HEIGHT`.
    pub fn converter() -> Arc<RateConverter> {
        let cache = Arc::new(RateCache::new());
        let table = (0..=Self::LAST_HEIGHT).fold(RateTable::new(Self::LAST_HEIGHT), |table, height| {
            table.with_rate(height, ExchangeRate {
                usd: Self::USD_RATE,
                eur: Self::EUR_RATE,
            })
        });
        cache.refresh("btc", table);
        Arc::new(RateConverter::new(cache, &Self::rates_config(false)))
    }

    pub fn scope() -> RequestScope {
        RequestScope::new(Arc::new(Semaphore::new(8)), CancellationToken::new())
    }

    /// Address A1 (1.5 BTC balance) paying into entity 7, whose members E1 and E3 are tagged
    /// as exchanges and E2 as a mixer.
    pub fn entity_cluster() -> (InMemoryGraphStore, InMemoryLabelStore) {
        let a1 = Self::address("A1");
        let entity = NodeId::Entity(7);
        let mut entity_record = Self::record(entity.clone(), 900_000_000, 0);
        entity_record.no_addresses = Some(3);

        let graph = InMemoryGraphStore::from_snapshot(GraphSnapshot {
            currency:         "btc".to_string(),
            nodes:            vec![Self::record(a1.clone(), 200_000_000, 50_000_000), entity_record],
            relations:        vec![Self::relation(&a1, &entity, 50_000_000, 10)],
            entity_addresses: BTreeMap::from([(7, vec!["E3".to_string(), "E1".to_string(), "E2".to_string()])]),
        });

        let mut labels = InMemoryLabelStore::new();
        labels.insert("btc", entity, vec![Self::label("exchange")]);
        labels.insert("btc", Self::address("E1"), vec![Self::label("exchange")]);
        labels.insert("btc", Self::address("E2"), vec![Self::label("mixer")]);
        labels.insert("btc", Self::address("E3"), vec![Self::label("exchange")]);
        (graph, labels)
    }
}
