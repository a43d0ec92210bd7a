use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;
use tracing::warn;

use super::RequestScope;
use crate::config::TracerConfig;
use crate::error::TraceError;
use crate::error::TraceResult;
use crate::model::Direction;
use crate::model::FilterField;
use crate::model::MonetaryValue;
use crate::model::NodeId;
use crate::model::Relation;
use crate::model::RelationFilter;
use crate::model::RelationRow;
use crate::rates::RateConverter;
use crate::storage::GraphStore;
use crate::storage::LabelStore;

/// One ranked slice of a node's relations. `next_page` is the token for the following slice.
/// `truncated` marks a ranking built from only the first `max_relations_scan` store rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationBatch {
    pub relations: Vec<Relation>,
    pub next_page: Option<String>,
    pub truncated: bool,
}

#[derive(Clone)]
pub struct RelationFetcher {
    graph:              Arc<dyn GraphStore>,
    labels:             Arc<dyn LabelStore>,
    converter:          Arc<RateConverter>,
    store_page_size:    usize,
    max_relations_scan: usize,
}

fn parse_page_token(page_token: Option<&str>) -> TraceResult<usize> {
    match page_token {
        None => Ok(0),
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| TraceError::InvalidFilter(format!("invalid page token: {}", token))),
    }
}

impl RelationFetcher {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        labels: Arc<dyn LabelStore>,
        converter: Arc<RateConverter>,
        config: &TracerConfig,
    ) -> Self {
        Self {
            graph,
            labels,
            converter,
            store_page_size: config.relation_page_size,
            max_relations_scan: config.max_relations_scan,
        }
    }

    /// Relations of `node` in `direction` that pass `filter`, ranked by descending estimated
    /// value (ties by neighbor id) and sliced at `page_token` to at most `page_size` entries.
    pub async fn fetch_relations(
        &self,
        currency: &str,
        node: &NodeId,
        direction: Direction,
        filter: &RelationFilter,
        page_token: Option<&str>,
        page_size: usize,
        scope: &RequestScope,
    ) -> TraceResult<RelationBatch> {
        filter.validate()?;
        let offset = parse_page_token(page_token)?;

        let (rows, truncated) = self.scan(currency, node, direction, scope).await?;
        let scanned = rows.len();

        let mut candidates = Vec::with_capacity(rows.len());
        for row in &rows {
            let relation = self.convert_row(currency, row)?;
            if let Some(range) = &filter.value_range {
                let amount = self.field_value(currency, range.field, &relation, row)?;
                if !range.contains(&amount) {
                    continue;
                }
            }
            candidates.push(relation);
        }

        let mut relations = self.filter_neighbors(currency, direction, filter, candidates, scope).await?;
        relations.sort_by(|a, b| {
            b.estimated_value
                .value
                .cmp(&a.estimated_value.value)
                .then_with(|| a.neighbor(direction).cmp(b.neighbor(direction)))
        });

        let matched = relations.len();
        let relations: Vec<Relation> = relations.into_iter().skip(offset).take(page_size).collect();
        let end = offset + relations.len();
        let next_page = (!relations.is_empty() && end < matched).then(|| end.to_string());

        debug!(
            "relations_fetched::node::{}::direction::{}::scanned::{}::truncated::{}::matched::{}::offset::{}::returned::{}",
            node,
            direction,
            scanned,
            truncated,
            matched,
            offset,
            relations.len()
        );
        Ok(RelationBatch {
            relations,
            next_page,
            truncated,
        })
    }

    /// Drain the store's pages for `node`, stopping at `max_relations_scan` rows. The flag is set
    /// when rows were left unread.
    async fn scan(
        &self,
        currency: &str,
        node: &NodeId,
        direction: Direction,
        scope: &RequestScope,
    ) -> TraceResult<(Vec<RelationRow>, bool)> {
        let mut rows = Vec::new();
        let mut page: Option<String> = None;
        loop {
            let batch = scope
                .call(self.graph.relations(currency, node, direction, page.take(), self.store_page_size))
                .await?;
            let more = batch.next_page.is_some() && !batch.rows.is_empty();
            rows.extend(batch.rows);

            if rows.len() > self.max_relations_scan || (rows.len() == self.max_relations_scan && more) {
                warn!("relation_scan_truncated::node::{}::limit::{}", node, self.max_relations_scan);
                rows.truncate(self.max_relations_scan);
                return Ok((rows, true));
            }
            if !more {
                return Ok((rows, false));
            }
            page = batch.next_page;
        }
    }

    fn convert_row(
        &self,
        currency: &str,
        row: &RelationRow,
    ) -> TraceResult<Relation> {
        let convert = |amount: i64| self.converter.convert(currency, amount, row.height);
        Ok(Relation {
            src:             row.src.clone(),
            dst:             row.dst.clone(),
            tx_hash:         row.tx_hash.clone(),
            height:          row.height,
            timestamp:       row.timestamp,
            input_value:     convert(row.input_value)?,
            output_value:    convert(row.output_value)?,
            no_txs:          row.no_txs,
            estimated_value: convert(row.estimated_value)?,
        })
    }

    fn field_value(
        &self,
        currency: &str,
        field: FilterField,
        relation: &Relation,
        row: &RelationRow,
    ) -> TraceResult<MonetaryValue> {
        match field {
            FilterField::Value => Ok(relation.estimated_value),
            FilterField::Balance => self
                .converter
                .convert_latest(currency, row.neighbor_received.saturating_sub(row.neighbor_spent)),
            FilterField::Received => self.converter.convert_latest(currency, row.neighbor_received),
        }
    }

    async fn filter_neighbors(
        &self,
        currency: &str,
        direction: Direction,
        filter: &RelationFilter,
        candidates: Vec<Relation>,
        scope: &RequestScope,
    ) -> TraceResult<Vec<Relation>> {
        if !filter.has_address_predicate() {
            return Ok(candidates);
        }
        let checks = candidates
            .iter()
            .map(|relation| self.neighbor_matches(currency, relation.neighbor(direction), filter, scope));
        let keep = try_join_all(checks).await?;
        Ok(candidates
            .into_iter()
            .zip(keep)
            .filter_map(|(relation, keep)| keep.then_some(relation))
            .collect())
    }

    async fn neighbor_matches(
        &self,
        currency: &str,
        neighbor: &NodeId,
        filter: &RelationFilter,
        scope: &RequestScope,
    ) -> TraceResult<bool> {
        if !filter.is_target(neighbor) {
            // an entity still counts when one of its members is a target
            let NodeId::Entity(entity) = neighbor else {
                return Ok(false);
            };
            let members = scope.call(self.graph.entity_addresses(currency, *entity)).await?;
            if !members.into_iter().any(|address| filter.is_target(&NodeId::Address(address))) {
                return Ok(false);
            }
        }
        if filter.category.is_some() {
            let labels = scope.call(self.labels.labels_for(currency, neighbor)).await?;
            return Ok(filter.matches_category(&labels));
        }
        Ok(true)
    }
}
