use std::sync::Arc;

use futures::FutureExt;
use futures::StreamExt;
use futures::TryStreamExt;
use futures::future::BoxFuture;
use futures::stream;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::RequestScope;
use super::fetcher::RelationFetcher;
use super::resolver::NodeResolver;
use crate::config::TracerConfig;
use crate::constants::DEFAULT_BREADTH;
use crate::constants::DEFAULT_DEPTH;
use crate::constants::MAX_DEPTH;
use crate::error::TraceError;
use crate::error::TraceResult;
use crate::model::Direction;
use crate::model::Node;
use crate::model::NodeId;
use crate::model::PathNode;
use crate::model::Relation;
use crate::model::RelationFilter;
use crate::model::SearchForest;
use crate::model::StartNode;
use crate::rates::RateConverter;
use crate::storage::GraphStore;
use crate::storage::LabelStore;

/// Arguments of one neighbor search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub currency:  String,
    pub start:     Vec<NodeId>,
    pub direction: Direction,
    pub depth:     usize,
    pub breadth:   usize,
    /// Ranked neighbors passed over at every node before `breadth` are taken
    pub skip:      usize,
    pub filter:    RelationFilter,
    pub with_tags: bool,
}

impl SearchRequest {
    pub fn new(
        currency: &str,
        start: Vec<NodeId>,
        direction: Direction,
    ) -> Self {
        Self {
            currency: currency.to_string(),
            start,
            direction,
            depth: DEFAULT_DEPTH,
            breadth: DEFAULT_BREADTH,
            skip: 0,
            filter: RelationFilter::default(),
            with_tags: false,
        }
    }

    pub fn validate(
        &self,
        max_depth: usize,
    ) -> TraceResult<()> {
        let max_depth = max_depth.min(MAX_DEPTH);
        if self.depth > max_depth {
            return Err(TraceError::InvalidFilter(format!("depth {} exceeds maximum {}", self.depth, max_depth)));
        }
        if self.start.is_empty() {
            return Err(TraceError::InvalidFilter("no start nodes given".to_string()));
        }
        if self.currency.is_empty() {
            return Err(TraceError::InvalidFilter("currency is empty".to_string()));
        }
        self.filter.validate()
    }
}

/// Children grown below one node.
#[derive(Default)]
struct Expansion {
    paths:     Vec<PathNode>,
    truncated: bool,
}

/// Bounded depth-first neighbor search over the funds-flow graph.
///
/// Every store call of every concurrent search shares the same pool of permits.
#[derive(Clone)]
pub struct Traversal {
    resolver: NodeResolver,
    fetcher:  RelationFetcher,
    permits:  Arc<Semaphore>,
    config:   TracerConfig,
}

impl Traversal {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        labels: Arc<dyn LabelStore>,
        converter: Arc<RateConverter>,
        config: TracerConfig,
    ) -> Self {
        Self {
            resolver: NodeResolver::new(graph.clone(), labels.clone(), converter.clone()),
            fetcher: RelationFetcher::new(graph, labels, converter, &config),
            permits: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            config,
        }
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> TraceResult<SearchForest> {
        request.validate(self.config.max_depth)?;
        if !self.resolver.converter().supports(&request.currency) {
            return Err(TraceError::InvalidFilter(format!("unsupported currency: {}", request.currency)));
        }

        let scope = RequestScope::new(self.permits.clone(), cancel.clone());
        info!(
            "search_started::currency::{}::starts::{}::direction::{}::depth::{}::breadth::{}::skip::{}",
            request.currency,
            request.start.len(),
            request.direction,
            request.depth,
            request.breadth,
            request.skip
        );

        let resolutions: Vec<_> = request.start.iter().map(|id| self.resolve_start(request, &scope, id)).collect();
        let starts = stream::iter(resolutions)
            .buffered(self.config.max_concurrent_requests)
            .try_collect::<Vec<StartNode>>()
            .await?;

        let expansions: Vec<_> = starts
            .iter()
            .map(|start| self.expand(request, &scope, &start.node, vec![start.node.id.clone()], 0))
            .collect();
        let trees = stream::iter(expansions)
            .buffered(self.config.max_concurrent_requests)
            .try_collect::<Vec<Expansion>>()
            .await?;

        let mut starts = starts;
        let mut paths = Vec::new();
        for (start, tree) in starts.iter_mut().zip(trees) {
            start.relations_truncated = tree.truncated;
            paths.extend(tree.paths);
        }
        let forest = SearchForest { starts, paths };
        info!(
            "search_finished::currency::{}::roots::{}::max_depth::{}",
            request.currency,
            forest.paths.len(),
            forest.max_depth()
        );
        Ok(forest)
    }

    async fn resolve_start(
        &self,
        request: &SearchRequest,
        scope: &RequestScope,
        id: &NodeId,
    ) -> TraceResult<StartNode> {
        let node = self
            .resolver
            .resolve(&request.currency, id, request.with_tags, scope)
            .await
            .map_err(|e| e.at(id, 0))?;
        let matching_addresses = self
            .resolver
            .matching_addresses(&request.currency, &node, &request.filter, scope)
            .await
            .map_err(|e| e.at(id, 0))?;
        Ok(StartNode {
            node,
            matching_addresses,
            relations_truncated: false,
        })
    }

    /// Whether `node` may be expanded further. Oversized entities stay leaves.
    fn expandable(
        &self,
        node: &Node,
    ) -> bool {
        match (self.config.max_entity_addresses, node.no_addresses) {
            (Some(limit), Some(count)) if node.is_entity() => count <= limit,
            _ => true,
        }
    }

    /// Children of `node`, found at `depth` hops from the start along `path`.
    fn expand<'a>(
        &'a self,
        request: &'a SearchRequest,
        scope: &'a RequestScope,
        node: &'a Node,
        path: Vec<NodeId>,
        depth: usize,
    ) -> BoxFuture<'a, TraceResult<Expansion>> {
        async move {
            if depth >= request.depth || request.breadth == 0 {
                return Ok(Expansion::default());
            }
            if !self.expandable(node) {
                debug!("entity_not_expanded::node::{}::addresses::{:?}", node.id, node.no_addresses);
                return Ok(Expansion::default());
            }

            let page_token = request.skip.to_string();
            let batch = self
                .fetcher
                .fetch_relations(
                    &request.currency,
                    &node.id,
                    request.direction,
                    &request.filter,
                    Some(&page_token),
                    request.breadth,
                    scope,
                )
                .await
                .map_err(|e| e.at(&node.id, depth))?;
            let truncated = batch.truncated;

            // neighbors already on this path are dropped, not replaced
            let children: Vec<Relation> = batch
                .relations
                .into_iter()
                .filter(|relation| {
                    let neighbor = relation.neighbor(request.direction);
                    let revisit = path.contains(neighbor);
                    if revisit {
                        debug!("cycle_skipped::node::{}::neighbor::{}::depth::{}", node.id, neighbor, depth);
                    }
                    !revisit
                })
                .collect();

            let branches: Vec<_> = children
                .into_iter()
                .map(|relation| self.grow(request, scope, relation, &path, depth + 1))
                .collect();
            let grown = stream::iter(branches)
                .buffered(self.config.max_concurrent_requests)
                .try_collect::<Vec<Option<PathNode>>>()
                .await?;

            Ok(Expansion {
                paths: grown.into_iter().flatten().collect(),
                truncated,
            })
        }
        .boxed()
    }

    /// Resolve the neighbor reached over `relation` and expand it. `None` when the neighbor has
    /// no node record.
    async fn grow(
        &self,
        request: &SearchRequest,
        scope: &RequestScope,
        relation: Relation,
        path: &[NodeId],
        depth: usize,
    ) -> TraceResult<Option<PathNode>> {
        let neighbor = relation.neighbor(request.direction).clone();
        let node = match self.resolver.resolve(&request.currency, &neighbor, request.with_tags, scope).await {
            Ok(node) => node,
            Err(e) if e.is_not_found() => {
                warn!("branch_dropped::node_not_found::node::{}::depth::{}", neighbor, depth);
                return Ok(None);
            },
            Err(e) => return Err(e.at(&neighbor, depth)),
        };
        let matching_addresses = self
            .resolver
            .matching_addresses(&request.currency, &node, &request.filter, scope)
            .await
            .map_err(|e| e.at(&neighbor, depth))?;

        let mut child_path = path.to_vec();
        child_path.push(neighbor);
        let expansion = self.expand(request, scope, &node, child_path, depth).await?;

        Ok(Some(PathNode {
            relation,
            node,
            matching_addresses,
            paths: expansion.paths,
            relations_truncated: expansion.truncated,
        }))
    }
}
