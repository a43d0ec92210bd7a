use std::collections::BTreeSet;

use clap::Parser;

use crate::config::TracerConfig;
use crate::error::TraceResult;
use crate::model::Direction;
use crate::model::NodeId;
use crate::model::RelationFilter;
use crate::model::ValueRange;
use crate::search::SearchRequest;

/// Search the funds-flow graph around a set of addresses or entities.
#[derive(Debug, Clone, Parser)]
#[command(name = "athar", version)]
pub struct SearchArgs {
    #[arg(long, default_value = "Config.toml")]
    pub config: String,

    #[arg(long)]
    pub currency: String,

    /// Start node as `address:<id>` or `entity:<id>`; repeat for several
    #[arg(long = "start", required = true)]
    pub start: Vec<String>,

    #[arg(long, default_value = "out")]
    pub direction: String,

    #[arg(long)]
    pub depth: Option<usize>,

    #[arg(long)]
    pub breadth: Option<usize>,

    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    #[arg(long)]
    pub category: Option<String>,

    /// One of `value`, `balance`, `received`
    #[arg(long)]
    pub field: Option<String>,

    /// One of `value`, `usd`, `eur`
    #[arg(long, default_value = "value")]
    pub field_currency: String,

    #[arg(long)]
    pub min: Option<f64>,

    #[arg(long)]
    pub max: Option<f64>,

    /// Restrict neighbors to these nodes; repeat for several
    #[arg(long = "target")]
    pub targets: Vec<String>,

    #[arg(long)]
    pub with_tags: bool,

    /// Cancel the search after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl SearchArgs {
    pub fn to_request(
        &self,
        tracer: &TracerConfig,
    ) -> TraceResult<SearchRequest> {
        let start = self.start.iter().map(|raw| raw.parse::<NodeId>()).collect::<TraceResult<Vec<_>>>()?;
        let direction: Direction = self.direction.parse()?;

        let value_range = match &self.field {
            Some(field) => Some(ValueRange::parse(field, &self.field_currency, self.min, self.max)?),
            None => None,
        };
        let targets = if self.targets.is_empty() {
            None
        } else {
            Some(self.targets.iter().map(|raw| raw.parse::<NodeId>()).collect::<TraceResult<BTreeSet<_>>>()?)
        };

        let mut request = SearchRequest::new(&self.currency, start, direction);
        request.depth = self.depth.unwrap_or(request.depth);
        request.breadth = self.breadth.unwrap_or(tracer.default_breadth);
        request.skip = self.skip;
        request.filter = RelationFilter {
            category: self.category.clone(),
            value_range,
            targets,
        };
        request.with_tags = self.with_tags;
        request.validate(tracer.max_depth)?;
        Ok(request)
    }
}
