/// ======================= Search bounds =======================
/// Hard ceiling on the number of hops a search may take
pub const MAX_DEPTH: usize = 7;

pub const DEFAULT_DEPTH: usize = 1;

/// Neighbors expanded per node when the caller does not say otherwise
pub const DEFAULT_BREADTH: usize = 16;

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 20;

/// Rows requested per page from the graph store
pub const DEFAULT_RELATION_PAGE_SIZE: usize = 100;

/// Upper bound on relations scanned for a single node before ranking
pub const DEFAULT_MAX_RELATIONS_SCAN: usize = 10_000;

/// ======================= Exchange rates =======================
/// Rate used for every height when dummy rates are configured
pub const DUMMY_EXCHANGE_RATE: f64 = 0.5;

/// Satoshi-style currencies
pub const SATOSHI_UNIT_DIVISOR: u64 = 100_000_000;

pub const DEFAULT_RATE_REFRESH_INTERVAL_SECS: u64 = 3600;

/// ======================= Redis keys =======================
pub const RATES_KEY_PREFIX: &str = "rates";

pub const LABELS_KEY_PREFIX: &str = "labels";
