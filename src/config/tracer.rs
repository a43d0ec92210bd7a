use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_BREADTH;
use crate::constants::DEFAULT_MAX_CONCURRENT_REQUESTS;
use crate::constants::DEFAULT_MAX_RELATIONS_SCAN;
use crate::constants::DEFAULT_RELATION_PAGE_SIZE;
use crate::constants::MAX_DEPTH;
use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    pub max_depth:               usize,
    pub default_breadth:         usize,
    pub max_concurrent_requests: usize,
    pub relation_page_size:      usize,
    pub max_relations_scan:      usize,
    // Entities with more addresses than this are reported but not expanded
    pub max_entity_addresses:    Option<u64>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            max_depth:               MAX_DEPTH,
            default_breadth:         DEFAULT_BREADTH,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            relation_page_size:      DEFAULT_RELATION_PAGE_SIZE,
            max_relations_scan:      DEFAULT_MAX_RELATIONS_SCAN,
            max_entity_addresses:    None,
        }
    }
}

impl TracerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth > MAX_DEPTH {
            return Err(ConfigError::InvalidTracer(format!(
                "max_depth {} exceeds the hard limit {}",
                self.max_depth, MAX_DEPTH
            )));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidTracer("max_concurrent_requests must be positive".to_string()));
        }
        if self.relation_page_size == 0 {
            return Err(ConfigError::InvalidTracer("relation_page_size must be positive".to_string()));
        }
        if self.max_relations_scan == 0 {
            return Err(ConfigError::InvalidTracer("max_relations_scan must be positive".to_string()));
        }
        Ok(())
    }
}
