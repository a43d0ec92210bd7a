use tracing::Level;
use tracing::Metadata;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::Filter;
use tracing_subscriber::registry::LookupSpan;

// Only events emitted by this crate reach the log outputs
const CRATE_TARGET: &str = "athar";

/// Passes events of this crate whose level is one of `levels` exactly.
#[derive(Debug, Clone, Copy)]
pub struct CrateLevelFilter {
    levels: &'static [Level],
}

impl CrateLevelFilter {
    pub const fn debug_only() -> Self {
        Self { levels: &[Level::DEBUG] }
    }

    pub const fn info_only() -> Self {
        Self { levels: &[Level::INFO] }
    }

    pub const fn error_warn() -> Self {
        Self {
            levels: &[Level::ERROR, Level::WARN],
        }
    }

    pub const fn error_only() -> Self {
        Self { levels: &[Level::ERROR] }
    }

    pub fn accepts(
        &self,
        level: &Level,
        target: &str,
    ) -> bool {
        target.starts_with(CRATE_TARGET) && self.levels.contains(level)
    }
}

impl<S> Filter<S> for CrateLevelFilter
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn enabled(
        &self,
        meta: &Metadata<'_>,
        _ctx: &Context<'_, S>,
    ) -> bool {
        self.accepts(meta.level(), meta.target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_match_exact_levels_of_this_crate() {
        assert!(CrateLevelFilter::debug_only().accepts(&Level::DEBUG, "athar::search::traversal"));
        assert!(!CrateLevelFilter::debug_only().accepts(&Level::INFO, "athar::search::traversal"));
        assert!(CrateLevelFilter::error_warn().accepts(&Level::WARN, "athar"));
        assert!(!CrateLevelFilter::error_only().accepts(&Level::WARN, "athar"));
        assert!(!CrateLevelFilter::error_only().accepts(&Level::ERROR, "bb8::inner"));
    }
}
