//! Configuration for the command engine.

use parley_actions::chain::DEFAULT_MAX_CHAIN_DEPTH;
use parley_grammar::MatchOptions;

use crate::trace::TracerConfig;

/// Configuration for a [`CommandEngine`](crate::CommandEngine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Limits for grammar matching.
    pub match_options: MatchOptions,
    /// Maximum chain derivation depth.
    pub max_chain_depth: usize,
    /// Turn tracing.
    pub tracer: TracerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_options: MatchOptions::default(),
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            tracer: TracerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set match options.
    #[must_use]
    pub fn with_match_options(mut self, options: MatchOptions) -> Self {
        self.match_options = options;
        self
    }

    /// Builder method to set the chain depth limit.
    #[must_use]
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Builder method to configure tracing.
    #[must_use]
    pub fn with_tracer(mut self, tracer: TracerConfig) -> Self {
        self.tracer = tracer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_chain_depth, 10);
        assert_eq!(config.match_options.max_matches, 10);
        assert!(!config.tracer.enabled);
    }

    #[test]
    fn builder_pattern() {
        let config = EngineConfig::new()
            .with_match_options(MatchOptions::default().with_max_matches(3))
            .with_max_chain_depth(2)
            .with_tracer(TracerConfig::new().enabled());
        assert_eq!(config.match_options.max_matches, 3);
        assert_eq!(config.max_chain_depth, 2);
        assert!(config.tracer.enabled);
    }
}
