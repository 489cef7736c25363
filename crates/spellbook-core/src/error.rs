//! Error types for Spellbook

use thiserror::Error;

use crate::ids::ComboId;

/// Main error type for Spellbook operations
#[derive(Debug, Error)]
pub enum SpellbookError {
    /// Error in generation configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The rule catalog references something that does not exist
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// The production chain below a combo is deeper than the recursion limit
    #[error("Rule graph too deep below combo {combo} (limit {limit})")]
    RuleGraphTooDeep { combo: ComboId, limit: usize },

    /// The production chain below a combo loops back onto itself
    #[error("Rule graph cycle through combo {combo}")]
    RuleGraphCycle { combo: ComboId },

    /// Error reported by the variant store
    #[error("Store error: {0}")]
    Store(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SpellbookError {
    /// Returns true for the rule-graph failures that abort a single seed.
    pub fn is_rule_graph_error(&self) -> bool {
        matches!(
            self,
            SpellbookError::RuleGraphTooDeep { .. } | SpellbookError::RuleGraphCycle { .. }
        )
    }
}

/// Result type alias for Spellbook operations
pub type Result<T> = std::result::Result<T, SpellbookError>;
