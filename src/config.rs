use serde::{Deserialize, Serialize};

/// Default nesting limit; realistic clinical documents stay well below it.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// Report every violation in the tree.
    #[default]
    CollectAll,
    /// Stop at the first violation in walk order.
    FailFast,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    pub mode: ValidationMode,
    pub max_depth: usize,
    /// Report fields present in the tree but not declared by its type.
    pub reject_unknown_fields: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::CollectAll,
            max_depth: DEFAULT_MAX_DEPTH,
            reject_unknown_fields: false,
        }
    }
}

impl ValidatorConfig {
    pub fn fail_fast() -> Self {
        Self::default().with_mode(ValidationMode::FailFast)
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_reject_unknown_fields(mut self, reject: bool) -> Self {
        self.reject_unknown_fields = reject;
        self
    }
}
