use serde::{Deserialize, Serialize};

/// Generations run when neither the caller nor a graph document asks for more.
pub const DEFAULT_MAX_GENERATIONS: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationConfig {
    #[serde(default = "default_max_generations")]
    pub max_generations: u32,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            max_generations: DEFAULT_MAX_GENERATIONS,
        }
    }
}

impl DerivationConfig {
    pub fn with_max_generations(mut self, max_generations: u32) -> Self {
        self.max_generations = max_generations;
        self
    }
}

fn default_max_generations() -> u32 {
    DEFAULT_MAX_GENERATIONS
}
