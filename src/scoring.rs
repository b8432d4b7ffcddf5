use serde::{Deserialize, Serialize};

/// Points awarded for cleared tiles. Pure lookups, no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub triple: u32,
    pub quad: u32,
    pub five_plus: u32,
    pub bonus_per_tile: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            triple: 30,
            quad: 50,
            five_plus: 100,
            bonus_per_tile: 10,
        }
    }
}

impl ScoringPolicy {
    /// Points for one match group of `size` tiles.
    pub fn group(&self, size: usize) -> u32 {
        match size {
            0..=2 => 0,
            3 => self.triple,
            4 => self.quad,
            _ => self.five_plus,
        }
    }

    /// Points for a bonus activation that cleared `count` tiles, the bonus
    /// tile included.
    pub fn bonus(&self, count: usize) -> u32 {
        (count as u32).saturating_mul(self.bonus_per_tile)
    }
}
