//! Settlement engine configuration.

use serde::{Deserialize, Serialize};

/// Settlement engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Send instruments that net to zero units to the broker as zero-unit
    /// orders. When false they are dropped from the batch.
    pub submit_zero_unit_orders: bool,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            submit_zero_unit_orders: true,
        }
    }
}

impl SettlementConfig {
    /// Only tradable (non-zero) orders reach the broker.
    pub fn tradable_only() -> Self {
        Self {
            submit_zero_unit_orders: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: SettlementConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SettlementConfig::default());

        let config: SettlementConfig =
            serde_json::from_str(r#"{"submit_zero_unit_orders": false}"#).unwrap();
        assert_eq!(config, SettlementConfig::tradable_only());
    }
}
