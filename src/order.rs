//! Order and execution receipt records.
//!
//! An `Order` is the one record shape used throughout a settlement run: a
//! customer's pending transaction, a holding, an aggregated net order, a
//! broker-bound integer order and a completed-order record are all orders.
//! What `value` means depends on the stage that produced it: a price per unit
//! for pending orders and holdings, the signed total consideration for a
//! completed order.

use crate::types::{round_half_up, InstrumentId, Quote, Units};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub identifier: InstrumentId,
    pub units: Units,
    pub value: Quote,
}

impl Order {
    pub fn new(identifier: InstrumentId, units: Units, value: Quote) -> Self {
        Self {
            identifier,
            units,
            value,
        }
    }

    /// Same instrument and value context, different quantity.
    pub fn with_units(&self, units: Units) -> Self {
        Self {
            identifier: self.identifier.clone(),
            units,
            value: self.value,
        }
    }

    pub fn is_for(&self, identifier: &InstrumentId) -> bool {
        &self.identifier == identifier
    }

    // units * value. only meaningful when value is a per-unit price.
    pub fn notional(&self) -> Quote {
        self.value.mul(self.units.value())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ {}", self.identifier, self.units, self.value)
    }
}

/// Renders a batch on one line for the settlement log.
pub fn format_orders(orders: &[Order]) -> String {
    let parts: Vec<String> = orders.iter().map(|o| o.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Broker execution result for one instrument. The broker's fee is already
/// folded into `total_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub identifier: InstrumentId,
    pub total_units: Units,
    pub total_value: Quote,
}

impl ExecutionReceipt {
    pub fn new(identifier: InstrumentId, total_units: Units, total_value: Quote) -> Self {
        Self {
            identifier,
            total_units,
            total_value,
        }
    }

    /// Consideration per unit, half-up at 5 dp. None for a zero-unit fill.
    pub fn price_per_unit(&self) -> Option<Decimal> {
        self.total_value
            .value()
            .checked_div(self.total_units.value())
            .map(round_half_up)
    }
}

impl fmt::Display for ExecutionReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} for {}", self.identifier, self.total_units, self.total_value)
    }
}

pub fn format_receipts(receipts: &[ExecutionReceipt]) -> String {
    let parts: Vec<String> = receipts.iter().map(|r| r.to_string()).collect();
    format!("[{}]", parts.join(", "))
}
