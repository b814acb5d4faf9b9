//! Brokerage gateway.
//!
//! The core hands the broker a batch of whole-unit orders and gets back one
//! receipt per instrument. The fee and the routing are the broker's business;
//! settlement only reads `total_units` and `total_value` off the receipt.

use crate::order::{ExecutionReceipt, Order};
use crate::prices::{PriceError, PriceLookup};
use crate::types::{InstrumentId, Quote, Units};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trait for brokerage execution backends.
pub trait BrokerGateway {
    /// Execute a batch of integer-unit orders. Blocking; returns the complete
    /// result set or fails as a whole.
    fn process_orders(&mut self, orders: &[Order]) -> Result<Vec<ExecutionReceipt>, BrokerError>;

    /// Backend identifier for logs.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    #[error("Order for {identifier} has fractional units {units}")]
    FractionalUnits { identifier: InstrumentId, units: Units },

    #[error("Order for {identifier} rejected: {source}")]
    Unpriced {
        identifier: InstrumentId,
        #[source]
        source: PriceError,
    },

    #[error("Broker unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperBrokerConfig {
    // Flat fee charged per non-zero order in a batch
    pub fee_per_order: Decimal,
}

impl Default for PaperBrokerConfig {
    fn default() -> Self {
        Self {
            fee_per_order: Decimal::new(5, 0), // $5
        }
    }
}

impl PaperBrokerConfig {
    pub fn fee_free() -> Self {
        Self {
            fee_per_order: Decimal::ZERO,
        }
    }
}

/// Deterministic in-memory broker. Every non-zero order fills completely at
/// the lookup price; the flat fee raises the cost of a buy and lowers the
/// proceeds of a sell, so `total_value = units * price + fee` in both cases.
#[derive(Debug)]
pub struct PaperBroker<P: PriceLookup> {
    config: PaperBrokerConfig,
    prices: P,
    batches_processed: u64,
    fees_charged: Quote,
    fail_next: Option<String>,
}

impl<P: PriceLookup> PaperBroker<P> {
    pub fn new(config: PaperBrokerConfig, prices: P) -> Self {
        Self {
            config,
            prices,
            batches_processed: 0,
            fees_charged: Quote::zero(),
            fail_next: None,
        }
    }

    pub fn batches_processed(&self) -> u64 {
        self.batches_processed
    }

    pub fn fees_charged(&self) -> Quote {
        self.fees_charged
    }

    /// Make the next `process_orders` call fail with `Unavailable`.
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }
}

impl<P: PriceLookup> BrokerGateway for PaperBroker<P> {
    fn process_orders(&mut self, orders: &[Order]) -> Result<Vec<ExecutionReceipt>, BrokerError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(BrokerError::Unavailable(reason));
        }

        // validate the whole batch before filling any of it
        if let Some(bad) = orders.iter().find(|o| !o.units.is_integer()) {
            return Err(BrokerError::FractionalUnits {
                identifier: bad.identifier.clone(),
                units: bad.units,
            });
        }

        let fee = Quote::new(self.config.fee_per_order);
        let mut fills: BTreeMap<InstrumentId, (Units, Quote)> = BTreeMap::new();
        let mut fees = Quote::zero();

        for order in orders {
            let entry = fills
                .entry(order.identifier.clone())
                .or_insert((Units::zero(), Quote::zero()));
            if order.units.is_zero() {
                continue;
            }

            let price = self.prices.price(&order.identifier).map_err(|source| BrokerError::Unpriced {
                identifier: order.identifier.clone(),
                source,
            })?;
            let consideration = price.mul(order.units.value()).add(fee);

            entry.0 = entry.0.add(order.units);
            entry.1 = entry.1.add(consideration);
            fees = fees.add(fee);
        }

        self.batches_processed += 1;
        self.fees_charged = self.fees_charged.add(fees);

        let receipts: Vec<ExecutionReceipt> = fills
            .into_iter()
            .map(|(identifier, (units, value))| ExecutionReceipt::new(identifier, units, value))
            .collect();
        debug!("paper broker filled {} receipts, fees {}", receipts.len(), fees);
        Ok(receipts)
    }

    fn name(&self) -> &str {
        "paper"
    }
}
