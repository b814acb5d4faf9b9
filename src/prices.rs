// Price lookup
//
// Settlement never prices anything itself. Prices are only needed to give a
// freshly loaded pending order or holding its value context, and by the paper
// broker to fill. Anything that can answer "what is X worth" implements
// `PriceLookup`.

use crate::types::{InstrumentId, Quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub trait PriceLookup {
    /// Current price per unit. Never defaults a missing instrument to zero.
    fn price(&self, identifier: &InstrumentId) -> Result<Quote, PriceError>;
}

impl<P: PriceLookup + ?Sized> PriceLookup for &P {
    fn price(&self, identifier: &InstrumentId) -> Result<Quote, PriceError> {
        (**self).price(identifier)
    }
}

/// Fixed in-memory price table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTable {
    prices: HashMap<InstrumentId, Quote>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, identifier: impl Into<InstrumentId>, price: Decimal) -> Self {
        self.set_price(identifier, price);
        self
    }

    pub fn set_price(&mut self, identifier: impl Into<InstrumentId>, price: Decimal) {
        self.prices.insert(identifier.into(), Quote::new(price));
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceLookup for PriceTable {
    fn price(&self, identifier: &InstrumentId) -> Result<Quote, PriceError> {
        let price = self
            .prices
            .get(identifier)
            .copied()
            .ok_or_else(|| PriceError::MissingPrice(identifier.clone()))?;

        if price.value() <= Decimal::ZERO {
            return Err(PriceError::InvalidPrice {
                identifier: identifier.clone(),
                price,
            });
        }
        Ok(price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("No price available for {0}")]
    MissingPrice(InstrumentId),

    #[error("Price {price} for {identifier} is not positive")]
    InvalidPrice { identifier: InstrumentId, price: Quote },
}
