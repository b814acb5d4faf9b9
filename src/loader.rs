//! Customer position loader.
//!
//! Reads header-less CSV rows of `name,identifier,holding_units,pending_units`.
//! Each row gives the named customer one holding and one pending transaction
//! on the instrument, both valued at the looked-up price. A customer appears
//! on as many rows as they have instruments.

use crate::customer::CustomerError;
use crate::ledger::CustomerLedger;
use crate::order::Order;
use crate::prices::{PriceError, PriceLookup};
use crate::types::{CustomerId, InstrumentId, Units};
use log::info;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

// units stay strings until parsed here so nothing goes through f64
#[derive(Debug, Deserialize)]
struct PositionRow {
    name: String,
    identifier: String,
    holding_units: String,
    pending_units: String,
}

pub fn load_customers<R: Read>(reader: R, prices: &impl PriceLookup) -> Result<CustomerLedger, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut ledger = CustomerLedger::new();
    let mut rows = 0usize;

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: PositionRow = record.deserialize(None)?;

        let identifier = InstrumentId::new(row.identifier);
        let holding = parse_units(&row.holding_units, line)?;
        let pending = parse_units(&row.pending_units, line)?;
        let price = prices
            .price(&identifier)
            .map_err(|source| LoadError::Price { line, source })?;

        let customer = ledger.get_or_create(CustomerId::new(row.name));
        customer
            .add_pending_transaction(Order::new(identifier.clone(), pending, price))
            .map_err(|source| LoadError::Customer { line, source })?;
        customer
            .add_holding(Order::new(identifier, holding, price))
            .map_err(|source| LoadError::Customer { line, source })?;
        rows += 1;
    }

    info!("loaded {} positions for {} customers", rows, ledger.len());
    Ok(ledger)
}

pub fn load_customers_from_path<P: AsRef<Path>>(
    path: P,
    prices: &impl PriceLookup,
) -> Result<CustomerLedger, LoadError> {
    let file = File::open(path)?;
    load_customers(file, prices)
}

fn parse_units(raw: &str, line: u64) -> Result<Units, LoadError> {
    Decimal::from_str(raw)
        .map(Units::new)
        .map_err(|_| LoadError::InvalidUnits {
            line,
            value: raw.to_string(),
        })
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: invalid units {value:?}")]
    InvalidUnits { line: u64, value: String },

    #[error("Line {line}: {source}")]
    Price {
        line: u64,
        #[source]
        source: PriceError,
    },

    #[error("Line {line}: {source}")]
    Customer {
        line: u64,
        #[source]
        source: CustomerError,
    },
}
