// fractional-settlement: settles customers' fractional orders against a broker
// that only fills whole units.
// all computation is exact decimal and deterministic. the broker is the only
// external call and sits behind a trait.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: InstrumentId, CustomerId, Units, Quote, rounding
//   1.x  order.rs: Order and ExecutionReceipt records
//   2.x  customer.rs: customer ledger entry, complete_transaction
//   2.x  ledger.rs: customer store borrowed by a run
//   3.x  aggregation.rs: net pending orders per instrument
//   4.x  fraction.rs: strip fractions, allocate remainders per customer
//   5.x  distribution.rs: receipts -> per-customer completed orders
//   6.x  report.rs: run report and anomalies
//   7.x  engine/: settlement engine, config, run errors
//   8.x  broker.rs: BrokerGateway trait + paper broker
//   8.1  prices.rs: PriceLookup trait + price table
//   8.2  loader.rs: CSV customer positions

// core settlement modules
pub mod aggregation;
pub mod customer;
pub mod distribution;
pub mod engine;
pub mod fraction;
pub mod ledger;
pub mod order;
pub mod report;
pub mod types;

// integration modules
pub mod broker;
pub mod loader;
pub mod prices;

// re exports for convenience
pub use aggregation::*;
pub use customer::*;
pub use distribution::*;
pub use engine::*;
pub use fraction::*;
pub use ledger::*;
pub use order::*;
pub use report::*;
pub use types::*;
pub use broker::{BrokerError, BrokerGateway, PaperBroker, PaperBrokerConfig};
pub use loader::{load_customers, load_customers_from_path, LoadError};
pub use prices::{PriceError, PriceLookup, PriceTable};
