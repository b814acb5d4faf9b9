// 7.0: settlement engine. runs aggregate -> split -> allocate -> submit ->
// distribute as one synchronous pass over a borrowed customer ledger.

mod config;
mod core;
mod results;
mod settle;

pub use config::SettlementConfig;
pub use core::SettlementEngine;
pub use results::SettlementError;
