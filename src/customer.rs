//! Customer ledger: pending transactions, holdings and cash.
//!
//! A customer holds at most one pending transaction and one holding per
//! instrument. Settlement only ever touches a customer through
//! [`Customer::complete_transaction`], which walks a pending transaction
//! through `Pending(full) -> Pending(reduced)* -> Settled(removed)`.

use crate::order::Order;
use crate::types::{CustomerId, InstrumentId, Quote, Units};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pending: Vec<Order>,
    holdings: Vec<Order>,
    pub cash: Quote,
}

/// What `complete_transaction` did to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Nothing pending for the instrument. Ledger untouched.
    NoMatchingPending,
    /// Pending transaction reduced and kept.
    Partial { applied: Order, remaining: Units },
    /// Pending transaction removed. `clamped_from` is set when the completed
    /// order asked for more than was pending.
    Settled { applied: Order, clamped_from: Option<Units> },
}

impl Completion {
    pub fn applied(&self) -> Option<&Order> {
        match self {
            Completion::NoMatchingPending => None,
            Completion::Partial { applied, .. } | Completion::Settled { applied, .. } => Some(applied),
        }
    }

    pub fn was_clamped(&self) -> bool {
        matches!(self, Completion::Settled { clamped_from: Some(_), .. })
    }
}

impl Customer {
    pub fn new(id: CustomerId) -> Self {
        Self {
            id,
            pending: Vec::new(),
            holdings: Vec::new(),
            cash: Quote::zero(),
        }
    }

    pub fn with_cash(mut self, cash: Quote) -> Self {
        self.cash = cash;
        self
    }

    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    pub fn pending_transactions(&self) -> &[Order] {
        &self.pending
    }

    pub fn holdings(&self) -> &[Order] {
        &self.holdings
    }

    pub fn add_pending_transaction(&mut self, order: Order) -> Result<(), CustomerError> {
        if order.identifier.is_empty() {
            return Err(CustomerError::EmptyIdentifier);
        }
        if self.has_pending(&order.identifier) {
            return Err(CustomerError::DuplicatePending(order.identifier));
        }
        self.pending.push(order);
        Ok(())
    }

    pub fn add_holding(&mut self, order: Order) -> Result<(), CustomerError> {
        if order.identifier.is_empty() {
            return Err(CustomerError::EmptyIdentifier);
        }
        if self.find_holding(&order.identifier).is_some() {
            return Err(CustomerError::DuplicateHolding(order.identifier));
        }
        if order.units.is_sell() {
            return Err(CustomerError::NegativeHolding {
                identifier: order.identifier,
                current: Units::zero(),
                change: order.units,
            });
        }
        self.holdings.push(order);
        Ok(())
    }

    pub fn find_pending_transaction(&self, identifier: &InstrumentId) -> Option<&Order> {
        self.pending.iter().find(|o| o.is_for(identifier))
    }

    pub fn has_pending(&self, identifier: &InstrumentId) -> bool {
        self.find_pending_transaction(identifier).is_some()
    }

    pub fn find_holding(&self, identifier: &InstrumentId) -> Option<&Order> {
        self.holdings.iter().find(|o| o.is_for(identifier))
    }

    pub fn holding_units(&self, identifier: &InstrumentId) -> Units {
        self.find_holding(identifier).map(|h| h.units).unwrap_or_default()
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    // holdings carry their price in `value`
    pub fn holdings_value(&self) -> Quote {
        self.holdings.iter().map(Order::notional).sum()
    }

    pub fn total_aum(&self) -> Quote {
        self.cash.add(self.holdings_value())
    }

    /// 4.6: apply a completed order to this customer.
    ///
    /// `completed.value` is signed consideration (price per unit times signed
    /// units), so cash always moves by `-value`: buys debit, sells credit.
    /// Validation happens before any mutation; an `Err` leaves the customer
    /// exactly as it was.
    pub fn complete_transaction(&mut self, completed: &Order) -> Result<Completion, CustomerError> {
        let Some(idx) = self.pending.iter().position(|o| o.is_for(&completed.identifier)) else {
            return Ok(Completion::NoMatchingPending);
        };
        let pending_units = self.pending[idx].units;

        if let (Some(pending_dir), Some(completed_dir)) = (pending_units.direction(), completed.units.direction()) {
            if pending_dir != completed_dir {
                return Err(CustomerError::DirectionMismatch {
                    identifier: completed.identifier.clone(),
                    pending: pending_units,
                    completed: completed.units,
                });
            }
        }

        let over_completed = completed.units.abs() > pending_units.abs();
        let applied = if over_completed {
            // keep the completed order's per-unit price on the clamped quantity
            let value = completed
                .value
                .value()
                .checked_div(completed.units.value())
                .map(|per_unit| Quote::new(per_unit * pending_units.value()))
                .unwrap_or_default();
            Order::new(completed.identifier.clone(), pending_units, value)
        } else {
            completed.clone()
        };

        let current = self.holding_units(&completed.identifier);
        let new_holding = current.add(applied.units);
        if new_holding.is_sell() {
            return Err(CustomerError::NegativeHolding {
                identifier: completed.identifier.clone(),
                current,
                change: applied.units,
            });
        }

        match self.holdings.iter_mut().find(|h| h.is_for(&completed.identifier)) {
            Some(holding) => holding.units = new_holding,
            None => {
                let price = applied
                    .value
                    .value()
                    .checked_div(applied.units.value())
                    .map(Quote::new)
                    .unwrap_or_else(|| self.pending[idx].value);
                self.holdings
                    .push(Order::new(completed.identifier.clone(), new_holding, price));
            }
        }
        self.cash = self.cash.sub(applied.value);

        if applied.units.abs() >= pending_units.abs() {
            self.pending.remove(idx);
            let clamped_from = over_completed.then_some(completed.units);
            if let Some(asked) = clamped_from {
                warn!(
                    "{}: completed {} {} exceeds pending {}, clamped",
                    self.id, asked, completed.identifier, pending_units
                );
            }
            Ok(Completion::Settled { applied, clamped_from })
        } else {
            let remaining = pending_units.sub(applied.units);
            self.pending[idx].units = remaining;
            Ok(Completion::Partial { applied, remaining })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomerError {
    #[error("Order identifier must not be empty")]
    EmptyIdentifier,

    #[error("Pending transaction for {0} already exists")]
    DuplicatePending(InstrumentId),

    #[error("Holding for {0} already exists")]
    DuplicateHolding(InstrumentId),

    #[error("Completed {completed} of {identifier} runs against pending {pending}")]
    DirectionMismatch {
        identifier: InstrumentId,
        pending: Units,
        completed: Units,
    },

    #[error("Holding of {identifier} would go negative: current {current}, change {change}")]
    NegativeHolding {
        identifier: InstrumentId,
        current: Units,
        change: Units,
    },
}
