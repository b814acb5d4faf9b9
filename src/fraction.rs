//! Fraction splitting and allocation.
//!
//! The broker only fills whole units. [`split_fractions`] strips the
//! fractional part off every aggregated order so the batch is broker-safe, and
//! [`allocate_fractions`] spreads that stripped remainder evenly over the
//! customers who ordered the instrument. The result is each customer's
//! purchasable quantity: what they are actually credited once the integer
//! order fills.

use crate::ledger::CustomerLedger;
use crate::order::Order;
use crate::report::Anomaly;
use crate::types::{round_half_up, CustomerId, InstrumentId, Units};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// customer -> instrument -> fraction-adjusted order. built per run.
pub type Allocations = BTreeMap<CustomerId, BTreeMap<InstrumentId, Order>>;

#[derive(Debug, Clone, Default)]
pub struct FractionSplit {
    /// Integer-unit orders, same order as the input.
    pub submittable: Vec<Order>,
    /// Stripped remainder per instrument. Zero when there was no fraction.
    pub remainders: BTreeMap<InstrumentId, Units>,
}

impl FractionSplit {
    pub fn remainder(&self, identifier: &InstrumentId) -> Units {
        self.remainders.get(identifier).copied().unwrap_or_default()
    }
}

pub fn split_fractions(combined: &[Order]) -> FractionSplit {
    let mut split = FractionSplit::default();

    for order in combined {
        let (submittable, fraction) = if order.units.is_integer() {
            (order.clone(), Units::zero())
        } else {
            let fraction = order.units.fraction();
            (order.with_units(order.units.sub(fraction)), fraction)
        };
        split.submittable.push(submittable);
        split.remainders.insert(order.identifier.clone(), fraction);
    }

    split
}

#[derive(Debug, Clone, Default)]
pub struct FractionAllocation {
    pub orders: Allocations,
    /// Clamps applied while allocating. See [`Anomaly::AllocationClamped`].
    pub clamps: Vec<Anomaly>,
}

impl FractionAllocation {
    pub fn purchasable(&self, customer: &CustomerId, identifier: &InstrumentId) -> Option<&Order> {
        self.orders.get(customer).and_then(|orders| orders.get(identifier))
    }

    /// Instruments with at least one allocated order.
    pub fn identifiers(&self) -> Vec<InstrumentId> {
        let mut ids: Vec<InstrumentId> = self
            .orders
            .values()
            .flat_map(|orders| orders.keys().cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Every customer pending on an instrument absorbs `remainder / count`
/// (half-up, 5 dp) of its stripped fraction.
///
/// The purchasable quantity is kept between zero and the customer's own
/// pending units, so a customer can never be credited more than they asked
/// for or flipped into the opposite direction. Any clamp is reported, and the
/// share a clamped customer could not absorb is spread again over the
/// customers still open, so the purchasable quantities add up to the integer
/// order (within the 5 dp rounding of each share).
pub fn allocate_fractions(
    combined: &[Order],
    remainders: &BTreeMap<InstrumentId, Units>,
    ledger: &CustomerLedger,
) -> FractionAllocation {
    let mut allocation = FractionAllocation::default();

    for order in combined {
        let identifier = &order.identifier;
        let mut open: Vec<(&CustomerId, &Order)> = ledger
            .customers_with_pending(identifier)
            .into_iter()
            .filter_map(|c| c.find_pending_transaction(identifier).map(|p| (&c.id, p)))
            .collect();
        if open.is_empty() {
            continue;
        }

        let mut remainder = remainders.get(identifier).copied().unwrap_or_default();

        // clamped customers leave the pool with whatever they absorbed;
        // the pool only shrinks so this ends
        loop {
            let count = Decimal::from(open.len() as u64);
            let deduction = Units::new(round_half_up(remainder.value() / count));

            let (clamped, free): (Vec<_>, Vec<_>) = open.into_iter().partition(|(_, pending)| {
                let requested = pending.units.sub(deduction);
                requested.clamp_towards_zero(pending.units) != requested
            });

            if clamped.is_empty() {
                for (customer, pending) in free {
                    let purchasable = pending.units.sub(deduction);
                    debug!(
                        "{}: {} pending {}, deduct {}, purchasable {}",
                        customer, identifier, pending.units, deduction, purchasable
                    );
                    credit(&mut allocation, customer, pending, purchasable);
                }
                break;
            }

            for (customer, pending) in clamped {
                let requested = pending.units.sub(deduction);
                let purchasable = requested.clamp_towards_zero(pending.units);
                warn!(
                    "{}: purchasable {} {} outside pending {}, clamped to {}",
                    customer, requested, identifier, pending.units, purchasable
                );
                allocation.clamps.push(Anomaly::AllocationClamped {
                    customer: customer.clone(),
                    identifier: identifier.clone(),
                    requested,
                    allocated: purchasable,
                });
                remainder = remainder.sub(pending.units.sub(purchasable));
                credit(&mut allocation, customer, pending, purchasable);
            }

            if free.is_empty() {
                if !remainder.is_zero() {
                    warn!("{}: {} of the remainder could not be allocated", identifier, remainder);
                }
                break;
            }
            open = free;
        }
    }

    allocation
}

fn credit(allocation: &mut FractionAllocation, customer: &CustomerId, pending: &Order, purchasable: Units) {
    allocation
        .orders
        .entry(customer.clone())
        .or_default()
        .insert(pending.identifier.clone(), pending.with_units(purchasable));
}
