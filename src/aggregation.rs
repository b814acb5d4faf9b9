// 3.0 aggregation.rs: nets every customer's pending orders into one order per
// instrument. buys and sells on the same instrument cancel against each other.

use crate::ledger::CustomerLedger;
use crate::order::Order;
use crate::types::InstrumentId;
use std::collections::BTreeMap;

/// One combined order per instrument, ascending by identifier.
///
/// Units are the exact signed sum of all pending units. The combined order
/// keeps the price context of the first pending order seen for the
/// instrument. Instruments that net to zero are still returned.
pub fn aggregate_orders(ledger: &CustomerLedger) -> Vec<Order> {
    let mut combined: BTreeMap<InstrumentId, Order> = BTreeMap::new();

    for customer in ledger.iter() {
        for pending in customer.pending_transactions() {
            combined
                .entry(pending.identifier.clone())
                .and_modify(|order| order.units = order.units.add(pending.units))
                .or_insert_with(|| pending.clone());
        }
    }

    combined.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::Customer;
    use crate::types::{CustomerId, Quote, Units};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn customer(name: &str, pending: &[(&str, Decimal)]) -> Customer {
        let mut c = Customer::new(CustomerId::new(name));
        for (id, units) in pending {
            c.add_pending_transaction(Order::new(
                InstrumentId::new(*id),
                Units::new(*units),
                Quote::new(dec!(100)),
            ))
            .unwrap();
        }
        c
    }

    #[test]
    fn sums_per_instrument_sorted() {
        let ledger: CustomerLedger = vec![
            customer("alice", &[("TSLA", dec!(1.25)), ("AAPL", dec!(10.5))]),
            customer("bob", &[("AAPL", dec!(5.3))]),
        ]
        .into_iter()
        .collect();

        let combined = aggregate_orders(&ledger);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined[0].identifier.as_str(), "AAPL");
        assert_eq!(combined[0].units.value(), dec!(15.8));
        assert_eq!(combined[1].identifier.as_str(), "TSLA");
        assert_eq!(combined[1].units.value(), dec!(1.25));
    }

    #[test]
    fn buys_and_sells_net() {
        let ledger: CustomerLedger = vec![
            customer("alice", &[("AAPL", dec!(10.5))]),
            customer("bob", &[("AAPL", dec!(-4.2))]),
            customer("carol", &[("AAPL", dec!(-6.3))]),
        ]
        .into_iter()
        .collect();

        let combined = aggregate_orders(&ledger);
        assert_eq!(combined.len(), 1);
        // nets to exactly zero but is still carried forward
        assert!(combined[0].units.is_zero());
    }

    #[test]
    fn does_not_touch_customers() {
        let ledger: CustomerLedger = vec![
            customer("alice", &[("AAPL", dec!(1))]),
            customer("bob", &[("AAPL", dec!(2))]),
        ]
        .into_iter()
        .collect();

        aggregate_orders(&ledger);
        let alice = ledger.get(&CustomerId::new("alice")).unwrap();
        assert_eq!(alice.pending_transactions()[0].units.value(), dec!(1));
    }

    #[test]
    fn empty_ledger_has_no_orders() {
        assert!(aggregate_orders(&CustomerLedger::new()).is_empty());
    }
}
