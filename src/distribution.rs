// 5.0 distribution.rs: turns broker receipts into per-customer completed orders.
// price per unit comes from the receipt (fee already folded in); each customer's
// share is that price times their fraction-adjusted units.

use crate::customer::Completion;
use crate::fraction::FractionAllocation;
use crate::ledger::CustomerLedger;
use crate::order::{ExecutionReceipt, Order};
use crate::report::{Anomaly, CompletionRecord};
use crate::types::Quote;
use log::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct Distribution {
    pub completions: Vec<CompletionRecord>,
    pub anomalies: Vec<Anomaly>,
}

/// Applies every receipt to the customers allocated on its instrument.
///
/// Receipts are matched by identifier, never by position in the batch. A
/// zero-unit receipt is skipped. A customer whose ledger rejects the
/// completion is reported and left untouched; the rest still settle.
pub fn distribute_receipts(
    receipts: &[ExecutionReceipt],
    allocation: &FractionAllocation,
    ledger: &mut CustomerLedger,
) -> Distribution {
    let mut distribution = Distribution::default();

    for identifier in allocation.identifiers() {
        if !receipts.iter().any(|r| r.identifier == identifier) {
            warn!("no receipt for {}, pending orders left open", identifier);
            distribution.anomalies.push(Anomaly::MissingReceipt { identifier });
        }
    }

    for receipt in receipts {
        let Some(price_per_unit) = receipt.price_per_unit() else {
            warn!("zero-unit receipt for {}, skipped", receipt.identifier);
            distribution.anomalies.push(Anomaly::ZeroUnitReceipt {
                identifier: receipt.identifier.clone(),
            });
            continue;
        };

        for customer in ledger.iter_mut() {
            let Some(purchased) = allocation.purchasable(&customer.id, &receipt.identifier) else {
                continue;
            };

            let share = Quote::new(price_per_unit * purchased.units.value());
            let completed = Order::new(receipt.identifier.clone(), purchased.units, share);

            match customer.complete_transaction(&completed) {
                Ok(completion) => {
                    debug!("{}: completed {} -> {:?}", customer.id, completed, completion);
                    if let Completion::Settled { applied, clamped_from: Some(asked) } = &completion {
                        distribution.anomalies.push(Anomaly::CompletionClamped {
                            customer: customer.id.clone(),
                            identifier: receipt.identifier.clone(),
                            requested: *asked,
                            pending: applied.units,
                        });
                    }
                    distribution.completions.push(CompletionRecord {
                        customer: customer.id.clone(),
                        requested: completed,
                        completion,
                    });
                }
                Err(reason) => {
                    warn!("{}: completion of {} rejected: {}", customer.id, completed, reason);
                    distribution.anomalies.push(Anomaly::CompletionRejected {
                        customer: customer.id.clone(),
                        identifier: receipt.identifier.clone(),
                        reason,
                    });
                }
            }
        }
    }

    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::Customer;
    use crate::types::{CustomerId, InstrumentId, Units};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn aapl() -> InstrumentId {
        InstrumentId::new("AAPL")
    }

    fn setup(rows: &[(&str, Decimal, Decimal, Decimal)]) -> (CustomerLedger, FractionAllocation) {
        // (name, holding, pending, purchasable)
        let mut ledger = CustomerLedger::new();
        let mut allocation = FractionAllocation::default();
        for (name, holding, pending, purchasable) in rows {
            let id = CustomerId::new(*name);
            let mut c = Customer::new(id.clone()).with_cash(Quote::new(dec!(5000)));
            c.add_holding(Order::new(aapl(), Units::new(*holding), Quote::new(dec!(100))))
                .unwrap();
            c.add_pending_transaction(Order::new(aapl(), Units::new(*pending), Quote::new(dec!(100))))
                .unwrap();
            ledger.insert(c);
            allocation.orders.entry(id).or_default().insert(
                aapl(),
                Order::new(aapl(), Units::new(*purchasable), Quote::new(dec!(100))),
            );
        }
        (ledger, allocation)
    }

    fn receipt(units: Decimal, value: Decimal) -> ExecutionReceipt {
        ExecutionReceipt::new(aapl(), Units::new(units), Quote::new(value))
    }

    #[test]
    fn shares_follow_purchasable_units() {
        let (mut ledger, allocation) = setup(&[
            ("alice", dec!(0), dec!(10.5), dec!(10.1)),
            ("bob", dec!(0), dec!(5.3), dec!(4.9)),
        ]);

        let result = distribute_receipts(&[receipt(dec!(15), dec!(1500))], &allocation, &mut ledger);
        assert!(result.anomalies.is_empty());
        assert_eq!(result.completions.len(), 2);

        let alice = ledger.get(&CustomerId::new("alice")).unwrap();
        assert_eq!(alice.holding_units(&aapl()).value(), dec!(10.1));
        assert_eq!(alice.cash.value(), dec!(3990)); // 5000 - 1010
        // 10.5 pending, 10.1 filled: 0.4 stays open
        assert_eq!(alice.find_pending_transaction(&aapl()).unwrap().units.value(), dec!(0.4));

        let bob = ledger.get(&CustomerId::new("bob")).unwrap();
        assert_eq!(bob.cash.value(), dec!(4510)); // 5000 - 490
    }

    #[test]
    fn completed_value_is_price_times_units() {
        let (mut ledger, allocation) = setup(&[("alice", dec!(0), dec!(10.5), dec!(10.1))]);
        let result = distribute_receipts(&[receipt(dec!(15), dec!(1500))], &allocation, &mut ledger);

        assert_eq!(result.completions[0].requested.value.value(), dec!(1010.00000));
    }

    #[test]
    fn zero_unit_receipt_skipped() {
        let (mut ledger, allocation) = setup(&[("alice", dec!(0), dec!(0.4), dec!(0.4))]);
        let result = distribute_receipts(&[receipt(dec!(0), dec!(0))], &allocation, &mut ledger);

        assert_eq!(result.anomalies, vec![Anomaly::ZeroUnitReceipt { identifier: aapl() }]);
        assert!(result.completions.is_empty());
        assert_eq!(ledger.get(&CustomerId::new("alice")).unwrap().cash.value(), dec!(5000));
    }

    #[test]
    fn missing_receipt_reported() {
        let (mut ledger, allocation) = setup(&[("alice", dec!(0), dec!(2), dec!(2))]);
        let result = distribute_receipts(&[], &allocation, &mut ledger);

        assert_eq!(result.anomalies, vec![Anomaly::MissingReceipt { identifier: aapl() }]);
        assert!(!ledger.all_settled());
    }

    #[test]
    fn rejected_customer_does_not_block_others() {
        // carol sells 5 but only holds 1
        let (mut ledger, allocation) = setup(&[
            ("alice", dec!(10), dec!(-2), dec!(-2)),
            ("carol", dec!(1), dec!(-5), dec!(-5)),
        ]);
        let result = distribute_receipts(&[receipt(dec!(-7), dec!(-695))], &allocation, &mut ledger);

        assert_eq!(result.completions.len(), 1);
        assert!(matches!(
            result.anomalies.as_slice(),
            [Anomaly::CompletionRejected { .. }]
        ));

        let alice = ledger.get(&CustomerId::new("alice")).unwrap();
        assert!(alice.is_settled());
        assert_eq!(alice.holding_units(&aapl()).value(), dec!(8));
        // 695 / 7 = 99.285714... -> 99.28571, times 2 units
        assert_eq!(alice.cash.value(), dec!(5198.57142));

        let carol = ledger.get(&CustomerId::new("carol")).unwrap();
        assert_eq!(carol.holding_units(&aapl()).value(), dec!(1));
        assert_eq!(carol.cash.value(), dec!(5000));
    }

    #[test]
    fn unallocated_receipt_touches_nobody() {
        let (mut ledger, allocation) = setup(&[("alice", dec!(0), dec!(1), dec!(1))]);
        let other = ExecutionReceipt::new(InstrumentId::new("TSLA"), Units::new(dec!(3)), Quote::new(dec!(600)));
        let result = distribute_receipts(&[other], &allocation, &mut ledger);

        assert!(result.completions.is_empty());
        assert_eq!(ledger.get(&CustomerId::new("alice")).unwrap().cash.value(), dec!(5000));
    }
}
