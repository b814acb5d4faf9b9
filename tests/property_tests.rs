//! Property-based tests for settlement invariants.
//!
//! These tests verify conservation and the ledger safety rules hold for random
//! books of fractional orders.

use fractional_settlement::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const PRICE: Decimal = dec!(100);

// Strategies for generating test data
fn units_strategy() -> impl Strategy<Value = Decimal> {
    (-50_000i64..50_000i64).prop_map(|x| Decimal::new(x, 3)) // -50.000 to 50.000
}

fn buy_units_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..50_000i64).prop_map(|x| Decimal::new(x, 3)) // 0.001 to 50.000
}

fn holding_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|x| Decimal::new(x, 3))
}

fn aapl() -> InstrumentId {
    InstrumentId::new("AAPL")
}

fn book(rows: &[(Decimal, Decimal, Decimal)]) -> CustomerLedger {
    // (holding, pending, cash)
    rows.iter()
        .enumerate()
        .map(|(i, (holding, pending, cash))| {
            let mut c = Customer::new(CustomerId::new(format!("c{:03}", i))).with_cash(Quote::new(*cash));
            c.add_holding(Order::new(aapl(), Units::new(*holding), Quote::new(PRICE)))
                .unwrap();
            c.add_pending_transaction(Order::new(aapl(), Units::new(*pending), Quote::new(PRICE)))
                .unwrap();
            c
        })
        .collect()
}

fn engine() -> SettlementEngine<PaperBroker<PriceTable>> {
    SettlementEngine::new(
        SettlementConfig::default(),
        PaperBroker::new(PaperBrokerConfig::fee_free(), PriceTable::new().with_price("AAPL", PRICE)),
    )
}

fn pending_of(ledger: &CustomerLedger, id: &CustomerId) -> Units {
    ledger
        .get(id)
        .and_then(|c| c.find_pending_transaction(&aapl()))
        .map(|o| o.units)
        .unwrap_or_default()
}

proptest! {
    /// Integer part plus stripped fraction is exactly the aggregated quantity
    #[test]
    fn split_conserves_units(units in proptest::collection::vec(units_strategy(), 1..20)) {
        let combined: Vec<Order> = units
            .iter()
            .enumerate()
            .map(|(i, u)| Order::new(InstrumentId::new(format!("I{}", i)), Units::new(*u), Quote::new(PRICE)))
            .collect();

        let split = split_fractions(&combined);
        for (orig, sub) in combined.iter().zip(&split.submittable) {
            prop_assert!(sub.units.is_integer());
            prop_assert!(sub.units.abs() <= orig.units.abs());
            prop_assert_eq!(sub.units.add(split.remainder(&orig.identifier)), orig.units);
        }
    }

    /// Purchasable units always sit between zero and the customer's own pending order
    #[test]
    fn allocation_within_pending(
        rows in proptest::collection::vec((holding_strategy(), units_strategy()), 1..12),
    ) {
        let rows: Vec<_> = rows.into_iter().map(|(h, p)| (h, p, dec!(0))).collect();
        let ledger = book(&rows);
        let combined = aggregate_orders(&ledger);
        let split = split_fractions(&combined);
        let allocation = allocate_fractions(&combined, &split.remainders, &ledger);

        for customer in ledger.iter() {
            let pending = customer.find_pending_transaction(&aapl()).unwrap().units;
            let purchasable = allocation.purchasable(&customer.id, &aapl()).unwrap().units;
            prop_assert!(purchasable.abs() <= pending.abs());
            prop_assert!(purchasable.is_zero() || purchasable.direction() == pending.direction());
        }
    }

    /// Purchasable units add up to the integer order the broker fills
    #[test]
    fn allocation_matches_submitted_units(
        rows in proptest::collection::vec((holding_strategy(), units_strategy()), 1..12),
    ) {
        let rows: Vec<_> = rows.into_iter().map(|(h, p)| (h, p, dec!(0))).collect();
        let ledger = book(&rows);
        let combined = aggregate_orders(&ledger);
        let split = split_fractions(&combined);
        let allocation = allocate_fractions(&combined, &split.remainders, &ledger);

        let allocated: Units = ledger
            .iter()
            .filter_map(|c| allocation.purchasable(&c.id, &aapl()))
            .map(|o| o.units)
            .sum();
        // each share is rounded half-up to 5 dp
        let slack = Decimal::new(5, 6) * Decimal::from(rows.len() as u64);
        let diff = allocated.sub(split.submittable[0].units).abs();
        prop_assert!(diff <= slack, "allocated {} vs submitted {}", allocated, split.submittable[0].units);
    }

    /// Holdings never go negative and pending orders are never over-fulfilled
    #[test]
    fn settlement_respects_ledger_rules(
        rows in proptest::collection::vec((holding_strategy(), units_strategy()), 1..12),
    ) {
        let rows: Vec<_> = rows.into_iter().map(|(h, p)| (h, p, dec!(1_000_000))).collect();
        let mut ledger = book(&rows);
        let before: Vec<(CustomerId, Units)> = ledger
            .iter()
            .map(|c| (c.id.clone(), pending_of(&ledger, &c.id)))
            .collect();
        let total_pending: Units = before.iter().map(|(_, u)| *u).sum();

        let report = engine().settle(&mut ledger).unwrap();

        prop_assert!(ledger.all_holdings_non_negative());
        prop_assert_eq!(
            report.submitted_units(&aapl()).add(report.remainder(&aapl())),
            total_pending
        );

        for (id, pending) in &before {
            for record in report.completions_for(id) {
                if let Some(applied) = record.completion.applied() {
                    prop_assert!(applied.units.abs() <= pending.abs());
                }
            }
            let after = pending_of(&ledger, id);
            prop_assert!(after.abs() <= pending.abs());
            prop_assert!(after.is_zero() || after.direction() == pending.direction());
        }
    }

    /// Buyers funded for their full order never end with negative cash
    #[test]
    fn funded_buyers_keep_non_negative_cash(
        pendings in proptest::collection::vec(buy_units_strategy(), 1..12),
    ) {
        let rows: Vec<_> = pendings.iter().map(|p| (dec!(0), *p, *p * PRICE)).collect();
        let mut ledger = book(&rows);

        engine().settle(&mut ledger).unwrap();

        for customer in ledger.iter() {
            prop_assert!(!customer.cash.is_negative(), "{} cash {}", customer.id, customer.cash);
        }
    }

    /// A book whose aggregate is already whole settles every customer completely
    #[test]
    fn whole_aggregate_settles_all(
        whole in proptest::collection::vec(1i64..40i64, 1..10),
    ) {
        let rows: Vec<_> = whole.iter().map(|w| (dec!(0), Decimal::from(*w), dec!(1_000_000))).collect();
        let mut ledger = book(&rows);

        let report = engine().settle(&mut ledger).unwrap();

        prop_assert!(report.remainder(&aapl()).is_zero());
        prop_assert!(ledger.all_settled());
        prop_assert!(report.is_clean());
    }
}
