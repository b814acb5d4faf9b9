//! Fractional settlement simulation.
//!
//! Runs scripted settlement rounds against the paper broker: an even
//! fraction split, a net buy/sell instrument, and a book loaded from CSV.
//! Set `RUST_LOG=info` (or `debug`) to see the engine's own log lines.

use fractional_settlement::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::error::Error;

const BOOK_CSV: &str = "\
alice,AAPL,20,10.5
alice,TSLA,8,-2.75
bob,AAPL,0,5.3
bob,MSFT,3,1.4
carol,TSLA,12,-4.5
carol,MSFT,0,2.35
";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("Fractional Settlement Simulation");
    println!("Whole-unit broker, equitable fraction allocation\n");

    scenario_1_fraction_split()?;
    scenario_2_net_buy_and_sell()?;
    scenario_3_loaded_book()?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn prices() -> PriceTable {
    PriceTable::new()
        .with_price("AAPL", dec!(100))
        .with_price("MSFT", dec!(410))
        .with_price("TSLA", dec!(250))
}

fn customer(name: &str, cash: Decimal, positions: &[(&str, Decimal, Decimal)]) -> Result<Customer, Box<dyn Error>> {
    let table = prices();
    let mut c = Customer::new(CustomerId::new(name)).with_cash(Quote::new(cash));
    for (id, holding, pending) in positions {
        let identifier = InstrumentId::new(*id);
        let price = table.price(&identifier)?;
        c.add_holding(Order::new(identifier.clone(), Units::new(*holding), price))?;
        c.add_pending_transaction(Order::new(identifier, Units::new(*pending), price))?;
    }
    Ok(c)
}

fn print_ledger(ledger: &CustomerLedger) {
    for c in ledger.iter() {
        let holdings: Vec<String> = c.holdings().iter().map(|h| format!("{} {}", h.identifier, h.units)).collect();
        let pending: Vec<String> = c
            .pending_transactions()
            .iter()
            .map(|p| format!("{} {}", p.identifier, p.units))
            .collect();
        println!(
            "    {:<6} cash ${:<12} holdings [{}] pending [{}]",
            c.name(),
            c.cash,
            holdings.join(", "),
            pending.join(", ")
        );
    }
}

fn print_report(report: &SettlementReport) {
    println!("  Combined:  {}", format_orders(&report.combined));
    println!("  To broker: {}", format_orders(&report.submitted));
    println!("  Receipts:  {}", format_receipts(&report.receipts));
    for (customer, orders) in &report.allocations {
        for order in orders.values() {
            println!("    {} purchasable {} {}", customer, order.identifier, order.units);
        }
    }
    for anomaly in &report.anomalies {
        println!("    anomaly: {:?}", anomaly);
    }
}

/// Two buyers share one stripped fraction.
fn scenario_1_fraction_split() -> Result<(), Box<dyn Error>> {
    println!("Scenario 1: Fraction Split\n");

    let mut ledger: CustomerLedger = vec![
        customer("alice", dec!(5000), &[("AAPL", dec!(0), dec!(10.5))])?,
        customer("bob", dec!(5000), &[("AAPL", dec!(0), dec!(5.3))])?,
    ]
    .into_iter()
    .collect();

    let broker = PaperBroker::new(PaperBrokerConfig::fee_free(), prices());
    let mut engine = SettlementEngine::new(SettlementConfig::default(), broker);
    let report = engine.settle(&mut ledger)?;

    print_report(&report);
    println!("  After settlement:");
    print_ledger(&ledger);
    println!();
    Ok(())
}

/// Buyers and sellers on the same instrument net before submission.
fn scenario_2_net_buy_and_sell() -> Result<(), Box<dyn Error>> {
    println!("Scenario 2: Net Buy and Sell\n");

    let mut ledger: CustomerLedger = vec![
        customer("alice", dec!(2000), &[("TSLA", dec!(0), dec!(6.4))])?,
        customer("bob", dec!(0), &[("TSLA", dec!(10), dec!(-2.2))])?,
        customer("carol", dec!(0), &[("TSLA", dec!(5), dec!(-1.6))])?,
    ]
    .into_iter()
    .collect();

    let broker = PaperBroker::new(PaperBrokerConfig::default(), prices());
    let mut engine = SettlementEngine::new(SettlementConfig::default(), broker);
    let report = engine.settle(&mut ledger)?;

    print_report(&report);
    println!("  Broker fees: ${}", engine.broker().fees_charged());
    println!("  After settlement:");
    print_ledger(&ledger);
    println!();
    Ok(())
}

/// Positions loaded from CSV, settled twice.
fn scenario_3_loaded_book() -> Result<(), Box<dyn Error>> {
    println!("Scenario 3: Loaded Book\n");

    let table = prices();
    let mut ledger = load_customers(BOOK_CSV.as_bytes(), &table)?;
    println!("  Loaded {} customers, AUM ${}", ledger.len(), ledger.total_aum());
    print_ledger(&ledger);

    let broker = PaperBroker::new(PaperBrokerConfig::default(), &table);
    let mut engine = SettlementEngine::new(SettlementConfig::tradable_only(), broker);

    for round in 1..=2 {
        println!("\n  Round {}", round);
        let report = engine.settle(&mut ledger)?;
        print_report(&report);
        print_ledger(&ledger);
    }

    println!("\n  Total cash: ${}", ledger.total_cash());
    println!("  Total holdings: ${}", ledger.total_holdings_value());
    println!("  All settled: {}", ledger.all_settled());
    println!("  No negative holdings: {}", ledger.all_holdings_non_negative());
    Ok(())
}
