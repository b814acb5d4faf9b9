// 2.0 ledger.rs: the customer store a settlement run borrows. keyed by customer
// name in a BTreeMap so every scan over customers is deterministic.

use crate::customer::Customer;
use crate::types::{CustomerId, InstrumentId, Quote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerLedger {
    customers: BTreeMap<CustomerId, Customer>,
}

impl CustomerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces and returns any customer already stored under the same name.
    pub fn insert(&mut self, customer: Customer) -> Option<Customer> {
        self.customers.insert(customer.id.clone(), customer)
    }

    pub fn get(&self, id: &CustomerId) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn get_mut(&mut self, id: &CustomerId) -> Option<&mut Customer> {
        self.customers.get_mut(id)
    }

    pub fn get_or_create(&mut self, id: CustomerId) -> &mut Customer {
        self.customers
            .entry(id)
            .or_insert_with_key(|id| Customer::new(id.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Customer> {
        self.customers.values_mut()
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    // 2.1: "who ordered" an instrument. eager scan, customer counts are small.
    pub fn customers_with_pending(&self, identifier: &InstrumentId) -> Vec<&Customer> {
        self.iter().filter(|c| c.has_pending(identifier)).collect()
    }

    pub fn all_settled(&self) -> bool {
        self.iter().all(Customer::is_settled)
    }

    pub fn all_holdings_non_negative(&self) -> bool {
        self.iter()
            .flat_map(|c| c.holdings())
            .all(|h| !h.units.is_sell())
    }

    pub fn total_cash(&self) -> Quote {
        self.iter().map(|c| c.cash).sum()
    }

    pub fn total_holdings_value(&self) -> Quote {
        self.iter().map(Customer::holdings_value).sum()
    }

    pub fn total_aum(&self) -> Quote {
        self.iter().map(Customer::total_aum).sum()
    }
}

impl FromIterator<Customer> for CustomerLedger {
    fn from_iter<I: IntoIterator<Item = Customer>>(iter: I) -> Self {
        let mut ledger = Self::new();
        for customer in iter {
            ledger.insert(customer);
        }
        ledger
    }
}
