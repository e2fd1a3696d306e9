use serde::{Deserialize, Serialize};

use super::{Currency, LedgerEntry, MinorUnits, OwnerId};

/// The aggregate balance of one owner/currency pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub currency: Currency,
    pub balance: MinorUnits,
}

/// Compute the balance for one owner/currency pair from a list of entries.
/// Balance = sum of the signed amounts; an owner with no entries has 0.
///
/// The storage layer aggregates in SQL; this fold is the reference
/// semantics the aggregate must agree with.
pub fn balance_for(owner: OwnerId, currency: Currency, entries: &[LedgerEntry]) -> MinorUnits {
    entries
        .iter()
        .filter(|entry| entry.owner == owner && entry.currency == currency)
        .map(|entry| entry.amount)
        .sum()
}

/// Compute per-currency balances for an owner from a list of entries.
/// One row per currency with at least one entry, ordered balance-descending,
/// ties broken by currency code.
pub fn balances_by_currency(owner: OwnerId, entries: &[LedgerEntry]) -> Vec<CurrencyBalance> {
    let mut totals: Vec<CurrencyBalance> = Vec::new();

    for entry in entries.iter().filter(|entry| entry.owner == owner) {
        match totals.iter_mut().find(|t| t.currency == entry.currency) {
            Some(total) => total.balance += entry.amount,
            None => totals.push(CurrencyBalance {
                currency: entry.currency,
                balance: entry.amount,
            }),
        }
    }

    totals.sort_by(|a, b| {
        b.balance
            .cmp(&a.balance)
            .then_with(|| a.currency.as_str().cmp(b.currency.as_str()))
    });
    totals
}
