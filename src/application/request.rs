use serde::Deserialize;

use crate::domain::{Currency, MinorUnits};

use super::LedgerError;

/// Bank account and bank name fields must be 5-30 characters.
const COUNTERPARTY_MIN_LEN: usize = 5;
const COUNTERPARTY_MAX_LEN: usize = 30;

/// Default page size when the caller leaves the limit unset or zero.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
/// Upper bound on page size, to keep response sizes bounded.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A request to fund an account: records a credit entry with a reference to
/// the uploaded proof-of-transfer image.
#[derive(Debug, Clone, Deserialize)]
pub struct DepositRequest {
    pub currency: String,
    /// Amount in minor units, must be positive.
    pub amount: MinorUnits,
    /// Bank account the funds came from.
    pub counterparty_account: String,
    /// Bank the funds came from.
    pub counterparty_bank: String,
    /// URL of the uploaded proof-of-transfer image.
    pub proof_url: String,
}

impl DepositRequest {
    /// Validate all fields, returning the parsed currency code.
    pub fn validate(&self) -> Result<Currency, LedgerError> {
        let currency = parse_currency(&self.currency)?;
        validate_amount(self.amount)?;
        validate_counterparty_field("account number", &self.counterparty_account)?;
        validate_counterparty_field("bank name", &self.counterparty_bank)?;
        validate_proof_url(&self.proof_url)?;
        Ok(currency)
    }
}

/// A request to send funds out of an account to a counterparty: records a
/// debit entry, subject to the sufficient-balance check.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRequest {
    pub currency: String,
    /// Amount in minor units, must be positive.
    pub amount: MinorUnits,
    /// Bank account receiving the funds.
    pub counterparty_account: String,
    /// Bank receiving the funds.
    pub counterparty_bank: String,
}

impl WithdrawalRequest {
    /// Validate all fields, returning the parsed currency code.
    pub fn validate(&self) -> Result<Currency, LedgerError> {
        let currency = parse_currency(&self.currency)?;
        validate_amount(self.amount)?;
        validate_counterparty_field("account number", &self.counterparty_account)?;
        validate_counterparty_field("bank name", &self.counterparty_bank)?;
        Ok(currency)
    }
}

/// Pagination parameters for a history query. Ordering is fixed to
/// most-recent-first; no further sort keys or filter predicates are
/// supported.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HistoryRequest {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl HistoryRequest {
    /// Effective (limit, offset) after defaults and the page-size cap.
    pub fn effective(&self) -> (u32, u32) {
        let limit = match self.limit {
            None | Some(0) => DEFAULT_PAGE_LIMIT,
            Some(limit) => limit.min(MAX_PAGE_LIMIT),
        };
        (limit, self.offset.unwrap_or(0))
    }
}

fn parse_currency(code: &str) -> Result<Currency, LedgerError> {
    Currency::parse(code).map_err(|err| LedgerError::UnknownCurrency(err.code))
}

fn validate_amount(amount: MinorUnits) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

fn validate_counterparty_field(field: &'static str, value: &str) -> Result<(), LedgerError> {
    let len = value.chars().count();
    if !(COUNTERPARTY_MIN_LEN..=COUNTERPARTY_MAX_LEN).contains(&len) {
        return Err(LedgerError::InvalidCounterparty {
            field,
            reason: format!(
                "must be {}-{} characters, got {}",
                COUNTERPARTY_MIN_LEN, COUNTERPARTY_MAX_LEN, len
            ),
        });
    }
    Ok(())
}

/// A proof reference must be an absolute http(s) URL with a host.
fn validate_proof_url(url: &str) -> Result<(), LedgerError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| LedgerError::InvalidProofUrl(url.to_string()))?;

    let host = rest.split('/').next().unwrap_or("");
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(LedgerError::InvalidProofUrl(url.to_string()));
    }
    Ok(())
}
