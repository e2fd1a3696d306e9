// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use saldo::application::{DepositRequest, LedgerService, WithdrawalRequest};
use saldo::domain::OwnerId;
use tempfile::TempDir;
use uuid::Uuid;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// A fresh account identity
pub fn owner() -> OwnerId {
    Uuid::new_v4()
}

/// A valid deposit request for the given currency and amount
pub fn deposit(currency: &str, amount: i64) -> DepositRequest {
    DepositRequest {
        currency: currency.to_string(),
        amount,
        counterparty_account: "123456789".to_string(),
        counterparty_bank: "First Example Bank".to_string(),
        proof_url: "https://files.example.com/proof.jpg".to_string(),
    }
}

/// A valid withdrawal request for the given currency and amount
pub fn withdrawal(currency: &str, amount: i64) -> WithdrawalRequest {
    WithdrawalRequest {
        currency: currency.to_string(),
        amount,
        counterparty_account: "987654321".to_string(),
        counterparty_bank: "Second Example Bank".to_string(),
    }
}

/// Fund an owner's balance with a valid deposit
pub async fn fund(service: &LedgerService, who: OwnerId, currency: &str, amount: i64) -> Result<()> {
    service.deposit(who, deposit(currency, amount)).await?;
    Ok(())
}
