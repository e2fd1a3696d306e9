use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Currency, MinorUnits};

pub type EntryId = Uuid;
pub type OwnerId = Uuid;

/// Bank details of the other side of a movement: the sender on a credit,
/// the recipient on a debit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub account_number: String,
    pub bank_name: String,
}

/// One immutable record of a balance change. Entries are append-only:
/// corrections are made by recording further entries, never by mutation.
/// The current balance of an owner/currency pair is always the sum of its
/// entries' amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique transaction identifier, generated before persistence. The
    /// entry does not exist until the store accepts it.
    pub id: EntryId,
    /// The account this entry belongs to.
    pub owner: OwnerId,
    pub currency: Currency,
    /// Signed amount in minor units: positive = credit, negative = debit.
    pub amount: MinorUnits,
    pub counterparty: Counterparty,
    /// Reference to an uploaded proof-of-transfer image.
    /// Present on credits, absent on debits.
    pub proof_url: Option<String>,
    /// Server-assigned creation time; history is ordered by this field.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create a credit entry (funds added to the owner's balance).
    pub fn credit(
        owner: OwnerId,
        currency: Currency,
        amount: MinorUnits,
        counterparty: Counterparty,
        proof_url: impl Into<String>,
    ) -> Self {
        assert!(amount > 0, "Credit amount must be positive");
        Self {
            id: Uuid::new_v4(),
            owner,
            currency,
            amount,
            counterparty,
            proof_url: Some(proof_url.into()),
            created_at: Utc::now(),
        }
    }

    /// Create a debit entry (funds removed from the owner's balance).
    /// The stored amount is the negation of `amount`.
    pub fn debit(
        owner: OwnerId,
        currency: Currency,
        amount: MinorUnits,
        counterparty: Counterparty,
    ) -> Self {
        assert!(amount > 0, "Debit amount must be positive");
        Self {
            id: Uuid::new_v4(),
            owner,
            currency,
            amount: -amount,
            counterparty,
            proof_url: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_credit(&self) -> bool {
        self.amount > 0
    }

    pub fn is_debit(&self) -> bool {
        self.amount < 0
    }
}
