use crate::domain::{
    Counterparty, Currency, CurrencyBalance, LedgerEntry, MinorUnits, OwnerId,
};
use crate::storage::{DebitOutcome, Repository};

use super::{DepositRequest, HistoryRequest, LedgerError, WithdrawalRequest};

/// Application service providing the ledger operations: deposits,
/// withdrawals, balance reads, and paginated history. This is the primary
/// interface for any client (HTTP layer, exporter, tests).
pub struct LedgerService {
    repo: Repository,
}

/// One page of an owner's history, most recent first, together with the
/// total entry count independent of pagination.
#[derive(Debug)]
pub struct HistoryPage {
    pub entries: Vec<LedgerEntry>,
    /// Count of all of the owner's entries, ignoring limit/offset.
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, LedgerError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, LedgerError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Transactions
    // ========================

    /// Fund an account: validate the request, then append a credit entry.
    /// Returns the persisted entry; on any failure nothing is persisted.
    pub async fn deposit(
        &self,
        owner: OwnerId,
        req: DepositRequest,
    ) -> Result<LedgerEntry, LedgerError> {
        let currency = req.validate()?;

        let entry = LedgerEntry::credit(
            owner,
            currency,
            req.amount,
            Counterparty {
                account_number: req.counterparty_account,
                bank_name: req.counterparty_bank,
            },
            req.proof_url,
        );

        self.repo.append(&entry).await?;
        tracing::info!(
            "credit {} committed: owner {} +{} {}",
            entry.id,
            owner,
            req.amount,
            currency
        );

        Ok(entry)
    }

    /// Send funds to a counterparty: validate the request, then append a
    /// debit entry, re-checking the owner's balance inside the same storage
    /// transaction as the append. A debit the balance cannot cover fails
    /// with [`LedgerError::InsufficientBalance`] and persists nothing.
    pub async fn withdraw(
        &self,
        owner: OwnerId,
        req: WithdrawalRequest,
    ) -> Result<LedgerEntry, LedgerError> {
        let currency = req.validate()?;

        let entry = LedgerEntry::debit(
            owner,
            currency,
            req.amount,
            Counterparty {
                account_number: req.counterparty_account,
                bank_name: req.counterparty_bank,
            },
        );

        match self.repo.append_debit(&entry).await? {
            DebitOutcome::Committed => {
                tracing::info!(
                    "debit {} committed: owner {} -{} {}",
                    entry.id,
                    owner,
                    req.amount,
                    currency
                );
                Ok(entry)
            }
            DebitOutcome::InsufficientFunds { available } => {
                tracing::warn!(
                    "debit rejected: owner {} has {} {} available, requested {}",
                    owner,
                    available,
                    currency,
                    req.amount
                );
                Err(LedgerError::InsufficientBalance {
                    currency,
                    available,
                    requested: req.amount,
                })
            }
        }
    }

    // ========================
    // Balances
    // ========================

    /// Current balance for one owner/currency pair. An owner with no entries
    /// in that currency has a balance of 0, not an error.
    ///
    /// Always recomputed from the store; the result is a point-in-time
    /// snapshot, not a lease.
    pub async fn balance(&self, owner: OwnerId, code: &str) -> Result<MinorUnits, LedgerError> {
        let currency =
            Currency::parse(code).map_err(|err| LedgerError::UnknownCurrency(err.code))?;
        let rows = self.repo.balances_by_currency(owner, Some(&currency)).await?;
        Ok(rows.first().map(|row| row.balance).unwrap_or(0))
    }

    /// Current balances for all of the owner's currencies with at least one
    /// entry, ordered balance-descending, ties broken by currency code.
    pub async fn balances(&self, owner: OwnerId) -> Result<Vec<CurrencyBalance>, LedgerError> {
        Ok(self.repo.balances_by_currency(owner, None).await?)
    }

    // ========================
    // History
    // ========================

    /// One page of the owner's history, most recent first, plus the total
    /// count over the same set of entries.
    pub async fn history(
        &self,
        owner: OwnerId,
        req: HistoryRequest,
    ) -> Result<HistoryPage, LedgerError> {
        let (limit, offset) = req.effective();
        let (entries, total) = self.repo.query_history(owner, limit, offset).await?;

        Ok(HistoryPage {
            entries,
            total,
            limit,
            offset,
        })
    }
}
