use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::{Counterparty, Currency, CurrencyBalance, LedgerEntry, MinorUnits, OwnerId};

use super::MIGRATION_001_INITIAL;

/// Outcome of a guarded debit append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// The balance covered the debit and the entry is durable.
    Committed,
    /// The balance could not cover the debit; nothing was written.
    InsufficientFunds { available: MinorUnits },
}

/// Repository for persisting and querying ledger entries.
///
/// Entries are append-only: this repository exposes no update or delete.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Appends
    // ========================

    /// Persist one ledger entry. Used for credits, which cannot drive a
    /// balance negative and need no guard.
    pub async fn append(&self, entry: &LedgerEntry) -> Result<()> {
        Self::insert_entry(&self.pool, entry).await
    }

    /// Persist a debit entry, re-checking the owner's balance inside the
    /// same write transaction.
    ///
    /// `BEGIN IMMEDIATE` takes SQLite's write lock up front, so the balance
    /// read and the insert commit as one unit. A concurrent debit on the
    /// same owner/currency pair waits for the lock and then observes the
    /// reduced balance: committed debits can never drive the sum negative.
    pub async fn append_debit(&self, entry: &LedgerEntry) -> Result<DebitOutcome> {
        assert!(entry.amount < 0, "append_debit requires a debit entry");

        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection for debit")?;

        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .context("Failed to begin debit transaction")?;

        match Self::guarded_debit(&mut conn, entry).await {
            Ok(DebitOutcome::Committed) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .context("Failed to commit debit transaction")?;
                Ok(DebitOutcome::Committed)
            }
            Ok(outcome) => {
                sqlx::query("ROLLBACK")
                    .execute(&mut *conn)
                    .await
                    .context("Failed to roll back rejected debit")?;
                Ok(outcome)
            }
            Err(err) => {
                // Leave the connection clean for the pool; the original
                // error is the one worth reporting.
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(err)
            }
        }
    }

    async fn guarded_debit(
        conn: &mut SqliteConnection,
        entry: &LedgerEntry,
    ) -> Result<DebitOutcome> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) AS balance
            FROM ledger_entries
            WHERE owner_id = ? AND currency = ?
            "#,
        )
        .bind(entry.owner.to_string())
        .bind(entry.currency.as_str())
        .fetch_one(&mut *conn)
        .await
        .context("Failed to read balance for debit")?;

        let available: MinorUnits = row.get("balance");
        if available < -entry.amount {
            return Ok(DebitOutcome::InsufficientFunds { available });
        }

        Self::insert_entry(&mut *conn, entry).await?;
        Ok(DebitOutcome::Committed)
    }

    async fn insert_entry<'e>(
        executor: impl sqlx::Executor<'e, Database = sqlx::Sqlite>,
        entry: &LedgerEntry,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, owner_id, currency, amount, counterparty_account, counterparty_bank, proof_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.owner.to_string())
        .bind(entry.currency.as_str())
        .bind(entry.amount)
        .bind(&entry.counterparty.account_number)
        .bind(&entry.counterparty.bank_name)
        .bind(&entry.proof_url)
        .bind(entry.created_at.to_rfc3339())
        .execute(executor)
        .await
        .context("Failed to append ledger entry")?;
        Ok(())
    }

    // ========================
    // Aggregates
    // ========================

    /// Per-currency sums for an owner, one row per currency with at least
    /// one entry, ordered balance-descending with ties broken by code.
    /// A currency filter restricts the aggregate to that currency.
    pub async fn balances_by_currency(
        &self,
        owner: OwnerId,
        currency: Option<&Currency>,
    ) -> Result<Vec<CurrencyBalance>> {
        let rows = match currency {
            Some(code) => {
                sqlx::query(
                    r#"
                    SELECT currency, SUM(amount) AS balance
                    FROM ledger_entries
                    WHERE owner_id = ? AND currency = ?
                    GROUP BY currency
                    ORDER BY balance DESC, currency ASC
                    "#,
                )
                .bind(owner.to_string())
                .bind(code.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT currency, SUM(amount) AS balance
                    FROM ledger_entries
                    WHERE owner_id = ?
                    GROUP BY currency
                    ORDER BY balance DESC, currency ASC
                    "#,
                )
                .bind(owner.to_string())
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to aggregate balances by currency")?;

        rows.iter()
            .map(|row| {
                let code: String = row.get("currency");
                let currency = Currency::parse(&code)
                    .map_err(|_| anyhow::anyhow!("Invalid currency code in store: {}", code))?;
                Ok(CurrencyBalance {
                    currency,
                    balance: row.get("balance"),
                })
            })
            .collect()
    }

    // ========================
    // History
    // ========================

    /// One page of an owner's entries, newest first, plus the total count
    /// of the owner's entries computed over the identical predicate.
    pub async fn query_history(
        &self,
        owner: OwnerId,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<LedgerEntry>, u64)> {
        let owner_str = owner.to_string();

        let count_row = sqlx::query("SELECT COUNT(*) AS total FROM ledger_entries WHERE owner_id = ?")
            .bind(&owner_str)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count history entries")?;
        let total: i64 = count_row.get("total");

        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, currency, amount, counterparty_account, counterparty_bank, proof_url, created_at
            FROM ledger_entries
            WHERE owner_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&owner_str)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .context("Failed to query history page")?;

        let entries = rows
            .iter()
            .map(Self::row_to_entry)
            .collect::<Result<Vec<_>>>()?;

        Ok((entries, total as u64))
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry> {
        let id_str: String = row.get("id");
        let owner_str: String = row.get("owner_id");
        let currency_str: String = row.get("currency");
        let created_at_str: String = row.get("created_at");

        Ok(LedgerEntry {
            id: Uuid::parse_str(&id_str).context("Invalid entry ID")?,
            owner: Uuid::parse_str(&owner_str).context("Invalid owner ID")?,
            currency: Currency::parse(&currency_str)
                .map_err(|_| anyhow::anyhow!("Invalid currency code in store: {}", currency_str))?,
            amount: row.get("amount"),
            counterparty: Counterparty {
                account_number: row.get("counterparty_account"),
                bank_name: row.get("counterparty_bank"),
            },
            proof_url: row.get("proof_url"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
