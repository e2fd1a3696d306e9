use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{HistoryRequest, LedgerService, MAX_PAGE_LIMIT};
use crate::domain::{format_minor_units, CurrencyBalance, LedgerEntry, OwnerId};

/// Snapshot of one account for full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub owner: OwnerId,
    pub balances: Vec<CurrencyBalance>,
    pub entries: Vec<LedgerEntry>,
}

/// Exporter for converting an owner's ledger data to statement formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export an owner's full history to CSV format, newest entry first
    pub async fn export_statement_csv<W: Write>(&self, owner: OwnerId, writer: W) -> Result<usize> {
        let entries = self.collect_history(owner).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record([
            "id",
            "created_at",
            "currency",
            "amount",
            "counterparty_account",
            "counterparty_bank",
            "proof_url",
        ])?;

        let mut count = 0;
        for entry in &entries {
            csv_writer.write_record([
                entry.id.to_string(),
                entry.created_at.to_rfc3339(),
                entry.currency.to_string(),
                entry.amount.to_string(),
                entry.counterparty.account_number.clone(),
                entry.counterparty.bank_name.clone(),
                entry.proof_url.clone().unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export an owner's per-currency balances to CSV format
    pub async fn export_balances_csv<W: Write>(&self, owner: OwnerId, writer: W) -> Result<usize> {
        let balances = self.service.balances(owner).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(["currency", "balance_minor_units", "balance"])?;

        let mut count = 0;
        for entry in &balances {
            csv_writer.write_record([
                entry.currency.to_string(),
                entry.balance.to_string(),
                format_minor_units(entry.balance),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export an owner's account as a JSON snapshot
    pub async fn export_snapshot_json<W: Write>(
        &self,
        owner: OwnerId,
        mut writer: W,
    ) -> Result<AccountSnapshot> {
        let balances = self.service.balances(owner).await?;
        let entries = self.collect_history(owner).await?;

        let snapshot = AccountSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            owner,
            balances,
            entries,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }

    /// Drain the history pager page by page into one list.
    async fn collect_history(&self, owner: OwnerId) -> Result<Vec<LedgerEntry>> {
        let mut entries = Vec::new();
        let mut offset = 0u32;

        loop {
            let page = self
                .service
                .history(
                    owner,
                    HistoryRequest {
                        limit: Some(MAX_PAGE_LIMIT),
                        offset: Some(offset),
                    },
                )
                .await?;

            let fetched = page.entries.len() as u32;
            entries.extend(page.entries);

            if fetched < MAX_PAGE_LIMIT || entries.len() as u64 >= page.total {
                break;
            }
            offset += fetched;
        }

        Ok(entries)
    }
}
