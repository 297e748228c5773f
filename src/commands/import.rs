//! Handler for `gofinances import`, which appends transactions from a JSON or CSV file to the
//! signed-in identity's stored list.

use crate::api::Mode;
use crate::commands::{session, signed_in, Out};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Amount, TransactionDate, TransactionRecord, TransactionType};
use crate::store;
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// What an import did.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct ImportSummary {
    /// The number of transactions read from the file.
    pub imported: usize,
    /// The number of transactions stored for the identity after the import.
    pub total: usize,
    /// How many of the imported transactions were given a new id.
    pub generated_ids: usize,
}

/// A row of an import file. Same fields as a stored transaction, except that the id is optional.
#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(default)]
    id: Option<String>,
    name: String,
    amount: Amount,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    category: String,
    date: TransactionDate,
}

/// Handles `gofinances import`. Files ending in `.csv` are read as CSV with a header row, anything
/// else as a JSON array.
///
/// # Errors
/// - `NotSignedIn` if there is no persisted identity
/// - `Config` if the file cannot be read or parsed
/// - `StorageRead` or `StorageWrite` if the stored list cannot be read or written
pub async fn import(config: &Config, mode: Mode, path: &Path) -> Result<Out<ImportSummary>> {
    let (storage, mut session) = session(config, mode);
    let identity = signed_in(&mut session).await?;

    let rows = read_rows(path)
        .await
        .with_context(|| format!("Unable to import {}", path.display()))
        .pub_result(ErrorType::Config)?;

    let key = store::transactions_key(&identity.id);
    let mut records: Vec<TransactionRecord> = store::get_json(storage.as_ref(), &key)
        .await
        .pub_result(ErrorType::StorageRead)?
        .unwrap_or_default();

    let imported = rows.len();
    let mut generated_ids = 0;
    for row in rows {
        let id = match row.id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                generated_ids += 1;
                uuid::Uuid::new_v4().to_string()
            }
        };
        records.push(TransactionRecord {
            id,
            name: row.name,
            amount: row.amount,
            transaction_type: row.transaction_type,
            category: row.category,
            date: row.date,
        });
    }

    store::set_json(storage.as_ref(), &key, &records)
        .await
        .pub_result(ErrorType::StorageWrite)?;

    let summary = ImportSummary {
        imported,
        total: records.len(),
        generated_ids,
    };
    Ok(Out::new(
        format!(
            "Imported {imported} transactions for {}, {} are now stored",
            identity.email, summary.total
        ),
        summary,
    ))
}

async fn read_rows(path: &Path) -> Res<Vec<ImportRow>> {
    if !utils::exists(path).await? {
        bail!("The file does not exist");
    }
    let data = utils::read(path).await?;
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        parse_csv(&data)
    } else {
        serde_json::from_str(&data).context("Unable to parse the file as a JSON array")
    }
}

fn parse_csv(data: &str) -> Res<Vec<ImportRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());
    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let row: ImportRow = result.with_context(|| format!("Unable to parse CSV row {}", i + 1))?;
        rows.push(row);
    }
    debug!("Parsed {} CSV rows", rows.len());
    Ok(rows)
}
