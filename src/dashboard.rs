//! Aggregates the stored transactions of an identity into the dashboard's summary cards and list.
//!
//! The dashboard recomputes everything from the full stored list each time it is activated. A
//! failed activation raises an alert and keeps whatever was shown before.

use crate::error::{ErrorType, IntoResult};
use crate::model::{
    DashboardData, DisplayTransaction, HighlightData, HighlightSummary, Identity, Locale,
    TransactionRecord, TransactionType,
};
use crate::store::{self, Storage};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, error};

/// Interrupts the user with a message.
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

/// An `Alert` that writes the message to the log at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlert;

impl Alert for LogAlert {
    fn alert(&self, message: &str) {
        error!("{message}");
    }
}

/// The dashboard screen's state.
pub struct Dashboard {
    locale: Locale,
    alert: Box<dyn Alert>,
    loading: bool,
    highlights: Option<HighlightData>,
    transactions: Vec<DisplayTransaction>,
}

impl Dashboard {
    pub fn new(locale: Locale, alert: Box<dyn Alert>) -> Self {
        Self {
            locale,
            alert,
            loading: true,
            highlights: None,
            transactions: Vec::new(),
        }
    }

    /// True until the first activation succeeds.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The summary cards from the last successful activation.
    pub fn highlights(&self) -> Option<&HighlightData> {
        self.highlights.as_ref()
    }

    /// The formatted transactions from the last successful activation.
    pub fn transactions(&self) -> &[DisplayTransaction] {
        &self.transactions
    }

    /// Reloads and recomputes everything for `identity`. Call this each time the dashboard
    /// becomes visible.
    ///
    /// On failure the error is logged, the user is alerted and the previous data is kept. Returns
    /// whether new data was committed.
    pub async fn activate(&mut self, storage: &dyn Storage, identity: &Identity) -> bool {
        match load(storage, &identity.id, self.locale).await {
            Ok(data) => {
                self.highlights = Some(data.highlights);
                self.transactions = data.transactions;
                self.loading = false;
                true
            }
            Err(e) => {
                error!("Unable to load the dashboard: {e}");
                self.alert.alert(self.locale.load_failed());
                false
            }
        }
    }
}

/// Reads the transactions stored for `identity_id` and summarizes them. A missing record is an
/// empty list.
///
/// # Errors
/// Returns a `StorageRead` error if the record cannot be read or parsed.
pub async fn load(
    storage: &dyn Storage,
    identity_id: &str,
    locale: Locale,
) -> Result<DashboardData> {
    let key = store::transactions_key(identity_id);
    let records: Vec<TransactionRecord> = store::get_json(storage, &key)
        .await
        .context("Unable to load the stored transactions")
        .pub_result(ErrorType::StorageRead)?
        .unwrap_or_default();
    debug!("Loaded {} transactions from {key}", records.len());
    Ok(summarize(&records, locale))
}

/// Computes the summary cards and the display list from `records`.
pub fn summarize(records: &[TransactionRecord], locale: Locale) -> DashboardData {
    let mut entries_total = Decimal::ZERO;
    let mut expensive_total = Decimal::ZERO;

    let transactions = records
        .iter()
        .map(|record| {
            match record.transaction_type {
                TransactionType::Positive => entries_total += record.amount.value(),
                TransactionType::Negative => expensive_total += record.amount.value(),
            }
            record.to_display(locale)
        })
        .collect();

    let last_entry = last_transaction_date(records, TransactionType::Positive)
        .map(|d| locale.format_day_and_month(d));
    let last_expense = last_transaction_date(records, TransactionType::Negative)
        .map(|d| locale.format_day_and_month(d));

    // The total card spans the month up to the last expense, even when there are only entries.
    let total_interval = match &last_expense {
        Some(d) => locale.interval(d),
        None => locale.no_transactions().to_string(),
    };

    let highlights = HighlightData {
        entries: HighlightSummary {
            amount: locale.format_currency(entries_total),
            last_transaction: match &last_entry {
                Some(d) => locale.last_entry(d),
                None => locale.no_transactions().to_string(),
            },
        },
        expensive: HighlightSummary {
            amount: locale.format_currency(expensive_total),
            last_transaction: match &last_expense {
                Some(d) => locale.last_expense(d),
                None => locale.no_transactions().to_string(),
            },
        },
        total: HighlightSummary {
            amount: locale.format_currency(entries_total - expensive_total),
            last_transaction: locale.last_expense(&total_interval),
        },
    };

    DashboardData {
        highlights,
        transactions,
    }
}

/// The most recent date among the records of `transaction_type`, or `None` if there are none.
pub fn last_transaction_date(
    records: &[TransactionRecord],
    transaction_type: TransactionType,
) -> Option<NaiveDate> {
    records
        .iter()
        .filter(|r| r.transaction_type == transaction_type)
        .map(|r| r.date.date())
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use crate::store::MemoryStorage;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    /// Remembers every alert it is asked to show.
    #[derive(Default, Clone)]
    struct RecordingAlert(Arc<Mutex<Vec<String>>>);

    impl RecordingAlert {
        fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Alert for RecordingAlert {
        fn alert(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    fn record(id: &str, amount: &str, t: TransactionType, date: &str) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            name: format!("transaction {id}"),
            amount: Amount::from_str(amount).unwrap(),
            transaction_type: t,
            category: "misc".to_string(),
            date: date.parse().unwrap(),
        }
    }

    fn identity() -> Identity {
        Identity::new("user-1", "Ana", "ana@example.com", None)
    }

    fn money(locale: Locale, s: &str) -> String {
        locale.format_currency(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_empty_sequence() {
        let data = summarize(&[], Locale::PtBr);
        let h = &data.highlights;
        assert_eq!(h.entries.amount, "R$\u{a0}0,00");
        assert_eq!(h.expensive.amount, "R$\u{a0}0,00");
        assert_eq!(h.total.amount, "R$\u{a0}0,00");
        assert_eq!(h.entries.last_transaction, "Não há transações");
        assert_eq!(h.expensive.last_transaction, "Não há transações");
        assert_eq!(h.total.last_transaction, "Última saída dia Não há transações");
        assert!(data.transactions.is_empty());
    }

    #[test]
    fn test_entries_and_expenses() {
        let records = vec![
            record("1", "100", TransactionType::Positive, "2024-01-05"),
            record("2", "40", TransactionType::Negative, "2024-01-10"),
        ];
        let l = Locale::PtBr;
        let data = summarize(&records, l);
        let h = &data.highlights;
        assert_eq!(h.entries.amount, money(l, "100"));
        assert_eq!(h.expensive.amount, money(l, "40"));
        assert_eq!(h.total.amount, money(l, "60"));
        assert_eq!(h.entries.last_transaction, "Última entrada dia 5 de janeiro");
        assert_eq!(h.expensive.last_transaction, "Última saída dia 10 de janeiro");
        assert_eq!(h.total.last_transaction, "Última saída dia 01 a 10 de janeiro");

        assert_eq!(data.transactions.len(), 2);
        assert_eq!(data.transactions[0].amount, "R$\u{a0}100,00");
        assert_eq!(data.transactions[0].date, "05/01/2024");
        assert_eq!(data.transactions[1].id, "2");
    }

    #[test]
    fn test_only_entries() {
        let records = vec![
            record("1", "10", TransactionType::Positive, "2024-03-02"),
            record("2", "15.5", TransactionType::Positive, "2024-03-20T09:00:00.000Z"),
            record("3", "1", TransactionType::Positive, "2024-03-11"),
        ];
        let data = summarize(&records, Locale::EnUs);
        let h = &data.highlights;
        assert_eq!(h.entries.amount, "$26.50");
        assert_eq!(h.entries.last_transaction, "Last entry on March 20");
        assert_eq!(h.expensive.last_transaction, "No transactions");
        assert_eq!(h.total.amount, "$26.50");
        // The total card follows the expenses, which there are none of.
        assert_eq!(h.total.last_transaction, "Last expense on No transactions");
    }

    #[test]
    fn test_only_expenses() {
        let records = vec![record("1", "25", TransactionType::Negative, "2024-07-04")];
        let data = summarize(&records, Locale::EnUs);
        let h = &data.highlights;
        assert_eq!(h.entries.last_transaction, "No transactions");
        assert_eq!(h.total.amount, "-$25.00");
        assert_eq!(h.total.last_transaction, "Last expense on 01 to July 4");
    }

    #[test]
    fn test_last_transaction_date() {
        let records = vec![
            record("1", "1", TransactionType::Negative, "2023-12-31"),
            record("2", "1", TransactionType::Negative, "2024-02-29"),
            record("3", "1", TransactionType::Positive, "2025-01-01"),
        ];
        assert_eq!(
            last_transaction_date(&records, TransactionType::Negative),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(last_transaction_date(&[], TransactionType::Positive), None);
    }

    #[tokio::test]
    async fn test_load_missing_record_is_empty() {
        let storage = MemoryStorage::new();
        let data = load(&storage, "nobody", Locale::PtBr).await.unwrap();
        assert_eq!(data, summarize(&[], Locale::PtBr));
    }

    #[tokio::test]
    async fn test_load_reads_mobile_client_records() {
        let stored = r#"[
            {"id":"a","name":"Salário","amount":"5000","type":"positive","category":"salary","date":"2021-06-05T18:22:31.123Z"},
            {"id":"b","name":"Aluguel","amount":1200.5,"type":"negative","category":"house","date":"2021-06-08T10:00:00.000Z"}
        ]"#;
        let storage = MemoryStorage::with_items([(store::transactions_key("u"), stored)]);
        let data = load(&storage, "u", Locale::PtBr).await.unwrap();
        assert_eq!(data.highlights.entries.amount, "R$\u{a0}5.000,00");
        assert_eq!(data.highlights.expensive.amount, "R$\u{a0}1.200,50");
        assert_eq!(data.highlights.total.amount, "R$\u{a0}3.799,50");
        assert_eq!(data.transactions[1].name, "Aluguel");
    }

    #[tokio::test]
    async fn test_load_bad_record_is_storage_read_error() {
        let storage = MemoryStorage::with_items([(store::transactions_key("u"), "[{\"id\":1}]")]);
        let err = load(&storage, "u", Locale::PtBr).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageRead);
    }

    #[tokio::test]
    async fn test_load_unknown_type_is_storage_read_error() {
        let stored = r#"[
            {"id":"a","name":"Salary","amount":"100","type":"positive","category":"salary","date":"2024-01-05"},
            {"id":"b","name":"Gift","amount":"40","type":"neutral","category":"other","date":"2024-01-06"}
        ]"#;
        let storage = MemoryStorage::with_items([(store::transactions_key("u"), stored)]);
        let err = load(&storage, "u", Locale::PtBr).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageRead);
    }

    #[tokio::test]
    async fn test_activate_commits_and_is_idempotent() {
        let records = vec![
            record("1", "100", TransactionType::Positive, "2024-01-05"),
            record("2", "40", TransactionType::Negative, "2024-01-10"),
        ];
        let storage = MemoryStorage::new();
        store::set_json(&storage, &store::transactions_key("user-1"), &records)
            .await
            .unwrap();

        let alert = RecordingAlert::default();
        let mut dashboard = Dashboard::new(Locale::PtBr, Box::new(alert.clone()));
        assert!(dashboard.is_loading());

        assert!(dashboard.activate(&storage, &identity()).await);
        assert!(!dashboard.is_loading());
        let first = (
            dashboard.highlights().cloned(),
            dashboard.transactions().to_vec(),
        );

        assert!(dashboard.activate(&storage, &identity()).await);
        let second = (
            dashboard.highlights().cloned(),
            dashboard.transactions().to_vec(),
        );
        assert_eq!(first, second);
        assert!(alert.messages().is_empty());
    }

    #[tokio::test]
    async fn test_activate_sees_new_data() {
        let storage = MemoryStorage::new();
        let key = store::transactions_key("user-1");
        let mut dashboard = Dashboard::new(Locale::EnUs, Box::new(LogAlert));

        assert!(dashboard.activate(&storage, &identity()).await);
        assert!(dashboard.transactions().is_empty());

        let records = vec![record("1", "9", TransactionType::Positive, "2024-05-01")];
        store::set_json(&storage, &key, &records).await.unwrap();
        assert!(dashboard.activate(&storage, &identity()).await);
        assert_eq!(dashboard.transactions().len(), 1);
        assert_eq!(dashboard.highlights().unwrap().entries.amount, "$9.00");
    }

    #[tokio::test]
    async fn test_activate_failure_alerts_and_keeps_previous_data() {
        let storage = MemoryStorage::new();
        let key = store::transactions_key("user-1");
        let records = vec![record("1", "9", TransactionType::Negative, "2024-05-01")];
        store::set_json(&storage, &key, &records).await.unwrap();

        let alert = RecordingAlert::default();
        let mut dashboard = Dashboard::new(Locale::PtBr, Box::new(alert.clone()));
        assert!(dashboard.activate(&storage, &identity()).await);
        let before = dashboard.highlights().cloned();

        storage.set_item(&key, "{ broken").await.unwrap();
        assert!(!dashboard.activate(&storage, &identity()).await);
        assert_eq!(dashboard.highlights().cloned(), before);
        assert_eq!(dashboard.transactions().len(), 1);
        assert_eq!(alert.messages(), vec!["Não foi possível carregar os dados"]);
    }

    #[tokio::test]
    async fn test_first_activation_failure_stays_loading() {
        let storage = MemoryStorage::with_items([(store::transactions_key("user-1"), "nope")]);
        let alert = RecordingAlert::default();
        let mut dashboard = Dashboard::new(Locale::EnUs, Box::new(alert.clone()));
        assert!(!dashboard.activate(&storage, &identity()).await);
        assert!(dashboard.is_loading());
        assert!(dashboard.highlights().is_none());
        assert_eq!(alert.messages(), vec!["Unable to load the data"]);
    }
}
