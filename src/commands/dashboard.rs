use crate::api::Mode;
use crate::commands::{session, signed_in, Out};
use crate::dashboard::{Dashboard, LogAlert};
use crate::error::{ErrorType, IntoResult};
use crate::model::{DashboardData, HighlightData, TransactionType};
use crate::{Config, Result};
use anyhow::anyhow;
use std::fmt::Write;

/// Handles `gofinances dashboard`: restores the session, activates the dashboard for the signed-in
/// identity and renders the summary cards followed by the transaction list.
///
/// # Errors
/// - `NotSignedIn` if there is no persisted identity
/// - `StorageRead` if the transactions cannot be loaded, after the alert has been shown
pub async fn dashboard(config: &Config, mode: Mode) -> Result<Out<DashboardData>> {
    let (storage, mut session) = session(config, mode);
    let identity = signed_in(&mut session).await?;

    let mut dashboard = Dashboard::new(config.locale(), Box::new(LogAlert));
    if !dashboard.activate(storage.as_ref(), &identity).await {
        return Err(anyhow!("The dashboard could not be loaded")).pub_result(ErrorType::StorageRead);
    }

    let data = DashboardData {
        highlights: dashboard.highlights().cloned().unwrap_or_default(),
        transactions: dashboard.transactions().to_vec(),
    };
    Ok(Out::new(render(&identity.name, &data), data))
}

fn render(name: &str, data: &DashboardData) -> String {
    let HighlightData {
        entries,
        expensive,
        total,
    } = &data.highlights;

    let mut s = format!("Hello, {name}\n\n");
    for (title, card) in [("Entries", entries), ("Expenses", expensive), ("Total", total)] {
        let _ = writeln!(s, "{title:<10}{:>16}   {}", card.amount, card.last_transaction);
    }
    let _ = writeln!(s);
    for t in &data.transactions {
        let sign = match t.transaction_type {
            TransactionType::Positive => ' ',
            TransactionType::Negative => '-',
        };
        let _ = writeln!(
            s,
            "{}  {sign}{:>16}  {:<14}{}",
            t.date, t.amount, t.category, t.name
        );
    }
    s
}
