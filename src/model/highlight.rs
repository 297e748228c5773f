use crate::model::DisplayTransaction;
use serde::Serialize;

/// One of the summary cards on the dashboard.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSummary {
    /// The total, formatted as currency.
    pub amount: String,
    /// When the last relevant transaction happened, or the no-transactions label.
    pub last_transaction: String,
}

/// The three summary cards: money in, money out and the balance.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct HighlightData {
    pub entries: HighlightSummary,
    pub expensive: HighlightSummary,
    pub total: HighlightSummary,
}

/// Everything the dashboard shows, computed from the stored transactions in one pass.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct DashboardData {
    pub highlights: HighlightData,
    pub transactions: Vec<DisplayTransaction>,
}
