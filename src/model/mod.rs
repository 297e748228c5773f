//! Types that represent the core data model, such as `Identity` and `TransactionRecord`.
mod amount;
mod highlight;
mod identity;
mod locale;
mod transaction;

pub use amount::{Amount, AmountError};
pub use highlight::{DashboardData, HighlightData, HighlightSummary};
pub use identity::{Identity, SessionState};
pub use locale::Locale;
pub use transaction::{DisplayTransaction, TransactionDate, TransactionRecord, TransactionType};
