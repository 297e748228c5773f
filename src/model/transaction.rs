use crate::model::{Amount, Locale};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// An entry, money coming in.
    Positive,
    /// An expense, money going out.
    Negative,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A transaction date as it was stored, along with the calendar date it represents.
///
/// Stored dates are ISO-8601 strings: plain dates (`2024-01-05`), RFC 3339 timestamps
/// (`2024-01-05T14:30:00.000Z`) or timestamps without an offset. The calendar date of a timestamp
/// is the one in its own offset. The original text is written back unchanged.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TransactionDate {
    raw: String,
    date: NaiveDate,
}

impl TransactionDate {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<NaiveDate> for TransactionDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            raw: date.format("%Y-%m-%d").to_string(),
            date,
        }
    }
}

impl FromStr for TransactionDate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let date = if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            d
        } else if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            dt.date_naive()
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            dt.date()
        } else {
            anyhow::bail!("'{s}' is not an ISO-8601 date")
        };
        Ok(Self {
            raw: s.to_string(),
            date,
        })
    }
}

impl Display for TransactionDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for TransactionDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for TransactionDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TransactionDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A transaction as it is stored under the user's transactions key.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub name: String,
    pub amount: Amount,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: TransactionDate,
}

impl TransactionRecord {
    /// Formats the record for display in `locale`.
    pub fn to_display(&self, locale: Locale) -> DisplayTransaction {
        DisplayTransaction {
            id: self.id.clone(),
            name: self.name.clone(),
            amount: self.amount.format(locale),
            transaction_type: self.transaction_type,
            category: self.category.clone(),
            date: locale.format_short_date(self.date.date()),
        }
    }
}

/// A transaction with its amount and date formatted for display. It is never stored.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DisplayTransaction {
    pub id: String,
    pub name: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        for s in [
            "2024-01-05",
            "2024-01-05T14:30:00.000Z",
            "2024-01-05T23:30:00-03:00",
            "2024-01-05T08:00:00",
        ] {
            assert_eq!(TransactionDate::from_str(s).unwrap().date(), expected, "{s}");
        }
    }

    #[test]
    fn test_parse_bad_date() {
        assert!(TransactionDate::from_str("05/01/2024").is_err());
        assert!(TransactionDate::from_str("").is_err());
    }

    #[test]
    fn test_record_keeps_original_date_text() {
        let json = r#"{"id":"a","name":"Salary","amount":"5000","type":"positive","category":"salary","date":"2021-06-05T18:22:31.123Z"}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.transaction_type, TransactionType::Positive);
        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["date"], "2021-06-05T18:22:31.123Z");
        assert_eq!(out["type"], "positive");
    }

    #[test]
    fn test_record_rejects_unknown_type() {
        let json = r#"{"id":"a","name":"x","amount":1,"type":"neutral","category":"c","date":"2024-01-01"}"#;
        assert!(serde_json::from_str::<TransactionRecord>(json).is_err());
    }

    #[test]
    fn test_to_display() {
        let json = r#"{"id":"a","name":"Rent","amount":1500,"type":"negative","category":"house","date":"2024-02-01"}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        let display = record.to_display(Locale::PtBr);
        assert_eq!(display.amount, "R$\u{a0}1.500,00");
        assert_eq!(display.date, "01/02/2024");
        assert_eq!(display.transaction_type, TransactionType::Negative);
    }
}
