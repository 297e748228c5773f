//! Locale-specific formatting of currency, dates and dashboard labels.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Intl inserts a no-break space between the `R$` symbol and the number.
const NBSP: char = '\u{a0}';

const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const MONTHS_EN_US: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The locale used to render amounts, dates and labels. Each locale carries its own currency.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// Brazilian Portuguese with amounts in BRL.
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// American English with amounts in USD.
    #[serde(rename = "en-US")]
    EnUs,
}

serde_plain::derive_display_from_serialize!(Locale);
serde_plain::derive_fromstr_from_deserialize!(Locale);

impl Locale {
    /// Formats `value` as a currency string, e.g. `R$ 1.234,56` or `-$60.00`.
    pub fn format_currency(&self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let grouped = format_num::format_num!(",.2", rounded.abs().to_f64().unwrap_or_default());
        match self {
            Locale::PtBr => {
                let swapped: String = grouped
                    .chars()
                    .map(|c| match c {
                        ',' => '.',
                        '.' => ',',
                        other => other,
                    })
                    .collect();
                format!("{sign}R${NBSP}{swapped}")
            }
            Locale::EnUs => format!("{sign}${grouped}"),
        }
    }

    /// Formats `date` with two-digit day and month and a four-digit year.
    pub fn format_short_date(&self, date: NaiveDate) -> String {
        match self {
            Locale::PtBr => date.format("%d/%m/%Y").to_string(),
            Locale::EnUs => date.format("%m/%d/%Y").to_string(),
        }
    }

    /// Formats the day of the month together with the full month name, e.g. `5 de janeiro`.
    pub fn format_day_and_month(&self, date: NaiveDate) -> String {
        let ix = date.month0() as usize;
        match self {
            Locale::PtBr => format!("{} de {}", date.day(), MONTHS_PT_BR[ix]),
            Locale::EnUs => format!("{} {}", MONTHS_EN_US[ix], date.day()),
        }
    }

    /// The label shown in place of a date when there are no transactions of a type.
    pub fn no_transactions(&self) -> &'static str {
        match self {
            Locale::PtBr => "Não há transações",
            Locale::EnUs => "No transactions",
        }
    }

    /// The label for the most recent entry.
    pub fn last_entry(&self, when: &str) -> String {
        match self {
            Locale::PtBr => format!("Última entrada dia {when}"),
            Locale::EnUs => format!("Last entry on {when}"),
        }
    }

    /// The label for the most recent expense.
    pub fn last_expense(&self, when: &str) -> String {
        match self {
            Locale::PtBr => format!("Última saída dia {when}"),
            Locale::EnUs => format!("Last expense on {when}"),
        }
    }

    /// The interval from the first of the month up to `until`.
    pub fn interval(&self, until: &str) -> String {
        match self {
            Locale::PtBr => format!("01 a {until}"),
            Locale::EnUs => format!("01 to {until}"),
        }
    }

    /// The message shown to the user when the dashboard cannot be loaded.
    pub fn load_failed(&self) -> &'static str {
        match self {
            Locale::PtBr => "Não foi possível carregar os dados",
            Locale::EnUs => "Unable to load the data",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_currency_pt_br() {
        let l = Locale::PtBr;
        assert_eq!(l.format_currency(dec("100")), "R$\u{a0}100,00");
        assert_eq!(l.format_currency(dec("1234.5")), "R$\u{a0}1.234,50");
        assert_eq!(l.format_currency(dec("-60")), "-R$\u{a0}60,00");
        assert_eq!(l.format_currency(Decimal::ZERO), "R$\u{a0}0,00");
    }

    #[test]
    fn test_currency_en_us() {
        let l = Locale::EnUs;
        assert_eq!(l.format_currency(dec("60000")), "$60,000.00");
        assert_eq!(l.format_currency(dec("-40.25")), "-$40.25");
    }

    #[test]
    fn test_currency_rounds_half_away_from_zero() {
        assert_eq!(Locale::EnUs.format_currency(dec("0.125")), "$0.13");
        assert_eq!(Locale::EnUs.format_currency(dec("-0.001")), "$0.00");
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(Locale::PtBr.format_short_date(date), "05/03/2024");
        assert_eq!(Locale::EnUs.format_short_date(date), "03/05/2024");
        assert_eq!(Locale::PtBr.format_day_and_month(date), "5 de março");
        assert_eq!(Locale::EnUs.format_day_and_month(date), "March 5");
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!(Locale::from_str("en-US").unwrap(), Locale::EnUs);
        assert_eq!(Locale::PtBr.to_string(), "pt-BR");
        assert!(Locale::from_str("fr-FR").is_err());
    }
}
