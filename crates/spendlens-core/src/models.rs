//! Domain models for Spendlens

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Date format exchanged with the finance API (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Transaction type tag
///
/// The type decides which aggregations a record contributes to:
/// `Need` and `Want` are expenses, `Investment` is tracked separately,
/// and `Income` only feeds the income total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Need,
    Want,
    Investment,
}

impl TransactionType {
    /// Outflow types in display order (the type breakdown uses this order)
    pub const OUTFLOWS: [TransactionType; 3] = [Self::Need, Self::Want, Self::Investment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Need => "Need",
            Self::Want => "Want",
            Self::Investment => "Investment",
        }
    }

    /// Need and Want count as spending; Investment and Income do not
    pub fn is_expense(&self) -> bool {
        matches!(self, Self::Need | Self::Want)
    }

    /// Everything that leaves the account (expenses plus investments)
    pub fn is_outflow(&self) -> bool {
        !matches!(self, Self::Income)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "need" => Ok(Self::Need),
            "want" => Ok(Self::Want),
            "investment" => Ok(Self::Investment),
            _ => Err(format!(
                "Unknown transaction type: {} (valid: income, need, want, investment)",
                s
            )),
        }
    }
}

/// A transaction record as delivered by the finance API
///
/// Decoding is forgiving: ids may arrive as numbers, a null timestamp reads as
/// empty, and an amount that isn't a JSON number reads as `None`. Only a
/// missing or unknown `type` rejects the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// RFC 3339 timestamp or plain date; the first 10 characters are the calendar day
    #[serde(default, deserialize_with = "lenient::text")]
    pub timestamp: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

impl Transaction {
    /// Strictly positive, finite amount
    pub fn has_positive_amount(&self) -> bool {
        self.positive_amount().is_some()
    }

    pub fn positive_amount(&self) -> Option<f64> {
        self.amount.filter(|a| a.is_finite() && *a > 0.0)
    }

    /// Amount used for totals; missing or non-finite amounts count as nothing
    pub fn finite_amount(&self) -> Option<f64> {
        self.amount.filter(|a| a.is_finite())
    }

    /// Calendar day taken from the `YYYY-MM-DD` prefix of the timestamp
    pub fn day(&self) -> Option<NaiveDate> {
        let prefix = self.timestamp.get(..10)?;
        NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok()
    }
}

/// Spending category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
}

/// Server-computed spend summary for one category over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpendSummary {
    #[serde(default, deserialize_with = "lenient::text")]
    pub category_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category_name: String,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub expense_count: i64,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub average_amount: f64,
    /// Expense category (true) or income category (false)
    #[serde(rename = "is_expense")]
    pub is_expense: bool,
}

/// Field decoders that tolerate the loose typing of the finance API
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    type DeResult<T, E> = std::result::Result<T, E>;

    /// String or number; null reads as empty
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> DeResult<String, D::Error> {
        Ok(optional_text(d)?.unwrap_or_default())
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(d: D) -> DeResult<Option<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }

    /// Any JSON number; everything else reads as `None`
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> DeResult<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
    }

    pub fn number_or_zero<'de, D: Deserializer<'de>>(d: D) -> DeResult<f64, D::Error> {
        Ok(number(d)?.unwrap_or(0.0))
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> DeResult<i64, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
            _ => 0,
        })
    }
}

/// Inclusive calendar date range
///
/// Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::Validation(format!(
                "start date {} is after end date {}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Parse user-supplied `YYYY-MM-DD` inputs
    ///
    /// Missing or blank values are rejected the same way as inverted ranges.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = parse_date_input("start", start)?;
        let end = parse_date_input("end", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Start date as sent to the API
    pub fn start_param(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// End date as sent to the API
    pub fn end_param(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered (both ends included)
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date_input(label: &str, value: Option<&str>) -> Result<NaiveDate> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Validation(format!("missing {} date", label)))?;

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        Error::Validation(format!(
            "invalid {} date '{}' (use YYYY-MM-DD)",
            label, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        let err = DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_date_range_single_day() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert_eq!(range.num_days(), 1);
        assert!(range.contains(date(2024, 1, 1)));
        assert!(!range.contains(date(2024, 1, 2)));
    }

    #[test]
    fn test_date_range_parse() {
        let range = DateRange::parse(Some("2024-01-01"), Some(" 2024-01-31 ")).unwrap();
        assert_eq!(range.start_param(), "2024-01-01");
        assert_eq!(range.end_param(), "2024-01-31");
        assert_eq!(range.to_string(), "2024-01-01 to 2024-01-31");
    }

    #[test]
    fn test_date_range_parse_missing_or_malformed() {
        assert!(DateRange::parse(None, Some("2024-01-31")).unwrap_err().is_validation());
        assert!(DateRange::parse(Some(""), Some("2024-01-31")).unwrap_err().is_validation());
        assert!(DateRange::parse(Some("2024-01-01"), Some("01/31/2024"))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_transaction_deserialize() {
        let json = r#"{
            "id": "t1",
            "amount": 12.5,
            "category_id": "food",
            "type": "Need",
            "timestamp": "2024-03-05T18:22:00Z"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionType::Need);
        assert_eq!(tx.category_id.as_deref(), Some("food"));
        assert_eq!(tx.day(), Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_transaction_day_requires_date_prefix() {
        let mut tx: Transaction =
            serde_json::from_str(r#"{"amount": 1.0, "type": "Want"}"#).unwrap();
        assert_eq!(tx.day(), None);

        tx.timestamp = "yesterday".into();
        assert_eq!(tx.day(), None);

        tx.timestamp = "2024-02-30".into();
        assert_eq!(tx.day(), None);
    }

    #[test]
    fn test_positive_amount() {
        let mut tx: Transaction =
            serde_json::from_str(r#"{"amount": 0.0, "type": "Want"}"#).unwrap();
        assert!(!tx.has_positive_amount());
        tx.amount = Some(-3.0);
        assert!(!tx.has_positive_amount());
        tx.amount = Some(f64::NAN);
        assert!(!tx.has_positive_amount());
        tx.amount = None;
        assert!(!tx.has_positive_amount());
        tx.amount = Some(0.01);
        assert!(tx.has_positive_amount());
    }

    #[test]
    fn test_transaction_tolerates_loose_fields() {
        let json = r#"{
            "id": 7,
            "amount": "ten",
            "category_id": 3,
            "type": "Want",
            "timestamp": null,
            "description": null
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, "7");
        assert_eq!(tx.category_id.as_deref(), Some("3"));
        assert_eq!(tx.amount, None);
        assert_eq!(tx.timestamp, "");
        assert_eq!(tx.day(), None);
        assert!(!tx.has_positive_amount());

        let tx: Transaction =
            serde_json::from_str(r#"{"amount": null, "type": "Need", "category_id": null}"#)
                .unwrap();
        assert_eq!(tx.amount, None);
        assert_eq!(tx.category_id, None);
    }

    #[test]
    fn test_transaction_requires_known_type() {
        for json in [
            r#"{"amount": 1.0}"#,
            r#"{"amount": 1.0, "type": "Gift"}"#,
            r#"{"id": {"n": 1}, "amount": 1.0, "type": "Need"}"#,
        ] {
            assert!(serde_json::from_str::<Transaction>(json).is_err(), "{}", json);
        }
    }

    #[test]
    fn test_category_spend_summary_field_names() {
        let json = r#"{
            "categoryId": "c1",
            "categoryName": "Food",
            "totalAmount": 300.0,
            "expenseCount": 3,
            "averageAmount": 100.0,
            "is_expense": true
        }"#;
        let summary: CategorySpendSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.category_name, "Food");
        assert_eq!(summary.expense_count, 3);
        assert!(summary.is_expense);

        let back = serde_json::to_value(&summary).unwrap();
        assert_eq!(back["averageAmount"], 100.0);
        assert_eq!(back["is_expense"], true);
    }

    #[test]
    fn test_loose_category_and_summary() {
        let category: Category = serde_json::from_str(r#"{"id": 12, "name": null}"#).unwrap();
        assert_eq!(category.id, "12");
        assert_eq!(category.name, "");

        let summary: CategorySpendSummary = serde_json::from_str(
            r#"{"categoryId": 4, "categoryName": "Fuel", "totalAmount": null,
                "expenseCount": 2.0, "averageAmount": "n/a", "is_expense": true}"#,
        )
        .unwrap();
        assert_eq!(summary.category_id, "4");
        assert_eq!(summary.total_amount, 0.0);
        assert_eq!(summary.expense_count, 2);
        assert_eq!(summary.average_amount, 0.0);
    }

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("want".parse::<TransactionType>(), Ok(TransactionType::Want));
        assert!("transfer".parse::<TransactionType>().is_err());
        assert!(TransactionType::Need.is_expense());
        assert!(!TransactionType::Investment.is_expense());
        assert!(TransactionType::Investment.is_outflow());
        assert!(!TransactionType::Income.is_outflow());
    }
}
