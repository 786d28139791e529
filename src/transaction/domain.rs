//! The transaction and entry models.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Cents, Period, UserID,
    database_id::{CategoryId, EntryId, TransactionId},
    filter::FilterValue,
};

/// What kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money spent in a single payment.
    SimpleExpense,
    /// Money earned.
    Income,
    /// A purchase paid over several months, one entry per month.
    Installment,
}

impl TransactionType {
    /// The name used in JSON, SQL and filters, e.g. `"simple_expense"`.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::SimpleExpense => "simple_expense",
            TransactionType::Income => "income",
            TransactionType::Installment => "installment",
        }
    }

    /// A description of how many entries a transaction of this type must have.
    pub fn entry_count_rule(self) -> &'static str {
        match self {
            TransactionType::SimpleExpense => "expense must have only one entry",
            TransactionType::Income => "income must have only one entry",
            TransactionType::Installment => "installment must have at least two entries",
        }
    }

    /// Whether a transaction of this type may have `count` entries.
    pub fn allows_entry_count(self, count: usize) -> bool {
        match self {
            TransactionType::SimpleExpense | TransactionType::Income => count == 1,
            TransactionType::Installment => count >= 2,
        }
    }

    /// Give `amount` the sign entries of this type are stored with.
    ///
    /// Expenses and installments are stored as negative amounts and income as positive amounts,
    /// whatever sign the client sent.
    pub fn signed(self, amount: Cents) -> Cents {
        match self {
            TransactionType::SimpleExpense | TransactionType::Installment => amount.negative(),
            TransactionType::Income => amount.positive(),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "simple_expense" => Ok(TransactionType::SimpleExpense),
            "income" => Ok(TransactionType::Income),
            "installment" => Ok(TransactionType::Installment),
            other => Err(format!("unknown transaction type \"{other}\"")),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.as_str().to_sql()
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

impl From<TransactionType> for FilterValue {
    fn from(transaction_type: TransactionType) -> Self {
        transaction_type.as_str().into()
    }
}

/// A named group of entries, e.g. a purchase and its monthly installments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// What kind of transaction this is.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A short name for the transaction.
    pub name: String,
    /// Free text notes.
    pub note: Option<String>,
    /// The category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// When the transaction was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One dated amount belonging to a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// The ID of the entry.
    pub id: EntryId,
    /// The transaction the entry belongs to.
    pub transaction_id: TransactionId,
    /// The signed amount of the entry.
    pub amount: Cents,
    /// The date that places the entry in a period.
    #[serde(with = "crate::period::iso_date")]
    pub reference_date: Date,
    /// When the entry was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// An entry to be added to a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    /// The amount of the entry. The sign is set from the transaction type when it is stored.
    pub amount: Cents,
    /// The date that places the entry in a period.
    #[serde(with = "crate::period::iso_date")]
    pub reference_date: Date,
}

impl NewEntry {
    /// The period the entry falls in.
    pub fn period(&self) -> Period {
        Period::of(self.reference_date)
    }
}

/// An entry joined with its transaction and category, as read from the `v_entries` view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEntry {
    /// The ID of the entry.
    pub id: EntryId,
    /// The transaction the entry belongs to.
    pub transaction_id: TransactionId,
    /// The name of the transaction.
    pub name: String,
    /// The notes of the transaction.
    pub note: Option<String>,
    /// The signed amount of the entry.
    pub amount: Cents,
    /// The period the entry falls in.
    pub period: Period,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// What kind of transaction the entry belongs to.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The sum of all entries of the transaction.
    pub total_amount: Cents,
    /// The 1-based position of the entry among its transaction's entries, by reference date.
    pub installment: i64,
    /// The number of entries the transaction has.
    pub total_installments: i64,
    /// When the entry was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// The date that places the entry in a period.
    #[serde(with = "crate::period::iso_date")]
    pub reference_date: Date,
    /// The category of the transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// The name of the transaction's category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    /// The color of the transaction's category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_color: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Cents, transaction::TransactionType};

    #[test]
    fn transaction_type_round_trips_through_text() {
        for transaction_type in [
            TransactionType::SimpleExpense,
            TransactionType::Income,
            TransactionType::Installment,
        ] {
            assert_eq!(
                transaction_type.as_str().parse(),
                Ok(transaction_type),
                "{transaction_type}"
            );
            assert_eq!(
                serde_json::to_value(transaction_type).unwrap(),
                json!(transaction_type.as_str())
            );
        }
    }

    #[test]
    fn unknown_transaction_type_is_rejected() {
        assert!("transfer".parse::<TransactionType>().is_err());
        assert!(serde_json::from_value::<TransactionType>(json!("transfer")).is_err());
    }

    #[test]
    fn expenses_and_installments_are_negative() {
        for transaction_type in [TransactionType::SimpleExpense, TransactionType::Installment] {
            assert_eq!(transaction_type.signed(Cents::new(500)), Cents::new(-500));
            assert_eq!(transaction_type.signed(Cents::new(-500)), Cents::new(-500));
        }
    }

    #[test]
    fn income_is_positive() {
        assert_eq!(TransactionType::Income.signed(Cents::new(-500)), Cents::new(500));
        assert_eq!(TransactionType::Income.signed(Cents::new(500)), Cents::new(500));
    }

    #[test]
    fn entry_count_rules() {
        assert!(TransactionType::SimpleExpense.allows_entry_count(1));
        assert!(!TransactionType::SimpleExpense.allows_entry_count(0));
        assert!(!TransactionType::SimpleExpense.allows_entry_count(2));
        assert!(TransactionType::Income.allows_entry_count(1));
        assert!(!TransactionType::Income.allows_entry_count(2));
        assert!(!TransactionType::Installment.allows_entry_count(1));
        assert!(TransactionType::Installment.allows_entry_count(2));
        assert!(TransactionType::Installment.allows_entry_count(12));
    }
}
