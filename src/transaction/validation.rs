//! Rules a transaction's entries must follow before anything is written.

use std::collections::HashSet;

use crate::{
    Cents, Error,
    transaction::{NewEntry, TransactionType},
};

/// The largest absolute amount of a single entry, 999 999.00.
pub const MAX_ENTRY_AMOUNT: Cents = Cents::new(99_999_900);

/// Check that `entries` may be stored for a transaction of `transaction_type`.
///
/// # Errors
///
/// Returns, in order of precedence:
/// - [Error::EntriesInSamePeriod] if two entries fall in the same year and month,
/// - [Error::InvalidEntryCount] if the number of entries does not suit the type,
/// - [Error::InvalidAmount] if an entry's absolute amount is above [MAX_ENTRY_AMOUNT].
pub fn validate_entries(
    transaction_type: TransactionType,
    entries: &[NewEntry],
) -> Result<(), Error> {
    let mut periods = HashSet::with_capacity(entries.len());

    if !entries.iter().all(|entry| periods.insert(entry.period())) {
        return Err(Error::EntriesInSamePeriod);
    }

    if !transaction_type.allows_entry_count(entries.len()) {
        return Err(Error::InvalidEntryCount(transaction_type));
    }

    if let Some(entry) = entries
        .iter()
        .find(|entry| entry.amount.abs() > MAX_ENTRY_AMOUNT)
    {
        return Err(Error::InvalidAmount(format!(
            "{} exceeds the maximum of {MAX_ENTRY_AMOUNT}",
            entry.amount
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        Cents, Error,
        transaction::{
            NewEntry, TransactionType,
            validation::{MAX_ENTRY_AMOUNT, validate_entries},
        },
    };

    fn entry(reference_date: Date) -> NewEntry {
        NewEntry {
            amount: Cents::new(1000),
            reference_date,
        }
    }

    #[test]
    fn single_entry_expense_and_income_are_valid() {
        let entries = [entry(date!(2025 - 01 - 01))];

        assert_eq!(validate_entries(TransactionType::SimpleExpense, &entries), Ok(()));
        assert_eq!(validate_entries(TransactionType::Income, &entries), Ok(()));
    }

    #[test]
    fn expense_with_two_entries_is_rejected() {
        let entries = [entry(date!(2025 - 01 - 01)), entry(date!(2025 - 02 - 01))];

        assert_eq!(
            validate_entries(TransactionType::SimpleExpense, &entries),
            Err(Error::InvalidEntryCount(TransactionType::SimpleExpense))
        );
        assert_eq!(
            validate_entries(TransactionType::Income, &entries),
            Err(Error::InvalidEntryCount(TransactionType::Income))
        );
    }

    #[test]
    fn installment_needs_two_entries() {
        let one = [entry(date!(2025 - 01 - 01))];
        let two = [entry(date!(2025 - 01 - 01)), entry(date!(2025 - 02 - 01))];

        assert_eq!(
            validate_entries(TransactionType::Installment, &one),
            Err(Error::InvalidEntryCount(TransactionType::Installment))
        );
        assert_eq!(validate_entries(TransactionType::Installment, &two), Ok(()));
    }

    #[test]
    fn no_entries_is_rejected() {
        assert_eq!(
            validate_entries(TransactionType::Income, &[]),
            Err(Error::InvalidEntryCount(TransactionType::Income))
        );
    }

    #[test]
    fn same_period_is_rejected_regardless_of_day() {
        let entries = [entry(date!(2025 - 03 - 01)), entry(date!(2025 - 03 - 31))];

        assert_eq!(
            validate_entries(TransactionType::Installment, &entries),
            Err(Error::EntriesInSamePeriod)
        );
    }

    #[test]
    fn period_collision_is_reported_before_entry_count() {
        let entries = [entry(date!(2025 - 03 - 01)), entry(date!(2025 - 03 - 02))];

        assert_eq!(
            validate_entries(TransactionType::SimpleExpense, &entries),
            Err(Error::EntriesInSamePeriod)
        );
    }

    #[test]
    fn same_month_in_different_years_is_allowed() {
        let entries = [entry(date!(2025 - 03 - 01)), entry(date!(2026 - 03 - 01))];

        assert_eq!(validate_entries(TransactionType::Installment, &entries), Ok(()));
    }

    #[test]
    fn amount_above_maximum_is_rejected() {
        let entries = [NewEntry {
            amount: Cents::new(-(MAX_ENTRY_AMOUNT.as_i64() + 1)),
            reference_date: date!(2025 - 01 - 01),
        }];

        assert!(matches!(
            validate_entries(TransactionType::SimpleExpense, &entries),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn maximum_amount_is_allowed() {
        let entries = [NewEntry {
            amount: MAX_ENTRY_AMOUNT,
            reference_date: date!(2025 - 01 - 01),
        }];

        assert_eq!(validate_entries(TransactionType::Income, &entries), Ok(()));
    }
}
