//! Splits a total amount into monthly installment entries.

use time::Date;

use crate::{
    Cents, Error, Period,
    period::add_months,
    transaction::NewEntry,
};

/// The fewest installments a plan may have.
pub const MIN_INSTALLMENTS: u32 = 2;
/// The most installments a plan may have.
pub const MAX_INSTALLMENTS: u32 = 100;

/// Split `total` into `count` monthly entries starting at `start`.
///
/// The total is made negative, since installments are expenses. Each entry gets the total divided
/// by `count`, truncated toward zero, and the first entry also gets the remainder so that the
/// entries add up to exactly the total, e.g. -100.00 over three months is -33.34, -33.33 and
/// -33.33.
///
/// Entry `i` is dated `i` months after `start`, with the day clamped to the end of shorter months.
///
/// # Errors
///
/// Returns [Error::InvalidInstallmentCount] if `count` is not between [MIN_INSTALLMENTS] and
/// [MAX_INSTALLMENTS], or [Error::InvalidPeriod] if a date would be out of range.
pub fn split_installments(total: Cents, count: u32, start: Date) -> Result<Vec<NewEntry>, Error> {
    if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&count) {
        return Err(Error::InvalidInstallmentCount(count));
    }

    let total = total.negative().as_i64();
    let divisor = i64::from(count);
    let base = total / divisor;
    let remainder = total % divisor;

    (0..count)
        .map(|i| -> Result<NewEntry, Error> {
            let reference_date = add_months(start, i).ok_or_else(|| {
                Error::InvalidPeriod(format!("{} plus {i} months", Period::of(start)))
            })?;

            let amount = if i == 0 { base + remainder } else { base };

            Ok(NewEntry {
                amount: Cents::new(amount),
                reference_date,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        Cents, Error, Period,
        transaction::installment::split_installments,
    };

    fn amounts(total: i64, count: u32) -> Vec<i64> {
        split_installments(Cents::new(total), count, date!(2025 - 01 - 15))
            .unwrap()
            .into_iter()
            .map(|entry| entry.amount.as_i64())
            .collect()
    }

    #[test]
    fn first_entry_absorbs_remainder() {
        assert_eq!(amounts(-10_000, 3), [-3334, -3333, -3333]);
    }

    #[test]
    fn positive_total_is_negated() {
        assert_eq!(amounts(10_000, 3), [-3334, -3333, -3333]);
    }

    #[test]
    fn even_split_has_no_remainder() {
        assert_eq!(amounts(-1200, 12), vec![-100; 12]);
    }

    #[test]
    fn sum_is_exact() {
        for (total, count) in [(-1, 2), (-999_999_99, 7), (-10_001, 100), (-5, 3), (0, 4)] {
            let got: i64 = amounts(total, count).iter().sum();

            assert_eq!(got, total, "{total} over {count}");
        }
    }

    #[test]
    fn total_smaller_than_count() {
        assert_eq!(amounts(-5, 3), [-3, -1, -1]);
    }

    #[test]
    fn entries_advance_one_month_each() {
        let entries = split_installments(Cents::new(-1200), 12, date!(2025 - 06 - 10)).unwrap();

        let periods: Vec<String> = entries
            .iter()
            .map(|entry| Period::of(entry.reference_date).to_string())
            .collect();

        assert_eq!(
            periods,
            [
                "202506", "202507", "202508", "202509", "202510", "202511", "202512", "202601",
                "202602", "202603", "202604", "202605",
            ]
        );
        assert!(entries.iter().all(|entry| entry.reference_date.day() == 10));
    }

    #[test]
    fn end_of_month_start_is_clamped() {
        let entries = split_installments(Cents::new(-300), 3, date!(2025 - 01 - 31)).unwrap();

        let dates: Vec<Date> = entries.iter().map(|entry| entry.reference_date).collect();

        assert_eq!(
            dates,
            [date!(2025 - 01 - 31), date!(2025 - 02 - 28), date!(2025 - 03 - 31)]
        );
    }

    #[test]
    fn rejects_count_out_of_range() {
        for count in [0, 1, 101] {
            assert_eq!(
                split_installments(Cents::new(-100), count, date!(2025 - 01 - 01)),
                Err(Error::InvalidInstallmentCount(count))
            );
        }
    }

    #[test]
    fn out_of_range_dates_are_rejected() {
        let result = split_installments(Cents::new(-100), 2, Date::MAX);

        assert!(matches!(result, Err(Error::InvalidPeriod(_))));
    }
}
