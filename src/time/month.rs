//! Month number to English month name

/// Lowercase English month names, indexed by `month - 1`
pub const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_months() {
        let expected = [
            (1, "january"),
            (2, "february"),
            (3, "march"),
            (4, "april"),
            (5, "may"),
            (6, "june"),
            (7, "july"),
            (8, "august"),
            (9, "september"),
            (10, "october"),
            (11, "november"),
            (12, "december"),
        ];
        for (month, name) in expected {
            assert_eq!(MONTH_NAMES[month - 1], name);
        }
    }

    #[test]
    fn test_matches_chrono_format() {
        use chrono::NaiveDate;

        for month in 1..=12 {
            let date = NaiveDate::from_ymd_opt(2024, month, 1).unwrap();
            let formatted = date.format("%B").to_string().to_lowercase();
            assert_eq!(MONTH_NAMES[month as usize - 1], formatted);
        }
    }
}
