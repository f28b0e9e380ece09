//! Case-insensitive category search

use crate::models::ExpenseRecord;

/// Records whose category contains `term`, ignoring case.
///
/// An empty term selects nothing; callers treat "no term entered" separately
/// from "term with no matches".
pub fn search<'a, I>(records: I, term: &str) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    records
        .into_iter()
        .filter(|r| r.category.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::period::PeriodKey;

    fn rec(category: &str, amount: Option<f64>) -> ExpenseRecord {
        ExpenseRecord {
            category: category.to_string(),
            amount,
            timestamp: None,
            period: PeriodKey::parse("202311").ok(),
        }
    }

    #[test]
    fn test_search_scenario() {
        let records = vec![
            rec("food", Some(1000.0)),
            rec("food", Some(500.0)),
            rec("transit", Some(300.0)),
        ];
        let found = search(&records, "foo");
        assert_eq!(found.len(), 2);
        assert_eq!(summarize(found).total, 1500.0);
    }

    #[test]
    fn test_search_ignores_case() {
        let records = vec![rec("Coffee Beans", Some(1.0)), rec("COFFEE", Some(2.0))];
        assert_eq!(search(&records, "coffee").len(), 2);
        assert_eq!(search(&records, "BEANS").len(), 1);
    }

    #[test]
    fn test_search_japanese_labels() {
        let records = vec![
            rec("昼食", Some(800.0)),
            rec("夕食", Some(1200.0)),
            rec("電車", Some(200.0)),
        ];
        assert_eq!(search(&records, "食").len(), 2);
    }

    #[test]
    fn test_empty_term_selects_nothing() {
        let records = vec![rec("food", Some(1.0))];
        assert!(search(&records, "").is_empty());
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let records = vec![rec("food", Some(1.0))];
        assert!(search(&records, "zzz").is_empty());
    }

    #[test]
    fn test_missing_amount_records_still_found() {
        let records = vec![rec("food", Some(1000.0)), rec("food", None)];
        let found = search(&records, "food");
        assert_eq!(found.len(), 2);
        let summary = summarize(found);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.total, 1000.0);
    }
}
