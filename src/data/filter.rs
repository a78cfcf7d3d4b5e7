use std::collections::BTreeSet;

use super::model::{PartRecord, PartTable};
use crate::error::{InventoryError, Result};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Category selection. `All` is a variant of its own, so no real category
/// value (not even one literally spelled "ALL") can be mistaken for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Exact(String),
}

/// Inclusive price bounds. Construct through [`PriceRange::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    min: f64,
    max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = PriceRange { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }

    fn validate(&self) -> Result<()> {
        // `!(a <= b)` also catches NaN bounds
        if !(self.min <= self.max) {
            return Err(InventoryError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// User-supplied predicates, combined with logical AND.
///
/// The default value filters nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of `code`; empty means no filter.
    pub code_substring: String,
    /// Case-insensitive substring of `description`; empty means no filter.
    pub description_substring: String,
    pub category: CategoryFilter,
    /// `None` spans the full observed range.
    pub price_range: Option<PriceRange>,
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return a new table holding the records that pass every active predicate,
/// in their original order.
///
/// Predicates run cheapest first: code → description → category → price.
pub fn filter(table: &PartTable, criteria: &FilterCriteria) -> Result<PartTable> {
    if let Some(range) = &criteria.price_range {
        range.validate()?;
    }

    let code_needle = criteria.code_substring.to_lowercase();
    let description_needle = criteria.description_substring.to_lowercase();

    let kept: Vec<PartRecord> = table
        .iter()
        .filter(|rec| contains_ci(&rec.code, &code_needle))
        .filter(|rec| contains_ci(&rec.description, &description_needle))
        .filter(|rec| match &criteria.category {
            CategoryFilter::All => true,
            CategoryFilter::Exact(cat) => rec.category == *cat,
        })
        .filter(|rec| {
            criteria
                .price_range
                .map_or(true, |range| range.contains(rec.outlet_price))
        })
        .cloned()
        .collect();

    log::debug!("Filter kept {} of {} records", kept.len(), table.len());
    Ok(PartTable::from_records(kept))
}

/// Empty needle always matches. `needle` must already be lower-cased.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

/// Distinct categories, sorted and de-duplicated, for populating a picker.
pub fn distinct_categories(table: &PartTable) -> Vec<String> {
    table
        .iter()
        .map(|rec| rec.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Observed `(min, max)` outlet price, or `None` for an empty table.
pub fn price_bounds(table: &PartTable) -> Option<PriceRange> {
    let mut prices = table.iter().map(|rec| rec.outlet_price);
    let first = prices.next()?;
    let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    Some(PriceRange { min, max })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(code: &str, description: &str, price: f64, category: &str) -> PartRecord {
        PartRecord {
            code: code.to_string(),
            description: description.to_string(),
            outlet_price: price,
            brand: "ACDelco".to_string(),
            model: "Aveo".to_string(),
            category: category.to_string(),
        }
    }

    fn sample() -> PartTable {
        PartTable::from_records(vec![
            part("A1-200", "Filtro de aire", 150.5, "Filtros"),
            part("B2-100", "Balata trasera", 899.0, "Frenos"),
            part("a1-300", "Filtro de aceite", 99.99, "Filtros"),
            part("C3-001", "Amortiguador", 1_250.0, "Suspensión"),
        ])
    }

    fn codes(table: &PartTable) -> Vec<&str> {
        table.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn default_criteria_is_identity() {
        let table = sample();
        assert_eq!(filter(&table, &FilterCriteria::default()).unwrap(), table);
    }

    #[test]
    fn observed_bounds_are_identity() {
        let table = sample();
        let criteria = FilterCriteria {
            price_range: price_bounds(&table),
            ..Default::default()
        };
        assert_eq!(filter(&table, &criteria).unwrap(), table);
    }

    #[test]
    fn code_substring_ignores_case() {
        let criteria = FilterCriteria {
            code_substring: "a1".to_string(),
            ..Default::default()
        };
        let out = filter(&sample(), &criteria).unwrap();
        assert_eq!(codes(&out), ["A1-200", "a1-300"]);
    }

    #[test]
    fn description_substring_ignores_case() {
        let criteria = FilterCriteria {
            description_substring: "FILTRO".to_string(),
            ..Default::default()
        };
        let out = filter(&sample(), &criteria).unwrap();
        assert_eq!(codes(&out), ["A1-200", "a1-300"]);
    }

    #[test]
    fn category_is_exact_and_case_sensitive() {
        let mut criteria = FilterCriteria {
            category: CategoryFilter::Exact("Frenos".to_string()),
            ..Default::default()
        };
        assert_eq!(codes(&filter(&sample(), &criteria).unwrap()), ["B2-100"]);

        criteria.category = CategoryFilter::Exact("frenos".to_string());
        assert!(filter(&sample(), &criteria).unwrap().is_empty());
    }

    #[test]
    fn literal_all_category_is_not_the_sentinel() {
        let table = PartTable::from_records(vec![
            part("X", "", 1.0, "ALL"),
            part("Y", "", 1.0, "Frenos"),
        ]);
        let criteria = FilterCriteria {
            category: CategoryFilter::Exact("ALL".to_string()),
            ..Default::default()
        };
        assert_eq!(codes(&filter(&table, &criteria).unwrap()), ["X"]);
    }

    #[test]
    fn price_range_is_inclusive_on_both_ends() {
        let table = PartTable::from_records(vec![
            part("lo", "", 99.99, ""),
            part("eq", "", 100.00, ""),
            part("hi", "", 100.01, ""),
        ]);
        let criteria = FilterCriteria {
            price_range: Some(PriceRange::new(100.0, 100.0).unwrap()),
            ..Default::default()
        };
        assert_eq!(codes(&filter(&table, &criteria).unwrap()), ["eq"]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            PriceRange::new(200.0, 100.0),
            Err(InventoryError::InvalidRange { .. })
        ));
        assert!(PriceRange::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn predicates_combine_conjunctively() {
        let criteria = FilterCriteria {
            code_substring: "1".to_string(),
            description_substring: "filtro".to_string(),
            category: CategoryFilter::Exact("Filtros".to_string()),
            price_range: Some(PriceRange::new(100.0, 200.0).unwrap()),
        };
        assert_eq!(codes(&filter(&sample(), &criteria).unwrap()), ["A1-200"]);
    }

    #[test]
    fn result_is_an_ordered_subsequence() {
        let table = sample();
        let criteria = FilterCriteria {
            price_range: Some(PriceRange::new(100.0, 1_000.0).unwrap()),
            ..Default::default()
        };
        let out = filter(&table, &criteria).unwrap();
        assert!(out.len() <= table.len());

        let mut source = table.iter();
        for rec in &out {
            assert!(source.any(|r| r == rec), "{} out of order", rec.code);
        }
        // input untouched
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        let table = PartTable::from_records(vec![
            part("1", "", 1.0, "Filters"),
            part("2", "", 1.0, "Brakes"),
            part("3", "", 1.0, "Filters"),
        ]);
        let cats = distinct_categories(&table);
        assert_eq!(cats, ["Brakes", "Filters"]);
        assert!(!cats.iter().any(|c| c == "ALL"));
    }

    #[test]
    fn bounds_of_empty_table_are_none() {
        assert!(price_bounds(&PartTable::default()).is_none());
        let b = price_bounds(&sample()).unwrap();
        assert_eq!((b.min(), b.max()), (99.99, 1_250.0));
    }
}
