//! Reporting utilities: dataset summaries and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the alignment/prediction code stays clean and testable
//! - output changes are localized

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::domain::PRICE_BUCKETS;
use crate::io::dataset::{Dataset, ListingField, ListingMetric};

pub mod format;

pub use format::*;

/// Aggregates shown by `explore`.
#[derive(Debug, Clone)]
pub struct ExploreSummary {
    pub total: usize,
    pub districts: usize,
    pub avg_area: Option<f64>,
    pub n_columns: usize,
    pub date_span: Option<(NaiveDate, NaiveDate)>,
    pub by_house_type: Vec<(String, usize)>,
    pub by_price_range: Vec<(String, usize)>,
    pub by_district: Vec<(String, usize)>,
    pub area_by_price_range: Vec<(String, f64)>,
    pub group_field: ListingField,
    pub group_metric: ListingMetric,
    pub grouped: Vec<(String, f64)>,
}

pub fn summarize(dataset: &Dataset, by: ListingField, metric: ListingMetric) -> ExploreSummary {
    let listings = &dataset.listings;

    let districts: HashSet<&str> = listings.iter().map(|l| l.district.as_str()).collect();
    let avg_area = mean(listings.iter().map(|l| l.area));

    let by_price_range = {
        let counts = value_counts(listings.iter().filter_map(|l| l.price_range.as_deref()));
        let mut ordered: Vec<(String, usize)> = counts;
        ordered.sort_by_key(|(label, _)| bucket_rank(label));
        ordered
    };

    let area_by_price_range = {
        let mut groups: BTreeMap<(usize, String), Vec<f64>> = BTreeMap::new();
        for l in listings {
            if let Some(range) = &l.price_range {
                groups
                    .entry((bucket_rank(range), range.clone()))
                    .or_default()
                    .push(l.area);
            }
        }
        groups
            .into_iter()
            .filter_map(|((_, range), areas)| mean(areas.into_iter()).map(|m| (range, m)))
            .collect()
    };

    let grouped = {
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for l in listings {
            if let Some(v) = l.metric(metric) {
                groups.entry(l.field(by).to_string()).or_default().push(v);
            }
        }
        groups
            .into_iter()
            .filter_map(|(key, values)| mean(values.into_iter()).map(|m| (key, m)))
            .collect()
    };

    ExploreSummary {
        total: listings.len(),
        districts: districts.len(),
        avg_area,
        n_columns: dataset.columns.len(),
        date_span: dataset.date_span(),
        by_house_type: value_counts(listings.iter().map(|l| l.house_type.as_str())),
        by_price_range,
        by_district: value_counts(listings.iter().map(|l| l.district.as_str())),
        area_by_price_range,
        group_field: by,
        group_metric: metric,
        grouped,
    }
}

/// Counts, most frequent first (ties by name).
fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().map(|(k, n)| (k.to_string(), n)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Position in the bucket list; unknown labels sort last.
fn bucket_rank(label: &str) -> usize {
    PRICE_BUCKETS
        .iter()
        .position(|b| *b == label)
        .unwrap_or(PRICE_BUCKETS.len())
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dataset::load_dataset;
    use std::path::Path;

    fn summary() -> ExploreSummary {
        let ds = load_dataset(Path::new("data/cleaned_data.csv")).unwrap();
        summarize(&ds, ListingField::HouseType, ListingMetric::Price)
    }

    #[test]
    fn headline_metrics() {
        let s = summary();
        assert_eq!(s.total, 18);
        assert_eq!(s.n_columns, 15);
        // CẦU GIÂY counts separately from CẦU GIẤY.
        assert_eq!(s.districts, 15);
        assert!(s.avg_area.unwrap() > 0.0);
    }

    #[test]
    fn counts_are_sorted_by_frequency() {
        let s = summary();
        assert_eq!(s.by_house_type[0].0, "BYROAD");
        let counts: Vec<usize> = s.by_district.iter().map(|(_, n)| *n).collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn price_ranges_follow_bucket_order() {
        let s = summary();
        let ranks: Vec<usize> = s.by_price_range.iter().map(|(l, _)| bucket_rank(l)).collect();
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(s.area_by_price_range.len(), s.by_price_range.len());
    }

    #[test]
    fn grouped_means_cover_each_category() {
        let s = summary();
        let keys: Vec<&str> = s.grouped.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["BYROAD", "STREET_HOUSE", "TOWNHOUSE", "VILLA"]);
    }
}
