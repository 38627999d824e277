//! Derive the one-hot feature list a pre-encoded model expects.
//!
//! Mirrors how such models are trained: plain numeric columns first, then one
//! dummy column per category of each categorical field, categories sorted.

use std::collections::BTreeSet;

use crate::align::layout::{DUMMY_SOURCES, PASSTHROUGH_SOURCES, dummy_column};
use crate::io::dataset::{Dataset, Listing};

pub fn derive_feature_list(dataset: &Dataset) -> Vec<String> {
    let mut names: Vec<String> = PASSTHROUGH_SOURCES.iter().map(|s| s.to_string()).collect();

    for source in DUMMY_SOURCES {
        let categories: BTreeSet<&str> = dataset
            .listings
            .iter()
            .filter_map(|l| categorical_value(l, source))
            .collect();
        names.extend(categories.into_iter().map(|c| dummy_column(source, c)));
    }

    names
}

fn categorical_value<'a>(listing: &'a Listing, source: &str) -> Option<&'a str> {
    let value = match source {
        "District" => &listing.district,
        "Ward" => &listing.ward,
        "House_type" => &listing.house_type,
        "Legal_documents" => &listing.legal_documents,
        "Day_Of_Week" => &listing.day_of_week,
        _ => return None,
    };
    Some(value.as_str()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dataset::load_dataset;
    use std::path::Path;

    #[test]
    fn numeric_columns_come_first_then_sorted_dummies() {
        let ds = load_dataset(Path::new("data/cleaned_data.csv")).unwrap();
        let names = derive_feature_list(&ds);

        assert_eq!(&names[..4], &["No_floor", "No_bedroom", "Month", "Region"]);
        assert_eq!(names[4], "District_BA ĐÌNH");

        let house_types: Vec<&str> = names
            .iter()
            .filter(|n| n.starts_with("House_type_"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            house_types,
            vec!["House_type_BYROAD", "House_type_STREET_HOUSE", "House_type_TOWNHOUSE", "House_type_VILLA"]
        );

        // The misspelled district is its own dummy column.
        assert!(names.iter().any(|n| n == "District_CẦU GIÂY"));
        assert!(names.iter().any(|n| n == "District_CẦU GIẤY"));
    }
}
