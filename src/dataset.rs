//! Immutable, load-once data handle.
//!
//! `Datasets` is built once at start-up and only ever borrowed afterwards,
//! so any number of sessions can query it at the same time.
use crate::error::{MonitorError, Result};
use crate::types::{AffordabilityRecord, PriceRecord, UndernourishmentRecord};
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug)]
pub struct Datasets {
    prices: Vec<PriceRecord>,
    undernourishment: Vec<UndernourishmentRecord>,
    affordability: Vec<AffordabilityRecord>,
    countries: Vec<String>,
    min_year: i32,
    max_year: i32,
    commodity_countries: BTreeMap<String, BTreeSet<String>>,
}

impl Datasets {
    /// Derive the global lookups from the price table.
    ///
    /// Fails only when the price table is empty, since every year bound and
    /// country list is derived from it.
    pub fn new(
        prices: Vec<PriceRecord>,
        undernourishment: Vec<UndernourishmentRecord>,
        affordability: Vec<AffordabilityRecord>,
    ) -> Result<Self> {
        let (min_year, max_year) = prices
            .iter()
            .map(|p| p.date.year())
            .fold(None, |acc: Option<(i32, i32)>, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
            .ok_or(MonitorError::EmptyDataset("prices"))?;

        let countries: BTreeSet<&str> = prices.iter().map(|p| p.country.as_str()).collect();
        let countries = countries.into_iter().map(str::to_string).collect();

        let mut commodity_countries: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for p in &prices {
            commodity_countries
                .entry(p.commodity.clone())
                .or_default()
                .insert(p.country.clone());
        }

        Ok(Self {
            prices,
            undernourishment,
            affordability,
            countries,
            min_year,
            max_year,
            commodity_countries,
        })
    }

    pub fn prices(&self) -> &[PriceRecord] {
        &self.prices
    }

    pub fn undernourishment(&self) -> &[UndernourishmentRecord] {
        &self.undernourishment
    }

    pub fn affordability(&self) -> &[AffordabilityRecord] {
        &self.affordability
    }

    /// Every country in the price table, sorted.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn has_country(&self, country: &str) -> bool {
        self.countries
            .binary_search_by(|c| c.as_str().cmp(country))
            .is_ok()
    }

    pub fn year_bounds(&self) -> (i32, i32) {
        (self.min_year, self.max_year)
    }

    /// Countries observed for a commodity, `None` when it never appears.
    pub fn countries_for_commodity(&self, commodity: &str) -> Option<&BTreeSet<String>> {
        self.commodity_countries.get(commodity)
    }

    /// Years with price observations for `country`, most recent first.
    pub fn years_for_country(&self, country: &str) -> Vec<i32> {
        let years: BTreeSet<i32> = self
            .prices
            .iter()
            .filter(|p| p.country == country)
            .map(|p| p.date.year())
            .collect();
        years.into_iter().rev().collect()
    }

    /// Years present in the affordability table, most recent first.
    pub fn affordability_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.affordability.iter().map(|a| a.year).collect();
        years.into_iter().rev().collect()
    }

    /// Price rows for one country in one calendar year, in source order.
    pub fn prices_in<'a>(
        &'a self,
        country: &'a str,
        year: i32,
    ) -> impl Iterator<Item = &'a PriceRecord> + 'a {
        self.prices
            .iter()
            .filter(move |p| p.country == country && p.date.year() == year)
    }

    /// Regions (admin2) observed for one country in one year.
    pub fn regions_for<'a>(&'a self, country: &'a str, year: i32) -> BTreeSet<&'a str> {
        self.prices_in(country, year)
            .map(|p| p.region.as_str())
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::price;
    use super::*;

    fn sample() -> Datasets {
        Datasets::new(
            vec![
                price("Kenya", "Nairobi", "cereals and tubers", "Rice", (2020, 1, 15), 1.0),
                price("Kenya", "Mombasa", "cereals and tubers", "Rice", (2022, 1, 15), 1.2),
                price("Chad", "Ndjamena", "oil and fats", "Oil (vegetable)", (2019, 6, 15), 2.0),
            ],
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn empty_price_table_is_rejected() {
        let err = Datasets::new(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, MonitorError::EmptyDataset("prices")));
    }

    #[test]
    fn derives_global_bounds_and_countries() {
        let data = sample();
        assert_eq!(data.year_bounds(), (2019, 2022));
        assert_eq!(data.countries(), &["Chad".to_string(), "Kenya".to_string()]);
        assert!(data.has_country("Kenya"));
        assert!(!data.has_country("Peru"));
    }

    #[test]
    fn years_for_country_are_descending() {
        let data = sample();
        assert_eq!(data.years_for_country("Kenya"), vec![2022, 2020]);
        assert!(data.years_for_country("Peru").is_empty());
    }

    #[test]
    fn regions_are_scoped_to_country_and_year() {
        let data = sample();
        let regions = data.regions_for("Kenya", 2020);
        assert!(regions.contains("Nairobi"));
        assert!(!regions.contains("Mombasa"));
    }

    #[test]
    fn indexes_countries_by_commodity() {
        let data = sample();
        let rice = data.countries_for_commodity("Rice").unwrap();
        assert_eq!(rice.len(), 1);
        assert!(rice.contains("Kenya"));
        assert!(data.countries_for_commodity("Salt").is_none());
    }
}
