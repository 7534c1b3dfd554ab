//! Filter/aggregation queries behind each chart.
//!
//! Every method is a pure function of the borrowed datasets and its
//! arguments. Empty selections produce empty results rather than errors.
use crate::config::QuerySettings;
use crate::dataset::Datasets;
use crate::selection::{CommodityFilter, YearRange};
use crate::types::{
    CategoryPrice, CommodityPrice, CountryAffordability, HistogramBin, PricePoint, PriceRecord,
    RegionPrice, SummaryStats, UndernourishmentPoint,
};
use crate::util::{average, percent_change, round_to};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

const PRICE_DECIMALS: i32 = 3;

pub struct Engine<'a> {
    data: &'a Datasets,
    settings: &'a QuerySettings,
}

impl<'a> Engine<'a> {
    pub fn new(data: &'a Datasets, settings: &'a QuerySettings) -> Self {
        Self { data, settings }
    }

    pub fn data(&self) -> &'a Datasets {
        self.data
    }

    /// Mean price per (country, date) over the selected countries and years.
    pub fn price_trend(
        &self,
        countries: &[String],
        years: YearRange,
        filter: CommodityFilter,
    ) -> Vec<PricePoint> {
        if countries.is_empty() {
            return Vec::new();
        }
        let wanted: HashSet<&str> = countries.iter().map(String::as_str).collect();
        let essential = &self.settings.essential_commodities;

        let mut groups: BTreeMap<(&str, NaiveDate), Vec<f64>> = BTreeMap::new();
        for p in self.data.prices() {
            if !wanted.contains(p.country.as_str()) || !years.contains(p.date.year()) {
                continue;
            }
            if filter == CommodityFilter::Essential && !essential.contains(&p.commodity) {
                continue;
            }
            groups.entry((p.country.as_str(), p.date)).or_default().push(p.price);
        }
        debug!(groups = groups.len(), "price trend computed");

        groups
            .into_iter()
            .map(|((country, date), prices)| PricePoint {
                country: country.to_string(),
                date,
                mean_price: round_to(average(&prices), PRICE_DECIMALS),
            })
            .collect()
    }

    /// Undernourishment share per (year, area), unrounded.
    pub fn undernourishment_trend(
        &self,
        countries: &[String],
        years: YearRange,
    ) -> Vec<UndernourishmentPoint> {
        if countries.is_empty() {
            return Vec::new();
        }
        let wanted: HashSet<&str> = countries.iter().map(String::as_str).collect();
        self.data
            .undernourishment()
            .iter()
            .filter(|u| wanted.contains(u.area.as_str()) && years.contains(u.year))
            .map(|u| UndernourishmentPoint {
                area: u.area.clone(),
                year: u.year,
                value: u.value,
            })
            .collect()
    }

    /// Mean price per region for the map. Coordinates come from the first
    /// row seen for each region.
    pub fn regional_map(&self, country: &str, year: i32) -> Vec<RegionPrice> {
        struct Acc {
            latitude: f64,
            longitude: f64,
            prices: Vec<f64>,
        }
        let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
        for p in self.data.prices_in(country, year) {
            groups
                .entry(p.region.as_str())
                .or_insert_with(|| Acc {
                    latitude: p.latitude,
                    longitude: p.longitude,
                    prices: Vec::new(),
                })
                .prices
                .push(p.price);
        }

        groups
            .into_iter()
            .map(|(region, acc)| {
                let mut mean = round_to(average(&acc.prices), PRICE_DECIMALS);
                if !mean.is_finite() {
                    mean = 0.0;
                }
                RegionPrice {
                    region: region.to_string(),
                    latitude: acc.latitude,
                    longitude: acc.longitude,
                    mean_price: mean,
                }
            })
            .collect()
    }

    /// Whether `candidate` is a region with observations for (country, year).
    pub fn region_is_valid(&self, country: &str, year: i32, candidate: &str) -> bool {
        self.data.regions_for(country, year).contains(candidate)
    }

    /// Raw prices per category for the box plot.
    pub fn category_distribution(
        &self,
        country: &str,
        year: i32,
        region: Option<&str>,
    ) -> Vec<CategoryPrice> {
        self.scoped_prices(country, year, region)
            .map(|p| CategoryPrice {
                category: p.category.clone(),
                price: round_to(p.price, PRICE_DECIMALS),
            })
            .collect()
    }

    /// Highest mean-priced (category, commodity, unit) groups, descending,
    /// truncated to `top_n`. Equal means keep their key order.
    pub fn top_commodities(
        &self,
        country: &str,
        year: i32,
        region: Option<&str>,
    ) -> Vec<CommodityPrice> {
        let mut groups: BTreeMap<(&str, &str, &str), Vec<f64>> = BTreeMap::new();
        for p in self.scoped_prices(country, year, region) {
            groups
                .entry((p.category.as_str(), p.commodity.as_str(), p.unit.as_str()))
                .or_default()
                .push(p.price);
        }

        let mut ranked: Vec<((&str, &str, &str), f64)> = groups
            .into_iter()
            .map(|(key, prices)| (key, average(&prices)))
            .collect();
        // `sort_by` is stable, so ties keep the grouped key order.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        ranked
            .into_iter()
            .take(self.settings.top_n)
            .map(|((category, commodity, unit), mean)| CommodityPrice {
                category: category.to_string(),
                commodity: commodity.to_string(),
                unit: unit.to_string(),
                mean_price: round_to(mean, PRICE_DECIMALS),
            })
            .collect()
    }

    /// Country + year rows, narrowed to `region` only when that region is
    /// valid for the pair. A stale region falls back to the whole country.
    fn scoped_prices<'q>(
        &'q self,
        country: &'q str,
        year: i32,
        region: Option<&'q str>,
    ) -> impl Iterator<Item = &'q PriceRecord> + 'q {
        let region = region.filter(|r| self.region_is_valid(country, year, r));
        if region.is_none() {
            debug!(country, year, "no region filter applied");
        }
        self.data
            .prices_in(country, year)
            .filter(move |p| region.map_or(true, |r| p.region == r))
    }

    /// Mean index and share of countries under the mean for `year`, with
    /// changes against the previous year when it exists.
    pub fn summary_stats(&self, year: i32) -> Option<SummaryStats> {
        let (mean_index, pct_under_mean) = self.year_figures(year)?;
        let prev = year.checked_sub(1).and_then(|y| self.year_figures(y));

        Some(SummaryStats {
            year,
            mean_index,
            pct_under_mean,
            mean_index_change: prev
                .and_then(|(prev_mean, _)| percent_change(mean_index, Some(prev_mean))),
            pct_under_change: prev.map(|(_, prev_pct)| pct_under_mean - prev_pct),
        })
    }

    fn year_figures(&self, year: i32) -> Option<(f64, f64)> {
        let values: Vec<f64> = self
            .data
            .affordability()
            .iter()
            .filter(|a| a.year == year)
            .map(|a| a.affordability_index)
            .collect();
        if values.is_empty() {
            return None;
        }
        let mean = average(&values);
        let under = values.iter().filter(|v| **v < mean).count();
        Some((mean, under as f64 / values.len() as f64 * 100.0))
    }

    /// Affordability index of one country-year with its year-over-year growth.
    pub fn country_affordability(&self, country: &str, year: i32) -> Option<CountryAffordability> {
        let lookup = |y: i32| {
            self.data
                .affordability()
                .iter()
                .find(|a| a.country == country && a.year == y)
                .map(|a| a.affordability_index)
        };
        let index = lookup(year)?;
        Some(CountryAffordability {
            country: country.to_string(),
            year,
            index,
            yoy_growth: percent_change(index, year.checked_sub(1).and_then(lookup)),
        })
    }

    /// Equal-width histogram of the year's affordability values.
    pub fn affordability_histogram(&self, year: i32) -> Vec<HistogramBin> {
        let values: Vec<f64> = self
            .data
            .affordability()
            .iter()
            .filter(|a| a.year == year && a.affordability_index.is_finite())
            .map(|a| a.affordability_index)
            .collect();
        if values.is_empty() {
            return Vec::new();
        }
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if hi - lo <= f64::EPSILON {
            return vec![HistogramBin { lower: lo, upper: hi, count: values.len() }];
        }

        let bins = self.settings.histogram_bins.max(1);
        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in &values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lo + width * i as f64,
                upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
                count,
            })
            .collect()
    }

    /// Country choices for the global tab under a commodity filter.
    pub fn country_options(&self, filter: CommodityFilter) -> Vec<String> {
        match filter {
            CommodityFilter::All => self.data.countries().to_vec(),
            CommodityFilter::Essential => {
                let mut countries: Vec<String> = self
                    .settings
                    .essential_commodities
                    .iter()
                    .filter_map(|c| self.data.countries_for_commodity(c))
                    .flatten()
                    .cloned()
                    .collect();
                countries.sort();
                countries.dedup();
                countries
            }
        }
    }
}
