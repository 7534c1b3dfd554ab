//! User-controlled selection state for one dashboard session.
use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of calendar years. Only [`YearRange::new`] and the
/// clamping helpers build one, so `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min > max {
            return Err(MonitorError::InvalidYearRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Range covering both years, in whichever order they are given.
    pub fn spanning(a: i32, b: i32) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Clamp both ends into `[lo, hi]`, keeping `min <= max`.
    pub fn clamp_to(self, lo: i32, hi: i32) -> Self {
        let min = self.min.clamp(lo, hi);
        let max = self.max.clamp(min, hi);
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommodityFilter {
    #[default]
    All,
    Essential,
}

impl fmt::Display for CommodityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommodityFilter::All => write!(f, "All Commodities"),
            CommodityFilter::Essential => write!(f, "Essential Commodities"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub selected_countries: Vec<String>,
    pub year_range: YearRange,
    pub commodity_filter: CommodityFilter,
    pub selected_country: String,
    pub selected_year: i32,
    pub selected_region: Option<String>,
    pub selected_hist_year: i32,
}

/// The individual inputs a user can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectionField {
    Countries,
    YearRange,
    CommodityFilter,
    Country,
    Year,
    Region,
    HistYear,
}

/// One user interaction.
///
/// `MapClick` carries the region candidate taken from the clicked map
/// point, or `None` when the click did not resolve to a region.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange {
    Countries(Vec<String>),
    YearRange(YearRange),
    CommodityFilter(CommodityFilter),
    Country(String),
    Year(i32),
    MapClick(Option<String>),
    HistYear(i32),
}

impl SelectionChange {
    pub fn field(&self) -> SelectionField {
        match self {
            SelectionChange::Countries(_) => SelectionField::Countries,
            SelectionChange::YearRange(_) => SelectionField::YearRange,
            SelectionChange::CommodityFilter(_) => SelectionField::CommodityFilter,
            SelectionChange::Country(_) => SelectionField::Country,
            SelectionChange::Year(_) => SelectionField::Year,
            SelectionChange::MapClick(_) => SelectionField::Region,
            SelectionChange::HistYear(_) => SelectionField::HistYear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            YearRange::new(2022, 2020),
            Err(MonitorError::InvalidYearRange { min: 2022, max: 2020 })
        ));
        assert_eq!(YearRange::spanning(2022, 2020), YearRange::new(2020, 2022).unwrap());
        let r = YearRange::new(2020, 2020).unwrap();
        assert!(r.contains(2020));
        assert!(!r.contains(2021));
    }

    #[test]
    fn clamping_keeps_order() {
        let r = YearRange::new(1990, 2030).unwrap().clamp_to(2000, 2024);
        assert_eq!((r.min(), r.max()), (2000, 2024));
        let r = YearRange::new(2026, 2030).unwrap().clamp_to(2000, 2024);
        assert_eq!((r.min(), r.max()), (2024, 2024));
    }

    #[test]
    fn map_click_touches_region_field() {
        assert_eq!(
            SelectionChange::MapClick(Some("Nairobi".into())).field(),
            SelectionField::Region
        );
        assert_eq!(CommodityFilter::Essential.to_string(), "Essential Commodities");
    }
}
