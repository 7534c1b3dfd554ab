use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Deserialize)]
pub struct RawPriceRow {
    #[serde(rename = "country")]
    pub country: Option<String>,
    #[serde(rename = "admin2")]
    pub admin2: Option<String>,
    #[serde(rename = "latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "category")]
    pub category: Option<String>,
    #[serde(rename = "commodity")]
    pub commodity: Option<String>,
    #[serde(rename = "unit", alias = "Unit")]
    pub unit: Option<String>,
    #[serde(rename = "date")]
    pub date: Option<String>,
    #[serde(rename = "usdprice")]
    pub usdprice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawNutritionRow {
    #[serde(rename = "Area")]
    pub area: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Value")]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawAffordabilityRow {
    #[serde(rename = "country")]
    pub country: Option<String>,
    #[serde(rename = "year")]
    pub year: Option<String>,
    #[serde(rename = "affordability_index")]
    pub affordability_index: Option<String>,
}

/// One observed commodity price, normalized to USD.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub country: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub commodity: String,
    pub unit: String,
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UndernourishmentRecord {
    pub area: String,
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffordabilityRecord {
    pub country: String,
    pub year: i32,
    pub affordability_index: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct PricePoint {
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "AvgUsdPrice")]
    #[tabled(rename = "AvgUsdPrice")]
    pub mean_price: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct UndernourishmentPoint {
    #[serde(rename = "Area")]
    #[tabled(rename = "Area")]
    pub area: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RegionPrice {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Latitude")]
    #[tabled(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    #[tabled(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "AvgUsdPrice")]
    #[tabled(rename = "AvgUsdPrice")]
    pub mean_price: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CategoryPrice {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "UsdPrice")]
    #[tabled(rename = "UsdPrice")]
    pub price: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CommodityPrice {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Commodity")]
    #[tabled(rename = "Commodity")]
    pub commodity: String,
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "AvgUsdPrice")]
    #[tabled(rename = "AvgUsdPrice")]
    pub mean_price: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct HistogramBin {
    #[serde(rename = "Lower")]
    #[tabled(rename = "Lower")]
    pub lower: f64,
    #[serde(rename = "Upper")]
    #[tabled(rename = "Upper")]
    pub upper: f64,
    #[serde(rename = "Countries")]
    #[tabled(rename = "Countries")]
    pub count: usize,
}

/// Year-level affordability figures. Change fields are `None` when the
/// previous year is missing (or, for the relative change, when its mean is zero).
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryStats {
    pub year: i32,
    pub mean_index: f64,
    pub pct_under_mean: f64,
    pub mean_index_change: Option<f64>,
    pub pct_under_change: Option<f64>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CountryAffordability {
    pub country: String,
    pub year: i32,
    pub index: f64,
    pub yoy_growth: Option<f64>,
}
