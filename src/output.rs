use crate::error::Result;
use crate::types::{CountryAffordability, SummaryStats};
use crate::util::{format_number, format_signed_pct, format_yoy, Trend};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no data)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Display strings for the affordability summary cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryText {
    pub mean_index: String,
    pub pct_under_mean: String,
    pub mean_index_change: String,
    pub pct_under_change: String,
    #[serde(skip)]
    pub mean_index_trend: Option<Trend>,
    #[serde(skip)]
    pub pct_under_trend: Option<Trend>,
}

impl SummaryText {
    pub fn from_stats(stats: &SummaryStats) -> Self {
        Self {
            mean_index: format_number(stats.mean_index, 2),
            pct_under_mean: format!("{:.1}%", stats.pct_under_mean),
            mean_index_change: format_signed_pct(stats.mean_index_change),
            pct_under_change: format_signed_pct(stats.pct_under_change),
            mean_index_trend: stats.mean_index_change.map(Trend::of),
            pct_under_trend: stats.pct_under_change.map(Trend::of),
        }
    }
}

pub fn print_summary(stats: Option<&SummaryStats>) {
    let Some(stats) = stats else {
        println!("No affordability data for the selected year.\n");
        return;
    };
    let text = SummaryText::from_stats(stats);
    println!("Affordability Summary ({})", stats.year);
    println!("  Average index:            {} {}", text.mean_index, text.mean_index_change);
    println!("  Countries under average:  {} {}", text.pct_under_mean, text.pct_under_change);
    println!();
}

pub fn print_country_card(card: Option<&CountryAffordability>) {
    match card {
        Some(c) => {
            println!("Affordability Index for {} ({})", c.country, c.year);
            println!("  {}", format_number(c.index, 2));
            println!("  YoY Growth: {}\n", format_yoy(c.yoy_growth));
        }
        None => println!("No data available\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;
    use chrono::NaiveDate;

    #[test]
    fn summary_text_leaves_missing_changes_empty() {
        let stats = SummaryStats {
            year: 2020,
            mean_index: 2.5,
            pct_under_mean: 50.0,
            mean_index_change: None,
            pct_under_change: None,
        };
        let text = SummaryText::from_stats(&stats);
        assert_eq!(text.mean_index, "2.50");
        assert_eq!(text.pct_under_mean, "50.0%");
        assert_eq!(text.mean_index_change, "");
        assert_eq!(text.pct_under_trend, None);
    }

    #[test]
    fn summary_text_signs_changes() {
        let stats = SummaryStats {
            year: 2021,
            mean_index: 3.0,
            pct_under_mean: 40.0,
            mean_index_change: Some(20.0),
            pct_under_change: Some(-10.0),
        };
        let text = SummaryText::from_stats(&stats);
        assert_eq!(text.mean_index_change, "+20.00%");
        assert_eq!(text.pct_under_change, "-10.00%");
        assert_eq!(text.mean_index_trend, Some(Trend::Up));
        assert_eq!(text.pct_under_trend, Some(Trend::Down));
    }

    #[test]
    fn csv_rows_use_renamed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.csv");
        let rows = vec![PricePoint {
            country: "Chad".into(),
            date: NaiveDate::from_ymd_opt(2021, 1, 15).unwrap(),
            mean_price: 1.25,
        }];
        write_csv(&path, &rows).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Country,Date,AvgUsdPrice\nChad,2021-01-15,1.25\n");
    }
}
