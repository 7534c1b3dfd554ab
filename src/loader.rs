use crate::config::MonitorConfig;
use crate::dataset::Datasets;
use crate::error::Result;
use crate::types::{
    AffordabilityRecord, PriceRecord, RawAffordabilityRow, RawNutritionRow, RawPriceRow,
    UndernourishmentRecord,
};
use crate::util::{average, parse_date_safe, parse_f64_safe, parse_year_safe};
use csv::ReaderBuilder;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Row counts for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub prices: TableReport,
    pub imputed_coords: usize,
    pub undernourishment: TableReport,
    pub affordability: TableReport,
}

/// Load all three tables named by `config` and build the shared handle.
pub fn load_all(config: &MonitorConfig) -> Result<(Datasets, LoadReport)> {
    let (prices, price_report, imputed_coords) = load_prices(&config.prices_path())?;
    let (undernourishment, nutrition_report) = load_undernourishment(&config.nutrition_path())?;
    let (affordability, affordability_report) =
        load_affordability(&config.affordability_path())?;

    let report = LoadReport {
        prices: price_report,
        imputed_coords,
        undernourishment: nutrition_report,
        affordability: affordability_report,
    };
    info!(
        prices = report.prices.kept_rows,
        undernourishment = report.undernourishment.kept_rows,
        affordability = report.affordability.kept_rows,
        "datasets loaded"
    );
    let data = Datasets::new(prices, undernourishment, affordability)?;
    Ok((data, report))
}

pub fn load_prices(path: &Path) -> Result<(Vec<PriceRecord>, TableReport, usize)> {
    read_prices(File::open(path)?)
}

pub fn load_undernourishment(path: &Path) -> Result<(Vec<UndernourishmentRecord>, TableReport)> {
    read_undernourishment(File::open(path)?)
}

pub fn load_affordability(path: &Path) -> Result<(Vec<AffordabilityRecord>, TableReport)> {
    read_affordability(File::open(path)?)
}

/// Parse the price table. Rows without a country, a date or a numeric price
/// are skipped. Missing coordinates are filled from the mean of the same
/// region's other rows; the third element counts those imputations.
pub fn read_prices<R: Read>(reader: R) -> Result<(Vec<PriceRecord>, TableReport, usize)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut report = TableReport::default();
    let mut prelim: Vec<(PriceRecord, bool)> = Vec::new();

    for result in rdr.deserialize::<RawPriceRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => { report.parse_errors += 1; continue; }
        };

        let country = match row.country.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => { report.parse_errors += 1; continue; }
        };
        let date = match parse_date_safe(row.date.as_deref()) { Some(d) => d, None => { report.parse_errors += 1; continue; } };
        let price = match parse_f64_safe(row.usdprice.as_deref()) { Some(v) if v.is_finite() => v, _ => { report.parse_errors += 1; continue; } };

        let region = row.admin2.unwrap_or_else(|| "Unknown".to_string()).trim().to_string();
        let category = row.category.unwrap_or_else(|| "Unspecified".to_string()).trim().to_string();
        let commodity = row.commodity.unwrap_or_else(|| "Unspecified".to_string()).trim().to_string();
        let unit = row.unit.unwrap_or_default().trim().to_string();

        let lat = parse_f64_safe(row.latitude.as_deref());
        let lon = parse_f64_safe(row.longitude.as_deref());
        let has_coords = lat.is_some() && lon.is_some();

        prelim.push((
            PriceRecord {
                country,
                region,
                latitude: lat.unwrap_or(0.0),
                longitude: lon.unwrap_or(0.0),
                category,
                commodity,
                unit,
                date,
                price,
            },
            has_coords,
        ));
    }

    // Region averages for rows that came without coordinates.
    let mut by_region: HashMap<(String, String), (Vec<f64>, Vec<f64>)> = HashMap::new();
    for (r, has_coords) in &prelim {
        if *has_coords {
            let e = by_region.entry((r.country.clone(), r.region.clone())).or_default();
            e.0.push(r.latitude);
            e.1.push(r.longitude);
        }
    }

    let mut imputed_coords = 0usize;
    let mut records = Vec::with_capacity(prelim.len());
    for (mut r, has_coords) in prelim {
        if !has_coords {
            if let Some((lats, lons)) = by_region.get(&(r.country.clone(), r.region.clone())) {
                r.latitude = average(lats);
                r.longitude = average(lons);
                imputed_coords += 1;
            }
        }
        records.push(r);
    }

    report.kept_rows = records.len();
    if report.parse_errors > 0 {
        warn!(skipped = report.parse_errors, "price rows skipped due to parse errors");
    }
    Ok((records, report, imputed_coords))
}

/// Parse the FAOSTAT nutrition export and collapse it to one value per
/// (year, area). Values such as `"<2.5"` lose their `<` marker; a group
/// with no numeric value at all becomes 0.
pub fn read_undernourishment<R: Read>(
    reader: R,
) -> Result<(Vec<UndernourishmentRecord>, TableReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut report = TableReport::default();
    let mut groups: BTreeMap<(i32, String), Vec<f64>> = BTreeMap::new();

    for result in rdr.deserialize::<RawNutritionRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => { report.parse_errors += 1; continue; }
        };
        let area = match row.area.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => a.to_string(),
            _ => { report.parse_errors += 1; continue; }
        };
        let year = match parse_year_safe(row.year.as_deref()) { Some(y) => y, None => { report.parse_errors += 1; continue; } };
        let value = parse_f64_safe(row.value.as_deref().map(|v| v.trim().trim_start_matches('<')));

        let values = groups.entry((year, area)).or_default();
        if let Some(v) = value {
            values.push(v);
        }
    }

    let records: Vec<UndernourishmentRecord> = groups
        .into_iter()
        .map(|((year, area), values)| UndernourishmentRecord {
            area,
            year,
            value: average(&values),
        })
        .collect();

    report.kept_rows = records.len();
    if report.parse_errors > 0 {
        warn!(skipped = report.parse_errors, "nutrition rows skipped due to parse errors");
    }
    Ok((records, report))
}

pub fn read_affordability<R: Read>(reader: R) -> Result<(Vec<AffordabilityRecord>, TableReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut report = TableReport::default();
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawAffordabilityRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => { report.parse_errors += 1; continue; }
        };
        let country = match row.country.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => { report.parse_errors += 1; continue; }
        };
        let year = match parse_year_safe(row.year.as_deref()) { Some(y) => y, None => { report.parse_errors += 1; continue; } };
        let affordability_index = match parse_f64_safe(row.affordability_index.as_deref()) { Some(v) => v, None => { report.parse_errors += 1; continue; } };

        records.push(AffordabilityRecord { country, year, affordability_index });
    }

    report.kept_rows = records.len();
    if report.parse_errors > 0 {
        warn!(skipped = report.parse_errors, "affordability rows skipped due to parse errors");
    }
    Ok((records, report))
}
