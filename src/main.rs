// Command-line front end.
//
// Every command loads the three tables once, starts a dispatcher on the
// default selection, applies the requested changes and prints the views
// that changed. `session` keeps the dispatcher alive in a menu loop so
// changes can be chained the way a dashboard user would.
use anyhow::Context;
use clap::{Parser, Subcommand};
use food_monitor::loader::{self, LoadReport};
use food_monitor::output;
use food_monitor::util::format_int;
use food_monitor::{
    CommodityFilter, Datasets, Dispatcher, Engine, MonitorConfig, SelectionChange, View,
    ViewData, YearRange,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

const PREVIEW_ROWS: usize = 10;

/// Food price monitor: price trends, undernourishment and affordability views.
#[derive(Parser, Debug)]
#[command(name = "food-monitor", version, about)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the processed CSV tables.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the tables and report row counts.
    Load,
    /// Global price and undernourishment trends.
    Global {
        #[arg(long, value_delimiter = ',')]
        countries: Vec<String>,
        #[arg(long)]
        from: Option<i32>,
        #[arg(long)]
        to: Option<i32>,
        /// Only essential commodities.
        #[arg(long)]
        essential: bool,
    },
    /// Regional map, category distribution and top commodities for a country.
    Country {
        #[arg(long)]
        country: String,
        #[arg(long)]
        year: Option<i32>,
        /// Region to drill down into, as if clicked on the map.
        #[arg(long)]
        region: Option<String>,
    },
    /// Affordability histogram and summary statistics.
    Affordability {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Write every view of the default selection to the output directory.
    Export,
    /// Interactive session.
    Session,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => MonitorConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let (data, report) = loader::load_all(&config).context("loading datasets")?;
    let settings = config.query_settings();
    let engine = Engine::new(&data, &settings);
    let mut dispatcher = Dispatcher::new(engine, &config.default_countries);

    match cli.command {
        Commands::Load => print_load_report(&data, &report),
        Commands::Global { countries, from, to, essential } => {
            let (lo, hi) = data.year_bounds();
            let range = YearRange::new(from.unwrap_or(lo), to.unwrap_or(hi))?;
            if !countries.is_empty() {
                dispatcher.apply(SelectionChange::Countries(countries))?;
            }
            dispatcher.apply(SelectionChange::YearRange(range))?;
            if essential {
                dispatcher.apply(SelectionChange::CommodityFilter(CommodityFilter::Essential))?;
            }
            print_views(&dispatcher, &[View::PriceChart, View::UndernourishmentChart]);
        }
        Commands::Country { country, year, region } => {
            dispatcher.apply(SelectionChange::Country(country))?;
            if let Some(year) = year {
                dispatcher.apply(SelectionChange::Year(year))?;
            }
            if region.is_some() {
                dispatcher.apply(SelectionChange::MapClick(region))?;
            }
            print_views(
                &dispatcher,
                &[View::YearOptions, View::Map, View::BoxPlot, View::BarPlot, View::CountryInfo],
            );
        }
        Commands::Affordability { year } => {
            if let Some(year) = year {
                dispatcher.apply(SelectionChange::HistYear(year))?;
            }
            print_views(&dispatcher, &[View::Histogram, View::SummaryStats]);
        }
        Commands::Export => export(&dispatcher, &config)?,
        Commands::Session => run_session(&mut dispatcher),
    }
    Ok(())
}

fn print_load_report(data: &Datasets, report: &LoadReport) {
    let (lo, hi) = data.year_bounds();
    println!(
        "Prices: {} rows loaded ({} skipped), {} countries, {}–{}",
        format_int(report.prices.kept_rows),
        format_int(report.prices.parse_errors),
        format_int(data.countries().len()),
        lo,
        hi
    );
    if report.imputed_coords > 0 {
        println!("Info: Imputed coordinates for {} rows.", format_int(report.imputed_coords));
    }
    println!(
        "Undernourishment: {} country-years ({} rows skipped)",
        format_int(report.undernourishment.kept_rows),
        format_int(report.undernourishment.parse_errors)
    );
    println!(
        "Affordability: {} rows ({} skipped)\n",
        format_int(report.affordability.kept_rows),
        format_int(report.affordability.parse_errors)
    );
}

fn print_views(dispatcher: &Dispatcher<'_>, views: &[View]) {
    for view in views {
        print_view(&dispatcher.render(*view));
    }
}

fn print_view(data: &ViewData) {
    match data {
        ViewData::CountryOptions(countries) => {
            println!("Countries: {}\n", countries.join(", "));
        }
        ViewData::PriceChart(rows) => {
            println!("Global Changes in Commodity Prices");
            output::preview_table_rows(rows, PREVIEW_ROWS);
        }
        ViewData::UndernourishmentChart(rows) => {
            println!("Share of the population that is undernourished");
            output::preview_table_rows(rows, PREVIEW_ROWS);
        }
        ViewData::YearOptions(years) => {
            let years: Vec<String> = years.iter().map(|y| y.to_string()).collect();
            println!("Years: {}\n", years.join(", "));
        }
        ViewData::Map(rows) => {
            println!("Average Price by Region");
            output::preview_table_rows(rows, PREVIEW_ROWS);
        }
        ViewData::BoxPlot(rows) => {
            println!("Price Distribution by Food Category");
            output::preview_table_rows(rows, PREVIEW_ROWS);
        }
        ViewData::BarPlot(rows) => {
            println!("Top Commodities by Average Price");
            output::preview_table_rows(rows, PREVIEW_ROWS);
        }
        ViewData::CountryInfo(card) => output::print_country_card(card.as_ref()),
        ViewData::Histogram(bins) => {
            println!("Distribution of Affordability Ratios");
            output::preview_table_rows(bins, bins.len());
        }
        ViewData::SummaryStats(stats) => output::print_summary(stats.as_ref()),
    }
}

#[derive(Serialize)]
struct ExportSummary<'a> {
    selection: &'a food_monitor::Selection,
    summary: Option<food_monitor::types::SummaryStats>,
    summary_text: Option<output::SummaryText>,
    country: Option<food_monitor::types::CountryAffordability>,
}

fn export(dispatcher: &Dispatcher<'_>, config: &MonitorConfig) -> anyhow::Result<()> {
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut summary = None;
    let mut country = None;
    for data in dispatcher.render_all() {
        match data {
            ViewData::PriceChart(rows) => output::write_csv(&dir.join("price_trend.csv"), &rows)?,
            ViewData::UndernourishmentChart(rows) => {
                output::write_csv(&dir.join("undernourishment.csv"), &rows)?
            }
            ViewData::Map(rows) => output::write_csv(&dir.join("regional_map.csv"), &rows)?,
            ViewData::BoxPlot(rows) => {
                output::write_csv(&dir.join("category_distribution.csv"), &rows)?
            }
            ViewData::BarPlot(rows) => output::write_csv(&dir.join("top_commodities.csv"), &rows)?,
            ViewData::Histogram(rows) => {
                output::write_csv(&dir.join("affordability_histogram.csv"), &rows)?
            }
            ViewData::SummaryStats(stats) => summary = stats,
            ViewData::CountryInfo(card) => country = card,
            ViewData::CountryOptions(_) | ViewData::YearOptions(_) => {}
        }
    }

    let export = ExportSummary {
        selection: dispatcher.selection(),
        summary_text: summary.as_ref().map(output::SummaryText::from_stats),
        summary,
        country,
    };
    output::write_json(&dir.join("summary.json"), &export)?;
    println!("Outputs saved to {}", dir.display());
    Ok(())
}

/// Print a prompt and read one trimmed line. `None` once stdin is closed.
fn prompt(label: &str) -> Option<String> {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_change(choice: &str) -> Option<SelectionChange> {
    match choice {
        "1" => {
            let raw = prompt("Countries (comma separated)")?;
            let countries = raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            Some(SelectionChange::Countries(countries))
        }
        "2" => {
            let from = prompt("From year")?.parse().ok()?;
            let to = prompt("To year")?.parse().ok()?;
            match YearRange::new(from, to) {
                Ok(range) => Some(SelectionChange::YearRange(range)),
                Err(e) => {
                    println!("{}\n", e);
                    None
                }
            }
        }
        "3" => {
            let filter = match prompt("Commodities ([1] All, [2] Essential)")?.as_str() {
                "2" => CommodityFilter::Essential,
                _ => CommodityFilter::All,
            };
            Some(SelectionChange::CommodityFilter(filter))
        }
        "4" => Some(SelectionChange::Country(prompt("Country")?)),
        "5" => prompt("Year")?.parse().ok().map(SelectionChange::Year),
        "6" => {
            let region = prompt("Region (empty to clear)")?;
            Some(SelectionChange::MapClick((!region.is_empty()).then_some(region)))
        }
        "7" => prompt("Affordability year")?.parse().ok().map(SelectionChange::HistYear),
        _ => None,
    }
}

fn run_session(dispatcher: &mut Dispatcher<'_>) {
    for data in dispatcher.render_all() {
        print_view(&data);
    }
    loop {
        println!("[1] Countries  [2] Year range  [3] Commodity filter");
        println!("[4] Country    [5] Year        [6] Map region");
        println!("[7] Affordability year  [8] Show all  [0] Exit\n");
        let Some(choice) = prompt("Enter choice") else {
            break;
        };
        match choice.as_str() {
            "0" => {
                println!("Exiting the program.");
                break;
            }
            "8" => {
                for data in dispatcher.render_all() {
                    print_view(&data);
                }
            }
            _ => match read_change(&choice) {
                Some(change) => match dispatcher.apply(change) {
                    Ok(updates) => updates.iter().for_each(print_view),
                    Err(e) => println!("Error: {}\n", e),
                },
                None => println!("Invalid choice.\n"),
            },
        }
    }
}
