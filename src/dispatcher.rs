//! Session-level view dispatcher.
//!
//! Owns one session's [`Selection`] and recomputes only the views that a
//! change invalidates. The wiring between inputs and views is the explicit
//! table in [`dependents`].
use crate::drilldown::DrillDown;
use crate::engine::Engine;
use crate::error::{MonitorError, Result};
use crate::selection::{CommodityFilter, Selection, SelectionChange, SelectionField, YearRange};
use crate::types::{
    CategoryPrice, CommodityPrice, CountryAffordability, HistogramBin, PricePoint, RegionPrice,
    SummaryStats, UndernourishmentPoint,
};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum View {
    CountryOptions,
    PriceChart,
    UndernourishmentChart,
    YearOptions,
    Map,
    BoxPlot,
    BarPlot,
    CountryInfo,
    Histogram,
    SummaryStats,
}

impl View {
    pub const ALL: [View; 10] = [
        View::CountryOptions,
        View::PriceChart,
        View::UndernourishmentChart,
        View::YearOptions,
        View::Map,
        View::BoxPlot,
        View::BarPlot,
        View::CountryInfo,
        View::Histogram,
        View::SummaryStats,
    ];
}

/// Views that must be recomputed when `field` changes.
pub fn dependents(field: SelectionField) -> &'static [View] {
    match field {
        SelectionField::Countries => &[View::PriceChart, View::UndernourishmentChart],
        SelectionField::YearRange => &[View::PriceChart, View::UndernourishmentChart],
        SelectionField::CommodityFilter => &[View::CountryOptions, View::PriceChart],
        SelectionField::Country => &[
            View::YearOptions,
            View::Map,
            View::BoxPlot,
            View::BarPlot,
            View::CountryInfo,
        ],
        SelectionField::Year => &[View::Map, View::BoxPlot, View::BarPlot, View::CountryInfo],
        SelectionField::Region => &[View::BoxPlot, View::BarPlot],
        SelectionField::HistYear => &[View::Histogram, View::SummaryStats],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    CountryOptions(Vec<String>),
    PriceChart(Vec<PricePoint>),
    UndernourishmentChart(Vec<UndernourishmentPoint>),
    YearOptions(Vec<i32>),
    Map(Vec<RegionPrice>),
    BoxPlot(Vec<CategoryPrice>),
    BarPlot(Vec<CommodityPrice>),
    CountryInfo(Option<CountryAffordability>),
    Histogram(Vec<HistogramBin>),
    SummaryStats(Option<SummaryStats>),
}

impl ViewData {
    pub fn view(&self) -> View {
        match self {
            ViewData::CountryOptions(_) => View::CountryOptions,
            ViewData::PriceChart(_) => View::PriceChart,
            ViewData::UndernourishmentChart(_) => View::UndernourishmentChart,
            ViewData::YearOptions(_) => View::YearOptions,
            ViewData::Map(_) => View::Map,
            ViewData::BoxPlot(_) => View::BoxPlot,
            ViewData::BarPlot(_) => View::BarPlot,
            ViewData::CountryInfo(_) => View::CountryInfo,
            ViewData::Histogram(_) => View::Histogram,
            ViewData::SummaryStats(_) => View::SummaryStats,
        }
    }
}

pub struct Dispatcher<'a> {
    engine: Engine<'a>,
    selection: Selection,
    previous: Option<Selection>,
    drilldown: DrillDown,
}

impl<'a> Dispatcher<'a> {
    /// Start a session on the default selection: the preferred countries
    /// that exist in the data (or the first four), the full year range,
    /// the first country with its latest year and the latest
    /// affordability year.
    pub fn new(engine: Engine<'a>, preferred_countries: &[String]) -> Self {
        let data = engine.data();
        let mut selected_countries: Vec<String> = preferred_countries
            .iter()
            .filter(|c| data.has_country(c))
            .cloned()
            .collect();
        if selected_countries.is_empty() {
            selected_countries = data.countries().iter().take(4).cloned().collect();
        }

        let (min_year, max_year) = data.year_bounds();
        let selected_country = data.countries().first().cloned().unwrap_or_default();
        let selected_year = data
            .years_for_country(&selected_country)
            .first()
            .copied()
            .unwrap_or(max_year);
        let selected_hist_year = data
            .affordability_years()
            .first()
            .copied()
            .unwrap_or(max_year);

        let selection = Selection {
            selected_countries,
            year_range: YearRange::spanning(min_year, max_year),
            commodity_filter: CommodityFilter::All,
            selected_country,
            selected_year,
            selected_region: None,
            selected_hist_year,
        };

        Self {
            engine,
            selection,
            previous: None,
            drilldown: DrillDown::default(),
        }
    }

    pub fn engine(&self) -> &Engine<'a> {
        &self.engine
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The selection as it was before the last applied change.
    pub fn previous(&self) -> Option<&Selection> {
        self.previous.as_ref()
    }

    pub fn drilldown(&self) -> &DrillDown {
        &self.drilldown
    }

    /// Years offered for the country tab, most recent first.
    pub fn year_options(&self) -> Vec<i32> {
        self.engine
            .data()
            .years_for_country(&self.selection.selected_country)
    }

    /// Apply one interaction and return the recomputed views, in
    /// [`View`] order.
    pub fn apply(&mut self, change: SelectionChange) -> Result<Vec<ViewData>> {
        let mut touched = BTreeSet::from([change.field()]);
        let data = self.engine.data();
        let mut next = self.selection.clone();

        match change {
            SelectionChange::Countries(countries) => next.selected_countries = countries,
            SelectionChange::YearRange(range) => {
                let (lo, hi) = data.year_bounds();
                next.year_range = range.clamp_to(lo, hi);
            }
            SelectionChange::CommodityFilter(filter) => next.commodity_filter = filter,
            SelectionChange::Country(country) => {
                if !data.has_country(&country) {
                    return Err(MonitorError::UnknownCountry(country));
                }
                // A new country always starts on its most recent year.
                if let Some(latest) = data.years_for_country(&country).first() {
                    next.selected_year = *latest;
                }
                next.selected_country = country;
                touched.insert(SelectionField::Year);
                self.drilldown
                    .on_context_change(&self.engine, &next.selected_country, next.selected_year);
            }
            SelectionChange::Year(year) => {
                next.selected_year = year;
                self.drilldown
                    .on_context_change(&self.engine, &next.selected_country, year);
            }
            SelectionChange::MapClick(candidate) => {
                self.drilldown.on_map_click(
                    &self.engine,
                    &next.selected_country,
                    next.selected_year,
                    candidate.as_deref(),
                );
            }
            SelectionChange::HistYear(year) => next.selected_hist_year = year,
        }
        next.selected_region = self.drilldown.region().map(str::to_string);

        self.previous = Some(std::mem::replace(&mut self.selection, next));

        let invalidated: BTreeSet<View> = touched
            .iter()
            .flat_map(|field| dependents(*field).iter().copied())
            .collect();
        info!(fields = ?touched, views = invalidated.len(), "recomputing views");

        Ok(invalidated.into_iter().map(|view| self.render(view)).collect())
    }

    /// Compute every view for the current selection.
    pub fn render_all(&self) -> Vec<ViewData> {
        View::ALL.iter().map(|view| self.render(*view)).collect()
    }

    pub fn render(&self, view: View) -> ViewData {
        let s = &self.selection;
        let region = s.selected_region.as_deref();
        match view {
            View::CountryOptions => {
                ViewData::CountryOptions(self.engine.country_options(s.commodity_filter))
            }
            View::PriceChart => ViewData::PriceChart(self.engine.price_trend(
                &s.selected_countries,
                s.year_range,
                s.commodity_filter,
            )),
            View::UndernourishmentChart => ViewData::UndernourishmentChart(
                self.engine
                    .undernourishment_trend(&s.selected_countries, s.year_range),
            ),
            View::YearOptions => ViewData::YearOptions(self.year_options()),
            View::Map => {
                ViewData::Map(self.engine.regional_map(&s.selected_country, s.selected_year))
            }
            View::BoxPlot => ViewData::BoxPlot(self.engine.category_distribution(
                &s.selected_country,
                s.selected_year,
                region,
            )),
            View::BarPlot => ViewData::BarPlot(self.engine.top_commodities(
                &s.selected_country,
                s.selected_year,
                region,
            )),
            View::CountryInfo => ViewData::CountryInfo(
                self.engine
                    .country_affordability(&s.selected_country, s.selected_year),
            ),
            View::Histogram => {
                ViewData::Histogram(self.engine.affordability_histogram(s.selected_hist_year))
            }
            View::SummaryStats => {
                ViewData::SummaryStats(self.engine.summary_stats(s.selected_hist_year))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuerySettings;
    use crate::dataset::fixtures::{affordability, price, undernourishment};
    use crate::dataset::Datasets;

    fn data() -> Datasets {
        Datasets::new(
            vec![
                price("Chad", "Ndjamena", "cereals and tubers", "Rice", (2019, 1, 15), 0.9),
                price("Chad", "Ndjamena", "cereals and tubers", "Rice", (2021, 1, 15), 1.1),
                price("Chad", "Moundou", "oil and fats", "Oil (vegetable)", (2021, 1, 15), 2.0),
                price("Chad", "Abeche", "cereals and tubers", "Sorghum", (2020, 1, 15), 0.4),
                price("Kenya", "Nairobi", "cereals and tubers", "Rice", (2022, 3, 15), 1.3),
                price("Kenya", "Nairobi", "cereals and tubers", "Maize", (2018, 3, 15), 0.3),
            ],
            vec![undernourishment("Chad", 2020, 31.0), undernourishment("Kenya", 2020, 27.0)],
            vec![
                affordability("Chad", 2020, 2.0),
                affordability("Chad", 2021, 3.0),
                affordability("Kenya", 2021, 1.0),
            ],
        )
        .unwrap()
    }

    fn views(updates: &[ViewData]) -> Vec<View> {
        updates.iter().map(ViewData::view).collect()
    }

    #[test]
    fn default_selection_follows_the_data() {
        let data = data();
        let settings = QuerySettings::default();
        let preferred = vec!["Kenya".to_string(), "Peru".to_string()];
        let dispatcher = Dispatcher::new(Engine::new(&data, &settings), &preferred);
        let s = dispatcher.selection();
        assert_eq!(s.selected_countries, vec!["Kenya"]);
        assert_eq!((s.year_range.min(), s.year_range.max()), (2018, 2022));
        assert_eq!(s.selected_country, "Chad");
        assert_eq!(s.selected_year, 2021);
        assert_eq!(s.selected_hist_year, 2021);
        assert_eq!(dispatcher.year_options(), vec![2021, 2020, 2019]);
        assert_eq!(dispatcher.render_all().len(), View::ALL.len());
    }

    #[test]
    fn global_inputs_only_touch_global_charts() {
        let data = data();
        let settings = QuerySettings::default();
        let mut dispatcher = Dispatcher::new(Engine::new(&data, &settings), &[]);

        let updates = dispatcher.apply(SelectionChange::Countries(vec![])).unwrap();
        assert_eq!(views(&updates), vec![View::PriceChart, View::UndernourishmentChart]);
        assert_eq!(updates[0], ViewData::PriceChart(vec![]));
        assert_eq!(updates[1], ViewData::UndernourishmentChart(vec![]));

        let updates = dispatcher
            .apply(SelectionChange::CommodityFilter(CommodityFilter::Essential))
            .unwrap();
        assert_eq!(views(&updates), vec![View::CountryOptions, View::PriceChart]);
    }

    #[test]
    fn year_range_is_clamped_to_the_data() {
        let data = data();
        let settings = QuerySettings::default();
        let mut dispatcher = Dispatcher::new(Engine::new(&data, &settings), &[]);
        dispatcher
            .apply(SelectionChange::YearRange(YearRange::new(1990, 2030).unwrap()))
            .unwrap();
        let range = dispatcher.selection().year_range;
        assert_eq!((range.min(), range.max()), (2018, 2022));
    }

    #[test]
    fn changing_country_resets_year_to_latest() {
        let data = data();
        let settings = QuerySettings::default();
        let mut dispatcher = Dispatcher::new(Engine::new(&data, &settings), &[]);
        dispatcher.apply(SelectionChange::Year(2019)).unwrap();

        let updates = dispatcher.apply(SelectionChange::Country("Kenya".into())).unwrap();
        assert_eq!(dispatcher.selection().selected_year, 2022);
        assert_eq!(
            views(&updates),
            vec![View::YearOptions, View::Map, View::BoxPlot, View::BarPlot, View::CountryInfo]
        );
        assert_eq!(updates[0], ViewData::YearOptions(vec![2022, 2018]));
        assert_eq!(dispatcher.previous().map(|p| p.selected_year), Some(2019));
    }

    #[test]
    fn unknown_country_is_rejected_without_changing_state() {
        let data = data();
        let settings = QuerySettings::default();
        let mut dispatcher = Dispatcher::new(Engine::new(&data, &settings), &[]);
        let before = dispatcher.selection().clone();
        let err = dispatcher.apply(SelectionChange::Country("Peru".into())).unwrap_err();
        assert!(matches!(err, MonitorError::UnknownCountry(c) if c == "Peru"));
        assert_eq!(dispatcher.selection(), &before);
    }

    #[test]
    fn map_click_filters_box_and_bar_until_year_changes() {
        let data = data();
        let settings = QuerySettings::default();
        let mut dispatcher = Dispatcher::new(Engine::new(&data, &settings), &[]);

        let updates = dispatcher
            .apply(SelectionChange::MapClick(Some("Moundou".into())))
            .unwrap();
        assert_eq!(views(&updates), vec![View::BoxPlot, View::BarPlot]);
        assert_eq!(dispatcher.selection().selected_region.as_deref(), Some("Moundou"));
        match &updates[0] {
            ViewData::BoxPlot(points) => {
                assert_eq!(points.len(), 1);
                assert_eq!(points[0].category, "oil and fats");
            }
            other => panic!("unexpected view {:?}", other),
        }

        dispatcher.apply(SelectionChange::Year(2020)).unwrap();
        assert_eq!(dispatcher.drilldown(), &DrillDown::Unfiltered);
        assert_eq!(dispatcher.selection().selected_region, None);
    }

    #[test]
    fn stale_click_shows_whole_country() {
        let data = data();
        let settings = QuerySettings::default();
        let mut dispatcher = Dispatcher::new(Engine::new(&data, &settings), &[]);
        let updates = dispatcher
            .apply(SelectionChange::MapClick(Some("Abeche".into())))
            .unwrap();
        assert_eq!(dispatcher.selection().selected_region, None);
        match &updates[1] {
            ViewData::BarPlot(rows) => assert_eq!(rows.len(), 2),
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn hist_year_drives_histogram_and_summary() {
        let data = data();
        let settings = QuerySettings::default();
        let mut dispatcher = Dispatcher::new(Engine::new(&data, &settings), &[]);
        let updates = dispatcher.apply(SelectionChange::HistYear(2020)).unwrap();
        assert_eq!(views(&updates), vec![View::Histogram, View::SummaryStats]);
        match &updates[1] {
            ViewData::SummaryStats(Some(stats)) => {
                assert_eq!(stats.mean_index, 2.0);
                assert_eq!(stats.mean_index_change, None);
            }
            other => panic!("unexpected view {:?}", other),
        }
    }
}
