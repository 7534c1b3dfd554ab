//! Map-click drill-down.
//!
//! A click on a map point narrows the box and bar plots to that region.
//! Whenever the region stops applying, either because the click did not
//! name a region with data or because the country/year moved on, the
//! machine drops back to the whole-country view.
use crate::engine::Engine;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DrillDown {
    #[default]
    Unfiltered,
    RegionFiltered(String),
}

impl DrillDown {
    pub fn region(&self) -> Option<&str> {
        match self {
            DrillDown::Unfiltered => None,
            DrillDown::RegionFiltered(region) => Some(region),
        }
    }

    /// Handle a map click for the current (country, year).
    pub fn on_map_click(
        &mut self,
        engine: &Engine<'_>,
        country: &str,
        year: i32,
        region_candidate: Option<&str>,
    ) {
        *self = match region_candidate {
            Some(region) if engine.region_is_valid(country, year, region) => {
                debug!(region, "region drill-down selected");
                DrillDown::RegionFiltered(region.to_string())
            }
            Some(region) => {
                warn!(region, country, year, "clicked region has no data, showing whole country");
                DrillDown::Unfiltered
            }
            None => DrillDown::Unfiltered,
        };
    }

    /// Re-validate the held region after the country or year changed.
    pub fn on_context_change(&mut self, engine: &Engine<'_>, country: &str, year: i32) {
        if let DrillDown::RegionFiltered(region) = self {
            if !engine.region_is_valid(country, year, region) {
                debug!(region = region.as_str(), country, year, "drill-down dropped");
                *self = DrillDown::Unfiltered;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuerySettings;
    use crate::dataset::fixtures::price;
    use crate::dataset::Datasets;

    fn data() -> Datasets {
        Datasets::new(
            vec![
                price("Kenya", "A", "c", "Rice", (2021, 1, 1), 1.0),
                price("Kenya", "B", "c", "Rice", (2021, 1, 1), 1.0),
                price("Kenya", "B", "c", "Rice", (2022, 1, 1), 1.0),
                price("Chad", "A", "c", "Rice", (2021, 1, 1), 1.0),
            ],
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn starts_unfiltered() {
        assert_eq!(DrillDown::default(), DrillDown::Unfiltered);
        assert_eq!(DrillDown::default().region(), None);
    }

    #[test]
    fn valid_click_then_year_change_drops_region() {
        let data = data();
        let settings = QuerySettings::default();
        let engine = Engine::new(&data, &settings);
        let mut state = DrillDown::default();

        state.on_map_click(&engine, "Kenya", 2021, Some("A"));
        assert_eq!(state, DrillDown::RegionFiltered("A".into()));

        state.on_context_change(&engine, "Kenya", 2022);
        assert_eq!(state, DrillDown::Unfiltered);
    }

    #[test]
    fn region_survives_context_change_when_still_present() {
        let data = data();
        let settings = QuerySettings::default();
        let engine = Engine::new(&data, &settings);
        let mut state = DrillDown::default();

        state.on_map_click(&engine, "Kenya", 2021, Some("A"));
        state.on_context_change(&engine, "Chad", 2021);
        assert_eq!(state.region(), Some("A"));
    }

    #[test]
    fn invalid_or_empty_click_clears_region() {
        let data = data();
        let settings = QuerySettings::default();
        let engine = Engine::new(&data, &settings);
        let mut state = DrillDown::RegionFiltered("B".into());

        state.on_map_click(&engine, "Kenya", 2021, Some("Z"));
        assert_eq!(state, DrillDown::Unfiltered);

        state.on_map_click(&engine, "Kenya", 2021, Some("B"));
        state.on_map_click(&engine, "Kenya", 2021, None);
        assert_eq!(state, DrillDown::Unfiltered);
    }
}
