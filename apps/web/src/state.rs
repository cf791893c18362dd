use cap_core::compose::{
    city_options, lever_breakdown, lever_options, plan_detail, province_counts, province_options,
    strategy_breakdown,
};
use cap_core::display::{cycle, step_selection};
use cap_core::{DatasetKind, GeoView, Scope, Selection, Session, StackedChart, TokenCounts};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Province,
    City,
    Lever,
}

impl Focus {
    pub const ALL: [Self; 3] = [Self::Province, Self::City, Self::Lever];

    pub const fn next(self) -> Self {
        match self {
            Self::Province => Self::City,
            Self::City => Self::Lever,
            Self::Lever => Self::Province,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Province => "Province",
            Self::City => "Municipality",
            Self::Lever => "Policy lever",
        }
    }
}

pub const CHART_TITLES: [&str; 3] = ["Policy levers", "Strategies", "Actions by province"];

/// A row of the municipality table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanRow {
    pub city: String,
    pub province: String,
    pub year: String,
}

/// Everything the page shows, rebuilt into widgets on every frame.
#[derive(Debug)]
pub struct WebState {
    pub session: Session,
    pub selection: Selection,
    pub view: GeoView,
    pub chart_index: usize,
    pub focus: Focus,
    pub row_offset: usize,
}

impl Default for WebState {
    fn default() -> Self {
        Self {
            session: Session::new(),
            selection: Selection::default(),
            view: GeoView::National,
            chart_index: 0,
            focus: Focus::Province,
            row_offset: 0,
        }
    }
}

impl WebState {
    pub fn options_for(&self, focus: Focus) -> Vec<String> {
        match focus {
            Focus::Province => self
                .session
                .dataset(DatasetKind::Cities)
                .map(|cities| province_options(&cities.records, &cities.schema))
                .unwrap_or_default(),
            Focus::City => self
                .session
                .dataset(DatasetKind::Cities)
                .map(|cities| {
                    city_options(
                        &cities.records,
                        &cities.schema,
                        self.selection.province.as_deref(),
                    )
                })
                .unwrap_or_default(),
            Focus::Lever => self
                .session
                .dataset(DatasetKind::ActionsModified)
                .map(|actions| lever_options(&actions.records, &actions.schema))
                .unwrap_or_default(),
        }
    }

    pub fn selected_for(&self, focus: Focus) -> Option<&str> {
        match focus {
            Focus::Province => self.selection.province.as_deref(),
            Focus::City => self.selection.city.as_deref(),
            Focus::Lever => self.selection.lever.as_deref(),
        }
    }

    pub fn scope(&self) -> Option<Scope> {
        Scope::resolve(self.view, &self.selection)
    }

    pub fn lever_chart(&self) -> Option<StackedChart> {
        let actions = self.session.dataset(DatasetKind::Actions)?;
        Some(lever_breakdown(
            &actions.records,
            &actions.schema,
            &self.scope()?,
        ))
    }

    pub fn strategy_chart(&self) -> Option<StackedChart> {
        let actions = self.session.dataset(DatasetKind::ActionsModified)?;
        strategy_breakdown(
            &actions.records,
            &actions.schema,
            &self.scope()?,
            self.selection.lever.as_deref(),
        )
    }

    pub fn province_counts(&self) -> Option<TokenCounts> {
        let actions = self.session.dataset(DatasetKind::Actions)?;
        Some(province_counts(&actions.records, &actions.schema))
    }

    /// Plans of the chosen province, or of every province when none is chosen.
    pub fn plan_rows(&self) -> Vec<PlanRow> {
        let Some(cities) = self.session.dataset(DatasetKind::Cities) else {
            return Vec::new();
        };

        let provinces = match &self.selection.province {
            Some(province) => vec![province.clone()],
            None => province_options(&cities.records, &cities.schema),
        };

        provinces
            .into_iter()
            .flat_map(|province| {
                city_options(&cities.records, &cities.schema, Some(&province))
                    .into_iter()
                    .map(move |city| (province.clone(), city))
            })
            .map(|(province, city)| {
                let year = plan_detail(&cities.records, &cities.schema, Some(&province), Some(&city))
                    .map(|detail| detail.year)
                    .unwrap_or_default();
                PlanRow {
                    city,
                    province,
                    year,
                }
            })
            .collect()
    }

    /// Row of the chosen municipality. Names compare case-insensitively,
    /// accented letters included.
    pub fn selected_plan(&self, rows: &[PlanRow]) -> Option<usize> {
        let city = self.selection.city.as_deref()?.to_lowercase();
        let province = self.selection.province.as_deref();
        rows.iter().position(|row| {
            row.city.to_lowercase() == city && province.map_or(true, |p| row.province == p)
        })
    }

    pub fn set_view(&mut self, view: GeoView) {
        self.view = view;
        self.row_offset = 0;
    }

    pub fn cycle_chart(&mut self, forward: bool) {
        self.chart_index = cycle(self.chart_index, CHART_TITLES.len(), forward);
    }

    pub fn cycle_selection(&mut self, forward: bool) {
        let options = self.options_for(self.focus);
        let current = self
            .selected_for(self.focus)
            .and_then(|selected| options.iter().position(|option| option == selected));
        let Some(next) = step_selection(current, options.len(), forward) else {
            return;
        };

        self.apply(options.get(next).cloned());
    }

    pub fn clear_selection(&mut self) {
        self.apply(None);
    }

    fn apply(&mut self, value: Option<String>) {
        match self.focus {
            Focus::Province => self.selection.set_province(value),
            Focus::City => self.selection.set_city(value),
            Focus::Lever => self.selection.set_lever(value),
        }
        self.row_offset = 0;
    }

    pub fn scroll(&mut self, forward: bool) {
        let max = self.plan_rows().len().saturating_sub(1);
        self.row_offset = if forward {
            (self.row_offset + 1).min(max)
        } else {
            self.row_offset.saturating_sub(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_core::Dataset;

    fn loaded() -> WebState {
        let mut state = WebState::default();
        state.session.complete(
            DatasetKind::Cities,
            Dataset::from_json_str(
                r#"[
                    {"Municipality (n=104)": "Guelph", "Province": "ON", "Year": 2022},
                    {"Municipality (n=104)": "Ajax", "Province": "ON", "Year": 2019},
                    {"Municipality (n=104)": "Victoria", "Province": "BC", "Year": 2018}
                ]"#,
            ),
        );
        state.session.complete(
            DatasetKind::ActionsModified,
            Dataset::from_json_str(
                r#"[{"Province": "ON", "Municipality": "Guelph", "Policy Lever": "Regulation", "Strategy": "Bylaws"}]"#,
            ),
        );
        state
    }

    #[test]
    fn charts_cycle_in_both_directions() {
        let mut state = WebState::default();
        state.cycle_chart(false);
        assert_eq!(state.chart_index, 2);
        state.cycle_chart(true);
        assert_eq!(state.chart_index, 0);
    }

    #[test]
    fn changing_province_clears_city() {
        let mut state = loaded();
        state.cycle_selection(true);
        assert_eq!(state.selection.province.as_deref(), Some("BC"));

        state.focus = Focus::City;
        state.cycle_selection(true);
        assert_eq!(state.selection.city.as_deref(), Some("Victoria"));

        state.focus = Focus::Province;
        state.cycle_selection(true);
        assert_eq!(state.selection.province.as_deref(), Some("ON"));
        assert_eq!(state.selection.city, None);
    }

    #[test]
    fn plan_rows_follow_the_province() {
        let mut state = loaded();
        assert_eq!(state.plan_rows().len(), 3);

        state.selection.set_province(Some("ON".to_string()));
        let rows = state.plan_rows();
        assert_eq!(
            rows.iter().map(|row| row.city.as_str()).collect::<Vec<_>>(),
            ["Ajax", "Guelph"]
        );
        assert_eq!(rows[1].year, "2022");
    }

    #[test]
    fn lever_options_come_from_modified_actions() {
        let state = loaded();
        assert_eq!(state.options_for(Focus::Lever), ["Regulation"]);
        assert!(state.lever_chart().is_none());
    }

    #[test]
    fn scrolling_stays_within_rows() {
        let mut state = loaded();
        state.scroll(false);
        assert_eq!(state.row_offset, 0);
        for _ in 0..10 {
            state.scroll(true);
        }
        assert_eq!(state.row_offset, 2);
    }

    #[test]
    fn selected_plan_ignores_accented_case() {
        let mut state = WebState::default();
        state.selection.set_province(Some("QC".to_string()));
        state.selection.set_city(Some("QUÉBEC".to_string()));

        let rows = vec![
            PlanRow {
                city: "Montréal".to_string(),
                province: "QC".to_string(),
                year: "2020".to_string(),
            },
            PlanRow {
                city: "Québec".to_string(),
                province: "QC".to_string(),
                year: "2021".to_string(),
            },
        ];
        assert_eq!(state.selected_plan(&rows), Some(1));

        state.selection.set_city(Some("Laval".to_string()));
        assert_eq!(state.selected_plan(&rows), None);
    }
}
