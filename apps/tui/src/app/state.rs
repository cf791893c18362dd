use cap_core::compose::{
    city_options, lever_breakdown, lever_options, plan_detail, province_counts, province_options,
    strategy_breakdown,
};
use cap_core::display::{cycle, step_selection};
use cap_core::markers::{city_markers, CityMarker};
use cap_core::{
    Dataset, DatasetKind, GeoView, PlanDetail, Scope, Selection, Session, StackedChart,
    TokenCounts,
};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::fmt::Display;
use throbber_widgets_tui::ThrobberState;
use tracing::debug;

use crate::cli::CliArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Dashboard,
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartTab {
    #[default]
    Levers,
    Strategies,
    Provinces,
}

impl ChartTab {
    pub const ALL: [Self; 3] = [Self::Levers, Self::Strategies, Self::Provinces];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Levers),
            1 => Some(Self::Strategies),
            2 => Some(Self::Provinces),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Levers => 0,
            Self::Strategies => 1,
            Self::Provinces => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Levers => "Policy levers",
            Self::Strategies => "Strategies",
            Self::Provinces => "Actions by province",
        }
    }
}

/// Selector that receives Up/Down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Province,
    City,
    Lever,
}

impl Focus {
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

/// One searchable municipality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityEntry {
    pub province: String,
    pub city: String,
}

/// Fuzzy search over every municipality in the cities dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitySearch {
    pub query: String,
    pub matches: Vec<CityEntry>,
    pub selected: usize,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub screen: AppScreen,
    pub session: Session,
    pub selection: Selection,
    pub view: GeoView,
    pub chart_tab: ChartTab,
    pub focus: Focus,
    pub search: Option<CitySearch>,
    pub show_help: bool,
    pub status_message: String,
    pub throbber: ThrobberState,
    pub marker_index: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            screen: AppScreen::Dashboard,
            session: Session::new(),
            selection: Selection::default(),
            view: GeoView::National,
            chart_tab: ChartTab::Levers,
            focus: Focus::Province,
            search: None,
            show_help: false,
            status_message: String::new(),
            throbber: ThrobberState::default(),
            marker_index: 0,
        }
    }

    /// Applies the initial view and selection given on the command line.
    pub fn with_args(mut self, args: &CliArgs) -> Self {
        if let Some(view) = args.view {
            self.view = view;
        }
        self.selection.set_province(args.province.clone());
        self.selection.set_city(args.city.clone());
        self.selection.set_lever(args.lever.clone());
        if args.lever.is_some() {
            self.chart_tab = ChartTab::Strategies;
        }
        self
    }

    pub fn on_tick(&mut self) {
        if self.session.is_loading() {
            self.throbber.calc_next();
        }
    }

    pub fn complete_load<E: Display>(&mut self, kind: DatasetKind, outcome: Result<Dataset, E>) {
        self.session.complete(kind, outcome);
        self.status_message = match self.session.state(kind).failure() {
            Some(reason) => format!("Error: {reason}"),
            None => {
                let records = self
                    .session
                    .dataset(kind)
                    .map_or(0, |loaded| loaded.records.len());
                format!("Loaded {kind} ({records} records)")
            }
        };
    }

    // Options and derived views. Each is recomputed from the session, which
    // keeps the selectors consistent with whatever has finished loading.

    pub fn province_options(&self) -> Vec<String> {
        self.session
            .dataset(DatasetKind::Cities)
            .map(|cities| province_options(&cities.records, &cities.schema))
            .unwrap_or_default()
    }

    pub fn city_options(&self) -> Vec<String> {
        self.session
            .dataset(DatasetKind::Cities)
            .map(|cities| {
                city_options(
                    &cities.records,
                    &cities.schema,
                    self.selection.province.as_deref(),
                )
            })
            .unwrap_or_default()
    }

    pub fn lever_options(&self) -> Vec<String> {
        self.session
            .dataset(DatasetKind::ActionsModified)
            .map(|actions| lever_options(&actions.records, &actions.schema))
            .unwrap_or_default()
    }

    pub fn options_for(&self, focus: Focus) -> Vec<String> {
        match focus {
            Focus::Province => self.province_options(),
            Focus::City => self.city_options(),
            Focus::Lever => self.lever_options(),
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
        let scope = self.scope()?;
        Some(lever_breakdown(&actions.records, &actions.schema, &scope))
    }

    pub fn strategy_chart(&self) -> Option<StackedChart> {
        let actions = self.session.dataset(DatasetKind::ActionsModified)?;
        let scope = self.scope()?;
        strategy_breakdown(
            &actions.records,
            &actions.schema,
            &scope,
            self.selection.lever.as_deref(),
        )
    }

    pub fn province_counts(&self) -> Option<TokenCounts> {
        self.session
            .dataset(DatasetKind::Actions)
            .map(|actions| province_counts(&actions.records, &actions.schema))
    }

    pub fn plan_detail(&self) -> Option<PlanDetail> {
        let cities = self.session.dataset(DatasetKind::Cities)?;
        plan_detail(
            &cities.records,
            &cities.schema,
            self.selection.province.as_deref(),
            self.selection.city.as_deref(),
        )
    }

    pub fn markers(&self) -> Vec<CityMarker> {
        self.session
            .dataset(DatasetKind::Cities)
            .map(|cities| city_markers(&cities.records))
            .unwrap_or_default()
    }

    // Selection changes.

    pub fn set_view(&mut self, view: GeoView) {
        self.view = view;
        self.focus = match view {
            GeoView::Municipal if self.selection.province.is_some() => Focus::City,
            _ => Focus::Province,
        };
    }

    pub fn cycle_chart_tab(&mut self, forward: bool) {
        let len = ChartTab::ALL.len();
        let index = self.chart_tab.index();
        let next = cycle(index, len, forward);
        self.chart_tab = ChartTab::from_index(next).unwrap_or_default();
    }

    /// Moves the focused selector to the neighbouring option. With nothing
    /// chosen yet, Down picks the first option and Up the last.
    pub fn cycle_selection(&mut self, forward: bool) {
        let options = self.options_for(self.focus);
        if options.is_empty() {
            self.status_message = match self.focus {
                Focus::City if self.selection.province.is_none() => {
                    "Choose a province first".to_string()
                }
                focus => format!("No {} options yet", focus.label().to_lowercase()),
            };
            return;
        }

        let current = self
            .selected_for(self.focus)
            .and_then(|selected| options.iter().position(|option| option == selected));

        let value = step_selection(current, options.len(), forward)
            .and_then(|next| options.get(next).cloned());
        self.apply_selection(self.focus, value);
    }

    pub fn clear_focused_selection(&mut self) {
        self.apply_selection(self.focus, None);
    }

    fn apply_selection(&mut self, focus: Focus, value: Option<String>) {
        debug!(?focus, ?value, "selection changed");
        match focus {
            Focus::Province => self.selection.set_province(value),
            Focus::City => self.selection.set_city(value),
            Focus::Lever => self.selection.set_lever(value),
        }
        self.status_message.clear();
    }

    pub fn select_city(&mut self, entry: &CityEntry) {
        self.selection.set_province(Some(entry.province.clone()));
        self.selection.set_city(Some(entry.city.clone()));
        self.set_view(GeoView::Municipal);
        self.status_message = format!("Selected {}, {}", entry.city, entry.province);
    }

    // City search.

    /// Every municipality grouped by province, in selector order.
    pub fn city_directory(&self) -> Vec<CityEntry> {
        let Some(cities) = self.session.dataset(DatasetKind::Cities) else {
            return Vec::new();
        };

        province_options(&cities.records, &cities.schema)
            .into_iter()
            .flat_map(|province| {
                city_options(&cities.records, &cities.schema, Some(&province))
                    .into_iter()
                    .map(move |city| CityEntry {
                        province: province.clone(),
                        city,
                    })
            })
            .collect()
    }

    pub fn open_search(&mut self) {
        self.search = Some(CitySearch {
            matches: self.city_directory(),
            ..CitySearch::default()
        });
    }

    pub fn update_search(&mut self, query: String) {
        let directory = self.city_directory();
        if let Some(search) = self.search.as_mut() {
            search.matches = rank_cities(directory, &query);
            search.query = query;
            search.selected = 0;
        }
    }

    pub fn confirm_search(&mut self) {
        let chosen = self
            .search
            .take()
            .and_then(|search| search.matches.get(search.selected).cloned());
        if let Some(entry) = chosen {
            self.select_city(&entry);
        }
    }

    pub fn move_search_cursor(&mut self, forward: bool) {
        if let Some(search) = self.search.as_mut() {
            let len = search.matches.len();
            search.selected = cycle(search.selected, len, forward);
        }
    }

    // Map.

    pub fn move_marker(&mut self, forward: bool) {
        let len = self.markers().len();
        self.marker_index = cycle(self.marker_index, len, forward);
    }

    pub fn select_marker(&mut self) {
        let marker = self.markers().into_iter().nth(self.marker_index);
        let entry = marker.and_then(|marker| {
            Some(CityEntry {
                province: marker.province?,
                city: marker.name?,
            })
        });

        match entry {
            Some(entry) => {
                self.select_city(&entry);
                self.screen = AppScreen::Dashboard;
            }
            None => {
                self.status_message = "Marker has no province or name".to_string();
            }
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Best fuzzy matches first; an empty query keeps directory order.
pub fn rank_cities(directory: Vec<CityEntry>, query: &str) -> Vec<CityEntry> {
    let query = query.trim();
    if query.is_empty() {
        return directory;
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = directory
        .into_iter()
        .filter_map(|entry| {
            let haystack = format!("{} {}", entry.city, entry.province);
            matcher
                .fuzzy_match(&haystack, query)
                .map(|score| (score, entry))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|(left, _), (right, _)| right.cmp(left));
    scored.into_iter().map(|(_, entry)| entry).collect()
}
