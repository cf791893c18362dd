//! View Composer: turns aggregator output into chart-ready series for the
//! national, provincial and municipal views.

use serde::Serialize;

use crate::aggregate::{
    count_tokens, distinct_values, filter_records, percentize, Collation, Predicate, TokenCounts,
};
use crate::record::Record;
use crate::roles::Role;
use crate::schema::Schema;

pub const NATIONAL_LABEL: &str = "National";
pub const COUNTRY_LABEL: &str = "Canada";

/// Which geographic view the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoView {
    #[default]
    National,
    Provincial,
    Municipal,
}

impl GeoView {
    pub const ALL: [Self; 3] = [Self::National, Self::Provincial, Self::Municipal];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::National => "national",
            Self::Provincial => "provincial",
            Self::Municipal => "municipal",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::National),
            1 => Some(Self::Provincial),
            2 => Some(Self::Municipal),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::National => 0,
            Self::Provincial => 1,
            Self::Municipal => 2,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "national" => Some(Self::National),
            "provincial" | "province" => Some(Self::Provincial),
            "municipal" | "municipality" | "city" => Some(Self::Municipal),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::National => "National",
            Self::Provincial => "Provincial",
            Self::Municipal => "Municipal",
        }
    }
}

/// The user's current choices in the cascading selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    pub province: Option<String>,
    pub city: Option<String>,
    pub lever: Option<String>,
}

impl Selection {
    /// Changing the province invalidates the city picked under the old one.
    pub fn set_province(&mut self, province: Option<String>) {
        let province = province.filter(|value| !value.trim().is_empty());
        if province != self.province {
            self.city = None;
        }
        self.province = province;
    }

    pub fn set_city(&mut self, city: Option<String>) {
        self.city = city.filter(|value| !value.trim().is_empty());
    }

    pub fn set_lever(&mut self, lever: Option<String>) {
        self.lever = lever.filter(|value| !value.trim().is_empty());
    }
}

/// Geography a breakdown is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum Scope {
    National,
    Provincial { province: String },
    Municipal { province: String, city: String },
}

impl Scope {
    /// `None` while a selection the view needs is still missing; the caller
    /// shows its placeholder instead of a chart.
    pub fn resolve(view: GeoView, selection: &Selection) -> Option<Self> {
        match view {
            GeoView::National => Some(Self::National),
            GeoView::Provincial => selection.province.clone().map(|province| Self::Provincial {
                province,
            }),
            GeoView::Municipal => match (&selection.province, &selection.city) {
                (Some(province), Some(city)) => Some(Self::Municipal {
                    province: province.clone(),
                    city: city.clone(),
                }),
                _ => None,
            },
        }
    }
}

/// One coloured segment across all bars of a stacked chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    /// One percentage per bar, aligned with [`StackedChart::labels`].
    pub values: Vec<f64>,
}

/// 100% stacked bar chart: one bar per label, one series per category token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedChart {
    pub title: String,
    pub description: String,
    pub category: Role,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl StackedChart {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.series.is_empty()
    }

    /// Percentages of one bar, paired with their series label.
    pub fn bar(&self, index: usize) -> Vec<(&str, f64)> {
        self.series
            .iter()
            .map(|series| {
                (
                    series.label.as_str(),
                    series.values.get(index).copied().unwrap_or(0.0),
                )
            })
            .collect()
    }
}

/// Single-row projection shown for a selected municipality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanDetail {
    pub municipality: String,
    /// Stands in for the plan link until links are added to the data; holds the province.
    pub plan_link: String,
    pub year: String,
}

fn province_filter(province: &str) -> Predicate {
    Predicate::equals(Role::Province, province)
}

fn city_filters(province: &str, city: &str) -> [Predicate; 2] {
    [
        Predicate::equals(Role::Municipality, city),
        Predicate::equals(Role::Province, province),
    ]
}

/// Bars of `(label, records)` turned into one series per universe token.
fn stack<'a>(
    bars: Vec<(String, Vec<&'a Record>)>,
    schema: &Schema,
    category: Role,
    universe: &[String],
) -> (Vec<String>, Vec<Series>) {
    let shares = bars
        .iter()
        .map(|(_, records)| {
            percentize(&count_tokens(
                records.iter().copied(),
                schema,
                category,
                universe,
            ))
        })
        .collect::<Vec<_>>();

    let series = universe
        .iter()
        .map(|token| Series {
            label: token.clone(),
            values: shares.iter().map(|share| share.rounded(token)).collect(),
        })
        .collect();

    let labels = bars.into_iter().map(|(label, _)| label).collect();
    (labels, series)
}

/// Lever mix per bar for the given scope, compared against the whole country.
pub fn lever_breakdown(actions: &[Record], schema: &Schema, scope: &Scope) -> StackedChart {
    let levers = distinct_values(actions, schema, Role::Lever, Collation::Ordinal);
    let everything = actions.iter().collect::<Vec<_>>();

    let (title, description, bars) = match scope {
        Scope::National => {
            let bars = distinct_values(actions, schema, Role::Province, Collation::Ordinal)
                .into_iter()
                .map(|province| {
                    let records = filter_records(actions, schema, &[province_filter(&province)]);
                    (province, records)
                })
                .collect::<Vec<_>>();
            (
                "Levers by Province (National)",
                "Proportional (%) use of each policy lever across the provinces and territories studied.",
                bars,
            )
        }
        Scope::Provincial { province } => (
            "Levers: selected province vs national",
            "Proportional (%) use of each policy lever in the selected province, with the national mix for comparison.",
            vec![
                (
                    province.clone(),
                    filter_records(actions, schema, &[province_filter(province)]),
                ),
                (NATIONAL_LABEL.to_string(), everything),
            ],
        ),
        Scope::Municipal { province, city } => (
            "Levers: city, province, national",
            "Proportional (%) use of each policy lever in the selected municipality, with the provincial and national mix for comparison.",
            vec![
                (
                    city.clone(),
                    filter_records(actions, schema, &city_filters(province, city)),
                ),
                (
                    province.clone(),
                    filter_records(actions, schema, &[province_filter(province)]),
                ),
                (NATIONAL_LABEL.to_string(), everything),
            ],
        ),
    };

    let (labels, series) = stack(bars, schema, Role::Lever, &levers);
    StackedChart {
        title: title.to_string(),
        description: description.to_string(),
        category: Role::Lever,
        labels,
        series,
    }
}

/// Strategy mix within one lever; `None` until a lever is chosen.
///
/// The universe is the set of strategies used by actions under that lever,
/// not every strategy in the dataset.
pub fn strategy_breakdown(
    actions: &[Record],
    schema: &Schema,
    scope: &Scope,
    lever: Option<&str>,
) -> Option<StackedChart> {
    let lever = lever.map(str::trim).filter(|lever| !lever.is_empty())?;
    let under_lever = filter_records(actions, schema, &[Predicate::includes(Role::Lever, lever)]);
    let strategies = distinct_values(
        under_lever.iter().copied(),
        schema,
        Role::Strategy,
        Collation::Ordinal,
    );
    let within = |predicates: &[Predicate]| {
        filter_records(under_lever.iter().copied(), schema, predicates)
    };

    let (title, description, bars) = match scope {
        Scope::National => {
            let bars = distinct_values(
                under_lever.iter().copied(),
                schema,
                Role::Province,
                Collation::Ordinal,
            )
            .into_iter()
            .map(|province| {
                let records = within(&[province_filter(&province)]);
                (province, records)
            })
            .collect::<Vec<_>>();
            (
                "Strategies by Province (National)",
                "This stacked bar chart shows the proportional (%) use of each strategy within the selected policy lever across the provinces and territories studied.",
                bars,
            )
        }
        Scope::Provincial { province } => (
            "Strategies: selected province vs national",
            "This stacked bar chart shows the proportional (%) use of each strategy within the selected policy lever in the selected province, as well as the overall use of each strategy nationally for comparison.",
            vec![
                (province.clone(), within(&[province_filter(province)])),
                (COUNTRY_LABEL.to_string(), under_lever.clone()),
            ],
        ),
        Scope::Municipal { province, city } => (
            "Strategies: city, province, national",
            "This stacked bar chart shows the proportional (%) use of each strategy within the selected policy lever in the selected municipality as well as the overall use of each strategy provincially and nationally for comparison.",
            vec![
                (city.clone(), within(&city_filters(province, city))),
                (province.clone(), within(&[province_filter(province)])),
                (COUNTRY_LABEL.to_string(), under_lever.clone()),
            ],
        ),
    };

    let (labels, series) = stack(bars, schema, Role::Strategy, &strategies);
    Some(StackedChart {
        title: title.to_string(),
        description: description.to_string(),
        category: Role::Strategy,
        labels,
        series,
    })
}

/// Provinces offered in the province selectors.
pub fn province_options(cities: &[Record], schema: &Schema) -> Vec<String> {
    distinct_values(cities, schema, Role::Province, Collation::Ordinal)
}

/// Municipalities of `province`, in display order; empty until a province is chosen.
pub fn city_options(cities: &[Record], schema: &Schema, province: Option<&str>) -> Vec<String> {
    let Some(province) = province.filter(|value| !value.trim().is_empty()) else {
        return Vec::new();
    };
    let in_province = filter_records(cities, schema, &[province_filter(province)]);
    distinct_values(in_province, schema, Role::Municipality, Collation::Display)
}

/// Levers offered in the strategy chart's lever selector.
pub fn lever_options(actions: &[Record], schema: &Schema) -> Vec<String> {
    distinct_values(actions, schema, Role::Lever, Collation::Ordinal)
}

/// Number of actions recorded per province.
pub fn province_counts(actions: &[Record], schema: &Schema) -> TokenCounts {
    count_tokens(actions, schema, Role::Province, &[])
}

/// Detail row for the selected municipality; needs both a province and a city.
pub fn plan_detail(
    cities: &[Record],
    schema: &Schema,
    province: Option<&str>,
    city: Option<&str>,
) -> Option<PlanDetail> {
    let province = province.map(str::trim).filter(|value| !value.is_empty())?;
    let city = city.map(str::trim).filter(|value| !value.is_empty())?;

    let row = filter_records(cities, schema, &city_filters(province, city))
        .into_iter()
        .next()?;

    let text_of = |role| {
        schema
            .roles
            .value(row, role)
            .to_text()
            .unwrap_or_default()
    };

    Some(PlanDetail {
        municipality: text_of(Role::Municipality),
        plan_link: province.to_string(),
        year: text_of(Role::Year),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleRules;
    use crate::schema::ExtractionTable;

    fn action(province: &str, city: &str, lever: &str, strategy: &str) -> Record {
        Record::new()
            .with("Province", province)
            .with("Municipality", city)
            .with("Policy Lever", lever)
            .with("Strategy", strategy)
    }

    fn actions() -> Vec<Record> {
        vec![
            action("ON", "Toronto", "Regulation", "Bylaws; Codes"),
            action("ON", "Toronto", "Incentive", "Grants"),
            action("ON", "Guelph", "Regulation; Incentive", "Codes"),
            action("BC", "Victoria", "Regulation", "Bylaws"),
        ]
    }

    fn lever_schema(records: &[Record]) -> Schema {
        Schema::infer(records, &RoleRules::actions(), ExtractionTable::lever_view())
    }

    fn cities() -> Vec<Record> {
        vec![
            Record::new()
                .with("\u{feff}Municipality (n=104)", "Toronto")
                .with("Province", "ON")
                .with("Year", 2021),
            Record::new()
                .with("Municipality (n=104)", "Guelph")
                .with("Province", "ON")
                .with("Year", 2022),
            Record::new()
                .with("Municipality (n=104)", "Victoria")
                .with("Province", "BC"),
        ]
    }

    fn city_schema(records: &[Record]) -> Schema {
        Schema::infer(records, &RoleRules::cities(), ExtractionTable::lever_view())
    }

    fn series_values<'a>(chart: &'a StackedChart, label: &str) -> &'a [f64] {
        &chart
            .series
            .iter()
            .find(|series| series.label == label)
            .unwrap()
            .values
    }

    #[test]
    fn resolves_scope_only_with_required_selections() {
        let mut selection = Selection::default();
        assert_eq!(Scope::resolve(GeoView::National, &selection), Some(Scope::National));
        assert_eq!(Scope::resolve(GeoView::Provincial, &selection), None);

        selection.set_province(Some("ON".to_string()));
        assert!(Scope::resolve(GeoView::Municipal, &selection).is_none());

        selection.set_city(Some("Guelph".to_string()));
        assert_eq!(
            Scope::resolve(GeoView::Municipal, &selection),
            Some(Scope::Municipal {
                province: "ON".to_string(),
                city: "Guelph".to_string()
            })
        );
    }

    #[test]
    fn changing_province_clears_city() {
        let mut selection = Selection::default();
        selection.set_province(Some("ON".to_string()));
        selection.set_city(Some("Guelph".to_string()));

        selection.set_province(Some("ON".to_string()));
        assert_eq!(selection.city.as_deref(), Some("Guelph"));

        selection.set_province(Some("BC".to_string()));
        assert_eq!(selection.city, None);
    }

    #[test]
    fn national_lever_breakdown_has_a_bar_per_province() {
        let records = actions();
        let schema = lever_schema(&records);
        let chart = lever_breakdown(&records, &schema, &Scope::National);

        assert_eq!(chart.labels, ["BC", "ON"]);
        assert_eq!(
            chart.series.iter().map(|s| s.label.as_str()).collect::<Vec<_>>(),
            ["Incentive", "Regulation"]
        );
        assert_eq!(series_values(&chart, "Regulation"), [100.0, 50.0]);
        assert_eq!(series_values(&chart, "Incentive"), [0.0, 50.0]);
    }

    #[test]
    fn municipal_lever_breakdown_compares_against_province_and_nation() {
        let records = actions();
        let schema = lever_schema(&records);
        let scope = Scope::Municipal {
            province: "ON".to_string(),
            city: "toronto".to_string(),
        };
        let chart = lever_breakdown(&records, &schema, &scope);

        assert_eq!(chart.labels, ["toronto", "ON", NATIONAL_LABEL]);
        assert_eq!(series_values(&chart, "Incentive"), [50.0, 50.0, 40.0]);
        assert_eq!(series_values(&chart, "Regulation"), [50.0, 50.0, 60.0]);
    }

    #[test]
    fn every_bar_sums_to_one_hundred_or_zero() {
        let records = actions();
        let schema = lever_schema(&records);
        let scope = Scope::Municipal {
            province: "BC".to_string(),
            city: "Nowhere".to_string(),
        };
        let chart = lever_breakdown(&records, &schema, &scope);

        let sums = (0..chart.labels.len())
            .map(|index| chart.bar(index).iter().map(|(_, value)| value).sum::<f64>())
            .collect::<Vec<_>>();
        assert!(sums[0].abs() < 1e-9);
        assert!((sums[1] - 100.0).abs() < 1e-6);
        assert!((sums[2] - 100.0).abs() < 1e-6);
    }

    #[test]
    fn strategy_breakdown_waits_for_a_lever() {
        let records = actions();
        let schema = Schema::infer(&records, &RoleRules::strategy_actions(), ExtractionTable::strategy_view());

        assert!(strategy_breakdown(&records, &schema, &Scope::National, None).is_none());
        assert!(strategy_breakdown(&records, &schema, &Scope::National, Some("  ")).is_none());
    }

    #[test]
    fn strategy_universe_is_limited_to_the_lever() {
        let records = actions();
        let schema = Schema::infer(&records, &RoleRules::strategy_actions(), ExtractionTable::strategy_view());
        let scope = Scope::Provincial {
            province: "ON".to_string(),
        };

        let chart = strategy_breakdown(&records, &schema, &scope, Some("Incentive")).unwrap();
        assert_eq!(chart.labels, ["ON", COUNTRY_LABEL]);
        assert_eq!(
            chart.series.iter().map(|s| s.label.as_str()).collect::<Vec<_>>(),
            ["Codes", "Grants"]
        );
        assert_eq!(series_values(&chart, "Grants"), [50.0, 50.0]);
    }

    #[test]
    fn national_strategy_bars_cover_provinces_using_the_lever() {
        let records = actions();
        let schema = Schema::infer(&records, &RoleRules::strategy_actions(), ExtractionTable::strategy_view());

        let chart = strategy_breakdown(&records, &schema, &Scope::National, Some("Incentive")).unwrap();
        assert_eq!(chart.labels, ["ON"]);
    }

    #[test]
    fn city_options_follow_province_in_display_order() {
        let records = cities();
        let schema = city_schema(&records);

        assert_eq!(province_options(&records, &schema), ["BC", "ON"]);
        assert_eq!(city_options(&records, &schema, Some("ON")), ["Guelph", "Toronto"]);
        assert!(city_options(&records, &schema, None).is_empty());
        assert!(city_options(&records, &schema, Some("QC")).is_empty());
    }

    #[test]
    fn plan_detail_matches_city_case_insensitively() {
        let records = cities();
        let schema = city_schema(&records);

        let detail = plan_detail(&records, &schema, Some("ON"), Some("GUELPH")).unwrap();
        assert_eq!(
            detail,
            PlanDetail {
                municipality: "Guelph".to_string(),
                plan_link: "ON".to_string(),
                year: "2022".to_string(),
            }
        );
    }

    #[test]
    fn plan_detail_year_is_blank_when_missing() {
        let records = cities();
        let schema = city_schema(&records);

        let detail = plan_detail(&records, &schema, Some("BC"), Some("Victoria")).unwrap();
        assert_eq!(detail.year, "");
    }

    #[test]
    fn plan_detail_needs_both_selections_and_a_match() {
        let records = cities();
        let schema = city_schema(&records);

        assert!(plan_detail(&records, &schema, Some("ON"), None).is_none());
        assert!(plan_detail(&records, &schema, None, Some("Guelph")).is_none());
        assert!(plan_detail(&records, &schema, Some("BC"), Some("Guelph")).is_none());
    }

    #[test]
    fn counts_actions_per_province() {
        let records = actions();
        let counts = province_counts(&records, &lever_schema(&records));
        assert_eq!(counts.get("ON"), 3);
        assert_eq!(counts.get("BC"), 1);
    }
}
