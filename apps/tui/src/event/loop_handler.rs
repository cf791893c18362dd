use cap_core::compose::{
    lever_breakdown, plan_detail, province_counts, province_options, strategy_breakdown,
};
use cap_core::{
    DatasetKind, GeoView, LoadState, LoadedDataset, PlanDetail, Scope, Selection, Session,
    StackedChart,
};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::Serialize;
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::{handle_input, App};
use crate::loader::LoadEvent;
use crate::ui;

/// Report printed in headless mode: what loaded, and the charts for the
/// requested selection.
#[derive(Debug, Serialize)]
pub struct HeadlessReport {
    pub datasets: Vec<DatasetSummary>,
    pub view: GeoView,
    pub selection: Selection,
    pub provinces: Vec<String>,
    pub actions_by_province: Vec<(String, u64)>,
    pub lever_chart: Option<StackedChart>,
    pub strategy_chart: Option<StackedChart>,
    pub plan_detail: Option<PlanDetail>,
}

#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub name: &'static str,
    pub status: &'static str,
    pub records: usize,
    pub error: Option<String>,
    pub roles: Vec<(String, String)>,
}

/// Run the dashboard without a UI: print the report and exit.
pub fn run_headless(session: &Session, view: GeoView, selection: &Selection, json: bool) -> Result<()> {
    let report = build_headless_report(session, view, selection);

    if json {
        let json = serde_json::to_string_pretty(&report)?;
        println!("{json}");
    } else {
        print!("{}", render_headless_text(&report));
    }

    Ok(())
}

pub fn build_headless_report(
    session: &Session,
    view: GeoView,
    selection: &Selection,
) -> HeadlessReport {
    let datasets = DatasetKind::ALL
        .into_iter()
        .map(|kind| summarize(kind, session.state(kind)))
        .collect();

    let scope = Scope::resolve(view, selection);
    let cities = session.dataset(DatasetKind::Cities);
    let actions = session.dataset(DatasetKind::Actions);
    let actions_mod = session.dataset(DatasetKind::ActionsModified);

    let provinces = cities
        .map(|cities| province_options(&cities.records, &cities.schema))
        .unwrap_or_default();

    let actions_by_province = actions
        .map(|actions| {
            province_counts(&actions.records, &actions.schema)
                .iter()
                .map(|(province, count)| (province.to_string(), count))
                .collect()
        })
        .unwrap_or_default();

    let lever_chart = actions.zip(scope.as_ref()).map(|(actions, scope)| {
        lever_breakdown(&actions.records, &actions.schema, scope)
    });

    let strategy_chart = actions_mod
        .zip(scope.as_ref())
        .and_then(|(actions, scope)| {
            strategy_breakdown(
                &actions.records,
                &actions.schema,
                scope,
                selection.lever.as_deref(),
            )
        });

    let plan_detail = cities.and_then(|cities| {
        plan_detail(
            &cities.records,
            &cities.schema,
            selection.province.as_deref(),
            selection.city.as_deref(),
        )
    });

    HeadlessReport {
        datasets,
        view,
        selection: selection.clone(),
        provinces,
        actions_by_province,
        lever_chart,
        strategy_chart,
        plan_detail,
    }
}

fn summarize(kind: DatasetKind, state: &LoadState<LoadedDataset>) -> DatasetSummary {
    let (status, records, error, roles) = match state {
        LoadState::Pending => ("pending", 0, None, Vec::new()),
        LoadState::Failed(reason) => ("failed", 0, Some(reason.clone()), Vec::new()),
        LoadState::Ready(loaded) => (
            "ready",
            loaded.records.len(),
            None,
            loaded
                .schema
                .roles
                .assigned()
                .map(|(role, field)| (role.as_str().to_string(), field.to_string()))
                .collect(),
        ),
    };

    DatasetSummary {
        name: kind.label(),
        status,
        records,
        error,
        roles,
    }
}

pub fn render_headless_text(report: &HeadlessReport) -> String {
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line("\nClimate Action Plan Dashboard".to_string());
    line("=============================".to_string());

    line("\nDatasets:".to_string());
    for dataset in &report.datasets {
        let detail = dataset
            .error
            .clone()
            .unwrap_or_else(|| format!("{} records", dataset.records));
        line(format!("- {}: {} ({detail})", dataset.name, dataset.status));
        for (role, field) in &dataset.roles {
            line(format!("    {role} -> {field}"));
        }
    }

    line(format!("\nProvinces: {}", report.provinces.join(", ")));

    line("\nActions by province:".to_string());
    for (province, count) in &report.actions_by_province {
        line(format!("- {province}: {count}"));
    }

    line(format!("\nView: {}", report.view.label()));
    for chart in [&report.lever_chart, &report.strategy_chart] {
        match chart {
            Some(chart) => {
                line(format!("\n{}", chart.title));
                for (index, label) in chart.labels.iter().enumerate() {
                    let shares = chart
                        .bar(index)
                        .into_iter()
                        .map(|(series, value)| format!("{series} {value:.2}%"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    line(format!("- {label}: {shares}"));
                }
            }
            None => line("\n(chart needs a selection)".to_string()),
        }
    }

    if let Some(detail) = &report.plan_detail {
        line("\nPlan:".to_string());
        line(format!(
            "- {} | {} | {}",
            detail.municipality, detail.plan_link, detail.year
        ));
    }

    out
}

/// Run the main application event loop
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    mut loads: mpsc::Receiver<LoadEvent>,
) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    loop {
        while let Ok(load) = loads.try_recv() {
            debug!(dataset = %load.kind, ok = load.outcome.is_ok(), "load finished");
            app.complete_load(load.kind, load.outcome);
        }

        app.on_tick();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        warn!("redraw after resize failed");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "failed to read terminal event"),
            }
        }
    }
    Ok(())
}
