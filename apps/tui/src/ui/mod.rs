// Rendering for the dashboard and map screens plus their popups

pub mod screens;
pub mod widgets;

use crate::app::state::AppScreen;
use crate::app::App;
use ratatui::layout::Margin;
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    match app.screen {
        AppScreen::Dashboard => screens::dashboard::render_dashboard(app, f),
        AppScreen::Map => screens::map::render_map(app, f),
    }

    let area = f.area().inner(Margin::new(2, 1));
    if let Some(search) = &app.search {
        widgets::popup::render_search_popup(search, f, area);
    }
    if app.show_help {
        widgets::popup::render_help_popup(f, area);
    }
}
