use crate::app::state::{App, AppScreen};
use cap_core::GeoView;
use crossterm::event::KeyCode;

pub fn handle_dashboard_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Char(digit @ '1'..='3') => {
            let index = digit as usize - '1' as usize;
            if let Some(view) = GeoView::from_index(index) {
                app.set_view(view);
            }
        }
        KeyCode::Tab => {
            app.focus = app.focus.next();
        }
        KeyCode::Up => app.cycle_selection(false),
        KeyCode::Down => app.cycle_selection(true),
        KeyCode::Left => app.cycle_chart_tab(false),
        KeyCode::Right => app.cycle_chart_tab(true),
        KeyCode::Backspace | KeyCode::Delete => app.clear_focused_selection(),
        KeyCode::Char('/') => app.open_search(),
        KeyCode::Char('m') => {
            app.marker_index = 0;
            app.screen = AppScreen::Map;
        }
        KeyCode::Esc => {
            app.status_message.clear();
        }
        _ => {}
    }
}
