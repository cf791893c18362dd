use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

pub fn handle_map_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Char('m') => {
            app.screen = AppScreen::Dashboard;
        }
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Up | KeyCode::Left => app.move_marker(false),
        KeyCode::Down | KeyCode::Right => app.move_marker(true),
        KeyCode::Home => {
            app.marker_index = 0;
        }
        KeyCode::Enter => app.select_marker(),
        _ => {}
    }
}
