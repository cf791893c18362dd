use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_search_input(app: &mut App, key: KeyCode) {
    let Some(query) = app.search.as_ref().map(|search| search.query.clone()) else {
        return;
    };

    match key {
        KeyCode::Esc => {
            app.search = None;
        }
        KeyCode::Enter => {
            app.confirm_search();
        }
        KeyCode::Up => app.move_search_cursor(false),
        KeyCode::Down => app.move_search_cursor(true),
        KeyCode::Backspace => {
            let mut query = query;
            query.pop();
            app.update_search(query);
        }
        KeyCode::Char(ch) => {
            let mut query = query;
            query.push(ch);
            app.update_search(query);
        }
        _ => {}
    }
}
