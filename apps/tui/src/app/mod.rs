// Application state and key handling for the dashboard

pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::{App, AppScreen, ChartTab, Focus};
