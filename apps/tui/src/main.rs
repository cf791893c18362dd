use cap_dashboard::cli::CliArgs;
use cap_dashboard::{event, loader, logging, terminal, App, AppConfig};
use clap::Parser;
use color_eyre::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let config = AppConfig::from_env();
    logging::init(&config)?;
    info!(data_dir = %config.data_dir.display(), "configuration loaded");

    let app = App::new().with_args(&args);

    // Without a terminal there is nothing to draw on; print the report instead
    if args.headless || !is_terminal() {
        let session = loader::load_session(&config).await;
        return event::run_headless(&session, app.view, &app.selection, args.json);
    }

    let loads = loader::spawn_loads(&config);
    let mut app = app;

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app, loads);
    terminal::cleanup(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
