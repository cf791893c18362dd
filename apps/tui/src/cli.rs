use cap_core::GeoView;
use clap::{CommandFactory, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "cap_dashboard",
    version,
    about = "Climate action plan dashboard"
)]
pub struct CliArgs {
    /// Print a report and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Directory holding cities.json, actions.json and actions_mod.json
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Override the cities dataset
    #[arg(long, value_name = "PATH")]
    pub cities: Option<String>,

    /// Override the actions dataset
    #[arg(long, value_name = "PATH")]
    pub actions: Option<String>,

    /// Override the modified actions dataset used by the strategy chart
    #[arg(long = "actions-mod", value_name = "PATH")]
    pub actions_mod: Option<String>,

    /// Initial view: national, provincial or municipal
    #[arg(long, value_name = "VIEW", value_parser = parse_view)]
    pub view: Option<GeoView>,

    /// Initially selected province
    #[arg(long, value_name = "NAME")]
    pub province: Option<String>,

    /// Initially selected municipality
    #[arg(long, value_name = "NAME")]
    pub city: Option<String>,

    /// Initially selected policy lever
    #[arg(long, value_name = "NAME")]
    pub lever: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(dir) = &self.data_dir {
            std::env::set_var("CAP_DATA_DIR", dir);
        }
        if let Some(path) = &self.cities {
            std::env::set_var("CAP_CITIES_FILE", path);
        }
        if let Some(path) = &self.actions {
            std::env::set_var("CAP_ACTIONS_FILE", path);
        }
        if let Some(path) = &self.actions_mod {
            std::env::set_var("CAP_ACTIONS_MOD_FILE", path);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

fn parse_view(value: &str) -> Result<GeoView, String> {
    GeoView::parse(value)
        .ok_or_else(|| format!("unknown view '{value}' (expected national, provincial or municipal)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection_flags() {
        let args = CliArgs::try_parse_from([
            "cap_dashboard",
            "--headless",
            "--view",
            "municipal",
            "--province",
            "ON",
            "--city",
            "Guelph",
        ])
        .unwrap();

        assert!(args.headless);
        assert_eq!(args.view, Some(GeoView::Municipal));
        assert_eq!(args.city.as_deref(), Some("Guelph"));
    }

    #[test]
    fn rejects_unknown_view() {
        assert!(CliArgs::try_parse_from(["cap_dashboard", "--view", "galactic"]).is_err());
    }

    #[test]
    fn help_lists_data_flags() {
        assert!(CliArgs::help_text().contains("--data-dir"));
    }
}
