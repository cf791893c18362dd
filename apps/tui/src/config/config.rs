use cap_core::DatasetKind;
use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "./data";

/// Where the datasets live and how verbose the logs are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub cities_file: PathBuf,
    pub actions_file: PathBuf,
    pub actions_mod_file: PathBuf,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
}

impl AppConfig {
    /// Reads the process environment after loading `.env`.
    ///
    /// Variables already set (including those written by CLI overrides) win
    /// over `.env` entries.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_dir =
            non_empty("CAP_DATA_DIR").map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        // File overrides are taken as given; defaults sit in the data directory.
        let file = |key: &str, kind: DatasetKind| {
            non_empty(key).map_or_else(|| data_dir.join(kind.default_file_name()), PathBuf::from)
        };

        Self {
            cities_file: file("CAP_CITIES_FILE", DatasetKind::Cities),
            actions_file: file("CAP_ACTIONS_FILE", DatasetKind::Actions),
            actions_mod_file: file("CAP_ACTIONS_MOD_FILE", DatasetKind::ActionsModified),
            log_file: non_empty("CAP_LOG_FILE").map(PathBuf::from),
            debug: non_empty("DEBUG").is_some_and(|value| is_truthy(&value)),
            data_dir,
        }
    }

    pub fn dataset_path(&self, kind: DatasetKind) -> &Path {
        match kind {
            DatasetKind::Cities => &self.cities_file,
            DatasetKind::Actions => &self.actions_file,
            DatasetKind::ActionsModified => &self.actions_mod_file,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub const fn default_log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "warn"
        }
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect::<HashMap<_, _>>();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_into_data_dir() {
        let config = config(&[]);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(
            config.dataset_path(DatasetKind::ActionsModified),
            Path::new("./data/actions_mod.json")
        );
        assert_eq!(config.default_log_level(), "warn");
        assert!(config.log_file.is_none());
    }

    #[test]
    fn file_overrides_ignore_data_dir() {
        let config = config(&[
            ("CAP_DATA_DIR", "/srv/cap"),
            ("CAP_CITIES_FILE", "fixtures/cities.json"),
        ]);
        assert_eq!(config.cities_file, PathBuf::from("fixtures/cities.json"));
        assert_eq!(config.actions_file, PathBuf::from("/srv/cap/actions.json"));
    }

    #[test]
    fn debug_flag_accepts_common_spellings() {
        assert!(config(&[("DEBUG", "1")]).debug);
        assert!(config(&[("DEBUG", "true")]).debug);
        assert!(!config(&[("DEBUG", "0")]).debug);
        assert!(!config(&[("DEBUG", "")]).debug);
        assert_eq!(config(&[("DEBUG", "yes")]).default_log_level(), "debug");
    }
}
