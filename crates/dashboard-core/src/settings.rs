use clap::{CommandFactory, Parser};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{DashboardError, Result};
use crate::models::YearRange;

/// Accepted `--theme` values.
pub const THEMES: [&str; 3] = ["light", "dark", "auto"];

/// Accepted `--log-level` values.
pub const LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Monthly solar production vs. weather dashboard for Calgary
#[derive(Parser, Debug, Clone)]
#[command(
    name = "solar-dashboard",
    about = "Monthly solar production vs. weather dashboard",
    version
)]
pub struct Settings {
    /// Solar production CSV file
    #[arg(long, default_value = "Solar_Energy_Production.csv")]
    pub production_file: PathBuf,

    /// Daily weather CSV file
    #[arg(long, default_value = "weatherstats_calgary_daily.csv")]
    pub weather_file: PathBuf,

    /// Timestamp column of the production file
    #[arg(long, default_value = "date")]
    pub production_timestamp_column: String,

    /// Energy (kWh) column of the production file
    #[arg(long, default_value = "kWh")]
    pub production_value_column: String,

    /// Timestamp column of the weather file
    #[arg(long, default_value = "date")]
    pub weather_timestamp_column: String,

    /// Average temperature column of the weather file
    #[arg(long, default_value = "avg_temperature")]
    pub temperature_column: String,

    /// Daylight hours column of the weather file
    #[arg(long, default_value = "daylight")]
    pub daylight_column: String,

    /// First year of the retention window (inclusive)
    #[arg(long, default_value_t = YearRange::DEFAULT_MIN)]
    pub min_year: i32,

    /// Last year of the retention window (inclusive)
    #[arg(long, default_value_t = YearRange::DEFAULT_MAX)]
    pub max_year: i32,

    /// Timezone used to bucket offset-bearing timestamps (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = THEMES)]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = LOG_LEVELS)]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// JSON configuration file supplying defaults for any flag above
    #[arg(long)]
    pub config: Option<PathBuf>,
}

// ── FileConfig ─────────────────────────────────────────────────────────────────

/// Optional JSON configuration. Every key mirrors a command-line flag.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub production_file: Option<PathBuf>,
    pub weather_file: Option<PathBuf>,
    pub production_timestamp_column: Option<String>,
    pub production_value_column: Option<String>,
    pub weather_timestamp_column: Option<String>,
    pub temperature_column: Option<String>,
    pub daylight_column: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub timezone: Option<String>,
    pub theme: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    /// `<config_dir>/solar-dashboard/config.json`, if a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("solar-dashboard").join("config.json"))
    }

    /// Read and parse the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DashboardError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ── Input descriptions ─────────────────────────────────────────────────────────

/// Where the production file lives and which columns to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionInput {
    pub path: PathBuf,
    pub timestamp_column: String,
    pub value_column: String,
}

/// Where the weather file lives and which columns to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherInput {
    pub path: PathBuf,
    pub timestamp_column: String,
    pub temperature_column: String,
    pub daylight_column: String,
}

/// Everything the load pipeline needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub production: ProductionInput,
    pub weather: WeatherInput,
    pub years: YearRange,
    /// IANA name or `"auto"`.
    pub timezone: String,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and merge the JSON config file.
    pub fn load() -> Result<Self> {
        Self::load_impl(std::env::args_os().collect(), FileConfig::default_path())
    }

    /// Full implementation: accepts args and the fallback config path so
    /// tests can redirect to a temporary directory.
    ///
    /// An explicit `--config` that cannot be read is an error; a missing
    /// file at `default_config` is silently skipped.
    pub fn load_impl(
        args: Vec<std::ffi::OsString>,
        default_config: Option<PathBuf>,
    ) -> Result<Self> {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        let file_config = match (&settings.config, default_config) {
            (Some(explicit), _) => Some(FileConfig::load_from(explicit)?),
            (None, Some(fallback)) if fallback.exists() => Some(FileConfig::load_from(&fallback)?),
            _ => None,
        };

        if let Some(file) = file_config {
            settings.merge_file_config(file, &matches);
            settings.validate_choices()?;
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        Ok(settings)
    }

    /// Copy values from `file` for every flag not given on the command line.
    fn merge_file_config(&mut self, file: FileConfig, matches: &clap::ArgMatches) {
        macro_rules! merge {
            ($settings:ident, $file:ident, $matches:ident; $($field:ident),+ $(,)?) => {
                $(
                    if !is_arg_explicitly_set($matches, stringify!($field)) {
                        if let Some(v) = $file.$field {
                            $settings.$field = v;
                        }
                    }
                )+
            };
        }

        let settings = self;
        merge!(
            settings, file, matches;
            production_file,
            weather_file,
            production_timestamp_column,
            production_value_column,
            weather_timestamp_column,
            temperature_column,
            daylight_column,
            min_year,
            max_year,
            timezone,
            theme,
            log_level,
        );

        if !is_arg_explicitly_set(matches, "log_file") && settings.log_file.is_none() {
            settings.log_file = file.log_file;
        }
    }

    /// Reject file-supplied values that the command line would not accept.
    fn validate_choices(&self) -> Result<()> {
        if !THEMES.contains(&self.theme.as_str()) {
            return Err(DashboardError::Config(format!(
                "invalid theme '{}' (expected one of: {})",
                self.theme,
                THEMES.join(", ")
            )));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(DashboardError::Config(format!(
                "invalid log_level '{}' (expected one of: {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Validated retention window.
    pub fn year_range(&self) -> Result<YearRange> {
        YearRange::new(self.min_year, self.max_year)
    }

    /// Pipeline inputs described by these settings.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        Ok(PipelineConfig {
            production: ProductionInput {
                path: self.production_file.clone(),
                timestamp_column: self.production_timestamp_column.clone(),
                value_column: self.production_value_column.clone(),
            },
            weather: WeatherInput {
                path: self.weather_file.clone(),
                timestamp_column: self.weather_timestamp_column.clone(),
                temperature_column: self.temperature_column.clone(),
                daylight_column: self.daylight_column.clone(),
            },
            years: self.year_range()?,
            timezone: self.timezone.clone(),
        })
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<OsString> {
        std::iter::once("solar-dashboard")
            .chain(list.iter().copied())
            .map(OsString::from)
            .collect()
    }

    fn write_config(tmp: &TempDir, json: &str) -> PathBuf {
        let path = tmp.path().join("config.json");
        std::fs::write(&path, json).expect("write config");
        path
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["solar-dashboard"]);

        assert_eq!(settings.production_file, PathBuf::from("Solar_Energy_Production.csv"));
        assert_eq!(settings.weather_file, PathBuf::from("weatherstats_calgary_daily.csv"));
        assert_eq!(settings.production_timestamp_column, "date");
        assert_eq!(settings.production_value_column, "kWh");
        assert_eq!(settings.weather_timestamp_column, "date");
        assert_eq!(settings.temperature_column, "avg_temperature");
        assert_eq!(settings.daylight_column, "daylight");
        assert_eq!(settings.min_year, 2017);
        assert_eq!(settings.max_year, 2022);
        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(settings.config.is_none());
    }

    #[test]
    fn test_load_without_any_config_file() {
        let tmp = TempDir::new().expect("tempdir");
        let absent = tmp.path().join("nope.json");
        let settings = Settings::load_impl(args(&[]), Some(absent)).expect("load");
        assert_eq!(settings.min_year, 2017);
    }

    // ── config file merge ─────────────────────────────────────────────────────

    #[test]
    fn test_config_file_fills_unset_flags() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(
            &tmp,
            r#"{"production_file": "/srv/solar.csv", "min_year": 2018, "theme": "light"}"#,
        );

        let settings = Settings::load_impl(args(&[]), Some(path)).expect("load");

        assert_eq!(settings.production_file, PathBuf::from("/srv/solar.csv"));
        assert_eq!(settings.min_year, 2018);
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.max_year, 2022);
    }

    #[test]
    fn test_cli_wins_over_config_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{"min_year": 2018, "daylight_column": "sun"}"#);
        let cli = format!("--config={}", path.display());

        let settings =
            Settings::load_impl(args(&[&cli, "--min-year", "2019"]), None).expect("load");

        assert_eq!(settings.min_year, 2019);
        assert_eq!(settings.daylight_column, "sun");
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("missing.json");
        let cli = format!("--config={}", missing.display());

        let err = Settings::load_impl(args(&[&cli]), None).unwrap_err();
        assert!(matches!(err, DashboardError::FileRead { .. }));
    }

    #[test]
    fn test_unknown_config_key_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{"refresh_rate": 5}"#);

        let err = Settings::load_impl(args(&[]), Some(path)).unwrap_err();
        assert!(matches!(err, DashboardError::JsonParse(_)));
    }

    #[test]
    fn test_config_file_bad_theme_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{"theme": "solarized"}"#);

        let err = Settings::load_impl(args(&[]), Some(path)).unwrap_err();
        assert!(matches!(err, DashboardError::Config(ref msg) if msg.contains("solarized")));
    }

    #[test]
    fn test_config_file_bad_log_level_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{"log_level": "verbose"}"#);

        let err = Settings::load_impl(args(&[]), Some(path)).unwrap_err();
        assert!(matches!(err, DashboardError::Config(ref msg) if msg.contains("verbose")));
    }

    #[test]
    fn test_cli_theme_masks_bad_config_theme() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{"theme": "solarized"}"#);

        let settings =
            Settings::load_impl(args(&["--theme", "dark"]), Some(path)).expect("load");
        assert_eq!(settings.theme, "dark");
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings = Settings::load_impl(args(&["--debug"]), None).expect("load");
        assert_eq!(settings.log_level, "DEBUG");
    }

    // ── derived configs ───────────────────────────────────────────────────────

    #[test]
    fn test_pipeline_config_from_flags() {
        let settings = Settings::parse_from([
            "solar-dashboard",
            "--production-file",
            "p.csv",
            "--production-value-column",
            "energy",
            "--timezone",
            "America/Edmonton",
        ]);
        let config = settings.pipeline_config().expect("config");

        assert_eq!(config.production.path, PathBuf::from("p.csv"));
        assert_eq!(config.production.value_column, "energy");
        assert_eq!(config.weather.temperature_column, "avg_temperature");
        assert_eq!(config.years, YearRange::default());
        assert_eq!(config.timezone, "America/Edmonton");
    }

    #[test]
    fn test_inverted_year_range_rejected() {
        let settings =
            Settings::parse_from(["solar-dashboard", "--min-year", "2023", "--max-year", "2017"]);
        assert!(matches!(
            settings.pipeline_config(),
            Err(DashboardError::InvalidYearRange { .. })
        ));
    }
}
