use crate::backend::model::{Column, ColumnType, Filter};
use crate::error::{Result, TableError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Page sizes offered by the rows-per-page selector.
pub const ROWS_PER_PAGE_OPTIONS: [usize; 12] =
    [5, 10, 15, 20, 25, 50, 75, 100, 200, 500, 1000, 5000];

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "remote-table", "RemoteTable")
}

/// Everything the table needs at construction. Nothing here is global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Prefix of every fetch url, e.g. `http://localhost:3000/api`.
    pub base_url: String,
    /// Path appended to `base_url`, e.g. `/customers`.
    pub url: String,
    pub columns: Vec<Column>,
    /// Column holding the stable row identifier. Also the initial sort key.
    pub id_column: String,
    pub rows_per_page: usize,
    #[serde(rename = "where")]
    pub filters: Vec<Filter>,
    /// Maximum height of the table area in terminal lines.
    pub table_height: Option<u16>,
    /// Named colour (`"white"`, `"cyan"`, ...) or `#rrggbb`.
    pub text_color: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub date_format: String,
    pub currency_symbol: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            url: String::new(),
            columns: vec![Column::new("Id", ColumnType::Number)],
            id_column: "Id".to_string(),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            filters: Vec::new(),
            table_height: None,
            text_color: None,
            export_dir: None,
            request_timeout_secs: 30,
            date_format: "%Y-%m-%d".to_string(),
            currency_symbol: "$".to_string(),
        }
    }
}

impl TableConfig {
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads the config at `path`, or the default location when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<TableConfig> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(TableConfig::default()),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(TableError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            log::info!("No config at {}, using defaults", path.display());
            return Ok(TableConfig::default());
        }

        let contents = fs::read_to_string(&path)?;
        let config: TableConfig = serde_json::from_str(&contents)
            .map_err(|e| TableError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(TableError::Config("at least one column is required".into()));
        }
        if !ROWS_PER_PAGE_OPTIONS.contains(&self.rows_per_page) {
            return Err(TableError::InvalidRowsPerPage(self.rows_per_page));
        }
        Ok(())
    }

    /// `base_url` and `url` joined with exactly one slash.
    pub fn fetch_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.url.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Directory for the log file; the terminal itself is owned by the UI.
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
}
