use std::path::PathBuf;

use crate::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON seed catalog to import (`FIELDBOOK_SEED`).
    pub seed_path: Option<PathBuf>,
    /// Pretty-print the JSON written to stdout (`FIELDBOOK_PRETTY`).
    pub pretty: bool,
    /// Page size used when printing the imported fields (`FIELDBOOK_PAGE_SIZE`).
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_path: None,
            pretty: true,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { var, value } => write!(f, "invalid value for {var}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.seed_path = lookup("FIELDBOOK_SEED")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        if let Some(v) = lookup("FIELDBOOK_PRETTY") {
            config.pretty = match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::Invalid { var: "FIELDBOOK_PRETTY", value: v }),
            };
        }
        if let Some(v) = lookup("FIELDBOOK_PAGE_SIZE") {
            config.page_size = v
                .parse()
                .ok()
                .filter(|n| (1..=MAX_PAGE_SIZE).contains(n))
                .ok_or(ConfigError::Invalid { var: "FIELDBOOK_PAGE_SIZE", value: v })?;
        }
        Ok(config)
    }

    /// A path given on the command line wins over `FIELDBOOK_SEED`.
    pub fn with_seed_arg(mut self, arg: Option<String>) -> Self {
        if let Some(path) = arg {
            self.seed_path = Some(PathBuf::from(path));
        }
        self
    }
}
