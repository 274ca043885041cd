use std::time::Duration;

use anyhow::{bail, Context};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Apps Script web-app URL that performs the cell writes. `None` leaves
    /// the service up (health reports it) but refuses batch updates.
    pub script_url: Option<String>,
    pub default_spreadsheet_id: String,
    pub sheet_name: String,
    /// Column holding the availability flag, e.g. `C`.
    pub availability_column: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let availability_column = non_blank("AVAILABILITY_COLUMN")
            .unwrap_or_else(|| "C".to_string())
            .trim()
            .to_ascii_uppercase();
        if !availability_column.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("AVAILABILITY_COLUMN must be a column letter, got {availability_column:?}");
        }

        let timeout_secs: u64 = non_blank("SHEETS_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .trim()
            .parse()
            .context("SHEETS_TIMEOUT_SECS must be a whole number of seconds")?;
        if timeout_secs == 0 {
            bail!("SHEETS_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            script_url: non_blank("SHEETS_SCRIPT_URL").map(|v| v.trim().to_string()),
            default_spreadsheet_id: non_blank("DEFAULT_SPREADSHEET_ID")
                .map(|v| v.trim().to_string())
                .context("DEFAULT_SPREADSHEET_ID must be set")?,
            sheet_name: non_blank("SHEET_NAME").unwrap_or_else(|| "Sheet1".to_string()),
            availability_column,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn script_configured(&self) -> bool {
        self.script_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_spreadsheet_is_set() {
        let config = load(&[("DEFAULT_SPREADSHEET_ID", "sheet-123")]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.sheet_name, "Sheet1");
        assert_eq!(config.availability_column, "C");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.script_configured());
    }

    #[test]
    fn spreadsheet_id_is_required() {
        let err = load(&[("SHEETS_SCRIPT_URL", "https://example.test/exec")]).unwrap_err();
        assert!(err.to_string().contains("DEFAULT_SPREADSHEET_ID"));
    }

    #[test]
    fn blank_script_url_counts_as_unconfigured() {
        let config = load(&[("DEFAULT_SPREADSHEET_ID", "s"), ("SHEETS_SCRIPT_URL", "  ")]).unwrap();
        assert!(config.script_url.is_none());
    }

    #[test]
    fn column_is_normalised_to_upper_case() {
        let config =
            load(&[("DEFAULT_SPREADSHEET_ID", "s"), ("AVAILABILITY_COLUMN", "d")]).unwrap();
        assert_eq!(config.availability_column, "D");
    }

    #[test]
    fn column_rejects_digits() {
        assert!(load(&[("DEFAULT_SPREADSHEET_ID", "s"), ("AVAILABILITY_COLUMN", "C1")]).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(load(&[("DEFAULT_SPREADSHEET_ID", "s"), ("SHEETS_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = load(&[("DEFAULT_SPREADSHEET_ID", "s"), ("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
