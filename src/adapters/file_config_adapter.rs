//! INI file configuration adapter.

use crate::domain::error::AnalysisError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    /// Load an INI file. Section and key names are case-insensitive.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AnalysisError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Option<Result<i64, String>> {
        match self.config.getint(section, key) {
            Ok(value) => value.map(Ok),
            Err(_) => self.get_string(section, key).map(|raw| Err(raw.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
source = csv
csv_dir = /var/prices

[analysis]
ticker = AAPL
benchmark = ^GSPC

[report]
format = html
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "csv_dir"),
            Some("/var/prices".to_string())
        );
        assert_eq!(
            adapter.get_string("analysis", "benchmark"),
            Some("^GSPC".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[analysis]\nticker = MSFT\n").unwrap();
        assert_eq!(adapter.get_string("analysis", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[analysis]\nma_window = 20\n").unwrap();
        assert_eq!(adapter.get_int("analysis", "ma_window"), Some(Ok(20)));
    }

    #[test]
    fn get_int_returns_none_for_missing() {
        let adapter = FileConfigAdapter::from_string("[data]\n").unwrap();
        assert_eq!(adapter.get_int("data", "retries"), None);
    }

    #[test]
    fn get_int_reports_non_numeric_value() {
        let adapter = FileConfigAdapter::from_string("[data]\nretries = many\n").unwrap();
        assert_eq!(adapter.get_int("data", "retries"), Some(Err("many".to_string())));
    }

    #[test]
    fn get_date_parses_iso_dates() {
        let adapter = FileConfigAdapter::from_string(
            "[analysis]\nstart_date = 2024-01-02\nend_date = 02/01/2024\n",
        )
        .unwrap();
        assert_eq!(
            adapter.get_date("analysis", "start_date"),
            Some(Ok(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()))
        );
        assert_eq!(
            adapter.get_date("analysis", "end_date"),
            Some(Err("02/01/2024".to_string()))
        );
        assert_eq!(adapter.get_date("analysis", "missing"), None);
    }

    #[test]
    fn section_names_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Analysis]\nTicker = BHP.AX\n").unwrap();
        assert_eq!(adapter.get_string("analysis", "ticker"), Some("BHP.AX".to_string()));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\noutput = /tmp/aapl.html\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "output"),
            Some("/tmp/aapl.html".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(
            result,
            Err(AnalysisError::ConfigParse { ref file, .. }) if file == "/nonexistent/path/config.ini"
        ));
    }
}
