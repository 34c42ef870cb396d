//! INI file configuration adapter.

use crate::domain::error::TurtleError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TurtleError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TurtleError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TurtleError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TurtleError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// An adapter with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .filter(|v| !v.trim().is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
dir = ./data

[analysis]
period = 20
ma_windows = 5,20,40
stop_multiplier = 2.0

[sizing]
capital = 10000
risk_percent = 0.01

[costs]
fee_rate = 0.016
fx_rate = 1450
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("data", "dir"), Some("./data".to_string()));
        assert_eq!(
            adapter.get_string("analysis", "ma_windows"),
            Some("5,20,40".to_string())
        );
        assert_eq!(adapter.get_int("analysis", "period", 0), 20);
        assert_eq!(adapter.get_double("costs", "fee_rate", 0.0), 0.016);
        assert_eq!(adapter.get_double_opt("sizing", "capital"), Some(10000.0));
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string("[analysis]\n").unwrap();
        assert_eq!(adapter.get_string("analysis", "missing"), None);
        assert_eq!(adapter.get_string("nope", "key"), None);
        assert_eq!(adapter.get_int("analysis", "period", 20), 20);
        assert_eq!(adapter.get_double("costs", "fx_rate", 1.0), 1.0);
        assert_eq!(adapter.get_double_opt("sizing", "capital"), None);
    }

    #[test]
    fn blank_value_is_missing() {
        let adapter = FileConfigAdapter::from_string("[sizing]\ncapital =\n").unwrap();
        assert_eq!(adapter.get_string("sizing", "capital"), None);
    }

    #[test]
    fn non_numeric_values_fall_back() {
        let adapter =
            FileConfigAdapter::from_string("[analysis]\nperiod = abc\nstop_multiplier = x\n")
                .unwrap();
        assert_eq!(adapter.get_int("analysis", "period", 20), 20);
        assert_eq!(adapter.get_double("analysis", "stop_multiplier", 2.0), 2.0);
        assert_eq!(adapter.get_double_opt("analysis", "stop_multiplier"), None);
    }

    #[test]
    fn empty_adapter_has_nothing() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("data", "dir"), None);
        assert_eq!(adapter.get_int("analysis", "period", 20), 20);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(SAMPLE);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_double("costs", "fx_rate", 0.0), 1450.0);
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        match FileConfigAdapter::from_file("/nonexistent/path/turtle.ini") {
            Err(TurtleError::ConfigParse { file, .. }) => {
                assert_eq!(file, "/nonexistent/path/turtle.ini")
            }
            Err(other) => panic!("expected ConfigParse, got {other:?}"),
            Ok(_) => panic!("expected an error"),
        }
    }
}
