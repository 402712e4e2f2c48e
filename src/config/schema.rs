use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User preferences for speed calculations and the default venue file.
///
/// Example YAML:
/// ```yaml
/// table_in_yps: false
/// run_time_in_ops: true
/// venue_config: /home/me/agility/akc.json
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Include table time when computing yards per second
    #[serde(default)]
    pub table_in_yps: bool,

    /// Always divide by the full run time when computing obstacles per second
    #[serde(default)]
    pub run_time_in_ops: bool,

    /// Venue configuration document used when none is given on the command line
    #[serde(default)]
    pub venue_config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.table_in_yps);
        assert!(!config.run_time_in_ops);
        assert!(config.venue_config.is_none());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            table_in_yps: true,
            run_time_in_ops: false,
            venue_config: Some(PathBuf::from("/tmp/akc.json")),
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_parse() {
        let yaml = r#"
run_time_in_ops: true
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert!(config.run_time_in_ops);
        assert!(!config.table_in_yps);
        assert!(config.venue_config.is_none());
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "table_in_ops: true\n";
        let result: Result<Config, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }
}
