// Path: crates/cli/src/config.rs

use anyhow::{Context, Result};
use qgov_types::config::RegistryConfig;
use std::fs;
use std::path::Path;

/// Loads a TOML configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<RegistryConfig> {
    let Some(path) = path else {
        return Ok(RegistryConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
}

/// Writes the default configuration to `path`, creating parent directories.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(&RegistryConfig::default())?)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qgov_test_utils::fixtures::Fixtures;
    use qgov_types::config::LogFormat;

    #[test]
    fn default_config_round_trips_through_disk() {
        let fx = Fixtures::new().unwrap();
        let path = fx.path("conf/qgov.toml");
        write_default_config(&path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, RegistryConfig::default());
        assert!(fx.read_string("conf/qgov.toml").unwrap().contains("[voting]"));
    }

    #[test]
    fn partial_file_overrides_only_what_it_names() {
        let fx = Fixtures::new().unwrap();
        let path = fx
            .write(
                "qgov.toml",
                "[voting]\nmax_voting_period_blocks = 20\n\n[telemetry]\nlog_format = \"pretty\"\n",
            )
            .unwrap();

        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.voting.max_voting_period_blocks, Some(20));
        assert_eq!(cfg.voting.min_voting_period_blocks, 1);
        assert_eq!(cfg.telemetry.log_format, LogFormat::Pretty);
        assert_eq!(cfg.limits.max_id_len, 64);
    }

    #[test]
    fn unknown_sections_and_missing_files_are_errors() {
        let fx = Fixtures::new().unwrap();
        let path = fx.write("bad.toml", "[consensus]\nkind = \"pow\"\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
        assert!(load_config(Some(&fx.path("missing.toml"))).is_err());
        assert_eq!(load_config(None).unwrap(), RegistryConfig::default());
    }
}
