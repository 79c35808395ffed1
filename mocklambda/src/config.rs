//! Configuration management

use serde::Deserialize;

/// Settings for the binary itself, as opposed to the emulated function
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from `MOCKLAMBDA_*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MOCKLAMBDA"))
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }

    /// Filter directive used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> String {
        format!(
            "mocklambda={level},mocklambda_runtime={level}",
            level = self.log_level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter() {
        assert_eq!(
            Config::default().log_filter(),
            "mocklambda=warn,mocklambda_runtime=warn"
        );
    }
}
