//! Pipeline configuration loading

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use posture_analysis::AnalysisConfig;
use report_pdf::CompilerConfig;
use serde::{Deserialize, Serialize};
use visualizer::RenderConfig;

/// Environment variable prefix, e.g. `POSTURE__ANALYSIS__LOCALE=japanese`
pub const ENV_PREFIX: &str = "POSTURE";

/// Configuration of every pipeline stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub analysis: AnalysisConfig,
    pub render: RenderConfig,
    pub report: CompilerConfig,
}

impl PipelineConfig {
    /// Defaults, overridden by an optional TOML file, overridden by
    /// `POSTURE__`-prefixed environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_analysis::Locale;

    #[test]
    fn test_file_then_environment() {
        let path = std::env::temp_dir().join(format!("posture-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            concat!(
                "[analysis]\nvisibility_threshold = 0.5\n\n",
                "[analysis.severity]\nhigh_below = 40.0\n\n",
                "[render]\nfont_size = 24.0\n",
            ),
        )
        .unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert!((config.analysis.visibility_threshold - 0.5).abs() < 1e-6);
        assert_eq!(config.analysis.severity.high_below, 40.0);
        // Untouched keys keep their defaults
        assert_eq!(config.analysis.severity.medium_below, 70.0);
        assert_eq!(config.render.font_size, 24.0);
        assert_eq!(config.report.title, CompilerConfig::default().title);

        std::env::set_var("POSTURE__ANALYSIS__LOCALE", "japanese");
        let config = PipelineConfig::load(Some(&path)).unwrap();
        std::env::remove_var("POSTURE__ANALYSIS__LOCALE");
        assert_eq!(config.analysis.locale, Locale::Japanese);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_error() {
        let path = std::env::temp_dir().join("posture-does-not-exist.toml");
        assert!(PipelineConfig::load(Some(&path)).is_err());
    }
}
