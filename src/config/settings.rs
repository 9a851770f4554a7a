//! Configuration for the CSP deduction front-end

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// External solver executable; it receives the staged problem file path
    /// as its last argument
    pub command: String,
    /// Arguments placed before the problem file path
    #[serde(default)]
    pub args: Vec<String>,
    /// Wall-clock limit for the refutation loop, checked between rounds.
    /// Zero disables the limit.
    #[serde(default)]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            solver: SolverConfig {
                command: "sugar".to_string(),
                args: Vec::new(),
                timeout_seconds: 0,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.solver.command.trim().is_empty() {
            anyhow::bail!("Solver command must not be empty");
        }
        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(ref backend) = cli_overrides.backend {
            self.solver.command = backend.clone();
            self.solver.args.clear();
        }
        if let Some(timeout) = cli_overrides.timeout {
            self.solver.timeout_seconds = timeout;
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub backend: Option<String>,
    pub timeout: Option<u64>,
    pub format: Option<OutputFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_round_trip() {
        let settings = Settings::default();
        let yaml = serde_yaml::to_string(&settings).unwrap();
        let parsed: Settings = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed.solver.command, "sugar");
        assert_eq!(parsed.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_empty_command_rejected() {
        let mut settings = Settings::default();
        settings.solver.command = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cli_override_replaces_command_and_args() {
        let mut settings = Settings::default();
        settings.solver.args = vec!["-v".to_string()];
        settings.merge_with_cli(&CliOverrides {
            backend: Some("csugar".to_string()),
            timeout: Some(30),
            format: Some(OutputFormat::Json),
        });

        assert_eq!(settings.solver.command, "csugar");
        assert!(settings.solver.args.is_empty());
        assert_eq!(settings.solver.timeout_seconds, 30);
        assert_eq!(settings.output.format, OutputFormat::Json);
    }
}
