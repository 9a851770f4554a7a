//! CLI for the CSP deduction front-end

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use csp_deduce::{
    config::{CliOverrides, OutputFormat, Settings},
    report::ReportFormatter,
};
use log::warn;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "csp_deduce")]
#[command(about = "Forced-value deduction for finite-domain CSPs")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem read from stdin or a file
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Problem file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Solver executable (overrides config)
        #[arg(short, long)]
        backend: Option<String>,

        /// Deduction time limit in seconds, 0 for none (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output format (overrides config)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Create example configuration and input files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            config,
            input,
            backend,
            timeout,
            format,
        } => solve_command(config, input, backend, timeout, format),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn solve_command(
    config_path: PathBuf,
    input: Option<PathBuf>,
    backend: Option<String>,
    timeout: Option<u64>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let mut settings = if config_path.exists() {
        Settings::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        warn!(
            "config file {} not found, using defaults",
            config_path.display()
        );
        Settings::default()
    };

    settings.merge_with_cli(&CliOverrides {
        backend,
        timeout,
        format,
    });
    settings.validate().context("Configuration validation failed")?;
    let output_format = settings.output.format;

    let report = match input {
        Some(path) => {
            let file = std::fs::File::open(&path)
                .with_context(|| format!("Failed to open problem file {}", path.display()))?;
            csp_deduce::solve_problem(settings, BufReader::new(file))?
        }
        None => csp_deduce::solve_problem(settings, io::stdin().lock())?,
    };

    ReportFormatter::write(&report, output_format, &mut io::stdout().lock())
        .context("Failed to write report")?;
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    let config_path = directory.join("config/default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let problems_dir = directory.join("input/problems");
    std::fs::create_dir_all(&problems_dir)
        .with_context(|| format!("Failed to create directory {}", problems_dir.display()))?;
    write_example(&problems_dir.join("forced.csp"), FORCED_EXAMPLE, force)?;
    write_example(&problems_dir.join("pair_sum.csp"), PAIR_SUM_EXAMPLE, force)?;
    println!("Created example problems in: {}", problems_dir.display());

    println!("\nNext steps:");
    println!("1. Point solver.command in {} at your solver", config_path.display());
    println!(
        "2. Run: csp_deduce solve --input {}",
        problems_dir.join("forced.csp").display()
    );

    Ok(())
}

fn write_example(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Skipped: {} (already exists)", path.display());
        return Ok(());
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// One boolean pinned to true; deduction proves `x` forced
const FORCED_EXAMPLE: &str = "#x\n(bool x)\n(= x true)\n";

/// x + y = 3 over [0,3]: satisfiable, but neither variable is forced
const PAIR_SUM_EXAMPLE: &str = "#x y\n(int x 0 3)\n(int y 0 3)\n(= (+ x y) 3)\n";

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "csp_deduce",
            "solve",
            "--backend",
            "csugar",
            "--timeout",
            "30",
            "--format",
            "json",
        ]);

        assert!(cli.is_ok());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        let result = setup_command(temp_dir.path().to_path_buf(), false);

        assert!(result.is_ok());
        assert!(temp_dir.path().join("config/default.yaml").exists());
        assert!(temp_dir.path().join("input/problems/forced.csp").exists());
        assert!(temp_dir.path().join("input/problems/pair_sum.csp").exists());
    }
}
