// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use sdlxliff::app_config::{self, Config};
use sdlxliff::app_controller::{Controller, FolderReport};
use sdlxliff::file_utils::FileManager;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print languages and segment counts of a document or folder
    Inspect {
        /// Document or directory to inspect
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export target segments to a JSON translation sheet
    Export {
        /// Document or directory to export
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Sheet path (single document only; defaults to `<name>.json`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a translation sheet and write the document back
    Apply {
        /// Document or directory to patch
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Sheet path (single document only; defaults to `<name>.json`)
        #[arg(short, long)]
        sheet: Option<PathBuf>,

        /// Output document (single document only)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// sdlxliff - segment extraction and write-back for SDLXLIFF documents
#[derive(Parser, Debug)]
#[command(name = "sdlxliff")]
#[command(version)]
#[command(about = "Read, export and patch target segments of SDLXLIFF documents")]
#[command(long_about = "Reads SDLXLIFF bilingual documents, exports their target segments to JSON
translation sheets and writes edited segments back without disturbing the rest of the file.

EXAMPLES:
    sdlxliff inspect project/                   # Summarize every document in a folder
    sdlxliff export file.sdlxliff               # Write file.json next to the document
    sdlxliff apply file.sdlxliff                # Apply file.json and overwrite the document
    sdlxliff -f apply file.sdlxliff -o out.sdlxliff
    sdlxliff completions bash > sdlxliff.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Force overwrite of existing output files
    #[arg(short, long, global = true)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Color and marker for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "✗"),
            Level::Warn => ("1;33", "!"),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "·"),
            Level::Trace => ("1;35", "…"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Start at info; the configured level is applied once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "sdlxliff", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.into());
    }

    let mut config = load_or_create_config(&cli.config_path)?;
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    if cli.force_overwrite {
        config.output.force_overwrite = true;
    }
    log::set_max_level(config.log_level.into());

    let controller = Controller::with_config(config)?;

    let report = match cli.command {
        Commands::Inspect { input_path, json } => controller.run_folder(&input_path, |path| {
            let summary = controller.inspect(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{}\t{} -> {}\t{} file(s)\t{} unit(s)\t{} tag-only\t{} segment(s)\t{} placeholder-only\t{} mt",
                    summary.path.display(),
                    summary.source_language,
                    summary.target_language,
                    summary.files,
                    summary.units,
                    summary.tag_only_units,
                    summary.target_segments,
                    summary.placeholder_segments,
                    summary.machine_translated_segments
                );
            }
            Ok(())
        })?,
        Commands::Export { input_path, output } => {
            let output = single_document_option(&input_path, output, "--output")?;
            controller.run_folder(&input_path, |path| {
                let written = controller.export(path, output.as_deref())?;
                info!("Success: {:?}", written);
                Ok(())
            })?
        }
        Commands::Apply { input_path, sheet, output } => {
            let sheet = single_document_option(&input_path, sheet, "--sheet")?;
            let output = single_document_option(&input_path, output, "--output")?;
            controller.run_folder(&input_path, |path| {
                let sheet_path = sheet
                    .clone()
                    .unwrap_or_else(|| FileManager::generate_sheet_path(path));
                if let Some(written) = controller.apply(path, &sheet_path, output.as_deref())? {
                    info!("Success: {:?}", written);
                }
                Ok(())
            })?
        }
        Commands::Completions { .. } => FolderReport::default(),
    };

    finish(report)
}

// @loads: Configuration file, writing a default one when missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::from_file(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config.save(config_path)?;
    Ok(config)
}

// @checks: Per-document options only make sense for a single file
fn single_document_option(input_path: &Path, value: Option<PathBuf>, flag: &str) -> Result<Option<PathBuf>> {
    if value.is_some() && input_path.is_dir() {
        return Err(anyhow!("{} can only be used with a single document", flag));
    }
    Ok(value)
}

fn finish(report: FolderReport) -> Result<()> {
    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("{} document(s) failed", report.failed.len()))
    }
}
