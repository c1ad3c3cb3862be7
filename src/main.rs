// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use subnotes::app_config::{self, Config, ProviderKind};
use subnotes::app_controller::Controller;

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::OpenAI => ProviderKind::OpenAI,
            CliProvider::Anthropic => ProviderKind::Anthropic,
            CliProvider::LMStudio => ProviderKind::LMStudio,
        }
    }
}

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

/// Options shared by every pipeline command
#[derive(Args, Debug, Clone)]
struct GlobalArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Text-generation provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliProvider>,

    /// Model name to use for annotation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Percentage of each subtitle file to process (0-100]
    #[arg(long, global = true)]
    percentage: Option<f64>,

    /// Maximum number of requests in flight
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Hide progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Unpack subtitle archives into the configured output directory
    Extract,

    /// Annotate season folders and write their tables and charts
    Annotate {
        /// Season folders; all configured seasons when omitted
        #[arg(value_name = "SEASON_FOLDER")]
        folders: Vec<PathBuf>,
    },

    /// Build the cross-season category matrix and heatmap
    Heatmap,

    /// Extract, annotate every configured season, then build the heatmap
    Run,

    /// Generate shell completions for subnotes
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Subnotes - cultural notes for subtitles
///
/// Annotates subtitle lines with short cultural explanations using LLM
/// providers, then summarises note categories per season and across seasons.
#[derive(Parser, Debug)]
#[command(name = "subnotes")]
#[command(version)]
#[command(about = "Cultural annotation of subtitles with LLMs")]
#[command(long_about = "Subnotes extracts subtitle archives, asks an LLM for cultural notes on each line,
classifies the notes and reports category statistics per season and across seasons.

EXAMPLES:
    subnotes run                                   # Full pipeline from conf.json
    subnotes extract                               # Only unpack archives
    subnotes annotate extracted_srt/s1             # Annotate one season folder
    subnotes annotate --percentage 10 s1 s2        # Try the first 10% of every file
    subnotes -p anthropic -m claude-3-5-haiku-latest annotate
    subnotes heatmap                               # Rebuild the cross-season report
    subnotes completions bash > subnotes.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key, default: gpt-4o)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
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
        // Filtering is left to log::max_level so it can change after init
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let level = record.level();
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subnotes", &mut std::io::stdout());
        return Ok(());
    }

    let global = cli.global;
    if let Some(level) = &global.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&global)?;
    // Only these commands talk to a provider
    let validation = match cli.command {
        Commands::Annotate { .. } | Commands::Run => config.validate(),
        _ => config.validate_offline(),
    };
    validation.context("Configuration validation failed")?;

    if global.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?.with_progress(!global.no_progress);

    match cli.command {
        Commands::Extract => {
            let summary = controller.run_extract()?;
            for (archive, reason) in &summary.failed {
                warn!("Could not extract {:?}: {}", archive, reason);
            }
        }
        Commands::Annotate { folders } => {
            let reports = controller.run_annotate(&folders).await?;
            for report in &reports {
                info!(
                    "{}: {} tokens, estimated cost ${:.4}, table {:?}",
                    report.name, report.total_tokens, report.estimated_cost, report.table_path
                );
            }
        }
        Commands::Heatmap => {
            let report = controller.run_heatmap()?;
            info!(
                "{} categories across {} season(s)",
                report.matrix.categories().len(),
                report.matrix.seasons().len()
            );
        }
        Commands::Run => {
            controller.run_all().await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load the config file, creating it with defaults when missing, then apply CLI overrides
fn load_config(options: &GlobalArgs) -> Result<Config> {
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(provider) = &options.provider {
        let kind: ProviderKind = provider.clone().into();
        if kind != config.provider.kind {
            // Model, endpoint and key belong to the previous provider
            config.provider = app_config::ProviderConfig::new(kind);
        }
    }

    if let Some(model) = &options.model {
        config.provider.model = model.clone();
    }

    if let Some(percentage) = options.percentage {
        config.processing.percentage = percentage;
    }

    if let Some(concurrency) = options.concurrency {
        config.annotation.concurrent_requests = concurrency;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}
