// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};

use albsub::app_config::{Config, LogLevel, TranslationProvider};
use albsub::app_controller::Controller;

/// CLI wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an SRT subtitle file using AI providers (default command)
    #[command(alias = "translate")]
    Translate(TranslateArgs),

    /// Validate a translated SRT file against its original, block by block
    Validate {
        /// Original SRT file
        #[arg(value_name = "ORIGINAL")]
        original: PathBuf,

        /// Translated SRT file
        #[arg(value_name = "TRANSLATED")]
        translated: PathBuf,
    },

    /// Detect the language of an SRT subtitle file
    Detect {
        /// SRT file to inspect
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,
    },

    /// Generate shell completions for albsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input SRT file to translate
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output SRT file (defaults to <input>.<target>.srt next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the active provider (overrides config and environment)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Source language code (e.g., 'en', 'it', 'fr'); auto-detected when omitted
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'sq', 'en', 'es')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Blocks per translation batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Preceding blocks carried as read-only context per batch
    #[arg(long)]
    context_window: Option<usize>,

    /// Concurrent workers pulling batches
    #[arg(short, long)]
    workers: Option<usize>,

    /// Retry budget per block that fails structural validation
    #[arg(long)]
    max_retries: Option<u32>,

    /// Sampling temperature for generation (0.0 to 1.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Configuration file path
    #[arg(short, long, default_value = "albsub.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// albsub - AI subtitle translation
///
/// Translates SRT subtitle files using AI providers (Ollama, OpenAI,
/// Anthropic), validating every translated block against its original.
#[derive(Parser, Debug)]
#[command(name = "albsub")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered SRT subtitle translation tool")]
#[command(long_about = "albsub translates SRT subtitle files using AI providers, batching blocks
with surrounding context and validating every translated block structurally
against its original (line counts, markup tags, speaker labels).

EXAMPLES:
    albsub movie.srt                        # Translate using default config
    albsub -f movie.srt                     # Force overwrite existing output
    albsub -p openai -m gpt-4o movie.srt    # Use specific provider and model
    albsub -s en -t sq movie.srt            # Translate from English to Albanian
    albsub -w 4 --batch-size 30 movie.srt   # Tune concurrency and batching
    albsub validate movie.srt movie.sq.srt  # Re-check a finished translation
    albsub detect movie.srt                 # Report the detected language
    albsub completions bash > albsub.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in albsub.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically. API keys can also be
    supplied via OPENAI_API_KEY / ANTHROPIC_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input SRT file to translate
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output SRT file (defaults to <input>.<target>.srt next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the active provider (overrides config and environment)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Source language code (e.g., 'en', 'it', 'fr'); auto-detected when omitted
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'sq', 'en', 'es')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Blocks per translation batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Preceding blocks carried as read-only context per batch
    #[arg(long)]
    context_window: Option<usize>,

    /// Concurrent workers pulling batches
    #[arg(short, long)]
    workers: Option<usize>,

    /// Retry budget per block that fails structural validation
    #[arg(long)]
    max_retries: Option<u32>,

    /// Sampling temperature for generation (0.0 to 1.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Configuration file path
    #[arg(short, long, default_value = "albsub.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "albsub", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Validate { original, translated }) => {
            let config = Config::default();
            let controller = Controller::new(config);
            controller.run_validate(&original, &translated)
        }
        Some(Commands::Detect { input_path }) => {
            let config = Config::default();
            let controller = Controller::new(config);
            controller.run_detect(&input_path)
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let translate_args = TranslateArgs {
                input_path,
                output: cli.output,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                model: cli.model,
                api_key: cli.api_key,
                source_language: cli.source_language,
                target_language: cli.target_language,
                batch_size: cli.batch_size,
                context_window: cli.context_window,
                workers: cli.workers,
                max_retries: cli.max_retries,
                temperature: cli.temperature,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(translate_args).await
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    let config = load_config(&options)?;

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    if !options.input_path.is_file() {
        return Err(anyhow!("Input file does not exist: {:?}", options.input_path));
    }

    let controller = Controller::new(config);
    controller
        .run_translate(&options.input_path, options.output.clone(), options.force_overwrite)
        .await
}

/// Load the configuration file, creating a default one when missing, and
/// apply command line overrides.
fn load_config(options: &TranslateArgs) -> Result<Config> {
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        // Find the provider config and update the model
        let provider_str = config.translation.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }

    if let Some(api_key) = &options.api_key {
        let provider_str = config.translation.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.api_key = api_key.clone();
        }
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = Some(source_lang.clone());
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(batch_size) = options.batch_size {
        config.translation.batch.batch_size = batch_size;
    }

    if let Some(context_window) = options.context_window {
        config.translation.batch.context_window = context_window;
    }

    if let Some(workers) = options.workers {
        config.translation.batch.workers = workers;
    }

    if let Some(max_retries) = options.max_retries {
        config.translation.batch.max_retries = max_retries;
    }

    if let Some(temperature) = options.temperature {
        config.translation.common.temperature = temperature;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}
