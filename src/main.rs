// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use rpytl::app_config::{self, Config, EngineKind};
use rpytl::app_controller::Controller;
use rpytl::file_utils::{FileManager, TaskList};

/// CLI Wrapper for EngineKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEngine {
    Google,
    Bing,
    Lingva,
    Shell,
}

impl From<CliEngine> for EngineKind {
    fn from(cli_engine: CliEngine) -> Self {
        match cli_engine {
            CliEngine::Google => EngineKind::Google,
            CliEngine::Bing => EngineKind::Bing,
            CliEngine::Lingva => EngineKind::Lingva,
            CliEngine::Shell => EngineKind::Shell,
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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate script files (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for rpytl
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct TranslateArgs {
    /// Script files or directories to translate
    #[arg(value_name = "INPUT_PATH")]
    input_paths: Vec<PathBuf>,

    /// Task list file assigning documents to runs
    #[arg(long, value_name = "FILE")]
    tasks: Option<PathBuf>,

    /// Section of the task list to run, e.g. "[3]"
    #[arg(long, default_value = "[3]")]
    pattern: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Engine priority order, comma separated (unlisted engines are disabled)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    engines: Option<Vec<CliEngine>>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'id')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "rpytl.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// rpytl - Ren'Py script translator
///
/// Translates the dialogue of `.rpy` scripts through a cascade of free
/// translation engines, keeping markup, code and asset references intact.
#[derive(Parser, Debug)]
#[command(name = "rpytl")]
#[command(version)]
#[command(about = "Cascading multi-engine translator for Ren'Py scripts")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "rpytl translates quoted dialogue in Ren'Py scripts, falling back through several engines and skipping engines that keep failing.

EXAMPLES:
    rpytl tl/chapter1.rpy                       # Translate one script with the default config
    rpytl -f tl/                                # Translate every .rpy under tl/, overwriting outputs
    rpytl --tasks tl/scripts.txt --pattern '[3]'  # Translate the files assigned to section [3]
    rpytl -e bing,lingva tl/chapter1.rpy        # Only use Bing, then Lingva
    rpytl -s en -t ms tl/                       # Translate from English to Malay
    rpytl completions bash > rpytl.bash         # Generate bash completions

CONFIGURATION:
    Configuration is stored in rpytl.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

ENGINES:
    google - translate.googleapis.com free endpoint
    bing   - Bing Translator web endpoint
    lingva - Lingva instances, rotated on failure
    shell  - translate-shell ('trans') command line tool")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "rpytl", &mut std::io::stdout());
            return Ok(());
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

/// Load the configuration, writing a default one when the file is missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::load(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config.save(config_path)?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(output_dir) = &options.output_dir {
        config.output.directory = output_dir.to_string_lossy().to_string();
    }

    if let Some(engines) = &options.engines {
        let order: Vec<EngineKind> = engines.iter().cloned().map(Into::into).collect();
        config.apply_engine_order(&order);
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

/// Documents named on the command line and in the task list, in that order
fn resolve_documents(options: &TranslateArgs) -> Result<Vec<PathBuf>> {
    let mut inputs = options.input_paths.clone();

    if let Some(tasks) = &options.tasks {
        let assigned = TaskList::load(tasks, &options.pattern)?;
        info!(
            "Task list {} assigns {} documents to {}",
            tasks.display(),
            assigned.len(),
            options.pattern
        );
        inputs.extend(assigned);
    }

    if inputs.is_empty() {
        return Err(anyhow!("No input given: pass INPUT_PATH or --tasks"));
    }

    FileManager::collect_inputs(&inputs)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    let documents = resolve_documents(&options)?;
    if documents.is_empty() {
        warn!("No script documents found, nothing to do");
        return Ok(());
    }

    let mut controller = Controller::with_config(config)?;
    let summary = controller.run(&documents, options.force_overwrite).await?;

    info!(
        "Documents: {} translated, {} already translated, {} skipped",
        summary.translated, summary.already_translated, summary.skipped
    );
    Ok(())
}
