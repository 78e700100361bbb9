use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use lingpick::command::{self, AddOptions};
use lingpick::config::{parse_languages, Config, SourceKind};
use lingpick::credentials::ChainedCredentials;
use lingpick::key::KeyMode;
use lingpick::paths::relative_path;
use lingpick::source::TerminalPrompter;
use lingpick::LingpickError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "lingpick")]
#[command(version)]
#[command(about = "Add translation keys to per-language JSON locale files")]
struct Cli {
    /// Project root (defaults to LINGPICK_PROJECT_ROOT or the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Comma-separated language codes (overrides LINGPICK_LANGUAGES)
    #[arg(long, global = true, value_name = "CODES")]
    languages: Option<String>,

    /// Locale file pattern with a {lang} placeholder (overrides LINGPICK_FILES_PATH)
    #[arg(long, global = true, value_name = "PATTERN", conflicts_with = "discover")]
    files_path: Option<String>,

    /// Find locale files by directory convention instead of using a pattern
    #[arg(long, global = true)]
    discover: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a translation key to every locale file
    Add {
        /// Key (common.hello) or code containing t('common.hello')
        #[arg(value_name = "KEY")]
        input: String,

        /// Where translations come from (overrides LINGPICK_SOURCE)
        #[arg(short, long, value_enum)]
        source: Option<SourceArg>,

        /// Source text to machine-translate (prompted for when omitted)
        #[arg(short, long)]
        text: Option<String>,

        /// Only accept t('...') input and keys with at least two segments
        #[arg(long)]
        strict: bool,
    },

    /// Show whether a key exists in each locale file
    Check {
        #[arg(value_name = "KEY")]
        input: String,

        #[arg(long)]
        strict: bool,
    },

    /// Print the locale file for each configured language
    Resolve,

    /// List locale files found by directory convention
    Discover,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Manual,
    Gemini,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Manual => SourceKind::Manual,
            SourceArg::Gemini => SourceKind::Gemini,
        }
    }
}

fn key_mode(strict: bool) -> KeyMode {
    if strict {
        KeyMode::Strict
    } else {
        KeyMode::Lenient
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(root) = &cli.root {
        config.project_root = root.clone();
    }
    if let Some(languages) = &cli.languages {
        config.languages = parse_languages(languages);
    }
    if let Some(pattern) = &cli.files_path {
        config.files_path = Some(pattern.clone());
    }
    if cli.discover {
        config.files_path = None;
    }
    if let Commands::Add {
        source: Some(source),
        ..
    } = &cli.command
    {
        config.source = (*source).into();
    }

    config.validate()?;
    debug!("Configuration: {:?}", config);
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let root = config.project_root.as_path();

    match cli.command {
        Commands::Add {
            input, text, strict, ..
        } => {
            let options = AddOptions {
                input,
                mode: key_mode(strict),
                source_text: text,
            };
            let credentials = ChainedCredentials::user_default();
            let outcome =
                command::run_add(&config, &options, &TerminalPrompter, &credentials).await?;

            for warning in &outcome.warnings {
                warn!("{}", warning);
            }
            for line in outcome.report_lines(root) {
                println!("{}", line);
            }
        }
        Commands::Check { input, strict } => {
            let (key, presence) = command::check_key(&config, &input, key_mode(strict))?;
            for entry in presence {
                println!(
                    "{:<8} {:<8} {}",
                    entry.target.language,
                    if entry.exists { "present" } else { "missing" },
                    relative_path(Some(root), &entry.target.path).display()
                );
            }
            info!("Checked '{}'", key);
        }
        Commands::Resolve => {
            for target in command::resolve_targets(&config)? {
                println!(
                    "{:<8} {}",
                    target.language,
                    relative_path(Some(root), &target.path).display()
                );
            }
        }
        Commands::Discover => {
            let files = command::discover(&config)?;
            println!("Found {} locale file(s):", files.len());
            for file in files {
                println!(
                    "{:<12} {}",
                    file.locale.as_deref().unwrap_or("unknown"),
                    relative_path(Some(root), &file.path).display()
                );
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging (stderr, so stdout stays clean for results)
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        "lingpick=info"
            .parse()
            .expect("static directive is valid"),
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<LingpickError>() {
            Some(LingpickError::UserCancelled) => {
                println!("Translation cancelled");
                ExitCode::SUCCESS
            }
            _ => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
