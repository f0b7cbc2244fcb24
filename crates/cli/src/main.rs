mod config;
mod report;

use config::Config;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::{control::set_override, Colorize};
use normcheck_core::{
    CategoryFilter, CommandNormalizer, FixtureRegistry, Harness, HarnessError, RunOptions,
};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

const LONG_ABOUT: &str = r##"
normcheck runs per-language text normalization fixtures against an external
normalizer and reports which cases pass.

FIXTURE FILES:
  One file per language at <data-dir>/<lang>.txt, one case per line:

    123|||cardinal                              passes if the normalizer succeeds
    123|||cardinal|||one hundred twenty three   passes if the output matches exactly

  Blank lines and lines starting with # are ignored. A line without the
  ||| delimiter, or with an empty field, is reported as malformed and
  counts as a failure; the remaining lines are still evaluated.

NORMALIZER:
  The normalizer is any program that reads the input text on stdin and
  prints the normalized text on stdout. It runs once per case with
  NORMCHECK_LANG and NORMCHECK_CATEGORY set in its environment.

    normcheck --lang en --normalizer ./normalize.sh
    normcheck --lang ta --normalizer python3 --normalizer-arg -m --normalizer-arg tn

EXIT CODES:
  0  every selected case passed (and at least one case was selected)
  1  a case failed, a fixture line was malformed, or no case was selected
  2  the run could not start (missing fixture file, no normalizer, ...)

CONFIGURATION:
  Settings can be configured via CLI flags, environment variables, or config file.
  Precedence: CLI args > Environment vars > Config file > Defaults

  Setting      | CLI flag        | Env var               | Default
  -------------|-----------------|-----------------------|-----------------
  data_dir     | --data-dir      | NORMCHECK_DATA_DIR    | data/test_cases
  normalizer   | --normalizer    | NORMCHECK_NORMALIZER  | (none)
  timeout_secs | --timeout       | NORMCHECK_TIMEOUT     | 30
  strict       | --strict        | NORMCHECK_STRICT      | false
  no_color     | -C, --no-color  | NORMCHECK_NO_COLOR    | false

  Flag env vars accept 1/true/yes/on and 0/false/no/off (any case).
  A timeout of 0 is ignored.

  Config file location: normcheck --config-path
  Generate default config: normcheck --config-init

  Note: NO_COLOR env var is also respected (https://no-color.org/)"##;

#[derive(Parser)]
#[command(name = "normcheck")]
#[command(version)]
#[command(about = "Run text normalization fixtures against a normalizer")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    /// Language code; selects <data-dir>/<CODE>.txt
    #[arg(
        long,
        value_name = "CODE",
        required_unless_present_any = ["list_langs", "config_path", "config_init"]
    )]
    lang: Option<String>,

    /// Only run cases with exactly this category (case-sensitive)
    #[arg(long, value_name = "NAME")]
    category: Option<String>,

    /// Print every case with its output and pass/fail marker
    #[arg(long)]
    verbose: bool,

    /// Output the run summary as JSON (for scripting/CI)
    #[arg(long, short = 'j')]
    json: bool,

    /// Directory holding the <lang>.txt fixture files
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Normalizer program (reads input on stdin, prints output on stdout)
    #[arg(long, value_name = "PROGRAM")]
    normalizer: Option<String>,

    /// Argument passed to the normalizer program (repeatable)
    #[arg(long = "normalizer-arg", value_name = "ARG", allow_hyphen_values = true)]
    normalizer_args: Vec<String>,

    /// Per-case normalizer timeout in seconds (at least 1)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Fail cases that have no expected output field
    #[arg(long)]
    strict: bool,

    /// List languages that have a fixture file
    #[arg(long)]
    list_langs: bool,

    /// Disable colored output
    #[arg(long, short = 'C')]
    no_color: bool,

    /// Debug logging to stderr (-d debug, -dd trace)
    #[arg(long, short = 'd', action = clap::ArgAction::Count)]
    debug: u8,

    /// Print the config file path
    #[arg(long)]
    config_path: bool,

    /// Create a default config file
    #[arg(long)]
    config_init: bool,
}

/// Exit code for runs that could not start.
const EXIT_FATAL: i32 = 2;

fn fatal(message: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), message);
    std::process::exit(EXIT_FATAL);
}

fn main() {
    let cli = Cli::parse();

    // Handle --config-path
    if cli.config_path {
        match Config::path() {
            Some(path) => println!("{}", path.display()),
            None => fatal("Cannot determine config directory"),
        }
        return;
    }

    // Handle --config-init
    if cli.config_init {
        match config::init_config() {
            Ok(path) => println!("Created config file: {}", path.display()),
            Err(e) => fatal(e),
        }
        return;
    }

    // Initialize tracing based on debug level (before config loading for logging)
    let level = match cli.debug {
        0 => LevelFilter::OFF,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if level != LevelFilter::OFF {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load config file and merge with CLI args
    // Precedence: CLI args > Environment vars > Config file > Defaults
    let file_config = Config::load();

    if let Some(path) = Config::path() {
        if path.exists() {
            tracing::debug!("Loaded config from: {}", path.display());
        } else {
            tracing::trace!("No config file at: {}", path.display());
        }
    }

    if cli.no_color || file_config.no_color() || !std::io::stdout().is_terminal() {
        set_override(false);
    }

    let data_dir = match cli.data_dir {
        Some(dir) => {
            tracing::debug!("data_dir = {} (from CLI)", dir.display());
            dir
        }
        None => {
            let dir = file_config.data_dir();
            tracing::debug!("data_dir = {} (from env/config/default)", dir.display());
            dir
        }
    };

    let registry = FixtureRegistry::new(data_dir).with_excluded(file_config.exclude_langs());

    // Handle --list-langs
    if cli.list_langs {
        match registry.languages() {
            Ok(langs) if langs.is_empty() => {
                eprintln!(
                    "No fixture files in {}",
                    registry.dir().display().to_string().bold()
                );
            }
            Ok(langs) => {
                for lang in langs {
                    println!("{}", lang);
                }
            }
            Err(e) => fatal(e),
        }
        return;
    }

    let Some(lang) = cli.lang else {
        fatal("--lang is required");
    };

    let (program, args) = match cli.normalizer {
        Some(program) => {
            tracing::debug!("normalizer = {} (from CLI)", program);
            (program, cli.normalizer_args)
        }
        None => match file_config.normalizer() {
            Some(program) => {
                tracing::debug!("normalizer = {} (from env/config)", program);
                let args = if cli.normalizer_args.is_empty() {
                    file_config.normalizer_args()
                } else {
                    cli.normalizer_args
                };
                (program, args)
            }
            None => fatal(format!(
                "No normalizer configured. Use {}, NORMCHECK_NORMALIZER or the config file ({}).",
                "--normalizer".bold(),
                "normcheck --config-path".bold()
            )),
        },
    };

    let timeout = match cli.timeout {
        Some(t) => {
            tracing::debug!("timeout = {}s (from CLI)", t);
            t
        }
        None => file_config.timeout_secs(),
    };
    let strict = cli.strict || file_config.strict();
    tracing::debug!(strict, timeout, "Run options");

    let normalizer_name = program.clone();
    let normalizer = CommandNormalizer::new(program)
        .args(args)
        .lang(lang.as_str())
        .timeout(Duration::from_secs(timeout));
    let harness =
        Harness::new(registry, Box::new(normalizer)).with_options(RunOptions { strict });
    let filter = CategoryFilter::new(cli.category);

    let verbose = cli.verbose && !cli.json;
    if !cli.json {
        println!(
            "Running fixtures for {} with normalizer {}",
            lang.bold(),
            normalizer_name.bold()
        );
    }

    let summary = match harness.run_with(&lang, &filter, |result| {
        if verbose {
            println!("{}", report::format_case(result));
        }
    }) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            if let Some(hint) = report::fatal_hint(&e) {
                eprintln!("{}", hint);
            }
            if matches!(e, HarnessError::InvalidLanguage(_)) {
                eprintln!("Run {} to see available languages.", "normcheck --list-langs".bold());
            }
            std::process::exit(EXIT_FATAL);
        }
    };

    if cli.json {
        match report::summary_json(&summary).and_then(|v| serde_json::to_string_pretty(&v)) {
            Ok(json) => println!("{}", json),
            Err(e) => fatal(e),
        }
    } else {
        println!("{}", report::format_summary(&summary));
    }

    std::process::exit(summary.status().exit_code());
}
