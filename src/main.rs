use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::*;
use spellex::cli::output::{self, OutputFormat};
use spellex::config::Overrides;
use spellex::speller::{TextFormat, YandexSpeller};
use spellex::{Config, Dictionary, ExitCode, SpellChecker};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "spellex")]
#[command(version, about = "Spellchecker CLI with exception dictionaries", long_about = None)]
struct Cli {
    /// Files to check
    #[arg(value_name = "FILES", required_unless_present = "completion")]
    files: Vec<PathBuf>,

    /// Config file (defaults to package.json, .spellexrc, .spellex.json or .spellex.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON dictionary file; repeat the flag or separate paths with ':'
    #[arg(short, long, value_name = "FILE", value_delimiter = ':')]
    dictionary: Vec<PathBuf>,

    /// Extra exception entry (plain word or /pattern/flags)
    #[arg(short, long, value_name = "WORD")]
    word: Vec<String>,

    /// Languages to check against (e.g. "en,ru")
    #[arg(short, long)]
    lang: Option<String>,

    /// Text format sent to the speller (auto, plain, html)
    #[arg(short, long)]
    format: Option<TextFormat>,

    /// Report format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    output: OutputFormat,

    /// Ignore words containing digits
    #[arg(long)]
    ignore_digits: bool,

    /// Ignore URLs, emails and file names
    #[arg(long)]
    ignore_urls: bool,

    /// Ignore wrong capitalization
    #[arg(long)]
    ignore_capitalization: bool,

    /// Report repeated words
    #[arg(long)]
    find_repeat_words: bool,

    /// Ignore words written in capital letters
    #[arg(long)]
    ignore_uppercase: bool,

    /// Only list files with typos
    #[arg(long)]
    only_errors: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if typos are found
    #[arg(long)]
    no_fail: bool,

    /// Print debug logs
    #[arg(long)]
    debug: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::for_error(&err)
        }
    };

    std::process::exit(code.code());
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellex", &mut io::stdout());
        return Ok(ExitCode::Success);
    }

    let colored = !cli.no_color;
    if !colored {
        colored::control::set_override(false);
    }

    let loaded = Config::load(cli.config.as_deref())?;
    debug!("Config: {}", loaded.relative_path.display());

    let config = loaded.config.merge(Overrides {
        lang: cli.lang,
        format: cli.format,
        dictionaries: cli.dictionary,
        words: cli.word,
        ignore_digits: cli.ignore_digits,
        ignore_urls: cli.ignore_urls,
        ignore_capitalization: cli.ignore_capitalization,
        find_repeat_words: cli.find_repeat_words,
        ignore_uppercase: cli.ignore_uppercase,
    });

    let dictionary = Dictionary::load(config.dictionaries.as_slice(), &config.dictionary)
        .context("Failed to load dictionaries")?;
    info!(
        "Dictionary ready: {} entries, {} skipped",
        dictionary.len(),
        dictionary.diagnostics().len()
    );

    let show_progress = colored && io::stderr().is_terminal();
    let speller = YandexSpeller::new(show_progress).context("Failed to create speller client")?;
    let checker = SpellChecker::new(speller, dictionary, &config);

    let mut results = Vec::new();
    let mut failed = false;

    for file_path in &cli.files {
        match checker.check(file_path) {
            Ok(result) => results.push(result),
            Err(err) => {
                eprintln!("{} {:#}", "Error:".red().bold(), err);
                failed = true;
            }
        }
    }

    output::print_results(&results, colored, cli.only_errors, cli.output);

    let total_errors: usize = results.iter().map(|r| r.error_count()).sum();
    if cli.output == OutputFormat::Text {
        output::print_check_summary(total_errors, results.len(), colored);
    }

    // Exit with appropriate code
    if failed {
        Ok(ExitCode::Loading)
    } else if total_errors > 0 && !cli.no_fail {
        Ok(ExitCode::Typos)
    } else {
        Ok(ExitCode::Success)
    }
}
