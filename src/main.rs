mod script;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use chango_buffer::{EditHistory, HistoryConfig, TextBuffer};
use chango_config::{defaults, Config};
use chango_highlight::{styled_segments, ColorScheme, HighlightDispatcher, LanguageRegistry};
use chango_logger::{self as logger, LogLevel};

/// Open a file, optionally replay an edit script, and print its highlighting
#[derive(Parser, Debug, PartialEq)]
#[command(name = "chango", version, about = "Undo history and syntax highlighting core")]
struct CliArgs {
    /// File to open
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Language id or alias (detected from the file name when omitted)
    #[arg(short, long, value_name = "ID")]
    language: Option<String>,

    /// Edit script replayed through the undo history
    #[arg(short, long, value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Log at debug level and print the log when done
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(config: &Config) {
    let file_path = match &config.logging.file_path {
        Some(path) => Some(PathBuf::from(path)),
        None => Config::default_log_path().ok(),
    };
    let min_level = config
        .logging
        .min_level
        .parse()
        .unwrap_or(LogLevel::Info);
    logger::init(file_path, defaults::MAX_LOG_ENTRIES, min_level);
}

fn history_config(config: &Config) -> HistoryConfig {
    HistoryConfig::new(
        Duration::from_millis(config.history.coalesce_window_ms),
        config.history.max_depth,
    )
}

/// Byte limit for precise tokenizers; `None` when the threshold does not fit
fn precise_limit(config: &Config) -> Option<usize> {
    usize::try_from(config.highlight.large_file_threshold_kb)
        .ok()
        .and_then(|kb| kb.checked_mul(1024))
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config = Config::load().unwrap_or_default();
    init_logging(&config);
    if args.verbose {
        logger::set_min_level(LogLevel::Debug);
    }

    let result = run(&args, &config);

    if args.verbose {
        for entry in logger::get_entries() {
            eprintln!("[{}] {}: {}", entry.timestamp, entry.level.to_str(), entry.message);
        }
    }
    result
}

fn run(args: &CliArgs, config: &Config) -> Result<()> {
    let registry = LanguageRegistry::with_builtin();
    let scheme: ColorScheme = config.highlight.color_scheme.parse().unwrap_or_else(|e| {
        logger::warn(format!("{}, using dark", e));
        ColorScheme::Dark
    });
    let dispatcher = HighlightDispatcher::new(&registry)
        .with_precise(config.highlight.precise_tokenizers)
        .with_precise_limit(precise_limit(config));

    let mut buffer = TextBuffer::from_file(&args.file)?;
    logger::info(format!("Opened {}", args.file.display()));

    let language = match &args.language {
        Some(name) => match registry.resolve(name) {
            Some(profile) => profile.id(),
            None => bail!("unknown language `{}`", name),
        },
        None => dispatcher.detect_language(&args.file.to_string_lossy()),
    };

    if let Some(script_path) = &args.script {
        let source = std::fs::read_to_string(script_path)
            .with_context(|| format!("Failed to read script: {}", script_path.display()))?;
        let commands = script::parse_script(&source)
            .with_context(|| format!("Invalid script: {}", script_path.display()))?;

        let mut history = EditHistory::with_config(history_config(config));
        script::run_script(&commands, &mut buffer, &mut history)?;

        println!("--- buffer ---");
        print!("{}", buffer.text());
        if !buffer.text().ends_with('\n') {
            println!();
        }
        println!("--- end ---");
    }

    let text = buffer.text();
    let spans = dispatcher.highlight(&text, language);
    println!("language: {}", language);
    println!("spans: {}", spans.len());

    for (segment, style) in styled_segments(&text, &spans, scheme) {
        let Some(color) = style.fg else {
            continue;
        };
        println!("{:<10} {:?}", color.to_string(), segment);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let parsed =
            CliArgs::try_parse_from(["chango", "main.py", "--language", "rs", "-s", "edits.txt"])
                .unwrap();
        assert_eq!(
            parsed,
            CliArgs {
                file: PathBuf::from("main.py"),
                language: Some("rs".to_string()),
                script: Some(PathBuf::from("edits.txt")),
                verbose: false,
            }
        );
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(CliArgs::try_parse_from(["chango"]).is_err());
        assert!(CliArgs::try_parse_from(["chango", "a.rs", "b.rs"]).is_err());
        assert!(CliArgs::try_parse_from(["chango", "a.rs", "--language"]).is_err());
        assert!(CliArgs::try_parse_from(["chango", "a.rs", "--frob"]).is_err());
        assert!(CliArgs::try_parse_from(["chango", "a.rs", "-v"]).unwrap().verbose);
    }

    #[test]
    fn test_history_config_from_settings() {
        let mut config = Config::default();
        config.history.coalesce_window_ms = 250;
        config.history.max_depth = 7;
        let history = history_config(&config);
        assert_eq!(history.coalesce_window, Duration::from_millis(250));
        assert_eq!(history.max_depth, 7);
    }

    #[test]
    fn test_precise_limit_from_threshold() {
        let mut config = Config::default();
        config.highlight.large_file_threshold_kb = 2;
        assert_eq!(precise_limit(&config), Some(2048));

        config.highlight.large_file_threshold_kb = u64::MAX;
        assert_eq!(precise_limit(&config), None);
    }
}
