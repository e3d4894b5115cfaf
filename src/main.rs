//! ga-search: interactive suggestion prompt
//!
//! Every line read from stdin is fed to the controller as the current input
//! value. `:N` submits the N-th displayed suggestion, `:history` lists the
//! history and `:q` quits.

use anyhow::Result;
use ga_search::sources::SourceLoader;
use ga_search::{
    config, locales, Aggregator, HistoryStore, SearchParameters, SuggestionController,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(config_path) = parse_args()? else {
        return Ok(());
    };

    info!("Starting ga-search v{}", ga_search::VERSION);

    // Load configuration
    let mut settings = config::load(config_path)?;
    if let Some(lang) = locales::host_lang_from_env() {
        settings.search.default_lang = lang;
    }

    let history = HistoryStore::global_with(&settings.history);
    let aggregator = Aggregator::from_settings(&settings, history)?;
    let params = SearchParameters::from_settings(&settings);
    info!("Enabled sources: {}", params.types.join(", "));

    let controller = SuggestionController::new(aggregator, params);
    controller.on_results(|query, suggestions| {
        println!("-- {} suggestion(s) for '{}'", suggestions.len(), query);
        for (index, suggestion) in suggestions.iter().enumerate() {
            println!("{:>3}  {}", index + 1, suggestion.html);
        }
    });
    controller.on_submit(|event| match serde_json::to_string_pretty(&event.result) {
        Ok(json) => println!("submitted: {}\n{}", event.label, json),
        Err(_) => println!("submitted: {}", event.label),
    });

    // Debounced search of the last input line, if still running
    let mut pending: Option<JoinHandle<()>> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        match line {
            ":q" | ":quit" => return Ok(()),
            input if !input.starts_with(':') => {
                pending = Some(controller.input(input));
                continue;
            }
            _ => {}
        }

        settle(pending.take()).await;
        match line {
            ":history" => {
                for (index, entry) in controller.history().get().iter().enumerate() {
                    println!("{:>3}  {}", index + 1, entry.key);
                }
            }
            ":clear-cache" => {
                println!("dropped {} cached responses", controller.aggregator().clear_cache());
            }
            command => submit(&controller, &command[1..]),
        }
    }

    // Piped input ends before the last debounce interval elapses
    settle(pending).await;

    Ok(())
}

/// Wait for a pending debounced search
async fn settle(pending: Option<JoinHandle<()>>) {
    if let Some(handle) = pending {
        if let Err(e) = handle.await {
            warn!("Search task failed: {}", e);
        }
    }
}

/// Submit the N-th displayed suggestion
fn submit(controller: &SuggestionController, index: &str) {
    let (_, suggestions) = controller.displayed();
    match index.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= suggestions.len() => {
            controller.submit(&suggestions[n - 1].item);
        }
        _ => eprintln!("no suggestion {}", index),
    }
}

/// Parse command line arguments; `None` when the program should exit
fn parse_args() -> Result<Option<Option<PathBuf>>> {
    let mut config_path = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{} requires a file", arg))?;
                config_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("ga-search {}", ga_search::VERSION);
                return Ok(None);
            }
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }

    Ok(Some(config_path))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
ga-search v{}
Search-as-you-type suggestions from geo.admin.ch and other geocoders

USAGE:
    ga-search [OPTIONS]

OPTIONS:
    -c, --config <FILE>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information

INPUT:
    <text>                 Update the input value
    :N                     Submit the N-th displayed suggestion
    :history               List the history
    :clear-cache           Drop cached backend responses
    :q                     Quit

SOURCES:
    {}

ENVIRONMENT VARIABLES:
    GA_SEARCH_SETTINGS_PATH   Path to settings.yml
    GA_SEARCH_TYPES           Enabled sources, e.g. location,layer,photon
    GA_SEARCH_LANG            Language of the results
    GA_SEARCH_HISTORY_DIR     Directory of the history file
    RUST_LOG                  Log filter
"#,
        ga_search::VERSION,
        SourceLoader::available_sources().join(", ")
    );
}
