//! Lingua - command line front end for the translation cache
//!
//! Wires the translation service to the JSON-file stores under the data
//! directory, the generative language provider and a reachability probe.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use lingua::cli::{Args, Commands};
use lingua::config::Config;
use lingua::connectivity::{ConnectivityMonitor, ConnectivitySignal, ReachabilityPoller, probe_reachability};
use lingua::error::LinguaError;
use lingua::provider::languages::LANGUAGE_NAMES;
use lingua::service::TranslationService;
use lingua::store::{FileKeyValueStore, JsonFileStore};
use lingua::transfer::{export_to_file, import_from_file};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const PROBE_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("lingua.toml").exists() {
                Config::from_file("lingua.toml")?
            } else {
                Config::default()
            }
        }
    };

    setup_logging(&config, args.verbose)?;

    // Commands that never touch the service
    match &args.command {
        Commands::Languages => {
            println!("{:<8} {}", "Code", "Language");
            println!("{}", "-".repeat(30));
            for (code, name) in LANGUAGE_NAMES {
                println!("{:<8} {}", code, name);
            }
            return Ok(());
        }
        Commands::InitConfig { output } => {
            if output.exists() {
                return Err(LinguaError::Config(format!("{} already exists", output.display())).into());
            }
            Config::default().save_to_file(output)?;
            println!("Wrote default configuration to {}", output.display());
            return Ok(());
        }
        _ => {}
    }

    let store = Arc::new(JsonFileStore::open(config.record_store_path()).await?);
    let kv = Arc::new(FileKeyValueStore::open(config.key_value_dir()).await?);

    let online = !args.offline && probe_reachability(&config.provider.endpoint, PROBE_TIMEOUT).await;
    if !online {
        warn!("Translation provider unreachable, running offline");
    }
    let signal = Arc::new(ConnectivitySignal::new(online));

    let service = Arc::new(TranslationService::new(&config, store, kv, signal.clone()));
    service.restore_cache().await;

    match config.resolve_api_key() {
        Some(api_key) => service.init(&api_key).await?,
        None => warn!("No API key configured; translations will be queued"),
    }

    // Long batches pick up a reconnect and drain what they queued so far
    let poller = (!args.offline).then(|| {
        ReachabilityPoller::spawn(
            signal.clone(),
            config.provider.endpoint.clone(),
            PROBE_INTERVAL,
            PROBE_TIMEOUT,
        )
    });
    let monitor = ConnectivityMonitor::spawn(service.clone(), signal.as_ref());

    match args.command {
        Commands::Translate { text, target, source } => {
            let translated = service.translate(&text, &target, &source).await;
            println!("{}", translated);
        }
        Commands::Batch { input, target, source, output } => {
            let content = tokio::fs::read_to_string(&input).await?;
            let lines: Vec<&str> = content.lines().collect();

            let progress = ProgressBar::new(lines.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")?
                    .progress_chars("=> "),
            );

            progress.set_message(format!("{} -> {}", source, target));
            let translated = service
                .translate_batch_with_progress(&lines, &target, &source, |_| progress.inc(1))
                .await;
            progress.finish_and_clear();

            let joined = translated.join("\n");
            match output {
                Some(path) => {
                    tokio::fs::write(&path, joined + "\n").await?;
                    info!("Wrote {} translations to {}", translated.len(), path.display());
                }
                None => println!("{}", joined),
            }
        }
        Commands::Stats { recent } => {
            let stats = service.stats(recent).await;
            println!("\nTranslation Statistics:");
            println!("  Stored translations: {}", stats.total_translations);
            println!("  Cached in memory:    {}", stats.cache_size);
            println!("  Pending (offline):   {}", stats.queue_size);

            if !stats.by_target_language.is_empty() {
                println!("\nBy target language:");
                for (code, count) in &stats.by_target_language {
                    println!("  {:<8} {}", code, count);
                }
            }
            if !stats.by_source_language.is_empty() {
                println!("\nBy source language:");
                for (code, count) in &stats.by_source_language {
                    println!("  {:<8} {}", code, count);
                }
            }
            if !stats.recent.is_empty() {
                println!("\nMost recent:");
                println!("{:<10} {:<8} {:<40} {:<40}", "Age", "Pair", "Original", "Translated");
                println!("{}", "-".repeat(100));
                let now = chrono::Utc::now().timestamp_millis();
                for record in &stats.recent {
                    let age_secs = (now.saturating_sub(record.timestamp) / 1000).max(0) as u64;
                    println!(
                        "{:<10} {:<8} {:<40} {:<40}",
                        format_duration(age_secs),
                        format!("{}>{}", record.source_language, record.target_language),
                        truncate(&record.original_text, 38),
                        truncate(&record.translated_text, 38)
                    );
                }
            }
        }
        Commands::Records { target, source } => {
            let records = service.records(target.as_deref(), source.as_deref()).await?;
            if records.is_empty() {
                println!("No stored translations found.");
            } else {
                println!("{:<24} {:<6} {:<40} {:<40}", "Id", "Uses", "Original", "Translated");
                println!("{}", "-".repeat(112));
                for record in &records {
                    println!(
                        "{:<24} {:<6} {:<40} {:<40}",
                        record.id,
                        record.usage_count,
                        truncate(&record.original_text, 38),
                        truncate(&record.translated_text, 38)
                    );
                }
            }
        }
        Commands::Export { output } => {
            let count = export_to_file(&service, &output).await?;
            println!("Exported {} translations to {}", count, output.display());
        }
        Commands::Import { input } => {
            let count = import_from_file(&service, &input).await?;
            println!("Imported {} translations from {}", count, input.display());
        }
        Commands::Clear => {
            service.clear_cache().await;
            println!("Translation cache cleared.");
        }
        Commands::Languages | Commands::InitConfig { .. } => {}
    }

    if let Some(poller) = poller {
        poller.shutdown();
    }
    monitor.shutdown();
    service.dispose().await;

    Ok(())
}

fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "lingua.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so translated text on stdout stays pipeable
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
