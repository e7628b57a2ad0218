use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tally_classifier::{
    loader_for_path, Classifier, ModelAssets, ModelHandle, Suggestion, SuggestionPipeline,
};
use tally_core::{millis_to_rfc3339, Category, OTHER_LABEL};
use tally_learning::{CorrectionMemory, JsonFileStore};
use tracing::warn;

mod config;
mod logging;
mod state;

use config::Config;

type Pipeline = SuggestionPipeline<JsonFileStore>;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "On-device expense category suggestions"
)]
struct Cli {
    /// Emit logs as JSON lines (stderr)
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suggest a category: learned corrections first, then the model
    Suggest { text: String },

    /// Run the model only, ignoring corrections
    Predict { text: String },

    /// Record the category the user picked for an expense name
    Correct {
        text: String,

        /// Category that was suggested
        #[arg(long)]
        predicted: String,

        /// Category the user chose
        #[arg(long)]
        chosen: String,
    },

    /// Show the learned category for an expense name, if any
    Learned { text: String },

    /// List the most recent corrections
    Corrections {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Suggest a category for every row of a CSV file (CSV on stdout)
    Batch {
        #[arg(long)]
        csv: PathBuf,

        /// Header of the column holding expense names
        #[arg(long, default_value = "name")]
        column: String,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_json);

    match cli.command {
        Command::Suggest { text } => {
            let pipeline = Arc::new(build_pipeline(&config::load_config()?)?);
            let result = tokio::task::spawn_blocking(move || pipeline.suggest(&text)).await?;
            match result {
                Ok(Some(s)) => print_suggestion(&s),
                Ok(None) => println!("No suggestion for blank text"),
                Err(e) => {
                    warn!(error = %e, "model unavailable");
                    println!("{OTHER_LABEL} (model unavailable: {e})");
                }
            }
        }

        Command::Predict { text } => {
            let classifier = Arc::new(build_classifier(&config::load_config()?)?);
            let result =
                tokio::task::spawn_blocking(move || classifier.predict_category(&text)).await?;
            match result {
                Ok(p) => println!("{}\tconfidence={:.3}", p.category, p.confidence),
                Err(e) => {
                    warn!(error = %e, "model unavailable");
                    println!("{OTHER_LABEL} (model unavailable: {e})");
                }
            }
        }

        Command::Correct {
            text,
            predicted,
            chosen,
        } => {
            let memory = open_memory(&config::load_config()?)?;
            if memory.record_choice(&text, &predicted, &chosen) {
                println!("Saved: {:?} -> {}", text.trim(), chosen);
            } else {
                println!("Nothing to save (choice matches the suggestion or input is blank)");
            }
        }

        Command::Learned { text } => {
            let memory = open_memory(&config::load_config()?)?;
            match memory.get_learned_category(&text) {
                Some(category) => println!("{category}"),
                None => println!("No learned category for {:?}", text.trim()),
            }
        }

        Command::Corrections { limit } => {
            let memory = open_memory(&config::load_config()?)?;
            let records = memory.records();
            println!(
                "{} corrections (showing up to {limit}, newest first)\n",
                records.len()
            );
            for r in records.iter().rev().take(limit) {
                println!(
                    "{} | {} | {} -> {}",
                    millis_to_rfc3339(r.timestamp),
                    r.text,
                    r.predicted_category,
                    r.corrected_category
                );
            }
        }

        Command::Batch { csv, column } => {
            if !csv.exists() {
                bail!("CSV not found: {} (pass --csv <path>)", csv.display());
            }
            let pipeline = Arc::new(build_pipeline(&config::load_config()?)?);
            tokio::task::spawn_blocking(move || run_batch(&pipeline, &csv, &column)).await??;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let p = config::config_path()?;
                let cfg = config::load_config_from(&p)?;
                println!("# {}", p.display());
                println!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn open_memory(cfg: &Config) -> Result<CorrectionMemory<JsonFileStore>> {
    let home = state::ensure_tally_home()?;
    let store = JsonFileStore::new(state::store_dir(&home));
    Ok(CorrectionMemory::with_config(store, cfg.learning))
}

/// Assets are read eagerly; the model itself loads on the first prediction.
fn build_classifier(cfg: &Config) -> Result<Classifier> {
    let home = state::ensure_tally_home()?;
    let assets_dir = cfg.assets_dir(&home);
    let assets = ModelAssets::load_dir(&assets_dir)
        .with_context(|| format!("loading assets from {}", assets_dir.display()))?;
    let loader = loader_for_path(&cfg.model_path(&home))?;

    let handle = Arc::new(ModelHandle::from_boxed(loader));
    Ok(Classifier::new(handle, assets).with_rule(cfg.classifier))
}

fn build_pipeline(cfg: &Config) -> Result<Pipeline> {
    Ok(SuggestionPipeline::new(open_memory(cfg)?, build_classifier(cfg)?))
}

fn print_suggestion(s: &Suggestion) {
    let mut line = format!("{}\tsource={}", s.category, s.source);
    if let Some(c) = s.confidence {
        line.push_str(&format!("\tconfidence={c:.3}"));
    }
    if let Some(key) = preselect_key(s) {
        line.push_str(&format!("\tpreselect={key}"));
    }
    println!("{line}");
}

/// Category key an add-expense form would preselect; `None` for "Uncategorized"
/// or labels outside the app's category list.
fn preselect_key(s: &Suggestion) -> Option<&'static str> {
    s.matched_category().map(|c| c.key())
}

fn run_batch(pipeline: &Pipeline, csv_path: &Path, column: &str) -> Result<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("open {}", csv_path.display()))?;

    let headers = rdr.headers().context("read CSV header")?.clone();
    let Some(idx) = headers.iter().position(|h| h.trim().eq_ignore_ascii_case(column)) else {
        bail!("column {column:?} not found in {}", csv_path.display());
    };

    let mut out = csv::Writer::from_writer(std::io::stdout());
    out.write_record(["name", "category", "source", "confidence", "preselect"])?;

    for result in rdr.records() {
        let record = result.with_context(|| format!("read {}", csv_path.display()))?;
        let name = record.get(idx).unwrap_or("").trim();

        let (category, source, confidence, preselect) = match pipeline.suggest(name) {
            Ok(Some(s)) => {
                let confidence = s.confidence.map(|c| format!("{c:.3}")).unwrap_or_default();
                let preselect = preselect_key(&s).unwrap_or("");
                (s.category, s.source.to_string(), confidence, preselect)
            }
            Ok(None) => (String::new(), String::new(), String::new(), ""),
            Err(e) => {
                warn!(name, error = %e, "prediction failed");
                let other = Category::Other.key();
                (OTHER_LABEL.to_string(), "error".to_string(), String::new(), other)
            }
        };
        out.write_record([
            name,
            category.as_str(),
            source.as_str(),
            confidence.as_str(),
            preselect,
        ])?;
    }

    out.flush()?;
    Ok(())
}
