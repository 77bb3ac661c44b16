use anyhow::{Context, Result};
use clap::Parser;
use markdown_richdoc_config::Config;
use markdown_richdoc_engine::{
    ConversionOptions, EntityDecoding, Target, convert, lower_tokens, tokens_from_json,
};
use std::path::PathBuf;

mod inputs;

use inputs::{Input, resolve_inputs};

#[derive(Parser, Debug)]
#[command(name = "markdown-richdoc")]
#[command(about = "Convert Markdown into Google Docs, Notion or Slack payloads")]
#[command(version)]
struct Cli {
    /// Target document model: google-docs, notion or slack
    target: Target,

    /// Input files or glob patterns like "docs/**/*.md"; `-` or none reads stdin
    inputs: Vec<String>,

    /// Treat input as a JSON token tree instead of Markdown
    #[arg(long)]
    tokens: bool,

    /// Config file to use instead of ~/.config/markdown-richdoc/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum characters per emitted text chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Document index of the first Google Docs insertion
    #[arg(long)]
    start_index: Option<usize>,

    /// Decode every HTML entity, not just the ones Markdown escaping produces
    #[arg(long)]
    full_entities: bool,

    /// Write one `<input>.json` per input into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Persist the effective conversion options to the config file
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from_path(path)?
                .with_context(|| format!("Config file not found: {}", path.display()))?,
            None => Config::load()?.unwrap_or_default(),
        };
        Ok(config)
    }

    /// Command-line flags layered over the config file.
    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(chunk_size) = self.chunk_size {
            config.conversion.chunk_size = chunk_size;
        }
        if let Some(start_index) = self.start_index {
            config.conversion.start_index = start_index;
        }
        if self.full_entities {
            config.conversion.entity_decoding = EntityDecoding::Full;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        config
    }
}

fn convert_source(
    source: &str,
    target: Target,
    tokens: bool,
    options: &ConversionOptions,
) -> Result<serde_json::Value> {
    let value = if tokens {
        let tokens = tokens_from_json(source)?;
        lower_tokens(&tokens, target, options)?
    } else {
        convert(source, target, options)?
    };
    Ok(value)
}

fn render(value: &serde_json::Value, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.apply_overrides(cli.load_config()?);
    if cli.save_config {
        let path = cli.config.clone().unwrap_or_else(Config::config_path);
        config.save_to_path(&path)?;
        log::info!("Saved config to {}", path.display());
    }

    let inputs = resolve_inputs(&cli.inputs)?;
    if let Some(dir) = &config.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    for input in &inputs {
        log::debug!("Converting {input} to {}", cli.target);
        let source = input.read()?;
        let value = convert_source(&source, cli.target, cli.tokens, &config.conversion)
            .with_context(|| format!("Failed to convert {input}"))?;
        let rendered = render(&value, cli.pretty)?;

        match &config.output_dir {
            Some(dir) => {
                let path = input.output_path(dir);
                std::fs::write(&path, rendered)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Wrote {}", path.display());
            }
            None => println!("{rendered}"),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    run(Cli::parse())
}
