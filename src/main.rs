use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use log::debug;
use shelfchart::csv_reader;
use shelfchart::parser::parse_shelves;
use shelfchart::{encode_chart, EncodeOptions, RawDataset, ShelfConfiguration};
use std::fs;
use std::io::{self, Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "shelfchart")]
#[command(about = "Aggregate tabular rows from stdin into chart-ready JSON records", long_about = None)]
#[command(group(ArgGroup::new("shelf_source").required(true).args(["shelves", "config"])))]
struct Args {
    /// Shelf DSL string (e.g., 'bar | columns(region) | rows(sales:measure)')
    shelves: Option<String>,

    /// Read the shelf configuration from a JSON file instead
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Format of the rows read from stdin
    #[arg(long, value_enum, default_value_t = InputFormat::Csv)]
    input: InputFormat,

    /// JSON file with encode options (rowLimit, sankeyNodeLimit)
    #[arg(long, value_name = "FILE")]
    options: Option<String>,

    /// Override the maximum number of rows considered
    #[arg(long)]
    row_limit: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut options = match &args.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file '{}'", path))?;
            serde_json::from_str::<EncodeOptions>(&text)
                .with_context(|| format!("Invalid options file '{}'", path))?
        }
        None => EncodeOptions::default(),
    };
    if let Some(limit) = args.row_limit {
        options.row_limit = limit;
    }

    // Read rows from stdin
    let data = match args.input {
        InputFormat::Csv => {
            let csv = csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?;
            RawDataset::from_csv(csv)
        }
        InputFormat::Json => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read JSON from stdin")?;
            let value: serde_json::Value =
                serde_json::from_str(&text).context("Stdin is not valid JSON")?;
            RawDataset::from_json(&value)?
        }
    };
    debug!("Read {} rows", data.len());

    let shelves = match (&args.shelves, &args.config) {
        (_, Some(path)) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read shelf configuration '{}'", path))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("Shelf configuration '{}' is not valid JSON", path))?;
            ShelfConfiguration::from_json(&value)?
        }
        (Some(dsl), None) => parse_shelves(dsl)?.into_configuration(&data),
        (None, None) => anyhow::bail!("Provide a shelf DSL string or --config"),
    };

    let encoding = encode_chart(&data, &shelves, &options);

    let json = if args.pretty {
        serde_json::to_string_pretty(&encoding)
    } else {
        serde_json::to_string(&encoding)
    }
    .context("Failed to serialize encoding")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
