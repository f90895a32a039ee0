//! `datagrid` preview tool.
//!
//! Loads a CSV/TSV/JSON file into a grid, applies search, filters, sort and
//! paging from the command line, prints the page, and optionally exports the
//! filtered rows.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use datagrid::background::BackgroundExecutor;
use datagrid::data::load_file;
use datagrid::grid::format_row_count;
use datagrid::notifications::ToastManager;
use datagrid::services::{DirectoryDelivery, KeyValueStore};
use datagrid::storage::{FileStore, MemoryStore};
use datagrid::{
    DataGrid, ExportFormat, FilterCriteria, FilterCriterion, FilterValue, GridConfig,
};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Widest a column is printed, in characters
const MAX_PRINT_WIDTH: usize = 40;

/// How long to wait for an offloaded export before giving up
const EXPORT_WAIT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(
    name = "datagrid",
    about = "Search, filter, sort and page through a CSV or JSON file"
)]
struct Cli {
    /// CSV, TSV or JSON (array of objects) file to load.
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Grid identifier used for saved state and export names (default: file stem).
    #[arg(long)]
    id: Option<String>,
    /// JSON grid configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Search every column for this text.
    #[arg(long, short = 's')]
    search: Option<String>,
    /// Column filter, e.g. --filter name=contains:ann, age=min:26,
    /// age=between:20..30, joined=after:2024-01-01, active=equals:true.
    #[arg(long = "filter", value_name = "KEY=OP:VALUE", value_parser = parse_filter)]
    filters: Vec<(String, FilterCriterion)>,
    /// Sort column, optionally with direction, e.g. --sort age:desc.
    #[arg(long, value_name = "KEY[:desc]")]
    sort: Option<String>,
    /// Page to show (1-based).
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Rows per page.
    #[arg(long = "page-size")]
    page_size: Option<usize>,
    /// Write the filtered rows to this directory.
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,
    /// Export format: csv or excel.
    #[arg(long, default_value = "csv")]
    format: ExportFormat,
    /// Keep sort/filter/page-size state between runs (optionally under DIR).
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = "")]
    persist: Option<String>,
}

fn parse_filter(value: &str) -> Result<(String, FilterCriterion), String> {
    let (key, rest) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=OP:VALUE, got '{value}'"))?;
    let (op, operand) = rest
        .split_once(':')
        .ok_or_else(|| format!("expected OP:VALUE after '{key}='"))?;

    let number = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid number '{s}': {err}"))
    };
    let date = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|err| format!("invalid date '{s}': {err}"))
    };

    let criterion = match op {
        "contains" => FilterCriterion::contains(operand),
        "equals" => FilterCriterion::equals(match operand {
            "true" => FilterValue::Bool(true),
            "false" => FilterValue::Bool(false),
            other => other
                .parse::<f64>()
                .map(FilterValue::Number)
                .unwrap_or_else(|_| FilterValue::Text(other.to_string())),
        }),
        "min" => FilterCriterion::min(number(operand)?),
        "max" => FilterCriterion::max(number(operand)?),
        "between" => {
            let (lo, hi) = operand
                .split_once("..")
                .ok_or_else(|| format!("expected MIN..MAX, got '{operand}'"))?;
            FilterCriterion::between(number(lo)?, number(hi)?)
        }
        "after" => FilterCriterion::date_range(Some(date(operand)?), None),
        "before" => FilterCriterion::date_range(None, Some(date(operand)?)),
        other => return Err(format!("unknown filter operator '{other}'")),
    };
    Ok((key.trim().to_string(), criterion))
}

fn main() {
    // Initialize tracing subscriber to respect RUST_LOG environment variable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let source = load_file(&cli.file)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;
    let identifier = cli.id.clone().unwrap_or_else(|| source.name.clone());

    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            GridConfig::from_json(&json)?
        }
        None => GridConfig::default(),
    };
    config.persist_state = cli.persist.is_some();

    let store: Arc<dyn KeyValueStore> = match &cli.persist {
        Some(dir) if !dir.is_empty() => Arc::new(FileStore::new(dir)),
        Some(_) => match FileStore::open_default() {
            Some(store) => Arc::new(store),
            None => bail!("no data directory on this platform; pass --persist DIR"),
        },
        None => Arc::new(MemoryStore::new()),
    };

    let toasts = Arc::new(Mutex::new(ToastManager::new()));
    let executor = Arc::new(BackgroundExecutor::with_default_workers());

    let mut builder = DataGrid::builder(identifier)
        .source(source)
        .config(config)
        .store(store)
        .notifier(toasts.clone())
        .offload(executor.clone());
    if let Some(dir) = &cli.export {
        builder = builder.delivery(Arc::new(DirectoryDelivery::new(dir)));
    }
    let mut grid = builder.build()?;

    if let Some(size) = cli.page_size {
        grid.set_page_size(size)?;
    }
    if !cli.filters.is_empty() {
        let criteria: FilterCriteria = cli.filters.iter().cloned().collect();
        grid.apply_filters(criteria);
    }
    if let Some(query) = &cli.search {
        grid.search(query);
    }
    if let Some(spec) = &cli.sort {
        let (key, descending) = match spec.rsplit_once(':') {
            Some((key, "desc")) => (key, true),
            Some((key, "asc")) => (key, false),
            _ => (spec.as_str(), false),
        };
        // A restored sort on the same column may already be running the other way
        while grid.sort_state().column.as_deref() != Some(key)
            || (grid.sort_state().direction == datagrid::SortDirection::Desc) != descending
        {
            grid.sort(key)?;
        }
    }
    if cli.page > 1 && !grid.go_to_page(cli.page) {
        bail!("page {} is out of range (1-{})", cli.page, grid.total_pages());
    }

    print_page(&grid);

    if cli.export.is_some() {
        let outcome = grid.export_data(cli.format, None)?;
        if outcome.is_pending() {
            let start = Instant::now();
            while executor.has_pending() {
                if start.elapsed() > EXPORT_WAIT {
                    bail!("export {} did not finish in time", outcome.filename());
                }
                executor.process_results();
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    for toast in toasts.lock().toasts() {
        eprintln!("{} {}", toast.variant.icon(), toast.message);
    }

    grid.destroy();
    Ok(())
}

fn print_page(grid: &DataGrid) {
    let columns: Vec<_> = grid.visible_columns().collect();
    let rows = grid.current_page_data();

    let widths: Vec<usize> = columns
        .iter()
        .map(|c| {
            rows.iter()
                .map(|r| r.text(&c.key).chars().count())
                .chain(std::iter::once(c.title.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_PRINT_WIDTH)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| {
                let clipped: String = cell.chars().take(width).collect();
                format!("{clipped:<width$}")
            })
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", line(columns.iter().map(|c| c.title.as_str()).collect()));
    println!(
        "{}",
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &rows {
        println!("{}", line(columns.iter().map(|c| row.text(&c.key)).collect()));
    }

    let pages: Vec<String> = grid.page_numbers().iter().map(|t| t.to_string()).collect();
    println!();
    println!(
        "{} ({} total) | page {} of {}: {}",
        grid.position_label(),
        format_row_count(grid.rows().len()),
        grid.current_page(),
        grid.total_pages(),
        pages.join(" ")
    );
}
