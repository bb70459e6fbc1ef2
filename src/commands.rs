use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Table};
use happiness_dashboard::charts::{self, Prepared, Rendered};
use happiness_dashboard::page::render_page;
use happiness_dashboard::summary::summary_table;
use happiness_dashboard::{load_dataset, Dataset, Selection, View};
use tracing::{info, info_span};

use crate::cli::{PageArgs, RenderArgs, SelectionArgs};

pub fn run_views() -> Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("View").add_attribute(Attribute::Bold),
        Cell::new("Year").add_attribute(Attribute::Bold),
        Cell::new("Country").add_attribute(Attribute::Bold),
    ]);
    for view in View::ALL {
        let filters = view.filters();
        table.add_row(vec![
            Cell::new(view.key()),
            Cell::new(view.label()),
            Cell::new(if filters.year { "yes" } else { "-" }),
            Cell::new(if filters.country { "yes" } else { "-" }),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_options(data: &Path) -> Result<()> {
    let dataset = load(data)?;
    let years: Vec<String> = dataset.years().iter().map(u16::to_string).collect();
    println!("Years: {}", years.join(", "));
    println!("Countries ({}):", dataset.countries().len());
    for country in dataset.countries() {
        println!("  {country}");
    }
    Ok(())
}

pub fn run_render(data: &Path, args: &RenderArgs) -> Result<()> {
    let dataset = load(data)?;
    let selection = resolve(&dataset, &args.selection)?;
    let _span = info_span!("render", view = selection.view().key()).entered();

    print_heading(&selection);
    let plot = match charts::prepare(&dataset, &selection)? {
        Prepared::Plot(plot) => plot,
        Prepared::Empty { notice } => {
            println!("{notice}");
            return Ok(());
        }
    };
    println!("{}", summary_table(&plot));

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(selection.view(), "svg"));
    let size = args.size.unwrap_or(selection.view().spec().size);
    charts::render_to_file(&plot, &output, size)
        .with_context(|| format!("failed to render {}", selection.view().key()))?;
    println!("Chart saved to {}", output.display());
    Ok(())
}

pub fn run_page(data: &Path, args: &PageArgs) -> Result<()> {
    let dataset = load(data)?;
    let selection = resolve(&dataset, &args.selection)?;
    let _span = info_span!("page", view = selection.view().key()).entered();

    let chart = charts::render_view_svg(&dataset, &selection, args.size)
        .with_context(|| format!("failed to render {}", selection.view().key()))?;
    if let Rendered::Empty { notice } = &chart {
        println!("{notice}");
    }
    let html = render_page(&dataset, &selection, &chart);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(selection.view(), "html"));
    fs::write(&output, html).with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), "page saved");
    println!("Page saved to {}", output.display());
    Ok(())
}

fn load(data: &Path) -> Result<Dataset> {
    load_dataset(data).context("report data unavailable")
}

fn resolve(dataset: &Dataset, args: &SelectionArgs) -> Result<Selection> {
    let selection = Selection::resolve(
        dataset,
        args.view.into(),
        args.year,
        args.country.as_deref(),
    )?;
    Ok(selection)
}

fn print_heading(selection: &Selection) {
    println!("{}", selection.header());
    if let Some(caption) = selection.caption() {
        println!("{caption}");
    }
}

fn default_output(view: View, extension: &str) -> PathBuf {
    PathBuf::from(format!("{}.{extension}", view.key()))
}
