//! Tabular output of reconciliation results

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use serde::Deserialize;
use std::borrow::Cow;
use std::io::{self, Write};

use crate::diff::reconcile::Reconciled;

/// Placeholder for the name column of an absent side
pub const SERIES_NOT_FOUND: &str = " ";

/// Appended to names cut by [`truncate_name`]
pub const TRUNCATION_MARKER: &str = "...";

/// Spaces between aligned columns
const COLUMN_GAP: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Column-aligned table
    #[default]
    Table,
    /// One tab-separated line per result, never styled
    Tsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Style only when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Maximum name length in codepoints, 0 = unlimited
    pub max_name_length: usize,
    pub format: OutputFormat,
    pub color: ColorChoice,
}

/// Cut `name` to `max` codepoints and append [`TRUNCATION_MARKER`]
///
/// Names that already fit, and any name when `max` is 0, are returned as is.
pub fn truncate_name(name: &str, max: usize) -> Cow<'_, str> {
    if max == 0 {
        return Cow::Borrowed(name);
    }
    match name.char_indices().nth(max) {
        None => Cow::Borrowed(name),
        Some((cut, _)) => Cow::Owned(format!("{}{}", &name[..cut], TRUNCATION_MARKER)),
    }
}

/// The six output fields of one result
///
/// `left name, left value, marker, right name, right value, deviation`
pub fn row_fields(result: &Reconciled, max_name_length: usize) -> [String; 6] {
    let name = |n: Option<&str>| {
        n.map(|n| truncate_name(n, max_name_length).into_owned())
            .unwrap_or_else(|| SERIES_NOT_FOUND.to_string())
    };

    [
        name(result.left_name()),
        format_value(result.left_value()),
        result.relation().to_string(),
        name(result.right_name()),
        format_value(result.right_value()),
        format_value(result.deviation()),
    ]
}

fn format_value(value: f64) -> String {
    format!("{:.6}", value)
}

/// Write all results to `out`
///
/// Nothing is written for an empty result list.
pub fn render<W: Write>(results: &[Reconciled], options: &RenderOptions, out: &mut W) -> io::Result<()> {
    if results.is_empty() {
        return Ok(());
    }

    match options.format {
        OutputFormat::Tsv => {
            for result in results {
                writeln!(out, "{}", row_fields(result, options.max_name_length).join("\t"))?;
            }
        }
        OutputFormat::Table => {
            let table = build_table(results, options);
            for line in table.lines() {
                writeln!(out, "{}", line.trim_end())?;
            }
        }
    }

    out.flush()
}

fn build_table(results: &[Reconciled], options: &RenderOptions) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled);

    match options.color {
        ColorChoice::Always => {
            table.enforce_styling();
        }
        ColorChoice::Never => {
            table.force_no_tty();
        }
        ColorChoice::Auto => {}
    }

    for result in results {
        let cells: Vec<Cell> = row_fields(result, options.max_name_length)
            .into_iter()
            .map(|field| style_cell(Cell::new(field), result.is_deviated()))
            .collect();
        table.add_row(cells);
    }

    for column in table.column_iter_mut() {
        column.set_padding((0, COLUMN_GAP));
    }

    table
}

/// Deviated rows stand out, one-sided rows are secondary
fn style_cell(cell: Cell, deviated: bool) -> Cell {
    if deviated {
        cell.fg(Color::Magenta).add_attribute(Attribute::Bold)
    } else {
        cell.fg(Color::Cyan)
    }
}
