//! Output formatting for the CLI tools.
//!
//! Every result type has a human, JSON and raw (tab-separated) rendering.
//! Streaming tools (monitor, traps) emit one JSON document per line.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use super::args::OutputFormat;
use super::hints;
use crate::decode::DecodedVarBind;
use crate::monitor::MonitorEvent;
use crate::table::TableGrid;
use crate::trap::TrapEvent;
use crate::{Oid, Version};

/// Placeholder for a cell the walk did not cover.
const MISSING_CELL: &str = "-";

/// Result of a GET or GETNEXT step, ready for output.
#[derive(Debug, Serialize)]
pub struct RowsResult {
    pub target: String,
    pub version: String,
    pub results: Vec<RowResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_ms: Option<f64>,
}

/// A single decoded binding.
#[derive(Debug, Serialize)]
pub struct RowResult {
    pub oid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(rename = "type")]
    pub value_type: &'static str,
    pub value: String,
}

/// A reconstructed table.
#[derive(Debug, Serialize)]
pub struct TableResult {
    pub target: String,
    pub root: String,
    pub columns: Vec<ColumnResult>,
    pub rows: Vec<Vec<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_ms: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ColumnResult {
    pub number: u32,
    pub oid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// One monitor tick.
#[derive(Debug, Serialize)]
pub struct MonitorResult {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RowResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One received trap.
#[derive(Debug, Serialize)]
pub struct TrapResult {
    pub source: String,
    pub version: String,
    pub received_at_ms: u64,
    pub varbinds: Vec<RowResult>,
}

/// Output context for formatting.
#[derive(Debug, Clone, Copy)]
pub struct OutputContext {
    pub format: OutputFormat,
    pub show_hints: bool,
    pub show_timing: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_hints: true,
            show_timing: false,
        }
    }

    fn hint(&self, oid: &Oid) -> Option<String> {
        if self.show_hints {
            hints::lookup(oid)
        } else {
            None
        }
    }

    fn row(&self, vb: &DecodedVarBind) -> RowResult {
        RowResult {
            oid: vb.oid.to_string(),
            hint: self.hint(&vb.oid),
            value_type: vb.type_name,
            value: vb.text.clone(),
        }
    }

    fn timing(&self, elapsed: Option<Duration>) -> Option<f64> {
        if self.show_timing {
            elapsed.map(|d| d.as_secs_f64() * 1000.0)
        } else {
            None
        }
    }

    /// Write GET/GETNEXT results to stdout.
    pub fn write_rows(
        &self,
        target: SocketAddr,
        version: Version,
        rows: &[DecodedVarBind],
        elapsed: Option<Duration>,
    ) -> io::Result<()> {
        let result = RowsResult {
            target: target.to_string(),
            version: version.to_string(),
            results: rows.iter().map(|vb| self.row(vb)).collect(),
            timing_ms: self.timing(elapsed),
        };
        self.render_rows(&mut io::stdout().lock(), &result)
    }

    /// Write a reconstructed table to stdout.
    pub fn write_table(
        &self,
        target: SocketAddr,
        grid: &TableGrid,
        elapsed: Option<Duration>,
    ) -> io::Result<()> {
        let result = TableResult {
            target: target.to_string(),
            root: grid.root().to_string(),
            columns: grid
                .columns()
                .iter()
                .map(|column| ColumnResult {
                    number: column.number,
                    oid: column.header.to_string(),
                    hint: self.hint(&column.header),
                })
                .collect(),
            rows: (0..grid.row_count())
                .map(|row| {
                    (0..grid.column_count())
                        .map(|position| grid.cell(row, position).map(str::to_string))
                        .collect()
                })
                .collect(),
            timing_ms: self.timing(elapsed),
        };
        self.render_table(&mut io::stdout().lock(), &result)
    }

    /// Write one monitor event to stdout.
    pub fn write_monitor_event(&self, event: &MonitorEvent) -> io::Result<()> {
        let (results, error) = match &event.outcome {
            Ok(rows) => (Some(rows.iter().map(|vb| self.row(vb)).collect()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let hint = Oid::parse(&event.key)
            .ok()
            .and_then(|oid| self.hint(&oid));
        let result = MonitorResult {
            key: event.key.clone(),
            hint,
            at_ms: unix_millis(event.at),
            results,
            error,
        };
        self.render_monitor(&mut io::stdout().lock(), &result)
    }

    /// Write one trap to stdout.
    pub fn write_trap(&self, event: &TrapEvent) -> io::Result<()> {
        let result = TrapResult {
            source: event.source.to_string(),
            version: event.version.to_string(),
            received_at_ms: unix_millis(event.received_at),
            varbinds: event.varbinds.iter().map(|vb| self.row(vb)).collect(),
        };
        self.render_trap(&mut io::stdout().lock(), &result)
    }

    fn render_rows<W: Write>(&self, w: &mut W, result: &RowsResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => {
                for row in &result.results {
                    write_human_row(w, "", row)?;
                }
                if let Some(ms) = result.timing_ms {
                    writeln!(w, "\nTiming: {:.1}ms", ms)?;
                }
                Ok(())
            }
            OutputFormat::Json => write_json_pretty(w, result),
            OutputFormat::Raw => {
                for row in &result.results {
                    writeln!(w, "{}\t{}", row.oid, row.value)?;
                }
                Ok(())
            }
        }
    }

    fn render_table<W: Write>(&self, w: &mut W, result: &TableResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => {
                let headers: Vec<String> = result
                    .columns
                    .iter()
                    .map(|column| match &column.hint {
                        Some(hint) => hint.clone(),
                        None => column.number.to_string(),
                    })
                    .collect();
                let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
                for row in &result.rows {
                    for (width, cell) in widths.iter_mut().zip(row) {
                        let len = cell.as_deref().unwrap_or(MISSING_CELL).chars().count();
                        *width = (*width).max(len);
                    }
                }

                write_padded_line(w, headers.iter().map(String::as_str), &widths)?;
                let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
                write_padded_line(w, rule.iter().map(String::as_str), &widths)?;
                for row in &result.rows {
                    let cells = row.iter().map(|cell| cell.as_deref().unwrap_or(MISSING_CELL));
                    write_padded_line(w, cells, &widths)?;
                }

                writeln!(
                    w,
                    "\n{} rows, {} columns",
                    result.rows.len(),
                    result.columns.len()
                )?;
                if let Some(ms) = result.timing_ms {
                    writeln!(w, "Timing: {:.1}ms", ms)?;
                }
                Ok(())
            }
            OutputFormat::Json => write_json_pretty(w, result),
            OutputFormat::Raw => {
                for row in &result.rows {
                    let cells: Vec<&str> = row
                        .iter()
                        .map(|cell| cell.as_deref().unwrap_or(""))
                        .collect();
                    writeln!(w, "{}", cells.join("\t"))?;
                }
                Ok(())
            }
        }
    }

    fn render_monitor<W: Write>(&self, w: &mut W, result: &MonitorResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => {
                let stamp = format_clock(result.at_ms);
                match (&result.results, &result.error) {
                    (Some(rows), _) => {
                        for row in rows {
                            write_human_row(w, &format!("[{}] ", stamp), row)?;
                        }
                        Ok(())
                    }
                    (None, Some(error)) => {
                        let label = result.hint.as_deref().unwrap_or(&result.key);
                        writeln!(w, "[{}] {}: {}", stamp, label, error)
                    }
                    (None, None) => Ok(()),
                }
            }
            OutputFormat::Json => write_json_line(w, result),
            OutputFormat::Raw => match (&result.results, &result.error) {
                (Some(rows), _) => {
                    for row in rows {
                        writeln!(w, "{}\t{}\t{}", result.at_ms, row.oid, row.value)?;
                    }
                    Ok(())
                }
                (None, Some(error)) => {
                    writeln!(w, "{}\t{}\t!{}", result.at_ms, result.key, error)
                }
                (None, None) => Ok(()),
            },
        }
    }

    fn render_trap<W: Write>(&self, w: &mut W, result: &TrapResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => {
                writeln!(
                    w,
                    "[{}] trap from {} ({})",
                    format_clock(result.received_at_ms),
                    result.source,
                    result.version
                )?;
                for row in &result.varbinds {
                    write_human_row(w, "  ", row)?;
                }
                Ok(())
            }
            OutputFormat::Json => write_json_line(w, result),
            OutputFormat::Raw => {
                for row in &result.varbinds {
                    writeln!(w, "{}\t{}\t{}", result.source, row.oid, row.value)?;
                }
                Ok(())
            }
        }
    }
}

fn write_human_row<W: Write>(w: &mut W, prefix: &str, row: &RowResult) -> io::Result<()> {
    match &row.hint {
        Some(hint) => write!(w, "{}{} ({})", prefix, row.oid, hint)?,
        None => write!(w, "{}{}", prefix, row.oid)?,
    }
    writeln!(w, " = {}: {}", row.value_type, row.value)
}

fn write_padded_line<'a, W: Write>(
    w: &mut W,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> io::Result<()> {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(w, "{}", line.join("  ").trim_end())
}

fn write_json_pretty<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{}", json)
}

fn write_json_line<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string(value).map_err(io::Error::other)?;
    writeln!(w, "{}", json)?;
    w.flush()
}

fn unix_millis(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Format a Unix timestamp in milliseconds as a UTC wall clock `HH:MM:SS.mmm`.
fn format_clock(millis: u64) -> String {
    let ms = millis % 1000;
    let secs = millis / 1000;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, ms)
}

/// Write an error message to stderr.
pub fn write_error(err: &crate::Error) {
    eprintln!("Error: {}", err);
}
