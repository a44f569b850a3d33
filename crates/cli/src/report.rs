//! Renders a run's verdicts for people (console) and for tools (JSON).

use std::{
    io::{self, Write},
    path::Path,
};

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use ethprobe_harness::Report;
use ethprobe_types::{RpcResult, Status};
use itertools::Itertools;

use crate::{error::Error, file};

fn color(status: Status) -> Color {
    match status {
        Status::Ok => Color::Green,
        Status::Warning => Color::Yellow,
        Status::Error => Color::Red,
    }
}

/// What goes in parentheses after the status, if anything.
fn detail(result: &RpcResult, verbose: bool) -> Option<String> {
    match result.status {
        Status::Ok if verbose && !result.value.is_empty() => Some(result.value.clone()),
        Status::Ok => None,
        Status::Warning => Some(result.warnings.iter().join("; ")),
        Status::Error => result.error.clone(),
    }
}

/// One line per method, `method : status (detail)`, then a summary line.
pub fn print_console<W: Write>(
    out: &mut W,
    report: &Report,
    verbose: bool,
    ansi: bool,
) -> io::Result<()> {
    let width =
        report.results().iter().map(|result| result.method.as_str().len()).max().unwrap_or(0);

    for result in report.results() {
        write!(out, "{:<width$} : ", result.method.as_str())?;
        if ansi {
            queue!(
                out,
                SetForegroundColor(color(result.status)),
                Print(result.status),
                ResetColor
            )?;
        } else {
            write!(out, "{}", result.status)?;
        }
        match detail(result, verbose) {
            Some(detail) => writeln!(out, " ({detail})")?,
            None => writeln!(out)?,
        }
    }

    writeln!(out, "{}", summary(report))?;
    out.flush()
}

pub fn summary(report: &Report) -> String {
    let (ok, warning, error) = report.counts();
    format!("{} methods: {ok} ok, {warning} warning, {error} error", report.results().len())
}

pub fn to_json(report: &Report) -> Result<String, Error> {
    serde_json::to_string_pretty(report).map_err(|e| Error::ToJSON(e.to_string()))
}

pub fn write_json(path: &Path, report: &Report) -> Result<(), Error> {
    file::save(path, &to_json(report)?)
}
