//! Output rendering for the terminal and for JSON consumers.

use std::fmt::Write;

use serde::Serialize;
use themeparks_core::{CalendarDay, RideSnapshot, RideStatus};

use crate::error::{CliError, CliResult};

const TIME_FORMAT: &str = "%H:%M";

/// Renders `value` as pretty-printed JSON.
pub fn json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Output(format!("failed to serialize output: {}", e)))
}

/// Renders wait times as an aligned table, sorted by ride name.
pub fn wait_times_table(rides: &[RideSnapshot]) -> String {
    let mut rides: Vec<&RideSnapshot> = rides.iter().collect();
    rides.sort_by(|a, b| a.name.cmp(&b.name));

    let rows: Vec<[String; 4]> = rides
        .iter()
        .map(|ride| {
            let wait = match ride.status {
                RideStatus::Operating => format!("{} min", ride.wait_time),
                _ => "-".to_string(),
            };
            let fast_pass = match &ride.fast_pass_return_time {
                Some(ret) => format!(
                    "{}-{}",
                    ret.window.start_time.format(TIME_FORMAT),
                    ret.window.end_time.format(TIME_FORMAT)
                ),
                None if ride.fast_pass => "yes".to_string(),
                None => String::new(),
            };
            [ride.name.clone(), ride.status.to_string(), wait, fast_pass]
        })
        .collect();

    table(["RIDE", "STATUS", "WAIT", "FASTPASS"], &rows)
}

/// Renders opening times as an aligned table, one line per day.
pub fn opening_times_table(days: &[CalendarDay]) -> String {
    let rows: Vec<[String; 4]> = days
        .iter()
        .map(|day| {
            let hours = if day.is_operating() {
                format!(
                    "{}-{}",
                    day.opening_time.format(TIME_FORMAT),
                    day.closing_time.format(TIME_FORMAT)
                )
            } else {
                "-".to_string()
            };
            let special = day
                .special
                .iter()
                .map(|entry| {
                    format!(
                        "{} {}-{}",
                        entry.kind,
                        entry.opening_time.format(TIME_FORMAT),
                        entry.closing_time.format(TIME_FORMAT)
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            [
                day.date.format("%a %Y-%m-%d").to_string(),
                day.kind.to_string(),
                hours,
                special,
            ]
        })
        .collect();

    table(["DATE", "TYPE", "HOURS", "SPECIAL"], &rows)
}

fn table<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = header.map(|title| title.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = header.map(str::to_string);
    for row in std::iter::once(&header).chain(rows) {
        let mut line = String::new();
        for (index, (cell, width)) in row.iter().zip(widths).enumerate() {
            if index > 0 {
                line.push_str("  ");
            }
            let _ = write!(line, "{:<width$}", cell, width = width);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
