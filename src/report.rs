// Console report - grid table of progress rows, re-rendered each cycle
use chrono::Local;

use crate::error::TrackerError;
use crate::models::{ProgressRow, ProgressSummary};
use crate::poller::ReportSink;

const HEADERS: [&str; 5] = ["Material", "Required", "In Cargo", "Remaining", "Status"];
pub const COMPLETED_LABEL: &str = "✅ COMPLETED";

#[derive(Debug, Default)]
pub struct ConsoleReport;

impl ReportSink for ConsoleReport {
    fn report_progress(&mut self, rows: &[ProgressRow]) {
        println!("{}", render_report(rows));
        let summary = ProgressSummary::from_rows(rows);
        println!(
            "📦 {}/{} materials complete, {} units remaining ({})",
            summary.completed,
            summary.total,
            summary.units_remaining,
            Local::now().format("%H:%M:%S")
        );
        if summary.all_complete() && summary.total > 0 {
            println!("🎉 All required materials are on board!");
        }
    }

    fn report_error(&mut self, error: &TrackerError) {
        eprintln!("❌ {}", error);
    }
}

/// Full framed report as printed to the console
pub fn render_report(rows: &[ProgressRow]) -> String {
    format!(
        "\n[=== Fleet Carrier Cargo Tracking ===]\n{}\n[=== End of Report ===]\n",
        render_table(rows)
    )
}

/// Grid table: text columns left-aligned, numbers right-aligned
pub fn render_table(rows: &[ProgressRow]) -> String {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.material.clone(),
                row.required.to_string(),
                row.in_cargo.to_string(),
                row.remaining.to_string(),
                if row.complete { COMPLETED_LABEL.to_string() } else { String::new() },
            ]
        })
        .collect();

    let mut widths = HEADERS.map(display_width);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let border = |fill: char| {
        let mut line = String::from("+");
        for width in widths {
            line.extend(std::iter::repeat_n(fill, width + 2));
            line.push('+');
        }
        line
    };

    let mut out = Vec::with_capacity(cells.len() * 2 + 3);
    out.push(border('-'));
    out.push(render_line(&HEADERS.map(str::to_string), &widths, false));
    out.push(border('='));
    for row in &cells {
        out.push(render_line(row, &widths, true));
        out.push(border('-'));
    }
    out.join("\n")
}

fn render_line(cells: &[String; 5], widths: &[usize; 5], numeric_right: bool) -> String {
    let mut line = String::from("|");
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        let pad = width - display_width(cell);
        let right = numeric_right && (1..=3).contains(&idx);
        line.push(' ');
        if right {
            line.push_str(&" ".repeat(pad));
            line.push_str(cell);
        } else {
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
        }
        line.push_str(" |");
    }
    line
}

// Terminal columns; emoji such as ✅ take two
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| match c as u32 {
            0x2600..=0x27BF | 0x1F300..=0x1FAFF => 2,
            0xFE00..=0xFE0F => 0,
            _ => 1,
        })
        .sum()
}
