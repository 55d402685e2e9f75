//! Plain-text rendering of a grid frame.

use std::fmt::Display;
use std::fmt::Write;

use casegrid_lib::grid::Frame;
use casegrid_lib::grid::FrameStatus;
use casegrid_lib::grid::HeaderCell;
use casegrid_lib::query::Direction;

/// Pixels per character cell.
const PX_PER_CHAR: u32 = 8;

fn char_width(cell: &HeaderCell) -> usize {
    (cell.width / PX_PER_CHAR).max(4) as usize
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{:<width$}", text, width = width)
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn header_label(cell: &HeaderCell) -> String {
    let mut label = cell.label.clone();
    if let Some(sort) = cell.sort {
        let arrow = match sort.direction {
            Direction::Asc => '↑',
            Direction::Desc => '↓',
        };
        label.push(' ');
        label.push(arrow);
    }
    if cell.filter.is_some() {
        label.push_str(" *");
    }
    label
}

/// Renders the header, the materialized rows and a pagination footer.
pub fn frame<Id: Display>(frame: &Frame<Id>) -> String {
    let mut out = String::new();

    let mut line = String::from("    ");
    for cell in &frame.header {
        line.push_str(&fit(&header_label(cell), char_width(cell)));
        line.push(' ');
    }
    let _ = writeln!(out, "{}", line.trim_end());

    match &frame.status {
        FrameStatus::Loading => {
            let _ = writeln!(out, "Loading...");
        }
        FrameStatus::Empty => {
            let _ = writeln!(out, "No test cases match.");
        }
        FrameStatus::Error { message, .. } => {
            let _ = writeln!(out, "Error: {}", message);
        }
        FrameStatus::Ready => {
            for row in &frame.rows {
                let mut line = String::from(if row.selected { "[x] " } else { "[ ] " });
                for (cell, value) in frame.header.iter().zip(&row.cells) {
                    line.push_str(&fit(value, char_width(cell)));
                    line.push(' ');
                }
                let _ = writeln!(out, "{}  #{}", line.trim_end(), row.id);
            }
        }
    }

    let _ = write!(
        out,
        "{}  page {}/{}",
        frame.range_label(),
        frame.pagination.page,
        frame.pagination.page_count().max(1)
    );
    if frame.selected_count > 0 {
        let _ = write!(out, "  {} selected", frame.selected_count);
    }
    if frame.cache.is_stale() {
        let _ = write!(out, "  (stale)");
    }
    out.push('\n');
    if let Some(err) = &frame.bulk_error {
        let _ = writeln!(out, "Bulk action failed: {}", err.message);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
    }
}
