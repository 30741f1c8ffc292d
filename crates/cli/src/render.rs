//! Plain-text rendering of grids and tables for the terminal.

use classgrid_core::{Grid, Period, PeriodGrid, Weekday};

/// Left-aligned columns separated by ` | `, with a rule under the header.
pub fn table(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = header.len().max(rows.iter().map(Vec::len).max().unwrap_or(0));
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |row: &[String]| {
        (0..columns)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!("{cell:<width$}", width = widths[i])
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(header)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(rows.iter().map(|r| line(r)));
    out.join("\n")
}

fn period_table(days: &[Weekday], periods: &PeriodGrid) -> String {
    let mut header = vec!["Period".to_string()];
    header.extend(days.iter().map(|d| d.abbrev().to_string()));

    let rows: Vec<Vec<String>> = Period::ALL
        .iter()
        .map(|&period| {
            let mut row = vec![period.as_str().to_string()];
            row.extend(days.iter().map(|&day| periods.cell(period, day).join("; ")));
            row
        })
        .collect();

    table(&header, &rows)
}

/// The weekly grid, one table per semester plus the catch-all.
pub fn grid(grid: &Grid) -> String {
    let mut sections = Vec::new();

    for semester in &grid.semesters {
        sections.push(format!(
            "Semester {}\n{}",
            semester.semester,
            period_table(&grid.days, &semester.periods)
        ));
    }

    if !grid.unassigned.is_empty() {
        sections.push(format!(
            "No semester\n{}",
            period_table(&grid.days, &grid.unassigned)
        ));
    }

    if !grid.unplaceable.is_empty() {
        let names = grid
            .unplaceable
            .iter()
            .map(|u| format!("{} (block {})", u.discipline, u.block))
            .collect::<Vec<_>>()
            .join(", ");
        sections.push(format!(
            "Not shown ({}): {names}",
            grid.unplaceable.len()
        ));
    }

    if sections.is_empty() {
        return "(empty grid)".to_string();
    }
    sections.join("\n\n")
}
