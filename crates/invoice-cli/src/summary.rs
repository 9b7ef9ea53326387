use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use invoice_map::{ConfidenceLevel, MatchKind, ProgressSnapshot, Suggestion};
use invoice_model::MappingTarget;

use crate::types::{MapResult, SuggestResult};

pub fn print_suggestions(result: &SuggestResult) {
    println!("File: {}", result.file.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Header"),
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Score"),
        header_cell("Match"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);

    for header in &result.headers {
        match result.suggestions.get(header) {
            Some(suggestion) => table.add_row(vec![
                Cell::new(header),
                Cell::new(&suggestion.field.id).fg(Color::Blue),
                Cell::new(&suggestion.field.label),
                score_cell(suggestion),
                kind_cell(suggestion.kind),
            ]),
            None => table.add_row(vec![
                Cell::new(header),
                dim_cell("-"),
                dim_cell("no match"),
                dim_cell("-"),
                dim_cell("-"),
            ]),
        };
    }
    println!("{table}");
    println!(
        "{} of {} headers have a suggestion",
        result.suggestions.len(),
        result.headers.len()
    );
}

pub fn print_map(result: &MapResult) {
    let session = &result.session;
    let catalog = session.catalog();
    let suggestions = session.suggestions();

    println!("File: {}", result.file.display());
    println!("Mapping: {}", session.storage_key());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Header"),
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Required"),
        header_cell("Suggestion"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Center);

    let visible = session.visible_headers();
    for header in &visible {
        let (field_cell, label_cell, required) = match session.mapping().get(header) {
            Some(MappingTarget::Field(id)) => match catalog.get(id) {
                Some(field) => (
                    Cell::new(id).fg(Color::Blue).add_attribute(Attribute::Bold),
                    Cell::new(&field.label),
                    required_cell(field.required),
                ),
                None => (
                    Cell::new(id).fg(Color::Red),
                    Cell::new("unknown field").fg(Color::Red),
                    dim_cell("-"),
                ),
            },
            Some(MappingTarget::Skip) => (dim_cell("skipped"), dim_cell("-"), dim_cell("-")),
            None => (dim_cell("-"), dim_cell("-"), dim_cell("-")),
        };
        let suggestion_cell = match suggestions.get(header) {
            Some(suggestion) => Cell::new(format!(
                "{} ({:.0}%)",
                suggestion.field.id,
                suggestion.score * 100.0
            ))
            .fg(level_color(suggestion.level())),
            None => dim_cell(""),
        };
        table.add_row(vec![
            Cell::new(header),
            field_cell,
            label_cell,
            required,
            suggestion_cell,
        ]);
    }
    println!("{table}");
    if visible.len() < session.headers().len() {
        println!(
            "Showing {} of {} headers",
            visible.len(),
            session.headers().len()
        );
    }

    print_progress(&session.progress());

    if !result.accepted.is_empty() {
        println!("Accepted suggestions: {}", result.accepted.join(", "));
    }
    if !result.displaced.is_empty() {
        println!("Unmapped by reassignment: {}", result.displaced.join(", "));
    }
    for header in session.orphaned_headers() {
        eprintln!("warning: '{header}' is mapped to a field that no longer exists");
    }
    if result.is_blocked() {
        eprintln!("Cannot finalize, required fields are not mapped:");
        for id in &result.missing_required {
            let label = catalog.get(id).map_or("", |f| f.label.as_str());
            eprintln!("- {id} ({label})");
        }
    }
    match &result.saved_to {
        Some(path) => println!("Saved: {}", path.display()),
        None => println!("Nothing saved"),
    }
}

fn print_progress(snapshot: &ProgressSnapshot) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Headers"),
        header_cell("Mapped"),
        header_cell("Unmapped"),
        header_cell("Required"),
        header_cell("Progress"),
    ]);
    apply_table_style(&mut table);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let progress_color = if snapshot.is_complete() {
        Color::Green
    } else {
        Color::Yellow
    };
    table.add_row(vec![
        Cell::new(snapshot.total),
        Cell::new(snapshot.mapped),
        count_cell(snapshot.unmapped, Color::Yellow),
        Cell::new(format!(
            "{}/{}",
            snapshot.required_mapped, snapshot.required_total
        )),
        Cell::new(format!("{}%", snapshot.progress_percent))
            .fg(progress_color)
            .add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

pub fn required_cell(required: bool) -> Cell {
    if required {
        Cell::new("yes").fg(Color::Magenta)
    } else {
        dim_cell("no")
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn score_cell(suggestion: &Suggestion) -> Cell {
    Cell::new(format!("{:.2}", suggestion.score)).fg(level_color(suggestion.level()))
}

fn kind_cell(kind: MatchKind) -> Cell {
    match kind {
        MatchKind::Exact => Cell::new(kind.as_str()).fg(Color::Green),
        MatchKind::Substring => Cell::new(kind.as_str()),
        MatchKind::Fuzzy => dim_cell(kind.as_str()),
    }
}

fn level_color(level: ConfidenceLevel) -> Color {
    match level {
        ConfidenceLevel::High => Color::Green,
        ConfidenceLevel::Medium => Color::Yellow,
        ConfidenceLevel::Low => Color::DarkGrey,
    }
}
