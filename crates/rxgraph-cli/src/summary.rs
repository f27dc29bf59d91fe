use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rxgraph_cli::pipeline::BuildResult;
use rxgraph_model::FileKind;

pub fn print_summary(result: &BuildResult) {
    println!("Output: {}", result.output_dir.display());
    println!("Import report: {}", result.report_path.display());
    print_input_table(result);
    print_file_table(result);
    print_drop_table(result);
    println!(
        "neo4j-admin database import full {}",
        result.report.import_args.join(" ")
    );
}

fn print_input_table(result: &BuildResult) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (kind, rows) in &result.tables {
        table.add_row(vec![Cell::new(kind.file_name()), Cell::new(rows)]);
    }
    println!("{table}");
}

fn print_file_table(result: &BuildResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Kind"),
        header_cell("Rows"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for file in &result.files {
        table.add_row(vec![
            Cell::new(file.file_name()),
            kind_cell(file.kind),
            count_cell(file.rows, Color::Green),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(result.report.node_rows() + result.report.relationship_rows())
            .add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn print_drop_table(result: &BuildResult) {
    let entries: Vec<_> = result
        .drops
        .entries()
        .iter()
        .filter(|entry| entry.count > 0)
        .collect();
    if entries.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Target"),
        header_cell("Reason"),
        header_cell("Dropped"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for entry in entries {
        table.add_row(vec![
            dim_cell(&entry.stage),
            Cell::new(&entry.target),
            Cell::new(entry.reason),
            count_cell(entry.count, Color::Yellow),
        ]);
    }
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
        .set_width(120);
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

fn kind_cell(kind: FileKind) -> Cell {
    match kind {
        FileKind::Nodes => Cell::new("nodes").fg(Color::Blue),
        FileKind::Relationships => Cell::new("relationships").fg(Color::Magenta),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
