use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::charts::Plot;
use crate::eda_statistics::Composition;

/// Tabulates the aggregate behind a plot.
pub fn summary_table(plot: &Plot) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    match plot {
        Plot::Lollipop { entries, .. } => {
            table.set_header(vec![
                header_cell("Rank"),
                header_cell("Country"),
                header_cell("Score"),
            ]);
            for (i, (country, score)) in entries.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(country),
                    Cell::new(format!("{score:.3}")),
                ]);
            }
            align_column(&mut table, 2, CellAlignment::Right);
        }
        Plot::YearScatter { means, .. } => {
            table.set_header(vec![
                header_cell("Year"),
                header_cell("Countries"),
                header_cell("Mean score"),
            ]);
            for m in means {
                table.add_row(vec![
                    Cell::new(m.year),
                    Cell::new(m.count),
                    Cell::new(format!("{:.3}", m.mean)),
                ]);
            }
            align_column(&mut table, 1, CellAlignment::Right);
            align_column(&mut table, 2, CellAlignment::Right);
        }
        Plot::Violin { summary, .. } => {
            table.set_header(vec![header_cell("Statistic"), header_cell("Value")]);
            table.add_row(vec![Cell::new("Countries"), Cell::new(summary.count)]);
            for (name, value) in [
                ("Minimum", summary.min),
                ("Lower quartile", summary.lower_quartile),
                ("Median", summary.median),
                ("Upper quartile", summary.upper_quartile),
                ("Maximum", summary.max),
                ("KDE bandwidth", summary.bandwidth),
            ] {
                table.add_row(vec![Cell::new(name), Cell::new(format!("{value:.3}"))]);
            }
            align_column(&mut table, 1, CellAlignment::Right);
        }
        Plot::Donut { composition, .. } | Plot::Pie { composition, .. } => {
            composition_rows(&mut table, composition);
        }
        Plot::Trend { points, .. } => {
            table.set_header(vec![header_cell("Year"), header_cell("Score")]);
            for (year, score) in points {
                table.add_row(vec![Cell::new(year), Cell::new(format!("{score:.3}"))]);
            }
            align_column(&mut table, 1, CellAlignment::Right);
        }
    }
    table
}

fn composition_rows(table: &mut Table, composition: &Composition) {
    table.set_header(vec![
        header_cell("Factor"),
        header_cell("Value"),
        header_cell("Share"),
    ]);
    for slice in &composition.slices {
        table.add_row(vec![
            Cell::new(&slice.label),
            Cell::new(format!("{:.3}", slice.value)),
            Cell::new(format!("{:.1}%", slice.percent)),
        ]);
    }
    align_column(table, 1, CellAlignment::Right);
    align_column(table, 2, CellAlignment::Right);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eda_statistics::compose;

    #[test]
    fn lollipop_rows_are_ranked() {
        let plot = Plot::Lollipop {
            title: String::new(),
            entries: vec![("Norway".to_string(), 7.537), ("Denmark".to_string(), 7.522)],
        };
        let table = summary_table(&plot);
        assert_eq!(table.row_count(), 2);
        let text = table.to_string();
        assert!(text.contains("Norway"));
        assert!(text.contains("7.522"));
    }

    #[test]
    fn composition_shows_shares() {
        let composition = compose([("GDP", 1.0), ("Freedom", 3.0)]).expect("composition");
        let plot = Plot::Pie {
            title: String::new(),
            composition,
        };
        let text = summary_table(&plot).to_string();
        assert!(text.contains("25.0%"));
        assert!(text.contains("75.0%"));
    }
}
