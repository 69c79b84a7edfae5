use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};

use scour_core::{CleanReport, DropReport, SchemaDropOutcome, SchemaInfo};

/// Format schema contents as a colored table, one row per schema and kind.
pub fn print_info_table(infos: &[SchemaInfo]) {
    if infos.is_empty() {
        println!("{}", "No schemas configured.".yellow());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Schema"),
            Cell::new("State"),
            Cell::new("Kind"),
            Cell::new("Objects"),
        ]);

    for info in infos {
        if !info.exists {
            table.add_row(vec![
                Cell::new(&info.schema),
                Cell::new("Missing".red().to_string()),
                Cell::new(""),
                Cell::new(""),
            ]);
            continue;
        }

        let state = if info.empty {
            "Empty".green().to_string()
        } else {
            format!("{} object(s)", info.total()).yellow().to_string()
        };
        table.add_row(vec![
            Cell::new(&info.schema),
            Cell::new(&state),
            Cell::new(""),
            Cell::new(""),
        ]);

        for count in info.objects.iter().filter(|c| c.count > 0) {
            table.add_row(vec![
                Cell::new(""),
                Cell::new(""),
                Cell::new(count.kind.to_string()),
                Cell::new(count.count.to_string()),
            ]);
        }
    }

    println!("{table}");
}

/// Print objects dropped by clean.
pub fn print_clean_result(reports: &[CleanReport]) {
    let total: usize = reports.iter().map(|r| r.dropped.len()).sum();
    if total == 0 {
        println!("{}", "Nothing to clean.".green());
        return;
    }

    println!(
        "{}",
        format!("Successfully cleaned. Dropped {} object(s):", total)
            .green()
            .bold()
    );
    for report in reports {
        print_clean_details(report);
    }
}

fn print_clean_details(report: &CleanReport) {
    for item in &report.dropped {
        println!("  {} {}.{}", "✗".red(), report.schema, item);
    }
    for item in &report.vanished {
        println!(
            "  {} {}.{} {}",
            "?".yellow(),
            report.schema,
            item,
            "(already gone)".dimmed()
        );
    }
}

/// Print the outcome of dropping schemas.
pub fn print_drop_result(reports: &[DropReport]) {
    if reports.is_empty() {
        println!("{}", "No schemas to drop.".green());
        return;
    }

    for report in reports {
        match report.outcome {
            SchemaDropOutcome::Dropped => println!(
                "{}",
                format!("Dropped schema {}.", report.clean.schema).green().bold()
            ),
            SchemaDropOutcome::CleanedOnly => println!(
                "{}",
                format!(
                    "Cleaned schema {} (the dialect cannot drop schemas).",
                    report.clean.schema
                )
                .yellow()
                .bold()
            ),
        }
        print_clean_details(&report.clean);
    }
}

/// Print schemas created by create.
pub fn print_create_result(created: &[String]) {
    if created.is_empty() {
        println!("{}", "All schemas already exist.".green());
        return;
    }

    for schema in created {
        println!("  {} {}", "+".green(), schema);
    }
    println!(
        "{}",
        format!("Created {} schema(s).", created.len()).green().bold()
    );
}
