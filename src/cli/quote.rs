use super::ui;
use crate::core::currency::format_amount;
use crate::core::pricing::Quote;
use anyhow::{Context, Result};
use comfy_table::Cell;

impl Quote {
    pub fn display_as_table(&self, currency: &str) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Service"),
            ui::header_cell("Frequency"),
            ui::header_cell("Visit price"),
            ui::header_cell("Monthly value"),
        ]);

        for line in &self.lines {
            table.add_row(vec![
                Cell::new(&line.service_name),
                Cell::new(&line.frequency_label),
                ui::money_cell(line.visit_price, currency),
                ui::money_cell(line.line_total, currency),
            ]);
        }

        if let Some(co_host) = &self.co_host {
            table.add_row(vec![
                Cell::new(&co_host.name),
                Cell::new(format!(
                    "{}% of {}",
                    format_amount(co_host.commission_rate * rust_decimal::Decimal::ONE_HUNDRED, 0),
                    format_amount(co_host.estimated_revenue, 2)
                )),
                Cell::new(""),
                ui::money_cell(co_host.fee, currency),
            ]);
        }

        let mut output = format!("{}\n\n", ui::style_text("Quote", ui::StyleType::Title));
        if self.is_empty() {
            output.push_str(&ui::style_text("No services selected.", ui::StyleType::Subtle));
        } else {
            output.push_str(&table.to_string());
        }

        output.push_str(&format!(
            "\n\n{}: {}",
            ui::style_text("Total", ui::StyleType::TotalLabel),
            ui::style_text(
                &crate::core::currency::format_money(self.total, currency),
                ui::StyleType::TotalValue
            )
        ));
        output
    }
}

pub fn run(quote: &Quote, currency: &str, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(quote).context("Failed to serialize quote")?;
        println!("{out}");
    } else {
        println!("{}", quote.display_as_table(currency));
    }
    Ok(())
}
