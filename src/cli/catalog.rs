use super::ui;
use crate::core::catalog::{Catalog, PricingRule};
use crate::core::currency::{format_amount, format_money};
use crate::core::pricing::frequency_price_grid;
use anyhow::Result;
use comfy_table::Cell;

fn describe_rule(rule: &PricingRule, currency: &str) -> String {
    match rule {
        PricingRule::Flat => "-".to_string(),
        PricingRule::AreaFloorSurcharge {
            area_threshold,
            area_surcharge,
            floor_threshold,
            floor_surcharge,
        } => format!(
            "+{} above {} m²; +{} above {} floor(s)",
            format_money(*area_surcharge, currency),
            format_amount(*area_threshold, 0),
            format_money(*floor_surcharge, currency),
            floor_threshold
        ),
        PricingRule::AreaSteppedSurcharge {
            area_threshold,
            step,
            step_surcharge,
            intense_surcharge,
        } => format!(
            "+{} per started {} m² above {} m²; +{} if intense",
            format_money(*step_surcharge, currency),
            format_amount(*step, 0),
            format_amount(*area_threshold, 0),
            format_money(*intense_surcharge, currency)
        ),
    }
}

/// Renders every service with its price under each frequency plan.
pub fn render(catalog: &Catalog, currency: &str) -> Result<String> {
    let mut table = ui::new_styled_table();

    let mut header = vec![
        ui::header_cell("Service"),
        ui::header_cell("Category"),
        ui::header_cell("Surcharges"),
    ];
    header.extend(catalog.frequencies().iter().map(|f| ui::header_cell(&f.label)));
    table.set_header(header);

    for service in catalog.services() {
        let mut row = vec![
            Cell::new(format!("{} {}", service.icon, service.name)),
            Cell::new(service.category.to_string()),
            Cell::new(describe_rule(&service.rule, currency)),
        ];
        row.extend(
            frequency_price_grid(catalog, service)?
                .into_iter()
                .map(|(_, price)| ui::money_cell(price, currency)),
        );
        table.add_row(row);
    }

    let co_host = catalog.co_host();
    let mut output = format!(
        "{}\n\n{table}\n\n",
        ui::style_text("Services", ui::StyleType::Title)
    );
    output.push_str(&format!(
        "{} {}: {}% of estimated monthly revenue\n",
        co_host.icon,
        ui::style_text(&co_host.name, ui::StyleType::TotalLabel),
        format_amount(co_host.commission_rate * rust_decimal::Decimal::ONE_HUNDRED, 0)
    ));
    if !co_host.checklist.is_empty() {
        output.push_str(&ui::style_text(
            &format!("  {}", co_host.checklist.join(" · ")),
            ui::StyleType::Subtle,
        ));
        output.push('\n');
    }
    Ok(output)
}

pub fn run(catalog: &Catalog, currency: &str) -> Result<()> {
    print!("{}", render(catalog, currency)?);
    Ok(())
}
