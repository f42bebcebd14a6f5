use super::ui;
use crate::core::currency::{format_amount, format_money};
use crate::core::proposal::{Proposal, WALK_IN_NOTE};
use anyhow::{Context, Result, bail};
use chrono::Local;
use comfy_table::Cell;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::info;

impl Proposal {
    /// Renders the printable document.
    pub fn render(&self) -> String {
        let currency = self.currency.as_str();
        let mut doc = String::new();

        doc.push_str(&format!(
            "{}\n{}\n{}\n\n",
            self.company.name.to_uppercase(),
            self.company.tagline.to_uppercase(),
            self.issued_on_display()
        ));

        doc.push_str("RESUMO DA PROPOSTA\n\n");
        match &self.customer {
            Some(customer) => {
                doc.push_str(&format!("Cliente: {}\n", customer.name));
                doc.push_str(&format!("Doc: {}\n\n", customer.cpf_cnpj));
            }
            None => doc.push_str(&format!("{WALK_IN_NOTE}\n\n")),
        }

        if !self.quote.lines.is_empty() {
            let mut table = ui::new_plain_table();
            table.set_header(vec!["Serviço", "Frequência", "Valor Mensal"]);
            for line in &self.quote.lines {
                table.add_row(vec![
                    Cell::new(&line.service_name),
                    Cell::new(&line.frequency_label),
                    Cell::new(format_money(line.line_total, currency)),
                ]);
            }
            doc.push_str(&format!("{table}\n\n"));
        }

        if let Some(co_host) = &self.quote.co_host {
            let pct = format_amount(co_host.commission_rate * Decimal::ONE_HUNDRED, 0);
            doc.push_str("Gestão Digital (Co-anfitriã)\n");
            doc.push_str(&format!(
                "  Faturamento Estimado: {}\n",
                format_money(co_host.estimated_revenue, currency)
            ));
            doc.push_str(&format!(
                "  Taxa de Sucesso ({pct}%): {}\n\n",
                format_money(co_host.fee, currency)
            ));
        }

        doc.push_str(&format!("{}\n", "-".repeat(60)));
        doc.push_str(&format!(
            "INVESTIMENTO TOTAL: {}\n\n",
            format_money(self.quote.total, currency)
        ));
        doc.push_str(&self.validity_note());
        doc.push('\n');
        doc
    }
}

/// Writes the proposal (or the raw quote as JSON) and returns the path written.
pub fn run(proposal: &Proposal, output: Option<&Path>, json: bool) -> Result<PathBuf> {
    if proposal.quote.total <= Decimal::ZERO {
        bail!("Nothing to export: the quote total is not above zero");
    }

    let (contents, extension) = if json {
        (
            serde_json::to_string_pretty(&proposal.quote).context("Failed to serialize quote")?,
            "json",
        )
    } else {
        (proposal.render(), "txt")
    };

    let path = match output {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(proposal.file_name(Local::now(), extension)),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write proposal to {}", path.display()))?;

    info!("Wrote proposal to {}", path.display());
    println!("Proposal written to {}", path.display());
    Ok(path)
}
