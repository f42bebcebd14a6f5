//! Printable proposal built from a quote

use chrono::{DateTime, Local, NaiveDate};

use super::config::CompanyConfig;
use super::payment::CustomerData;
use super::pricing::Quote;

pub const WALK_IN_NOTE: &str = "Proposta gerada para atendimento presencial.";

#[derive(Debug, Clone)]
pub struct Proposal {
    pub company: CompanyConfig,
    pub currency: String,
    pub issued_on: NaiveDate,
    pub customer: Option<CustomerData>,
    pub quote: Quote,
}

impl Proposal {
    /// A customer without a name is treated as no customer.
    pub fn new(
        company: &CompanyConfig,
        currency: &str,
        issued_on: NaiveDate,
        customer: Option<CustomerData>,
        quote: Quote,
    ) -> Self {
        Proposal {
            company: company.clone(),
            currency: currency.to_string(),
            issued_on,
            customer: customer.filter(|c| !c.name.is_empty()),
            quote,
        }
    }

    pub fn issued_on_display(&self) -> String {
        self.issued_on.format("%d/%m/%Y").to_string()
    }

    pub fn validity_note(&self) -> String {
        format!(
            "Esta proposta tem validade de {} dias. Valores sujeitos a alteração conforme vistoria local.",
            self.company.proposal_validity_days
        )
    }

    /// `Proposta_<Company>_<unix millis>.<extension>`, company name without spaces.
    pub fn file_name(&self, at: DateTime<Local>, extension: &str) -> String {
        let slug: String = self
            .company
            .name
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("_");
        format!("Proposta_{slug}_{}.{extension}", at.timestamp_millis())
    }
}
