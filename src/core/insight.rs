//! Consultant copy generated from a quote

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::error;

use super::currency::format_amount;
use super::pricing::Quote;

pub const EMPTY_SELECTION_MESSAGE: &str =
    "Selecione pelo menos um serviço para receber uma análise personalizada.";
pub const PROCESSING_MESSAGE: &str =
    "Nossa análise estratégica está sendo processada por nossos curadores.";
pub const MAINTENANCE_MESSAGE: &str =
    "Nossa inteligência está em manutenção preventiva. Tente novamente em instantes.";

#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn generate_insight(&self, system_instruction: &str, prompt: &str) -> Result<String>;
}

pub fn system_instruction(company: &str) -> String {
    format!(
        "Você é o Diretor de Relacionamento da {company}. Seu objetivo é encantar o cliente \
         mostrando que o imóvel dele agora é um ativo gerador de renda passiva sob sua custódia técnica."
    )
}

pub fn build_prompt(quote: &Quote, company: &str, commission_rate: Decimal) -> String {
    let service_details = quote
        .lines
        .iter()
        .map(|line| {
            format!(
                "- {}: R$ {} ({})",
                line.service_name,
                line.visit_price.round_dp(2),
                line.frequency_label
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let commission_pct = (commission_rate * Decimal::ONE_HUNDRED).normalize();

    format!(
        "Cenário de Gestão Patrimonial {company}:\n\
         {service_details}\n\n\
         Total Estimado: R$ {total}.\n\n\
         Instruções para o Consultor Estratégico:\n\
         1. O serviço de \"Co-anfitriã\" opera em {commission_pct}% de comissão sobre faturamento. \
         Destaque como essa parceria de risco compartilhado motiva a {company} a maximizar a \
         ocupação e o ticket médio das diárias.\n\
         2. Reforce que a gestão profissional no Airbnb/Booking paga os custos operacionais \
         (limpeza/manutenção) e ainda gera lucro líquido ao proprietário.\n\
         3. Use um tom de consultoria de alto nível: \"Eficiência Operacional\", \
         \"Maximização de Yield\" e \"Experiência do Hóspede\".\n\
         4. Máximo de 130 palavras.",
        total = format_amount(quote.total, 2),
    )
}

/// Asks the provider for consultant copy. Never fails: errors and empty
/// answers turn into canned messages.
pub async fn consultant_insight(
    provider: &(dyn InsightProvider + Send + Sync),
    quote: &Quote,
    company: &str,
    commission_rate: Decimal,
) -> String {
    if quote.lines.is_empty() {
        return EMPTY_SELECTION_MESSAGE.to_string();
    }

    let prompt = build_prompt(quote, company, commission_rate);
    match provider
        .generate_insight(&system_instruction(company), &prompt)
        .await
    {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => PROCESSING_MESSAGE.to_string(),
        Err(e) => {
            error!(error = ?e, "Insight generation failed");
            MAINTENANCE_MESSAGE.to_string()
        }
    }
}
