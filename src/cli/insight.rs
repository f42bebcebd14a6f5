use super::ui;
use crate::core::insight::{InsightProvider, consultant_insight};
use crate::core::pricing::Quote;
use rust_decimal::Decimal;

pub async fn run(
    provider: &(dyn InsightProvider + Send + Sync),
    quote: &Quote,
    company: &str,
    commission_rate: Decimal,
) {
    let pb = ui::new_spinner("Preparing consultant analysis...");
    let text = consultant_insight(provider, quote, company, commission_rate).await;
    pb.finish_and_clear();

    println!(
        "{}\n\n{}",
        ui::style_text("Consultant analysis", ui::StyleType::Title),
        text.trim()
    );
}
