use super::ui;
use crate::core::currency::{format_money, round_cents};
use crate::core::payment::{CustomerData, PaymentCharge, PaymentGateway};
use crate::core::pricing::Quote;
use anyhow::{Result, anyhow, bail};
use rust_decimal::Decimal;
use tracing::{error, info};

/// What the visitor sees when any step of the checkout fails.
pub const CHECKOUT_FAILED_MESSAGE: &str =
    "Não foi possível gerar a cobrança PIX. Tente novamente em instantes.";

/// Validates the checkout input and returns the value to charge, rounded to cents.
pub fn checkout_value(customer: &CustomerData, quote: &Quote) -> Result<Decimal> {
    customer.validate()?;

    let value = round_cents(quote.total);
    if value <= Decimal::ZERO {
        bail!("Nothing to charge: the quote total is not above zero");
    }
    Ok(value)
}

pub fn display_charge(charge: &PaymentCharge, currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.add_row(vec!["Charge", charge.id.as_str()]);
    table.add_row(vec!["Value", format_money(charge.value, currency).as_str()]);
    table.add_row(vec!["Invoice", charge.invoice_url.as_str()]);

    format!(
        "{}\n\n{table}\n\n{}\n{}\n",
        ui::style_text("PIX checkout", ui::StyleType::Title),
        ui::style_text("PIX copia e cola:", ui::StyleType::TotalLabel),
        charge.pix_code
    )
}

/// Creates the PIX charge for the quote total.
pub async fn run(
    gateway: &(dyn PaymentGateway + Send + Sync),
    customer: &CustomerData,
    quote: &Quote,
    currency: &str,
) -> Result<()> {
    // Input problems are the caller's to fix; report them as they are.
    let value = checkout_value(customer, quote)?;

    info!(%value, "Creating PIX checkout");
    let pb = ui::new_spinner("Creating PIX charge...");
    let result = gateway
        .create_pix_checkout(customer, value, &quote.description())
        .await;
    pb.finish_and_clear();

    match result {
        Ok(charge) => {
            println!("{}", display_charge(&charge, currency));
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "Checkout failed");
            println!("{}", ui::style_text(CHECKOUT_FAILED_MESSAGE, ui::StyleType::Error));
            Err(anyhow!(CHECKOUT_FAILED_MESSAGE))
        }
    }
}
