use super::util::with_retry;
use crate::core::payment::{CustomerData, PaymentCharge, PaymentGateway};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCustomerRequest<'a> {
    name: &'a str,
    cpf_cnpj: String,
    email: &'a str,
    notification_disabled: bool,
}

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentRequest<'a> {
    customer: &'a str,
    billing_type: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    value: Decimal,
    due_date: String,
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    id: String,
    invoice_url: String,
    value: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PixQrCodeResponse {
    payload: String,
    encoded_image: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    description: String,
}

/// PIX checkout through the Asaas billing API.
pub struct AsaasProvider {
    base_url: String,
    access_token: String,
    /// Prefixes every charge description.
    merchant_name: String,
    client: reqwest::Client,
}

impl AsaasProvider {
    pub fn new(base_url: &str, access_token: &str, merchant_name: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            merchant_name: merchant_name.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn due_date(today: NaiveDate) -> String {
        today
            .checked_add_days(Days::new(1))
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string()
    }

    /// Reads a response body, surfacing the provider's own error description
    /// before falling back to the HTTP status.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
        step: &str,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read {step} response"))?;

        if let Ok(ErrorBody { errors }) = serde_json::from_str::<ErrorBody>(&body)
            && let Some(first) = errors.first()
        {
            bail!("{step} rejected: {}", first.description);
        }
        if !status.is_success() {
            bail!("{step} failed with status {status}");
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(error = ?e, response = %body, "Failed to parse {step} response");
            anyhow!(e).context(format!("Failed to parse {step} response"))
        })
    }

    async fn create_customer(&self, customer: &CustomerData) -> Result<String> {
        let request = CreateCustomerRequest {
            name: &customer.name,
            cpf_cnpj: customer.document_digits(),
            email: &customer.email,
            notification_disabled: false,
        };
        let response = self
            .client
            .post(format!("{}/customers", self.base_url))
            .header("access_token", &self.access_token)
            .json(&request)
            .send()
            .await
            .context("Customer request failed")?;

        let created: CustomerResponse = Self::parse_response(response, "Customer creation").await?;
        debug!(customer_id = %created.id, "Created customer");
        Ok(created.id)
    }

    async fn create_payment(
        &self,
        customer_id: &str,
        value: Decimal,
        description: &str,
    ) -> Result<PaymentResponse> {
        let request = CreatePaymentRequest {
            customer: customer_id,
            billing_type: "PIX",
            value,
            due_date: Self::due_date(Utc::now().date_naive()),
            description: format!("{} - {}", self.merchant_name, description),
        };
        let response = self
            .client
            .post(format!("{}/payments", self.base_url))
            .header("access_token", &self.access_token)
            .json(&request)
            .send()
            .await
            .context("Payment request failed")?;

        let payment: PaymentResponse = Self::parse_response(response, "Payment creation").await?;
        debug!(payment_id = %payment.id, "Created payment");
        Ok(payment)
    }

    async fn fetch_pix_qr_code(&self, payment_id: &str) -> Result<PixQrCodeResponse> {
        let url = format!("{}/payments/{}/pixQrCode", self.base_url, payment_id);
        let response = with_retry(
            || async {
                self.client
                    .get(&url)
                    .header("access_token", &self.access_token)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
            },
            3,
            500,
        )
        .await
        .context("PIX QR code request failed")?;

        Self::parse_response(response, "PIX QR code").await
    }
}

#[async_trait]
impl PaymentGateway for AsaasProvider {
    #[instrument(name = "AsaasCheckout", skip(self, customer))]
    async fn create_pix_checkout(
        &self,
        customer: &CustomerData,
        value: Decimal,
        description: &str,
    ) -> Result<PaymentCharge> {
        // Customer and payment creation are not idempotent; never retry them.
        let customer_id = self.create_customer(customer).await?;
        let payment = self.create_payment(&customer_id, value, description).await?;
        let pix = self.fetch_pix_qr_code(&payment.id).await?;

        Ok(PaymentCharge {
            id: payment.id,
            invoice_url: payment.invoice_url,
            pix_code: pix.payload,
            pix_qr_code_base64: pix.encoded_image,
            value: payment.value,
        })
    }
}
