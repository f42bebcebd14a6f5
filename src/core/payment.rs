//! Checkout abstractions

use anyhow::{Result, bail};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerData {
    pub name: String,
    /// Brazilian taxpayer id, CPF (11 digits) or CNPJ (14 digits).
    pub cpf_cnpj: String,
    pub email: String,
}

impl CustomerData {
    pub fn new(name: &str, cpf_cnpj: &str, email: &str) -> Self {
        CustomerData {
            name: name.trim().to_string(),
            cpf_cnpj: cpf_cnpj.trim().to_string(),
            email: email.trim().to_string(),
        }
    }

    /// The CPF/CNPJ with punctuation stripped.
    pub fn document_digits(&self) -> String {
        self.cpf_cnpj.chars().filter(char::is_ascii_digit).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("Customer name is required");
        }
        let digits = self.document_digits();
        if digits.len() != 11 && digits.len() != 14 {
            bail!("CPF/CNPJ must have 11 or 14 digits, got {}", digits.len());
        }
        if self
            .cpf_cnpj
            .chars()
            .any(|c| !c.is_ascii_digit() && !matches!(c, '.' | '-' | '/' | ' '))
        {
            bail!("CPF/CNPJ contains invalid characters");
        }
        match self.email.split_once('@') {
            Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
            _ => bail!("Invalid e-mail address: {}", self.email),
        }
    }
}

/// A PIX charge ready to be paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCharge {
    pub id: String,
    pub invoice_url: String,
    /// Copy-paste ("copia e cola") payment code.
    pub pix_code: String,
    pub pix_qr_code_base64: String,
    pub value: Decimal,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Registers the customer and creates a PIX charge for `value`.
    async fn create_pix_checkout(
        &self,
        customer: &CustomerData,
        value: Decimal,
        description: &str,
    ) -> Result<PaymentCharge>;
}
