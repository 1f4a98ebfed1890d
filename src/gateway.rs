// src/gateway.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::error::AppError;

/// Dados devolvidos pelo gateway ao emitir uma cobrança. São persistidos
/// na fatura exatamente como recebidos.
#[derive(Debug, Clone)]
pub struct Charge {
    pub id: String,
    pub invoice_url: Option<String>,
    pub bank_slip_url: Option<String>,
    pub pix_payload: Option<String>,
}

/// Colaborador de pagamentos. Trait para que o gerador de faturas possa ser
/// exercitado com uma implementação de teste, sem rede.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Garante que o pagador existe no gateway e devolve o id externo dele.
    async fn ensure_customer(
        &self,
        name: &str,
        email: &str,
        document_number: Option<&str>,
    ) -> Result<String, AppError>;

    /// Emite uma cobrança para o pagador informado.
    async fn create_charge(
        &self,
        customer_id: &str,
        value: Decimal,
        due_date: NaiveDate,
        description: &str,
    ) -> Result<Charge, AppError>;
}

// =============================================================================
//  Implementação HTTP (API estilo Asaas)
// =============================================================================

#[derive(Clone)]
pub struct AsaasGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCustomerRequest<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpf_cnpj: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CustomerListResponse {
    data: Vec<CustomerResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentRequest<'a> {
    customer: &'a str,
    billing_type: &'a str,
    value: Decimal,
    due_date: NaiveDate,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    id: String,
    invoice_url: Option<String>,
    bank_slip_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PixQrCodeResponse {
    payload: Option<String>,
}

impl AsaasGateway {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Converte respostas não-2xx em AppError::Gateway com o corpo bruto,
    /// para o log do job dizer o que o gateway reclamou.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Gateway(format!("HTTP {status}: {body}")))
    }
}

#[async_trait]
impl PaymentGateway for AsaasGateway {
    async fn ensure_customer(
        &self,
        name: &str,
        email: &str,
        document_number: Option<&str>,
    ) -> Result<String, AppError> {
        // Primeiro tenta localizar pelo e-mail, para não duplicar o pagador
        let response = self
            .http
            .get(format!("{}/v3/customers", self.base_url))
            .header("access_token", &self.api_key)
            .query(&[("email", email)])
            .send()
            .await?;
        let found: CustomerListResponse = Self::check(response).await?.json().await?;

        if let Some(customer) = found.data.into_iter().next() {
            return Ok(customer.id);
        }

        let response = self
            .http
            .post(format!("{}/v3/customers", self.base_url))
            .header("access_token", &self.api_key)
            .json(&CreateCustomerRequest {
                name,
                email,
                cpf_cnpj: document_number,
            })
            .send()
            .await?;
        let created: CustomerResponse = Self::check(response).await?.json().await?;

        Ok(created.id)
    }

    async fn create_charge(
        &self,
        customer_id: &str,
        value: Decimal,
        due_date: NaiveDate,
        description: &str,
    ) -> Result<Charge, AppError> {
        let response = self
            .http
            .post(format!("{}/v3/payments", self.base_url))
            .header("access_token", &self.api_key)
            .json(&CreatePaymentRequest {
                customer: customer_id,
                billing_type: "BOLETO",
                value,
                due_date,
                description,
            })
            .send()
            .await?;
        let payment: PaymentResponse = Self::check(response).await?.json().await?;

        // O QR Code PIX vem de um endpoint separado; se falhar, a cobrança
        // continua válida pelo boleto, então só registramos o aviso.
        let pix_payload = match self
            .http
            .get(format!("{}/v3/payments/{}/pixQrCode", self.base_url, payment.id))
            .header("access_token", &self.api_key)
            .send()
            .await
        {
            Ok(response) => match Self::check(response).await {
                Ok(ok) => ok.json::<PixQrCodeResponse>().await.ok().and_then(|p| p.payload),
                Err(e) => {
                    tracing::warn!("Sem QR Code PIX para a cobrança {}: {}", payment.id, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Sem QR Code PIX para a cobrança {}: {}", payment.id, e);
                None
            }
        };

        Ok(Charge {
            id: payment.id,
            invoice_url: payment.invoice_url,
            bank_slip_url: payment.bank_slip_url,
            pix_payload,
        })
    }
}
