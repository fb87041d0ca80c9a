//! Tally API Client

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API Client for Tally
pub struct TallyClient {
    client: Client,
    base_url: String,
}

// ============================================
// API Request/Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCustomerRequest {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceItemResponse {
    pub product_name: String,
    pub quantity: i32,
    pub amount: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub is_voided: bool,
    pub is_blank: bool,
    pub is_dual_format: bool,
    pub customer_code: Option<String>,
    pub buyer: String,
    pub items: Vec<InvoiceItemResponse>,
    pub tax_excluded_amount: Decimal,
    pub tax: Decimal,
    pub tax_included_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceListResponse {
    pub data: Vec<InvoiceResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceRefResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct DateConstraintsResponse {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub prev_invoice: Option<InvoiceRefResponse>,
    pub next_invoice: Option<InvoiceRefResponse>,
}

/// Filters shared by listing and export
#[derive(Debug, Default, Clone)]
pub struct InvoiceFilter {
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl InvoiceFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_ref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.clone()));
        }
        if let Some(from) = self.from {
            pairs.push(("start_date", from.to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("end_date", to.to_string()));
        }
        pairs
    }
}

/// Downloaded export file
pub struct ExportFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Fail with the server's message on a non-success status
async fn check(resp: Response) -> Result<Response> {
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("API error ({}): {}", status, body);
    }
    Ok(resp)
}

async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T> {
    check(resp)
        .await?
        .json()
        .await
        .context("Failed to parse response")
}

/// File name from a `Content-Disposition: attachment; filename=...` header
pub fn attachment_file_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
}

impl TallyClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the server is reachable
    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        parse(resp).await
    }

    // ---- Customers ----

    pub async fn list_customers(&self) -> Result<Vec<CustomerResponse>> {
        let resp = self
            .client
            .get(self.url("/api/customers"))
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        parse(resp).await
    }

    /// Look up a customer by code; `None` when the code is unknown
    pub async fn find_customer(&self, code: &str) -> Result<Option<CustomerResponse>> {
        let resp = self
            .client
            .get(self.url("/api/customers/by-code"))
            .query(&[("code", code)])
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        parse(resp).await
    }

    pub async fn create_customer(&self, request: &CreateCustomerRequest) -> Result<CustomerResponse> {
        let resp = self
            .client
            .post(self.url("/api/customers"))
            .json(request)
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        parse(resp).await
    }

    pub async fn delete_customer(&self, id: Uuid) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/customers/{}", id)))
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        check(resp).await?;
        Ok(())
    }

    // ---- Invoices ----

    pub async fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<InvoiceListResponse> {
        let mut query = filter.query_pairs();
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let resp = self
            .client
            .get(self.url("/api/invoices"))
            .query(&query)
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        parse(resp).await
    }

    pub async fn get_invoice(&self, id: Uuid) -> Result<InvoiceResponse> {
        let resp = self
            .client
            .get(self.url(&format!("/api/invoices/{}", id)))
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        parse(resp).await
    }

    /// Create an invoice from a raw JSON request body
    pub async fn create_invoice(&self, body: &serde_json::Value) -> Result<InvoiceResponse> {
        let resp = self
            .client
            .post(self.url("/api/invoices"))
            .json(body)
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        parse(resp).await
    }

    pub async fn delete_invoice(&self, id: Uuid) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/invoices/{}", id)))
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        check(resp).await?;
        Ok(())
    }

    pub async fn date_constraints(
        &self,
        invoice_number: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<DateConstraintsResponse> {
        let url = self.url(&format!(
            "/api/invoices/date-constraints/{}",
            urlencoding::encode(invoice_number)
        ));
        let mut request = self.client.get(url);
        if let Some(id) = exclude_id {
            request = request.query(&[("exclude_id", id.to_string())]);
        }

        let resp = request
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        parse(resp).await
    }

    /// Download an export (`csv`, `pdf` or `excel`)
    pub async fn export(&self, format: &str, filter: &InvoiceFilter) -> Result<ExportFile> {
        let resp = self
            .client
            .get(self.url(&format!("/api/invoices/export/{}", urlencoding::encode(format))))
            .query(&filter.query_pairs())
            .send()
            .await
            .context("Failed to connect to Tally API")?;
        let resp = check(resp).await?;

        let file_name = resp
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_file_name);
        let bytes = resp.bytes().await.context("Failed to download export")?;

        Ok(ExportFile {
            file_name,
            bytes: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_file_name() {
        assert_eq!(
            attachment_file_name("attachment; filename=invoices_2024-05-01.csv").as_deref(),
            Some("invoices_2024-05-01.csv")
        );
        assert_eq!(
            attachment_file_name("attachment; filename=\"report.pdf\"").as_deref(),
            Some("report.pdf")
        );
        assert_eq!(attachment_file_name("attachment"), None);
        assert_eq!(attachment_file_name("attachment; filename=../etc/passwd"), None);
    }

    #[test]
    fn test_filter_query_skips_empty_values() {
        let filter = InvoiceFilter {
            search: Some(" ".to_string()),
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: None,
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("start_date", "2024-01-01".to_string())]
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = TallyClient::new("http://localhost:8000/");
        assert_eq!(client.url("/health"), "http://localhost:8000/health");
    }
}
