use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, ShoeboxError};
use crate::models::{CommitReceipt, StatementResult, TransactionRecord, TransactionType};

/// Thin client for the budget server's HTTP API. One instance per run;
/// reqwest pools connections underneath.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct BatchPayload<'a> {
    transactions: &'a [TransactionRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    account_id: Option<&'a str>,
}

#[derive(Serialize)]
struct TaskPayload<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    list: Option<&'a str>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }

    /// Send one statement file to the normalizer and get back parsed
    /// transactions plus the profile metadata the server chose.
    pub async fn normalize_statement(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        declared: TransactionType,
    ) -> Result<StatementResult> {
        let url = format!("{}/api/statements/normalize", self.base_url);
        tracing::debug!(%url, file_name, "normalizing statement");
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("transaction_type", declared.wire_name());
        let resp = self.auth(self.http.post(url).multipart(form)).send().await?;
        read_json(resp, "normalizer").await
    }

    /// Commit staged transactions in one batch.
    pub async fn commit_transactions(
        &self,
        transactions: &[TransactionRecord],
        account_id: Option<&str>,
    ) -> Result<CommitReceipt> {
        let url = format!("{}/api/transactions/batch", self.base_url);
        tracing::debug!(%url, count = transactions.len(), "committing transactions");
        let payload = BatchPayload {
            transactions,
            account_id,
        };
        let resp = self.auth(self.http.post(url).json(&payload)).send().await?;
        read_json(resp, "commit").await
    }

    /// Fetch committed transactions, optionally scoped to a YYYY-MM month.
    pub async fn list_transactions(
        &self,
        month: Option<&str>,
    ) -> Result<Vec<TransactionRecord>> {
        let url = format!("{}/api/transactions", self.base_url);
        tracing::debug!(%url, ?month, "listing transactions");
        let mut req = self.http.get(url);
        if let Some(m) = month {
            req = req.query(&[("month", m)]);
        }
        let resp = self.auth(req).send().await?;
        read_json(resp, "transaction list").await
    }

    pub async fn create_task(&self, title: &str, list: Option<&str>) -> Result<()> {
        let url = format!("{}/api/tasks", self.base_url);
        tracing::debug!(%url, title, "creating task");
        let payload = TaskPayload { title, list };
        let resp = self.auth(self.http.post(url).json(&payload)).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ShoeboxError::Api {
                status: status.as_u16(),
                message: api_message(&body),
            })
        }
    }

    pub async fn health(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.auth(self.http.get(url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            }
        }
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".csv") {
        "text/csv"
    } else if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        "application/vnd.ms-excel"
    } else {
        "application/octet-stream"
    }
}

/// Decode a JSON response body, turning error statuses and non-JSON
/// payloads (proxy HTML pages and the like) into readable errors.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response, what: &str) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ShoeboxError::Api {
            status: status.as_u16(),
            message: api_message(&body),
        });
    }
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !content_type.contains("application/json") {
        return Err(ShoeboxError::UnexpectedResponse(format!(
            "{what} returned '{content_type}' instead of JSON"
        )));
    }
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        ShoeboxError::UnexpectedResponse(format!("{what} payload did not decode: {e}"))
    })
}

fn api_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(m) = v.get(key).and_then(|m| m.as_str()) {
                return m.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no details".to_string()
    } else if trimmed.chars().count() > 120 {
        let cut: String = trimmed.chars().take(120).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}
