use crate::client::ApiClient;
use crate::models::TransactionRecord;

/// What a period read actually returned. `period` is `None` when the view
/// covers all months, either because the caller asked for everything or
/// because a scoped read failed and the scope was widened.
#[derive(Debug, Clone)]
pub struct PeriodView {
    pub transactions: Vec<TransactionRecord>,
    pub period: Option<String>,
}

/// Read transactions for one month, widening to the full history when the
/// scoped read fails, and settling on an empty view when even that fails.
/// Never errors; callers must show `period` so nobody mistakes the widened
/// view for the month they asked for.
pub async fn load_period(client: &ApiClient, period: Option<&str>) -> PeriodView {
    if let Some(p) = period {
        match client.list_transactions(Some(p)).await {
            Ok(transactions) => {
                return PeriodView {
                    transactions,
                    period: Some(p.to_string()),
                };
            }
            Err(e) => {
                tracing::warn!(period = p, error = %e, "scoped read failed, widening to all months");
            }
        }
    }
    match client.list_transactions(None).await {
        Ok(transactions) => PeriodView {
            transactions,
            period: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "unscoped read failed, showing empty view");
            PeriodView {
                transactions: Vec::new(),
                period: None,
            }
        }
    }
}
