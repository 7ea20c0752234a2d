use std::path::{Path, PathBuf};

use crate::client::ApiClient;
use crate::error::{Result, ShoeboxError};
use crate::models::{StatementResult, TransactionRecord, TransactionType};

/// One statement file the server could not parse. The batch keeps going;
/// these are reported next to whatever succeeded.
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub file_name: String,
    pub message: String,
}

/// All successful per-file results folded into one staged upload.
#[derive(Debug, Clone)]
pub struct MergedUpload {
    /// File order first, then in-file order.
    pub transactions: Vec<TransactionRecord>,
    pub total_count: usize,
    /// Summed per transaction, not per file, so server-side rounding of
    /// file subtotals cannot compound.
    pub total_amount: f64,
    pub transaction_type: TransactionType,
    /// Month of the first file that parsed.
    pub month_year: String,
    /// Profile metadata of the last file that parsed. For multi-file
    /// batches of differing formats this misstates provenance; kept
    /// deliberately, see DESIGN.md.
    pub normalizer_profile: String,
    pub normalizer_confidence: f64,
    pub file_count: usize,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub merged: MergedUpload,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    pub fn summary(&self) -> String {
        let m = &self.merged;
        let mut s = format!(
            "Parsed {} {} transaction{} from {} file{}",
            m.total_count,
            m.transaction_type.label(),
            if m.total_count == 1 { "" } else { "s" },
            m.file_count,
            if m.file_count == 1 { "" } else { "s" },
        );
        if !self.failures.is_empty() {
            s.push_str(&format!(
                " ({} failed: {})",
                self.failures.len(),
                join_failures(&self.failures)
            ));
        }
        s
    }
}

fn join_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.file_name, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Send each statement file to the normalizer, one at a time in the order
/// given. A file that fails (unreadable locally, rejected by the server,
/// or a malformed response) is recorded and the loop moves on; the run as
/// a whole fails only when no file at all parses.
pub async fn upload_statements(
    client: &ApiClient,
    files: &[PathBuf],
    declared: TransactionType,
    mut progress: impl FnMut(usize, usize, &str),
) -> Result<BatchOutcome> {
    let mut results: Vec<StatementResult> = Vec::new();
    let mut failures: Vec<FileFailure> = Vec::new();

    for (i, path) in files.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        progress(i + 1, files.len(), &name);
        match normalize_one(client, path, &name, declared).await {
            Ok(result) => {
                tracing::debug!(
                    file = %name,
                    count = result.transaction_count,
                    server_total = result.total_amount,
                    profile = %result.normalizer_profile,
                    "statement normalized"
                );
                results.push(result);
            }
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "statement rejected");
                failures.push(FileFailure {
                    file_name: name,
                    message: e.to_string(),
                });
            }
        }
    }

    let Some(merged) = merge_results(&results) else {
        let detail = if failures.is_empty() {
            "no statement files were given".to_string()
        } else {
            join_failures(&failures)
        };
        return Err(ShoeboxError::UploadFailed(detail));
    };
    Ok(BatchOutcome { merged, failures })
}

async fn normalize_one(
    client: &ApiClient,
    path: &Path,
    name: &str,
    declared: TransactionType,
) -> Result<StatementResult> {
    let bytes = tokio::fs::read(path).await?;
    client.normalize_statement(name, bytes, declared).await
}

/// Fold per-file results into one staged upload. Returns `None` when
/// nothing succeeded.
pub fn merge_results(results: &[StatementResult]) -> Option<MergedUpload> {
    let first = results.first()?;
    let last = results.last()?;

    let mut transactions = Vec::new();
    let mut total_count = 0;
    for r in results {
        transactions.extend(r.transactions.iter().cloned());
        total_count += r.transaction_count;
    }
    let total_amount = transactions.iter().map(|t| t.amount).sum();

    let mut transaction_type = first.transaction_type;
    if results.iter().any(|r| r.transaction_type != transaction_type) {
        transaction_type = TransactionType::Mixed;
    }

    Some(MergedUpload {
        transactions,
        total_count,
        total_amount,
        transaction_type,
        month_year: first.month_year.clone(),
        normalizer_profile: last.normalizer_profile.clone(),
        normalizer_confidence: last.normalizer_confidence,
        file_count: results.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn result(
        ty: TransactionType,
        month: &str,
        profile: &str,
        confidence: f64,
        amounts: &[f64],
    ) -> StatementResult {
        StatementResult {
            transactions: amounts
                .iter()
                .enumerate()
                .map(|(i, a)| TransactionRecord {
                    id: None,
                    date: format!("{month}-{:02}", i + 1),
                    description: format!("{profile} txn {i}"),
                    amount: *a,
                    category: None,
                })
                .collect(),
            transaction_count: amounts.len(),
            total_amount: amounts.iter().sum(),
            transaction_type: ty,
            month_year: month.to_string(),
            normalizer_profile: profile.to_string(),
            normalizer_confidence: confidence,
        }
    }

    #[test]
    fn test_merge_unifies_single_type() {
        let results = vec![
            result(TransactionType::CreditCard, "2025-03", "visa-v2", 0.9, &[-10.0, -20.0]),
            result(TransactionType::CreditCard, "2025-03", "visa-v2", 0.8, &[-30.0]),
        ];
        let merged = merge_results(&results).unwrap();
        assert_eq!(merged.transaction_type, TransactionType::CreditCard);
        assert_eq!(merged.total_count, 3);
        assert_eq!(merged.file_count, 2);
        let order: Vec<&str> = merged
            .transactions
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(
            order,
            vec!["visa-v2 txn 0", "visa-v2 txn 1", "visa-v2 txn 0"]
        );
    }

    #[test]
    fn test_merge_flags_mixed_types() {
        let results = vec![
            result(TransactionType::CreditCard, "2025-03", "visa-v2", 0.9, &[-10.0]),
            result(TransactionType::Cash, "2025-03", "teller-ocr", 0.6, &[200.0]),
        ];
        let merged = merge_results(&results).unwrap();
        assert_eq!(merged.transaction_type, TransactionType::Mixed);
    }

    #[test]
    fn test_merge_sums_individual_amounts_not_file_subtotals() {
        let mut skewed = result(TransactionType::Cash, "2025-03", "teller-ocr", 0.6, &[10.0, 20.0]);
        // A server that rounds its own subtotal must not poison the merge.
        skewed.total_amount = 31.0;
        let results = vec![
            skewed,
            result(TransactionType::Cash, "2025-03", "teller-ocr", 0.6, &[5.5]),
        ];
        let merged = merge_results(&results).unwrap();
        assert!((merged.total_amount - 35.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_period_from_first_metadata_from_last() {
        let results = vec![
            result(TransactionType::CreditCard, "2025-01", "visa-v2", 0.5, &[-1.0]),
            result(TransactionType::CreditCard, "2025-02", "amex-v1", 0.9, &[-2.0]),
            result(TransactionType::CreditCard, "2025-03", "generic-csv", 0.7, &[-3.0]),
        ];
        let merged = merge_results(&results).unwrap();
        assert_eq!(merged.month_year, "2025-01");
        assert_eq!(merged.normalizer_profile, "generic-csv");
        assert!((merged.normalizer_confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_of_nothing_is_none() {
        assert!(merge_results(&[]).is_none());
    }

    #[test]
    fn test_summary_reports_partial_failures() {
        let merged = merge_results(&[result(
            TransactionType::CreditCard,
            "2025-03",
            "visa-v2",
            0.9,
            &[-10.0, -20.0],
        )])
        .unwrap();
        let outcome = BatchOutcome {
            merged,
            failures: vec![FileFailure {
                file_name: "february.pdf".to_string(),
                message: "Server error (422): unsupported file format".to_string(),
            }],
        };
        assert_eq!(
            outcome.summary(),
            "Parsed 2 credit card transactions from 1 file \
             (1 failed: february.pdf: Server error (422): unsupported file format)"
        );
    }

    fn statement_body(profile: &str, month: &str) -> String {
        format!(
            r#"{{
                "transactions": [
                    {{"date": "{month}-02", "description": "{profile} A", "amount": -12.5}},
                    {{"date": "{month}-03", "description": "{profile} B", "amount": -7.5}}
                ],
                "transaction_count": 2,
                "total_amount": -20.0,
                "transaction_type": "credit_card",
                "month_year": "{month}",
                "normalizer_profile": "{profile}",
                "normalizer_confidence": 0.88
            }}"#
        )
    }

    #[tokio::test]
    async fn test_batch_continues_past_rejected_file() {
        let mut server = Server::new_async().await;
        let ok_mock = server
            .mock("POST", "/api/statements/normalize")
            .match_body(Matcher::Regex("good.csv".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(statement_body("visa-v2", "2025-03"))
            .create_async()
            .await;
        let bad_mock = server
            .mock("POST", "/api/statements/normalize")
            .match_body(Matcher::Regex("bad.csv".to_string()))
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "unreadable statement"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let bad = dir.path().join("bad.csv");
        std::fs::write(&good, "date,desc,amount\n").unwrap();
        std::fs::write(&bad, "garbage").unwrap();

        let client = ApiClient::new(&server.url(), "", 5).unwrap();
        let mut seen: Vec<(usize, usize, String)> = Vec::new();
        let outcome = upload_statements(
            &client,
            &[good, bad],
            TransactionType::CreditCard,
            |i, n, name| seen.push((i, n, name.to_string())),
        )
        .await
        .unwrap();

        ok_mock.assert_async().await;
        bad_mock.assert_async().await;
        assert_eq!(
            seen,
            vec![
                (1, 2, "good.csv".to_string()),
                (2, 2, "bad.csv".to_string())
            ]
        );
        assert_eq!(outcome.merged.file_count, 1);
        assert_eq!(outcome.merged.total_count, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].file_name, "bad.csv");
        assert!(outcome.failures[0].message.contains("unreadable statement"));
    }

    #[tokio::test]
    async fn test_batch_with_no_successes_fails_whole() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/statements/normalize")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "normalizer offline"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let only = dir.path().join("only.csv");
        std::fs::write(&only, "date,desc,amount\n").unwrap();

        let client = ApiClient::new(&server.url(), "", 5).unwrap();
        let err = upload_statements(&client, &[only], TransactionType::Cash, |_, _, _| {})
            .await
            .unwrap_err();
        match err {
            ShoeboxError::UploadFailed(detail) => {
                assert!(detail.contains("only.csv"));
                assert!(detail.contains("normalizer offline"));
            }
            other => panic!("expected UploadFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_local_file_is_a_per_file_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/statements/normalize")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(statement_body("visa-v2", "2025-03"))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.csv");
        std::fs::write(&real, "date,desc,amount\n").unwrap();
        let ghost = dir.path().join("missing.csv");

        let client = ApiClient::new(&server.url(), "", 5).unwrap();
        let outcome = upload_statements(
            &client,
            &[ghost, real],
            TransactionType::CreditCard,
            |_, _, _| {},
        )
        .await
        .unwrap();
        mock.assert_async().await;
        assert_eq!(outcome.merged.file_count, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].file_name, "missing.csv");
    }
}
