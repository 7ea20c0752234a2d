use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Statement type declared for an upload batch. `Mixed` only arises when
/// merged files disagree; it cannot be declared on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    CreditCard,
    Cash,
    #[value(skip)]
    Mixed,
}

impl TransactionType {
    /// Name used on the wire: credit_card, cash, mixed.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Cash => "cash",
            Self::Mixed => "mixed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit card",
            Self::Cash => "cash",
            Self::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Server-assigned; absent on records staged for commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// What the normalizer returns for a single statement file.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementResult {
    pub transactions: Vec<TransactionRecord>,
    pub transaction_count: usize,
    pub total_amount: f64,
    pub transaction_type: TransactionType,
    pub month_year: String,
    pub normalizer_profile: String,
    pub normalizer_confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitReceipt {
    pub message: String,
}
