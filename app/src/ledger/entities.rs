use serde::{Deserialize, Serialize};

use crate::user::Savings;

/// An income or expense entry. Its shape is up to the client, the ledger stores it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(pub serde_json::Value);

/// Everything a user has recorded: income, expenses and savings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub income: Vec<Entry>,
    pub expenses: Vec<Entry>,
    pub savings: Savings,
}
