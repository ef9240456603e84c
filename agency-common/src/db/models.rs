//! Database models

use serde::{Deserialize, Serialize};

/// Financial document row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub guid: String,
    /// Immutable once assigned, unique per (type, year), e.g. `FACTURE-2026-0001`
    pub reference: String,
    pub doc_type: String,
    pub status: String,
    pub issue_date: String,
    pub due_date: Option<String>,
    pub amount_ht: f64,
    pub amount_tax: f64,
    pub amount_ttc: f64,
    pub notes: String,
    pub collaboration_id: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}
