//! Document types, reference formatting and the status state machine
//!
//! Financial documents (quotes, invoices, credit notes, purchase orders)
//! carry a human-readable reference `{CODE}-{YEAR}-{NNNN}` and move through
//! a small lifecycle: Draft -> Sent / Registered -> Paid, with Cancelled
//! reachable from any non-terminal state. Transitions are pure functions so
//! the persistence layer can apply them inside a conditional update.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Financial document kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    Quote,
    Invoice,
    CreditNote,
    PurchaseOrder,
}

impl DocumentType {
    /// Reference code used in document references and counter rows
    pub fn code(&self) -> &'static str {
        match self {
            DocumentType::Quote => "DEVIS",
            DocumentType::Invoice => "FACTURE",
            DocumentType::CreditNote => "AVOIR",
            DocumentType::PurchaseOrder => "BDC",
        }
    }

    /// Parse a reference code back into a document type
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "DEVIS" => Ok(DocumentType::Quote),
            "FACTURE" => Ok(DocumentType::Invoice),
            "AVOIR" => Ok(DocumentType::CreditNote),
            "BDC" => Ok(DocumentType::PurchaseOrder),
            other => Err(Error::InvalidInput(format!(
                "Unknown document type code: {}",
                other
            ))),
        }
    }

    /// Format a human-readable reference, e.g. `FACTURE-2026-0067`
    ///
    /// Sequence numbers are zero-padded to 4 digits; larger sequences keep
    /// their natural width.
    pub fn format_reference(&self, year: i32, sequence: i64) -> String {
        format!("{}-{}-{:04}", self.code(), year, sequence)
    }
}

/// Document lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Draft,
    Sent,
    Registered,
    Paid,
    Cancelled,
}

impl DocumentStatus {
    /// Status as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Registered => "registered",
            DocumentStatus::Paid => "paid",
            DocumentStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a stored status string
    pub fn from_str_store(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(DocumentStatus::Draft),
            "sent" => Ok(DocumentStatus::Sent),
            "registered" => Ok(DocumentStatus::Registered),
            "paid" => Ok(DocumentStatus::Paid),
            "cancelled" => Ok(DocumentStatus::Cancelled),
            other => Err(Error::Internal(format!(
                "Unknown document status in store: {}",
                other
            ))),
        }
    }

    /// Register (validate) a document. Only a draft can be registered.
    pub fn register(self) -> Result<DocumentStatus> {
        match self {
            DocumentStatus::Draft => Ok(DocumentStatus::Registered),
            other => Err(Error::InvalidTransition(format!(
                "only a draft can be registered (current status: {})",
                other.as_str()
            ))),
        }
    }

    /// Mark a draft as sent to the client.
    pub fn send(self) -> Result<DocumentStatus> {
        match self {
            DocumentStatus::Draft => Ok(DocumentStatus::Sent),
            other => Err(Error::InvalidTransition(format!(
                "only a draft can be sent (current status: {})",
                other.as_str()
            ))),
        }
    }

    /// Mark a registered document as paid. Entry point used by payment
    /// reconciliation; any other source state is rejected.
    pub fn pay(self) -> Result<DocumentStatus> {
        match self {
            DocumentStatus::Registered => Ok(DocumentStatus::Paid),
            other => Err(Error::InvalidTransition(format!(
                "only a registered document can be marked paid (current status: {})",
                other.as_str()
            ))),
        }
    }

    /// Cancel a document. Allowed from any state except the terminal ones.
    pub fn cancel(self) -> Result<DocumentStatus> {
        match self {
            DocumentStatus::Paid => Err(Error::InvalidTransition(
                "cannot cancel a paid document - issue a credit note instead".to_string(),
            )),
            DocumentStatus::Cancelled => Err(Error::InvalidTransition(
                "document is already cancelled".to_string(),
            )),
            _ => Ok(DocumentStatus::Cancelled),
        }
    }
}
