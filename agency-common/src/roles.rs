//! Role and capability tables
//!
//! The session provider is an external collaborator; it resolves the caller
//! and forwards the role in a request header. This module owns the single
//! role-to-capability table so handlers never repeat role string lists.

use serde::{Deserialize, Serialize};

/// Caller role as resolved by the upstream session provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Partner,
}

/// Operations guarded by a role check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create documents and drive their lifecycle
    ManageDocuments,
    /// Administrative counter override
    ReseedCounters,
    /// Financial analytics (stats, conversion, evolution, forecast)
    ViewFinance,
    /// Partner press-kit interaction reports
    ViewTracking,
}

impl Role {
    /// Header value as sent by the session layer (case-insensitive)
    pub fn from_header(value: &str) -> Option<Role> {
        match value.to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "partner" => Some(Role::Partner),
            _ => None,
        }
    }

    /// Central capability table
    pub fn allows(&self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::Manager => matches!(
                capability,
                Capability::ManageDocuments | Capability::ViewTracking
            ),
            Role::Partner => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_all_capabilities() {
        for cap in [
            Capability::ManageDocuments,
            Capability::ReseedCounters,
            Capability::ViewFinance,
            Capability::ViewTracking,
        ] {
            assert!(Role::Admin.allows(cap));
        }
    }

    #[test]
    fn test_manager_capabilities() {
        assert!(Role::Manager.allows(Capability::ManageDocuments));
        assert!(Role::Manager.allows(Capability::ViewTracking));
        assert!(!Role::Manager.allows(Capability::ViewFinance));
        assert!(!Role::Manager.allows(Capability::ReseedCounters));
    }

    #[test]
    fn test_partner_has_no_capabilities() {
        assert!(!Role::Partner.allows(Capability::ManageDocuments));
        assert!(!Role::Partner.allows(Capability::ViewTracking));
    }

    #[test]
    fn test_role_header_parsing() {
        assert_eq!(Role::from_header("admin"), Some(Role::Admin));
        assert_eq!(Role::from_header("Manager"), Some(Role::Manager));
        assert_eq!(Role::from_header("PARTNER"), Some(Role::Partner));
        assert_eq!(Role::from_header("intern"), None);
        assert_eq!(Role::from_header(""), None);
    }
}
