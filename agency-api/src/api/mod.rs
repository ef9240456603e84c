//! HTTP API handlers for agency-api

pub mod auth;
pub mod counters;
pub mod documents;
pub mod finance;
pub mod health;
pub mod tracking;

pub use counters::reseed_counter;
pub use documents::{
    cancel_document, create_document, get_document, list_documents, pay_document,
    register_document, send_document,
};
pub use finance::{finance_conversion, finance_evolution, finance_forecast, finance_stats};
pub use health::health_routes;
pub use tracking::{partner_stats, track_partner_event};
