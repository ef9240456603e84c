//! Database access layer for agency-api

pub mod collaborations;
pub mod counters;
pub mod documents;
pub mod negotiations;
pub mod partner_events;
