//! Database models shared across the claims repository.

pub mod claim;
pub mod claim_event;
pub mod client;
pub mod config;
pub mod depreciation;
pub mod estimate;
pub mod job;
pub mod lead;
pub mod member;
pub mod notification;
pub mod organization;
pub mod property;
pub mod stripe_event;
pub mod webhook;
