//! Clients for the outside world: webhook receivers, Stripe, email and the LLM gateway.

pub mod ai_gateway;
pub mod mailer;
pub mod stripe;
pub mod webhook;
