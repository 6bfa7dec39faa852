//! Processed Stripe event ids used for idempotent webhook handling.

use diesel::prelude::*;

#[derive(Insertable)]
#[diesel(table_name = crate::schema::stripe_events)]
pub struct NewStripeEvent<'a> {
    pub id: &'a str,
    pub event_type: &'a str,
}
