//! Processed Stripe events. Stripe events are global, so this table carries
//! no `org_id`; the organization is resolved from the event's customer.

use diesel::prelude::*;

use crate::models::stripe_event::NewStripeEvent;
use crate::repository::errors::{RepositoryResult, is_unique_violation};
use crate::repository::{DieselRepository, StripeEventWriter};
use crate::schema::stripe_events;

impl StripeEventWriter for DieselRepository {
    fn record_stripe_event(&self, event_id: &str, event_type: &str) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;

        let inserted = diesel::insert_into(stripe_events::table)
            .values(NewStripeEvent {
                id: event_id,
                event_type,
            })
            .execute(&mut conn);

        match inserted {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn forget_stripe_event(&self, event_id: &str) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        diesel::delete(stripe_events::table.find(event_id)).execute(&mut conn)?;
        Ok(())
    }
}
