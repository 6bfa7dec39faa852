use serde::Serialize;

use crate::domain::client::Client;
use crate::domain::lead::Lead;

#[derive(Debug, Serialize)]
pub struct ConvertedLead {
    pub lead: Lead,
    pub client: Client,
}
