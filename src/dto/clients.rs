use serde::Serialize;

use crate::domain::client::Client;
use crate::domain::property::Property;

#[derive(Debug, Serialize)]
pub struct ClientDetail {
    pub client: Client,
    pub properties: Vec<Property>,
}

/// Outcome of a CSV import.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
}
