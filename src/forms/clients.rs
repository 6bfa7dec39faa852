//! Client payloads, including the CSV bulk import.

use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{NewClient, UpdateClient};
use crate::domain::types::{ClientName, ContactEmail, OrgId, PhoneNumber};
use crate::forms::{FormError, non_blank, parse_optional};

#[derive(Debug, Deserialize, Validate)]
pub struct ClientForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Validated client fields shared by create and update.
pub struct ClientPayload {
    pub name: ClientName,
    pub email: Option<ContactEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
}

impl TryFrom<ClientForm> for ClientPayload {
    type Error = FormError;

    fn try_from(form: ClientForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: ClientName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: parse_optional(form.email, ContactEmail::new)?,
            phone: parse_optional(form.phone, PhoneNumber::new)?,
            address: non_blank(form.address),
        })
    }
}

impl ClientPayload {
    pub fn into_new(self, org_id: OrgId) -> NewClient {
        NewClient::new(org_id, self.name, self.email, self.phone, self.address)
    }

    pub fn into_update(self) -> UpdateClient {
        UpdateClient::new(self.name, self.email, self.phone, self.address)
    }
}

/// Query string of the client list.
#[derive(Debug, Default, Deserialize)]
pub struct ClientListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

#[derive(MultipartForm)]
pub struct UploadClientsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

#[derive(Debug, Deserialize)]
struct ClientCsvRow {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

impl UploadClientsForm {
    /// Opens the uploaded temporary file for reading.
    pub fn reader(&self) -> Result<std::fs::File, FormError> {
        self.csv
            .file
            .reopen()
            .map_err(|err| FormError::Csv(err.to_string()))
    }
}

/// Reads `name,email,phone,address` rows; only `name` is mandatory.
///
/// The whole file is rejected when any row is invalid, naming the line.
pub fn parse_clients_csv<R: Read>(reader: R, org_id: OrgId) -> Result<Vec<NewClient>, FormError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|err| FormError::Csv(err.to_string()))?;
    if !headers.iter().any(|h| h == "name") {
        return Err(FormError::Csv("missing `name` column".to_string()));
    }

    let mut clients = Vec::new();
    for (index, row) in rdr.deserialize::<ClientCsvRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let row = row.map_err(|err| FormError::Csv(format!("line {line}: {err}")))?;
        let payload = ClientPayload::try_from(ClientForm {
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
        })
        .map_err(|err| FormError::Csv(format!("line {line}: {err}")))?;
        clients.push(payload.into_new(org_id));
    }

    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> OrgId {
        OrgId::new(1).unwrap()
    }

    #[test]
    fn csv_rows_become_clients() {
        let data = "name,email,phone,address\n\
                    Alice Smith,ALICE@example.com,,12 Oak St\n\
                    Bob Jones,,,\n";
        let clients = parse_clients_csv(data.as_bytes(), org()).unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].name.as_str(), "Alice Smith");
        assert_eq!(clients[0].email.as_ref().unwrap().as_str(), "alice@example.com");
        assert_eq!(clients[0].address.as_deref(), Some("12 Oak St"));
        assert!(clients[1].email.is_none());
    }

    #[test]
    fn csv_without_name_column_is_rejected() {
        let data = "email,phone\nalice@example.com,\n";
        assert!(matches!(
            parse_clients_csv(data.as_bytes(), org()),
            Err(FormError::Csv(_))
        ));
    }

    #[test]
    fn csv_error_names_the_line() {
        let data = "name,email\nAlice,alice@example.com\nBob,not-an-email\n";
        match parse_clients_csv(data.as_bytes(), org()) {
            Err(FormError::Csv(message)) => assert!(message.starts_with("line 3")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn client_form_requires_name() {
        let form = ClientForm {
            name: String::new(),
            email: None,
            phone: None,
            address: None,
        };
        assert!(matches!(
            ClientPayload::try_from(form),
            Err(FormError::Validation(_))
        ));
    }
}
