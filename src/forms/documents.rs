use serde::Deserialize;
use validator::Validate;

use crate::domain::document::DocumentKind;
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateDocumentForm {
    pub kind: String,
    /// Extra guidance appended to the prompt.
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub instructions: Option<String>,
}

pub struct GenerateDocumentPayload {
    pub kind: DocumentKind,
    pub instructions: Option<String>,
}

impl TryFrom<GenerateDocumentForm> for GenerateDocumentPayload {
    type Error = FormError;

    fn try_from(form: GenerateDocumentForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let kind = form
            .kind
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidValue(format!("unknown document kind: {}", form.kind)))?;
        Ok(Self {
            kind,
            instructions: non_blank(form.instructions),
        })
    }
}
