//! Session and branding payloads.

use serde::Deserialize;
use validator::Validate;

use crate::domain::organization::UpdateBranding;
use crate::domain::types::{ContactEmail, HexColor, OrgName, PhoneNumber, WebUrl};
use crate::forms::{FormError, non_blank, parse_optional};

/// Token handed over by the identity provider after sign-in.
#[derive(Debug, Deserialize, Validate)]
pub struct SessionForm {
    #[validate(length(min = 1))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BrandingForm {
    #[validate(length(min = 1, max = 120))]
    pub company_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl TryFrom<BrandingForm> for UpdateBranding {
    type Error = FormError;

    fn try_from(form: BrandingForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(UpdateBranding {
            company_name: OrgName::new(form.company_name).map_err(|_| FormError::InvalidName)?,
            logo_url: parse_optional(form.logo_url, WebUrl::new)?,
            primary_color: parse_optional(form.primary_color, HexColor::new)?
                .unwrap_or_else(HexColor::default_primary),
            accent_color: parse_optional(form.accent_color, HexColor::new)?
                .unwrap_or_else(HexColor::default_accent),
            license_number: non_blank(form.license_number),
            phone: parse_optional(form.phone, PhoneNumber::new)?,
            email: parse_optional(form.email, ContactEmail::new)?,
            website: parse_optional(form.website, WebUrl::new)?,
        })
    }
}
