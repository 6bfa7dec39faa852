//! Sessions, the caller's organization and its branding.

use crate::SERVICE_ACCESS_ROLE;
use crate::SERVICE_ADMIN_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::member::NewMember;
use crate::domain::organization::{Branding, NewOrganization, UpdateBranding};
use crate::domain::types::{MemberEmail, MemberName, OrgId, OrgName};
use crate::dto::organizations::{OrgOverview, SessionData};
use crate::forms::organizations::{BrandingForm, SessionForm};
use crate::repository::{MemberWriter, OrganizationReader, OrganizationWriter};
use crate::services::{ServiceError, ServiceResult};

/// Validates the identity provider token and provisions the tenant and member.
///
/// Returns the decoded user so the route can persist the token in the identity
/// cookie.
pub fn start_session<R>(
    repo: &R,
    secret: &str,
    form: SessionForm,
) -> ServiceResult<(AuthenticatedUser, SessionData)>
where
    R: OrganizationWriter + MemberWriter + ?Sized,
{
    let user = AuthenticatedUser::from_jwt(form.token.trim(), secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        ServiceError::Unauthorized
    })?;

    ensure_role(&user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let org_name = user
        .org_name
        .clone()
        .and_then(|name| OrgName::new(name).ok())
        .map_or_else(|| OrgName::new(format!("Organization {org_id}")), Ok)?;

    let organization = repo
        .ensure_organization(&NewOrganization::new(org_id, org_name))
        .map_err(|err| {
            log::error!("Failed to provision organization {org_id}: {err}");
            err
        })?;

    let member = repo.create_or_update_member(&NewMember::new(
        org_id,
        MemberName::new(user.name.clone())?,
        MemberEmail::new(user.email.clone())?,
        true,
    ))?;

    Ok((user, SessionData { organization, member }))
}

/// Loads the caller's organization with its billing state and branding.
pub fn get_organization<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<OrgOverview>
where
    R: OrganizationReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    let organization = repo
        .get_organization(org_id)?
        .ok_or(ServiceError::NotFound)?;
    let branding = repo
        .get_branding(org_id)?
        .unwrap_or_else(|| Branding::fallback(&organization));

    Ok(OrgOverview {
        entitled: organization.subscription_status.is_entitled(),
        organization,
        branding,
    })
}

pub fn get_branding<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Branding>
where
    R: OrganizationReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    if let Some(branding) = repo.get_branding(org_id)? {
        return Ok(branding);
    }

    let organization = repo
        .get_organization(org_id)?
        .ok_or(ServiceError::NotFound)?;
    Ok(Branding::fallback(&organization))
}

pub fn update_branding<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: BrandingForm,
) -> ServiceResult<Branding>
where
    R: OrganizationReader + OrganizationWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let update = UpdateBranding::try_from(form)?;

    if repo.get_organization(org_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    let branding = repo.upsert_branding(org_id, &update).map_err(|err| {
        log::error!("Failed to update branding for {org_id}: {err}");
        err
    })?;

    Ok(branding)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::organization::SubscriptionStatus;
    use crate::domain::types::HexColor;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        ORG, admin_user, sample_member, sample_organization, viewer_user,
    };

    const SECRET: &str = "session-secret";

    fn branding_form() -> BrandingForm {
        BrandingForm {
            company_name: "Summit Roofing".to_string(),
            logo_url: None,
            primary_color: Some("#102030".to_string()),
            accent_color: None,
            license_number: Some("TX-1234".to_string()),
            phone: None,
            email: None,
            website: None,
        }
    }

    #[test]
    fn start_session_provisions_org_and_member() {
        let mut user = viewer_user();
        user.exp = (chrono::Utc::now().timestamp() + 600) as usize;
        user.org_name = Some("Summit Roofing".to_string());
        let token = user.to_jwt(SECRET).unwrap();

        let mut repo = MockRepository::new();
        repo.expect_ensure_organization()
            .withf(|org| org.id.get() == ORG && org.name.as_str() == "Summit Roofing")
            .times(1)
            .returning(|_| Ok(sample_organization()));
        repo.expect_create_or_update_member()
            .withf(|member| member.is_user && member.email.as_str() == "viewer@example.com")
            .times(1)
            .returning(|_| Ok(sample_member(2, "viewer@example.com")));

        let (decoded, session) =
            start_session(&repo, SECRET, SessionForm { token }).expect("session");
        assert_eq!(decoded.email, "viewer@example.com");
        assert_eq!(session.member.id.get(), 2);
    }

    #[test]
    fn start_session_rejects_bad_token() {
        let mut repo = MockRepository::new();
        repo.expect_ensure_organization().times(0);

        let result = start_session(
            &repo,
            SECRET,
            SessionForm {
                token: "not-a-jwt".to_string(),
            },
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn organization_falls_back_to_default_branding() {
        let mut repo = MockRepository::new();
        repo.expect_get_organization()
            .times(1)
            .returning(|_| Ok(Some(sample_organization())));
        repo.expect_get_branding().times(1).returning(|_| Ok(None));

        let overview = get_organization(&repo, &viewer_user()).unwrap();
        assert!(overview.entitled);
        assert_eq!(overview.organization.subscription_status, SubscriptionStatus::Trialing);
        assert_eq!(overview.branding.company_name.as_str(), "Summit Roofing");
        assert_eq!(overview.branding.primary_color, HexColor::default_primary());
    }

    #[test]
    fn update_branding_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_branding().times(0);

        let result = update_branding(&repo, &viewer_user(), branding_form());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn update_branding_stores_values() {
        let mut repo = MockRepository::new();
        repo.expect_get_organization()
            .times(1)
            .returning(|_| Ok(Some(sample_organization())));
        repo.expect_upsert_branding()
            .withf(|org_id, update| {
                org_id.get() == ORG
                    && update.primary_color.as_str() == "#102030"
                    && update.license_number.as_deref() == Some("TX-1234")
            })
            .times(1)
            .returning(|org_id, update| {
                let mut branding = Branding::fallback(&sample_organization());
                branding.org_id = org_id;
                branding.primary_color = update.primary_color.clone();
                Ok(branding)
            });

        let branding = update_branding(&repo, &admin_user(), branding_form()).unwrap();
        assert_eq!(branding.primary_color.as_str(), "#102030");
    }
}
