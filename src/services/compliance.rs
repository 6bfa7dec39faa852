//! Building-code lookups for a state or a claim's property.

use crate::SERVICE_ACCESS_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::compliance::{self, ComplianceReport};
use crate::domain::types::{ClaimId, StateCode};
use crate::repository::{ClaimReader, PropertyReader};
use crate::services::claims::load_visible_claim;
use crate::services::{ServiceError, ServiceResult};

pub fn check_state(user: &AuthenticatedUser, state: &str) -> ServiceResult<ComplianceReport> {
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let state = StateCode::new(state).map_err(|_| ServiceError::NotFound)?;

    compliance::check(&state).ok_or(ServiceError::NotFound)
}

/// Report for the state the claim's property is located in.
pub fn check_claim<R>(
    repo: &R,
    user: &AuthenticatedUser,
    claim_id: i32,
) -> ServiceResult<ComplianceReport>
where
    R: ClaimReader + PropertyReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let claim = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;
    let property_id = claim.property_id.ok_or(ServiceError::NotFound)?;
    let property = repo
        .get_property_by_id(property_id, claim.org_id)?
        .ok_or(ServiceError::NotFound)?;

    compliance::check(&property.state).ok_or(ServiceError::NotFound)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::claim::ClaimStatus;
    use crate::domain::compliance::WindZone;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{sample_claim, sample_property, viewer_user};

    #[test]
    fn state_lookup_is_case_insensitive() {
        let report = check_state(&viewer_user(), "fl").unwrap();
        assert_eq!(report.profile.state, "FL");
        assert_eq!(report.profile.wind_zone, WindZone::Hurricane);
    }

    #[test]
    fn unknown_state_is_not_found() {
        assert!(matches!(
            check_state(&viewer_user(), "ZZ"),
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            check_state(&viewer_user(), "Texas"),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn claim_check_uses_property_state() {
        let mut repo = MockRepository::new();
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Inspected))));
        repo.expect_get_property_by_id()
            .withf(|id, _| id.get() == 1)
            .times(1)
            .returning(|id, _| Ok(Some(sample_property(id.get(), 1, "CO"))));

        let report = check_claim(&repo, &viewer_user(), 5).unwrap();
        assert_eq!(report.profile.state, "CO");
        assert!(report.profile.ice_barrier_required);
    }

    #[test]
    fn claim_without_property_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_claim_by_id().returning(|id, _| {
            let mut claim = sample_claim(id.get(), ClaimStatus::New);
            claim.property_id = None;
            Ok(Some(claim))
        });
        repo.expect_get_property_by_id().times(0);

        assert!(matches!(
            check_claim(&repo, &viewer_user(), 5),
            Err(ServiceError::NotFound)
        ));
    }
}
