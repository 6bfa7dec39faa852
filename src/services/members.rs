//! Organization staff and claim assignment.

use crate::SERVICE_ACCESS_ROLE;
use crate::SERVICE_ADMIN_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::member::{Member, NewMember};
use crate::domain::types::{ClaimId, MemberEmail, MemberName, OrgId, Title};
use crate::forms::members::{AddMemberForm, AddMemberPayload, AssignMembersForm, AssignMembersPayload};
use crate::integrations::mailer::Mailer;
use crate::repository::{ClaimReader, MemberReader, MemberWriter, NotificationWriter};
use crate::services::notifications::notify_members;
use crate::services::{ServiceError, ServiceResult};

/// Resolves the member record of the caller, creating it on first use.
pub fn current_member<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Member>
where
    R: MemberReader + MemberWriter + ?Sized,
{
    let org_id = OrgId::new(user.org_id)?;
    let email = MemberEmail::new(user.email.clone())?;

    if let Some(member) = repo.get_member_by_email(&email, org_id)? {
        return Ok(member);
    }

    let member = repo.create_or_update_member(&NewMember::new(
        org_id,
        MemberName::new(user.name.clone())?,
        email,
        true,
    ))?;
    Ok(member)
}

pub fn list_members<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Member>>
where
    R: MemberReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    Ok(repo.list_members(org_id)?)
}

/// Validates the incoming form and persists the member.
pub fn add_member<R>(repo: &R, user: &AuthenticatedUser, form: AddMemberForm) -> ServiceResult<Member>
where
    R: MemberWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let payload = AddMemberPayload::try_from(form)?;

    let org_id = OrgId::new(user.org_id)?;

    let member = repo
        .create_or_update_member(&payload.into_domain(org_id))
        .map_err(|err| {
            log::error!("Failed to add member: {err}");
            err
        })?;

    Ok(member)
}

pub fn list_assignees<R>(
    repo: &R,
    user: &AuthenticatedUser,
    claim_id: i32,
) -> ServiceResult<Vec<Member>>
where
    R: ClaimReader + MemberReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let claim_id = ClaimId::new(claim_id)?;

    if repo.get_claim_by_id(claim_id, org_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    Ok(repo.list_claim_assignees(claim_id, org_id)?)
}

/// Replaces the assignees of a claim and notifies the newly assigned members.
pub fn assign_members<R>(
    repo: &R,
    mailer: &dyn Mailer,
    user: &AuthenticatedUser,
    claim_id: i32,
    form: AssignMembersForm,
) -> ServiceResult<Vec<Member>>
where
    R: ClaimReader + MemberReader + MemberWriter + NotificationWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let payload = AssignMembersPayload::try_from(form)?;

    let org_id = OrgId::new(user.org_id)?;
    let claim_id = ClaimId::new(claim_id)?;

    let claim = repo
        .get_claim_by_id(claim_id, org_id)?
        .ok_or(ServiceError::NotFound)?;

    let mut members = Vec::with_capacity(payload.member_ids.len());
    for member_id in &payload.member_ids {
        match repo.get_member_by_id(*member_id, org_id)? {
            Some(member) => members.push(member),
            None => {
                return Err(ServiceError::Form(format!("unknown member {member_id}")));
            }
        }
    }

    let previous = repo.list_claim_assignees(claim_id, org_id)?;

    repo.assign_members_to_claim(claim_id, org_id, &payload.member_ids)
        .map_err(|err| {
            log::error!("Failed to assign members to claim {claim_id}: {err}");
            err
        })?;

    let added: Vec<Member> = members
        .iter()
        .filter(|member| !previous.iter().any(|p| p.id == member.id))
        .cloned()
        .collect();
    if !added.is_empty() {
        let title = Title::new(format!("Assigned to claim {}", claim.claim_number))?;
        let body = format!("{} ({})", claim.carrier, claim.status);
        let link = format!("/claims/{claim_id}");
        notify_members(repo, mailer, org_id, &added, &title, &body, Some(&link));
    }

    Ok(members)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::claim::ClaimStatus;
    use crate::domain::notification::Notification;
    use crate::domain::types::NotificationId;
    use crate::integrations::mailer::test_support::RecordingMailer;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        ORG, admin_user, sample_claim, sample_member, ts, viewer_user,
    };

    #[test]
    fn current_member_is_created_on_first_use() {
        let mut repo = MockRepository::new();
        repo.expect_get_member_by_email()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_create_or_update_member()
            .withf(|member| member.is_user && member.email.as_str() == "viewer@example.com")
            .times(1)
            .returning(|_| Ok(sample_member(9, "viewer@example.com")));

        let member = current_member(&repo, &viewer_user()).unwrap();
        assert_eq!(member.id.get(), 9);
    }

    #[test]
    fn add_member_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_create_or_update_member().times(0);

        let result = add_member(
            &repo,
            &viewer_user(),
            AddMemberForm {
                name: "Dana".into(),
                email: "dana@example.com".into(),
            },
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn add_member_stores_non_user_member() {
        let mut repo = MockRepository::new();
        repo.expect_create_or_update_member()
            .withf(|member| {
                member.org_id.get() == ORG && !member.is_user && member.name.as_str() == "Dana"
            })
            .times(1)
            .returning(|_| Ok(sample_member(4, "dana@example.com")));

        let member = add_member(
            &repo,
            &admin_user(),
            AddMemberForm {
                name: "Dana".into(),
                email: "Dana@Example.com".into(),
            },
        )
        .unwrap();
        assert_eq!(member.id.get(), 4);
    }

    #[test]
    fn assign_members_notifies_only_new_assignees() {
        let mut repo = MockRepository::new();
        repo.expect_get_claim_by_id()
            .times(1)
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Filed))));
        repo.expect_get_member_by_id()
            .times(2)
            .returning(|id, _| Ok(Some(sample_member(id.get(), &format!("m{}@example.com", id.get())))));
        repo.expect_list_claim_assignees()
            .times(1)
            .returning(|_, _| Ok(vec![sample_member(1, "m1@example.com")]));
        repo.expect_assign_members_to_claim()
            .withf(|claim_id, _, ids| claim_id.get() == 7 && ids.len() == 2)
            .times(1)
            .returning(|_, _, ids| Ok(ids.len()));
        repo.expect_create_notification()
            .withf(|n| n.member_id.get() == 2 && n.title.as_str() == "Assigned to claim CLM-7")
            .times(1)
            .returning(|n| {
                Ok(Notification {
                    id: NotificationId::new(1).unwrap(),
                    org_id: n.org_id,
                    member_id: n.member_id,
                    title: n.title.clone(),
                    body: n.body.clone(),
                    link: n.link.clone(),
                    read_at: None,
                    created_at: ts(9),
                })
            });
        let mailer = RecordingMailer::default();

        let members = assign_members(
            &repo,
            &mailer,
            &admin_user(),
            7,
            AssignMembersForm {
                member_ids: vec![2, 1],
            },
        )
        .unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(
            mailer.sent.borrow().as_slice(),
            &[(
                "m2@example.com".to_string(),
                "Assigned to claim CLM-7".to_string()
            )]
        );
    }

    #[test]
    fn assign_members_rejects_foreign_member() {
        let mut repo = MockRepository::new();
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::New))));
        repo.expect_get_member_by_id().returning(|_, _| Ok(None));
        repo.expect_assign_members_to_claim().times(0);
        let mailer = RecordingMailer::default();

        let result = assign_members(
            &repo,
            &mailer,
            &admin_user(),
            7,
            AssignMembersForm {
                member_ids: vec![55],
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
