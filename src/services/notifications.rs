//! In-app notifications for the signed-in member.

use crate::SERVICE_ACCESS_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::member::Member;
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::types::{NotificationId, OrgId, Title};
use crate::integrations::mailer::Mailer;
use crate::repository::{
    MemberReader, MemberWriter, NotificationListQuery, NotificationReader, NotificationWriter,
};
use crate::services::ServiceResult;
use crate::services::members::current_member;

/// Creates a notification for each member and emails a copy.
///
/// Failures are logged; notifying never fails the triggering operation.
pub(crate) fn notify_members<R>(
    repo: &R,
    mailer: &dyn Mailer,
    org_id: OrgId,
    recipients: &[Member],
    title: &Title,
    body: &str,
    link: Option<&str>,
) where
    R: NotificationWriter + ?Sized,
{
    for member in recipients {
        let new_notification = NewNotification {
            org_id,
            member_id: member.id,
            title: title.clone(),
            body: body.to_string(),
            link: link.map(str::to_string),
        };
        match repo.create_notification(&new_notification) {
            Ok(notification) => mailer.send_notification(member, &notification),
            Err(err) => {
                log::error!("Failed to notify member {}: {err}", member.id);
            }
        }
    }
}

pub fn list_notifications<R>(
    repo: &R,
    user: &AuthenticatedUser,
    unread_only: bool,
) -> ServiceResult<Vec<Notification>>
where
    R: MemberReader + MemberWriter + NotificationReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let member = current_member(repo, user)?;

    Ok(repo.list_notifications(NotificationListQuery {
        org_id,
        member_id: member.id,
        unread_only,
    })?)
}

pub fn mark_read<R>(
    repo: &R,
    user: &AuthenticatedUser,
    notification_id: i32,
) -> ServiceResult<Notification>
where
    R: MemberReader + MemberWriter + NotificationWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let notification_id = NotificationId::new(notification_id)?;
    let member = current_member(repo, user)?;

    Ok(repo.mark_notification_read(notification_id, org_id, member.id)?)
}

/// Marks every unread notification of the caller as read, returning the count.
pub fn mark_all_read<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<usize>
where
    R: MemberReader + MemberWriter + NotificationWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let member = current_member(repo, user)?;

    Ok(repo.mark_all_notifications_read(org_id, member.id)?)
}
