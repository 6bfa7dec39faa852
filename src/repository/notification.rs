use diesel::prelude::*;

use crate::domain::notification::{NewNotification, Notification};
use crate::domain::types::{MemberId, NotificationId, OrgId};
use crate::models::notification::{
    NewNotification as DbNewNotification, Notification as DbNotification,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    DieselRepository, NotificationListQuery, NotificationReader, NotificationWriter,
};
use crate::schema::notifications;

/// Upper bound on notifications returned in a single listing.
const MAX_LISTED: i64 = 100;

impl NotificationReader for DieselRepository {
    fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> RepositoryResult<Vec<Notification>> {
        let mut conn = self.conn()?;

        let mut items = notifications::table
            .filter(notifications::org_id.eq(query.org_id.get()))
            .filter(notifications::member_id.eq(query.member_id.get()))
            .into_boxed();

        if query.unread_only {
            items = items.filter(notifications::read_at.is_null());
        }

        let rows = items
            .order(notifications::created_at.desc())
            .limit(MAX_LISTED)
            .select(DbNotification::as_select())
            .load::<DbNotification>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl NotificationWriter for DieselRepository {
    fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> RepositoryResult<Notification> {
        let mut conn = self.conn()?;

        let stored = diesel::insert_into(notifications::table)
            .values(DbNewNotification::from(notification))
            .returning(DbNotification::as_returning())
            .get_result::<DbNotification>(&mut conn)?;

        Ok(stored.try_into()?)
    }

    fn mark_notification_read(
        &self,
        id: NotificationId,
        org_id: OrgId,
        member_id: MemberId,
    ) -> RepositoryResult<Notification> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id.get()))
                .filter(notifications::org_id.eq(org_id.get()))
                .filter(notifications::member_id.eq(member_id.get())),
        )
        .set(notifications::read_at.eq(Some(chrono::Utc::now().naive_utc())))
        .returning(DbNotification::as_returning())
        .get_result::<DbNotification>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn mark_all_notifications_read(
        &self,
        org_id: OrgId,
        member_id: MemberId,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let affected = diesel::update(
            notifications::table
                .filter(notifications::org_id.eq(org_id.get()))
                .filter(notifications::member_id.eq(member_id.get()))
                .filter(notifications::read_at.is_null()),
        )
        .set(notifications::read_at.eq(Some(chrono::Utc::now().naive_utc())))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
