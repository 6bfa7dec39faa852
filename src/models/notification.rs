use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::notification::{
    NewNotification as DomainNewNotification, Notification as DomainNotification,
};
use crate::domain::types::{MemberId, NotificationId, OrgId, Title, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Notification {
    pub id: i32,
    pub org_id: i32,
    pub member_id: i32,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub read_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NewNotification<'a> {
    pub org_id: i32,
    pub member_id: i32,
    pub title: &'a str,
    pub body: &'a str,
    pub link: Option<&'a str>,
}

impl TryFrom<Notification> for DomainNotification {
    type Error = TypeConstraintError;

    fn try_from(row: Notification) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NotificationId::new(row.id)?,
            org_id: OrgId::new(row.org_id)?,
            member_id: MemberId::new(row.member_id)?,
            title: Title::new(row.title)?,
            body: row.body,
            link: row.link,
            read_at: row.read_at,
            created_at: row.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewNotification> for NewNotification<'a> {
    fn from(notification: &'a DomainNewNotification) -> Self {
        Self {
            org_id: notification.org_id.get(),
            member_id: notification.member_id.get(),
            title: notification.title.as_str(),
            body: &notification.body,
            link: notification.link.as_deref(),
        }
    }
}
