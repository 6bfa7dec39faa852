use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{MemberId, NotificationId, OrgId, Title};

/// In-app message addressed to a single member.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub org_id: OrgId,
    pub member_id: MemberId,
    pub title: Title,
    pub body: String,
    pub link: Option<String>,
    pub read_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewNotification {
    pub org_id: OrgId,
    pub member_id: MemberId,
    pub title: Title,
    pub body: String,
    pub link: Option<String>,
}
