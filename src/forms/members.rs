use serde::Deserialize;
use validator::Validate;

use crate::domain::member::NewMember;
use crate::domain::types::{MemberEmail, MemberId, MemberName, OrgId};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

pub struct AddMemberPayload {
    pub name: MemberName,
    pub email: MemberEmail,
}

impl TryFrom<AddMemberForm> for AddMemberPayload {
    type Error = FormError;

    fn try_from(form: AddMemberForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: MemberName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: MemberEmail::new(form.email).map_err(|_| FormError::InvalidEmail)?,
        })
    }
}

impl AddMemberPayload {
    pub fn into_domain(self, org_id: OrgId) -> NewMember {
        NewMember::new(org_id, self.name, self.email, false)
    }
}

/// Full replacement of a claim's assignee set.
#[derive(Debug, Deserialize)]
pub struct AssignMembersForm {
    #[serde(default)]
    pub member_ids: Vec<i32>,
}

pub struct AssignMembersPayload {
    pub member_ids: Vec<MemberId>,
}

impl TryFrom<AssignMembersForm> for AssignMembersPayload {
    type Error = FormError;

    fn try_from(form: AssignMembersForm) -> Result<Self, Self::Error> {
        let mut ids = form.member_ids;
        ids.sort_unstable();
        ids.dedup();
        let member_ids = ids
            .into_iter()
            .map(|id| MemberId::new(id).map_err(|_| FormError::InvalidId))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { member_ids })
    }
}
