use serde::{Deserialize, Serialize};

use crate::domain::types::{ClaimId, MemberEmail, MemberId, MemberName, OrgId, TypeConstraintError};

/// Staff member of an organization (estimator, project manager, office).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: MemberId,
    pub org_id: OrgId,
    pub name: MemberName,
    pub email: MemberEmail,
    /// Whether the member has signed in at least once.
    pub is_user: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewMember {
    pub org_id: OrgId,
    pub name: MemberName,
    pub email: MemberEmail,
    pub is_user: bool,
}

impl NewMember {
    #[must_use]
    pub fn new(org_id: OrgId, name: MemberName, email: MemberEmail, is_user: bool) -> Self {
        Self {
            org_id,
            name,
            email,
            is_user,
        }
    }

    /// Validates raw values before building the payload.
    pub fn try_new(
        org_id: i32,
        name: impl Into<String>,
        email: impl Into<String>,
        is_user: bool,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self::new(
            OrgId::new(org_id)?,
            MemberName::new(name)?,
            MemberEmail::new(email)?,
            is_user,
        ))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClaimAssignment {
    pub claim_id: ClaimId,
    pub member_id: MemberId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_validates_fields() {
        let member = NewMember::try_new(3, " Dana ", "Dana@Roofing.COM", true).expect("valid");
        assert_eq!(member.name.as_str(), "Dana");
        assert_eq!(member.email.as_str(), "dana@roofing.com");

        assert!(NewMember::try_new(0, "Dana", "dana@roofing.com", true).is_err());
        assert!(NewMember::try_new(3, " ", "dana@roofing.com", true).is_err());
    }
}
