//! Diesel models for organization members and claim assignments.

use diesel::prelude::*;

use crate::domain::member::{
    ClaimAssignment as DomainClaimAssignment, Member as DomainMember, NewMember as DomainNewMember,
};
use crate::domain::types::{ClaimId, MemberEmail, MemberId, MemberName, OrgId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Member {
    pub id: i32,
    pub org_id: i32,
    pub name: String,
    pub email: String,
    pub is_user: bool,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::members)]
pub struct NewMember<'a> {
    pub org_id: i32,
    pub name: &'a str,
    pub email: &'a str,
    pub is_user: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::claim_assignments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ClaimAssignment {
    pub claim_id: i32,
    pub member_id: i32,
}

impl TryFrom<Member> for DomainMember {
    type Error = TypeConstraintError;

    fn try_from(member: Member) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MemberId::new(member.id)?,
            org_id: OrgId::new(member.org_id)?,
            name: MemberName::new(member.name)?,
            email: MemberEmail::new(member.email)?,
            is_user: member.is_user,
        })
    }
}

impl<'a> From<&'a DomainNewMember> for NewMember<'a> {
    fn from(member: &'a DomainNewMember) -> Self {
        Self {
            org_id: member.org_id.get(),
            name: member.name.as_str(),
            email: member.email.as_str(),
            is_user: member.is_user,
        }
    }
}

impl TryFrom<ClaimAssignment> for DomainClaimAssignment {
    type Error = TypeConstraintError;

    fn try_from(row: ClaimAssignment) -> Result<Self, Self::Error> {
        Ok(Self {
            claim_id: ClaimId::new(row.claim_id)?,
            member_id: MemberId::new(row.member_id)?,
        })
    }
}
