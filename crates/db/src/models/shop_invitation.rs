use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::shop_user::MemberRole;

/// A pending team invitation.
///
/// The opaque `token` is the durable correlation key between this record
/// and the identity provider's invitation object: it is embedded in the
/// provider invitation metadata at issue time, so any later acceptance
/// signal can find this record without relying on provider ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopInvitation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub shop_id: ObjectId,
    pub inviter_id: ObjectId,
    pub email: String,
    #[serde(default)]
    pub role: MemberRole,
    pub token: String,
    /// Mechanic profile created or linked at invite time, if any.
    pub mechanic_id: Option<ObjectId>,
    /// Provider invitation id. Absent when the invitee already had an
    /// account (no provider invitation is created for those).
    pub clerk_invitation_id: Option<String>,
    #[serde(default)]
    pub status: InvitationStatus,
    pub created_at: DateTime,
    pub expires_at: DateTime,
    pub accepted_at: Option<DateTime>,
    pub revoked_at: Option<DateTime>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Revoked,
    Expired,
}

impl ShopInvitation {
    pub const COLLECTION: &'static str = "shop_invitations";

    /// Invitation TTL. Expiry is evaluated lazily at read time; there is
    /// no background sweep.
    pub const TTL_DAYS: i64 = 7;

    /// Whether a stored-pending invitation has passed its deadline at `now`.
    pub fn is_expired_at(&self, now: DateTime) -> bool {
        self.status == InvitationStatus::Pending && now > self.expires_at
    }
}
