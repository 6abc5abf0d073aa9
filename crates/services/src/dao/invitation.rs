use bson::{doc, oid::ObjectId, DateTime};
use chrono::{Duration, Utc};
use mongodb::Database;
use wrenchly_db::models::{InvitationStatus, MemberRole, ShopInvitation};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct InvitationDao {
    pub base: BaseDao<ShopInvitation>,
}

impl InvitationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ShopInvitation::COLLECTION),
        }
    }

    /// Insert a pending invitation after checking the one-pending-per-
    /// (shop, email) invariant.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        shop_id: ObjectId,
        inviter_id: ObjectId,
        email: &str,
        role: MemberRole,
        token: &str,
        mechanic_id: Option<ObjectId>,
        clerk_invitation_id: Option<String>,
    ) -> DaoResult<ShopInvitation> {
        if self.find_pending(shop_id, email).await?.is_some() {
            return Err(DaoError::Conflict(format!(
                "A pending invitation for {email} already exists"
            )));
        }

        let now = DateTime::now();
        let expires_at = DateTime::from_chrono(
            Utc::now() + Duration::days(ShopInvitation::TTL_DAYS),
        );

        let invitation = ShopInvitation {
            id: None,
            shop_id,
            inviter_id,
            email: email.to_string(),
            role,
            token: token.to_string(),
            mechanic_id,
            clerk_invitation_id,
            status: InvitationStatus::Pending,
            created_at: now,
            expires_at,
            accepted_at: None,
            revoked_at: None,
        };

        let id = self.base.insert_one(&invitation).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_token(&self, token: &str) -> DaoResult<Option<ShopInvitation>> {
        self.base.find_one(doc! { "token": token }).await
    }

    pub async fn find_by_clerk_invitation_id(
        &self,
        clerk_invitation_id: &str,
    ) -> DaoResult<Option<ShopInvitation>> {
        self.base
            .find_one(doc! { "clerk_invitation_id": clerk_invitation_id })
            .await
    }

    /// Pending invitation for (shop, email), regardless of expiry; expiry
    /// is the acceptance path's concern.
    pub async fn find_pending(
        &self,
        shop_id: ObjectId,
        email: &str,
    ) -> DaoResult<Option<ShopInvitation>> {
        self.base
            .find_one(doc! { "shop_id": shop_id, "email": email, "status": "pending" })
            .await
    }

    /// Most recent pending, unexpired invitation for an email across all
    /// shops. Email is the weakest correlation key, used only when the
    /// acceptance signal carries no token.
    pub async fn find_pending_by_email(&self, email: &str) -> DaoResult<Option<ShopInvitation>> {
        let candidates = self
            .base
            .find_many(
                doc! { "email": email, "status": "pending" },
                Some(doc! { "created_at": -1 }),
            )
            .await?;

        let now = DateTime::now();
        Ok(candidates.into_iter().find(|i| !i.is_expired_at(now)))
    }

    pub async fn list_by_shop(&self, shop_id: ObjectId) -> DaoResult<Vec<ShopInvitation>> {
        self.base
            .find_many(
                doc! { "shop_id": shop_id },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    pub async fn count_pending(&self, shop_id: ObjectId) -> DaoResult<u64> {
        self.base
            .count(doc! { "shop_id": shop_id, "status": "pending" })
            .await
    }

    /// Transition to accepted only from pending; a concurrent accept that
    /// got there first leaves nothing to do.
    pub async fn mark_accepted(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": id, "status": "pending" },
                doc! { "$set": { "status": "accepted", "accepted_at": DateTime::now() } },
            )
            .await
    }

    pub async fn mark_revoked(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": id, "status": "pending" },
                doc! { "$set": { "status": "revoked", "revoked_at": DateTime::now() } },
            )
            .await
    }

    /// Persist lazily-detected expiry so listings stop showing the
    /// invitation as pending.
    pub async fn mark_expired(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": id, "status": "pending" },
                doc! { "$set": { "status": "expired" } },
            )
            .await
    }
}
