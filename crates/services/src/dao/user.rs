use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use wrenchly_db::models::{User, UserRole};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    /// Upsert the local mirror of an identity-provider account.
    ///
    /// `role` is only written when the provider event carried one; an
    /// upsert without a role never downgrades an existing record.
    pub async fn upsert_from_clerk(
        &self,
        clerk_user_id: &str,
        email: &str,
        first_name: Option<String>,
        last_name: Option<String>,
        avatar_url: Option<String>,
        role: Option<UserRole>,
    ) -> DaoResult<User> {
        if let Some(existing) = self
            .base
            .find_one(doc! { "clerk_user_id": clerk_user_id })
            .await?
        {
            let mut set = doc! {
                "email": email,
                "first_name": first_name.clone(),
                "last_name": last_name.clone(),
                "avatar_url": avatar_url.clone(),
                // Deletion events are terminal upstream; an update event
                // for a known id means the account is live again.
                "deleted_at": null,
            };
            if let Some(role) = role {
                set.insert("role", role.as_str());
            }
            let id = existing.id.ok_or(DaoError::NotFound)?;
            self.base.update_by_id(id, doc! { "$set": set }).await?;
            return self.base.find_by_id(id).await;
        }

        let now = DateTime::now();
        let user = User {
            id: None,
            clerk_user_id: clerk_user_id.to_string(),
            email: email.to_string(),
            first_name,
            last_name,
            role: role.unwrap_or_default(),
            avatar_url,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_clerk_id(&self, clerk_user_id: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "clerk_user_id": clerk_user_id, "deleted_at": null })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email, "deleted_at": null })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn set_role(&self, user_id: ObjectId, role: UserRole) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "role": role.as_str() } })
            .await
    }

    /// Soft-delete on a provider deletion event.
    pub async fn mark_deleted(&self, clerk_user_id: &str) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "clerk_user_id": clerk_user_id },
                doc! { "$set": { "deleted_at": DateTime::now() } },
            )
            .await
    }
}
