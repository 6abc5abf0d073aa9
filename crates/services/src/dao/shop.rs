use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use wrenchly_db::models::{MemberRole, Shop, ShopAddress, ShopUser, User};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ShopDao {
    pub base: BaseDao<Shop>,
    pub members: BaseDao<ShopUser>,
    users: BaseDao<User>,
}

pub struct NewShop {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub address: ShopAddress,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ShopDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Shop::COLLECTION),
            members: BaseDao::new(db, ShopUser::COLLECTION),
            users: BaseDao::new(db, User::COLLECTION),
        }
    }

    /// Create a shop and seed its owner membership.
    ///
    /// The slug is checked for uniqueness before insert and is immutable
    /// afterwards; `update_profile` never touches it.
    pub async fn create(&self, new: NewShop, owner_id: ObjectId) -> DaoResult<Shop> {
        if self
            .base
            .find_one(doc! { "slug": &new.slug, "deleted_at": null })
            .await?
            .is_some()
        {
            return Err(DaoError::Conflict(format!(
                "A shop with the slug \"{}\" already exists",
                new.slug
            )));
        }

        let now = DateTime::now();
        let shop = Shop {
            id: None,
            name: new.name,
            slug: new.slug,
            description: new.description,
            address: new.address,
            phone: new.phone,
            email: new.email,
            owner_id,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let shop_id = self.base.insert_one(&shop).await?;

        self.add_member(shop_id, owner_id, MemberRole::Owner, None, None)
            .await?;

        self.base.find_by_id(shop_id).await
    }

    pub async fn find_by_slug(&self, slug: &str) -> DaoResult<Shop> {
        self.base
            .find_one(doc! { "slug": slug, "deleted_at": null })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_user_shops(&self, user_id: ObjectId) -> DaoResult<Vec<Shop>> {
        let memberships = self
            .members
            .find_many(doc! { "user_id": user_id, "is_active": true }, None)
            .await?;

        let shop_ids: Vec<ObjectId> = memberships.iter().map(|m| m.shop_id).collect();

        if shop_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.base
            .find_many(
                doc! { "_id": { "$in": shop_ids }, "deleted_at": null },
                Some(doc! { "name": 1 }),
            )
            .await
    }

    /// Active membership for (shop, user), if any.
    pub async fn find_membership(
        &self,
        shop_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<ShopUser>> {
        self.members
            .find_one(doc! { "shop_id": shop_id, "user_id": user_id, "is_active": true })
            .await
    }

    pub async fn is_member(&self, shop_id: ObjectId, user_id: ObjectId) -> DaoResult<bool> {
        Ok(self.find_membership(shop_id, user_id).await?.is_some())
    }

    /// Insert a membership unless an active one already exists.
    ///
    /// The existence check (not a unique-constraint failure) is what makes
    /// redundant acceptance calls safe.
    pub async fn add_member(
        &self,
        shop_id: ObjectId,
        user_id: ObjectId,
        role: MemberRole,
        mechanic_id: Option<ObjectId>,
        invited_at: Option<DateTime>,
    ) -> DaoResult<ShopUser> {
        if let Some(existing) = self.find_membership(shop_id, user_id).await? {
            return Ok(existing);
        }

        let now = DateTime::now();
        let member = ShopUser {
            id: None,
            shop_id,
            user_id,
            role,
            mechanic_id,
            is_active: true,
            invited_at,
            accepted_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let id = self.members.insert_one(&member).await?;
        self.members.find_by_id(id).await
    }

    /// Members of a shop joined with their user records, membership
    /// creation order.
    pub async fn get_team_members(&self, shop_id: ObjectId) -> DaoResult<Vec<(ShopUser, User)>> {
        let memberships = self
            .members
            .find_many(
                doc! { "shop_id": shop_id, "is_active": true },
                Some(doc! { "created_at": 1 }),
            )
            .await?;

        let user_ids: Vec<ObjectId> = memberships.iter().map(|m| m.user_id).collect();
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = self
            .users
            .find_many(doc! { "_id": { "$in": user_ids } }, None)
            .await?;

        let joined = memberships
            .into_iter()
            .filter_map(|m| {
                users
                    .iter()
                    .find(|u| u.id == Some(m.user_id))
                    .cloned()
                    .map(|u| (m, u))
            })
            .collect();

        Ok(joined)
    }

    pub async fn update_profile(
        &self,
        shop_id: ObjectId,
        name: Option<String>,
        description: Option<String>,
        address: Option<ShopAddress>,
        phone: Option<String>,
        email: Option<String>,
    ) -> DaoResult<bool> {
        let mut set = bson::Document::new();
        if let Some(name) = name {
            set.insert("name", name);
        }
        if let Some(description) = description {
            set.insert("description", description);
        }
        if let Some(address) = address {
            set.insert("address", bson::to_bson(&address)?);
        }
        if let Some(phone) = phone {
            set.insert("phone", phone);
        }
        if let Some(email) = email {
            set.insert("email", email);
        }

        if set.is_empty() {
            return Ok(false);
        }

        self.base.update_by_id(shop_id, doc! { "$set": set }).await
    }
}
