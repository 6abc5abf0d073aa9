use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use wrenchly_db::models::Mechanic;

use super::base::{BaseDao, DaoResult};

pub struct MechanicDao {
    pub base: BaseDao<Mechanic>,
}

impl MechanicDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Mechanic::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        shop_id: ObjectId,
        name: String,
        title: Option<String>,
    ) -> DaoResult<Mechanic> {
        let now = DateTime::now();
        let mechanic = Mechanic {
            id: None,
            shop_id,
            name,
            title,
            is_active: true,
            rating_avg: 0.0,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&mechanic).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list_by_shop(&self, shop_id: ObjectId) -> DaoResult<Vec<Mechanic>> {
        self.base
            .find_many(
                doc! { "shop_id": shop_id, "is_active": true },
                Some(doc! { "name": 1 }),
            )
            .await
    }

    pub async fn set_active(&self, shop_id: ObjectId, id: ObjectId, active: bool) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": id, "shop_id": shop_id },
                doc! { "$set": { "is_active": active } },
            )
            .await
    }

    pub async fn update_profile(
        &self,
        shop_id: ObjectId,
        id: ObjectId,
        name: Option<String>,
        title: Option<String>,
    ) -> DaoResult<bool> {
        let mut set = bson::Document::new();
        if let Some(name) = name {
            set.insert("name", name);
        }
        if let Some(title) = title {
            set.insert("title", title);
        }
        if set.is_empty() {
            return Ok(false);
        }
        self.base
            .update_one(doc! { "_id": id, "shop_id": shop_id }, doc! { "$set": set })
            .await
    }
}
