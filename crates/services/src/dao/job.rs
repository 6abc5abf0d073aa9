use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use wrenchly_db::models::{Job, JobStatus};

use super::base::{BaseDao, DaoResult};

pub struct JobDao {
    pub base: BaseDao<Job>,
}

impl JobDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Job::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        shop_id: ObjectId,
        customer_name: String,
        vehicle: String,
        description: Option<String>,
        mechanic_id: Option<ObjectId>,
    ) -> DaoResult<Job> {
        let now = DateTime::now();
        let job = Job {
            id: None,
            shop_id,
            customer_name,
            vehicle,
            description,
            status: JobStatus::Open,
            mechanic_id,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        let id = self.base.insert_one(&job).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list_by_shop(
        &self,
        shop_id: ObjectId,
        status: Option<JobStatus>,
    ) -> DaoResult<Vec<Job>> {
        let mut filter = doc! { "shop_id": shop_id };
        if let Some(status) = status {
            filter.insert("status", bson::to_bson(&status)?);
        }
        self.base
            .find_many(filter, Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn set_status(
        &self,
        shop_id: ObjectId,
        id: ObjectId,
        status: JobStatus,
    ) -> DaoResult<bool> {
        let mut set = doc! { "status": bson::to_bson(&status)? };
        if status == JobStatus::Completed {
            set.insert("completed_at", DateTime::now());
        }
        self.base
            .update_one(doc! { "_id": id, "shop_id": shop_id }, doc! { "$set": set })
            .await
    }

    pub async fn assign_mechanic(
        &self,
        shop_id: ObjectId,
        id: ObjectId,
        mechanic_id: Option<ObjectId>,
    ) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": id, "shop_id": shop_id },
                doc! { "$set": { "mechanic_id": mechanic_id } },
            )
            .await
    }

    pub async fn count_open(&self, shop_id: ObjectId) -> DaoResult<u64> {
        self.base
            .count(doc! { "shop_id": shop_id, "status": { "$in": ["open", "in_progress"] } })
            .await
    }
}
