use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use wrenchly_db::models::{Appointment, AppointmentStatus};

use super::base::{BaseDao, DaoResult};

pub struct AppointmentDao {
    pub base: BaseDao<Appointment>,
}

impl AppointmentDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Appointment::COLLECTION),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        shop_id: ObjectId,
        job_id: Option<ObjectId>,
        customer_name: String,
        scheduled_at: DateTime,
        duration_mins: u32,
        mechanic_id: Option<ObjectId>,
        notes: Option<String>,
    ) -> DaoResult<Appointment> {
        let now = DateTime::now();
        let appointment = Appointment {
            id: None,
            shop_id,
            job_id,
            customer_name,
            scheduled_at,
            duration_mins,
            mechanic_id,
            status: AppointmentStatus::Scheduled,
            notes,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&appointment).await?;
        self.base.find_by_id(id).await
    }

    /// Schedule listing, soonest first.
    pub async fn list_by_shop(&self, shop_id: ObjectId) -> DaoResult<Vec<Appointment>> {
        self.base
            .find_many(
                doc! { "shop_id": shop_id },
                Some(doc! { "scheduled_at": 1 }),
            )
            .await
    }

    pub async fn set_status(
        &self,
        shop_id: ObjectId,
        id: ObjectId,
        status: AppointmentStatus,
    ) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": id, "shop_id": shop_id },
                doc! { "$set": { "status": bson::to_bson(&status)? } },
            )
            .await
    }

    pub async fn count_upcoming(&self, shop_id: ObjectId) -> DaoResult<u64> {
        self.base
            .count(doc! {
                "shop_id": shop_id,
                "status": "scheduled",
                "scheduled_at": { "$gte": DateTime::now() },
            })
            .await
    }
}
