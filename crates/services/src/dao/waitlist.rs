use bson::{doc, DateTime};
use mongodb::Database;
use wrenchly_db::models::WaitlistEntry;

use super::base::{BaseDao, DaoResult};

pub struct WaitlistDao {
    pub base: BaseDao<WaitlistEntry>,
}

impl WaitlistDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, WaitlistEntry::COLLECTION),
        }
    }

    /// Add an email to the waitlist. Returns `false` when the email was
    /// already on it (signing up twice is not an error).
    pub async fn add(&self, email: &str, name: Option<String>) -> DaoResult<bool> {
        if self.base.find_one(doc! { "email": email }).await?.is_some() {
            return Ok(false);
        }

        let entry = WaitlistEntry {
            id: None,
            email: email.to_string(),
            name,
            created_at: DateTime::now(),
        };

        self.base.insert_one(&entry).await?;
        Ok(true)
    }
}
