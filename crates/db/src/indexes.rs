use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        "users",
        vec![
            index_unique(bson::doc! { "clerk_user_id": 1 }),
            index_unique(bson::doc! { "email": 1 }),
        ],
    )
    .await?;

    // Shops
    create_indexes(
        db,
        "shops",
        vec![
            index_unique(bson::doc! { "slug": 1 }),
            index(bson::doc! { "owner_id": 1 }),
        ],
    )
    .await?;

    // Shop members
    create_indexes(
        db,
        "shop_users",
        vec![
            index_unique(bson::doc! { "shop_id": 1, "user_id": 1 }),
            index(bson::doc! { "user_id": 1 }),
        ],
    )
    .await?;

    // Invitations
    create_indexes(
        db,
        "shop_invitations",
        vec![
            index_unique(bson::doc! { "token": 1 }),
            index(bson::doc! { "shop_id": 1, "status": 1, "created_at": -1 }),
            index(bson::doc! { "email": 1, "status": 1 }),
        ],
    )
    .await?;

    // Mechanics
    create_indexes(
        db,
        "mechanics",
        vec![index(bson::doc! { "shop_id": 1, "is_active": 1 })],
    )
    .await?;

    // Jobs
    create_indexes(
        db,
        "jobs",
        vec![
            index(bson::doc! { "shop_id": 1, "status": 1, "created_at": -1 }),
            index(bson::doc! { "shop_id": 1, "mechanic_id": 1 }),
        ],
    )
    .await?;

    // Appointments
    create_indexes(
        db,
        "appointments",
        vec![index(bson::doc! { "shop_id": 1, "scheduled_at": 1 })],
    )
    .await?;

    // Waitlist
    create_indexes(
        db,
        "waitlist",
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
