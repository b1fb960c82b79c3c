use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{
    Invitation, Notification, NotificationPreference, Organization, OrganizationMember,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    create_indexes(
        db,
        Organization::COLLECTION,
        vec![index_unique(bson::doc! { "slug": 1 })],
    )
    .await?;

    // One role per (organization, user)
    create_indexes(
        db,
        OrganizationMember::COLLECTION,
        vec![
            index_unique(bson::doc! { "organization_id": 1, "user_id": 1 }),
            index(bson::doc! { "user_id": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        Invitation::COLLECTION,
        vec![
            index_unique(bson::doc! { "token": 1 }),
            index(bson::doc! { "organization_id": 1, "status": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        Notification::COLLECTION,
        vec![
            index(bson::doc! { "user_id": 1, "created_at": -1 }),
            index(bson::doc! { "user_id": 1, "read_at": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        NotificationPreference::COLLECTION,
        vec![index_unique(bson::doc! { "user_id": 1 })],
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
