//! Runs against a real database:
//! `DATABASE_URL=postgres://... cargo test --test 50_postgres -- --ignored`

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use staffing_api::database::models::{CurriculumTemplate, Owner, Section, Subject, Teacher};
use staffing_api::database::{DatabaseManager, PgStore, Stores};
use staffing_api::types::{Relation, Shift};

async fn stores() -> Result<Stores> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must point at a scratch database")?;
    let pool = PgPoolOptions::new().max_connections(2).connect(&url).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Stores::postgres(PgStore::new(pool)))
}

async fn owner(stores: &Stores) -> Result<Owner> {
    let email = format!("{}@example.com", Uuid::new_v4().simple());
    Ok(stores.owners.save(Owner::new("Owner", email, "$2b$04$hash".to_string())).await?)
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn upserts_return_stored_rows_and_decode_shift() -> Result<()> {
    let stores = stores().await?;
    let owner = owner(&stores).await?;

    let mut template = stores
        .templates
        .save(CurriculumTemplate::new(owner.id, "Regular", 40, Shift::Afternoon))
        .await?;
    assert_eq!(template.shift, Shift::Afternoon);

    template.total_period_capacity = 30;
    template.shift = Shift::Night;
    stores.templates.save(template.clone()).await?;

    let stored = stores
        .templates
        .find_by_id(template.id)
        .await?
        .context("template was not stored")?;
    assert_eq!(stored.total_period_capacity, 30);
    assert_eq!(stored.shift, Shift::Night);
    assert_eq!(stores.templates.count_by_owner(owner.id).await?, 1);

    let teacher = stores
        .teachers
        .save(Teacher::new(owner.id, "Ana", 30, Some("morning".to_string())))
        .await?;
    assert_eq!(teacher.shift.as_deref(), Some("morning"));

    let found = stores
        .owners
        .find_by_email(&owner.email.to_uppercase())
        .await?
        .context("owner lookup is case-insensitive")?;
    assert_eq!(found.id, owner.id);
    Ok(())
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn join_tables_link_once_and_cascade_with_their_rows() -> Result<()> {
    let stores = stores().await?;
    let owner = owner(&stores).await?;
    let template = stores
        .templates
        .save(CurriculumTemplate::new(owner.id, "Regular", 40, Shift::Full))
        .await?;
    let section = stores.sections.save(Section::new(owner.id, "6A", template.id)).await?;
    let subject = stores.subjects.save(Subject::new(owner.id, "Math", 5)).await?;

    assert!(stores.relations.link(Relation::SubjectSection, subject.id, section.id).await?);
    assert!(!stores.relations.link(Relation::SubjectSection, subject.id, section.id).await?);
    assert_eq!(
        stores.relations.left_of(Relation::SubjectSection, section.id).await?,
        vec![subject.id]
    );
    assert_eq!(
        stores.relations.edges_for_owner(Relation::SubjectSection, owner.id).await?,
        vec![(subject.id, section.id)]
    );

    assert!(stores.templates.delete(template.id).await?);
    assert!(stores.sections.find_by_id(section.id).await?.is_none());
    assert!(stores
        .relations
        .right_of(Relation::SubjectSection, subject.id)
        .await?
        .is_empty());
    Ok(())
}
