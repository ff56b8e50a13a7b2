use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Owner;
use crate::database::repository::{OwnerRepository, RelationStore, Repository};
use crate::types::Relation;

mod tables {
    use sqlx::postgres::{PgArguments, PgRow};
    use sqlx::query::QueryAs;
    use sqlx::{FromRow, Postgres};

    use crate::database::models::{CurriculumTemplate, OwnedEntity, Section, Subject, Teacher};

    /// Table name plus the upsert statement for one entity type
    pub trait PgTable: OwnedEntity + for<'r> FromRow<'r, PgRow> + Unpin {
        const TABLE: &'static str;

        fn upsert(&self) -> QueryAs<'static, Postgres, Self, PgArguments>;
    }

    impl PgTable for Teacher {
        const TABLE: &'static str = "teachers";

        fn upsert(&self) -> QueryAs<'static, Postgres, Self, PgArguments> {
            sqlx::query_as(
                r#"
                INSERT INTO teachers (id, owner_id, name, rt_hours, shift, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    rt_hours = EXCLUDED.rt_hours,
                    shift = EXCLUDED.shift,
                    updated_at = EXCLUDED.updated_at
                RETURNING *
                "#,
            )
            .bind(self.id)
            .bind(self.owner_id)
            .bind(self.name.clone())
            .bind(self.rt_hours)
            .bind(self.shift.clone())
            .bind(self.created_at)
            .bind(self.updated_at)
        }
    }

    impl PgTable for Subject {
        const TABLE: &'static str = "subjects";

        fn upsert(&self) -> QueryAs<'static, Postgres, Self, PgArguments> {
            sqlx::query_as(
                r#"
                INSERT INTO subjects (id, owner_id, name, period_load, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    period_load = EXCLUDED.period_load,
                    updated_at = EXCLUDED.updated_at
                RETURNING *
                "#,
            )
            .bind(self.id)
            .bind(self.owner_id)
            .bind(self.name.clone())
            .bind(self.period_load)
            .bind(self.created_at)
            .bind(self.updated_at)
        }
    }

    impl PgTable for Section {
        const TABLE: &'static str = "sections";

        fn upsert(&self) -> QueryAs<'static, Postgres, Self, PgArguments> {
            sqlx::query_as(
                r#"
                INSERT INTO sections (id, owner_id, name, template_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    template_id = EXCLUDED.template_id,
                    updated_at = EXCLUDED.updated_at
                RETURNING *
                "#,
            )
            .bind(self.id)
            .bind(self.owner_id)
            .bind(self.name.clone())
            .bind(self.template_id)
            .bind(self.created_at)
            .bind(self.updated_at)
        }
    }

    impl PgTable for CurriculumTemplate {
        const TABLE: &'static str = "curriculum_templates";

        fn upsert(&self) -> QueryAs<'static, Postgres, Self, PgArguments> {
            sqlx::query_as(
                r#"
                INSERT INTO curriculum_templates
                    (id, owner_id, category, total_period_capacity, shift, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO UPDATE SET
                    category = EXCLUDED.category,
                    total_period_capacity = EXCLUDED.total_period_capacity,
                    shift = EXCLUDED.shift,
                    updated_at = EXCLUDED.updated_at
                RETURNING *
                "#,
            )
            .bind(self.id)
            .bind(self.owner_id)
            .bind(self.category.clone())
            .bind(self.total_period_capacity)
            .bind(self.shift.as_str())
            .bind(self.created_at)
            .bind(self.updated_at)
        }
    }
}

use tables::PgTable;

/// Join table, left column, right column, and the table owning the left end
fn relation_sql(relation: Relation) -> (&'static str, &'static str, &'static str, &'static str) {
    match relation {
        Relation::SubjectSection => ("subject_sections", "subject_id", "section_id", "subjects"),
        Relation::SubjectTeacher => ("subject_teachers", "subject_id", "teacher_id", "subjects"),
        Relation::TeacherTemplate => ("teacher_templates", "teacher_id", "template_id", "teachers"),
    }
}

/// PostgreSQL-backed persistence; one join table per relation
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl<T: PgTable> Repository<T> for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save(&self, entity: T) -> Result<T, DatabaseError> {
        let row = entity.upsert().fetch_one(&self.pool).await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM {} WHERE owner_id = $1 ORDER BY created_at, id",
            T::TABLE
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE owner_id = $1", T::TABLE);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl OwnerRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, DatabaseError> {
        let row = sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>, DatabaseError> {
        let row = sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save(&self, owner: Owner) -> Result<Owner, DatabaseError> {
        let row = sqlx::query_as::<_, Owner>(
            r#"
            INSERT INTO owners (id, name, email, credential_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                credential_hash = EXCLUDED.credential_hash
            RETURNING *
            "#,
        )
        .bind(owner.id)
        .bind(&owner.name)
        .bind(&owner.email)
        .bind(&owner.credential_hash)
        .bind(owner.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl RelationStore for PgStore {
    async fn link(&self, relation: Relation, left: Uuid, right: Uuid) -> Result<bool, DatabaseError> {
        let (table, l, r, _) = relation_sql(relation);
        let sql = format!("INSERT INTO {table} ({l}, {r}) VALUES ($1, $2) ON CONFLICT DO NOTHING");
        let result = sqlx::query(&sql).bind(left).bind(right).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unlink(&self, relation: Relation, left: Uuid, right: Uuid) -> Result<bool, DatabaseError> {
        let (table, l, r, _) = relation_sql(relation);
        let sql = format!("DELETE FROM {table} WHERE {l} = $1 AND {r} = $2");
        let result = sqlx::query(&sql).bind(left).bind(right).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn right_of(&self, relation: Relation, left: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        let (table, l, r, _) = relation_sql(relation);
        let sql = format!("SELECT {r} FROM {table} WHERE {l} = $1 ORDER BY {r}");
        let ids = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(left)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn left_of(&self, relation: Relation, right: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        let (table, l, r, _) = relation_sql(relation);
        let sql = format!("SELECT {l} FROM {table} WHERE {r} = $1 ORDER BY {l}");
        let ids = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(right)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn remove_left(&self, relation: Relation, left: Uuid) -> Result<u64, DatabaseError> {
        let (table, l, _, _) = relation_sql(relation);
        let sql = format!("DELETE FROM {table} WHERE {l} = $1");
        let result = sqlx::query(&sql).bind(left).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn remove_right(&self, relation: Relation, right: Uuid) -> Result<u64, DatabaseError> {
        let (table, _, r, _) = relation_sql(relation);
        let sql = format!("DELETE FROM {table} WHERE {r} = $1");
        let result = sqlx::query(&sql).bind(right).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn edges_for_owner(
        &self,
        relation: Relation,
        owner_id: Uuid,
    ) -> Result<Vec<(Uuid, Uuid)>, DatabaseError> {
        let (table, l, r, left_table) = relation_sql(relation);
        let sql = format!(
            "SELECT e.{l}, e.{r} FROM {table} e JOIN {left_table} o ON o.id = e.{l} WHERE o.owner_id = $1"
        );
        let edges = sqlx::query_as::<_, (Uuid, Uuid)>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(edges)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
