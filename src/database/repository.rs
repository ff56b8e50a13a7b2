use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::memory::MemoryStore;
use crate::database::models::{CurriculumTemplate, OwnedEntity, Owner, Section, Subject, Teacher};
use crate::database::postgres::PgStore;
use crate::types::Relation;

/// Persistence collaborator for one owner-scoped entity type.
/// "Not found" is reported as `None` / `false`, never as an error.
#[async_trait]
pub trait Repository<T: OwnedEntity>: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError>;

    /// Insert or replace by id
    async fn save(&self, entity: T) -> Result<T, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// All records of one owner, oldest first
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<T>, DatabaseError>;

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, DatabaseError>;
}

#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>, DatabaseError>;

    async fn save(&self, owner: Owner) -> Result<Owner, DatabaseError>;
}

/// Edge storage for the many-to-many relations; see [`Relation`] for which
/// end is "left".
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Returns false when the edge already existed
    async fn link(&self, relation: Relation, left: Uuid, right: Uuid) -> Result<bool, DatabaseError>;

    /// Returns false when there was no such edge
    async fn unlink(&self, relation: Relation, left: Uuid, right: Uuid) -> Result<bool, DatabaseError>;

    async fn right_of(&self, relation: Relation, left: Uuid) -> Result<Vec<Uuid>, DatabaseError>;

    async fn left_of(&self, relation: Relation, right: Uuid) -> Result<Vec<Uuid>, DatabaseError>;

    async fn remove_left(&self, relation: Relation, left: Uuid) -> Result<u64, DatabaseError>;

    async fn remove_right(&self, relation: Relation, right: Uuid) -> Result<u64, DatabaseError>;

    /// Every edge whose left end belongs to `owner_id`
    async fn edges_for_owner(
        &self,
        relation: Relation,
        owner_id: Uuid,
    ) -> Result<Vec<(Uuid, Uuid)>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// One handle per collaborator, all usually backed by the same store
#[derive(Clone)]
pub struct Stores {
    pub owners: Arc<dyn OwnerRepository>,
    pub teachers: Arc<dyn Repository<Teacher>>,
    pub subjects: Arc<dyn Repository<Subject>>,
    pub sections: Arc<dyn Repository<Section>>,
    pub templates: Arc<dyn Repository<CurriculumTemplate>>,
    pub relations: Arc<dyn RelationStore>,
}

impl Stores {
    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            owners: store.clone(),
            teachers: store.clone(),
            subjects: store.clone(),
            sections: store.clone(),
            templates: store.clone(),
            relations: store,
        }
    }

    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            owners: store.clone(),
            teachers: store.clone(),
            subjects: store.clone(),
            sections: store.clone(),
            templates: store.clone(),
            relations: store,
        }
    }
}
