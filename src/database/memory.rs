use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{OwnedEntity, Owner};
use crate::database::repository::{OwnerRepository, RelationStore, Repository};
use crate::types::Relation;

mod tables {
    use std::collections::HashMap;
    use uuid::Uuid;

    use crate::database::edges::EdgeIndex;
    use crate::database::models::{CurriculumTemplate, OwnedEntity, Owner, Section, Subject, Teacher};
    use crate::types::Relation;

    #[derive(Debug, Default)]
    pub struct MemoryState {
        pub owners: HashMap<Uuid, Owner>,
        pub teachers: HashMap<Uuid, Teacher>,
        pub subjects: HashMap<Uuid, Subject>,
        pub sections: HashMap<Uuid, Section>,
        pub templates: HashMap<Uuid, CurriculumTemplate>,
        pub subject_sections: EdgeIndex,
        pub subject_teachers: EdgeIndex,
        pub teacher_templates: EdgeIndex,
    }

    impl MemoryState {
        pub fn edges(&self, relation: Relation) -> &EdgeIndex {
            match relation {
                Relation::SubjectSection => &self.subject_sections,
                Relation::SubjectTeacher => &self.subject_teachers,
                Relation::TeacherTemplate => &self.teacher_templates,
            }
        }

        pub fn edges_mut(&mut self, relation: Relation) -> &mut EdgeIndex {
            match relation {
                Relation::SubjectSection => &mut self.subject_sections,
                Relation::SubjectTeacher => &mut self.subject_teachers,
                Relation::TeacherTemplate => &mut self.teacher_templates,
            }
        }

        /// Owner of the left end of an edge
        pub fn left_owner(&self, relation: Relation, left: Uuid) -> Option<Uuid> {
            match relation {
                Relation::SubjectSection | Relation::SubjectTeacher => {
                    self.subjects.get(&left).map(|s| s.owner_id)
                }
                Relation::TeacherTemplate => self.teachers.get(&left).map(|t| t.owner_id),
            }
        }
    }

    /// Maps an entity type onto its table inside [`MemoryState`]
    pub trait MemoryTable: OwnedEntity {
        fn table(state: &MemoryState) -> &HashMap<Uuid, Self>;
        fn table_mut(state: &mut MemoryState) -> &mut HashMap<Uuid, Self>;
    }

    macro_rules! memory_table {
        ($ty:ty, $field:ident) => {
            impl MemoryTable for $ty {
                fn table(state: &MemoryState) -> &HashMap<Uuid, Self> {
                    &state.$field
                }

                fn table_mut(state: &mut MemoryState) -> &mut HashMap<Uuid, Self> {
                    &mut state.$field
                }
            }
        };
    }

    memory_table!(Teacher, teachers);
    memory_table!(Subject, subjects);
    memory_table!(Section, sections);
    memory_table!(CurriculumTemplate, templates);
}

use tables::{MemoryState, MemoryTable};

/// Process-local store: arena tables plus two-way edge indexes behind one lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<T: MemoryTable> Repository<T> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let state = self.state.read().await;
        Ok(T::table(&state).get(&id).cloned())
    }

    async fn save(&self, entity: T) -> Result<T, DatabaseError> {
        let mut state = self.state.write().await;
        T::table_mut(&mut state).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(T::table_mut(&mut state).remove(&id).is_some())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<T>, DatabaseError> {
        let state = self.state.read().await;
        let mut rows: Vec<T> = T::table(&state)
            .values()
            .filter(|row| row.owner_id() == owner_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.created_at(), row.id()));
        Ok(rows)
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, DatabaseError> {
        let state = self.state.read().await;
        let count = T::table(&state)
            .values()
            .filter(|row| row.owner_id() == owner_id)
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl OwnerRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, DatabaseError> {
        Ok(self.state.read().await.owners.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .owners
            .values()
            .find(|owner| owner.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn save(&self, owner: Owner) -> Result<Owner, DatabaseError> {
        let mut state = self.state.write().await;
        state.owners.insert(owner.id, owner.clone());
        Ok(owner)
    }
}

#[async_trait]
impl RelationStore for MemoryStore {
    async fn link(&self, relation: Relation, left: Uuid, right: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.state.write().await.edges_mut(relation).link(left, right))
    }

    async fn unlink(&self, relation: Relation, left: Uuid, right: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.state.write().await.edges_mut(relation).unlink(left, right))
    }

    async fn right_of(&self, relation: Relation, left: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        Ok(self.state.read().await.edges(relation).right_of(left).collect())
    }

    async fn left_of(&self, relation: Relation, right: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        Ok(self.state.read().await.edges(relation).left_of(right).collect())
    }

    async fn remove_left(&self, relation: Relation, left: Uuid) -> Result<u64, DatabaseError> {
        Ok(self.state.write().await.edges_mut(relation).remove_left(left) as u64)
    }

    async fn remove_right(&self, relation: Relation, right: Uuid) -> Result<u64, DatabaseError> {
        Ok(self.state.write().await.edges_mut(relation).remove_right(right) as u64)
    }

    async fn edges_for_owner(
        &self,
        relation: Relation,
        owner_id: Uuid,
    ) -> Result<Vec<(Uuid, Uuid)>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .edges(relation)
            .edges()
            .filter(|(left, _)| state.left_owner(relation, *left) == Some(owner_id))
            .collect())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CurriculumTemplate, Teacher};
    use crate::types::Shift;

    #[tokio::test]
    async fn find_by_owner_is_scoped_and_ordered() {
        let store = MemoryStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let first = Teacher::new(alice, "Ana", 20, None);
        let mut second = Teacher::new(alice, "Bea", 30, None);
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        Repository::<Teacher>::save(&store, second.clone()).await.unwrap();
        Repository::<Teacher>::save(&store, first.clone()).await.unwrap();
        Repository::<Teacher>::save(&store, Teacher::new(bob, "Caio", 40, None)).await.unwrap();

        let rows = Repository::<Teacher>::find_by_owner(&store, alice).await.unwrap();
        let names: Vec<_> = rows.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bea"]);
        assert_eq!(Repository::<Teacher>::count_by_owner(&store, bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn edges_for_owner_filters_on_left_owner() {
        let store = MemoryStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let mine = Teacher::new(alice, "Ana", 20, None);
        let theirs = Teacher::new(bob, "Caio", 20, None);
        let template = CurriculumTemplate::new(alice, "Regular", 30, Shift::Morning);
        Repository::<Teacher>::save(&store, mine.clone()).await.unwrap();
        Repository::<Teacher>::save(&store, theirs.clone()).await.unwrap();

        store.link(Relation::TeacherTemplate, mine.id, template.id).await.unwrap();
        store.link(Relation::TeacherTemplate, theirs.id, template.id).await.unwrap();

        let edges = store.edges_for_owner(Relation::TeacherTemplate, alice).await.unwrap();
        assert_eq!(edges, vec![(mine.id, template.id)]);
    }
}
