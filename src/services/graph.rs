use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{CurriculumTemplate, OwnedEntity, Section, Subject, Teacher};
use crate::database::{EdgeIndex, Stores};
use crate::services::error::StaffingResult;
use crate::services::ownership::Caller;
use crate::types::Relation;

/// Rows of one entity type in load order, indexed by id
#[derive(Debug, Clone)]
pub struct Arena<T> {
    rows: Vec<T>,
    index: HashMap<Uuid, usize>,
}

impl<T: OwnedEntity> Arena<T> {
    pub fn new(rows: Vec<T>) -> Self {
        let index = rows.iter().enumerate().map(|(pos, row)| (row.id(), pos)).collect();
        Self { rows, index }
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.index.get(&id).map(|pos| &self.rows[*pos])
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve ids to rows, in arena order; unknown ids are skipped
    pub fn select(&self, ids: impl IntoIterator<Item = Uuid>) -> Vec<&T> {
        let mut positions: Vec<usize> = ids.into_iter().filter_map(|id| self.position(id)).collect();
        positions.sort_unstable();
        positions.dedup();
        positions.into_iter().map(|pos| &self.rows[pos]).collect()
    }
}

/// Raw material for a [`TenantGraph`]
#[derive(Debug, Clone, Default)]
pub struct GraphRows {
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub sections: Vec<Section>,
    pub templates: Vec<CurriculumTemplate>,
    pub subject_sections: Vec<(Uuid, Uuid)>,
    pub subject_teachers: Vec<(Uuid, Uuid)>,
    pub teacher_templates: Vec<(Uuid, Uuid)>,
}

/// Snapshot of one owner's CurriculumTemplate → Section → Subject → Teacher
/// graph. Rebuilt for every report; never cached between requests.
#[derive(Debug, Clone)]
pub struct TenantGraph {
    pub teachers: Arena<Teacher>,
    pub subjects: Arena<Subject>,
    pub sections: Arena<Section>,
    pub templates: Arena<CurriculumTemplate>,
    subject_sections: EdgeIndex,
    subject_teachers: EdgeIndex,
    teacher_templates: EdgeIndex,
    sections_by_template: HashMap<Uuid, Vec<Uuid>>,
}

impl TenantGraph {
    /// Load everything the caller owns, scoped at the query boundary
    pub async fn load(stores: &Stores, caller: &Caller) -> StaffingResult<Self> {
        let owner = caller.owner_id;
        let (teachers, subjects, sections, templates) = futures::try_join!(
            stores.teachers.find_by_owner(owner),
            stores.subjects.find_by_owner(owner),
            stores.sections.find_by_owner(owner),
            stores.templates.find_by_owner(owner),
        )?;
        let (subject_sections, subject_teachers, teacher_templates) = futures::try_join!(
            stores.relations.edges_for_owner(Relation::SubjectSection, owner),
            stores.relations.edges_for_owner(Relation::SubjectTeacher, owner),
            stores.relations.edges_for_owner(Relation::TeacherTemplate, owner),
        )?;

        Ok(Self::from_rows(GraphRows {
            teachers,
            subjects,
            sections,
            templates,
            subject_sections,
            subject_teachers,
            teacher_templates,
        }))
    }

    pub fn from_rows(rows: GraphRows) -> Self {
        let teachers = Arena::new(rows.teachers);
        let subjects = Arena::new(rows.subjects);
        let sections = Arena::new(rows.sections);
        let templates = Arena::new(rows.templates);

        // edges reaching outside the loaded rows are ignored
        let subject_sections = rows
            .subject_sections
            .into_iter()
            .filter(|(subject, section)| subjects.contains(*subject) && sections.contains(*section))
            .collect();
        let subject_teachers = rows
            .subject_teachers
            .into_iter()
            .filter(|(subject, teacher)| subjects.contains(*subject) && teachers.contains(*teacher))
            .collect();
        let teacher_templates = rows
            .teacher_templates
            .into_iter()
            .filter(|(teacher, template)| teachers.contains(*teacher) && templates.contains(*template))
            .collect();

        let mut sections_by_template: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for section in sections.iter() {
            sections_by_template.entry(section.template_id).or_default().push(section.id);
        }

        Self {
            teachers,
            subjects,
            sections,
            templates,
            subject_sections,
            subject_teachers,
            teacher_templates,
            sections_by_template,
        }
    }

    pub fn sections_of(&self, template_id: Uuid) -> Vec<&Section> {
        match self.sections_by_template.get(&template_id) {
            Some(ids) => self.sections.select(ids.iter().copied()),
            None => Vec::new(),
        }
    }

    pub fn subjects_of_section(&self, section_id: Uuid) -> Vec<&Subject> {
        self.subjects.select(self.subject_sections.left_of(section_id))
    }

    pub fn teachers_of_subject(&self, subject_id: Uuid) -> Vec<&Teacher> {
        self.teachers.select(self.subject_teachers.right_of(subject_id))
    }

    pub fn subjects_of_teacher(&self, teacher_id: Uuid) -> Vec<&Subject> {
        self.subjects.select(self.subject_teachers.left_of(teacher_id))
    }

    /// Direct Teacher ↔ CurriculumTemplate membership
    pub fn members_of_template(&self, template_id: Uuid) -> Vec<&Teacher> {
        self.teachers.select(self.teacher_templates.left_of(template_id))
    }
}
