use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{CurriculumTemplate, Section, Subject, Teacher};
use crate::database::Stores;
use crate::services::aggregation::global_total;
use crate::services::capacity::{AttachOutcome, CapacityValidator};
use crate::services::error::{StaffingError, StaffingResult};
use crate::services::graph::TenantGraph;
use crate::services::ownership::{load_owned, resolve_caller, Caller};
use crate::services::reports::{
    self, DetailRow, OverloadRow, RosterRow, ShiftDistributionRow, TeacherSummaryRow, TenantStatistics,
};
use crate::services::workload::{max_periods, remaining_periods, MAX_QUANTITY};
use crate::types::{Relation, Shift};

fn require_name(field: &str, value: &str) -> StaffingResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StaffingError::validation(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}

fn require_quantity(field: &str, value: i32) -> StaffingResult<i32> {
    if value < 0 {
        return Err(StaffingError::validation(format!("{} must not be negative", field)));
    }
    if value > MAX_QUANTITY {
        return Err(StaffingError::validation(format!(
            "{} must not exceed {}",
            field, MAX_QUANTITY
        )));
    }
    Ok(value)
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeacherInput {
    pub name: String,
    pub rt_hours: i32,
    #[serde(default)]
    pub shift: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectInput {
    pub name: String,
    pub period_load: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateInput {
    pub category: String,
    pub total_period_capacity: i32,
    pub shift: Shift,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionInput {
    pub name: String,
    pub template_id: Uuid,
}

/// Result of a link or unlink; `changed` is false for the idempotent no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkOutcome {
    pub changed: bool,
}

/// One teacher's budget against the subjects listing them
#[derive(Debug, Clone, Serialize)]
pub struct TeacherWorkload {
    pub teacher: Teacher,
    pub max_periods: i32,
    pub total_periods: i32,
    pub remaining: i32,
    pub subjects: Vec<Subject>,
}

/// Owner-scoped operations on the staffing domain. Every method takes the
/// caller explicitly and checks ownership before touching an entity.
pub struct StaffingService {
    stores: Stores,
    capacity: CapacityValidator,
}

impl StaffingService {
    pub fn new(stores: Stores) -> Self {
        Self {
            capacity: CapacityValidator::new(stores.clone()),
            stores,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub async fn resolve(&self, principal: Option<&Principal>) -> StaffingResult<Caller> {
        resolve_caller(self.stores.owners.as_ref(), principal).await
    }

    // Teachers

    pub async fn create_teacher(&self, caller: &Caller, input: TeacherInput) -> StaffingResult<Teacher> {
        let name = require_name("name", &input.name)?;
        let rt_hours = require_quantity("rt_hours", input.rt_hours)?;
        let teacher = self
            .stores
            .teachers
            .save(Teacher::new(caller.owner_id, name, rt_hours, input.shift))
            .await?;
        info!("Created teacher {} for owner {}", teacher.id, caller.owner_id);
        Ok(teacher)
    }

    pub async fn get_teacher(&self, caller: &Caller, id: Uuid) -> StaffingResult<Teacher> {
        load_owned(self.stores.teachers.as_ref(), caller, id).await
    }

    pub async fn list_teachers(&self, caller: &Caller) -> StaffingResult<Vec<Teacher>> {
        Ok(self.stores.teachers.find_by_owner(caller.owner_id).await?)
    }

    pub async fn update_teacher(&self, caller: &Caller, id: Uuid, input: TeacherInput) -> StaffingResult<Teacher> {
        let mut teacher = load_owned(self.stores.teachers.as_ref(), caller, id).await?;
        teacher.name = require_name("name", &input.name)?;
        teacher.rt_hours = require_quantity("rt_hours", input.rt_hours)?;
        teacher.shift = input.shift;
        teacher.updated_at = Utc::now();
        Ok(self.stores.teachers.save(teacher).await?)
    }

    /// Drops every subject and template edge of the teacher before the record
    pub async fn delete_teacher(&self, caller: &Caller, id: Uuid) -> StaffingResult<()> {
        let teacher = load_owned(self.stores.teachers.as_ref(), caller, id).await?;
        let relations = &self.stores.relations;
        let subjects = relations.remove_right(Relation::SubjectTeacher, teacher.id).await?;
        let templates = relations.remove_left(Relation::TeacherTemplate, teacher.id).await?;
        self.stores.teachers.delete(teacher.id).await?;
        info!(
            "Deleted teacher {} ({} subject edges, {} template edges)",
            teacher.id, subjects, templates
        );
        Ok(())
    }

    pub async fn teacher_workload(&self, caller: &Caller, id: Uuid) -> StaffingResult<TeacherWorkload> {
        let teacher = load_owned(self.stores.teachers.as_ref(), caller, id).await?;
        let graph = TenantGraph::load(&self.stores, caller).await?;
        let max = max_periods(teacher.rt_hours);
        let total = global_total(&graph, teacher.id);
        let subjects = graph.subjects_of_teacher(teacher.id).into_iter().cloned().collect();

        Ok(TeacherWorkload {
            teacher,
            max_periods: max,
            total_periods: total,
            remaining: remaining_periods(max, total),
            subjects,
        })
    }

    // Subjects

    pub async fn create_subject(&self, caller: &Caller, input: SubjectInput) -> StaffingResult<Subject> {
        let name = require_name("name", &input.name)?;
        let load = require_quantity("period_load", input.period_load)?;
        let subject = self
            .stores
            .subjects
            .save(Subject::new(caller.owner_id, name, load))
            .await?;
        info!("Created subject {} for owner {}", subject.id, caller.owner_id);
        Ok(subject)
    }

    pub async fn get_subject(&self, caller: &Caller, id: Uuid) -> StaffingResult<Subject> {
        load_owned(self.stores.subjects.as_ref(), caller, id).await
    }

    pub async fn list_subjects(&self, caller: &Caller) -> StaffingResult<Vec<Subject>> {
        Ok(self.stores.subjects.find_by_owner(caller.owner_id).await?)
    }

    /// Capacity is not re-checked when a load changes after attachment
    pub async fn update_subject(&self, caller: &Caller, id: Uuid, input: SubjectInput) -> StaffingResult<Subject> {
        let mut subject = load_owned(self.stores.subjects.as_ref(), caller, id).await?;
        subject.name = require_name("name", &input.name)?;
        subject.period_load = require_quantity("period_load", input.period_load)?;
        subject.updated_at = Utc::now();
        Ok(self.stores.subjects.save(subject).await?)
    }

    pub async fn delete_subject(&self, caller: &Caller, id: Uuid) -> StaffingResult<()> {
        let subject = load_owned(self.stores.subjects.as_ref(), caller, id).await?;
        let relations = &self.stores.relations;
        relations.remove_left(Relation::SubjectSection, subject.id).await?;
        relations.remove_left(Relation::SubjectTeacher, subject.id).await?;
        self.stores.subjects.delete(subject.id).await?;
        info!("Deleted subject {}", subject.id);
        Ok(())
    }

    pub async fn link_subject_teacher(
        &self,
        caller: &Caller,
        subject_id: Uuid,
        teacher_id: Uuid,
    ) -> StaffingResult<LinkOutcome> {
        let subject = load_owned(self.stores.subjects.as_ref(), caller, subject_id).await?;
        let teacher = load_owned(self.stores.teachers.as_ref(), caller, teacher_id).await?;
        let changed = self
            .stores
            .relations
            .link(Relation::SubjectTeacher, subject.id, teacher.id)
            .await?;
        Ok(LinkOutcome { changed })
    }

    pub async fn unlink_subject_teacher(
        &self,
        caller: &Caller,
        subject_id: Uuid,
        teacher_id: Uuid,
    ) -> StaffingResult<LinkOutcome> {
        let subject = load_owned(self.stores.subjects.as_ref(), caller, subject_id).await?;
        let teacher = load_owned(self.stores.teachers.as_ref(), caller, teacher_id).await?;
        let changed = self
            .stores
            .relations
            .unlink(Relation::SubjectTeacher, subject.id, teacher.id)
            .await?;
        Ok(LinkOutcome { changed })
    }

    pub async fn attach_subject(
        &self,
        caller: &Caller,
        subject_id: Uuid,
        section_id: Uuid,
    ) -> StaffingResult<AttachOutcome> {
        self.capacity.attach(caller, subject_id, section_id).await
    }

    pub async fn detach_subject(
        &self,
        caller: &Caller,
        subject_id: Uuid,
        section_id: Uuid,
    ) -> StaffingResult<LinkOutcome> {
        let changed = self.capacity.detach(caller, subject_id, section_id).await?;
        Ok(LinkOutcome { changed })
    }

    // Curriculum templates

    pub async fn create_template(&self, caller: &Caller, input: TemplateInput) -> StaffingResult<CurriculumTemplate> {
        let category = require_name("category", &input.category)?;
        let capacity = require_quantity("total_period_capacity", input.total_period_capacity)?;
        let template = self
            .stores
            .templates
            .save(CurriculumTemplate::new(caller.owner_id, category, capacity, input.shift))
            .await?;
        info!("Created curriculum template {} for owner {}", template.id, caller.owner_id);
        Ok(template)
    }

    pub async fn get_template(&self, caller: &Caller, id: Uuid) -> StaffingResult<CurriculumTemplate> {
        load_owned(self.stores.templates.as_ref(), caller, id).await
    }

    pub async fn list_templates(&self, caller: &Caller) -> StaffingResult<Vec<CurriculumTemplate>> {
        Ok(self.stores.templates.find_by_owner(caller.owner_id).await?)
    }

    pub async fn update_template(
        &self,
        caller: &Caller,
        id: Uuid,
        input: TemplateInput,
    ) -> StaffingResult<CurriculumTemplate> {
        let mut template = load_owned(self.stores.templates.as_ref(), caller, id).await?;
        template.category = require_name("category", &input.category)?;
        template.total_period_capacity =
            require_quantity("total_period_capacity", input.total_period_capacity)?;
        template.shift = input.shift;
        template.updated_at = Utc::now();
        Ok(self.stores.templates.save(template).await?)
    }

    /// Removes teacher memberships, then every section of the template
    pub async fn delete_template(&self, caller: &Caller, id: Uuid) -> StaffingResult<()> {
        let template = load_owned(self.stores.templates.as_ref(), caller, id).await?;
        self.stores
            .relations
            .remove_right(Relation::TeacherTemplate, template.id)
            .await?;

        let sections = self.stores.sections.find_by_owner(caller.owner_id).await?;
        let mut cascaded = 0;
        for section in sections.into_iter().filter(|s| s.template_id == template.id) {
            self.remove_section(&section).await?;
            cascaded += 1;
        }

        self.stores.templates.delete(template.id).await?;
        info!("Deleted curriculum template {} and {} sections", template.id, cascaded);
        Ok(())
    }

    pub async fn link_teacher_template(
        &self,
        caller: &Caller,
        teacher_id: Uuid,
        template_id: Uuid,
    ) -> StaffingResult<LinkOutcome> {
        let teacher = load_owned(self.stores.teachers.as_ref(), caller, teacher_id).await?;
        let template = load_owned(self.stores.templates.as_ref(), caller, template_id).await?;
        let changed = self
            .stores
            .relations
            .link(Relation::TeacherTemplate, teacher.id, template.id)
            .await?;
        Ok(LinkOutcome { changed })
    }

    pub async fn unlink_teacher_template(
        &self,
        caller: &Caller,
        teacher_id: Uuid,
        template_id: Uuid,
    ) -> StaffingResult<LinkOutcome> {
        let teacher = load_owned(self.stores.teachers.as_ref(), caller, teacher_id).await?;
        let template = load_owned(self.stores.templates.as_ref(), caller, template_id).await?;
        let changed = self
            .stores
            .relations
            .unlink(Relation::TeacherTemplate, teacher.id, template.id)
            .await?;
        Ok(LinkOutcome { changed })
    }

    // Sections

    /// The template must exist and belong to the caller
    pub async fn create_section(&self, caller: &Caller, input: SectionInput) -> StaffingResult<Section> {
        let name = require_name("name", &input.name)?;
        let template = load_owned(self.stores.templates.as_ref(), caller, input.template_id).await?;
        let section = self
            .stores
            .sections
            .save(Section::new(caller.owner_id, name, template.id))
            .await?;
        info!("Created section {} under template {}", section.id, template.id);
        Ok(section)
    }

    pub async fn get_section(&self, caller: &Caller, id: Uuid) -> StaffingResult<Section> {
        load_owned(self.stores.sections.as_ref(), caller, id).await
    }

    pub async fn list_sections(&self, caller: &Caller) -> StaffingResult<Vec<Section>> {
        Ok(self.stores.sections.find_by_owner(caller.owner_id).await?)
    }

    pub async fn sections_of_template(&self, caller: &Caller, template_id: Uuid) -> StaffingResult<Vec<Section>> {
        let template = load_owned(self.stores.templates.as_ref(), caller, template_id).await?;
        let sections = self.stores.sections.find_by_owner(caller.owner_id).await?;
        Ok(sections.into_iter().filter(|s| s.template_id == template.id).collect())
    }

    pub async fn update_section(&self, caller: &Caller, id: Uuid, input: SectionInput) -> StaffingResult<Section> {
        let mut section = load_owned(self.stores.sections.as_ref(), caller, id).await?;
        let template = load_owned(self.stores.templates.as_ref(), caller, input.template_id).await?;
        section.name = require_name("name", &input.name)?;
        section.template_id = template.id;
        section.updated_at = Utc::now();
        Ok(self.stores.sections.save(section).await?)
    }

    pub async fn delete_section(&self, caller: &Caller, id: Uuid) -> StaffingResult<()> {
        let section = load_owned(self.stores.sections.as_ref(), caller, id).await?;
        self.remove_section(&section).await?;
        info!("Deleted section {}", section.id);
        Ok(())
    }

    async fn remove_section(&self, section: &Section) -> StaffingResult<()> {
        self.stores
            .relations
            .remove_right(Relation::SubjectSection, section.id)
            .await?;
        self.stores.sections.delete(section.id).await?;
        self.capacity.forget(section.id);
        Ok(())
    }

    // Reports

    async fn graph(&self, caller: &Caller) -> StaffingResult<TenantGraph> {
        let graph = TenantGraph::load(&self.stores, caller).await?;
        debug!(
            "Loaded graph for owner {}: {} templates, {} sections, {} subjects, {} teachers",
            caller.owner_id,
            graph.templates.len(),
            graph.sections.len(),
            graph.subjects.len(),
            graph.teachers.len()
        );
        Ok(graph)
    }

    pub async fn overload_report(&self, caller: &Caller) -> StaffingResult<Vec<OverloadRow>> {
        Ok(reports::overload_report(&self.graph(caller).await?))
    }

    pub async fn teacher_summary_report(&self, caller: &Caller) -> StaffingResult<Vec<TeacherSummaryRow>> {
        Ok(reports::teacher_summary_report(&self.graph(caller).await?))
    }

    pub async fn roster_report(&self, caller: &Caller) -> StaffingResult<Vec<RosterRow>> {
        Ok(reports::roster_report(&self.graph(caller).await?))
    }

    pub async fn detail_report(&self, caller: &Caller) -> StaffingResult<Vec<DetailRow>> {
        Ok(reports::detail_report(&self.graph(caller).await?))
    }

    pub async fn shift_distribution_report(&self, caller: &Caller) -> StaffingResult<Vec<ShiftDistributionRow>> {
        Ok(reports::shift_distribution_report(&self.graph(caller).await?))
    }

    /// Counts are taken at the query boundary, never by loading the rows
    pub async fn statistics(&self, caller: &Caller) -> StaffingResult<TenantStatistics> {
        let owner = caller.owner_id;
        let (teachers, curriculum_templates, sections, subjects) = futures::try_join!(
            self.stores.teachers.count_by_owner(owner),
            self.stores.templates.count_by_owner(owner),
            self.stores.sections.count_by_owner(owner),
            self.stores.subjects.count_by_owner(owner),
        )?;

        Ok(TenantStatistics {
            teachers,
            curriculum_templates,
            sections,
            subjects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller() -> Caller {
        Caller {
            owner_id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn blank_names_and_negative_numbers_are_rejected() {
        let service = StaffingService::new(Stores::memory());
        let caller = caller();

        let err = service
            .create_teacher(&caller, TeacherInput { name: "  ".into(), rt_hours: 20, shift: None })
            .await
            .unwrap_err();
        assert!(matches!(err, StaffingError::ValidationFailed(_)));

        let err = service
            .create_subject(&caller, SubjectInput { name: "Math".into(), period_load: -1 })
            .await
            .unwrap_err();
        assert!(matches!(err, StaffingError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn quantities_above_the_bound_are_rejected_on_create_and_update() {
        let service = StaffingService::new(Stores::memory());
        let caller = caller();

        let err = service
            .create_subject(&caller, SubjectInput { name: "Math".into(), period_load: 1_500_000_000 })
            .await
            .unwrap_err();
        assert!(matches!(err, StaffingError::ValidationFailed(_)));

        let subject = service
            .create_subject(&caller, SubjectInput { name: "Math".into(), period_load: MAX_QUANTITY })
            .await
            .unwrap();
        let err = service
            .update_subject(
                &caller,
                subject.id,
                SubjectInput { name: "Math".into(), period_load: MAX_QUANTITY + 1 },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StaffingError::ValidationFailed(_)));

        let err = service
            .create_teacher(&caller, TeacherInput { name: "Ana".into(), rt_hours: i32::MAX, shift: None })
            .await
            .unwrap_err();
        assert!(matches!(err, StaffingError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn section_requires_an_existing_template() {
        let service = StaffingService::new(Stores::memory());
        let caller = caller();

        let err = service
            .create_section(&caller, SectionInput { name: "6A".into(), template_id: Uuid::new_v4() })
            .await
            .unwrap_err();
        assert!(matches!(err, StaffingError::NotFound { kind: "curriculum template", .. }));
    }

    #[tokio::test]
    async fn deleting_a_template_cascades_to_its_sections() {
        let service = StaffingService::new(Stores::memory());
        let caller = caller();
        let template = service
            .create_template(
                &caller,
                TemplateInput { category: "Regular".into(), total_period_capacity: 30, shift: Shift::Morning },
            )
            .await
            .unwrap();
        let section = service
            .create_section(&caller, SectionInput { name: "6A".into(), template_id: template.id })
            .await
            .unwrap();
        let subject = service
            .create_subject(&caller, SubjectInput { name: "Math".into(), period_load: 5 })
            .await
            .unwrap();
        service.attach_subject(&caller, subject.id, section.id).await.unwrap();

        service.delete_template(&caller, template.id).await.unwrap();

        assert!(service.list_sections(&caller).await.unwrap().is_empty());
        let edges = service
            .stores()
            .relations
            .right_of(Relation::SubjectSection, subject.id)
            .await
            .unwrap();
        assert!(edges.is_empty());
        assert_eq!(service.statistics(&caller).await.unwrap().subjects, 1);
    }
}
