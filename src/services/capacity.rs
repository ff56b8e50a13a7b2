use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::database::models::{CurriculumTemplate, OwnedEntity, Section, Subject};
use crate::database::Stores;
use crate::services::error::{StaffingError, StaffingResult};
use crate::services::ownership::{load_owned, Caller};
use crate::services::workload::sum_periods;
use crate::types::Relation;

/// Result of a successful attach
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachOutcome {
    pub subject_id: Uuid,
    pub section_id: Uuid,
    /// Sum of `period_load` on the section after the call
    pub attached_total: i32,
    pub capacity: i32,
    /// True when the subject was already on the section and nothing changed
    pub already_attached: bool,
}

/// Pure capacity rule: `attached + incoming <= capacity`.
/// Returns the new total, or the totals that broke the rule.
pub fn check_capacity(
    section_id: Uuid,
    attached_total: i32,
    incoming: i32,
    capacity: i32,
) -> StaffingResult<i32> {
    let requested_total = attached_total.saturating_add(incoming);
    if requested_total > capacity {
        return Err(StaffingError::CapacityExceeded {
            section_id,
            attached_total,
            requested_total,
            capacity,
        });
    }
    Ok(requested_total)
}

/// Enforces the section period budget when subjects are attached.
///
/// Attaches to one section are serialised in-process by a per-section async
/// lock held from the capacity read to the edge write. Two processes sharing
/// a database can still interleave.
pub struct CapacityValidator {
    stores: Stores,
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl CapacityValidator {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn section_lock(&self, section_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(section_id).or_default().clone()
    }

    /// Drop the lock entry of a deleted section
    pub fn forget(&self, section_id: Uuid) {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.remove(&section_id);
    }

    async fn attached_total(&self, section_id: Uuid) -> StaffingResult<i32> {
        let subject_ids = self
            .stores
            .relations
            .left_of(Relation::SubjectSection, section_id)
            .await?;
        let subjects = futures::future::try_join_all(
            subject_ids.iter().map(|id| self.stores.subjects.find_by_id(*id)),
        )
        .await?;
        Ok(sum_periods(subjects.into_iter().flatten().map(|s| s.period_load)))
    }

    /// The section's template, which must exist and share the section's owner
    async fn template_of(&self, section: &Section) -> StaffingResult<CurriculumTemplate> {
        match self.stores.templates.find_by_id(section.template_id).await? {
            Some(template) if template.owner_id == section.owner_id => Ok(template),
            _ => Err(StaffingError::InvalidState(format!(
                "section {} has no curriculum template",
                section.id
            ))),
        }
    }

    /// Attach a subject to a section if the section's budget allows it.
    /// Nothing is written when the check fails.
    pub async fn attach(
        &self,
        caller: &Caller,
        subject_id: Uuid,
        section_id: Uuid,
    ) -> StaffingResult<AttachOutcome> {
        let subject: Subject = load_owned(self.stores.subjects.as_ref(), caller, subject_id).await?;
        let section: Section = load_owned(self.stores.sections.as_ref(), caller, section_id).await?;
        let template = self.template_of(&section).await?;
        let capacity = template.total_period_capacity;

        let lock = self.section_lock(section.id);
        let _guard = lock.lock().await;

        let attached = self
            .stores
            .relations
            .left_of(Relation::SubjectSection, section.id)
            .await?;
        if attached.contains(&subject.id) {
            return Ok(AttachOutcome {
                subject_id: subject.id,
                section_id: section.id,
                attached_total: self.attached_total(section.id).await?,
                capacity,
                already_attached: true,
            });
        }

        let attached_total = self.attached_total(section.id).await?;
        let new_total = match check_capacity(section.id, attached_total, subject.period_load, capacity) {
            Ok(total) => total,
            Err(err) => {
                tracing::warn!(
                    "Refused {} {} on {} {}: {} + {} > {}",
                    Subject::KIND,
                    subject.id,
                    Section::KIND,
                    section.id,
                    attached_total,
                    subject.period_load,
                    capacity
                );
                return Err(err);
            }
        };

        self.stores
            .relations
            .link(Relation::SubjectSection, subject.id, section.id)
            .await?;
        tracing::info!(
            "Attached subject {} to section {} ({}/{} periods)",
            subject.id,
            section.id,
            new_total,
            capacity
        );

        Ok(AttachOutcome {
            subject_id: subject.id,
            section_id: section.id,
            attached_total: new_total,
            capacity,
            already_attached: false,
        })
    }

    /// Remove a subject from a section; a missing edge is a no-op success.
    /// Returns whether an edge was removed.
    pub async fn detach(&self, caller: &Caller, subject_id: Uuid, section_id: Uuid) -> StaffingResult<bool> {
        let subject: Subject = load_owned(self.stores.subjects.as_ref(), caller, subject_id).await?;
        let section: Section = load_owned(self.stores.sections.as_ref(), caller, section_id).await?;

        let lock = self.section_lock(section.id);
        let _guard = lock.lock().await;

        let removed = self
            .stores
            .relations
            .unlink(Relation::SubjectSection, subject.id, section.id)
            .await?;
        if removed {
            tracing::info!("Detached subject {} from section {}", subject.id, section.id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shift;

    #[test]
    fn check_capacity_allows_exact_fill() {
        let id = Uuid::new_v4();
        assert_eq!(check_capacity(id, 35, 5, 40).unwrap(), 40);
    }

    #[test]
    fn check_capacity_reports_both_totals() {
        let id = Uuid::new_v4();
        let err = check_capacity(id, 35, 10, 40).unwrap_err();
        match err {
            StaffingError::CapacityExceeded {
                section_id,
                attached_total,
                requested_total,
                capacity,
            } => {
                assert_eq!(section_id, id);
                assert_eq!(attached_total, 35);
                assert_eq!(requested_total, 45);
                assert_eq!(capacity, 40);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn attach_without_template_is_invalid_state() {
        let stores = Stores::memory();
        let owner = Uuid::new_v4();
        let caller = Caller {
            owner_id: owner,
            email: "ana@example.com".to_string(),
        };
        let subject = stores.subjects.save(Subject::new(owner, "Math", 4)).await.unwrap();
        let section = stores
            .sections
            .save(Section::new(owner, "6A", Uuid::new_v4()))
            .await
            .unwrap();

        let validator = CapacityValidator::new(stores.clone());
        let err = validator.attach(&caller, subject.id, section.id).await.unwrap_err();
        assert!(matches!(err, StaffingError::InvalidState(_)));
        assert!(stores
            .relations
            .left_of(Relation::SubjectSection, section.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn concurrent_attaches_never_overrun_capacity() {
        let stores = Stores::memory();
        let owner = Uuid::new_v4();
        let caller = Caller {
            owner_id: owner,
            email: "ana@example.com".to_string(),
        };
        let template = stores
            .templates
            .save(CurriculumTemplate::new(owner, "Regular", 10, Shift::Morning))
            .await
            .unwrap();
        let section = stores.sections.save(Section::new(owner, "6A", template.id)).await.unwrap();
        let mut subjects = Vec::new();
        for name in ["Math", "History", "Art"] {
            subjects.push(stores.subjects.save(Subject::new(owner, name, 4)).await.unwrap());
        }

        let validator = Arc::new(CapacityValidator::new(stores.clone()));
        let handles: Vec<_> = subjects
            .iter()
            .map(|subject| {
                let validator = validator.clone();
                let caller = caller.clone();
                let (subject_id, section_id) = (subject.id, section.id);
                tokio::spawn(async move { validator.attach(&caller, subject_id, section_id).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 2);
        assert_eq!(validator.attached_total(section.id).await.unwrap(), 8);
    }
}
