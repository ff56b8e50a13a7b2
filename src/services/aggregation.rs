//! Assigned-period totals over a [`TenantGraph`].
//!
//! Two scopes are computed and kept apart on purpose:
//! - the *global total* counts each Subject a Teacher teaches once, however
//!   many Sections or shifts it appears under;
//! - the *shift grand total* sums the per-shift totals, where a Subject is
//!   counted once per shift it is reachable from.
//!
//! The two disagree whenever one Subject sits under templates of different
//! shifts.

use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use crate::services::graph::TenantGraph;
use crate::services::workload::sum_periods;
use crate::types::Shift;

/// Sum of `period_load` over every distinct Subject listing the Teacher
pub fn global_total(graph: &TenantGraph, teacher_id: Uuid) -> i32 {
    sum_periods(
        graph
            .subjects_of_teacher(teacher_id)
            .iter()
            .map(|subject| subject.period_load),
    )
}

/// Periods a Teacher carries under one shift
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftLoad {
    pub teacher_id: Uuid,
    pub shift: Shift,
    pub total_periods: i32,
    /// "Subject (Section)" for each counted Subject, first Section seen
    pub subject_labels: Vec<String>,
}

/// Per-(Teacher, Shift) totals.
///
/// Walks templates → sections → subjects → teachers; a Subject adds its load
/// to a (Teacher, Shift) at most once even when several Sections of that
/// shift carry it. Pairs with nothing assigned are omitted. Output is ordered
/// by teacher, then shift.
pub fn shift_distribution(graph: &TenantGraph) -> Vec<ShiftLoad> {
    let mut loads: BTreeMap<(usize, Shift), ShiftLoad> = BTreeMap::new();
    let mut counted: HashSet<(Uuid, Shift, Uuid)> = HashSet::new();

    for template in graph.templates.iter() {
        let shift = template.shift;
        for section in graph.sections_of(template.id) {
            for subject in graph.subjects_of_section(section.id) {
                for teacher in graph.teachers_of_subject(subject.id) {
                    if !counted.insert((teacher.id, shift, subject.id)) {
                        continue;
                    }
                    let Some(pos) = graph.teachers.position(teacher.id) else {
                        continue;
                    };
                    let load = loads.entry((pos, shift)).or_insert_with(|| ShiftLoad {
                        teacher_id: teacher.id,
                        shift,
                        total_periods: 0,
                        subject_labels: Vec::new(),
                    });
                    load.total_periods = load.total_periods.saturating_add(subject.period_load);
                    load.subject_labels.push(format!("{} ({})", subject.name, section.name));
                }
            }
        }
    }

    loads.into_values().collect()
}

/// Sum of a Teacher's per-shift totals
pub fn shift_grand_totals(loads: &[ShiftLoad]) -> HashMap<Uuid, i32> {
    let mut totals: HashMap<Uuid, i32> = HashMap::new();
    for load in loads {
        let total = totals.entry(load.teacher_id).or_default();
        *total = total.saturating_add(load.total_periods);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CurriculumTemplate, Section, Subject, Teacher};
    use crate::services::graph::GraphRows;

    struct Fixture {
        owner: Uuid,
        rows: GraphRows,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                owner: Uuid::new_v4(),
                rows: GraphRows::default(),
            }
        }

        fn teacher(&mut self, name: &str, rt_hours: i32) -> Uuid {
            let teacher = Teacher::new(self.owner, name, rt_hours, None);
            let id = teacher.id;
            self.rows.teachers.push(teacher);
            id
        }

        fn template(&mut self, shift: Shift) -> Uuid {
            let template = CurriculumTemplate::new(self.owner, "Regular", 40, shift);
            let id = template.id;
            self.rows.templates.push(template);
            id
        }

        fn section(&mut self, name: &str, template_id: Uuid) -> Uuid {
            let section = Section::new(self.owner, name, template_id);
            let id = section.id;
            self.rows.sections.push(section);
            id
        }

        fn subject(&mut self, name: &str, load: i32, teachers: &[Uuid], sections: &[Uuid]) -> Uuid {
            let subject = Subject::new(self.owner, name, load);
            let id = subject.id;
            self.rows.subjects.push(subject);
            self.rows.subject_teachers.extend(teachers.iter().map(|t| (id, *t)));
            self.rows.subject_sections.extend(sections.iter().map(|s| (id, *s)));
            id
        }

        fn graph(self) -> TenantGraph {
            TenantGraph::from_rows(self.rows)
        }
    }

    #[test]
    fn global_total_counts_each_subject_once() {
        let mut fx = Fixture::new();
        let ana = fx.teacher("Ana", 30);
        let morning = fx.template(Shift::Morning);
        let (a, b) = (fx.section("6A", morning), fx.section("6B", morning));
        fx.subject("History", 4, &[ana], &[a, b]);
        fx.subject("Geography", 3, &[ana], &[]);

        assert_eq!(global_total(&fx.graph(), ana), 7);
    }

    #[test]
    fn same_shift_sections_count_a_subject_once() {
        let mut fx = Fixture::new();
        let ana = fx.teacher("Ana", 30);
        let first = fx.template(Shift::Morning);
        let second = fx.template(Shift::Morning);
        let (a, b) = (fx.section("6A", first), fx.section("7A", second));
        fx.subject("Math", 5, &[ana], &[a, b]);

        let loads = shift_distribution(&fx.graph());
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].shift, Shift::Morning);
        assert_eq!(loads[0].total_periods, 5);
        assert_eq!(loads[0].subject_labels, vec!["Math (6A)".to_string()]);
    }

    #[test]
    fn shift_grand_total_diverges_from_global_total_across_shifts() {
        let mut fx = Fixture::new();
        let ana = fx.teacher("Ana", 30);
        let morning = fx.template(Shift::Morning);
        let night = fx.template(Shift::Night);
        let (a, b) = (fx.section("6A", morning), fx.section("EJA", night));
        fx.subject("Math", 5, &[ana], &[a, b]);
        let graph = fx.graph();

        let loads = shift_distribution(&graph);
        let shifts: Vec<Shift> = loads.iter().map(|l| l.shift).collect();
        assert_eq!(shifts, vec![Shift::Morning, Shift::Night]);
        assert_eq!(shift_grand_totals(&loads)[&ana], 10);
        assert_eq!(global_total(&graph, ana), 5);
    }

    #[test]
    fn oversized_stored_loads_pin_totals_instead_of_overflowing() {
        let mut fx = Fixture::new();
        let ana = fx.teacher("Ana", 40);
        let morning = fx.template(Shift::Morning);
        let night = fx.template(Shift::Night);
        let (a, b) = (fx.section("6A", morning), fx.section("EJA", night));
        fx.subject("Math", 1_500_000_000, &[ana], &[a, b]);
        fx.subject("Physics", 1_500_000_000, &[ana], &[a]);
        let graph = fx.graph();

        assert_eq!(global_total(&graph, ana), i32::MAX);
        let loads = shift_distribution(&graph);
        assert_eq!(loads[0].total_periods, i32::MAX);
        assert_eq!(shift_grand_totals(&loads)[&ana], i32::MAX);
    }

    #[test]
    fn subjects_without_sections_do_not_reach_any_shift() {
        let mut fx = Fixture::new();
        let ana = fx.teacher("Ana", 20);
        fx.template(Shift::Full);
        fx.subject("Art", 2, &[ana], &[]);

        assert!(shift_distribution(&fx.graph()).is_empty());
    }
}
