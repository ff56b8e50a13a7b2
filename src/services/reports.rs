//! Report generators. Each one is a pure function of a [`TenantGraph`]
//! snapshot and returns typed rows.

use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::services::aggregation::{global_total, shift_distribution, shift_grand_totals};
use crate::services::graph::TenantGraph;
use crate::services::workload::{max_periods, remaining_periods};
use crate::types::Shift;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverloadRow {
    pub id: Uuid,
    pub name: String,
    pub rt_hours: i32,
    pub max_periods: i32,
    pub total_periods: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherSummaryRow {
    pub name: String,
    pub rt_hours: i32,
    pub total_periods: i32,
    pub max_periods: i32,
    pub remaining: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub template_id: Uuid,
    pub category: String,
    pub teacher_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub template_id: Uuid,
    pub category: String,
    pub section: String,
    pub subject: String,
    pub teacher_names: Vec<String>,
    pub period_load: i32,
    pub shift: Shift,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftDistributionRow {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub shift: Shift,
    pub total_periods: i32,
    pub max_periods: i32,
    pub subject_labels: Vec<String>,
    pub periods_free_in_shift: i32,
    /// Budget left after the sum of every per-shift total of this teacher
    pub periods_free_global: i32,
}

/// Entity counts for one owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TenantStatistics {
    pub teachers: i64,
    pub curriculum_templates: i64,
    pub sections: i64,
    pub subjects: i64,
}

/// Teachers whose global total is above their budget
pub fn overload_report(graph: &TenantGraph) -> Vec<OverloadRow> {
    graph
        .teachers
        .iter()
        .filter_map(|teacher| {
            let max = max_periods(teacher.rt_hours);
            let total = global_total(graph, teacher.id);
            (total > max).then(|| OverloadRow {
                id: teacher.id,
                name: teacher.name.clone(),
                rt_hours: teacher.rt_hours,
                max_periods: max,
                total_periods: total,
            })
        })
        .collect()
}

pub fn teacher_summary_report(graph: &TenantGraph) -> Vec<TeacherSummaryRow> {
    graph
        .teachers
        .iter()
        .map(|teacher| {
            let max = max_periods(teacher.rt_hours);
            let total = global_total(graph, teacher.id);
            TeacherSummaryRow {
                name: teacher.name.clone(),
                rt_hours: teacher.rt_hours,
                total_periods: total,
                max_periods: max,
                remaining: remaining_periods(max, total),
            }
        })
        .collect()
}

/// Teachers per template, reached through sections and subjects or through
/// direct membership. Names are deduplicated by name and sorted.
pub fn roster_report(graph: &TenantGraph) -> Vec<RosterRow> {
    graph
        .templates
        .iter()
        .map(|template| {
            let mut names: BTreeSet<&str> = BTreeSet::new();
            for section in graph.sections_of(template.id) {
                for subject in graph.subjects_of_section(section.id) {
                    names.extend(graph.teachers_of_subject(subject.id).into_iter().map(|t| t.name.as_str()));
                }
            }
            names.extend(graph.members_of_template(template.id).into_iter().map(|t| t.name.as_str()));

            RosterRow {
                template_id: template.id,
                category: template.category.clone(),
                teacher_names: names.into_iter().map(str::to_string).collect(),
            }
        })
        .collect()
}

/// One row per (template, section, subject)
pub fn detail_report(graph: &TenantGraph) -> Vec<DetailRow> {
    let mut rows = Vec::new();
    for template in graph.templates.iter() {
        for section in graph.sections_of(template.id) {
            for subject in graph.subjects_of_section(section.id) {
                rows.push(DetailRow {
                    template_id: template.id,
                    category: template.category.clone(),
                    section: section.name.clone(),
                    subject: subject.name.clone(),
                    teacher_names: graph
                        .teachers_of_subject(subject.id)
                        .iter()
                        .map(|t| t.name.clone())
                        .collect(),
                    period_load: subject.period_load,
                    shift: template.shift,
                });
            }
        }
    }
    rows
}

pub fn shift_distribution_report(graph: &TenantGraph) -> Vec<ShiftDistributionRow> {
    let loads = shift_distribution(graph);
    let grand_totals = shift_grand_totals(&loads);

    loads
        .into_iter()
        .filter_map(|load| {
            let teacher = graph.teachers.get(load.teacher_id)?;
            let max = max_periods(teacher.rt_hours);
            let grand_total = grand_totals.get(&teacher.id).copied().unwrap_or_default();
            Some(ShiftDistributionRow {
                teacher_id: teacher.id,
                teacher_name: teacher.name.clone(),
                shift: load.shift,
                total_periods: load.total_periods,
                max_periods: max,
                periods_free_in_shift: remaining_periods(max, load.total_periods),
                periods_free_global: remaining_periods(max, grand_total),
                subject_labels: load.subject_labels,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CurriculumTemplate, Section, Subject, Teacher};
    use crate::services::graph::GraphRows;

    fn scenario() -> (GraphRows, [Uuid; 3]) {
        let owner = Uuid::new_v4();
        let ana = Teacher::new(owner, "Ana", 30, None);
        let bea = Teacher::new(owner, "Bea", 40, None);
        let other_bea = Teacher::new(owner, "Bea", 20, None);
        let morning = CurriculumTemplate::new(owner, "Regular", 40, Shift::Morning);
        let night = CurriculumTemplate::new(owner, "EJA", 30, Shift::Night);
        let six_a = Section::new(owner, "6A", morning.id);
        let eja = Section::new(owner, "EJA-1", night.id);
        let math = Subject::new(owner, "Math", 25);
        let history = Subject::new(owner, "History", 15);
        let art = Subject::new(owner, "Art", 2);

        let ids = [ana.id, bea.id, other_bea.id];
        let rows = GraphRows {
            subject_teachers: vec![
                (math.id, ana.id),
                (history.id, ana.id),
                (art.id, bea.id),
                (art.id, other_bea.id),
            ],
            subject_sections: vec![(math.id, six_a.id), (history.id, eja.id), (art.id, six_a.id)],
            teacher_templates: vec![(bea.id, night.id)],
            teachers: vec![ana, bea, other_bea],
            templates: vec![morning, night],
            sections: vec![six_a, eja],
            subjects: vec![math, history, art],
        };
        (rows, ids)
    }

    #[test]
    fn overload_lists_only_teachers_above_budget() {
        let (rows, [ana, ..]) = scenario();
        let report = overload_report(&TenantGraph::from_rows(rows));

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].id, ana);
        assert_eq!(report[0].max_periods, 24);
        assert_eq!(report[0].total_periods, 40);
    }

    #[test]
    fn summary_covers_every_teacher_and_floors_remaining() {
        let (rows, _) = scenario();
        let report = teacher_summary_report(&TenantGraph::from_rows(rows));

        assert_eq!(report.len(), 3);
        assert_eq!(report[0].remaining, 0);
        assert_eq!(report[1].total_periods, 2);
        assert_eq!(report[1].remaining, 30);
    }

    #[test]
    fn roster_merges_membership_and_collapses_same_names() {
        let (rows, _) = scenario();
        let report = roster_report(&TenantGraph::from_rows(rows));

        assert_eq!(report[0].category, "Regular");
        assert_eq!(report[0].teacher_names, vec!["Ana", "Bea"]);
        assert_eq!(report[1].teacher_names, vec!["Ana", "Bea"]);
    }

    #[test]
    fn detail_has_one_row_per_template_section_subject() {
        let (rows, _) = scenario();
        let report = detail_report(&TenantGraph::from_rows(rows));

        let triples: Vec<(&str, &str)> = report
            .iter()
            .map(|row| (row.section.as_str(), row.subject.as_str()))
            .collect();
        assert_eq!(triples, vec![("6A", "Math"), ("6A", "Art"), ("EJA-1", "History")]);
        assert_eq!(report[1].teacher_names, vec!["Bea", "Bea"]);
        assert_eq!(report[2].shift, Shift::Night);
    }

    #[test]
    fn shift_rows_use_grand_total_for_global_remaining() {
        let (rows, [ana, ..]) = scenario();
        let report = shift_distribution_report(&TenantGraph::from_rows(rows));

        let ana_rows: Vec<_> = report.iter().filter(|row| row.teacher_id == ana).collect();
        assert_eq!(ana_rows.len(), 2);
        assert_eq!(ana_rows[0].shift, Shift::Morning);
        assert_eq!(ana_rows[0].total_periods, 25);
        assert_eq!(ana_rows[0].periods_free_in_shift, 0);
        assert_eq!(ana_rows[1].subject_labels, vec!["History (EJA-1)".to_string()]);
        assert_eq!(ana_rows[1].periods_free_in_shift, 9);
        assert_eq!(ana_rows[1].periods_free_global, 0);
    }
}
