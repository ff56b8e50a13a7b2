mod common;

use anyhow::Result;
use staffing_api::services::StaffingError;
use staffing_api::types::{Relation, Shift};

#[tokio::test]
async fn attach_over_capacity_is_rejected_without_mutation() -> Result<()> {
    let service = common::service();
    let caller = common::caller();
    let template = common::template(&service, &caller, 40, Shift::Morning).await?;
    let section = common::section(&service, &caller, "6A", template.id).await?;

    for (name, load) in [("Math", 20), ("History", 15)] {
        let subject = common::subject(&service, &caller, name, load).await?;
        service.attach_subject(&caller, subject.id, section.id).await?;
    }
    let art = common::subject(&service, &caller, "Art", 10).await?;

    let err = service.attach_subject(&caller, art.id, section.id).await.unwrap_err();
    match err {
        StaffingError::CapacityExceeded {
            attached_total,
            requested_total,
            capacity,
            ..
        } => {
            assert_eq!(attached_total, 35);
            assert_eq!(requested_total, 45);
            assert_eq!(capacity, 40);
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }

    let attached = service
        .stores()
        .relations
        .left_of(Relation::SubjectSection, section.id)
        .await?;
    assert_eq!(attached.len(), 2);
    assert!(!attached.contains(&art.id));

    // a subject that still fits is accepted
    let music = common::subject(&service, &caller, "Music", 5).await?;
    let outcome = service.attach_subject(&caller, music.id, section.id).await?;
    assert_eq!(outcome.attached_total, 40);
    Ok(())
}

#[tokio::test]
async fn reattaching_is_an_idempotent_no_op() -> Result<()> {
    let service = common::service();
    let caller = common::caller();
    let template = common::template(&service, &caller, 40, Shift::Full).await?;
    let section = common::section(&service, &caller, "6A", template.id).await?;
    let subject = common::subject(&service, &caller, "Math", 35).await?;

    let first = service.attach_subject(&caller, subject.id, section.id).await?;
    assert!(!first.already_attached);
    assert_eq!(first.attached_total, 35);

    let second = service.attach_subject(&caller, subject.id, section.id).await?;
    assert!(second.already_attached);
    assert_eq!(second.attached_total, 35);

    let attached = service
        .stores()
        .relations
        .left_of(Relation::SubjectSection, section.id)
        .await?;
    assert_eq!(attached, vec![subject.id]);
    Ok(())
}

#[tokio::test]
async fn detach_updates_both_sides_and_tolerates_missing_edges() -> Result<()> {
    let service = common::service();
    let caller = common::caller();
    let template = common::template(&service, &caller, 10, Shift::Night).await?;
    let section = common::section(&service, &caller, "EJA", template.id).await?;
    let subject = common::subject(&service, &caller, "Math", 4).await?;

    service.attach_subject(&caller, subject.id, section.id).await?;
    assert!(service.detach_subject(&caller, subject.id, section.id).await?.changed);
    assert!(!service.detach_subject(&caller, subject.id, section.id).await?.changed);

    let relations = &service.stores().relations;
    assert!(relations.left_of(Relation::SubjectSection, section.id).await?.is_empty());
    assert!(relations.right_of(Relation::SubjectSection, subject.id).await?.is_empty());
    Ok(())
}
