//! Project behavior: owner scoping, field replacement, and membership sets.

mod common;

use common::{new_artifact, Harness};
use model_foundry_backend::models::artifact::ArtifactKind;
use model_foundry_backend::services::project_service::ProjectFields;
use model_foundry_backend::AppError;

fn fields(name: &str) -> ProjectFields {
    ProjectFields {
        name: name.to_string(),
        description: format!("{name} description"),
        storage_space_required: "1GB".to_string(),
    }
}

#[tokio::test]
async fn project_ids_are_server_generated_and_unique() {
    let h = Harness::new().await;

    // Same owner, same instant: ids must still differ
    let a = h.projects.create("alice", fields("p")).await.unwrap();
    let b = h.projects.create("alice", fields("p")).await.unwrap();
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn projects_are_invisible_across_owners() {
    let h = Harness::new().await;

    let project = h.projects.create("alice", fields("p1")).await.unwrap();

    // Existing-but-foreign reads as NotFound, not Forbidden
    let err = h.projects.get(&project.id, "bob").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    assert!(h.projects.list("bob").await.unwrap().is_empty());
    assert_eq!(h.projects.list("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_replaces_fields_and_bumps_updated_at() {
    let h = Harness::new().await;

    let created = h.projects.create("alice", fields("p1")).await.unwrap();
    let updated = h
        .projects
        .update(&created.id, "alice", fields("renamed"))
        .await
        .unwrap();

    assert_eq!(updated.name, "renamed");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let err = h
        .projects
        .update(&created.id, "bob", fields("hijack"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn delete_is_owner_scoped() {
    let h = Harness::new().await;

    let project = h.projects.create("alice", fields("p1")).await.unwrap();

    let err = h.projects.delete(&project.id, "bob").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    h.projects.delete(&project.id, "alice").await.unwrap();
    let err = h.projects.get(&project.id, "alice").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn membership_round_trip_restores_the_original_state() {
    let h = Harness::new().await;
    h.register("alice").await;

    h.models.create("alice", new_artifact("m1")).await.unwrap();
    let project = h.projects.create("alice", fields("p1")).await.unwrap();

    let added = h
        .projects
        .add_member(&project.id, "alice", ArtifactKind::Model, "m1")
        .await
        .unwrap();
    assert_eq!(added.models, vec!["m1".to_string()]);

    let removed = h
        .projects
        .remove_member(&project.id, "alice", ArtifactKind::Model, "m1")
        .await
        .unwrap();
    assert_eq!(removed.models, project.models);

    // Second removal of the now-absent member fails
    let err = h
        .projects
        .remove_member(&project.id, "alice", ArtifactKind::Model, "m1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn duplicate_membership_fails() {
    let h = Harness::new().await;
    h.register("alice").await;

    h.agents.create("alice", new_artifact("a1")).await.unwrap();
    let project = h.projects.create("alice", fields("p1")).await.unwrap();

    h.projects
        .add_member(&project.id, "alice", ArtifactKind::Agent, "a1")
        .await
        .unwrap();
    let err = h
        .projects
        .add_member(&project.id, "alice", ArtifactKind::Agent, "a1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn members_must_exist_in_their_catalog() {
    let h = Harness::new().await;

    let project = h.projects.create("alice", fields("p1")).await.unwrap();
    let err = h
        .projects
        .add_member(&project.id, "alice", ArtifactKind::Model, "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn members_need_not_be_owned_by_the_project_owner() {
    let h = Harness::new().await;
    h.register("alice").await;
    h.register("bob").await;

    // bob publishes a model; alice may still reference it from her project
    h.models.create("bob", new_artifact("m1")).await.unwrap();
    let project = h.projects.create("alice", fields("p1")).await.unwrap();

    let updated = h
        .projects
        .add_member(&project.id, "alice", ArtifactKind::Model, "m1")
        .await
        .unwrap();
    assert_eq!(updated.models, vec!["m1".to_string()]);
}

#[tokio::test]
async fn deleting_an_artifact_leaves_dangling_references() {
    let h = Harness::new().await;
    h.register("alice").await;

    h.models.create("alice", new_artifact("m1")).await.unwrap();
    let project = h.projects.create("alice", fields("p1")).await.unwrap();
    h.projects
        .add_member(&project.id, "alice", ArtifactKind::Model, "m1")
        .await
        .unwrap();

    // No cascade: membership keeps the id after the model is gone
    h.models.delete("m1", "alice").await.unwrap();
    let stale = h.projects.get(&project.id, "alice").await.unwrap();
    assert_eq!(stale.models, vec!["m1".to_string()]);
}
