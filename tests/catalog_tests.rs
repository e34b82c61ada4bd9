//! Artifact catalog behavior: creation, ownership, filtering, visibility,
//! downloads, and review aggregation.

mod common;

use common::{new_artifact, Harness};
use model_foundry_backend::store::{ArtifactFilter, ArtifactUpdate, PublishUpdate};
use model_foundry_backend::AppError;

#[tokio::test]
async fn duplicate_id_fails_and_first_record_is_unchanged() {
    let h = Harness::new().await;
    h.register("alice").await;

    let first = h.models.create("alice", new_artifact("m1")).await.unwrap();

    let mut clash = new_artifact("m1");
    clash.name = "impostor".into();
    let err = h.models.create("alice", clash).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    let stored = h.models.get("m1").await.unwrap();
    assert_eq!(stored.name, first.name);
    assert_eq!(stored.created_at, first.created_at);
}

#[tokio::test]
async fn ids_are_scoped_per_kind() {
    let h = Harness::new().await;
    h.register("alice").await;

    h.models.create("alice", new_artifact("shared")).await.unwrap();
    // Same id in the agent catalog is a different record
    h.agents.create("alice", new_artifact("shared")).await.unwrap();
}

#[tokio::test]
async fn unknown_creator_is_rejected() {
    let h = Harness::new().await;

    let err = h.models.create("ghost", new_artifact("m1")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn new_artifact_has_zeroed_counters_and_defaults() {
    let h = Harness::new().await;
    h.register("alice").await;

    let artifact = h.models.create("alice", new_artifact("m1")).await.unwrap();
    assert_eq!(artifact.downloads, 0);
    assert_eq!(artifact.rating, 0.0);
    assert!(artifact.reviews.is_empty());
    assert!(!artifact.public);
    assert_eq!(artifact.version, "1.0.0");
    assert_eq!(artifact.price, "Free");
}

#[tokio::test]
async fn only_the_creator_may_mutate() {
    let h = Harness::new().await;
    h.register("alice").await;
    h.register("bob").await;

    h.models.create("alice", new_artifact("m1")).await.unwrap();

    let changes = ArtifactUpdate {
        name: "renamed".into(),
        description: "new".into(),
        artifact_type: "llm".into(),
        tags: vec![],
        price: "Free".into(),
        public: false,
        integration: None,
        required_models: vec![],
    };

    let err = h
        .models
        .update("m1", "bob", changes.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "got {err:?}");

    let err = h.models.delete("m1", "bob").await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "got {err:?}");

    let err = h
        .models
        .publish(
            "m1",
            "bob",
            PublishUpdate {
                public: true,
                apple_store_url: None,
                google_play_url: None,
                custom_payment_url: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "got {err:?}");

    // The owner succeeds and the change is visible immediately
    let updated = h.models.update("m1", "alice", changes).await.unwrap();
    assert_eq!(updated.name, "renamed");
    assert_eq!(h.models.get("m1").await.unwrap().name, "renamed");
}

#[tokio::test]
async fn update_leaves_immutable_fields_alone() {
    let h = Harness::new().await;
    h.register("alice").await;

    let created = h.models.create("alice", new_artifact("m1")).await.unwrap();
    h.models.record_download("m1").await.unwrap();
    h.models.add_review("m1", "alice", 4.0, "solid").await.unwrap();

    let updated = h
        .models
        .update(
            "m1",
            "alice",
            ArtifactUpdate {
                name: "v2".into(),
                description: "v2".into(),
                artifact_type: "vision".into(),
                tags: vec!["cv".into()],
                price: "$5".into(),
                public: true,
                integration: Some("openai".into()),
                required_models: vec![],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.creator, "alice");
    assert_eq!(updated.version, created.version);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.downloads, 1);
    assert_eq!(updated.rating, 4.0);
    assert_eq!(updated.reviews.len(), 1);
}

#[tokio::test]
async fn tag_filter_requires_all_tags() {
    let h = Harness::new().await;
    h.register("alice").await;

    let mut both = new_artifact("both");
    both.tags = vec!["a".into(), "b".into()];
    h.models.create("alice", both).await.unwrap();

    let mut only_a = new_artifact("only-a");
    only_a.tags = vec!["a".into()];
    h.models.create("alice", only_a).await.unwrap();

    let filter = ArtifactFilter {
        tags: Some(vec!["a".into(), "b".into()]),
        ..Default::default()
    };
    let found = h.models.list(filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "both");
}

#[tokio::test]
async fn list_public_never_returns_private_artifacts() {
    let h = Harness::new().await;
    h.register("alice").await;

    h.models.create("alice", new_artifact("m1")).await.unwrap();

    let toggle = |public| PublishUpdate {
        public,
        apple_store_url: None,
        google_play_url: None,
        custom_payment_url: None,
    };

    // Toggle visibility a few times; the listing must always agree with the
    // final state.
    h.models.publish("m1", "alice", toggle(true)).await.unwrap();
    h.models.publish("m1", "alice", toggle(false)).await.unwrap();
    h.models.publish("m1", "alice", toggle(true)).await.unwrap();
    h.models.publish("m1", "alice", toggle(false)).await.unwrap();

    let public = h.models.list_public().await.unwrap();
    assert!(public.iter().all(|a| a.public));
    assert!(public.is_empty());
}

#[tokio::test]
async fn publish_updates_only_provided_urls() {
    let h = Harness::new().await;
    h.register("alice").await;

    let mut req = new_artifact("m1");
    req.apple_store_url = Some("https://apple.example/m1".into());
    h.models.create("alice", req).await.unwrap();

    let updated = h
        .models
        .publish(
            "m1",
            "alice",
            PublishUpdate {
                public: true,
                apple_store_url: None,
                google_play_url: Some("https://play.example/m1".into()),
                custom_payment_url: None,
            },
        )
        .await
        .unwrap();

    assert!(updated.public);
    // Omitted field kept its previous value
    assert_eq!(updated.apple_store_url.as_deref(), Some("https://apple.example/m1"));
    assert_eq!(updated.google_play_url.as_deref(), Some("https://play.example/m1"));
    assert_eq!(updated.custom_payment_url, None);
}

#[tokio::test]
async fn rating_is_the_mean_regardless_of_append_order() {
    let h = Harness::new().await;
    h.register("alice").await;

    h.models.create("alice", new_artifact("x")).await.unwrap();
    h.models.create("alice", new_artifact("y")).await.unwrap();

    for rating in [5.0, 3.0, 4.0] {
        h.models.add_review("x", "alice", rating, "").await.unwrap();
    }
    for rating in [4.0, 5.0, 3.0] {
        h.models.add_review("y", "alice", rating, "").await.unwrap();
    }

    let x = h.models.get("x").await.unwrap();
    let y = h.models.get("y").await.unwrap();
    assert_eq!(x.rating, 4.0);
    assert_eq!(x.rating, y.rating);
    assert_eq!(x.reviews.len(), 3);
}

#[tokio::test]
async fn download_counter_is_monotonic_and_open_to_anyone() {
    let h = Harness::new().await;
    h.register("alice").await;

    h.models.create("alice", new_artifact("m1")).await.unwrap();
    assert_eq!(h.models.record_download("m1").await.unwrap(), 1);
    assert_eq!(h.models.record_download("m1").await.unwrap(), 2);
    assert_eq!(h.models.get("m1").await.unwrap().downloads, 2);

    let err = h.models.record_download("missing").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn delete_removes_the_record() {
    let h = Harness::new().await;
    h.register("alice").await;

    h.models.create("alice", new_artifact("m1")).await.unwrap();
    h.models.delete("m1", "alice").await.unwrap();

    let err = h.models.get("m1").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn models_never_carry_model_references() {
    let h = Harness::new().await;
    h.register("alice").await;

    let mut req = new_artifact("m1");
    req.required_models = vec!["other-model".into()];
    let model = h.models.create("alice", req).await.unwrap();
    assert!(model.required_models.is_empty());

    // The field is discarded on update too
    let updated = h
        .models
        .update(
            "m1",
            "alice",
            ArtifactUpdate {
                name: "m1".into(),
                description: String::new(),
                artifact_type: "llm".into(),
                tags: vec![],
                price: "Free".into(),
                public: false,
                integration: None,
                required_models: vec!["other-model".into()],
            },
        )
        .await
        .unwrap();
    assert!(updated.required_models.is_empty());
}

#[tokio::test]
async fn agents_carry_unvalidated_model_references() {
    let h = Harness::new().await;
    h.register("alice").await;

    let mut req = new_artifact("a1");
    req.required_models = vec!["nonexistent-model".into()];
    let agent = h.agents.create("alice", req).await.unwrap();
    assert_eq!(agent.required_models, vec!["nonexistent-model".to_string()]);
}

#[tokio::test]
async fn publish_lifecycle_end_to_end() {
    let h = Harness::new().await;
    h.register("dev1").await;

    let created = h.models.create("dev1", new_artifact("m1")).await.unwrap();
    assert!(h.models.list_public().await.unwrap().is_empty());

    h.models
        .publish(
            "m1",
            "dev1",
            PublishUpdate {
                public: true,
                apple_store_url: None,
                google_play_url: None,
                custom_payment_url: None,
            },
        )
        .await
        .unwrap();

    let public = h.models.list_public().await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].id, "m1");
    assert_eq!(public[0].name, created.name);
    assert_eq!(public[0].description, created.description);

    h.models.record_download("m1").await.unwrap();
    h.models.record_download("m1").await.unwrap();
    assert_eq!(h.models.get("m1").await.unwrap().downloads, 2);
}
