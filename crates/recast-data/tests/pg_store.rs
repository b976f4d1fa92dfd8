//! Postgres-backed round-trip tests for the data layer.
//!
//! These tests spin up a disposable Postgres instance (or reuse the one
//! named by `RECAST_TEST_DATABASE_URL`) and skip quietly when neither is
//! available.

use chrono::Utc;
use recast_core::model::{
    MatchingRules, OutputPreset, OutputTarget, ProcessingStage, Recording, RecordingTemplate,
};
use recast_core::service::{
    PresetStore, RecordingStore, RematchScope, TemplateStore, UserConfigStore,
};
use recast_data::PgStore;
use recast_events::{ProcessingStatus, StageStatus, StageType, TargetStatus, TargetType};
use recast_test_support::fixtures::postgres_available;
use recast_test_support::postgres::{TestDatabase, start_postgres};
use serde_json::json;
use uuid::Uuid;

async fn connect() -> Option<(TestDatabase, PgStore)> {
    if !postgres_available() {
        eprintln!("skipping: postgres is not available");
        return None;
    }
    let database = match start_postgres() {
        Ok(database) => database,
        Err(error) => {
            eprintln!("skipping: failed to start postgres: {error}");
            return None;
        }
    };
    let store = PgStore::connect(database.connection_string())
        .await
        .expect("connect to test database");
    Some((database, store))
}

fn recording(user_id: Uuid, name: &str, status: ProcessingStatus) -> Recording {
    let now = Utc::now();
    Recording {
        id: Uuid::new_v4(),
        user_id,
        source_id: None,
        template_id: None,
        display_name: name.into(),
        status,
        is_mapped: false,
        processing_preferences: None,
        stages: Vec::new(),
        targets: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn template(user_id: Uuid, name: &str) -> RecordingTemplate {
    let now = Utc::now();
    RecordingTemplate {
        id: Uuid::new_v4(),
        user_id,
        name: name.into(),
        matching_rules: Some(MatchingRules {
            patterns: vec!["Standup *".into()],
            ..MatchingRules::default()
        }),
        processing_config: Some(json!({"transcription": {"enabled": true}})),
        metadata_config: None,
        output_config: None,
        is_active: true,
        is_draft: false,
        priority: 0,
        match_count: 0,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn recordings_round_trip_with_children() {
    let Some((_database, store)) = connect().await else {
        return;
    };
    let user_id = Uuid::new_v4();

    let mut rec = recording(user_id, "Standup 2026-08-06", ProcessingStatus::Initialized);
    rec.processing_preferences = Some(json!({"quality": "1080p"}));
    store.insert_recording(&rec).await.expect("insert recording");

    let stage = ProcessingStage::pending(rec.id, StageType::Transcribe, json!({"provider": "whisper"}));
    store.insert_stages(&[stage]).await.expect("insert stage");
    let target = OutputTarget::not_uploaded(rec.id, TargetType::Youtube, None);
    store.insert_targets(&[target]).await.expect("insert target");

    let loaded = store
        .get_with_children(rec.id)
        .await
        .expect("fetch recording")
        .expect("recording exists");
    assert_eq!(loaded.display_name, "Standup 2026-08-06");
    assert_eq!(loaded.status, ProcessingStatus::Initialized);
    assert_eq!(loaded.processing_preferences, Some(json!({"quality": "1080p"})));
    assert_eq!(loaded.stages.len(), 1);
    assert_eq!(loaded.stages[0].stage_type, StageType::Transcribe);
    assert_eq!(loaded.stages[0].metadata, json!({"provider": "whisper"}));
    assert_eq!(loaded.targets.len(), 1);
    assert_eq!(loaded.targets[0].status, TargetStatus::NotUploaded);

    // Stage failures bump the retry counter; completions do not.
    store
        .update_stage_status(rec.id, StageType::Transcribe, StageStatus::Failed, Some("oom"))
        .await
        .expect("fail stage");
    store
        .update_stage_status(rec.id, StageType::Transcribe, StageStatus::Completed, None)
        .await
        .expect("complete stage");
    let loaded = store
        .get_with_children(rec.id)
        .await
        .expect("fetch recording")
        .expect("recording exists");
    assert_eq!(loaded.stages[0].status, StageStatus::Completed);
    assert_eq!(loaded.stages[0].retry_count, 1);
    assert_eq!(loaded.stages[0].failure_reason, None);

    store
        .update_target_status(rec.id, TargetType::Youtube, TargetStatus::Uploaded, None)
        .await
        .expect("upload target");
    store
        .update_status(rec.id, ProcessingStatus::Ready)
        .await
        .expect("update status");
    let loaded = store
        .get_with_children(rec.id)
        .await
        .expect("fetch recording")
        .expect("recording exists");
    assert_eq!(loaded.targets[0].status, TargetStatus::Uploaded);
    assert_eq!(loaded.status, ProcessingStatus::Ready);
}

#[tokio::test]
async fn template_linkage_and_unmapped_listing() {
    let Some((_database, store)) = connect().await else {
        return;
    };
    let user_id = Uuid::new_v4();

    let tpl = template(user_id, "standup template");
    store.insert_template(&tpl).await.expect("insert template");
    let mut draft = template(user_id, "draft template");
    draft.is_draft = true;
    store.insert_template(&draft).await.expect("insert draft");

    let active = store
        .active_for_user(user_id)
        .await
        .expect("list templates");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, tpl.id);
    assert_eq!(
        active[0].matching_rules.as_ref().map(|r| r.patterns.clone()),
        Some(vec!["Standup *".to_string()])
    );

    let skipped = recording(user_id, "Standup A", ProcessingStatus::Skipped);
    let expired = recording(user_id, "Standup B", ProcessingStatus::Expired);
    store.insert_recording(&skipped).await.expect("insert");
    store.insert_recording(&expired).await.expect("insert");

    let page = store
        .list_unmapped(user_id, RematchScope::SkippedOnly, 10, 0)
        .await
        .expect("list skipped");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, skipped.id);

    let page = store
        .list_unmapped(user_id, RematchScope::AllUnmapped, 10, 0)
        .await
        .expect("list all");
    assert_eq!(page.len(), 2);

    store
        .assign_template(skipped.id, tpl.id)
        .await
        .expect("assign template");
    store.record_match(tpl.id).await.expect("record match");

    let assigned = store
        .get_with_children(skipped.id)
        .await
        .expect("fetch")
        .expect("exists");
    assert!(assigned.is_mapped);
    assert_eq!(assigned.template_id, Some(tpl.id));
    assert_eq!(assigned.status, ProcessingStatus::Initialized);
    let counted = store
        .get(tpl.id)
        .await
        .expect("fetch template")
        .expect("template exists");
    assert_eq!(counted.match_count, 1);

    // Deleting the template releases the recording but keeps its status.
    let released = store.clear_template(tpl.id).await.expect("clear template");
    assert_eq!(released, vec![skipped.id]);
    let freed = store
        .get_with_children(skipped.id)
        .await
        .expect("fetch")
        .expect("exists");
    assert!(!freed.is_mapped);
    assert_eq!(freed.template_id, None);
    assert_eq!(freed.status, ProcessingStatus::Initialized);
}

#[tokio::test]
async fn user_configs_and_presets_are_owner_scoped() {
    let Some((_database, store)) = connect().await else {
        return;
    };
    let user_id = Uuid::new_v4();

    assert_eq!(
        store.config_for_user(user_id).await.expect("fetch config"),
        None
    );
    store
        .upsert_user_config(user_id, &json!({"processing": {"quality": "720p"}}))
        .await
        .expect("upsert config");
    store
        .upsert_user_config(user_id, &json!({"processing": {"quality": "1080p"}}))
        .await
        .expect("upsert config again");
    assert_eq!(
        store.config_for_user(user_id).await.expect("fetch config"),
        Some(json!({"processing": {"quality": "1080p"}}))
    );

    let now = Utc::now();
    let preset = OutputPreset {
        id: Uuid::new_v4(),
        user_id,
        name: "youtube default".into(),
        platform: TargetType::Youtube,
        metadata: json!({"privacy": "unlisted"}),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    store.insert_preset(&preset).await.expect("insert preset");
    let mut inactive = preset.clone();
    inactive.id = Uuid::new_v4();
    inactive.is_active = false;
    store.insert_preset(&inactive).await.expect("insert inactive");

    let found = store
        .preset_for_user(preset.id, user_id)
        .await
        .expect("fetch preset");
    assert_eq!(found.map(|p| p.platform), Some(TargetType::Youtube));

    // Inactive and foreign presets are invisible.
    assert!(
        store
            .preset_for_user(inactive.id, user_id)
            .await
            .expect("fetch inactive")
            .is_none()
    );
    assert!(
        store
            .preset_for_user(preset.id, Uuid::new_v4())
            .await
            .expect("fetch foreign")
            .is_none()
    );

    let by_ids = store
        .presets_by_ids(user_id, &[preset.id, inactive.id])
        .await
        .expect("fetch by ids");
    assert_eq!(by_ids.len(), 1);
    assert_eq!(by_ids[0].id, preset.id);
}
