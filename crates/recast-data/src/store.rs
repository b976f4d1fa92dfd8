//! Postgres-backed repository implementing the core storage traits.

use recast_core::model::{
    MatchingRules, OutputPreset, OutputTarget, ProcessingStage, Recording, RecordingTemplate,
};
use recast_core::service::{
    PresetStore, RecordingStore, RematchScope, TemplateStore, UserConfigStore,
};
use recast_events::{ProcessingStatus, StageStatus, StageType, TargetStatus, TargetType};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row, types::Json};
use uuid::Uuid;

use crate::error::{DataError, Result};

/// Database-backed repository for the recording pipeline.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

fn map_query_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> DataError {
    move |source| DataError::QueryFailed { operation, source }
}

const SELECT_RECORDING_SQL: &str = r"
    SELECT id, user_id, source_id, template_id, display_name, status,
           is_mapped, processing_preferences, created_at, updated_at
    FROM recordings
    WHERE id = $1
";

const SELECT_STAGES_SQL: &str = r"
    SELECT id, recording_id, stage_type, status, failure_reason, retry_count,
           metadata, created_at, updated_at
    FROM processing_stages
    WHERE recording_id = $1
    ORDER BY created_at
";

const SELECT_TARGETS_SQL: &str = r"
    SELECT id, recording_id, target_type, status, preset_id, failure_reason,
           retry_count, created_at, updated_at
    FROM output_targets
    WHERE recording_id = $1
    ORDER BY created_at
";

const LIST_UNMAPPED_SKIPPED_SQL: &str = r"
    SELECT id, user_id, source_id, template_id, display_name, status,
           is_mapped, processing_preferences, created_at, updated_at
    FROM recordings
    WHERE user_id = $1 AND NOT is_mapped AND status = 'skipped'
    ORDER BY created_at
    LIMIT $2 OFFSET $3
";

const LIST_UNMAPPED_ALL_SQL: &str = r"
    SELECT id, user_id, source_id, template_id, display_name, status,
           is_mapped, processing_preferences, created_at, updated_at
    FROM recordings
    WHERE user_id = $1 AND NOT is_mapped
    ORDER BY created_at
    LIMIT $2 OFFSET $3
";

const ASSIGN_TEMPLATE_SQL: &str = r"
    UPDATE recordings
    SET template_id = $2, is_mapped = TRUE, status = 'initialized', updated_at = now()
    WHERE id = $1
";

const CLEAR_TEMPLATE_SQL: &str = r"
    UPDATE recordings
    SET template_id = NULL, is_mapped = FALSE, updated_at = now()
    WHERE template_id = $1
    RETURNING id
";

const UPDATE_STATUS_SQL: &str = r"
    UPDATE recordings SET status = $2, updated_at = now() WHERE id = $1
";

const INSERT_RECORDING_SQL: &str = r"
    INSERT INTO recordings (
        id, user_id, source_id, template_id, display_name, status, is_mapped,
        processing_preferences, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
";

const INSERT_STAGE_SQL: &str = r"
    INSERT INTO processing_stages (
        id, recording_id, stage_type, status, failure_reason, retry_count,
        metadata, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (recording_id, stage_type) DO NOTHING
";

const INSERT_TARGET_SQL: &str = r"
    INSERT INTO output_targets (
        id, recording_id, target_type, status, preset_id, failure_reason,
        retry_count, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (recording_id, target_type) DO NOTHING
";

const UPDATE_STAGE_STATUS_SQL: &str = r"
    UPDATE processing_stages
    SET status = $3,
        failure_reason = $4,
        retry_count = retry_count + CASE WHEN $3 = 'failed' THEN 1 ELSE 0 END,
        updated_at = now()
    WHERE recording_id = $1 AND stage_type = $2
";

const UPDATE_TARGET_STATUS_SQL: &str = r"
    UPDATE output_targets
    SET status = $3,
        failure_reason = $4,
        retry_count = retry_count + CASE WHEN $3 = 'failed' THEN 1 ELSE 0 END,
        updated_at = now()
    WHERE recording_id = $1 AND target_type = $2
";

const ACTIVE_TEMPLATES_SQL: &str = r"
    SELECT id, user_id, name, matching_rules, processing_config,
           metadata_config, output_config, is_active, is_draft, priority,
           match_count, created_at, updated_at
    FROM recording_templates
    WHERE user_id = $1 AND is_active AND NOT is_draft
    ORDER BY created_at
";

const SELECT_TEMPLATE_SQL: &str = r"
    SELECT id, user_id, name, matching_rules, processing_config,
           metadata_config, output_config, is_active, is_draft, priority,
           match_count, created_at, updated_at
    FROM recording_templates
    WHERE id = $1
";

const INSERT_TEMPLATE_SQL: &str = r"
    INSERT INTO recording_templates (
        id, user_id, name, matching_rules, processing_config, metadata_config,
        output_config, is_active, is_draft, priority, match_count, created_at,
        updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
";

const RECORD_MATCH_SQL: &str = r"
    UPDATE recording_templates
    SET match_count = match_count + 1, updated_at = now()
    WHERE id = $1
";

const SELECT_USER_CONFIG_SQL: &str = r"
    SELECT config FROM user_configs WHERE user_id = $1
";

const UPSERT_USER_CONFIG_SQL: &str = r"
    INSERT INTO user_configs (user_id, config, created_at, updated_at)
    VALUES ($1, $2, now(), now())
    ON CONFLICT (user_id) DO UPDATE
    SET config = EXCLUDED.config, updated_at = now()
";

const PRESET_FOR_USER_SQL: &str = r"
    SELECT id, user_id, name, platform, metadata, is_active, created_at, updated_at
    FROM output_presets
    WHERE id = $1 AND user_id = $2 AND is_active
";

const PRESETS_BY_IDS_SQL: &str = r"
    SELECT id, user_id, name, platform, metadata, is_active, created_at, updated_at
    FROM output_presets
    WHERE user_id = $1 AND is_active AND id = ANY($2)
    ORDER BY created_at
";

const INSERT_PRESET_SQL: &str = r"
    INSERT INTO output_presets (
        id, user_id, name, platform, metadata, is_active, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
";

impl PgStore {
    /// Establish a connection pool and ensure migrations are applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the Postgres connection cannot be established or
    /// migrations fail to run.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(map_query_err("connect"))?;
        let mut migrator = sqlx::migrate!("./migrations");
        migrator.set_ignore_missing(true);
        migrator
            .run(&pool)
            .await
            .map_err(|source| DataError::MigrationFailed { source })?;
        Ok(Self { pool })
    }

    /// Access the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a recording row (children are inserted separately).
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_recording(&self, recording: &Recording) -> Result<()> {
        sqlx::query(INSERT_RECORDING_SQL)
            .bind(recording.id)
            .bind(recording.user_id)
            .bind(recording.source_id)
            .bind(recording.template_id)
            .bind(&recording.display_name)
            .bind(recording.status.as_str())
            .bind(recording.is_mapped)
            .bind(recording.processing_preferences.as_ref().map(Json))
            .bind(recording.created_at)
            .bind(recording.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_query_err("insert_recording"))?;
        Ok(())
    }

    /// Insert a template row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_template(&self, template: &RecordingTemplate) -> Result<()> {
        sqlx::query(INSERT_TEMPLATE_SQL)
            .bind(template.id)
            .bind(template.user_id)
            .bind(&template.name)
            .bind(template.matching_rules.as_ref().map(Json))
            .bind(template.processing_config.as_ref().map(Json))
            .bind(template.metadata_config.as_ref().map(Json))
            .bind(template.output_config.as_ref().map(Json))
            .bind(template.is_active)
            .bind(template.is_draft)
            .bind(template.priority)
            .bind(template.match_count)
            .bind(template.created_at)
            .bind(template.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_query_err("insert_template"))?;
        Ok(())
    }

    /// Insert or replace a user's base configuration tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn upsert_user_config(&self, user_id: Uuid, config: &Value) -> Result<()> {
        sqlx::query(UPSERT_USER_CONFIG_SQL)
            .bind(user_id)
            .bind(Json(config))
            .execute(&self.pool)
            .await
            .map_err(map_query_err("upsert_user_config"))?;
        Ok(())
    }

    /// Insert an output preset row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_preset(&self, preset: &OutputPreset) -> Result<()> {
        sqlx::query(INSERT_PRESET_SQL)
            .bind(preset.id)
            .bind(preset.user_id)
            .bind(&preset.name)
            .bind(preset.platform.as_str())
            .bind(Json(&preset.metadata))
            .bind(preset.is_active)
            .bind(preset.created_at)
            .bind(preset.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_query_err("insert_preset"))?;
        Ok(())
    }

    async fn fetch_recording(&self, id: Uuid) -> Result<Option<Recording>> {
        let Some(row) = sqlx::query(SELECT_RECORDING_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_err("fetch_recording"))?
        else {
            return Ok(None);
        };
        let mut recording = map_recording(&row)?;

        let stage_rows = sqlx::query(SELECT_STAGES_SQL)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_err("fetch_stages"))?;
        for row in &stage_rows {
            recording.stages.push(map_stage(row)?);
        }

        let target_rows = sqlx::query(SELECT_TARGETS_SQL)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_err("fetch_targets"))?;
        for row in &target_rows {
            recording.targets.push(map_target(row)?);
        }

        Ok(Some(recording))
    }
}

#[async_trait::async_trait]
impl RecordingStore for PgStore {
    async fn get_with_children(&self, id: Uuid) -> anyhow::Result<Option<Recording>> {
        Ok(self.fetch_recording(id).await?)
    }

    async fn list_unmapped(
        &self,
        user_id: Uuid,
        scope: RematchScope,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Recording>> {
        let sql = match scope {
            RematchScope::SkippedOnly => LIST_UNMAPPED_SKIPPED_SQL,
            RematchScope::AllUnmapped => LIST_UNMAPPED_ALL_SQL,
        };
        let rows = sqlx::query(sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_err("list_unmapped"))?;
        // Matching only needs identity fields; children stay unloaded here.
        let mut recordings = Vec::with_capacity(rows.len());
        for row in &rows {
            recordings.push(map_recording(row)?);
        }
        Ok(recordings)
    }

    async fn assign_template(&self, recording_id: Uuid, template_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(ASSIGN_TEMPLATE_SQL)
            .bind(recording_id)
            .bind(template_id)
            .execute(&self.pool)
            .await
            .map_err(map_query_err("assign_template"))?;
        Ok(())
    }

    async fn clear_template(&self, template_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let rows = sqlx::query(CLEAR_TEMPLATE_SQL)
            .bind(template_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_err("clear_template"))?;
        let mut released = Vec::with_capacity(rows.len());
        for row in &rows {
            released.push(row.try_get("id").map_err(map_query_err("clear_template"))?);
        }
        Ok(released)
    }

    async fn update_status(
        &self,
        recording_id: Uuid,
        status: ProcessingStatus,
    ) -> anyhow::Result<()> {
        sqlx::query(UPDATE_STATUS_SQL)
            .bind(recording_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_query_err("update_status"))?;
        Ok(())
    }

    async fn insert_stages(&self, stages: &[ProcessingStage]) -> anyhow::Result<()> {
        for stage in stages {
            sqlx::query(INSERT_STAGE_SQL)
                .bind(stage.id)
                .bind(stage.recording_id)
                .bind(stage.stage_type.as_str())
                .bind(stage.status.as_str())
                .bind(stage.failure_reason.as_deref())
                .bind(stage.retry_count)
                .bind(Json(&stage.metadata))
                .bind(stage.created_at)
                .bind(stage.updated_at)
                .execute(&self.pool)
                .await
                .map_err(map_query_err("insert_stage"))?;
        }
        Ok(())
    }

    async fn insert_targets(&self, targets: &[OutputTarget]) -> anyhow::Result<()> {
        for target in targets {
            sqlx::query(INSERT_TARGET_SQL)
                .bind(target.id)
                .bind(target.recording_id)
                .bind(target.target_type.as_str())
                .bind(target.status.as_str())
                .bind(target.preset_id)
                .bind(target.failure_reason.as_deref())
                .bind(target.retry_count)
                .bind(target.created_at)
                .bind(target.updated_at)
                .execute(&self.pool)
                .await
                .map_err(map_query_err("insert_target"))?;
        }
        Ok(())
    }

    async fn update_stage_status(
        &self,
        recording_id: Uuid,
        stage_type: StageType,
        status: StageStatus,
        failure_reason: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(UPDATE_STAGE_STATUS_SQL)
            .bind(recording_id)
            .bind(stage_type.as_str())
            .bind(status.as_str())
            .bind(failure_reason)
            .execute(&self.pool)
            .await
            .map_err(map_query_err("update_stage_status"))?;
        Ok(())
    }

    async fn update_target_status(
        &self,
        recording_id: Uuid,
        target_type: TargetType,
        status: TargetStatus,
        failure_reason: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(UPDATE_TARGET_STATUS_SQL)
            .bind(recording_id)
            .bind(target_type.as_str())
            .bind(status.as_str())
            .bind(failure_reason)
            .execute(&self.pool)
            .await
            .map_err(map_query_err("update_target_status"))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TemplateStore for PgStore {
    async fn active_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<RecordingTemplate>> {
        let rows = sqlx::query(ACTIVE_TEMPLATES_SQL)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_err("active_templates"))?;
        let mut templates = Vec::with_capacity(rows.len());
        for row in &rows {
            templates.push(map_template(row)?);
        }
        Ok(templates)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<RecordingTemplate>> {
        let row = sqlx::query(SELECT_TEMPLATE_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_err("fetch_template"))?;
        Ok(row.as_ref().map(map_template).transpose()?)
    }

    async fn record_match(&self, template_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(RECORD_MATCH_SQL)
            .bind(template_id)
            .execute(&self.pool)
            .await
            .map_err(map_query_err("record_match"))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserConfigStore for PgStore {
    async fn config_for_user(&self, user_id: Uuid) -> anyhow::Result<Option<Value>> {
        let row = sqlx::query(SELECT_USER_CONFIG_SQL)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_err("fetch_user_config"))?;
        let config = row
            .map(|row| {
                row.try_get::<Json<Value>, _>("config")
                    .map(|Json(value)| value)
                    .map_err(map_query_err("fetch_user_config"))
            })
            .transpose()?;
        Ok(config)
    }
}

#[async_trait::async_trait]
impl PresetStore for PgStore {
    async fn preset_for_user(
        &self,
        preset_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<OutputPreset>> {
        let row = sqlx::query(PRESET_FOR_USER_SQL)
            .bind(preset_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_err("fetch_preset"))?;
        Ok(row.as_ref().map(map_preset).transpose()?)
    }

    async fn presets_by_ids(
        &self,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> anyhow::Result<Vec<OutputPreset>> {
        let rows = sqlx::query(PRESETS_BY_IDS_SQL)
            .bind(user_id)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_err("fetch_presets"))?;
        let mut presets = Vec::with_capacity(rows.len());
        for row in &rows {
            presets.push(map_preset(row)?);
        }
        Ok(presets)
    }
}

fn map_recording(row: &PgRow) -> Result<Recording> {
    let status_label: String = get(row, "status", "map_recording")?;
    let preferences: Option<Json<Value>> =
        get(row, "processing_preferences", "map_recording")?;
    Ok(Recording {
        id: get(row, "id", "map_recording")?,
        user_id: get(row, "user_id", "map_recording")?,
        source_id: get(row, "source_id", "map_recording")?,
        template_id: get(row, "template_id", "map_recording")?,
        display_name: get(row, "display_name", "map_recording")?,
        status: processing_status_from_label(&status_label)?,
        is_mapped: get(row, "is_mapped", "map_recording")?,
        processing_preferences: preferences.map(|Json(value)| value),
        stages: Vec::new(),
        targets: Vec::new(),
        created_at: get(row, "created_at", "map_recording")?,
        updated_at: get(row, "updated_at", "map_recording")?,
    })
}

fn map_stage(row: &PgRow) -> Result<ProcessingStage> {
    let stage_label: String = get(row, "stage_type", "map_stage")?;
    let status_label: String = get(row, "status", "map_stage")?;
    let Json(metadata): Json<Value> = get(row, "metadata", "map_stage")?;
    Ok(ProcessingStage {
        id: get(row, "id", "map_stage")?,
        recording_id: get(row, "recording_id", "map_stage")?,
        stage_type: stage_type_from_label(&stage_label)?,
        status: stage_status_from_label(&status_label)?,
        failure_reason: get(row, "failure_reason", "map_stage")?,
        retry_count: get(row, "retry_count", "map_stage")?,
        metadata,
        created_at: get(row, "created_at", "map_stage")?,
        updated_at: get(row, "updated_at", "map_stage")?,
    })
}

fn map_target(row: &PgRow) -> Result<OutputTarget> {
    let target_label: String = get(row, "target_type", "map_target")?;
    let status_label: String = get(row, "status", "map_target")?;
    Ok(OutputTarget {
        id: get(row, "id", "map_target")?,
        recording_id: get(row, "recording_id", "map_target")?,
        target_type: target_type_from_label(&target_label)?,
        status: target_status_from_label(&status_label)?,
        preset_id: get(row, "preset_id", "map_target")?,
        failure_reason: get(row, "failure_reason", "map_target")?,
        retry_count: get(row, "retry_count", "map_target")?,
        created_at: get(row, "created_at", "map_target")?,
        updated_at: get(row, "updated_at", "map_target")?,
    })
}

fn map_template(row: &PgRow) -> Result<RecordingTemplate> {
    let matching_rules: Option<Json<MatchingRules>> =
        get(row, "matching_rules", "map_template")?;
    let processing_config: Option<Json<Value>> =
        get(row, "processing_config", "map_template")?;
    let metadata_config: Option<Json<Value>> = get(row, "metadata_config", "map_template")?;
    let output_config: Option<Json<Value>> = get(row, "output_config", "map_template")?;
    Ok(RecordingTemplate {
        id: get(row, "id", "map_template")?,
        user_id: get(row, "user_id", "map_template")?,
        name: get(row, "name", "map_template")?,
        matching_rules: matching_rules.map(|Json(rules)| rules),
        processing_config: processing_config.map(|Json(value)| value),
        metadata_config: metadata_config.map(|Json(value)| value),
        output_config: output_config.map(|Json(value)| value),
        is_active: get(row, "is_active", "map_template")?,
        is_draft: get(row, "is_draft", "map_template")?,
        priority: get(row, "priority", "map_template")?,
        match_count: get(row, "match_count", "map_template")?,
        created_at: get(row, "created_at", "map_template")?,
        updated_at: get(row, "updated_at", "map_template")?,
    })
}

fn map_preset(row: &PgRow) -> Result<OutputPreset> {
    let platform_label: String = get(row, "platform", "map_preset")?;
    let Json(metadata): Json<Value> = get(row, "metadata", "map_preset")?;
    Ok(OutputPreset {
        id: get(row, "id", "map_preset")?,
        user_id: get(row, "user_id", "map_preset")?,
        name: get(row, "name", "map_preset")?,
        platform: target_type_from_label(&platform_label)?,
        metadata,
        is_active: get(row, "is_active", "map_preset")?,
        created_at: get(row, "created_at", "map_preset")?,
        updated_at: get(row, "updated_at", "map_preset")?,
    })
}

fn get<'r, T>(row: &'r PgRow, column: &'static str, operation: &'static str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column).map_err(map_query_err(operation))
}

fn processing_status_from_label(label: &str) -> Result<ProcessingStatus> {
    let status = match label {
        "initialized" => ProcessingStatus::Initialized,
        "downloading" => ProcessingStatus::Downloading,
        "downloaded" => ProcessingStatus::Downloaded,
        "processing" => ProcessingStatus::Processing,
        "processed" => ProcessingStatus::Processed,
        "preparing" => ProcessingStatus::Preparing,
        "transcribing" => ProcessingStatus::Transcribing,
        "transcribed" => ProcessingStatus::Transcribed,
        "uploading" => ProcessingStatus::Uploading,
        "ready" => ProcessingStatus::Ready,
        "skipped" => ProcessingStatus::Skipped,
        "expired" => ProcessingStatus::Expired,
        other => {
            return Err(DataError::InvalidLabel {
                column: "status",
                value: other.to_string(),
            });
        }
    };
    Ok(status)
}

fn stage_type_from_label(label: &str) -> Result<StageType> {
    StageType::all()
        .into_iter()
        .find(|stage| stage.as_str() == label)
        .ok_or_else(|| DataError::InvalidLabel {
            column: "stage_type",
            value: label.to_string(),
        })
}

fn stage_status_from_label(label: &str) -> Result<StageStatus> {
    let status = match label {
        "pending" => StageStatus::Pending,
        "in_progress" => StageStatus::InProgress,
        "completed" => StageStatus::Completed,
        "failed" => StageStatus::Failed,
        other => {
            return Err(DataError::InvalidLabel {
                column: "status",
                value: other.to_string(),
            });
        }
    };
    Ok(status)
}

fn target_type_from_label(label: &str) -> Result<TargetType> {
    TargetType::all()
        .into_iter()
        .find(|target| target.as_str() == label)
        .ok_or_else(|| DataError::InvalidLabel {
            column: "target_type",
            value: label.to_string(),
        })
}

fn target_status_from_label(label: &str) -> Result<TargetStatus> {
    let status = match label {
        "not_uploaded" => TargetStatus::NotUploaded,
        "uploading" => TargetStatus::Uploading,
        "uploaded" => TargetStatus::Uploaded,
        "failed" => TargetStatus::Failed,
        other => {
            return Err(DataError::InvalidLabel {
                column: "status",
                value: other.to_string(),
            });
        }
    };
    Ok(status)
}
