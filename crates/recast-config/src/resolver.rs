//! Layered configuration resolution for recordings.
//!
//! Effective configuration is composed from up to four layers, lowest to
//! highest priority: the user's base configuration, the matched template's
//! configuration, the recording's stored preference override, and a
//! caller-supplied manual override. Each layer is merged over the previous
//! with [`deep_merge`]; absent layers contribute nothing. Resolution never
//! fails on missing optional data; the only propagated failures concern the
//! preset root of the upload metadata chain.

use std::sync::Arc;

use recast_core::model::{OutputPreset, Recording, RecordingTemplate};
use recast_core::service::{PresetStore, TemplateStore, UserConfigStore};
use recast_events::TargetType;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ConfigError;
use crate::merge::{deep_merge, empty_tree};

/// Key holding the recording-level output override inside
/// `processing_preferences`; its presence short-circuits the lower layers.
const OUTPUT_OVERRIDE_KEY: &str = "output_config";

/// Legacy wrapper key flattened out of resolved processing trees.
const LEGACY_PROCESSING_WRAPPER: &str = "processing_config";

/// Flag controlling whether pipeline gates admit `Skipped` recordings.
const ALLOW_SKIPPED_KEY: &str = "allow_skipped_processing";

/// Read-only projection producing effective configuration trees.
#[derive(Clone)]
pub struct ConfigResolver {
    users: Arc<dyn UserConfigStore>,
    templates: Arc<dyn TemplateStore>,
    presets: Arc<dyn PresetStore>,
}

impl ConfigResolver {
    /// Construct a resolver over the storage collaborators.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserConfigStore>,
        templates: Arc<dyn TemplateStore>,
        presets: Arc<dyn PresetStore>,
    ) -> Self {
        Self {
            users,
            templates,
            presets,
        }
    }

    /// Resolve the effective processing configuration for a recording.
    ///
    /// Layers: user base `processing` subtree, template `processing_config`,
    /// recording `processing_preferences`, then `manual_override`. A legacy
    /// top-level `processing_config` wrapper in the result is flattened into
    /// the tree; `metadata_config` and `output_config` keys are left alone.
    pub async fn resolve_processing(
        &self,
        recording: &Recording,
        manual_override: Option<&Value>,
    ) -> Value {
        let user_tree = self.user_tree(recording.user_id).await;
        let mut resolved = subtree(&user_tree, &["processing"]);

        if let Some(template) = self.template_for(recording).await
            && let Some(config) = &template.processing_config
        {
            resolved = deep_merge(&resolved, config);
        }
        if let Some(preferences) = &recording.processing_preferences {
            resolved = deep_merge(&resolved, preferences);
        }
        if let Some(overlay) = manual_override {
            resolved = deep_merge(&resolved, overlay);
        }

        flatten_legacy_wrapper(resolved)
    }

    /// Resolve the effective output configuration for a recording.
    ///
    /// Follows the same layer order as [`Self::resolve_processing`], reading
    /// the `output_config`/`output` subtree, with one exception: when the
    /// recording's `processing_preferences` carries an `output_config` key,
    /// that value replaces the user and template layers wholesale. A manual
    /// override still merges on top.
    pub async fn resolve_output(
        &self,
        recording: &Recording,
        manual_override: Option<&Value>,
    ) -> Value {
        let override_tree = recording
            .processing_preferences
            .as_ref()
            .and_then(|preferences| preferences.get(OUTPUT_OVERRIDE_KEY))
            .filter(|value| !value.is_null());

        let mut resolved = if let Some(output) = override_tree {
            output.clone()
        } else {
            let user_tree = self.user_tree(recording.user_id).await;
            let mut resolved = subtree(&user_tree, &["output_config", "output"]);
            if let Some(template) = self.template_for(recording).await
                && let Some(config) = &template.output_config
            {
                resolved = deep_merge(&resolved, config);
            }
            resolved
        };

        if let Some(overlay) = manual_override {
            resolved = deep_merge(&resolved, overlay);
        }
        resolved
    }

    /// Resolve the effective metadata configuration for a recording.
    ///
    /// Chain: user base `metadata`/`metadata_config` subtree, template
    /// `metadata_config`, then `manual_override`; fully deep-merged at every
    /// layer, no flattening, no short-circuit.
    pub async fn resolve_metadata(
        &self,
        recording: &Recording,
        manual_override: Option<&Value>,
    ) -> Value {
        let user_tree = self.user_tree(recording.user_id).await;
        let mut resolved = subtree(&user_tree, &["metadata", "metadata_config"]);

        if let Some(template) = self.template_for(recording).await
            && let Some(config) = &template.metadata_config
        {
            resolved = deep_merge(&resolved, config);
        }
        if let Some(overlay) = manual_override {
            resolved = deep_merge(&resolved, overlay);
        }
        resolved
    }

    /// Resolve the final metadata for one upload, rooted at an output preset.
    ///
    /// Chain: the preset's metadata tree, the matched template's
    /// `metadata_config` (its `common` subtree, then the subtree keyed by the
    /// preset's platform name; other top-level keys are treated as a legacy
    /// flat shape and merged underneath those two), then the recording's
    /// `processing_preferences.metadata_config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PresetNotFound`] when the preset does not
    /// exist, is inactive, or belongs to a different user, and
    /// [`ConfigError::PresetLookupFailed`] when the storage collaborator
    /// fails.
    pub async fn resolve_upload_metadata(
        &self,
        recording: &Recording,
        user_id: Uuid,
        preset_id: Uuid,
    ) -> Result<Value, ConfigError> {
        let preset = match self.presets.preset_for_user(preset_id, user_id).await {
            Ok(Some(preset)) => preset,
            Ok(None) => return Err(ConfigError::PresetNotFound { preset_id, user_id }),
            Err(source) => return Err(ConfigError::PresetLookupFailed { preset_id, source }),
        };

        let mut resolved = preset.metadata.clone();
        if let Some(template) = self.template_for(recording).await
            && let Some(config) = &template.metadata_config
        {
            resolved = merge_template_metadata(&resolved, config, preset.platform);
        }
        if let Some(preferences) = recording
            .processing_preferences
            .as_ref()
            .and_then(|preferences| preferences.get("metadata_config"))
            .filter(|value| !value.is_null())
        {
            resolved = deep_merge(&resolved, preferences);
        }
        Ok(resolved)
    }

    /// Resolve the `allow_skipped` gate flag for a recording.
    ///
    /// Priority: the explicit request parameter, else the matched template's
    /// `processing_config.allow_skipped_processing`, else the user base
    /// configuration's `processing.allow_skipped_processing`, else `false`.
    pub async fn resolve_allow_skipped(
        &self,
        recording: &Recording,
        explicit: Option<bool>,
    ) -> bool {
        if let Some(explicit) = explicit {
            return explicit;
        }
        if let Some(template) = self.template_for(recording).await
            && let Some(flag) = template
                .processing_config
                .as_ref()
                .and_then(|config| config.get(ALLOW_SKIPPED_KEY))
                .and_then(Value::as_bool)
        {
            return flag;
        }
        let user_tree = self.user_tree(recording.user_id).await;
        subtree(&user_tree, &["processing"])
            .get(ALLOW_SKIPPED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Fetch the active, owned presets an output configuration names, for
    /// handing to [`crate::init::plan_targets`].
    ///
    /// Lookup failures degrade to an empty list with a warning; target
    /// planning then simply creates nothing.
    pub async fn presets_for_output(
        &self,
        user_id: Uuid,
        output_config: &Value,
    ) -> Vec<OutputPreset> {
        let ids = crate::init::preset_ids(output_config);
        if ids.is_empty() {
            return Vec::new();
        }
        match self.presets.presets_by_ids(user_id, &ids).await {
            Ok(presets) => presets,
            Err(error) => {
                warn!(%user_id, %error, "preset lookup failed, planning no targets");
                Vec::new()
            }
        }
    }

    async fn user_tree(&self, user_id: Uuid) -> Value {
        match self.users.config_for_user(user_id).await {
            Ok(Some(config)) => config,
            Ok(None) => empty_tree(),
            Err(error) => {
                warn!(%user_id, %error, "user configuration unavailable, resolving from empty tree");
                empty_tree()
            }
        }
    }

    async fn template_for(&self, recording: &Recording) -> Option<RecordingTemplate> {
        let template_id = recording.template_id?;
        match self.templates.get(template_id).await {
            Ok(template) => template,
            Err(error) => {
                warn!(%template_id, %error, "template unavailable, skipping template layer");
                None
            }
        }
    }
}

/// First non-null subtree among `keys`, cloned, or the empty tree.
fn subtree(tree: &Value, keys: &[&str]) -> Value {
    keys.iter()
        .find_map(|key| tree.get(*key))
        .filter(|value| !value.is_null())
        .cloned()
        .unwrap_or_else(empty_tree)
}

/// Flatten a legacy `{"processing_config": {...}}` wrapper into its parent.
fn flatten_legacy_wrapper(tree: Value) -> Value {
    let Value::Object(mut map) = tree else {
        return tree;
    };
    let Some(wrapped) = map.remove(LEGACY_PROCESSING_WRAPPER) else {
        return Value::Object(map);
    };
    if wrapped.is_object() {
        deep_merge(&Value::Object(map), &wrapped)
    } else {
        debug!("discarding non-object legacy processing_config wrapper");
        Value::Object(map)
    }
}

/// Merge a template `metadata_config` tree over `base` for one platform.
///
/// Top-level keys other than `common` and the known platform names form the
/// legacy flat layer and merge first; `common` merges next and the preset's
/// platform subtree last, so platform-specific values win.
fn merge_template_metadata(base: &Value, metadata_config: &Value, platform: TargetType) -> Value {
    let Value::Object(map) = metadata_config else {
        return base.clone();
    };

    let mut legacy = map.clone();
    legacy.remove("common");
    for known in TargetType::all() {
        legacy.remove(known.as_str());
    }

    let mut resolved = base.clone();
    if !legacy.is_empty() {
        resolved = deep_merge(&resolved, &Value::Object(legacy));
    }
    if let Some(common) = map.get("common") {
        resolved = deep_merge(&resolved, common);
    }
    if let Some(platform_tree) = map.get(platform.as_str()) {
        resolved = deep_merge(&resolved, platform_tree);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use recast_core::model::{MatchingRules, OutputPreset};
    use recast_test_support::mocks::MemoryStore;
    use serde_json::json;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::default())
    }

    fn resolver(store: &Arc<MemoryStore>) -> ConfigResolver {
        ConfigResolver::new(store.clone(), store.clone(), store.clone())
    }

    fn recording(user_id: Uuid, template_id: Option<Uuid>) -> Recording {
        let now = Utc::now();
        Recording {
            id: Uuid::new_v4(),
            user_id,
            source_id: None,
            template_id,
            display_name: "resolver fixture".into(),
            status: recast_events::ProcessingStatus::Initialized,
            is_mapped: template_id.is_some(),
            processing_preferences: None,
            stages: Vec::new(),
            targets: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn template(user_id: Uuid, processing_config: Option<Value>) -> RecordingTemplate {
        let now = Utc::now();
        RecordingTemplate {
            id: Uuid::new_v4(),
            user_id,
            name: "resolver template".into(),
            matching_rules: Some(MatchingRules::default()),
            processing_config,
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

    fn preset(user_id: Uuid, platform: TargetType, metadata: Value) -> OutputPreset {
        let now = Utc::now();
        OutputPreset {
            id: Uuid::new_v4(),
            user_id,
            name: "resolver preset".into(),
            platform,
            metadata,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn four_layers_merge_in_priority_order() {
        let store = store();
        let user_id = Uuid::new_v4();
        store.put_user_config(user_id, json!({"processing": {"a": 1, "b": 1}}));
        let tpl = template(user_id, Some(json!({"b": 2, "c": 2})));
        let template_id = tpl.id;
        store.put_template(tpl);

        let mut rec = recording(user_id, Some(template_id));
        rec.processing_preferences = Some(json!({"c": 3, "d": 3}));

        let resolved = resolver(&store)
            .resolve_processing(&rec, Some(&json!({"d": 4})))
            .await;
        assert_eq!(resolved, json!({"a": 1, "b": 2, "c": 3, "d": 4}));
    }

    #[tokio::test]
    async fn missing_layers_degrade_to_empty_trees() {
        let store = store();
        let rec = recording(Uuid::new_v4(), None);
        let resolved = resolver(&store).resolve_processing(&rec, None).await;
        assert_eq!(resolved, json!({}));
    }

    #[tokio::test]
    async fn legacy_wrapper_is_flattened() {
        let store = store();
        let mut rec = recording(Uuid::new_v4(), None);
        rec.processing_preferences =
            Some(json!({"processing_config": {"x": 1}, "y": 2}));

        let resolved = resolver(&store).resolve_processing(&rec, None).await;
        assert_eq!(resolved, json!({"x": 1, "y": 2}));
    }

    #[tokio::test]
    async fn metadata_and_output_wrappers_survive_flattening() {
        let store = store();
        let mut rec = recording(Uuid::new_v4(), None);
        rec.processing_preferences = Some(json!({
            "metadata_config": {"title": "kept"},
            "output_config": {"preset_ids": []},
            "quality": "1080p"
        }));

        let resolved = resolver(&store).resolve_processing(&rec, None).await;
        assert_eq!(
            resolved,
            json!({
                "metadata_config": {"title": "kept"},
                "output_config": {"preset_ids": []},
                "quality": "1080p"
            })
        );
    }

    #[tokio::test]
    async fn output_override_short_circuits_lower_layers() {
        let store = store();
        let user_id = Uuid::new_v4();
        store.put_user_config(user_id, json!({"output": {"preset_ids": ["ignored"]}}));
        let mut tpl = template(user_id, None);
        tpl.output_config = Some(json!({"preset_ids": ["also-ignored"], "visibility": "public"}));
        let template_id = tpl.id;
        store.put_template(tpl);

        let mut rec = recording(user_id, Some(template_id));
        rec.processing_preferences = Some(json!({"output_config": {"preset_ids": ["mine"]}}));

        let resolver = resolver(&store);
        let resolved = resolver.resolve_output(&rec, None).await;
        assert_eq!(resolved, json!({"preset_ids": ["mine"]}));

        // The manual override is layer 4 and still applies on top.
        let overridden = resolver
            .resolve_output(&rec, Some(&json!({"visibility": "private"})))
            .await;
        assert_eq!(
            overridden,
            json!({"preset_ids": ["mine"], "visibility": "private"})
        );
    }

    #[tokio::test]
    async fn output_resolves_user_then_template_without_override() {
        let store = store();
        let user_id = Uuid::new_v4();
        store.put_user_config(
            user_id,
            json!({"output": {"visibility": "unlisted", "notify": true}}),
        );
        let mut tpl = template(user_id, None);
        tpl.output_config = Some(json!({"visibility": "public"}));
        let template_id = tpl.id;
        store.put_template(tpl);

        let rec = recording(user_id, Some(template_id));
        let resolved = resolver(&store).resolve_output(&rec, None).await;
        assert_eq!(resolved, json!({"visibility": "public", "notify": true}));
    }

    #[tokio::test]
    async fn metadata_chain_merges_user_template_manual() {
        let store = store();
        let user_id = Uuid::new_v4();
        store.put_user_config(user_id, json!({"metadata": {"language": "en", "tags": ["base"]}}));
        let mut tpl = template(user_id, None);
        tpl.metadata_config = Some(json!({"tags": ["tpl"], "category": "tech"}));
        let template_id = tpl.id;
        store.put_template(tpl);

        let rec = recording(user_id, Some(template_id));
        let resolved = resolver(&store)
            .resolve_metadata(&rec, Some(&json!({"category": "live"})))
            .await;
        assert_eq!(
            resolved,
            json!({"language": "en", "tags": ["tpl"], "category": "live"})
        );
    }

    #[tokio::test]
    async fn upload_metadata_requires_an_owned_active_preset() {
        let store = store();
        let user_id = Uuid::new_v4();
        let rec = recording(user_id, None);
        let resolver = resolver(&store);

        let missing = resolver
            .resolve_upload_metadata(&rec, user_id, Uuid::new_v4())
            .await;
        assert!(matches!(
            missing,
            Err(ConfigError::PresetNotFound { .. })
        ));

        // Foreign preset: invisible to this user.
        let foreign = preset(Uuid::new_v4(), TargetType::Youtube, json!({}));
        let foreign_id = foreign.id;
        store.put_preset(foreign);
        let denied = resolver
            .resolve_upload_metadata(&rec, user_id, foreign_id)
            .await;
        assert!(matches!(denied, Err(ConfigError::PresetNotFound { .. })));
    }

    #[tokio::test]
    async fn upload_metadata_layers_common_platform_and_preferences() {
        let store = store();
        let user_id = Uuid::new_v4();
        let mut tpl = template(user_id, None);
        tpl.metadata_config = Some(json!({
            "description": "legacy flat",
            "common": {"tags": ["common"], "privacy": "unlisted"},
            "youtube": {"privacy": "public"},
            "vimeo": {"privacy": "password"}
        }));
        let template_id = tpl.id;
        store.put_template(tpl);

        let preset = preset(
            user_id,
            TargetType::Youtube,
            json!({"title": "{{name}}", "privacy": "private"}),
        );
        let preset_id = preset.id;
        store.put_preset(preset);

        let mut rec = recording(user_id, Some(template_id));
        rec.processing_preferences = Some(json!({"metadata_config": {"tags": ["mine"]}}));

        let resolved = resolver(&store)
            .resolve_upload_metadata(&rec, user_id, preset_id)
            .await
            .expect("resolve");
        assert_eq!(
            resolved,
            json!({
                "title": "{{name}}",
                "description": "legacy flat",
                "tags": ["mine"],
                "privacy": "public"
            })
        );
    }

    #[tokio::test]
    async fn presets_for_output_resolves_named_owned_presets() {
        let store = store();
        let user_id = Uuid::new_v4();
        let owned = preset(user_id, TargetType::Youtube, json!({}));
        let owned_id = owned.id;
        store.put_preset(owned);
        let foreign = preset(Uuid::new_v4(), TargetType::Vimeo, json!({}));
        let foreign_id = foreign.id;
        store.put_preset(foreign);

        let config = json!({"preset_ids": [owned_id.to_string(), foreign_id.to_string()]});
        let resolved = resolver(&store).presets_for_output(user_id, &config).await;
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, owned_id);

        let none = resolver(&store).presets_for_output(user_id, &json!({})).await;
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn allow_skipped_resolves_explicit_template_user_in_order() {
        let store = store();
        let user_id = Uuid::new_v4();
        store.put_user_config(
            user_id,
            json!({"processing": {"allow_skipped_processing": true}}),
        );
        let tpl = template(
            user_id,
            Some(json!({"allow_skipped_processing": false})),
        );
        let template_id = tpl.id;
        store.put_template(tpl);

        let resolver = resolver(&store);

        // Explicit wins over everything.
        let rec = recording(user_id, Some(template_id));
        assert!(resolver.resolve_allow_skipped(&rec, Some(true)).await);

        // Template wins over user config.
        assert!(!resolver.resolve_allow_skipped(&rec, None).await);

        // User config is the fallback when no template is linked.
        let unlinked = recording(user_id, None);
        assert!(resolver.resolve_allow_skipped(&unlinked, None).await);

        // Default is false.
        let stranger = recording(Uuid::new_v4(), None);
        assert!(!resolver.resolve_allow_skipped(&stranger, None).await);
    }
}
