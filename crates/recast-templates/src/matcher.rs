//! First-match-wins template selection.

use globset::{Glob, GlobSet, GlobSetBuilder};
use recast_core::model::{MatchingRules, RecordingIdentity, RecordingTemplate};
use tracing::warn;

/// Select the template governing a recording.
///
/// `candidates` must already be filtered to active, non-draft templates and
/// ordered by creation time ascending. That ordering is the tie-break: the
/// first structural match wins, regardless of any notion of specificity. The
/// `priority` field on templates plays no part here.
#[must_use]
pub fn find_matching_template<'a>(
    identity: &RecordingIdentity<'_>,
    candidates: &'a [RecordingTemplate],
) -> Option<&'a RecordingTemplate> {
    candidates
        .iter()
        .find(|template| template_matches(template, identity))
}

/// Whether a single template structurally matches a recording's identity.
///
/// Rule kinds are conjunctive; within `exact_matches` and `patterns` any
/// listed entry suffices. A template without `matching_rules`, or with an
/// empty rule set, never matches. The predicate is side-effect free and is
/// also the "preview" entry point for evaluating one candidate.
#[must_use]
pub fn template_matches(template: &RecordingTemplate, identity: &RecordingIdentity<'_>) -> bool {
    template
        .matching_rules
        .as_ref()
        .is_some_and(|rules| rules_match(rules, identity))
}

fn rules_match(rules: &MatchingRules, identity: &RecordingIdentity<'_>) -> bool {
    if rules.is_empty() {
        return false;
    }
    if !rules.exact_matches.is_empty()
        && !rules
            .exact_matches
            .iter()
            .any(|name| name == identity.display_name)
    {
        return false;
    }
    if !rules.patterns.is_empty() {
        let matched = build_globset(&rules.patterns)
            .is_some_and(|set| set.is_match(identity.display_name));
        if !matched {
            return false;
        }
    }
    if !rules.source_ids.is_empty() {
        let matched = identity
            .source_id
            .is_some_and(|source_id| rules.source_ids.contains(&source_id));
        if !matched {
            return false;
        }
    }
    true
}

fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut compiled = 0_usize;
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
                compiled += 1;
            }
            Err(error) => {
                warn!(%pattern, %error, "ignoring invalid glob pattern in matching rules");
            }
        }
    }
    if compiled == 0 {
        return None;
    }
    match builder.build() {
        Ok(set) => Some(set),
        Err(error) => {
            warn!(%error, "failed to compile matching rule patterns");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn identity(display_name: &str) -> RecordingIdentity<'_> {
        RecordingIdentity {
            display_name,
            source_id: None,
        }
    }

    fn template(name: &str, rules: Option<MatchingRules>, age_minutes: i64) -> RecordingTemplate {
        let created_at = Utc::now() - Duration::minutes(age_minutes);
        RecordingTemplate {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.into(),
            matching_rules: rules,
            processing_config: None,
            metadata_config: None,
            output_config: None,
            is_active: true,
            is_draft: false,
            priority: 0,
            match_count: 0,
            created_at,
            updated_at: created_at,
        }
    }

    fn exact(names: &[&str]) -> MatchingRules {
        MatchingRules {
            exact_matches: names.iter().map(ToString::to_string).collect(),
            ..MatchingRules::default()
        }
    }

    fn patterns(globs: &[&str]) -> MatchingRules {
        MatchingRules {
            patterns: globs.iter().map(ToString::to_string).collect(),
            ..MatchingRules::default()
        }
    }

    #[test]
    fn exact_match_requires_verbatim_name() {
        let tpl = template("standup", Some(exact(&["Weekly Standup", "Daily Sync"])), 0);
        assert!(template_matches(&tpl, &identity("Daily Sync")));
        assert!(!template_matches(&tpl, &identity("daily sync")));
        assert!(!template_matches(&tpl, &identity("Daily Sync 2")));
    }

    #[test]
    fn glob_patterns_cover_shell_style_wildcards() {
        let tpl = template("globs", Some(patterns(&["Standup *", "Sync ?", "[Tt]own Hall"])), 0);
        assert!(template_matches(&tpl, &identity("Standup 2026-08-06")));
        assert!(template_matches(&tpl, &identity("Sync A")));
        assert!(template_matches(&tpl, &identity("town Hall")));
        assert!(!template_matches(&tpl, &identity("Sync AB")));
        assert!(!template_matches(&tpl, &identity("Retro")));
    }

    #[test]
    fn invalid_glob_patterns_never_match() {
        let tpl = template("broken", Some(patterns(&["["])), 0);
        assert!(!template_matches(&tpl, &identity("[")));

        // A valid sibling pattern still works.
        let tpl = template("mixed", Some(patterns(&["[", "Recording *"])), 0);
        assert!(template_matches(&tpl, &identity("Recording one")));
    }

    #[test]
    fn source_filter_requires_listed_source() {
        let source = Uuid::new_v4();
        let rules = MatchingRules {
            source_ids: vec![source],
            ..MatchingRules::default()
        };
        let tpl = template("sourced", Some(rules), 0);

        let mut id = identity("anything");
        assert!(!template_matches(&tpl, &id));
        id.source_id = Some(Uuid::new_v4());
        assert!(!template_matches(&tpl, &id));
        id.source_id = Some(source);
        assert!(template_matches(&tpl, &id));
    }

    #[test]
    fn rule_kinds_are_conjunctive() {
        let source = Uuid::new_v4();
        let rules = MatchingRules {
            exact_matches: vec!["Weekly Standup".into()],
            source_ids: vec![source],
            ..MatchingRules::default()
        };
        let tpl = template("both", Some(rules), 0);

        let mut id = identity("Weekly Standup");
        assert!(!template_matches(&tpl, &id));
        id.source_id = Some(source);
        assert!(template_matches(&tpl, &id));
        id.display_name = "Other";
        assert!(!template_matches(&tpl, &id));
    }

    #[test]
    fn empty_rules_never_match() {
        let no_rules = template("none", None, 0);
        let empty_rules = template("empty", Some(MatchingRules::default()), 0);
        assert!(!template_matches(&no_rules, &identity("anything")));
        assert!(!template_matches(&empty_rules, &identity("anything")));
        assert!(
            find_matching_template(&identity("anything"), &[no_rules, empty_rules]).is_none()
        );
    }

    #[test]
    fn earliest_created_match_wins() {
        let older = template("older", Some(patterns(&["Recording *"])), 60);
        let newer = template("newer", Some(patterns(&["Recording *"])), 5);
        let unrelated = template("unrelated", Some(exact(&["Town Hall"])), 90);

        // Candidates arrive sorted by creation time ascending.
        let candidates = vec![unrelated.clone(), older.clone(), newer.clone()];
        let winner = find_matching_template(&identity("Recording 12"), &candidates)
            .expect("match expected");
        assert_eq!(winner.id, older.id);

        // Moving non-matching templates around never changes the winner.
        let candidates = vec![older.clone(), unrelated, newer];
        let winner = find_matching_template(&identity("Recording 12"), &candidates)
            .expect("match expected");
        assert_eq!(winner.id, older.id);
    }
}
