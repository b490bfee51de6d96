//! Coerces untrusted model output into an [`EnhanceResult`].
//!
//! Every step is a total function: missing or mistyped fields fall back to a
//! default instead of failing, so any JSON value yields a well-formed result.

use crate::{
    models::{ArtStyle, EnhanceResult, PromptParams},
    prompts::tables::{style_negatives, BASELINE_NEGATIVE},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

pub const FALLBACK_PROMPT: &str =
    "A highly detailed, high-quality image of the described subject, balanced composition, \
     professional lighting.";

static RATIO_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)--[a-z]{2}\s*(\d{1,2})\s*:\s*(\d{1,2})").unwrap());
static BARE_RATIO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\s*:\s*(\d{1,2})\b").unwrap());
static EXTRA_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Model output after JSON parsing: an object we can read fields from, or
/// anything else.
#[derive(Debug, Clone)]
pub enum RawOutput {
    Shaped(Map<String, Value>),
    Opaque,
}

impl RawOutput {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => RawOutput::Shaped(map),
            _ => RawOutput::Opaque,
        }
    }

    fn field(&self, key: &str) -> Option<&Value> {
        match self {
            RawOutput::Shaped(map) => map.get(key),
            RawOutput::Opaque => None,
        }
    }

    fn text(&self, key: &str) -> String {
        self.field(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    fn params(&self) -> PromptParams {
        match self.field("params") {
            Some(Value::String(notes)) => PromptParams {
                aspect_ratio: None,
                notes: non_empty(notes),
            },
            Some(Value::Object(map)) => {
                let read = |keys: &[&str]| {
                    keys.iter()
                        .filter_map(|key| map.get(*key).and_then(Value::as_str))
                        .find_map(non_empty)
                };
                PromptParams {
                    aspect_ratio: read(&["aspectRatio", "aspect_ratio"])
                        .map(|ratio| compact_ratio(&ratio)),
                    notes: read(&["notes", "note"]),
                }
            }
            _ => PromptParams::default(),
        }
    }
}

/// Convenience for callers holding a parsed JSON value.
pub fn normalize_value(value: Value, style: ArtStyle) -> EnhanceResult {
    normalize(&RawOutput::from_value(value), style)
}

pub fn normalize(raw: &RawOutput, style: ArtStyle) -> EnhanceResult {
    let clean = raw.text("clean");
    let detailed = or_else(raw.text("detailed"), &clean);
    let extreme = or_else(raw.text("extreme"), &detailed);

    let mut params = raw.params();
    if params.aspect_ratio.is_none() {
        params.aspect_ratio = [&extreme, &detailed, &clean]
            .into_iter()
            .find_map(|text| find_aspect_ratio(text));
    }

    let clean = strip_ratio_flags(&clean);
    let detailed = strip_ratio_flags(&detailed);
    let extreme = strip_ratio_flags(&extreme);

    let negative = merge_negative(&raw.text("negative"), style);

    let clean = or_else(clean, FALLBACK_PROMPT);
    let detailed = or_else(detailed, &clean);
    let extreme = or_else(extreme, &detailed);

    EnhanceResult {
        clean,
        detailed,
        extreme,
        negative,
        params,
    }
}

/// First `--xx N:N` flag, else first bare `N:N`, with spaces removed.
pub fn find_aspect_ratio(text: &str) -> Option<String> {
    RATIO_FLAG
        .captures(text)
        .or_else(|| BARE_RATIO.captures(text))
        .map(|caps| format!("{}:{}", &caps[1], &caps[2]))
}

pub fn strip_ratio_flags(text: &str) -> String {
    if !RATIO_FLAG.is_match(text) {
        return text.to_string();
    }
    let stripped = RATIO_FLAG.replace_all(text, "");
    EXTRA_SPACES.replace_all(&stripped, " ").trim().to_string()
}

/// Appends style and baseline terms that the model text does not already
/// mention. Matching is a case-insensitive substring check.
pub fn merge_negative(model_negative: &str, style: ArtStyle) -> String {
    let mut terms: Vec<String> = Vec::new();
    for term in model_negative.split(',').map(str::trim) {
        if !term.is_empty() && !terms.iter().any(|t| t.eq_ignore_ascii_case(term)) {
            terms.push(term.to_string());
        }
    }

    for phrase in style_negatives(style).iter().chain(BASELINE_NEGATIVE) {
        let haystack = terms.join(", ").to_lowercase();
        if !haystack.contains(&phrase.to_lowercase()) {
            terms.push(phrase.to_string());
        }
    }

    terms.join(", ")
}

fn compact_ratio(ratio: &str) -> String {
    ratio.split_whitespace().collect::<Vec<_>>().join("")
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn or_else(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count_term(negative: &str, term: &str) -> usize {
        negative
            .split(',')
            .filter(|t| t.trim().eq_ignore_ascii_case(term))
            .count()
    }

    #[test]
    fn flag_is_recovered_and_stripped() {
        let result = normalize_value(json!({ "detailed": "a --ar 16:9 scene" }), ArtStyle::None);
        assert_eq!(result.params.aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(result.detailed, "a scene");
        assert_eq!(result.extreme, "a scene");
        assert_eq!(result.clean, FALLBACK_PROMPT);
    }

    #[test]
    fn string_params_become_notes() {
        let result = normalize_value(
            json!({ "clean": "a cat", "params": "use warm colors" }),
            ArtStyle::None,
        );
        assert_eq!(result.params.notes.as_deref(), Some("use warm colors"));
        assert_eq!(result.params.aspect_ratio, None);
    }

    #[test]
    fn object_params_accept_aliases() {
        let result = normalize_value(
            json!({ "clean": "a cat", "params": { "aspect_ratio": "4 : 5", "note": "soft" } }),
            ArtStyle::None,
        );
        assert_eq!(result.params.aspect_ratio.as_deref(), Some("4:5"));
        assert_eq!(result.params.notes.as_deref(), Some("soft"));
    }

    #[test]
    fn explicit_ratio_is_not_overridden_but_flags_are_still_stripped() {
        let result = normalize_value(
            json!({
                "clean": "sunset --ar 3:2",
                "params": { "aspectRatio": "1:1" }
            }),
            ArtStyle::None,
        );
        assert_eq!(result.params.aspect_ratio.as_deref(), Some("1:1"));
        assert_eq!(result.clean, "sunset");
    }

    #[test]
    fn ratio_scan_prefers_extreme_then_bare_tokens() {
        let result = normalize_value(
            json!({
                "clean": "wide 21:9 shot",
                "detailed": "poster in 2 : 3",
                "extreme": "no ratio here"
            }),
            ArtStyle::None,
        );
        assert_eq!(result.params.aspect_ratio.as_deref(), Some("2:3"));
        assert_eq!(result.detailed, "poster in 2 : 3");
    }

    #[test]
    fn opaque_and_mistyped_values_still_produce_full_results() {
        for raw in [
            json!(null),
            json!("just text"),
            json!([1, 2, 3]),
            json!({ "clean": 5, "detailed": ["x"], "extreme": null, "params": 7 }),
            json!({ "clean": "--ar 16:9" }),
        ] {
            let result = normalize_value(raw, ArtStyle::Anime);
            assert!(!result.clean.is_empty());
            assert!(!result.detailed.is_empty());
            assert!(!result.extreme.is_empty());
            assert!(result.negative.contains("3d render"));
            assert!(result.negative.contains("blurry"));
        }
    }

    #[test]
    fn fallback_chain_cascades_downward() {
        let result = normalize_value(json!({ "clean": "a fox" }), ArtStyle::None);
        assert_eq!(result.detailed, "a fox");
        assert_eq!(result.extreme, "a fox");
    }

    #[test]
    fn negative_terms_appear_exactly_once() {
        let raw = json!({
            "clean": "logo",
            "negative": "Blurry, blurry, 3D RENDER, watermark, watermark"
        });
        let result = normalize_value(raw, ArtStyle::VectorLogo);
        for term in style_negatives(ArtStyle::VectorLogo)
            .iter()
            .chain(BASELINE_NEGATIVE)
        {
            assert_eq!(count_term(&result.negative, term), 1, "term {}", term);
        }
        assert!(!result.negative.to_lowercase().contains("logo"));
    }

    #[test]
    fn renormalization_is_idempotent() {
        let first = normalize_value(
            json!({ "clean": "a fox", "negative": "noise, grain" }),
            ArtStyle::Watercolor,
        );
        let second = normalize_value(
            serde_json::to_value(&first).unwrap(),
            ArtStyle::Watercolor,
        );
        assert_eq!(first, second);
    }

    #[test]
    fn empty_model_negative_gets_canonical_lists() {
        let negative = merge_negative("", ArtStyle::None);
        assert_eq!(negative, BASELINE_NEGATIVE.join(", "));
    }
}
