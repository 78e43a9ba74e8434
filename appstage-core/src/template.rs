//! Template binding and design token resolution.
//!
//! Pure functions over `serde_json::Value`, shared by the action handlers
//! and by render layers binding screen components to live data.
//!
//! Two syntaxes drive all data binding in a document:
//! - `$name` — design token reference, resolved against the document's flat
//!   token map;
//! - `{{path}}` — template binding, resolved against a context object
//!   (form state, session user, record data).
//!
//! A string that *is* one binding (`"{{dataSource.rows}}"`) resolves to the
//! raw typed value so lists can bind whole record arrays; a string that
//! merely *contains* bindings (`"Hello {{user.name}}!"`) always degrades to
//! interpolated text. Both modes share the same syntax because the same
//! expression language drives "insert this record object" and "interpolate
//! this sentence".

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

#[allow(clippy::expect_used)]
static FULL_BINDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{(.+)\}\}$").expect("static regex"));

#[allow(clippy::expect_used)]
static EMBEDDED_BINDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("static regex"));

/// Resolve a `$name` design token reference.
///
/// Strings starting with `$` are looked up in `tokens`; a hit returns the
/// token's value (any type), a miss returns the input unchanged. Non-string
/// input passes through untouched, including `0`, `false`, and `""`.
#[must_use]
pub fn resolve_token(value: &Value, tokens: &HashMap<String, Value>) -> Value {
    if let Value::String(s) = value {
        if let Some(name) = s.strip_prefix('$') {
            if let Some(resolved) = tokens.get(name) {
                return resolved.clone();
            }
        }
    }
    value.clone()
}

/// Apply [`resolve_token`] recursively through arbitrary arrays/objects.
#[must_use]
pub fn resolve_all_tokens(node: &Value, tokens: &HashMap<String, Value>) -> Value {
    match node {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_all_tokens(item, tokens))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_all_tokens(v, tokens)))
                .collect(),
        ),
        other => resolve_token(other, tokens),
    }
}

/// Dot-path traversal: `get_nested_value(obj, "a.b.c")`.
///
/// Returns `None` on any missing or null intermediate — never panics.
/// Numeric segments index into arrays (`"rows.0.title"`).
#[must_use]
pub fn get_nested_value<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = obj;
    for segment in path.split('.') {
        if current.is_null() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve `{{path}}` bindings in `template` against `context`.
///
/// - A string matching exactly `^\{\{(.+)\}\}$` returns the *raw* value at
///   that path, preserving its type (object, array, number, boolean); the
///   literal template string when the path is absent.
/// - Any other string with embedded `{{path}}` occurrences has each
///   occurrence replaced by the stringified value at that path.
/// - Arrays and objects are resolved structurally; everything else passes
///   through unchanged.
#[must_use]
pub fn resolve_template(template: &Value, context: &Value) -> Value {
    match template {
        Value::String(s) => {
            if let Some(captures) = FULL_BINDING.captures(s) {
                let path = &captures[1];
                return match get_nested_value(context, path) {
                    Some(found) => found.clone(),
                    None => template.clone(),
                };
            }
            if EMBEDDED_BINDING.is_match(s) {
                return Value::String(interpolate(s, context));
            }
            template.clone()
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_template(item, context))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_template(v, context)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replace every `{{path}}` occurrence in `template` with the stringified
/// value at that path in `context`.
///
/// Absent paths and nulls become the empty string; numbers and booleans use
/// their display form; objects and arrays their compact JSON text.
#[must_use]
pub fn interpolate(template: &str, context: &Value) -> String {
    EMBEDDED_BINDING
        .replace_all(template, |captures: &regex::Captures<'_>| {
            stringify(get_nested_value(context, &captures[1]))
        })
        .into_owned()
}

/// Whether the string contains at least one `{{...}}` binding.
#[must_use]
pub fn has_template_variables(value: &str) -> bool {
    EMBEDDED_BINDING.is_match(value)
}

/// List the paths of every `{{...}}` binding in the string, in order.
#[must_use]
pub fn extract_template_variables(value: &str) -> Vec<String> {
    EMBEDDED_BINDING
        .captures_iter(value)
        .map(|captures| captures[1].to_string())
        .collect()
}

fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(container) => serde_json::to_string(container).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ---- resolve_token ----

    #[test]
    fn token_hit() {
        let tokens = HashMap::from([("color".to_string(), json!("#fff"))]);
        assert_eq!(resolve_token(&json!("$color"), &tokens), json!("#fff"));
    }

    #[test]
    fn token_miss_passes_through() {
        assert_eq!(resolve_token(&json!("$nope"), &HashMap::new()), json!("$nope"));
    }

    #[test]
    fn token_non_string_passes_through() {
        let tokens = HashMap::new();
        assert_eq!(resolve_token(&json!(0), &tokens), json!(0));
        assert_eq!(resolve_token(&json!(false), &tokens), json!(false));
        assert_eq!(resolve_token(&json!(""), &tokens), json!(""));
    }

    #[test]
    fn token_value_may_be_any_type() {
        let tokens = HashMap::from([("spacing".to_string(), json!([4, 8, 16]))]);
        assert_eq!(resolve_token(&json!("$spacing"), &tokens), json!([4, 8, 16]));
    }

    #[test]
    fn all_tokens_recurses() {
        let tokens = HashMap::from([("primary".to_string(), json!("#336"))]);
        let node = json!({"style": {"color": "$primary", "weight": 600}, "tags": ["$primary", "x"]});
        assert_eq!(
            resolve_all_tokens(&node, &tokens),
            json!({"style": {"color": "#336", "weight": 600}, "tags": ["#336", "x"]})
        );
    }

    // ---- get_nested_value ----

    #[test]
    fn nested_lookup() {
        let obj = json!({"a": {"b": {"c": 5}}});
        assert_eq!(get_nested_value(&obj, "a.b.c"), Some(&json!(5)));
    }

    #[test]
    fn nested_lookup_missing_intermediate() {
        let obj = json!({"a": {}});
        assert_eq!(get_nested_value(&obj, "a.b.c"), None);
    }

    #[test]
    fn nested_lookup_null_intermediate() {
        let obj = json!({"a": null});
        assert_eq!(get_nested_value(&obj, "a.b"), None);
    }

    #[test]
    fn nested_lookup_through_array_index() {
        let obj = json!({"rows": [{"title": "first"}]});
        assert_eq!(get_nested_value(&obj, "rows.0.title"), Some(&json!("first")));
        assert_eq!(get_nested_value(&obj, "rows.1.title"), None);
    }

    // ---- resolve_template ----

    #[test]
    fn single_binding_preserves_type() {
        assert_eq!(
            resolve_template(&json!("{{a.b}}"), &json!({"a": {"b": 5}})),
            json!(5)
        );
        assert_eq!(
            resolve_template(&json!("{{rows}}"), &json!({"rows": [{"id": 1}]})),
            json!([{"id": 1}])
        );
        assert_eq!(
            resolve_template(&json!("{{flag}}"), &json!({"flag": false})),
            json!(false)
        );
    }

    #[test]
    fn single_binding_missing_path_returns_literal() {
        assert_eq!(
            resolve_template(&json!("{{missing}}"), &json!({})),
            json!("{{missing}}")
        );
    }

    #[test]
    fn embedded_binding_interpolates() {
        assert_eq!(
            resolve_template(&json!("x {{a}} y"), &json!({"a": "Z"})),
            json!("x Z y")
        );
    }

    #[test]
    fn embedded_binding_stringifies_scalars() {
        let context = json!({"n": 3, "b": true, "nothing": null});
        assert_eq!(
            resolve_template(&json!("n={{n}}/{{b}}/{{nothing}}/{{absent}}"), &context),
            json!("n=3/true//")
        );
    }

    #[test]
    fn brace_delimited_multi_binding_is_one_greedy_path() {
        // "{{a}} {{b}}" matches the whole-string binding form with the
        // greedy path "a}} {{b"; the path never resolves, so the literal
        // comes back instead of an interpolation.
        let context = json!({"a": 1, "b": 2});
        assert_eq!(
            resolve_template(&json!("{{a}} {{b}}"), &context),
            json!("{{a}} {{b}}")
        );
    }

    #[test]
    fn embedded_binding_stringifies_containers_as_json() {
        let context = json!({"o": {"k": 1}});
        assert_eq!(
            resolve_template(&json!("got {{o}}"), &context),
            json!(r#"got {"k":1}"#)
        );
    }

    #[test]
    fn template_recurses_into_containers() {
        let context = json!({"user": {"name": "Ada"}});
        let template = json!({"label": "Hi {{user.name}}", "items": ["{{user}}"]});
        assert_eq!(
            resolve_template(&template, &context),
            json!({"label": "Hi Ada", "items": [{"name": "Ada"}]})
        );
    }

    #[test]
    fn non_string_leaves_untouched() {
        let context = json!({});
        assert_eq!(resolve_template(&json!(7), &context), json!(7));
        assert_eq!(resolve_template(&json!(null), &context), json!(null));
    }

    // ---- detection helpers ----

    #[test]
    fn detects_template_variables() {
        assert!(has_template_variables("a {{b}} c"));
        assert!(!has_template_variables("plain"));
        assert!(!has_template_variables("{not one}"));
    }

    #[test]
    fn extracts_template_variables_in_order() {
        assert_eq!(
            extract_template_variables("{{a}} then {{b.c}}"),
            vec!["a".to_string(), "b.c".to_string()]
        );
        assert!(extract_template_variables("none").is_empty());
    }

    // ---- interpolate ----

    #[test]
    fn interpolate_always_yields_text() {
        let context = json!({"rows": [1, 2]});
        assert_eq!(interpolate("{{rows}}", &context), "[1,2]");
    }
}
