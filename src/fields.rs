//! Field and tag specifications, and the resolver that evaluates them.
//!
//! A specification is configured once ([`Settings`](crate::Settings)) and
//! evaluated twice per request: against the request context before the inner
//! handler runs, and against the response headers after it returns. Each
//! piece is either a literal or a rule computed from the context:
//!
//! ```rust
//! use serde_json::json;
//! use tome::{FieldSpec, FieldValue, TagSpec, TagValue, RequestInfo};
//!
//! // All literals — straight from a JSON object.
//! let fields: FieldSpec<RequestInfo> = FieldSpec::from(json!({
//!     "zombie": "groan",
//!     "robot": 1001001,
//! }));
//!
//! // Mixed: a literal tag and one computed per request.
//! let tags: TagSpec<RequestInfo> = TagSpec::list([
//!     TagValue::literal("foo"),
//!     TagValue::computed(|req: &RequestInfo| req.method().as_str().into()),
//! ]);
//! ```
//!
//! Resolution is pure: same spec, same context, same result. A computed rule
//! that panics propagates to the caller — a broken rule is a configuration
//! bug, and hiding it would only move the surprise somewhere worse.

use std::sync::Arc;

use serde_json::{Map, Value};

// ── Specification types ───────────────────────────────────────────────────────

/// A single field value: a literal, or a rule computed from the context `C`.
pub enum FieldValue<C> {
    Literal(Value),
    Computed(Arc<dyn Fn(&C) -> Value + Send + Sync>),
}

impl<C> FieldValue<C> {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn computed(rule: impl Fn(&C) -> Value + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(rule))
    }
}

impl<C> Clone for FieldValue<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(v) => Self::Literal(v.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
        }
    }
}

/// A field specification: a set of named entries, or a rule computing the
/// whole set from the context.
pub enum FieldSpec<C> {
    Entries(Vec<(String, FieldValue<C>)>),
    Computed(Arc<dyn Fn(&C) -> Vec<(String, FieldValue<C>)> + Send + Sync>),
}

impl<C> FieldSpec<C> {
    /// A spec of literal fields from a JSON object.
    pub fn map(fields: Map<String, Value>) -> Self {
        Self::Entries(
            fields
                .into_iter()
                .map(|(k, v)| (k, FieldValue::Literal(v)))
                .collect(),
        )
    }

    /// A spec of named entries, each literal or computed.
    pub fn entries(entries: impl IntoIterator<Item = (impl Into<String>, FieldValue<C>)>) -> Self {
        Self::Entries(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A spec whose entire entry set is computed from the context. Entries
    /// the rule returns may themselves be computed; they are invoked with
    /// the same context.
    pub fn computed(
        rule: impl Fn(&C) -> Vec<(String, FieldValue<C>)> + Send + Sync + 'static,
    ) -> Self {
        Self::Computed(Arc::new(rule))
    }
}

/// Builds a literal-only spec from `serde_json::json!({...})`.
///
/// # Panics
///
/// Panics if the value is not a JSON object.
impl<C> From<Value> for FieldSpec<C> {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::map(map),
            other => panic!("field spec must be a JSON object, got {other}"),
        }
    }
}

impl<C> Clone for FieldSpec<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Entries(e) => Self::Entries(e.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
        }
    }
}

/// A single tag: a literal, or a rule computed from the context `C`.
///
/// Whatever the value, the resolved tag is its string representation.
pub enum TagValue<C> {
    Literal(Value),
    Computed(Arc<dyn Fn(&C) -> Value + Send + Sync>),
}

impl<C> TagValue<C> {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn computed(rule: impl Fn(&C) -> Value + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(rule))
    }
}

impl<C> Clone for TagValue<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(v) => Self::Literal(v.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
        }
    }
}

/// A tag specification: an ordered list of tags, or a rule computing the
/// whole list from the context.
pub enum TagSpec<C> {
    List(Vec<TagValue<C>>),
    Computed(Arc<dyn Fn(&C) -> Vec<TagValue<C>> + Send + Sync>),
}

impl<C> TagSpec<C> {
    pub fn list(tags: impl IntoIterator<Item = TagValue<C>>) -> Self {
        Self::List(tags.into_iter().collect())
    }

    pub fn computed(rule: impl Fn(&C) -> Vec<TagValue<C>> + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(rule))
    }
}

/// Builds a literal-only spec from a list of strings.
impl<C, S: Into<String>> FromIterator<S> for TagSpec<C> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::List(
            iter.into_iter()
                .map(|s| TagValue::Literal(Value::String(s.into())))
                .collect(),
        )
    }
}

impl<C> Clone for TagSpec<C> {
    fn clone(&self) -> Self {
        match self {
            Self::List(t) => Self::List(t.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
        }
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Evaluates a field spec against a context.
///
/// `None` resolves to an empty map. Later entries overwrite earlier ones on
/// conflicting keys. Field values keep their native JSON type.
pub fn resolve_fields<C>(spec: Option<&FieldSpec<C>>, context: &C) -> Map<String, Value> {
    let entries = match spec {
        None => return Map::new(),
        Some(FieldSpec::Entries(entries)) => entries.clone(),
        Some(FieldSpec::Computed(rule)) => rule(context),
    };

    let mut fields = Map::new();
    for (key, value) in entries {
        let value = match value {
            FieldValue::Literal(v) => v,
            FieldValue::Computed(rule) => rule(context),
        };
        fields.insert(key, value);
    }
    fields
}

/// Evaluates a tag spec against a context.
///
/// `None` resolves to an empty list. Order is preserved and duplicates are
/// permitted. Every tag is coerced to its string representation.
pub fn resolve_tags<C>(spec: Option<&TagSpec<C>>, context: &C) -> Vec<String> {
    let tags = match spec {
        None => return Vec::new(),
        Some(TagSpec::List(tags)) => tags.clone(),
        Some(TagSpec::Computed(rule)) => rule(context),
    };

    tags.into_iter()
        .map(|tag| match tag {
            TagValue::Literal(v) => coerce_tag(v),
            TagValue::Computed(rule) => coerce_tag(rule(context)),
        })
        .collect()
}

/// Strings pass through unquoted; everything else uses its JSON representation.
fn coerce_tag(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nil_specs_resolve_empty() {
        assert!(resolve_fields::<()>(None, &()).is_empty());
        assert!(resolve_tags::<()>(None, &()).is_empty());
    }

    #[test]
    fn literal_fields_keep_native_types() {
        let spec: FieldSpec<()> = FieldSpec::from(json!({"zombie": "groan", "robot": 1001001}));
        let fields = resolve_fields(Some(&spec), &());
        assert_eq!(fields["zombie"], json!("groan"));
        assert_eq!(fields["robot"], json!(1001001));
    }

    #[test]
    fn computed_entries_receive_the_context() {
        let spec = FieldSpec::entries([
            ("fixed", FieldValue::literal(1)),
            ("doubled", FieldValue::computed(|n: &i64| json!(n * 2))),
        ]);
        let fields = resolve_fields(Some(&spec), &21);
        assert_eq!(fields["fixed"], json!(1));
        assert_eq!(fields["doubled"], json!(42));
    }

    #[test]
    fn computed_spec_may_return_computed_entries() {
        let spec = FieldSpec::computed(|n: &i64| {
            vec![
                ("n".to_owned(), FieldValue::literal(*n)),
                ("next".to_owned(), FieldValue::computed(|n: &i64| json!(n + 1))),
            ]
        });
        let fields = resolve_fields(Some(&spec), &7);
        assert_eq!(fields["n"], json!(7));
        assert_eq!(fields["next"], json!(8));
    }

    #[test]
    fn later_entries_overwrite_earlier_keys() {
        let spec: FieldSpec<()> = FieldSpec::entries([
            ("k", FieldValue::literal("first")),
            ("k", FieldValue::literal("second")),
        ]);
        let fields = resolve_fields(Some(&spec), &());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["k"], json!("second"));
    }

    #[test]
    fn tags_are_coerced_to_strings_in_order() {
        let spec: TagSpec<()> = TagSpec::list([
            TagValue::literal("foo"),
            TagValue::literal(42),
            TagValue::literal(true),
        ]);
        assert_eq!(resolve_tags(Some(&spec), &()), ["foo", "42", "true"]);
    }

    #[test]
    fn computed_tags_receive_the_context() {
        let spec = TagSpec::list([
            TagValue::literal("foo"),
            TagValue::computed(|name: &&str| json!(*name)),
        ]);
        assert_eq!(resolve_tags(Some(&spec), &"Request"), ["foo", "Request"]);
    }

    #[test]
    fn computed_tag_spec_resolves_each_value() {
        let spec = TagSpec::computed(|n: &i64| {
            vec![TagValue::literal(*n), TagValue::computed(|n: &i64| json!(n + 1))]
        });
        assert_eq!(resolve_tags(Some(&spec), &1), ["1", "2"]);
    }

    #[test]
    fn string_tag_spec_from_iterator() {
        let spec: TagSpec<()> = ["a", "b", "a"].into_iter().collect();
        assert_eq!(resolve_tags(Some(&spec), &()), ["a", "b", "a"]);
    }
}
