//! Extension field layouts.
//!
//! Two layouts are supported:
//!
//! - **Flat**: every extension is a top-level key named by the extension's
//!   full name, e.g. `{"pkg.Msg.ext": 1}`.
//! - **Nested**: every extension lives under one namespace key (`"ext"` by
//!   default), nested by the segments of its full name, e.g.
//!   `{"ext": {"pkg": {"Msg": {"ext": 1}}}}`.
//!
//! On decode a strategy receives each top-level key that matched no ordinary
//! field. A successful [`ExtensionStrategy::read`] leaves the resolved
//! `(field, value)` pairs in a transient list that the caller drains with
//! [`ExtensionStrategy::take_matches`] before the next `read`. A strategy
//! instance therefore must not be shared between concurrent decodes; clone
//! it instead.

use pb_reflect::{FieldDescriptor, MessageDescriptor};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Namespace key used by the nested layout unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "ext";

/// A resolved extension and the JSON value to assign to it.
pub type ExtensionMatch = (FieldDescriptor, Value);

#[derive(Debug, Clone, Default)]
pub struct FlatExtensions {
    matches: Vec<ExtensionMatch>,
}

impl FlatExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, field: &FieldDescriptor, root: &mut Map<String, Value>, value: Value) {
        if field.is_extension() {
            root.insert(field.full_name().to_string(), value);
        }
    }

    fn read(&mut self, message: &MessageDescriptor, key: &str, value: Value) -> bool {
        self.matches.clear();
        if let Some(field) = message.get_extension_by_full_name(key) {
            self.matches.push((field, value));
        }
        !self.matches.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct NestedExtensions {
    namespace: String,
    matches: Vec<ExtensionMatch>,
}

impl Default for NestedExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl NestedExtensions {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            matches: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn write(&self, field: &FieldDescriptor, root: &mut Map<String, Value>, value: Value) -> Result<()> {
        if !field.is_extension() {
            return Ok(());
        }
        let mut node = child_object(root, &self.namespace, field)?;
        let full_name = field.full_name();
        let scope = full_name.rsplit_once('.').map_or("", |(scope, _)| scope);
        for segment in scope.split('.').filter(|segment| !segment.is_empty()) {
            node = child_object(node, segment, field)?;
        }
        node.insert(field.name().to_string(), value);
        Ok(())
    }

    /// Engages only for the namespace key holding an object. Keys under it
    /// that never resolve to a known extension are dropped, not reported.
    fn read(&mut self, message: &MessageDescriptor, key: &str, value: Value) -> bool {
        self.matches.clear();
        if key != self.namespace {
            return false;
        }
        match value {
            Value::Object(object) => {
                self.read_more(message, "", object);
                true
            }
            _ => false,
        }
    }

    fn read_more(&mut self, message: &MessageDescriptor, prefix: &str, object: Map<String, Value>) {
        for (key, value) in object {
            let name = if prefix.is_empty() {
                key
            } else {
                format!("{prefix}.{key}")
            };
            if let Some(field) = message.get_extension_by_full_name(&name) {
                self.matches.push((field, value));
                continue;
            }
            match value {
                Value::Object(inner) => self.read_more(message, &name, inner),
                _ => debug!(
                    message_type = message.full_name(),
                    extension = %name,
                    "dropping unresolved extension key"
                ),
            }
        }
    }
}

fn child_object<'m>(
    parent: &'m mut Map<String, Value>,
    key: &str,
    field: &FieldDescriptor,
) -> Result<&'m mut Map<String, Value>> {
    let entry = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    match entry {
        Value::Object(map) => Ok(map),
        _ => Err(Error::NamespaceConflict {
            field: field.full_name().to_string(),
            key: key.to_string(),
        }),
    }
}

/// How extension fields are laid out in JSON.
#[derive(Debug, Clone)]
pub enum ExtensionStrategy {
    Flat(FlatExtensions),
    Nested(NestedExtensions),
}

impl Default for ExtensionStrategy {
    fn default() -> Self {
        Self::flat()
    }
}

impl ExtensionStrategy {
    pub fn flat() -> Self {
        ExtensionStrategy::Flat(FlatExtensions::new())
    }

    pub fn nested() -> Self {
        ExtensionStrategy::Nested(NestedExtensions::default())
    }

    pub fn nested_under(namespace: impl Into<String>) -> Self {
        ExtensionStrategy::Nested(NestedExtensions::new(namespace))
    }

    /// The top-level key reserved for extensions, if the layout has one.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            ExtensionStrategy::Flat(_) => None,
            ExtensionStrategy::Nested(nested) => Some(nested.namespace()),
        }
    }

    /// Places the encoded value of extension `field` into `root`, the object
    /// of the message that carries it. Ordinary fields are ignored.
    pub fn write(&self, field: &FieldDescriptor, root: &mut Map<String, Value>, value: Value) -> Result<()> {
        match self {
            ExtensionStrategy::Flat(flat) => {
                flat.write(field, root, value);
                Ok(())
            }
            ExtensionStrategy::Nested(nested) => nested.write(field, root, value),
        }
    }

    /// Tries to resolve top-level `key` of a `message` object as extension
    /// data. Returns `true` when the key belongs to this layout; the resolved
    /// pairs are then available from [`take_matches`](Self::take_matches).
    pub fn read(&mut self, message: &MessageDescriptor, key: &str, value: Value) -> bool {
        match self {
            ExtensionStrategy::Flat(flat) => flat.read(message, key, value),
            ExtensionStrategy::Nested(nested) => nested.read(message, key, value),
        }
    }

    /// Matches left by the last successful `read`, in discovery order.
    pub fn matches(&self) -> &[ExtensionMatch] {
        match self {
            ExtensionStrategy::Flat(flat) => &flat.matches,
            ExtensionStrategy::Nested(nested) => &nested.matches,
        }
    }

    /// Drains the matches of the last `read`.
    pub fn take_matches(&mut self) -> Vec<ExtensionMatch> {
        match self {
            ExtensionStrategy::Flat(flat) => std::mem::take(&mut flat.matches),
            ExtensionStrategy::Nested(nested) => std::mem::take(&mut nested.matches),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_reflect::{DescriptorPool, FieldDef, FieldType, MessageDef};
    use serde_json::json;

    fn pool() -> DescriptorPool {
        DescriptorPool::builder()
            .message(
                MessageDef::new("pkg.Msg").field(FieldDef::optional("plain", 1, FieldType::Int32)),
            )
            .message(MessageDef::new("pkg.Other"))
            .extension("pkg.Msg", "pkg.Msg", FieldDef::optional("ext", 100, FieldType::Int32))
            .extension("vendor", "pkg.Msg", FieldDef::optional("flag", 101, FieldType::Bool))
            .extension("", "pkg.Msg", FieldDef::optional("bare", 102, FieldType::String))
            .extension("pkg", "pkg.Other", FieldDef::optional("elsewhere", 100, FieldType::Int32))
            .build()
            .expect("pool must build")
    }

    fn msg() -> MessageDescriptor {
        pool().get_message_by_name("pkg.Msg").unwrap()
    }

    #[test]
    fn test_flat_write_uses_full_name() {
        let desc = msg();
        let ext = desc.get_extension_by_full_name("pkg.Msg.ext").unwrap();
        let mut root = Map::new();
        ExtensionStrategy::flat()
            .write(&ext, &mut root, json!(7))
            .unwrap();
        assert_eq!(Value::Object(root), json!({"pkg.Msg.ext": 7}));
    }

    #[test]
    fn test_write_ignores_ordinary_fields() {
        let desc = msg();
        let plain = desc.get_field_by_name("plain").unwrap();
        for strategy in [ExtensionStrategy::flat(), ExtensionStrategy::nested()] {
            let mut root = Map::new();
            strategy.write(&plain, &mut root, json!(1)).unwrap();
            assert!(root.is_empty());
        }
    }

    #[test]
    fn test_flat_read() {
        let desc = msg();
        let mut strategy = ExtensionStrategy::flat();
        assert!(strategy.read(&desc, "vendor.flag", json!(true)));
        let matches = strategy.take_matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0.full_name(), "vendor.flag");
        assert_eq!(matches[0].1, json!(true));
        assert!(strategy.matches().is_empty());

        assert!(!strategy.read(&desc, "vendor.unknown", json!(1)));
        // extensions of other messages are not known here
        assert!(!strategy.read(&desc, "pkg.elsewhere", json!(1)));
    }

    #[test]
    fn test_flat_read_clears_previous_matches() {
        let desc = msg();
        let mut strategy = ExtensionStrategy::flat();
        assert!(strategy.read(&desc, "vendor.flag", json!(true)));
        assert!(!strategy.read(&desc, "nope", json!(1)));
        assert!(strategy.matches().is_empty());
    }

    #[test]
    fn test_nested_write_builds_path() {
        let desc = msg();
        let strategy = ExtensionStrategy::nested();
        let mut root = Map::new();
        for (name, value) in [("pkg.Msg.ext", json!(5)), ("vendor.flag", json!(true)), ("bare", json!("b"))] {
            let ext = desc.get_extension_by_full_name(name).unwrap();
            strategy.write(&ext, &mut root, value).unwrap();
        }
        assert_eq!(
            Value::Object(root),
            json!({"ext": {"pkg": {"Msg": {"ext": 5}}, "vendor": {"flag": true}, "bare": "b"}})
        );
    }

    #[test]
    fn test_nested_write_custom_namespace() {
        let desc = msg();
        let ext = desc.get_extension_by_full_name("vendor.flag").unwrap();
        let mut root = Map::new();
        ExtensionStrategy::nested_under("x")
            .write(&ext, &mut root, json!(false))
            .unwrap();
        assert_eq!(Value::Object(root), json!({"x": {"vendor": {"flag": false}}}));
    }

    #[test]
    fn test_nested_write_conflict() {
        let desc = msg();
        let ext = desc.get_extension_by_full_name("vendor.flag").unwrap();
        let mut root = Map::new();
        root.insert("ext".into(), json!(3));
        let err = ExtensionStrategy::nested()
            .write(&ext, &mut root, json!(true))
            .unwrap_err();
        assert_eq!(
            err,
            Error::NamespaceConflict {
                field: "vendor.flag".into(),
                key: "ext".into()
            }
        );
    }

    #[test]
    fn test_namespace_key() {
        assert_eq!(ExtensionStrategy::flat().namespace(), None);
        assert_eq!(ExtensionStrategy::nested().namespace(), Some("ext"));
        assert_eq!(ExtensionStrategy::nested_under("x").namespace(), Some("x"));
    }

    #[test]
    fn test_nested_read_collects_matches_in_order() {
        let desc = msg();
        let mut strategy = ExtensionStrategy::nested();
        let value = json!({"vendor": {"flag": true}, "pkg": {"Msg": {"ext": 9}}, "bare": "z"});
        assert!(strategy.read(&desc, "ext", value));
        let names: Vec<String> = strategy
            .take_matches()
            .iter()
            .map(|(field, _)| field.full_name().to_string())
            .collect();
        assert_eq!(names, vec!["vendor.flag", "pkg.Msg.ext", "bare"]);
    }

    #[test]
    fn test_nested_read_drops_unresolved_keys() {
        let desc = msg();
        let mut strategy = ExtensionStrategy::nested();
        let value = json!({"vendor": {"flag": true, "junk": 1, "deeper": {"x": [1]}}, "stray": "s"});
        assert!(strategy.read(&desc, "ext", value));
        let matches = strategy.take_matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, json!(true));

        assert!(strategy.read(&desc, "ext", json!({"nothing": {"here": 1}})));
        assert!(strategy.take_matches().is_empty());
    }

    #[test]
    fn test_nested_read_ignores_other_keys() {
        let desc = msg();
        let mut strategy = ExtensionStrategy::nested();
        assert!(!strategy.read(&desc, "vendor.flag", json!(true)));
        assert!(!strategy.read(&desc, "ext", json!(5)));
        assert!(!strategy.read(&desc, "ext", json!([{"vendor": {"flag": true}}])));
    }

    #[test]
    fn test_clone_does_not_share_matches() {
        let desc = msg();
        let mut original = ExtensionStrategy::flat();
        let mut copy = original.clone();
        assert!(original.read(&desc, "vendor.flag", json!(true)));
        assert!(copy.matches().is_empty());
        assert!(copy.read(&desc, "pkg.Msg.ext", json!(1)));
        assert_eq!(original.matches()[0].0.full_name(), "vendor.flag");
    }
}
