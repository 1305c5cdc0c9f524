//! The public conversion entry points.

use pb_reflect::ReflectMessage;
use serde_json::Value;

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{Error, Result};
use crate::extensions::ExtensionStrategy;
use crate::options::Options;
use crate::writer;

/// Converts messages to JSON and back.
///
/// A serializer owns its [`Options`] and [`ExtensionStrategy`]. Encoding
/// only reads them, but decoding records transient extension matches, so
/// `merge_json` takes `&mut self`. Clone the serializer to give each thread
/// its own copy; cloning deep-copies hooks and strategy state.
///
/// ```
/// use pb_json::Serializer;
/// use pb_reflect::{DescriptorPool, DynamicMessage, FieldDef, FieldType, MessageDef};
///
/// let pool = DescriptorPool::builder()
///     .message(MessageDef::new("demo.Point").field(FieldDef::optional("x", 1, FieldType::Int32)))
///     .build()
///     .unwrap();
/// let desc = pool.get_message_by_name("demo.Point").unwrap();
///
/// let mut serializer = Serializer::flat();
/// let mut point = DynamicMessage::new(desc);
/// serializer.merge_json(br#"{"x": 3}"#, &mut point).unwrap();
/// assert_eq!(serializer.to_json(&point).unwrap(), r#"{"x":3}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    extensions: ExtensionStrategy,
    options: Options,
}

impl Serializer {
    pub fn new(extensions: ExtensionStrategy) -> Self {
        Self::with_options(extensions, Options::default())
    }

    pub fn with_options(extensions: ExtensionStrategy, options: Options) -> Self {
        Self { extensions, options }
    }

    /// Extensions as top-level keys named by their full name.
    pub fn flat() -> Self {
        Self::new(ExtensionStrategy::flat())
    }

    /// Extensions nested under the `"ext"` key.
    pub fn nested() -> Self {
        Self::new(ExtensionStrategy::nested())
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn extensions(&self) -> &ExtensionStrategy {
        &self.extensions
    }

    /// Encodes `message` as compact JSON text.
    pub fn to_json(&self, message: &dyn ReflectMessage) -> Result<String> {
        self.to_json_with(message, &self.options)
    }

    /// Like [`to_json`](Self::to_json) but with `options` in place of the
    /// serializer's own.
    pub fn to_json_with(&self, message: &dyn ReflectMessage, options: &Options) -> Result<String> {
        let value = self.encode(message, options)?;
        Ok(writer::to_string(&value, options.real_precision()))
    }

    /// Encodes `message` as a JSON value tree. The tree holds reals at full
    /// precision; `real_precision` applies only to text output.
    pub fn to_json_value(&self, message: &dyn ReflectMessage) -> Result<Value> {
        self.encode(message, &self.options)
    }

    /// Parses `json` and populates `message` from it. The top level must be
    /// an object.
    pub fn merge_json(&mut self, json: &[u8], message: &mut dyn ReflectMessage) -> Result<()> {
        let value: Value = serde_json::from_slice(json)?;
        self.merge_json_value(value, message)
    }

    /// Populates `message` from an already parsed JSON value.
    pub fn merge_json_value(&mut self, value: Value, message: &mut dyn ReflectMessage) -> Result<()> {
        let Value::Object(object) = value else {
            return Err(Error::NotAnObject);
        };
        let mut decoder = Decoder {
            options: &self.options,
            extensions: &mut self.extensions,
        };
        decoder.decode(message, object)
    }

    fn encode(&self, message: &dyn ReflectMessage, options: &Options) -> Result<Value> {
        let encoder = Encoder {
            options,
            extensions: &self.extensions,
        };
        encoder.encode(message).map(Value::Object)
    }
}
