//! Bidirectional conversion between reflected protobuf messages and JSON.
//!
//! A [`Serializer`] walks any [`ReflectMessage`](pb_reflect::ReflectMessage)
//! through its descriptor and produces a JSON object, or populates a message
//! from one. Extension fields are placed by an [`ExtensionStrategy`]: flat
//! (`{"pkg.Msg.ext": 1}`) or nested under a namespace key
//! (`{"ext": {"pkg": {"Msg": {"ext": 1}}}}`).
//!
//! # Example
//!
//! ```
//! use pb_json::{CharReplaceHook, Serializer};
//! use pb_reflect::{DescriptorPool, DynamicMessage, EnumDef, FieldDef, FieldType, MessageDef};
//!
//! let pool = DescriptorPool::builder()
//!     .enumeration(EnumDef::new("demo.Color").value("LIGHT_RED", 0).value("DARK_BLUE", 1))
//!     .message(
//!         MessageDef::new("demo.Item")
//!             .field(FieldDef::optional("name", 1, FieldType::String))
//!             .field(FieldDef::repeated("colors", 2, FieldType::Enum("demo.Color".into()))),
//!     )
//!     .extension("demo", "demo.Item", FieldDef::optional("weight", 100, FieldType::Double))
//!     .build()
//!     .unwrap();
//! let desc = pool.get_message_by_name("demo.Item").unwrap();
//!
//! let mut serializer = Serializer::nested();
//! serializer
//!     .options_mut()
//!     .add_enum_hook("demo.Color", CharReplaceHook::new('_', '-'));
//!
//! let input = br#"{"name": "box", "colors": ["DARK-BLUE", 0], "ext": {"demo": {"weight": 2.5}}}"#;
//! let mut item = DynamicMessage::new(desc);
//! serializer.merge_json(input, &mut item).unwrap();
//!
//! assert_eq!(
//!     serializer.to_json(&item).unwrap(),
//!     r#"{"name":"box","colors":["DARK-BLUE","LIGHT-RED"],"ext":{"demo":{"weight":2.5}}}"#
//! );
//! ```

mod decode;
mod encode;

pub mod config;
pub mod error;
pub mod extensions;
pub mod hook;
pub mod options;
pub mod serializer;
pub mod writer;

pub use config::{ExtensionStyle, HookConfig, OptionsConfig, SerializerConfig};
pub use error::{Error, ErrorKind, Result};
pub use extensions::{ExtensionMatch, ExtensionStrategy, FlatExtensions, NestedExtensions, DEFAULT_NAMESPACE};
pub use hook::{CharReplaceHook, EnumHook};
pub use options::{Options, DEFAULT_REAL_PRECISION, MAX_REAL_PRECISION};
pub use serializer::Serializer;
