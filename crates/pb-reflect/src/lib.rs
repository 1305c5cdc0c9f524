//! Schema reflection for protobuf-style messages.
//!
//! Provides a [`DescriptorPool`] built from declarative definitions, a
//! [`DynamicMessage`] that stores values by descriptor, and the
//! [`ReflectMessage`] trait through which converters read and populate
//! messages without compile-time knowledge of their schema.
//!
//! # Example
//!
//! ```
//! use pb_reflect::{DescriptorPool, DynamicMessage, FieldDef, FieldType, MessageDef, Value};
//!
//! let pool = DescriptorPool::builder()
//!     .message(
//!         MessageDef::new("demo.Item")
//!             .field(FieldDef::optional("name", 1, FieldType::String))
//!             .field(FieldDef::repeated("tags", 2, FieldType::String)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut item = DynamicMessage::new(pool.get_message_by_name("demo.Item").unwrap());
//! item.set_field_by_name("name", Value::String("a".into())).unwrap();
//! assert_eq!(item.get_field_by_name("name").and_then(Value::as_str), Some("a"));
//! ```

pub mod def;
pub mod descriptor;
pub mod dynamic;
pub mod error;
pub mod reflect;
pub mod value;

pub use def::{EnumDef, FieldDef, FieldType, MessageDef, PoolBuilder, MAX_FIELD_NUMBER};
pub use descriptor::{
    Cardinality, DescriptorPool, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, Kind,
    MessageDescriptor,
};
pub use dynamic::DynamicMessage;
pub use error::{ReflectError, Result};
pub use reflect::ReflectMessage;
pub use value::{Value, ValueRef};
