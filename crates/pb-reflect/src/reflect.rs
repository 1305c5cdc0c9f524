//! The reflection interface consumed by converters.

use std::fmt;

use crate::descriptor::{FieldDescriptor, MessageDescriptor};
use crate::error::Result;
use crate::value::{Value, ValueRef};

/// Runtime access to a message's fields through descriptors.
///
/// Presence follows proto2 rules: a singular field is set once it has been
/// assigned, a repeated field once it has at least one element.
/// Extensions are addressed with their extension descriptor exactly like
/// ordinary fields.
pub trait ReflectMessage: fmt::Debug {
    fn descriptor(&self) -> MessageDescriptor;

    /// Fields currently set, ordered by field number.
    fn list_fields(&self) -> Vec<FieldDescriptor>;

    fn has_field(&self, field: &FieldDescriptor) -> bool;

    /// Element count of a repeated field; 1 or 0 for a singular one.
    fn field_size(&self, field: &FieldDescriptor) -> usize;

    /// Element `index` of a repeated field, or the value of a singular field
    /// (`index` ignored).
    fn get(&self, field: &FieldDescriptor, index: usize) -> Option<ValueRef<'_>>;

    /// Assigns a singular field.
    fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<()>;

    /// Appends to a repeated field.
    fn add(&mut self, field: &FieldDescriptor, value: Value) -> Result<()>;

    /// Returns the sub-message of a singular message field, creating it first
    /// if unset.
    fn mutable_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn ReflectMessage>;

    /// Appends a fresh sub-message to a repeated message field.
    fn add_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn ReflectMessage>;
}
