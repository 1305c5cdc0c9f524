//! Enum name hooks.
//!
//! A hook rewrites enum value names at the JSON boundary:
//! [`EnumHook::pre_serialize`] runs on the declared name before it is
//! written, [`EnumHook::pre_deserialize`] runs on the JSON string before it
//! is looked up. A hook must satisfy
//! `pre_deserialize(pre_serialize(x)) == x` for every name of the enums it is
//! registered for.

use std::fmt;

pub trait EnumHook: fmt::Debug + Send + Sync {
    fn pre_serialize(&self, value: &str) -> String;

    fn pre_deserialize(&self, value: &str) -> String;

    fn clone_box(&self) -> Box<dyn EnumHook>;
}

impl Clone for Box<dyn EnumHook> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Replaces one character with another on the way out and back on the way
/// in.
///
/// Invertible only for names that never contain `to`: with `('_', '-')`,
/// `A_B` round-trips but `A-B` comes back as `A_B`.
///
/// ```
/// use pb_json::{CharReplaceHook, EnumHook};
///
/// let hook = CharReplaceHook::new('_', '-');
/// assert_eq!(hook.pre_serialize("VALUE_1"), "VALUE-1");
/// assert_eq!(hook.pre_deserialize("VALUE-1"), "VALUE_1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharReplaceHook {
    from: char,
    to: char,
}

impl CharReplaceHook {
    pub fn new(from: char, to: char) -> Self {
        Self { from, to }
    }

    pub fn from_char(&self) -> char {
        self.from
    }

    pub fn to_char(&self) -> char {
        self.to
    }
}

impl EnumHook for CharReplaceHook {
    fn pre_serialize(&self, value: &str) -> String {
        value.replace(self.from, &self.to.to_string())
    }

    fn pre_deserialize(&self, value: &str) -> String {
        value.replace(self.to, &self.from.to_string())
    }

    fn clone_box(&self) -> Box<dyn EnumHook> {
        Box::new(*self)
    }
}
