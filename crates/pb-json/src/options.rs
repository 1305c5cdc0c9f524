//! Conversion options.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::hook::EnumHook;

/// Significant digits used for reals unless configured otherwise.
pub const DEFAULT_REAL_PRECISION: u32 = 17;

/// Largest accepted real precision. `0` selects the shortest representation
/// that reads back to the same value.
pub const MAX_REAL_PRECISION: u32 = 31;

/// Options applied to one encode or decode call.
///
/// Cloning deep-copies the registered hooks, so two serializers never share
/// hook instances.
///
/// ```
/// use pb_json::{CharReplaceHook, Options};
///
/// let options = Options::new()
///     .with_enum_as_number(true)
///     .with_enum_hook("demo.Color", CharReplaceHook::new('_', '-'))
///     .with_real_precision(10)
///     .unwrap();
/// assert!(options.enum_as_number());
/// assert_eq!(options.real_precision(), 10);
/// assert!(Options::new().with_real_precision(32).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    enum_as_number: bool,
    deserialize_ignore_case: bool,
    ignore_unknown_fields: bool,
    implicit_string_cast: bool,
    real_precision: u32,
    enum_hooks: BTreeMap<String, Box<dyn EnumHook>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enum_as_number: false,
            deserialize_ignore_case: false,
            ignore_unknown_fields: false,
            implicit_string_cast: true,
            real_precision: DEFAULT_REAL_PRECISION,
            enum_hooks: BTreeMap::new(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode enums as their number instead of their name.
    pub fn with_enum_as_number(mut self, value: bool) -> Self {
        self.enum_as_number = value;
        self
    }

    /// Match JSON keys to field names ignoring ASCII case when decoding.
    pub fn with_deserialize_ignore_case(mut self, value: bool) -> Self {
        self.deserialize_ignore_case = value;
        self
    }

    /// Drop keys that match no field or extension instead of failing.
    pub fn with_ignore_unknown_fields(mut self, value: bool) -> Self {
        self.ignore_unknown_fields = value;
        self
    }

    /// Accept non-string JSON for string fields by using its compact text.
    pub fn with_implicit_string_cast(mut self, value: bool) -> Self {
        self.implicit_string_cast = value;
        self
    }

    pub fn with_real_precision(mut self, digits: u32) -> Result<Self> {
        self.set_real_precision(digits)?;
        Ok(self)
    }

    pub fn with_enum_hook(mut self, enum_type: impl Into<String>, hook: impl EnumHook + 'static) -> Self {
        self.add_enum_hook(enum_type, hook);
        self
    }

    pub fn set_real_precision(&mut self, digits: u32) -> Result<&mut Self> {
        if digits > MAX_REAL_PRECISION {
            return Err(Error::InvalidPrecision(digits));
        }
        self.real_precision = digits;
        Ok(self)
    }

    /// Registers `hook` for the enum type with full name `enum_type`,
    /// replacing any previous hook for it.
    pub fn add_enum_hook(&mut self, enum_type: impl Into<String>, hook: impl EnumHook + 'static) -> &mut Self {
        self.add_boxed_enum_hook(enum_type, Box::new(hook))
    }

    pub fn add_boxed_enum_hook(&mut self, enum_type: impl Into<String>, hook: Box<dyn EnumHook>) -> &mut Self {
        self.enum_hooks.insert(enum_type.into(), hook);
        self
    }

    pub fn enum_as_number(&self) -> bool {
        self.enum_as_number
    }

    pub fn deserialize_ignore_case(&self) -> bool {
        self.deserialize_ignore_case
    }

    pub fn ignore_unknown_fields(&self) -> bool {
        self.ignore_unknown_fields
    }

    pub fn implicit_string_cast(&self) -> bool {
        self.implicit_string_cast
    }

    pub fn real_precision(&self) -> u32 {
        self.real_precision
    }

    pub fn enum_hook(&self, enum_type: &str) -> Option<&dyn EnumHook> {
        self.enum_hooks.get(enum_type).map(|hook| &**hook)
    }
}
