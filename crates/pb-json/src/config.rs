//! Declarative serializer configuration.
//!
//! [`SerializerConfig`] deserializes from any serde format, so a serializer
//! can be described in a config file:
//!
//! ```toml
//! extensions = "nested"
//! namespace = "x"
//! enum_as_number = false
//! real_precision = 10
//!
//! [enum_hooks]
//! "demo.Color" = { kind = "char_replace", from = "_", to = "-" }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::extensions::ExtensionStrategy;
use crate::hook::{CharReplaceHook, EnumHook};
use crate::options::{Options, DEFAULT_REAL_PRECISION};
use crate::serializer::Serializer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionStyle {
    #[default]
    Flat,
    Nested,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HookConfig {
    CharReplace { from: char, to: char },
}

impl HookConfig {
    pub fn build(&self) -> Box<dyn EnumHook> {
        match *self {
            HookConfig::CharReplace { from, to } => Box::new(CharReplaceHook::new(from, to)),
        }
    }
}

/// [`Options`] as plain data. Missing keys take the `Options` defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub enum_as_number: bool,
    pub deserialize_ignore_case: bool,
    pub ignore_unknown_fields: bool,
    pub implicit_string_cast: bool,
    pub real_precision: u32,
    /// Keyed by enum type full name.
    pub enum_hooks: BTreeMap<String, HookConfig>,
}

impl Default for OptionsConfig {
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

impl TryFrom<&OptionsConfig> for Options {
    type Error = Error;

    fn try_from(config: &OptionsConfig) -> Result<Self> {
        let mut options = Options::new()
            .with_enum_as_number(config.enum_as_number)
            .with_deserialize_ignore_case(config.deserialize_ignore_case)
            .with_ignore_unknown_fields(config.ignore_unknown_fields)
            .with_implicit_string_cast(config.implicit_string_cast)
            .with_real_precision(config.real_precision)?;
        for (enum_type, hook) in &config.enum_hooks {
            options.add_boxed_enum_hook(enum_type.clone(), hook.build());
        }
        Ok(options)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    pub extensions: ExtensionStyle,
    /// Namespace key of the nested style. Defaults to `"ext"`.
    pub namespace: Option<String>,
    #[serde(flatten)]
    pub options: OptionsConfig,
}

impl SerializerConfig {
    pub fn build(&self) -> Result<Serializer> {
        let extensions = match (self.extensions, self.namespace.as_deref()) {
            (ExtensionStyle::Flat, None) => ExtensionStrategy::flat(),
            (ExtensionStyle::Flat, Some(namespace)) => {
                return Err(Error::InvalidConfig(format!(
                    "namespace \"{namespace}\" is only used by the nested extension style"
                )))
            }
            (ExtensionStyle::Nested, None) => ExtensionStrategy::nested(),
            (ExtensionStyle::Nested, Some("")) => {
                return Err(Error::InvalidConfig("namespace must not be empty".to_string()))
            }
            (ExtensionStyle::Nested, Some(namespace)) => ExtensionStrategy::nested_under(namespace),
        };
        let options = Options::try_from(&self.options)?;
        Ok(Serializer::with_options(extensions, options))
    }
}
