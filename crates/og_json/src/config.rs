//! Encoder and decoder configuration.

use core::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use og_reflect::registry::TypeRegistry;
use og_utils::hash::{FixedHashState, HashSet};

use crate::converter::{Converter, ConverterRegistry};
use crate::lazy::{DeferredOracle, LazyValueOracle};

// -----------------------------------------------------------------------------
// Policies

/// How field names become wire names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NamingPolicy {
    /// The field name as declared.
    #[default]
    Verbatim,
    /// `snake_case` field names become `camelCase`.
    CamelCase,
}

impl NamingPolicy {
    /// Applies the policy to a field name.
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Verbatim => name.to_owned(),
            Self::CamelCase => {
                let mut out = String::with_capacity(name.len());
                let mut upper = false;
                for c in name.chars() {
                    if c == '_' {
                        upper = !out.is_empty();
                    } else if upper {
                        out.extend(c.to_uppercase());
                        upper = false;
                    } else {
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}

/// The encoding of date-time values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DateMode {
    /// `yyyy-MM-dd HH:mm:ss` in the offset of the value.
    Short,
    /// RFC 3339 with milliseconds and offset.
    #[default]
    Iso,
    /// `"\/Date(ms+HHMM)\/"`, milliseconds since the Unix epoch.
    Epoch,
}

/// The encoding of enum values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EnumMode {
    /// The variant discriminant.
    #[default]
    Ordinal,
    /// The variant name, or its `JsonName`.
    Name,
}

// -----------------------------------------------------------------------------
// JsonConfig

/// Immutable configuration shared by [`JsonSerializer`] and [`JsonDeserializer`].
///
/// ```
/// use og_json::{DateMode, JsonConfig, NamingPolicy};
///
/// let config = JsonConfig::builder()
///     .naming(NamingPolicy::CamelCase)
///     .omit_nulls(true)
///     .date_mode(DateMode::Epoch)
///     .build();
/// assert!(config.omit_nulls());
/// ```
///
/// [`JsonSerializer`]: crate::JsonSerializer
/// [`JsonDeserializer`]: crate::JsonDeserializer
pub struct JsonConfig {
    naming: NamingPolicy,
    include_only: Option<HashSet<String>>,
    exclude: HashSet<String>,
    omit_nulls: bool,
    emit_type_tags: bool,
    indent_width: usize,
    date_mode: DateMode,
    enum_mode: EnumMode,
    short_date_offset: FixedOffset,
    converters: ConverterRegistry,
    registry: Option<Arc<TypeRegistry>>,
    lazy_oracle: Arc<dyn LazyValueOracle>,
    fingerprint: u64,
}

impl Default for JsonConfig {
    fn default() -> Self {
        JsonConfigBuilder::new().build_config()
    }
}

impl JsonConfig {
    #[inline]
    pub fn builder() -> JsonConfigBuilder {
        JsonConfigBuilder::new()
    }

    #[inline]
    pub fn naming(&self) -> NamingPolicy {
        self.naming
    }

    /// Returns `true` if the field may be encoded under the include and
    /// exclude lists; either its field name or its wire name may be listed.
    pub fn is_included(&self, field_name: &str, wire_name: &str) -> bool {
        if self.exclude.contains(field_name) || self.exclude.contains(wire_name) {
            return false;
        }
        match &self.include_only {
            Some(include) => include.contains(field_name) || include.contains(wire_name),
            None => true,
        }
    }

    #[inline]
    pub fn omit_nulls(&self) -> bool {
        self.omit_nulls
    }

    #[inline]
    pub fn emit_type_tags(&self) -> bool {
        self.emit_type_tags
    }

    #[inline]
    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    #[inline]
    pub fn date_mode(&self) -> DateMode {
        self.date_mode
    }

    #[inline]
    pub fn enum_mode(&self) -> EnumMode {
        self.enum_mode
    }

    /// The offset given to `Short` dates on decode, which carry none.
    #[inline]
    pub fn short_date_offset(&self) -> FixedOffset {
        self.short_date_offset
    }

    #[inline]
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    #[inline]
    pub fn registry(&self) -> Option<&TypeRegistry> {
        self.registry.as_deref()
    }

    #[inline]
    pub fn lazy_oracle(&self) -> &dyn LazyValueOracle {
        &*self.lazy_oracle
    }

    /// A hash of the settings that shape property metadata.
    ///
    /// Two configurations with the same fingerprint share cached metadata.
    #[inline]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl core::fmt::Debug for JsonConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsonConfig")
            .field("naming", &self.naming)
            .field("include_only", &self.include_only)
            .field("exclude", &self.exclude)
            .field("omit_nulls", &self.omit_nulls)
            .field("emit_type_tags", &self.emit_type_tags)
            .field("indent_width", &self.indent_width)
            .field("date_mode", &self.date_mode)
            .field("enum_mode", &self.enum_mode)
            .field("short_date_offset", &self.short_date_offset)
            .field("converters", &self.converters)
            .field("registry", &self.registry.as_ref().map(|r| r.len()))
            .finish_non_exhaustive()
    }
}

fn sorted(set: &HashSet<String>) -> Vec<&str> {
    let mut names: Vec<&str> = set.iter().map(String::as_str).collect();
    names.sort_unstable();
    names
}

fn fingerprint(
    naming: NamingPolicy,
    include_only: Option<&HashSet<String>>,
    exclude: &HashSet<String>,
) -> u64 {
    let mut hasher = FixedHashState.build_hasher();
    naming.hash(&mut hasher);
    include_only.map(sorted).hash(&mut hasher);
    sorted(exclude).hash(&mut hasher);
    hasher.finish()
}

// -----------------------------------------------------------------------------
// JsonConfigBuilder

/// Builder of [`JsonConfig`].
#[must_use]
pub struct JsonConfigBuilder {
    naming: NamingPolicy,
    include_only: Option<HashSet<String>>,
    exclude: HashSet<String>,
    omit_nulls: bool,
    emit_type_tags: bool,
    indent_width: usize,
    date_mode: DateMode,
    enum_mode: EnumMode,
    short_date_offset: FixedOffset,
    converters: ConverterRegistry,
    registry: Option<Arc<TypeRegistry>>,
    lazy_oracle: Arc<dyn LazyValueOracle>,
}

impl Default for JsonConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonConfigBuilder {
    pub fn new() -> Self {
        Self {
            naming: NamingPolicy::default(),
            include_only: None,
            exclude: HashSet::default(),
            omit_nulls: false,
            emit_type_tags: false,
            indent_width: 0,
            date_mode: DateMode::default(),
            enum_mode: EnumMode::default(),
            short_date_offset: Utc.fix(),
            converters: ConverterRegistry::new(),
            registry: None,
            lazy_oracle: Arc::new(DeferredOracle),
        }
    }

    pub fn naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    /// Encodes only the listed properties, by field or wire name.
    pub fn include_only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_only = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Never encodes the listed properties, by field or wire name.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn omit_nulls(mut self, omit_nulls: bool) -> Self {
        self.omit_nulls = omit_nulls;
        self
    }

    /// Writes `"$type"` before the fields of plain objects, and type handles
    /// as their path instead of `null`.
    pub fn emit_type_tags(mut self, emit_type_tags: bool) -> Self {
        self.emit_type_tags = emit_type_tags;
        self
    }

    /// Spaces per nesting level; `0` is compact.
    pub fn indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    pub fn date_mode(mut self, date_mode: DateMode) -> Self {
        self.date_mode = date_mode;
        self
    }

    pub fn enum_mode(mut self, enum_mode: EnumMode) -> Self {
        self.enum_mode = enum_mode;
        self
    }

    pub fn short_date_offset(mut self, offset: FixedOffset) -> Self {
        self.short_date_offset = offset;
        self
    }

    /// Appends a converter; earlier converters take precedence.
    pub fn converter(mut self, converter: impl Converter) -> Self {
        self.converters.push(Arc::new(converter));
        self
    }

    /// Sets the registry used for serde-capable types and `$type` resolution.
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn lazy_oracle(mut self, oracle: impl LazyValueOracle) -> Self {
        self.lazy_oracle = Arc::new(oracle);
        self
    }

    fn build_config(self) -> JsonConfig {
        let fingerprint = fingerprint(self.naming, self.include_only.as_ref(), &self.exclude);
        JsonConfig {
            naming: self.naming,
            include_only: self.include_only,
            exclude: self.exclude,
            omit_nulls: self.omit_nulls,
            emit_type_tags: self.emit_type_tags,
            indent_width: self.indent_width,
            date_mode: self.date_mode,
            enum_mode: self.enum_mode,
            short_date_offset: self.short_date_offset,
            converters: self.converters,
            registry: self.registry,
            lazy_oracle: self.lazy_oracle,
            fingerprint,
        }
    }

    /// Finishes the configuration.
    pub fn build(self) -> Arc<JsonConfig> {
        Arc::new(self.build_config())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{JsonConfig, NamingPolicy};

    #[test]
    fn camel_case_naming() {
        assert_eq!(NamingPolicy::CamelCase.apply("first_name"), "firstName");
        assert_eq!(NamingPolicy::CamelCase.apply("_id"), "id");
        assert_eq!(NamingPolicy::CamelCase.apply("age"), "age");
        assert_eq!(NamingPolicy::Verbatim.apply("first_name"), "first_name");
    }

    #[test]
    fn fingerprint_ignores_list_order() {
        let a = JsonConfig::builder().exclude(["a", "b"]).build();
        let b = JsonConfig::builder().exclude(["b", "a"]).build();
        let c = JsonConfig::builder()
            .exclude(["a", "b"])
            .naming(NamingPolicy::CamelCase)
            .build();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn include_and_exclude_match_either_name() {
        let config = JsonConfig::builder()
            .include_only(["name", "years"])
            .exclude(["secret"])
            .build();
        assert!(config.is_included("name", "name"));
        assert!(config.is_included("age", "years"));
        assert!(!config.is_included("secret", "secret"));
        assert!(!config.is_included("other", "other"));
    }
}
