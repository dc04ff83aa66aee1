//! Per-type property metadata and its process-wide cache.

use core::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock};

use og_reflect::Reflect;
use og_reflect::info::{NamedField, TypeInfo, VariantInfo};
use og_utils::hash::{FixedHashState, HashMap};

use crate::attributes::{JsonConverter, JsonFormat, JsonIgnore, JsonName, JsonSkipIf};
use crate::config::JsonConfig;
use crate::converter::Converter;

// -----------------------------------------------------------------------------
// PropertyMetadata

/// How one struct field is encoded and decoded.
#[derive(Clone)]
pub struct PropertyMetadata {
    field: &'static NamedField,
    index: usize,
    wire_name: String,
    format: Option<&'static str>,
    converter: Option<Arc<dyn Converter>>,
    skip_if: Option<JsonSkipIf>,
}

impl PropertyMetadata {
    fn new(field: &'static NamedField, index: usize, config: &JsonConfig) -> Self {
        let wire_name = match field.get_attribute::<JsonName>() {
            Some(JsonName(name)) => (*name).to_owned(),
            None => config.naming().apply(field.name()),
        };
        Self {
            field,
            index,
            wire_name,
            format: field.get_attribute::<JsonFormat>().map(|format| format.0),
            converter: field
                .get_attribute::<JsonConverter>()
                .map(|converter| Arc::clone(converter.converter())),
            skip_if: field.get_attribute::<JsonSkipIf>().copied(),
        }
    }

    #[inline]
    pub fn field(&self) -> &'static NamedField {
        self.field
    }

    /// The field name as declared.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.field.name()
    }

    /// Index of the field in its struct, the read accessor.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.field.type_info()
    }

    #[inline]
    pub fn default_value(&self) -> Option<Box<dyn Reflect>> {
        self.field.default_value()
    }

    #[inline]
    pub fn format(&self) -> Option<&'static str> {
        self.format
    }

    #[inline]
    pub fn converter(&self) -> Option<&Arc<dyn Converter>> {
        self.converter.as_ref()
    }

    /// Returns `true` if the skip predicate of the field holds for `value`.
    #[inline]
    pub fn should_skip(&self, value: &dyn Reflect) -> bool {
        self.skip_if.is_some_and(|skip_if| skip_if.should_skip(value))
    }
}

// -----------------------------------------------------------------------------
// TypeProperties

/// The encodable properties of a type under one configuration.
///
/// Only structs have properties; every type may still carry a converter.
pub struct TypeProperties {
    info: &'static TypeInfo,
    properties: Vec<PropertyMetadata>,
    by_name: HashMap<String, usize>,
    converter: Option<Arc<dyn Converter>>,
}

impl TypeProperties {
    /// Computes the properties of `info`. The result depends on nothing but
    /// its inputs.
    pub fn build(info: &'static TypeInfo, config: &JsonConfig) -> Self {
        let mut properties = Vec::new();
        let mut by_name = HashMap::default();

        if let Ok(struct_info) = info.as_struct() {
            for (index, field) in struct_info.iter().enumerate() {
                if field.has_attribute::<JsonIgnore>() {
                    continue;
                }
                let property = PropertyMetadata::new(field, index, config);
                if !config.is_included(field.name(), property.wire_name()) {
                    continue;
                }
                let position = properties.len();
                by_name.insert(property.wire_name().to_owned(), position);
                by_name.entry(field.name().to_owned()).or_insert(position);
                properties.push(property);
            }
        }

        Self {
            info,
            properties,
            by_name,
            converter: info
                .get_attribute::<JsonConverter>()
                .map(|converter| Arc::clone(converter.converter())),
        }
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.info
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &PropertyMetadata> {
        self.properties.iter()
    }

    /// Looks a property up by wire name or field name.
    pub fn get(&self, name: &str) -> Option<&PropertyMetadata> {
        self.by_name.get(name).map(|&position| &self.properties[position])
    }

    /// The converter bound to the type through [`JsonConverter`].
    #[inline]
    pub fn converter(&self) -> Option<&Arc<dyn Converter>> {
        self.converter.as_ref()
    }
}

/// The wire name of an enum variant: its `JsonName`, or its name.
pub fn variant_wire_name(variant: &VariantInfo) -> &'static str {
    match variant.get_attribute::<JsonName>() {
        Some(JsonName(name)) => *name,
        None => variant.name(),
    }
}

// -----------------------------------------------------------------------------
// PropertyCache

type CacheKey = (TypeId, u64);

/// Process-wide cache of [`TypeProperties`], keyed by type and by
/// [`JsonConfig::fingerprint`].
///
/// Entries are computed on first use and never invalidated.
pub struct PropertyCache {
    map: RwLock<HashMap<CacheKey, Arc<TypeProperties>>>,
}

static GLOBAL: PropertyCache = PropertyCache::new();

impl PropertyCache {
    const fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::with_hasher(FixedHashState)),
        }
    }

    #[inline]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the properties of `info` under `config`.
    pub fn get(&self, info: &'static TypeInfo, config: &JsonConfig) -> Arc<TypeProperties> {
        let key = (info.type_id(), config.fingerprint());
        if let Some(properties) = self.read(&key) {
            return properties;
        }

        // Computed outside the lock; a racing thread computes the same value.
        let properties = Arc::new(TypeProperties::build(info, config));
        log::debug!(
            "cached {} properties of `{}`",
            properties.properties.len(),
            info.type_path()
        );
        Arc::clone(
            self.map
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(key)
                .or_insert(properties),
        )
    }

    fn read(&self, key: &CacheKey) -> Option<Arc<TypeProperties>> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use og_reflect::derive::Reflect;
    use og_reflect::info::Typed;

    use super::PropertyCache;
    use crate::attributes::{JsonIgnore, JsonName};
    use crate::config::{JsonConfig, NamingPolicy};

    #[derive(Reflect)]
    struct Account {
        user_name: String,
        #[reflect(@JsonName("mail"))]
        email_address: String,
        #[reflect(@JsonIgnore)]
        password: String,
        login_count: u32,
    }

    #[test]
    fn names_follow_policy_and_renames() {
        let config = JsonConfig::builder().naming(NamingPolicy::CamelCase).build();
        let properties = PropertyCache::global().get(Account::type_info(), &config);

        let names: Vec<&str> = properties.iter().map(|p| p.wire_name()).collect();
        assert_eq!(names, ["userName", "mail", "loginCount"]);

        assert_eq!(properties.get("userName").unwrap().index(), 0);
        assert_eq!(properties.get("user_name").unwrap().index(), 0);
        assert_eq!(properties.get("email_address").unwrap().wire_name(), "mail");
        assert!(properties.get("password").is_none());
    }

    #[test]
    fn entries_are_shared_per_policy() {
        let a = JsonConfig::builder().exclude(["login_count"]).build();
        let b = JsonConfig::builder().exclude(["login_count"]).build();
        let c = JsonConfig::default();

        let cache = PropertyCache::global();
        let first = cache.get(Account::type_info(), &a);
        assert!(Arc::ptr_eq(&first, &cache.get(Account::type_info(), &b)));
        assert_eq!(first.iter().len(), 2);
        assert_eq!(cache.get(Account::type_info(), &c).iter().len(), 3);
    }
}
