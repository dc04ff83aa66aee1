use crate::info::TypeInfo;
use crate::registry::{TypeMeta, TypeRegistry};

/// Resolution of type names to type information.
///
/// A name resolves by full type path first, then by short type name while
/// that name is unambiguous.
pub trait TypeCatalog: Send + Sync {
    /// Returns the meta of the type named `name`.
    fn resolve_meta(&self, name: &str) -> Option<&TypeMeta>;

    /// Returns the info of the type named `name`.
    fn resolve(&self, name: &str) -> Option<&'static TypeInfo> {
        self.resolve_meta(name).map(TypeMeta::type_info)
    }
}

impl TypeCatalog for TypeRegistry {
    fn resolve_meta(&self, name: &str) -> Option<&TypeMeta> {
        self.get_with_type_path(name)
            .or_else(|| self.get_with_type_name(name))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeCatalog;
    use crate::registry::TypeRegistry;

    #[test]
    fn resolve_by_path_or_name() {
        let registry = TypeRegistry::new();
        let by_path = registry.resolve("chrono::DateTime<chrono::Utc>").unwrap();
        let by_name = registry.resolve("DateTime<Utc>").unwrap();
        assert_eq!(by_path.type_id(), by_name.type_id());
        assert!(registry.resolve("u8").unwrap().type_is::<u8>());
        assert!(registry.resolve("Nope").is_none());
    }
}
