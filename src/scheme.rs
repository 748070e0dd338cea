//! Explicit type registry.
//!
//! A `Scheme` maps Rust types to the kind they are served as, together with
//! a prototype instance that new objects are deep-copied from. It is built by
//! the caller and passed to the generator factories and the harness; there
//! is no process-wide registry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SchemeError;
use crate::types::GroupVersionKind;

struct Registration {
    kind: GroupVersionKind,
    type_name: &'static str,
    prototype: Arc<dyn Any + Send + Sync>,
}

#[derive(Default, Clone)]
pub struct Scheme {
    types: HashMap<TypeId, Arc<Registration>>,
    kinds: HashMap<GroupVersionKind, TypeId>,
}

impl Scheme {
    pub fn new() -> Self {
        Scheme::default()
    }

    /// Registers `prototype` as the template for `T`, served as `kind`.
    ///
    /// Re-registering the same type under the same kind replaces the
    /// prototype. Using a kind for a second type, or a type for a second
    /// kind, is a conflict.
    pub fn register<T>(&mut self, kind: GroupVersionKind, prototype: T) -> Result<&mut Self, SchemeError>
    where
        T: Any + Clone + Send + Sync,
    {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        let kind_taken = self.kinds.get(&kind).is_some_and(|existing| *existing != type_id);
        let type_taken = self.types.get(&type_id).is_some_and(|existing| existing.kind != kind);
        if kind_taken || type_taken {
            return Err(SchemeError::Conflict { kind, type_name });
        }

        tracing::debug!(%kind, type_name, "registering type");
        self.kinds.insert(kind.clone(), type_id);
        self.types.insert(
            type_id,
            Arc::new(Registration { kind, type_name, prototype: Arc::new(prototype) }),
        );
        Ok(self)
    }

    /// A deep copy of the prototype registered for `T`.
    pub fn new_object<T: Any + Clone>(&self) -> Option<T> {
        self.types
            .get(&TypeId::of::<T>())
            .and_then(|reg| reg.prototype.downcast_ref::<T>())
            .cloned()
    }

    pub fn kind_for<T: Any>(&self) -> Option<&GroupVersionKind> {
        self.types.get(&TypeId::of::<T>()).map(|reg| &reg.kind)
    }

    /// Name of the Rust type registered under `kind`.
    pub fn type_name_for(&self, kind: &GroupVersionKind) -> Option<&'static str> {
        self.kinds
            .get(kind)
            .and_then(|id| self.types.get(id))
            .map(|reg| reg.type_name)
    }

    pub fn recognizes<T: Any>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.types.values().map(|reg| reg.kind.to_string())).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GroupVersion;

    #[derive(Debug, Clone, PartialEq)]
    struct Alpha(u32);
    #[derive(Debug, Clone, PartialEq)]
    struct Beta;

    fn gv() -> GroupVersion {
        GroupVersion::new("example.io", "v1")
    }

    #[test]
    fn test_new_object_is_a_copy_of_the_prototype() {
        let mut scheme = Scheme::new();
        scheme.register(gv().with_kind("Alpha"), Alpha(7)).unwrap();

        assert_eq!(scheme.new_object::<Alpha>(), Some(Alpha(7)));
        assert_eq!(scheme.new_object::<Beta>(), None);
        assert!(scheme.recognizes::<Alpha>());
        assert!(!scheme.recognizes::<Beta>());
        assert_eq!(scheme.kind_for::<Alpha>().map(|k| k.kind.as_str()), Some("Alpha"));
        assert!(scheme.type_name_for(&gv().with_kind("Alpha")).unwrap().ends_with("Alpha"));
    }

    #[test]
    fn test_conflicting_registrations() {
        let mut scheme = Scheme::new();
        scheme.register(gv().with_kind("Alpha"), Alpha(1)).unwrap();

        let same_kind = scheme.register(gv().with_kind("Alpha"), Beta);
        assert!(matches!(same_kind, Err(SchemeError::Conflict { .. })));

        let same_type = scheme.register(gv().with_kind("Other"), Alpha(2));
        assert!(matches!(same_type, Err(SchemeError::Conflict { .. })));

        scheme.register(gv().with_kind("Alpha"), Alpha(3)).unwrap();
        assert_eq!(scheme.new_object::<Alpha>(), Some(Alpha(3)));
        assert_eq!(scheme.len(), 1);
    }
}
