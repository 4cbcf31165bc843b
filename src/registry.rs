use crate::prelude::lambda::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The process-wide mapping from resolver keys to resolver functions.
///
/// Built once at startup through [`RegistryBuilder`] and immutable
/// afterwards, so serving requires no locking. Duplicate registration is
/// rejected rather than overwritten: a second registration for a key is a
/// script-authoring mistake we want surfaced at startup, not shadowed.
pub struct ResolverRegistry {
    resolvers: HashMap<ResolverKey, Arc<dyn Resolver>>,
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut debug = f.debug_tuple("ResolverRegistry");
        for key in self.resolvers.keys() {
            debug.field(&key.to_string());
        }
        debug.finish()
    }
}

impl ResolverRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            resolvers: HashMap::new(),
        }
    }

    pub fn get(&self, key: &ResolverKey) -> Option<Arc<dyn Resolver>> {
        self.resolvers.get(key).cloned()
    }

    pub fn contains(&self, key: &ResolverKey) -> bool {
        self.resolvers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Check the registry against the schema's declared custom-resolver
    /// fields, in both directions, so a missing or stray registration is a
    /// startup failure instead of a per-request one.
    pub fn validate(&self, schema: &Schema) -> Result<(), RegistryError> {
        for key in self.resolvers.keys() {
            if schema.field(key).is_none() {
                return Err(RegistryError::UnknownField(key.clone()));
            }
        }
        for definition in schema.fields() {
            if !self.resolvers.contains_key(&definition.key) {
                return Err(RegistryError::MissingResolver(definition.key.clone()));
            }
        }
        Ok(())
    }
}

/// The startup-time registration surface for resolver-authoring scripts.
pub struct RegistryBuilder {
    resolvers: HashMap<ResolverKey, Arc<dyn Resolver>>,
}

impl RegistryBuilder {
    /// Register a resolver under a `"Type.field"` key.
    pub fn register<R>(&mut self, key: &str, resolver: R) -> Result<(), RegistryError>
    where
        R: Resolver + 'static,
    {
        let key = key.parse::<ResolverKey>()?;
        if self.resolvers.contains_key(&key) {
            return Err(RegistryError::DuplicateResolver(key));
        }
        tracing::debug!(%key, "registering resolver");
        self.resolvers.insert(key, Arc::new(resolver));
        Ok(())
    }

    pub fn build(self) -> ResolverRegistry {
        ResolverRegistry {
            resolvers: self.resolvers,
        }
    }
}
