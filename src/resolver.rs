use crate::prelude::lambda::*;
use async_trait::async_trait;
use futures::Future;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one schema field that delegates to custom logic.
///
/// Renders and parses as the `"Type.field"` form used by registration
/// scripts.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ResolverKey {
    type_name: String,
    field_name: String,
}

impl ResolverKey {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }
}

impl fmt::Display for ResolverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

impl FromStr for ResolverKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((type_name, field_name)) if !type_name.is_empty() && !field_name.is_empty() => {
                Ok(ResolverKey::new(type_name, field_name))
            }
            _ => Err(RegistryError::MalformedKey(s.to_string())),
        }
    }
}

/// A custom resolver.
///
/// Field resolvers read `ctx.parent`; mutation/query resolvers receive no
/// parent. The context is consumed by value, so a resolver cannot retain it
/// beyond its own return. The goal of this trait is to hide how a resolver
/// is implemented: any `async fn(ResolverContext) -> Result<Value,
/// ResolverError>` registers directly through the blanket impl below.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, ctx: ResolverContext) -> Result<Value, ResolverError>;
}

#[async_trait]
impl<F, Fut> Resolver for F
where
    F: Fn(ResolverContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ResolverError>> + Send + 'static,
{
    async fn resolve(&self, ctx: ResolverContext) -> Result<Value, ResolverError> {
        (self)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_parses_the_dotted_form() {
        let key = "Mutation.newAuthor".parse::<ResolverKey>().unwrap();
        assert_eq!(key, ResolverKey::new("Mutation", "newAuthor"));
        assert_eq!(key.to_string(), "Mutation.newAuthor");
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for key in ["newAuthor", "Mutation.", ".newAuthor", ""] {
            assert!(matches!(
                key.parse::<ResolverKey>(),
                Err(RegistryError::MalformedKey(_))
            ));
        }
    }

    #[test]
    fn nested_field_name_keeps_the_first_dot_split() {
        let key = "Query.a.b".parse::<ResolverKey>().unwrap();
        assert_eq!(key.type_name(), "Query");
        assert_eq!(key.field_name(), "a.b");
    }
}
