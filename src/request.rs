use crate::prelude::lambda::*;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// An inbound field-resolution request from the host schema executor.
///
/// `parent` is set for field resolvers and absent for top-level
/// mutation/query resolvers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct ResolveRequest {
    /// The parent type declaring the resolved field.
    #[serde(rename = "type")]
    pub type_name: String,

    /// The resolved field.
    pub field: String,

    /// The raw argument payload, keyed by declared argument name.
    #[serde(default, skip_serializing_if = "Object::is_empty")]
    #[builder(default)]
    pub args: Object,

    /// The object instance currently being resolved, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub parent: Option<Object>,

    /// Auth header forwarded from the originating request, replayed on
    /// outbound Gateway and DQL calls for this invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub auth_header: Option<AuthHeader>,
}

impl ResolveRequest {
    /// The registry key this request resolves to.
    pub fn resolver_key(&self) -> ResolverKey {
        ResolverKey::new(self.type_name.clone(), self.field.clone())
    }
}

/// An auth header forwarded from the inbound request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct AuthHeader {
    pub key: String,
    pub value: String,
}

/// An outbound operation against the service's own generated schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct GatewayRequest {
    /// The graphql operation text.
    pub query: String,

    /// The optional graphql operation name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub operation_name: Option<String>,

    /// The operation variables in the form of a json object.
    #[serde(default, skip_serializing_if = "Object::is_empty")]
    #[builder(default)]
    pub variables: Object,

    /// Per-invocation auth carried out-of-band, never serialized.
    #[serde(skip)]
    #[builder(default)]
    pub auth_header: Option<AuthHeader>,
}

/// An outbound read query in the database's native query language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct DqlRequest {
    /// The query text.
    pub query: String,

    /// Named variables. The database expects names prefixed with `$`.
    #[serde(default, skip_serializing_if = "Object::is_empty")]
    #[builder(default)]
    pub variables: Object,

    /// Per-invocation auth carried out-of-band, never serialized.
    #[serde(skip)]
    #[builder(default)]
    pub auth_header: Option<AuthHeader>,
}

/// An outbound JSON mutation in the database's native language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct DqlMutation {
    /// The mutation body, posted as-is.
    pub mutation: Value,

    /// Per-invocation auth carried out-of-band, never serialized.
    #[serde(skip)]
    #[builder(default)]
    pub auth_header: Option<AuthHeader>,
}
