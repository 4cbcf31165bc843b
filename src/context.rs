use crate::prelude::lambda::*;
use std::sync::Arc;

/// The per-invocation execution context handed to a resolver.
///
/// Built fresh for every dispatch and consumed by the resolver, so it never
/// outlives its invocation. Clients are reached only through the handles
/// carried here, never ambiently.
pub struct ResolverContext {
    /// Arguments decoded against the field's declared argument types.
    pub args: Object,

    /// The object instance being resolved; `None` for mutation/query
    /// resolvers. Copied from the request as-is, the schema layer already
    /// validated it.
    pub parent: Option<Object>,

    /// Typed mutation/query gateway, scoped to this invocation.
    pub gateway: GatewayHandle,

    /// Native query client, scoped to this invocation.
    pub dql: DqlHandle,
}

impl std::fmt::Debug for ResolverContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverContext")
            .field("args", &self.args)
            .field("parent", &self.parent)
            .field("gateway", &"GatewayHandle")
            .field("dql", &"DqlHandle")
            .finish()
    }
}

/// A per-invocation handle to the generated-schema gateway.
///
/// Carries the invocation's auth header onto every call it issues.
#[derive(Clone)]
pub struct GatewayHandle {
    transport: Arc<dyn GatewayTransport>,
    auth_header: Option<AuthHeader>,
}

impl GatewayHandle {
    pub(crate) fn new(
        transport: Arc<dyn GatewayTransport>,
        auth_header: Option<AuthHeader>,
    ) -> Self {
        Self {
            transport,
            auth_header,
        }
    }

    /// Execute an operation against the service's own schema.
    pub async fn execute(
        &self,
        query: impl Into<String> + Send,
        variables: Object,
    ) -> Result<Response, QueryError> {
        let request = GatewayRequest::builder()
            .query(query)
            .variables(variables)
            .auth_header(self.auth_header.clone())
            .build();
        self.transport.execute(request).await
    }
}

/// A per-invocation handle to the database's native query interface.
#[derive(Clone)]
pub struct DqlHandle {
    transport: Arc<dyn DqlTransport>,
    auth_header: Option<AuthHeader>,
}

impl DqlHandle {
    pub(crate) fn new(transport: Arc<dyn DqlTransport>, auth_header: Option<AuthHeader>) -> Self {
        Self {
            transport,
            auth_header,
        }
    }

    /// Run a read query, returning the raw result structure unreshaped.
    pub async fn query(
        &self,
        query: impl Into<String> + Send,
        variables: Object,
    ) -> Result<Value, QueryError> {
        let request = DqlRequest::builder()
            .query(query)
            .variables(variables)
            .auth_header(self.auth_header.clone())
            .build();
        self.transport.query(request).await
    }

    /// Apply a JSON mutation with commit-now semantics.
    pub async fn mutate(&self, mutation: Value) -> Result<Value, QueryError> {
        let request = DqlMutation::builder()
            .mutation(mutation)
            .auth_header(self.auth_header.clone())
            .build();
        self.transport.mutate(request).await
    }
}

/// Assembles [`ResolverContext`] values for the dispatcher.
pub struct ContextBuilder {
    schema: Arc<Schema>,
    gateway: Arc<dyn GatewayTransport>,
    dql: Arc<dyn DqlTransport>,
}

impl ContextBuilder {
    pub fn new(
        schema: Arc<Schema>,
        gateway: Arc<dyn GatewayTransport>,
        dql: Arc<dyn DqlTransport>,
    ) -> Self {
        Self {
            schema,
            gateway,
            dql,
        }
    }

    /// Decode the request's arguments and mint fresh client handles bound to
    /// the invocation's auth context.
    pub fn build(&self, request: &ResolveRequest) -> Result<ResolverContext, ResolverError> {
        let args = match self.schema.field(&request.resolver_key()) {
            Some(definition) => self.schema.decode_arguments(definition, &request.args)?,
            // registry validation keeps served traffic inside the schema;
            // anything else passes its arguments through undecoded
            None => request.args.clone(),
        };

        Ok(ResolverContext {
            args,
            parent: request.parent.clone(),
            gateway: GatewayHandle::new(self.gateway.clone(), request.auth_header.clone()),
            dql: DqlHandle::new(self.dql.clone(), request.auth_header.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockDqlTransport, MockGatewayTransport};
    use serde_json_bytes::json as bjson;

    fn context_builder(
        gateway: MockGatewayTransport,
        dql: MockDqlTransport,
    ) -> ContextBuilder {
        let schema = Schema::builder()
            .field(
                FieldDefinition::new(ResolverKey::new("Mutation", "newAuthor")).argument(
                    "name",
                    FieldType::NonNull(Box::new(FieldType::String)),
                ),
            )
            .build();
        ContextBuilder::new(Arc::new(schema), Arc::new(gateway), Arc::new(dql))
    }

    #[tokio::test]
    async fn handles_replay_the_invocation_auth_header() {
        let auth = AuthHeader::builder()
            .key("X-Dgraph-AccessToken")
            .value("token")
            .build();

        let mut gateway = MockGatewayTransport::new();
        let expected = auth.clone();
        gateway
            .expect_execute()
            .times(1)
            .withf(move |request| request.auth_header.as_ref() == Some(&expected))
            .returning(|_| Ok(Response::from_data(Value::Null)));

        let mut dql = MockDqlTransport::new();
        let expected = auth.clone();
        dql.expect_query()
            .times(1)
            .withf(move |request| request.auth_header.as_ref() == Some(&expected))
            .returning(|_| Ok(Value::Null));

        let builder = context_builder(gateway, dql);
        let request = ResolveRequest::builder()
            .type_name("Mutation")
            .field("newAuthor")
            .args(bjson!({ "name": "Ada" }).as_object().cloned().unwrap())
            .auth_header(Some(auth))
            .build();

        let ctx = builder.build(&request).unwrap();
        ctx.gateway.execute("{ health }", Object::new()).await.unwrap();
        ctx.dql.query("schema {}", Object::new()).await.unwrap();
    }

    #[test]
    fn arguments_are_decoded_at_build_time() {
        let builder = context_builder(MockGatewayTransport::new(), MockDqlTransport::new());
        let request = ResolveRequest::builder()
            .type_name("Mutation")
            .field("newAuthor")
            .build();

        let err = builder.build(&request).unwrap_err();
        assert!(matches!(
            err,
            ResolverError::MissingArgument { ref name } if name == "name"
        ));
    }

    #[test]
    fn parent_is_copied_unmodified() {
        let builder = context_builder(MockGatewayTransport::new(), MockDqlTransport::new());
        let parent = bjson!({ "name": "Ada", "reputation": 3.0, "guest_visit_dates": [1, 2, 3] })
            .as_object()
            .cloned()
            .unwrap();
        let request = ResolveRequest::builder()
            .type_name("Author")
            .field("bio")
            .parent(Some(parent.clone()))
            .build();

        let ctx = builder.build(&request).unwrap();
        assert_eq!(ctx.parent, Some(parent));
    }
}
