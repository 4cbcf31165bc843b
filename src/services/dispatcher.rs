//! Implements the dispatch phase of a field-resolution request.

use crate::prelude::lambda::*;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::Poll;
use tower::BoxError;
use tower_service::Service;
use tracing::Instrument;

/// [`Service`] for resolver dispatch.
///
/// Looks up the resolver for an inbound field-resolution request, builds its
/// execution context, invokes it and normalizes the outcome into a response
/// envelope. The dispatcher never retries an invocation and imposes no
/// timeout; it also never rolls back outbound calls a failing resolver
/// already completed. Recovery is the resolver author's, by catching the
/// [`QueryError`].
#[derive(Clone)]
pub struct DispatchService {
    registry: Arc<ResolverRegistry>,
    context_builder: Arc<ContextBuilder>,
}

impl std::fmt::Debug for DispatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchService")
            .field("registry", &self.registry)
            .field("context_builder", &"ContextBuilder")
            .finish()
    }
}

#[buildstructor::builder]
impl DispatchService {
    /// Create a dispatch service.
    ///
    /// The registry is validated against the schema's declared
    /// custom-resolver fields, so a missing or stray registration fails here
    /// instead of on the first request.
    pub fn new(
        registry: Arc<ResolverRegistry>,
        schema: Arc<Schema>,
        gateway: Arc<dyn GatewayTransport>,
        dql: Arc<dyn DqlTransport>,
    ) -> Result<Self, RegistryError> {
        registry.validate(&schema)?;
        Ok(Self {
            registry,
            context_builder: Arc::new(ContextBuilder::new(schema, gateway, dql)),
        })
    }
}

impl DispatchService {
    /// Resolve one field-resolution request to exactly one envelope.
    pub async fn dispatch(&self, request: ResolveRequest) -> Response {
        let span = tracing::info_span!(
            "resolve",
            type_name = %request.type_name,
            field = %request.field
        );
        async move {
            let key = request.resolver_key();
            let path = Some(Path::from(request.field.as_str()));

            let resolver = match self.registry.get(&key) {
                Some(resolver) => resolver,
                None => {
                    tracing::debug!(%key, "no custom resolver for field");
                    let err = ResolverError::ResolverNotFound {
                        type_name: request.type_name.clone(),
                        field_name: request.field.clone(),
                    };
                    return err.to_response(path);
                }
            };

            let ctx = match self.context_builder.build(&request) {
                Ok(ctx) => ctx,
                Err(err) => {
                    tracing::debug!(%key, error = %err, "could not build execution context");
                    return err.to_response(path);
                }
            };

            // The resolver runs to completion on its own task: the
            // dispatcher never cancels an invocation mid-flight, and a panic
            // comes back as a join error rather than unwinding the caller.
            let invocation =
                tokio::task::spawn(async move { resolver.resolve(ctx).await }.in_current_span());

            match invocation.await {
                Ok(Ok(value)) => Response::from_data(value),
                Ok(Err(err)) => {
                    tracing::debug!(%key, error = %err, "resolver failed");
                    err.to_response(path)
                }
                Err(join_error) => ResolverError::from(join_error).to_response(path),
            }
        }
        .instrument(span)
        .await
    }

    /// Resolve independent requests concurrently.
    ///
    /// Responses come back in input order regardless of completion order.
    pub async fn dispatch_batch(&self, requests: Vec<ResolveRequest>) -> Vec<Response> {
        futures::future::join_all(
            requests
                .into_iter()
                .map(|request| self.dispatch(request)),
        )
        .await
    }
}

impl Service<ResolveRequest> for DispatchService {
    type Response = crate::Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        // We break backpressure here: dispatch has no queue of its own.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ResolveRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.dispatch(request).await) })
    }
}
