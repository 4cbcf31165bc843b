use crate::prelude::lambda::*;
use async_trait::async_trait;

/// Outbound calls against the service's own generated schema.
///
/// The goal of this trait is to hide the implementation details of executing
/// an operation against the generated endpoint, so dispatch can be tested
/// without a live database and alternative transports can be plugged in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn execute(&self, request: GatewayRequest) -> Result<Response, QueryError>;
}

/// Outbound calls in the database's native query language, bypassing the
/// generated schema layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DqlTransport: Send + Sync {
    /// Run a read query. The raw nested result structure is returned exactly
    /// as the database reports it.
    async fn query(&self, request: DqlRequest) -> Result<Value, QueryError>;

    /// Apply a JSON mutation with commit-now semantics.
    async fn mutate(&self, request: DqlMutation) -> Result<Value, QueryError>;
}
