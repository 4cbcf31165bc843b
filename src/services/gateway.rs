use crate::prelude::lambda::*;
use async_trait::async_trait;
use std::sync::Arc;
use typed_builder::TypedBuilder;
use url::Url;

/// Gateway that executes operations against the service's own generated
/// schema over HTTP, so custom resolvers can compose with generated
/// mutations and queries (including ones that trigger further custom
/// resolvers transitively).
#[derive(TypedBuilder, Clone)]
pub struct ReqwestGateway {
    http_client: reqwest_middleware::ClientWithMiddleware,
    service: Arc<String>,
    url: Arc<Url>,
}

impl ReqwestGateway {
    /// Construct a new gateway that will post operations to the supplied
    /// generated-schema URL.
    pub fn new(url: Url) -> Self {
        let service = "graphql".to_string();
        Self {
            http_client: super::http_client(&service),
            service: Arc::new(service),
            url: Arc::new(url),
        }
    }

    pub fn from_configuration(configuration: &Configuration) -> Result<Self, url::ParseError> {
        Ok(Self::new(configuration.graphql_endpoint()?))
    }
}

#[async_trait]
impl GatewayTransport for ReqwestGateway {
    async fn execute(&self, request: GatewayRequest) -> Result<Response, QueryError> {
        tracing::debug!("Making request to {} {:?}", self.url, request);
        let mut http_request = self.http_client.post(self.url.as_str()).json(&request);
        if let Some(auth) = &request.auth_header {
            http_request = http_request.header(auth.key.as_str(), auth.value.as_str());
        }

        let response = http_request
            .send()
            .await
            .map_err(|error| QueryError::HttpError {
                service: self.service.to_string(),
                reason: error.to_string(),
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| QueryError::HttpError {
                service: self.service.to_string(),
                reason: error.to_string(),
            })?;

        match Response::from_bytes(&self.service, bytes) {
            Ok(response) if !response.errors.is_empty() => {
                Err(QueryError::upstream(self.service.as_str(), response.errors))
            }
            Ok(response) => Ok(response),
            Err(_) if !status.is_success() => Err(QueryError::HttpError {
                service: self.service.to_string(),
                reason: format!("unexpected status {}", status),
            }),
            Err(error) => Err(error),
        }
    }
}
