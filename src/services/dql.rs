use crate::prelude::lambda::*;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use typed_builder::TypedBuilder;
use url::Url;

/// Client for read queries and mutations in the database's native query
/// language, bypassing the generated schema layer. Results come back as the
/// raw nested structure the database reports; reshaping them to a declared
/// return type is the caller's responsibility.
#[derive(TypedBuilder, Clone)]
pub struct ReqwestDqlClient {
    http_client: reqwest_middleware::ClientWithMiddleware,
    service: Arc<String>,
    query_url: Arc<Url>,
    mutate_url: Arc<Url>,
}

impl ReqwestDqlClient {
    /// Construct a new client that will post to the supplied query and
    /// mutate URLs.
    pub fn new(query_url: Url, mutate_url: Url) -> Self {
        let service = "dql".to_string();
        Self {
            http_client: super::http_client(&service),
            service: Arc::new(service),
            query_url: Arc::new(query_url),
            mutate_url: Arc::new(mutate_url),
        }
    }

    pub fn from_configuration(configuration: &Configuration) -> Result<Self, url::ParseError> {
        Ok(Self::new(
            configuration.dql_query_endpoint()?,
            configuration.dql_mutate_endpoint()?,
        ))
    }

    async fn post(
        &self,
        request: reqwest_middleware::RequestBuilder,
        auth: Option<&AuthHeader>,
    ) -> Result<Value, QueryError> {
        let mut request = request;
        if let Some(auth) = auth {
            request = request.header(auth.key.as_str(), auth.value.as_str());
        }

        let response = request.send().await.map_err(|error| QueryError::HttpError {
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

        match raw_result(&self.service, bytes) {
            Err(QueryError::MalformedResponse { .. }) if !status.is_success() => {
                Err(QueryError::HttpError {
                    service: self.service.to_string(),
                    reason: format!("unexpected status {}", status),
                })
            }
            result => result,
        }
    }
}

#[async_trait]
impl DqlTransport for ReqwestDqlClient {
    async fn query(&self, request: DqlRequest) -> Result<Value, QueryError> {
        tracing::debug!("Making request to {} {:?}", self.query_url, request);
        let http_request = self
            .http_client
            .post(self.query_url.as_str())
            .json(&request);
        self.post(http_request, request.auth_header.as_ref()).await
    }

    async fn mutate(&self, request: DqlMutation) -> Result<Value, QueryError> {
        tracing::debug!("Making request to {} {:?}", self.mutate_url, request);
        let http_request = self
            .http_client
            .post(self.mutate_url.as_str())
            .query(&[("commitNow", "true")])
            .json(&request.mutation);
        self.post(http_request, request.auth_header.as_ref()).await
    }
}

/// Decode a response body, splitting database-reported errors out of the raw
/// result structure.
fn raw_result(service: &str, bytes: Bytes) -> Result<Value, QueryError> {
    let value = Value::from_bytes(bytes).map_err(|error| QueryError::MalformedResponse {
        service: service.to_string(),
        reason: error.to_string(),
    })?;

    if let Some(errors) = value
        .as_object()
        .and_then(|object| object.get("errors"))
        .and_then(|errors| errors.as_array())
    {
        if !errors.is_empty() {
            let errors = errors
                .iter()
                .cloned()
                .map(|error| Error::from_value(service, error))
                .collect::<Result<Vec<Error>, QueryError>>()?;
            return Err(QueryError::upstream(service, errors));
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json as bjson;

    #[test]
    fn raw_result_returns_the_body_unreshaped() {
        let body = serde_json::json!({
            "data": { "queryAuthor": [{ "name": "Ada", "reputation": 3.0 }] },
            "extensions": { "server_latency": { "total_ns": 1200 } }
        })
        .to_string();

        let value = raw_result("dql", Bytes::from(body)).unwrap();
        assert_eq!(
            value.get_path(&Path::from("data/queryAuthor/0/name")).unwrap(),
            &bjson!("Ada")
        );
        // extensions are part of the raw structure, not stripped
        assert!(value
            .get_path(&Path::from("extensions/server_latency"))
            .is_ok());
    }

    #[test]
    fn database_errors_become_upstream_failures() {
        let body = serde_json::json!({
            "errors": [{ "message": "while lexing query: unexpected token" }]
        })
        .to_string();

        let err = raw_result("dql", Bytes::from(body)).unwrap_err();
        assert!(matches!(
            err,
            QueryError::Upstream { ref message, .. } if message.contains("unexpected token")
        ));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = raw_result("dql", Bytes::from_static(b"<html>")).unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse { .. }));
    }
}
