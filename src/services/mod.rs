mod dispatcher;
mod dql;
mod gateway;

pub use dispatcher::*;
pub use dql::*;
pub use gateway::*;

/// Build the outbound HTTP client shared by the gateway and DQL services.
pub(crate) fn http_client(service: &str) -> reqwest_middleware::ClientWithMiddleware {
    reqwest_middleware::ClientBuilder::new(
        reqwest::Client::builder()
            .tcp_keepalive(Some(std::time::Duration::from_secs(5)))
            .build()
            .unwrap(),
    )
    .with(reqwest_tracing::TracingMiddleware::default())
    .with(LoggingMiddleware::new(service))
    .build()
}

pub(crate) struct LoggingMiddleware {
    service: String,
}

impl LoggingMiddleware {
    fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

#[async_trait::async_trait]
impl reqwest_middleware::Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut task_local_extensions::Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        tracing::trace!("Request to service {}: {:?}", self.service, req);
        let res = next.run(req, extensions).await;
        tracing::trace!("Response from service {}: {:?}", self.service, res);
        res
    }
}
