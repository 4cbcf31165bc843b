use crate::prelude::lambda::*;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinError;

/// Error types for resolver dispatch.
///
/// Note that these are not returned to the host executor as-is, but are
/// instead converted to JSON for [`struct@Error`].
#[derive(Error, Display, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[ignore_extra_doc_attributes]
pub enum ResolverError {
    /// No custom resolver registered for field '{type_name}.{field_name}'.
    ///
    /// This is a configuration error: registry validation catches it at
    /// startup for every field the schema declares.
    ResolverNotFound {
        /// The parent type of the requested field.
        type_name: String,

        /// The requested field.
        field_name: String,
    },

    /// Argument '{name}' is required, but it was not provided.
    MissingArgument {
        /// Name of the argument.
        name: String,
    },

    /// Argument '{name}' is not declared for the resolved field.
    UnknownArgument {
        /// Name of the argument.
        name: String,
    },

    /// Argument '{name}' could not be decoded: expected '{expected}'.
    InvalidArgument {
        /// Name of the argument.
        name: String,

        /// The declared argument type, in schema syntax.
        expected: String,
    },

    /// Upstream query failed: {0}
    Query(#[from] QueryError),

    /// Resolver failed: {reason}
    ///
    /// A fault in the resolver itself rather than in an awaited call: an
    /// explicit rejection or a panic surfaced through the join handle.
    ResolverFault {
        /// The failure reason.
        reason: String,
    },
}

impl ResolverError {
    pub fn fault(reason: impl Into<String>) -> Self {
        ResolverError::ResolverFault {
            reason: reason.into(),
        }
    }

    /// Convert the resolver error to GraphQL errors.
    ///
    /// A failed upstream call keeps the individual upstream errors; every
    /// other variant serializes itself into the error extensions.
    pub fn to_graphql_errors(&self, path: Option<Path>) -> Vec<Error> {
        match self {
            ResolverError::Query(err) => err.to_graphql_errors(path),
            _ => vec![Error {
                message: self.to_string(),
                locations: Default::default(),
                path,
                extensions: serialize_extensions(self),
            }],
        }
    }

    /// Convert the error to a failure envelope.
    pub fn to_response(&self, path: Option<Path>) -> Response {
        Response::from_errors(self.to_graphql_errors(path))
    }
}

impl From<JoinError> for ResolverError {
    fn from(err: JoinError) -> Self {
        ResolverError::ResolverFault {
            reason: err.to_string(),
        }
    }
}

/// Error types for outbound Gateway and DQL calls.
#[derive(Error, Display, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[ignore_extra_doc_attributes]
pub enum QueryError {
    /// HTTP fetch failed from '{service}': {reason}
    ///
    /// Note that this relates to a transport error and not a GraphQL error.
    HttpError {
        /// The service that failed.
        service: String,

        /// The reason the fetch failed.
        reason: String,
    },

    /// Service '{service}' response was malformed: {reason}
    MalformedResponse {
        /// The service that responded with the malformed response.
        service: String,

        /// The reason the deserialization failed.
        reason: String,
    },

    /// Service '{service}' reported errors: {message}
    Upstream {
        /// The service that reported the errors.
        service: String,

        /// All upstream messages, joined.
        message: String,

        /// The individual upstream errors, unmodified.
        errors: Vec<Error>,
    },
}

impl QueryError {
    /// Aggregate one or more upstream errors into a single failure.
    pub fn upstream(service: impl Into<String>, errors: Vec<Error>) -> Self {
        let message = errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        QueryError::Upstream {
            service: service.into(),
            message,
            errors,
        }
    }

    /// Convert the query error to GraphQL errors, defaulting their `path`
    /// with the one provided.
    pub fn to_graphql_errors(&self, path: Option<Path>) -> Vec<Error> {
        match self {
            QueryError::Upstream { errors, .. } if !errors.is_empty() => errors
                .iter()
                .cloned()
                .map(|mut error| {
                    if error.path.is_none() {
                        error.path = path.clone();
                    }
                    error
                })
                .collect(),
            _ => vec![Error {
                message: self.to_string(),
                locations: Default::default(),
                path,
                extensions: serialize_extensions(self),
            }],
        }
    }
}

fn serialize_extensions<T: Serialize>(value: &T) -> Object {
    serde_json_bytes::to_value(value)
        .ok()
        .and_then(|value| value.as_object().cloned())
        .unwrap_or_default()
}

/// Any error.
#[derive(Error, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct Error {
    /// The error message.
    pub message: String,

    /// The locations of the error from the originating request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    /// The path of the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,

    /// The optional graphql extensions.
    #[serde(default, skip_serializing_if = "Object::is_empty")]
    pub extensions: Object,
}

impl Error {
    pub fn from_value(service_name: &str, value: Value) -> Result<Error, QueryError> {
        serde_json_bytes::from_value(value).map_err(|error| QueryError::MalformedResponse {
            service: service_name.to_string(),
            reason: error.to_string(),
        })
    }
}

/// A location in the request that triggered a graphql error.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// The line number.
    pub line: i32,

    /// The column number.
    pub column: i32,
}

/// An error while processing JSON data.
#[derive(Debug, Error, Display)]
pub enum JsonExtError {
    /// Could not find path in JSON.
    PathNotFound,
}

/// Errors raised while assembling or validating the resolver registry.
#[derive(Error, Display, Debug)]
pub enum RegistryError {
    /// A resolver is already registered for '{0}'.
    DuplicateResolver(ResolverKey),

    /// '{0}' is not a custom-resolver field declared by the schema.
    UnknownField(ResolverKey),

    /// The schema declares custom-resolver field '{0}', but no resolver is registered for it.
    MissingResolver(ResolverKey),

    /// Invalid resolver key '{0}': expected the 'Type.field' form.
    MalformedKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json as bjson;

    #[test]
    fn resolver_not_found_names_the_field() {
        let err = ResolverError::ResolverNotFound {
            type_name: "Query".to_string(),
            field_name: "unknownField".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No custom resolver registered for field 'Query.unknownField'."
        );
    }

    #[test]
    fn error_extensions_carry_the_type_tag() {
        let err = ResolverError::fault("boom");
        let errors = err.to_graphql_errors(Some(Path::from("newAuthor")));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Resolver failed: boom");
        assert_eq!(errors[0].path, Some(Path::from("newAuthor")));
        assert_eq!(
            errors[0].extensions.get("type"),
            Some(&bjson!("ResolverFault"))
        );
    }

    #[test]
    fn upstream_errors_are_preserved_individually() {
        let upstream = vec![
            Error {
                message: "duplicate value".to_string(),
                ..Default::default()
            },
            Error {
                message: "constraint violated".to_string(),
                path: Some(Path::from("addAuthor")),
                ..Default::default()
            },
        ];
        let err = QueryError::upstream("graphql", upstream);
        assert_eq!(
            err.to_string(),
            "Service 'graphql' reported errors: duplicate value; constraint violated"
        );

        let errors = err.to_graphql_errors(Some(Path::from("newAuthor")));
        assert_eq!(errors.len(), 2);
        // the default path only applies where upstream did not set one
        assert_eq!(errors[0].path, Some(Path::from("newAuthor")));
        assert_eq!(errors[1].path, Some(Path::from("addAuthor")));
    }

    #[test]
    fn query_error_converts_to_a_failure_envelope() {
        let err = ResolverError::from(QueryError::HttpError {
            service: "dql".to_string(),
            reason: "connection refused".to_string(),
        });
        let response = err.to_response(None);
        assert!(response.data.is_none());
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("connection refused"));
    }
}
