use crate::prelude::lambda::*;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// A response envelope.
///
/// Produced by the dispatcher for the host schema executor, and decoded from
/// the wire for upstream Gateway calls. Envelopes built through
/// [`Response::from_data`] and [`Response::from_errors`] carry exactly one of
/// `data` and `errors`; envelopes parsed from upstream may carry both, which
/// the Gateway surfaces as a [`QueryError`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct Response {
    /// The response data. Absent on failure envelopes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default)]
    pub data: Option<Value>,

    /// The optional graphql errors encountered.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[builder(default)]
    pub errors: Vec<Error>,

    /// The optional graphql extensions.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    #[builder(default)]
    pub extensions: Object,
}

impl Response {
    /// A success envelope. A resolver legitimately returning `null` yields
    /// `data: null`, distinct from a failure envelope with no data at all.
    pub fn from_data(data: Value) -> Self {
        Response {
            data: Some(data),
            errors: Vec::new(),
            extensions: Object::new(),
        }
    }

    /// A failure envelope.
    pub fn from_errors(errors: Vec<Error>) -> Self {
        Response {
            data: None,
            errors,
            extensions: Object::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// append_errors default the errors `path` with the one provided.
    pub fn append_errors(&mut self, errors: &mut Vec<Error>) {
        self.errors.append(errors)
    }

    pub fn from_bytes(service_name: &str, b: Bytes) -> Result<Response, QueryError> {
        let value = Value::from_bytes(b).map_err(|error| QueryError::MalformedResponse {
            service: service_name.to_string(),
            reason: error.to_string(),
        })?;

        let mut object = match value {
            Value::Object(o) => o,
            _ => {
                return Err(QueryError::MalformedResponse {
                    service: service_name.to_string(),
                    reason: "expected a JSON object".to_string(),
                })
            }
        };

        let data = match object.remove("data") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        };

        let errors = match object.remove("errors") {
            Some(Value::Array(v)) => {
                let res: Result<Vec<Error>, QueryError> = v
                    .into_iter()
                    .map(|v| Error::from_value(service_name, v))
                    .collect();
                res?
            }
            _ => Vec::new(),
        };

        let extensions = match object.remove("extensions") {
            Some(Value::Object(o)) => o,
            _ => Object::new(),
        };

        Ok(Response {
            data,
            errors,
            extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_json_bytes::json as bjson;

    #[test]
    fn test_response() {
        let result = serde_json::from_str::<Response>(
            json!(
            {
              "errors": [
                {
                  "message": "couldn't rewrite mutation addAuthor",
                  "locations": [{ "line": 2, "column": 9 }],
                  "path": ["addAuthor"]
                }
              ],
              "data": {
                "addAuthor": null
              },
              "extensions": {
                "touched_uids": 4,
              }
            })
            .to_string()
            .as_str(),
        );
        assert_eq!(
            result.unwrap(),
            Response::builder()
                .data(Some(bjson!({ "addAuthor": null })))
                .errors(vec![Error {
                    message: "couldn't rewrite mutation addAuthor".into(),
                    locations: vec![Location { line: 2, column: 9 }],
                    path: Some(Path::from("addAuthor")),
                    extensions: Default::default(),
                }])
                .extensions(
                    bjson!({ "touched_uids": 4 })
                        .as_object()
                        .cloned()
                        .unwrap()
                )
                .build()
        );
    }

    #[test]
    fn success_envelope_serializes_data_only() {
        let response = Response::from_data(bjson!("0x1"));
        assert!(response.is_success());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "data": "0x1" })
        );
    }

    #[test]
    fn null_data_is_still_a_success_envelope() {
        let response = Response::from_data(Value::Null);
        assert!(response.is_success());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "data": null })
        );
    }

    #[test]
    fn failure_envelope_serializes_errors_only() {
        let response = Response::from_errors(vec![Error {
            message: "no resolver".to_string(),
            ..Default::default()
        }]);
        assert!(!response.is_success());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "errors": [{ "message": "no resolver" }] })
        );
    }

    #[test]
    fn test_malformed_response_from_bytes() {
        let err = Response::from_bytes("graphql", Bytes::from_static(b"[1, 2]")).unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse { .. }));
    }

    #[test]
    fn test_response_from_bytes() {
        let body = json!({
            "data": { "queryAuthor": [{ "name": "Ada", "reputation": 3.0 }] },
        })
        .to_string();
        let response = Response::from_bytes("dql", Bytes::from(body)).unwrap();
        assert_eq!(
            response.data,
            Some(bjson!({ "queryAuthor": [{ "name": "Ada", "reputation": 3.0 }] }))
        );
        assert!(response.errors.is_empty());
    }
}
