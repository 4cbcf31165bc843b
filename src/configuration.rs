use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use url::Url;

/// Runtime configuration.
///
/// Carries the base URL of the backing database; the generated-schema and
/// native-query endpoints derive from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema, TypedBuilder)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Base URL of the backing database.
    #[serde(default = "default_endpoint")]
    #[builder(default_code = "default_endpoint()")]
    pub endpoint: Url,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            endpoint: default_endpoint(),
        }
    }
}

impl Configuration {
    /// URL of the generated GraphQL endpoint.
    pub fn graphql_endpoint(&self) -> Result<Url, url::ParseError> {
        self.endpoint.join("graphql")
    }

    /// URL of the native query endpoint.
    pub fn dql_query_endpoint(&self) -> Result<Url, url::ParseError> {
        self.endpoint.join("query")
    }

    /// URL of the native mutate endpoint.
    pub fn dql_mutate_endpoint(&self) -> Result<Url, url::ParseError> {
        self.endpoint.join("mutate")
    }
}

fn default_endpoint() -> Url {
    Url::parse("http://127.0.0.1:8080/").expect("default endpoint is a valid url; qed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_derive_from_the_base_url() {
        let config = serde_yaml::from_str::<Configuration>("endpoint: http://alpha:8080\n").unwrap();
        assert_eq!(
            config.graphql_endpoint().unwrap().as_str(),
            "http://alpha:8080/graphql"
        );
        assert_eq!(
            config.dql_query_endpoint().unwrap().as_str(),
            "http://alpha:8080/query"
        );
        assert_eq!(
            config.dql_mutate_endpoint().unwrap().as_str(),
            "http://alpha:8080/mutate"
        );
    }

    #[test]
    fn missing_endpoint_falls_back_to_the_default() {
        let config = serde_yaml::from_str::<Configuration>("{}").unwrap();
        assert_eq!(config, Configuration::default());
        assert_eq!(config.endpoint.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_yaml::from_str::<Configuration>("alpha: http://alpha:8080\n").is_err());
    }
}
