use crate::prelude::lambda::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use serde_json_bytes::ByteString;
pub use serde_json_bytes::Value;

/// A JSON object.
pub type Object = serde_json_bytes::Map<ByteString, Value>;

/// One element of a response path.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An index path element.
    Index(usize),

    /// A key path element.
    Key(String),
}

/// A path into the result document.
///
/// This can be composed of strings and numbers.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    pub fn empty() -> Path {
        Path(Vec::new())
    }

    pub fn from_slice<T: AsRef<str>>(s: &[T]) -> Self {
        Self(
            s.iter()
                .map(|x| x.as_ref())
                .map(|s| match s.parse::<usize>() {
                    Ok(index) => PathElement::Index(index),
                    Err(_) => PathElement::Key(s.to_string()),
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, element: PathElement) {
        self.0.push(element)
    }
}

impl<T> From<T> for Path
where
    T: AsRef<str>,
{
    fn from(s: T) -> Self {
        Self(
            s.as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| match s.parse::<usize>() {
                    Ok(index) => PathElement::Index(index),
                    Err(_) => PathElement::Key(s.to_string()),
                })
                .collect(),
        )
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in self.0.iter() {
            write!(f, "/")?;
            match element {
                PathElement::Index(index) => write!(f, "{}", index)?,
                PathElement::Key(key) => write!(f, "{}", key)?,
            }
        }
        Ok(())
    }
}

/// Extension trait for navigating nested JSON values by [`Path`].
pub trait ValueExt {
    /// Get a reference to the value at a given path.
    fn get_path<'a>(&'a self, path: &Path) -> Result<&'a Value, JsonExtError>;
}

impl ValueExt for Value {
    fn get_path<'a>(&'a self, path: &Path) -> Result<&'a Value, JsonExtError> {
        let mut current = self;
        for element in path.0.iter() {
            current = match element {
                PathElement::Key(key) => current
                    .as_object()
                    .and_then(|o| o.get(key.as_str()))
                    .ok_or(JsonExtError::PathNotFound)?,
                PathElement::Index(index) => current
                    .as_array()
                    .and_then(|a| a.get(*index))
                    .ok_or(JsonExtError::PathNotFound)?,
            };
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json as bjson;

    #[test]
    fn test_path_display() {
        let path = Path::from("data/addAuthor/author/0/id");
        assert_eq!(path.to_string(), "/data/addAuthor/author/0/id");
    }

    #[test]
    fn test_path_serialization() {
        let path = Path::from("author/0/name");
        assert_eq!(
            serde_json::to_value(&path).unwrap(),
            serde_json::json!(["author", 0, "name"])
        );
    }

    #[test]
    fn test_get_path() {
        let value = bjson!({
            "data": {
                "addAuthor": {
                    "author": [{ "id": "0x1", "reputation": 3.0 }]
                }
            }
        });

        assert_eq!(
            value
                .get_path(&Path::from("data/addAuthor/author/0/id"))
                .unwrap(),
            &bjson!("0x1")
        );
        assert!(matches!(
            value.get_path(&Path::from("data/addAuthor/author/1")),
            Err(JsonExtError::PathNotFound)
        ));
    }
}
