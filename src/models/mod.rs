pub mod article;
pub mod user;

pub use article::{Article, ArticlePatch};
pub use user::{User, UserPatch};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A stored document body: field name to JSON value.
pub type Document = Map<String, Value>;

/// The two document kinds EchoFeed keeps in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Article,
    User,
}

impl EntityKind {
    /// Singular name used in messages and payload keys ("article", "user")
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Article => "article",
            EntityKind::User => "user",
        }
    }

    /// Capitalized name for human-readable messages
    pub fn display_name(self) -> &'static str {
        match self {
            EntityKind::Article => "Article",
            EntityKind::User => "User",
        }
    }

    /// Store collection (index) holding documents of this kind
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Article => "articles",
            EntityKind::User => "users",
        }
    }

    /// `article_id` / `user_id`
    pub fn id_key(self) -> String {
        format!("{}_id", self.name())
    }

    /// `article_info` / `user_info`
    pub fn info_key(self) -> String {
        format!("{}_info", self.name())
    }

    /// `articles_info` / `users_info`
    pub fn collection_key(self) -> String {
        format!("{}_info", self.collection())
    }
}

/// Read a list field, treating an explicit `null` like a missing one
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serialize a model into a store document. Models are plain structs of
/// strings, booleans and string lists, so this cannot fail for them.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_keys_follow_entity_kind() {
        assert_eq!(EntityKind::Article.id_key(), "article_id");
        assert_eq!(EntityKind::User.info_key(), "user_info");
        assert_eq!(EntityKind::Article.collection_key(), "articles_info");
        assert_eq!(EntityKind::User.collection(), "users");
    }

    #[test]
    fn to_document_rejects_non_objects() {
        assert!(to_document(&vec!["a", "b"]).is_err());
        let doc = to_document(&serde_json::json!({ "title": "T" })).unwrap();
        assert_eq!(doc.get("title"), Some(&Value::from("T")));
    }
}
