use serde::{Deserialize, Serialize};

/// A news article as stored in the `articles` collection.
///
/// The store-assigned document id is the canonical identifier; `title` is
/// only looked up through the explicit find-by-title operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub url: String,
    /// ISO `YYYY-MM-DD`
    pub date: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub keywords: Vec<String>,
}

/// Partial article used by update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl From<Article> for ArticlePatch {
    fn from(article: Article) -> Self {
        Self {
            title: Some(article.title),
            content: Some(article.content),
            url: Some(article.url),
            date: Some(article.date),
            keywords: Some(article.keywords),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keywords_default_to_empty() {
        let article: Article = serde_json::from_value(json!({
            "title": "T",
            "content": "C",
            "url": "u",
            "date": "2024-01-01"
        }))
        .unwrap();
        assert!(article.keywords.is_empty());
    }

    #[test]
    fn null_keywords_read_as_empty() {
        let article: Article = serde_json::from_value(json!({
            "title": "T",
            "content": "C",
            "url": "u",
            "date": "2024-01-01",
            "keywords": null
        }))
        .unwrap();
        assert!(article.keywords.is_empty());
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = ArticlePatch {
            content: Some("new body".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "content": "new body" }));
    }
}
