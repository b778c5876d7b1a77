use serde::{Deserialize, Serialize};

/// A registered reader. Stored in the `users` collection under `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// ISO `YYYY-MM-DD`
    pub birthday: String,
    pub location: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub interests: Vec<String>,
    /// Article store ids
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub viewed_articles: Vec<String>,
    /// Article store ids
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub liked_articles: Vec<String>,
    #[serde(default)]
    pub is_admin: bool,
    /// Plaintext on the way in, bcrypt hash at rest
    pub password: String,
}

/// Partial user used by update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewed_articles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_articles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_lists_and_admin_flag_default() {
        let user: User = serde_json::from_value(json!({
            "username": "reader1",
            "first_name": "Ana",
            "last_name": "Pop",
            "birthday": "2000-01-01",
            "location": "Cluj",
            "password": "pw"
        }))
        .unwrap();
        assert!(!user.is_admin);
        assert!(user.interests.is_empty());
        assert!(user.liked_articles.is_empty());
    }

    #[test]
    fn null_lists_read_as_empty() {
        let user: User = serde_json::from_value(json!({
            "username": "reader2",
            "first_name": "Ion",
            "last_name": "Rus",
            "birthday": "1999-05-05",
            "location": "Iasi",
            "interests": null,
            "viewed_articles": null,
            "password": "pw"
        }))
        .unwrap();
        assert!(user.interests.is_empty());
        assert!(user.viewed_articles.is_empty());
    }
}
