//! Request bodies and query strings accepted at the HTTP boundary.
//!
//! Every type implements [`Validate`]; the `ValidJson` / `ValidQuery`
//! extractors run it before a handler sees the value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{Article, ArticlePatch, User, UserPatch};

/// Google Custom Search serves at most 10 results per query
pub const MAX_SEARCH_RESULTS: u32 = 10;

pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Check an ISO `YYYY-MM-DD` date
pub fn validate_iso_date(field: &str, value: &str) -> Result<(), ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ApiError::invalid_field(field, format!("'{}' is not a YYYY-MM-DD date", value)))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_field(field, "must not be empty"));
    }
    Ok(())
}

/// Usernames double as user document ids
pub fn validate_username_format(username: &str) -> Result<(), ApiError> {
    let problem = if username.len() < 3 {
        Some("must be at least 3 characters")
    } else if username.len() > 50 {
        Some("must be at most 50 characters")
    } else if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        Some("can only contain letters, numbers, underscore, and hyphen")
    } else if !username.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        Some("must start with a letter or number")
    } else {
        None
    };

    match problem {
        Some(problem) => Err(ApiError::invalid_field("username", problem)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleRequest {
    pub article_info: Article,
}

impl Validate for CreateArticleRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("title", &self.article_info.title)?;
        validate_iso_date("date", &self.article_info.date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateArticleRequest {
    pub article_id: String,
    pub article_info: ArticlePatch,
}

impl Validate for UpdateArticleRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("article_id", &self.article_id)?;
        if self.article_info == ArticlePatch::default() {
            return Err(ApiError::invalid_field("article_info", "must contain at least one field"));
        }
        if let Some(title) = &self.article_info.title {
            require_non_empty("title", title)?;
        }
        if let Some(date) = &self.article_info.date {
            validate_iso_date("date", date)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub user_info: User,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_username_format(&self.user_info.username)?;
        validate_iso_date("birthday", &self.user_info.birthday)?;
        require_non_empty("password", &self.user_info.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: String,
    pub user_info: UserPatch,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("user_id", &self.user_id)?;
        if self.user_info == UserPatch::default() {
            return Err(ApiError::invalid_field("user_info", "must contain at least one field"));
        }
        // The username is the document id and cannot be changed by an update
        if let Some(username) = &self.user_info.username {
            if username != &self.user_id {
                return Err(ApiError::invalid_field("username", "does not match user_id"));
            }
        }
        if let Some(birthday) = &self.user_info.birthday {
            validate_iso_date("birthday", birthday)?;
        }
        if let Some(password) = &self.user_info.password {
            require_non_empty("password", password)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAllFromList {
    pub ids_list: Vec<String>,
}

impl Validate for GetAllFromList {
    fn validate(&self) -> Result<(), ApiError> {
        if self.ids_list.iter().any(|id| id.trim().is_empty()) {
            return Err(ApiError::invalid_field("ids_list", "ids must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("username", &self.username)?;
        require_non_empty("password", &self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchArticlesRequest {
    #[serde(default)]
    pub important_keywords: Vec<String>,
    #[serde(default)]
    pub relevant_keywords: Vec<String>,
    #[serde(default)]
    pub irrelevant_keywords: Vec<String>,
    pub language: String,
    pub min_keywords: u32,
    pub num_results: u32,
    /// Only articles published after this ISO date
    pub date: String,
}

impl Validate for SearchArticlesRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.important_keywords.is_empty()
            && self.relevant_keywords.is_empty()
            && self.irrelevant_keywords.is_empty()
        {
            return Err(ApiError::invalid_field("keywords", "at least one keyword is required"));
        }
        require_non_empty("language", &self.language)?;
        if self.min_keywords == 0 {
            return Err(ApiError::invalid_field("min_keywords", "must be at least 1"));
        }
        if !(1..=MAX_SEARCH_RESULTS).contains(&self.num_results) {
            return Err(ApiError::invalid_field(
                "num_results",
                format!("must be between 1 and {}", MAX_SEARCH_RESULTS),
            ));
        }
        validate_iso_date("date", &self.date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRecommendationsRequest {
    pub keywords: Vec<String>,
    pub language: String,
    pub date: String,
}

impl Validate for GetRecommendationsRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.keywords.is_empty() {
            return Err(ApiError::invalid_field("keywords", "at least one keyword is required"));
        }
        require_non_empty("language", &self.language)?;
        validate_iso_date("date", &self.date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetKeywordsRequest {
    pub user_input: String,
    pub language: String,
}

impl Validate for GetKeywordsRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("user_input", &self.user_input)?;
        require_non_empty("language", &self.language)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCategoriesRequest {
    pub keywords: Vec<String>,
}

impl Validate for GetCategoriesRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.keywords.is_empty() {
            return Err(ApiError::invalid_field("keywords", "at least one keyword is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleIdQuery {
    pub article_id: String,
}

impl Validate for ArticleIdQuery {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("article_id", &self.article_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdQuery {
    pub user_id: String,
}

impl Validate for UserIdQuery {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("user_id", &self.user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

impl Validate for TitleQuery {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("title", &self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_request() -> SearchArticlesRequest {
        serde_json::from_value(json!({
            "important_keywords": ["rust"],
            "relevant_keywords": [],
            "irrelevant_keywords": [],
            "language": "en",
            "min_keywords": 1,
            "num_results": 5,
            "date": "2024-05-01"
        }))
        .unwrap()
    }

    #[test]
    fn iso_dates_are_checked() {
        assert!(validate_iso_date("date", "2024-01-31").is_ok());
        assert!(validate_iso_date("date", "2024-02-30").is_err());
        assert!(validate_iso_date("date", "31/01/2024").is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username_format("reader_1").is_ok());
        assert!(validate_username_format("ab").is_err());
        assert!(validate_username_format("-reader").is_err());
        assert!(validate_username_format("read er").is_err());
    }

    #[test]
    fn search_bounds_num_results() {
        assert!(search_request().validate().is_ok());

        let mut too_many = search_request();
        too_many.num_results = 11;
        assert_eq!(too_many.validate().unwrap_err().status_code(), 400);

        let mut no_keywords = search_request();
        no_keywords.important_keywords.clear();
        assert!(no_keywords.validate().is_err());
    }

    #[test]
    fn update_user_cannot_rename() {
        let request = UpdateUserRequest {
            user_id: "ana".into(),
            user_info: UserPatch {
                username: Some("bob".into()),
                ..Default::default()
            },
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_patch_is_rejected() {
        let request = UpdateArticleRequest {
            article_id: "a1".into(),
            article_info: ArticlePatch::default(),
        };
        assert!(request.validate().is_err());
    }
}
