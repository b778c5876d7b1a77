/// A single system + user exchange sent to the language model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// Overrides the configured completion budget
    pub max_tokens: Option<u32>,
}

const QUERY_MAX_TOKENS: u32 = 100;
const KEYWORDS_MAX_TOKENS: u32 = 100;
const CATEGORIES_MAX_TOKENS: u32 = 300;

const BARE_QUERY: &str = "Reply with the query exactly as it would be typed into \
    Google, as a single line, with no explanation and no surrounding quotes.";

pub fn search_query(
    important: &[String],
    relevant: &[String],
    irrelevant: &[String],
    language: &str,
    min_keywords: u32,
) -> Prompt {
    let system = format!(
        "Build a Google search query that finds recent news articles for the \
         keywords the user provides. Use at least {min} keywords and at most {max}. \
         Write the query in {language}. \
         1. Every important keyword must appear. \
         2. Add relevant keywords only when they relate to the important ones and do not repeat them. \
         3. Use irrelevant keywords only if the query would otherwise have too few keywords, \
         and then only those related to the keywords already chosen. \
         4. You may rephrase the query so that it works well for news search. {bare}",
        min = min_keywords,
        max = min_keywords + 2,
        language = language,
        bare = BARE_QUERY,
    );
    let user = format!(
        "important_keywords: {}; relevant_keywords: {}; irrelevant_keywords: {}",
        important.join(", "),
        relevant.join(", "),
        irrelevant.join(", "),
    );

    Prompt {
        system,
        user,
        max_tokens: Some(QUERY_MAX_TOKENS),
    }
}

pub fn recommendation_query(keywords: &[String], language: &str) -> Prompt {
    Prompt {
        system: format!(
            "Build a Google search query that finds news articles relevant to the \
             keywords the user provides. Write the query in {}. {}",
            language, BARE_QUERY
        ),
        user: keywords.join(", "),
        max_tokens: Some(QUERY_MAX_TOKENS),
    }
}

pub fn keywords(free_text: &str, language: &str) -> Prompt {
    Prompt {
        system: format!(
            "Generate keywords for a news search based on the user's text. \
             Reply with the keywords only, separated by commas. The language is {}.",
            language
        ),
        user: free_text.to_string(),
        max_tokens: Some(KEYWORDS_MAX_TOKENS),
    }
}

pub fn categories(keywords: &[String]) -> Prompt {
    Prompt {
        system: "You sort keywords into relevant categories.".to_string(),
        user: format!(
            "Split the following keywords into categories you choose from the keywords \
             themselves. Return a JSON object whose keys are category names and whose \
             values are lists of keywords. The keywords are: {}.",
            keywords.join(", ")
        ),
        max_tokens: Some(CATEGORIES_MAX_TOKENS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_prompt_carries_the_keyword_partition() {
        let prompt = search_query(
            &["election".into()],
            &["poll".into(), "debate".into()],
            &["weather".into()],
            "Romanian",
            2,
        );
        assert!(prompt.system.contains("at least 2 keywords and at most 4"));
        assert!(prompt.system.contains("Romanian"));
        assert_eq!(
            prompt.user,
            "important_keywords: election; relevant_keywords: poll, debate; irrelevant_keywords: weather"
        );
    }
}
