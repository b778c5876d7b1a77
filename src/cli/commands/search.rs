use clap::Args;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_envelope;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct SearchArgs {
    #[arg(long, value_delimiter = ',', help = "Keywords every result must match")]
    pub important: Vec<String>,

    #[arg(long, value_delimiter = ',', help = "Keywords to add when related")]
    pub relevant: Vec<String>,

    #[arg(long, value_delimiter = ',', help = "Keywords used only as filler")]
    pub irrelevant: Vec<String>,

    #[arg(long, default_value = "en", help = "Query language")]
    pub language: String,

    #[arg(long, default_value_t = 2, help = "Minimum keywords in the query")]
    pub min_keywords: u32,

    #[arg(long, default_value_t = 5, help = "Number of results (1-10)")]
    pub num_results: u32,

    #[arg(long, help = "Only articles published after this date (YYYY-MM-DD)")]
    pub date: String,
}

#[derive(Args)]
pub struct RecommendArgs {
    #[arg(long, value_delimiter = ',', required = true, help = "Interest keywords")]
    pub keywords: Vec<String>,

    #[arg(long, default_value = "en", help = "Query language")]
    pub language: String,

    #[arg(long, help = "Only articles published after this date (YYYY-MM-DD)")]
    pub date: String,
}

#[derive(Args)]
pub struct KeywordsArgs {
    #[arg(help = "Free text describing what to read about")]
    pub text: String,

    #[arg(long, default_value = "en", help = "Keyword language")]
    pub language: String,
}

#[derive(Args)]
pub struct CategoriesArgs {
    #[arg(value_delimiter = ',', required = true, help = "Keywords to categorise")]
    pub keywords: Vec<String>,
}

pub async fn search(args: SearchArgs, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = json!({
        "important_keywords": args.important,
        "relevant_keywords": args.relevant,
        "irrelevant_keywords": args.irrelevant,
        "language": args.language,
        "min_keywords": args.min_keywords,
        "num_results": args.num_results,
        "date": args.date,
    });
    let envelope = client.post("/api/v1/articles/search", &body).await?;
    output_envelope(&output_format, &envelope)
}

pub async fn recommend(args: RecommendArgs, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = json!({
        "keywords": args.keywords,
        "language": args.language,
        "date": args.date,
    });
    let envelope = client.post("/api/v1/articles/recommendation", &body).await?;
    output_envelope(&output_format, &envelope)
}

pub async fn keywords(args: KeywordsArgs, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = json!({ "user_input": args.text, "language": args.language });
    let envelope = client.post("/api/v1/articles/keywords", &body).await?;
    output_envelope(&output_format, &envelope)
}

pub async fn categories(args: CategoriesArgs, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let envelope = client
        .post("/api/v1/articles/categories", &json!({ "keywords": args.keywords }))
        .await?;
    output_envelope(&output_format, &envelope)
}
