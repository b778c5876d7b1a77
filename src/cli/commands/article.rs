use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_envelope, read_document};
use crate::cli::OutputFormat;

const ARTICLES: &str = "/api/v1/articles";

#[derive(Subcommand)]
pub enum ArticleCommands {
    #[command(about = "Create article from JSON (stdin or --file)")]
    Create {
        #[arg(long, help = "Read the article JSON from this file instead of stdin")]
        file: Option<PathBuf>,
    },

    #[command(about = "Show an article by id")]
    Get {
        #[arg(help = "Article id")]
        id: String,
    },

    #[command(about = "Merge JSON fields (stdin or --file) into an article")]
    Update {
        #[arg(help = "Article id")]
        id: String,
        #[arg(long, help = "Read the fields JSON from this file instead of stdin")]
        file: Option<PathBuf>,
    },

    #[command(about = "Delete an article")]
    Delete {
        #[arg(help = "Article id")]
        id: String,
    },

    #[command(about = "List all articles, or only the given ids")]
    List {
        #[arg(help = "Article ids (all articles when omitted)")]
        ids: Vec<String>,
    },

    #[command(about = "Find an article by exact title")]
    Find {
        #[arg(help = "Article title")]
        title: String,
    },
}

pub async fn handle(
    cmd: ArticleCommands,
    client: &ApiClient,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let envelope = match cmd {
        ArticleCommands::Create { file } => {
            let article = read_document(file.as_deref())?;
            client.post(ARTICLES, &json!({ "article_info": article })).await?
        }
        ArticleCommands::Get { id } => client.get(ARTICLES, &[("article_id", id.as_str())]).await?,
        ArticleCommands::Update { id, file } => {
            let fields = read_document(file.as_deref())?;
            client
                .put(ARTICLES, &json!({ "article_id": id, "article_info": fields }))
                .await?
        }
        ArticleCommands::Delete { id } => client.delete(ARTICLES, &[("article_id", id.as_str())]).await?,
        ArticleCommands::List { ids } if ids.is_empty() => {
            client.get(&format!("{}/all", ARTICLES), &[]).await?
        }
        ArticleCommands::List { ids } => {
            client
                .post(&format!("{}/list", ARTICLES), &json!({ "ids_list": ids }))
                .await?
        }
        ArticleCommands::Find { title } => {
            client
                .get(&format!("{}/by-title", ARTICLES), &[("title", title.as_str())])
                .await?
        }
    };

    output_envelope(&output_format, &envelope)
}
