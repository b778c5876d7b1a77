pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "feed")]
#[command(about = "EchoFeed CLI - Command-line client for the EchoFeed API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "ECHOFEED_API_URL",
        default_value = "http://localhost:8080",
        help = "EchoFeed API base URL"
    )]
    pub server: String,

    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Check server and store health")]
    Health,

    #[command(about = "Article document operations")]
    Article {
        #[command(subcommand)]
        cmd: commands::article::ArticleCommands,
    },

    #[command(about = "User document operations and login")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Search the web for articles matching keywords")]
    Search(commands::search::SearchArgs),

    #[command(about = "Recommend articles for a list of keywords")]
    Recommend(commands::search::RecommendArgs),

    #[command(about = "Generate search keywords from free text")]
    Keywords(commands::search::KeywordsArgs),

    #[command(about = "Group keywords into categories")]
    Categories(commands::search::CategoriesArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.server)?;

    match cli.command {
        Commands::Health => {
            let envelope = client.get("/health", &[]).await?;
            utils::output_envelope(&output_format, &envelope)
        }
        Commands::Article { cmd } => commands::article::handle(cmd, &client, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, &client, output_format).await,
        Commands::Search(args) => commands::search::search(args, &client, output_format).await,
        Commands::Recommend(args) => commands::search::recommend(args, &client, output_format).await,
        Commands::Keywords(args) => commands::search::keywords(args, &client, output_format).await,
        Commands::Categories(args) => commands::search::categories(args, &client, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "feed",
            "article",
            "get",
            "abc123",
            "--server",
            "http://api:9000",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.server, "http://api:9000");
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Commands::Article {
                cmd: commands::article::ArticleCommands::Get { .. }
            }
        ));
    }

    #[test]
    fn search_requires_a_date() {
        assert!(Cli::try_parse_from(["feed", "search", "--important", "rust"]).is_err());
    }
}
