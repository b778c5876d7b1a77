use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_envelope, read_document};
use crate::cli::OutputFormat;

const USERS: &str = "/api/v1/users";

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Register user from JSON (stdin or --file)")]
    Create {
        #[arg(long, help = "Read the user JSON from this file instead of stdin")]
        file: Option<PathBuf>,
    },

    #[command(about = "Show a user by username")]
    Get {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "Merge JSON fields (stdin or --file) into a user")]
    Update {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Read the fields JSON from this file instead of stdin")]
        file: Option<PathBuf>,
    },

    #[command(about = "Delete a user")]
    Delete {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "List all users, or only the given usernames")]
    List {
        #[arg(help = "Usernames (all users when omitted)")]
        usernames: Vec<String>,
    },

    #[command(about = "Check a username and password")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "FEED_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },
}

pub async fn handle(
    cmd: UserCommands,
    client: &ApiClient,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let envelope = match cmd {
        UserCommands::Create { file } => {
            let user = read_document(file.as_deref())?;
            client.post(USERS, &json!({ "user_info": user })).await?
        }
        UserCommands::Get { username } => client.get(USERS, &[("user_id", username.as_str())]).await?,
        UserCommands::Update { username, file } => {
            let fields = read_document(file.as_deref())?;
            client
                .put(USERS, &json!({ "user_id": username, "user_info": fields }))
                .await?
        }
        UserCommands::Delete { username } => client.delete(USERS, &[("user_id", username.as_str())]).await?,
        UserCommands::List { usernames } if usernames.is_empty() => {
            client.get(&format!("{}/all", USERS), &[]).await?
        }
        UserCommands::List { usernames } => {
            client
                .post(&format!("{}/list", USERS), &json!({ "ids_list": usernames }))
                .await?
        }
        UserCommands::Login { username, password } => {
            client
                .post(
                    &format!("{}/login", USERS),
                    &json!({ "username": username, "password": password }),
                )
                .await?
        }
    };

    output_envelope(&output_format, &envelope)
}
