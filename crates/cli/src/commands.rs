//! CLI commands

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Subcommand;
use eva_http::client::Resource;
use eva_http::types::RegisterRequest;
use eva_http::{ApiClient, EventFilter};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and keep the access token for later commands
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "EVA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored access token
    Logout,

    /// Show whether a session is active and if it has administrator rights
    Status,

    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "EVA_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(short, long)]
        email: Option<String>,
    },

    /// Manage events
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CollectionCommands,
    },

    /// Manage participants
    Participants {
        #[command(subcommand)]
        command: CollectionCommands,
    },

    /// List the events the current user is enrolled in
    Enrolled,

    /// List registered users
    Users,
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// List events, optionally filtered
    List {
        #[arg(long)]
        page: Option<u32>,

        /// Category id
        #[arg(long)]
        category: Option<u64>,

        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    #[command(flatten)]
    Item(ItemCommands),
}

#[derive(Subcommand)]
pub enum CollectionCommands {
    /// List the collection
    List {
        /// Query parameter as key=value, repeatable
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    #[command(flatten)]
    Item(ItemCommands),
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Fetch one item
    Get { id: u64 },

    /// Create an item from JSON (inline, or @path to read a file)
    Create {
        #[arg(long)]
        data: String,
    },

    /// Replace an item with JSON (inline, or @path to read a file)
    Update {
        id: u64,

        #[arg(long)]
        data: String,
    },

    /// Delete an item
    Delete { id: u64 },
}

impl Commands {
    /// Run the command and return what should be printed
    pub async fn execute(self, client: &ApiClient) -> Result<Value> {
        match self {
            Self::Login { username, password } => {
                let session = client.login(username, password).await?;
                Ok(json!({
                    "authenticated": session.is_authenticated(),
                    "admin": session.is_admin(),
                }))
            }
            Self::Logout => {
                client.logout();
                info!("Session cleared");
                Ok(json!({ "authenticated": false, "admin": false }))
            }
            Self::Status => {
                let session = client.session();
                let claims = session.claims();
                Ok(json!({
                    "authenticated": session.is_authenticated(),
                    "admin": session.is_admin(),
                    "username": claims.as_ref().and_then(|c| c.username()),
                }))
            }
            Self::Register {
                username,
                password,
                email,
            } => {
                let request = RegisterRequest {
                    username,
                    password,
                    email,
                };
                Ok(client.register(&request).await?)
            }
            Self::Events { command } => match command {
                EventCommands::List {
                    page,
                    category,
                    date,
                } => {
                    let filter = EventFilter {
                        page,
                        category,
                        date,
                    };
                    Ok(serde_json::to_value(
                        client.events().list(&filter.to_params()).await?,
                    )?)
                }
                EventCommands::Item(command) => run_item(client.events(), command).await,
            },
            Self::Categories { command } => run_collection(client.categories(), command).await,
            Self::Participants { command } => {
                run_collection(client.participants(), command).await
            }
            Self::Enrolled => Ok(client.enrolled_events().await?),
            Self::Users => Ok(client.users().await?),
        }
    }
}

async fn run_collection<T>(resource: Resource<'_, T>, command: CollectionCommands) -> Result<Value>
where
    T: Serialize + DeserializeOwned,
{
    match command {
        CollectionCommands::List { params } => {
            Ok(serde_json::to_value(resource.list(&params).await?)?)
        }
        CollectionCommands::Item(command) => run_item(resource, command).await,
    }
}

async fn run_item<T>(resource: Resource<'_, T>, command: ItemCommands) -> Result<Value>
where
    T: Serialize + DeserializeOwned,
{
    let value = match command {
        ItemCommands::Get { id } => serde_json::to_value(resource.get(id).await?)?,
        ItemCommands::Create { data } => {
            let item: T = parse_data(&data)?;
            serde_json::to_value(resource.create(&item).await?)?
        }
        ItemCommands::Update { id, data } => {
            let item: T = parse_data(&data)?;
            serde_json::to_value(resource.update(id, &item).await?)?
        }
        ItemCommands::Delete { id } => {
            resource.delete(id).await?;
            info!("Deleted {}{id}/", resource.collection());
            json!({ "deleted": id })
        }
    };
    Ok(value)
}

fn parse_param(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(anyhow!("parameter name is empty in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_data<T: DeserializeOwned>(data: &str) -> Result<T> {
    let content = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {path}"))?,
        None => data.to_string(),
    };
    serde_json::from_str(&content).context("Payload is not valid JSON for this resource")
}
