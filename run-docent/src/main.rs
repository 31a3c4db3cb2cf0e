//! docent command line interface
//!
//! `run-docent` with no subcommand starts the interactive chat shell; the
//! subcommands expose login, room management, the admin surface and
//! document indexing for scripting.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docent_adaptor_terminal::{ChatShell, ShellConfig};
use docent_client::{session_file, ApiClient};
use docent_core::types::UserRole;
use docent_core::{config, init_logging};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "run-docent",
    version,
    about = "Terminal client for a docent deployment"
)]
struct Cli {
    /// Log level filter
    #[arg(long, env = "DOCENT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Backend base URL
    #[arg(long, env = "DOCENT_API_URL")]
    api_url: Option<String>,

    /// Model to answer with, overriding the server default
    #[arg(long, env = "DOCENT_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive chat (the default)
    Chat,
    /// Sign in and save the session token
    Login {
        /// Request the admin consent flow
        #[arg(long)]
        admin: bool,
    },
    /// Sign out and drop the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Chat room management
    Rooms {
        #[command(subcommand)]
        command: RoomsCommand,
    },
    /// Print the service configuration
    Config,
    /// Print the maintenance status
    Status,
    /// Admin surface
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Document storage and indexing
    Docs {
        #[command(subcommand)]
        command: DocsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RoomsCommand {
    /// List rooms, newest first
    List,
    /// Create a room
    Create,
    /// Rename a room
    Rename { id: String, name: String },
    /// Delete a room
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Usage dashboard
    Dashboard,
    /// Registered accounts
    Users,
    /// Change an account's role
    SetRole { user_id: String, role: String },
    /// Search index types with display order
    Indexes,
    /// Rename an index type's folder
    RenameIndex { id: String, folder_name: String },
    /// Reorder index types; pass every id in the new order
    Reorder { ids: Vec<String> },
}

#[derive(Subcommand, Debug)]
enum DocsCommand {
    /// Upload a document for indexing
    Upload {
        file: PathBuf,
        #[arg(long)]
        index_type: String,
    },
    /// List stored blobs
    List,
    /// Delete a stored blob
    Delete { blob: String },
    /// List indexed files
    Indexed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_env()?;
    let cli = Cli::parse();
    std::env::set_var("DOCENT_LOG_LEVEL", &cli.log_level);
    init_logging();
    if let Some(url) = &cli.api_url {
        std::env::set_var("DOCENT_API_URL", url);
    }

    let client = ApiClient::from_env()?.on_unauthorized(|| {
        let _ = session_file::clear_session();
        eprintln!("The backend rejected the session. Run `run-docent login` to sign in again.");
    });

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let mut shell = ChatShell::new(client, ShellConfig { model: cli.model });
            shell.run().await?;
        }
        Commands::Login { admin } => login(&client, admin).await?,
        Commands::Logout => logout(&client).await?,
        Commands::Whoami => whoami(&client).await?,
        Commands::Rooms { command } => rooms(&client, command).await?,
        Commands::Config => print_config(&client).await?,
        Commands::Status => print_status(&client).await?,
        Commands::Admin { command } => admin(&client, command).await?,
        Commands::Docs { command } => docs(&client, command).await?,
    }
    Ok(())
}

async fn login(client: &ApiClient, admin: bool) -> anyhow::Result<()> {
    let auth = if admin {
        client.admin_auth_url().await?
    } else {
        client.auth_url().await?
    };
    println!("Open this URL in a browser and sign in:\n\n  {}\n", auth.auth_url);
    print!("Paste the code from the callback URL: ");
    io::stdout().flush()?;

    let mut code = String::new();
    io::stdin().read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        anyhow::bail!("no code given");
    }

    let token = client.complete_auth(code).await?;
    session_file::save_session(&token)?;
    println!(
        "Signed in. Session saved to {}",
        session_file::session_file_path().display()
    );
    Ok(())
}

async fn logout(client: &ApiClient) -> anyhow::Result<()> {
    // The local session goes away even when the backend call fails.
    if let Err(e) = client.logout().await {
        debug!(error = %e, "server-side logout failed");
    }
    session_file::clear_session()?;
    println!("Signed out.");
    Ok(())
}

async fn whoami(client: &ApiClient) -> anyhow::Result<()> {
    let user = client.user_info().await?;
    match user.name {
        Some(name) => println!("{} <{}>", name, user.email),
        None => println!("{}", user.email),
    }
    println!("role: {}", user.role.as_str());
    Ok(())
}

async fn rooms(client: &ApiClient, command: RoomsCommand) -> anyhow::Result<()> {
    match command {
        RoomsCommand::List => {
            let rooms = client.list_chat_rooms().await?;
            if rooms.is_empty() {
                println!("no rooms.");
                return Ok(());
            }
            for room in rooms.iter().rev() {
                match room.created_at {
                    Some(ts) => println!("{}  {}  ({})", room.id, room.name, ts.format("%Y-%m-%d")),
                    None => println!("{}  {}", room.id, room.name),
                }
            }
        }
        RoomsCommand::Create => {
            let room = client.create_chat_room().await?;
            println!("{}  {}", room.id, room.name);
        }
        RoomsCommand::Rename { id, name } => {
            let room = client.update_chat_room(&id, Some(&name), None).await?;
            println!("renamed to {}", room.name);
        }
        RoomsCommand::Delete { id } => {
            client.delete_chat_room(&id).await?;
            println!("deleted.");
        }
    }
    Ok(())
}

async fn print_config(client: &ApiClient) -> anyhow::Result<()> {
    let config = client.core_config().await?;
    println!("name: {}", config.name);
    match &config.default_model {
        Some(model) => println!("default model: {}", model),
        None => println!("default model: (none)"),
    }
    println!("models:");
    for model in &config.model_list {
        println!("  {}", model);
    }
    println!("search indexes:");
    for (id, name) in config.index_options() {
        println!("  {}  {}", id, name);
    }
    Ok(())
}

async fn print_status(client: &ApiClient) -> anyhow::Result<()> {
    let status = client.maintenance_status().await?;
    if status.maintenance {
        println!("maintenance: yes");
        if !status.message.is_empty() {
            println!("{}", status.message);
        }
    } else {
        println!("maintenance: no");
    }
    if !status.status.is_empty() {
        println!("status: {}", status.status);
    }
    Ok(())
}

async fn admin(client: &ApiClient, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        AdminCommand::Dashboard => {
            let dashboard = client.admin_dashboard().await?;
            println!("chats in the last 24h: {}", dashboard.last_24h_chat_count);
            if !dashboard.last_7days_transition.is_empty() {
                println!("last 7 days:");
                for day in &dashboard.last_7days_transition {
                    println!(
                        "  {}  {:>5} chats  {:>10} tokens",
                        day.date, day.chat_count, day.token_usage
                    );
                }
            }
            println!("accounts: {}", dashboard.user_list.len());
            if !dashboard.latest_chat_list.is_empty() {
                println!("latest messages:");
                for message in dashboard.latest_chat_list.iter().take(10) {
                    println!("  [{}] {}", message.role.as_str(), message.message);
                }
            }
        }
        AdminCommand::Users => {
            let dashboard = client.admin_dashboard().await?;
            for user in &dashboard.user_list {
                println!("{}  {}  {}", user.id, user.email, user.role.as_str());
            }
        }
        AdminCommand::SetRole { user_id, role } => {
            let role: UserRole = role.parse()?;
            client.update_user_role(&user_id, role).await?;
            println!("role updated.");
        }
        AdminCommand::Indexes => {
            let indexes = client.admin_search_index_types().await?;
            for index in &indexes {
                match index.display_order {
                    Some(order) => println!("{:>3}  {}  {}", order, index.id, index.folder_name),
                    None => println!("  -  {}  {}", index.id, index.folder_name),
                }
            }
        }
        AdminCommand::RenameIndex { id, folder_name } => {
            client.rename_search_index_type(&id, &folder_name).await?;
            println!("renamed.");
        }
        AdminCommand::Reorder { ids } => {
            client.reorder_search_index_types(&ids).await?;
            println!("reordered.");
        }
    }
    Ok(())
}

async fn docs(client: &ApiClient, command: DocsCommand) -> anyhow::Result<()> {
    match command {
        DocsCommand::Upload { file, index_type } => {
            let ack = client.upload_document(&file, &index_type).await?;
            match ack.message {
                Some(message) => println!("{}", message),
                None => println!("accepted for indexing."),
            }
        }
        DocsCommand::List => {
            let stored = client.stored_documents().await?;
            if stored.documents.is_empty() {
                println!("no stored documents.");
                return Ok(());
            }
            for doc in &stored.documents {
                match doc.size {
                    Some(size) => println!("{:>12}  {}", size, doc.name),
                    None => println!("{:>12}  {}", "-", doc.name),
                }
            }
        }
        DocsCommand::Delete { blob } => {
            client.delete_document(&blob).await?;
            println!("deleted.");
        }
        DocsCommand::Indexed => {
            let files = client.indexed_files().await?;
            for file in &files {
                println!(
                    "{:>5}  {}  {}  ({})",
                    file.id, file.index_type, file.original_blob_name, file.file_type
                );
            }
        }
    }
    Ok(())
}
