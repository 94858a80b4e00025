use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tasktree_rest_api::{api, client, db};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// The address to bind to
        #[arg(short, long, default_value = "127.0.0.1:3002")]
        addr: SocketAddr,
        /// SQLite database path; falls back to DATABASE_URL, then task_tree.db
        #[arg(long)]
        db: Option<String>,
    },
    /// Client commands
    Client {
        /// The base URL of the API
        #[arg(long, default_value = tasktree_rest_api::BASE_URL)]
        url: String,
        #[command(subcommand)]
        command: ClientCommands,
    },
}

#[derive(Subcommand)]
enum ClientCommands {
    /// Task tree commands for one user and date
    Tree {
        #[arg(long)]
        user: i32,
        /// Date bucket, e.g. 2024-1-5
        #[arg(long)]
        date: String,
        #[command(subcommand)]
        command: TreeCommands,
    },
    /// List task summaries, newest first
    Summaries {
        #[arg(long)]
        user: i32,
        #[arg(long, default_value_t = 1)]
        page: i64,
    },
    /// Register a new user
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Log in
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum TreeCommands {
    /// Fetch the day's tree (the server seeds a default if absent)
    Get,
    /// Replace the day's tree from a JSON file of nodes
    Save {
        /// Path to a JSON file containing the node array
        file: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, db: db_path } => {
            tracing_subscriber::fmt().init();

            let database_url = db_path
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .unwrap_or_else(|| "task_tree.db".to_string());
            let pool = db::build_pool(&database_url)?;
            {
                let mut conn = pool.get()?;
                db::init_database(&mut conn)?;
            }

            tracing::info!("starting server on {addr} (database {database_url})");
            let app = api::create_router(pool);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Commands::Client { url, command } => run_client(&url, command).await,
    }

    Ok(())
}

async fn run_client(url: &str, command: ClientCommands) {
    match command {
        ClientCommands::Tree {
            user,
            date,
            command,
        } => match command {
            TreeCommands::Get => match client::fetch_task_tree(url, user, &date).await {
                Ok(nodes) => {
                    println!("{}", serde_json::to_string_pretty(&nodes).unwrap());
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            },
            TreeCommands::Save { file } => {
                let content = match std::fs::read_to_string(&file) {
                    Ok(content) => content,
                    Err(e) => {
                        eprintln!("Error reading file {}: {}", file, e);
                        std::process::exit(1);
                    }
                };
                let nodes = match serde_json::from_str::<Vec<tasktree_rest_api::tree::TaskNode>>(
                    &content,
                ) {
                    Ok(nodes) => nodes,
                    Err(e) => {
                        eprintln!("Error parsing JSON: {}", e);
                        std::process::exit(1);
                    }
                };
                match client::save_task_tree(url, user, &date, &nodes).await {
                    Ok(()) => println!("Tree for {} saved successfully", date),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        },
        ClientCommands::Summaries { user, page } => {
            match client::fetch_summaries(url, user, page).await {
                Ok(summaries) => {
                    println!("{}", serde_json::to_string_pretty(&summaries).unwrap());
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ClientCommands::Register {
            username,
            password,
            nickname,
        } => match client::register(url, &username, &password, nickname.as_deref()).await {
            Ok(user) => {
                println!("{}", serde_json::to_string_pretty(&user).unwrap());
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        ClientCommands::Login { username, password } => {
            match client::login(url, &username, &password).await {
                Ok(user) => {
                    println!("{}", serde_json::to_string_pretty(&user).unwrap());
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
