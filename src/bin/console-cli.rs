use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use shop_console::config::schema::DEFAULT_SESSION_SECRET;
use shop_console::session::{SessionClaims, SessionKeys};

#[derive(Parser)]
#[command(name = "console-cli")]
#[command(about = "Command line client for the shop console", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Session token sent as `Authorization: Bearer`.
    #[arg(short, long, env = "CONSOLE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check console status
    Status,
    /// List menu categories and items
    Menu,
    /// List tables
    Tables,
    /// Show the store profile
    Profile,
    /// Sign a session token for local testing
    MintToken {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, default_value_t = 3600)]
        max_age: u64,

        #[arg(long, env = "CONSOLE_SESSION_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let path = match cli.command {
        Commands::Status => "/healthz",
        Commands::Menu => "/api/menu",
        Commands::Tables => "/api/tables",
        Commands::Profile => "/api/store?action=profile",
        Commands::MintToken {
            uid,
            email,
            max_age,
            secret,
        } => {
            let secret = secret.unwrap_or_else(|| DEFAULT_SESSION_SECRET.to_string());
            let mut claims = SessionClaims::new(uid.clone(), max_age);
            claims.uid = Some(uid);
            claims.email = email;
            println!("{}", SessionKeys::new(secret.as_bytes()).issue(&claims)?);
            return Ok(());
        }
    };

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    let res = reqwest::Client::new()
        .get(format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: console returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
