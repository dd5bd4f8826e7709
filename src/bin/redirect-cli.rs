use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "redirect-cli")]
#[command(about = "Management CLI for the redirect gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "REDIRECT_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status and rule counts
    Status,
    /// List all redirects, newest first
    List,
    /// Show a single redirect
    Get { id: i64 },
    /// Add a redirect
    Add { old_path: String, new_path: String },
    /// Change both paths of a redirect
    Update {
        id: i64,
        old_path: String,
        new_path: String,
    },
    /// Enable or disable a redirect
    Toggle { id: i64 },
    /// Delete a redirect
    Delete { id: i64 },
    /// Import redirects from a CSV file (columns: path_old, path_new, status)
    Import {
        file: PathBuf,
        /// Delete all existing redirects first
        #[arg(long)]
        clear_existing: bool,
        /// Skip rows whose old path already has a redirect
        #[arg(long)]
        skip_duplicates: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );
    let client = reqwest::Client::builder().default_headers(headers).build()?;

    let base = cli.url.trim_end_matches('/');
    let redirects = format!("{base}/admin/redirects");

    let request = match cli.command {
        Commands::Status => client.get(format!("{base}/admin/status")),
        Commands::List => client.get(&redirects),
        Commands::Get { id } => client.get(format!("{redirects}/{id}")),
        Commands::Add { old_path, new_path } => client
            .post(&redirects)
            .json(&json!({ "old_path": old_path, "new_path": new_path })),
        Commands::Update {
            id,
            old_path,
            new_path,
        } => client
            .put(format!("{redirects}/{id}"))
            .json(&json!({ "old_path": old_path, "new_path": new_path })),
        Commands::Toggle { id } => client.post(format!("{redirects}/{id}/toggle")),
        Commands::Delete { id } => client.delete(format!("{redirects}/{id}")),
        Commands::Import {
            file,
            clear_existing,
            skip_duplicates,
        } => {
            let data = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "redirects.csv".to_string());
            let mut form = Form::new().part(
                "file",
                Part::bytes(data).file_name(file_name).mime_str("text/csv")?,
            );
            if clear_existing {
                form = form.text("clear_existing", "1");
            }
            if skip_duplicates {
                form = form.text("skip_duplicates", "1");
            }
            client.post(format!("{base}/admin/import")).multipart(form)
        }
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if status == StatusCode::NO_CONTENT {
        println!("OK");
        return Ok(());
    }

    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
