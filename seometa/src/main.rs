use clap::Parser;
use miette::{IntoDiagnostic, Result};
use shared::MetaResponse;

use seometa::{generate_meta, Config};

/// Generate an SEO meta description for a page.
///
/// Uses the OpenAI API when OPENAI_API_KEY is set and falls back to
/// truncating the description otherwise.
#[derive(Parser, Debug)]
#[command(name = "seometa", version)]
struct Cli {
    /// Page title
    #[arg(long)]
    title: String,

    /// Short description of the page content
    #[arg(long)]
    description: String,

    /// Print the JSON wire shape ({"meta": "..."}) instead of bare text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = match Config::from_env() {
        Some(config) => Some(config.client()?),
        None => None,
    };

    let meta = generate_meta(&cli.title, &cli.description, client.as_ref())
        .await
        .into_diagnostic()?;

    if cli.json {
        let body = serde_json::to_string(&MetaResponse { meta }).into_diagnostic()?;
        println!("{body}");
    } else {
        println!("{meta}");
    }

    Ok(())
}
