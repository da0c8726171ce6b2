use std::fs;
use std::process;

use clap::Parser;
use env_logger::Env;

mod config;
mod error;
mod llm;
mod persona;
mod reddit;

use config::Config;
use error::Result;

/// Generate a Reddit user persona with Gemini.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Reddit profile URL (e.g. https://www.reddit.com/user/kojied/)
    url: String,

    /// Number of posts to fetch
    #[arg(long, default_value_t = 20)]
    posts: usize,

    /// Number of comments to fetch
    #[arg(long, default_value_t = 20)]
    comments: usize,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        log::error!("{}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    // Both of these must fail before any network call.
    let username = reddit::extract_username(&args.url)?;
    let config = Config::from_env()?;

    let client = reddit::RedditClient::connect(&config).await?;
    let items = client.collect(&username, args.posts, args.comments).await?;

    let gemini = llm::GeminiClient::new(config.gemini_api_key);
    log::info!("Calling Gemini API...");
    let document = persona::synthesize(&gemini, &username, &items).await?;

    let filename = persona::output_filename(&username);
    fs::write(&filename, &document)?;
    log::info!("Persona saved to {}", filename);
    Ok(())
}
