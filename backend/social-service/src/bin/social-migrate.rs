use anyhow::{bail, Context, Result};
use social_service::repository::{PostgresSocialRepository, SocialRepository};
use social_service::{db, Config};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "social_migrate=info,social_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(env = %config.app.env, "Starting social-migrate");

    let pool = db::create_pool(&config.database).await?;

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "migrate" => db::migrate(&pool).await?,
        "check" => {
            let repo = PostgresSocialRepository::new(pool.clone());
            if let Err(e) = repo.health_check().await {
                error!(error = %e, "PostgreSQL health check failed");
                bail!("health check failed: {e}");
            }
            info!(
                page_size = config.feed.default_page_size,
                max_page_size = config.feed.max_page_size,
                "PostgreSQL reachable"
            );
        }
        _ => {
            println!("Usage: social-migrate <migrate|check>");
            println!();
            println!("  migrate  apply pending schema migrations");
            println!("  check    verify database connectivity");
        }
    }

    pool.close().await;
    Ok(())
}
