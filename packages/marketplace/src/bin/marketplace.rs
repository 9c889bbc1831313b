//! Admin and maintenance CLI for the marketplace core
//!
//! Every command prints a single JSON document on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use marketplace_core::common::{AccountId, MarketplaceError, ProviderId};
use marketplace_core::config::Config;
use marketplace_core::domains::providers::{
    approval_stats, approve_provider, list_approved_providers, list_pending_providers,
    reject_provider, AvailabilityBucket, DirectoryFilters, DirectorySort,
};
use marketplace_core::domains::reviews::reconcile_ratings;
use marketplace_core::kernel::{
    BaseIdentityProvider, BaseRecordStore, MarketplaceDeps, PgRecordStore, StaticIdentity,
    StoreBackedIdentity, StoreNotificationSink,
};

#[derive(Parser)]
#[command(name = "marketplace")]
#[command(about = "Tutoring marketplace admin CLI")]
struct Cli {
    /// Account id to act as; its role is read from the store
    #[arg(long, global = true)]
    actor: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// List tutor applications awaiting review
    Pending,

    /// Count tutors per approval status
    Stats,

    /// Approve a pending tutor
    Approve {
        provider_id: Uuid,
        /// Confirm the approval
        #[arg(long)]
        yes: bool,
    },

    /// Reject a pending tutor
    Reject {
        provider_id: Uuid,
        #[arg(long)]
        reason: String,
        /// Confirm the rejection
        #[arg(long)]
        yes: bool,
    },

    /// Search the public tutor directory
    Search {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        min_rate: Option<Decimal>,
        #[arg(long)]
        max_rate: Option<Decimal>,
        /// weekdays or weekends
        #[arg(long)]
        availability: Option<AvailabilityBucket>,
        /// rating, rate, experience or name
        #[arg(long, default_value = "rating")]
        sort: DirectorySort,
    },

    /// Recompute every tutor's rating and counters from source records
    ReconcileRatings,
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
}

#[derive(Serialize)]
struct ErrorInfo {
    kind: &'static str,
    message: String,
    retryable: bool,
}

fn output<T: Serialize>(result: std::result::Result<T, MarketplaceError>) -> Result<()> {
    let (response, failed) = match result {
        Ok(data) => (
            Response {
                success: true,
                data: Some(data),
                error: None,
            },
            false,
        ),
        Err(e) => (
            Response {
                success: false,
                data: None,
                error: Some(ErrorInfo {
                    kind: e.kind(),
                    message: e.to_string(),
                    retryable: e.is_retryable(),
                }),
            },
            true,
        ),
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to encode response")?
    );
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    if let Commands::Migrate = cli.command {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
        return output::<&str>(Ok("migrations applied"));
    }

    let store: Arc<dyn BaseRecordStore> = Arc::new(PgRecordStore::new(pool));
    let identity: Arc<dyn BaseIdentityProvider> = match cli.actor {
        Some(id) => Arc::new(StoreBackedIdentity::new(
            store.clone(),
            AccountId::from_uuid(id),
        )),
        None => Arc::new(StaticIdentity::anonymous()),
    };
    let notifier = Arc::new(StoreNotificationSink::new(store.clone()));
    let deps = MarketplaceDeps::new(store, identity, notifier)
        .with_directory_settings(config.directory.clone());

    match cli.command {
        Commands::Migrate => Ok(()),
        Commands::Pending => output(list_pending_providers(&deps).await),
        Commands::Stats => output(approval_stats(&deps).await),
        Commands::Approve { provider_id, yes } => {
            output(approve_provider(ProviderId::from_uuid(provider_id), yes, &deps).await)
        }
        Commands::Reject {
            provider_id,
            reason,
            yes,
        } => output(
            reject_provider(ProviderId::from_uuid(provider_id), &reason, yes, &deps).await,
        ),
        Commands::Search {
            query,
            subject,
            location,
            level,
            min_rate,
            max_rate,
            availability,
            sort,
        } => {
            let filters = DirectoryFilters {
                query,
                subject,
                location,
                level,
                min_rate,
                max_rate,
                availability,
            };
            output(list_approved_providers(&filters, sort, &deps).await)
        }
        Commands::ReconcileRatings => output(reconcile_ratings(&deps).await),
    }
}
