use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use dispatch_audit::audit::{AuditEvent, AuditLogger};
use dispatch_audit::database::Database;

/// Operator tooling for the dispatch audit ledger
#[derive(Parser)]
#[command(name = "audit-ledger", version, about)]
struct Cli {
    /// Database holding the audit_logs table
    #[arg(short, long, default_value = "sqlite://audit.db")]
    database_url: String,

    /// Suppress output except errors
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay the chain and report every broken entry
    Verify,
    /// Print the integrity summary as JSON
    Status,
    /// Recompute sequence numbers and hashes in timestamp order
    ///
    /// Safe while the dispatch-audit server is running against the same
    /// database: the server compares its cached chain head with the stored
    /// tail before every append and re-seeds from the rebuilt chain.
    Rebuild {
        /// Confirm the rebuild; it replaces the existing chain history
        #[arg(long)]
        yes: bool,
        /// Recorded as the actor of the rebuild
        #[arg(long, default_value = "operator@localhost")]
        operator: String,
    },
    /// Show the newest entries
    Tail {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let max_level = if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(max_level).init();

    let database = Database::new(&cli.database_url).await?;
    database.run_migrations().await?;
    let logger = AuditLogger::new(database.pool.clone());

    match cli.command {
        Command::Verify => {
            let result = logger.verify_integrity().await;
            for message in &result.errors {
                error!("{}", message);
            }
            if !cli.quiet {
                println!("{}", result.summary());
            }
            if !result.valid {
                std::process::exit(1);
            }
        }
        Command::Status => {
            let status = logger.integrity_status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Rebuild { yes, operator } => {
            if !yes {
                return Err(anyhow!(
                    "Refusing to rebuild without --yes: the rebuild rewrites every sequence number and hash"
                ));
            }

            let result = logger.rebuild_chain().await;
            logger
                .append(
                    AuditEvent::new(operator, "operator-cli", "AUDIT_CHAIN_REBUILD")
                        .with_target("AUDIT_LOG")
                        .with_payload(serde_json::json!({
                            "success": result.success,
                            "rebuilt": result.rebuilt,
                            "errors": result.errors
                        })),
                )
                .await;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(1);
            }
            info!("Rebuilt {} entries", result.rebuilt);
        }
        Command::Tail { limit } => {
            for entry in logger.recent_entries(limit.max(1)).await? {
                println!("{} {}", entry.timestamp, entry.summary());
            }
        }
    }

    Ok(())
}
