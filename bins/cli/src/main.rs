//! Tabsplit CLI
//!
//! Computes balances and reports for a group stored in a JSON snapshot.

mod cli;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tabsplit_core::reports::{DailyTotal, ReportPeriod};
use tabsplit_core::summary::{GroupSummaryService, InMemorySource};
use tabsplit_shared::types::GroupId;
use tabsplit_shared::{AppConfig, AppError};

use cli::{Cli, Command, GroupArgs};

#[derive(Serialize)]
struct TrendOutput {
    group: GroupId,
    period: ReportPeriod,
    days: Vec<DailyTotal>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let now = Utc::now();
    let currency = cli.currency.unwrap_or(config.display.currency);
    let decimal_places = currency.minor_units();

    match cli.command {
        Command::Summary(args) => {
            let (service, group) = open(&args, &config).await?;
            let summary = service.try_summary(&group).await.map_err(AppError::from)?;
            print_json(&summary.rounded(decimal_places))?;
        }
        Command::Report(args) => {
            let (service, group) = open(&args.target.group, &config).await?;
            let report = service
                .report(&group, args.target.period, args.generated_by.as_deref(), now)
                .await
                .map_err(AppError::from)?;
            print_json(&report)?;
        }
        Command::Trend(args) => {
            let (service, group) = open(&args.group, &config).await?;
            let days = service
                .expense_trend(&group, args.period, now)
                .await
                .map_err(AppError::from)?;
            print_json(&TrendOutput {
                group,
                period: args.period,
                days,
            })?;
        }
        Command::Categories(args) => {
            let (service, group) = open(&args.group, &config).await?;
            let service = match args.top {
                Some(top) => service.with_top_categories(usize::from(top)),
                None => service,
            };
            let categories = service
                .category_breakdown(&group)
                .await
                .map_err(AppError::from)?;
            print_json(&categories)?;
        }
    }

    Ok(())
}

/// Loads the snapshot and builds a service over it.
async fn open(
    args: &GroupArgs,
    config: &AppConfig,
) -> anyhow::Result<(GroupSummaryService<InMemorySource>, GroupId)> {
    let raw = tokio::fs::read_to_string(&args.snapshot)
        .await
        .with_context(|| format!("Failed to read snapshot {}", args.snapshot.display()))?;
    let source = InMemorySource::from_json(&raw)
        .with_context(|| format!("Invalid snapshot {}", args.snapshot.display()))?;

    info!(
        snapshot = %args.snapshot.display(),
        groups = source.group_ids().await.len(),
        "Snapshot loaded"
    );

    let service = GroupSummaryService::from_config(Arc::new(source), config);
    Ok((service, GroupId::new(args.group.as_str())))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
