//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tabsplit_core::reports::ReportPeriod;
use tabsplit_shared::types::Currency;

#[derive(Parser, Debug)]
#[command(name = "tabsplit")]
#[command(about = "Balances and reports for shared group expenses", version)]
pub struct Cli {
    /// Currency used to round printed amounts (overrides `display.currency`).
    #[arg(long, global = true)]
    pub currency: Option<Currency>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the balance summary of a group.
    Summary(GroupArgs),
    /// Print the expense report of a group.
    Report(ReportArgs),
    /// Print daily expense totals of a group.
    Trend(PeriodArgs),
    /// Print spending per category of a group.
    Categories(CategoriesArgs),
}

/// Selects a group inside a snapshot file.
#[derive(Args, Debug)]
pub struct GroupArgs {
    /// JSON snapshot of the form `{ "groups": { "<id>": { ... } } }`.
    #[arg(long, env = "TABSPLIT_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Group id within the snapshot.
    #[arg(long)]
    pub group: String,
}

#[derive(Args, Debug)]
pub struct PeriodArgs {
    #[command(flatten)]
    pub group: GroupArgs,

    /// week, month or year.
    #[arg(long, default_value_t = ReportPeriod::Week)]
    pub period: ReportPeriod,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub target: PeriodArgs,

    /// Name recorded as the report's requester.
    #[arg(long)]
    pub generated_by: Option<String>,
}

#[derive(Args, Debug)]
pub struct CategoriesArgs {
    #[command(flatten)]
    pub group: GroupArgs,

    /// Categories listed before the rest is merged into "Other".
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub top: Option<u16>,
}
