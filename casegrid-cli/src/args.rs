//! Command-line arguments.

use clap::Parser;
use clap::Subcommand;

use casegrid_lib::model::TestCaseAction;
use casegrid_lib::query::FilterValue;
use casegrid_lib::query::SortKey;

#[derive(Debug, Parser)]
#[command(name = "casegrid", version, about = "Browse and bulk-edit test cases")]
pub struct Args {
    /// API base URL, e.g. `https://tm.example.com/api/v1`.
    #[arg(long, env = "CASEGRID_URL")]
    pub url: String,

    /// Bearer token.
    #[arg(long, env = "CASEGRID_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Project whose test cases are listed.
    #[arg(long, env = "CASEGRID_PROJECT")]
    pub project: i64,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one page of test cases.
    List(ListArgs),

    /// Apply an action to a set of test cases, then print the refreshed page.
    Bulk {
        /// activate, block, deprecate, draft or delete.
        #[arg(value_parser = parse_action)]
        action: TestCaseAction,

        /// Test case ids.
        #[arg(required = true)]
        ids: Vec<i64>,

        #[command(flatten)]
        list: ListArgs,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct ListArgs {
    /// One-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Rows per page.
    #[arg(long, default_value_t = 20)]
    pub size: u32,

    /// `column:asc` or `column:desc`. Repeat for multi-column sorting.
    #[arg(long, value_parser = parse_sort)]
    pub sort: Vec<SortKey>,

    /// `column=value`. Repeatable.
    #[arg(long, value_parser = parse_filter)]
    pub filter: Vec<(String, FilterValue)>,

    /// Free-text search.
    #[arg(long)]
    pub search: Option<String>,

    /// Viewport height in pixels. Only rows inside it are printed; the
    /// whole page by default.
    #[arg(long)]
    pub viewport: Option<u64>,

    /// Scroll offset in pixels.
    #[arg(long, default_value_t = 0)]
    pub scroll: u64,
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    SortKey::parse(s).ok_or_else(|| format!("expected column:asc or column:desc, got '{}'", s))
}

fn parse_filter(s: &str) -> Result<(String, FilterValue), String> {
    match s.split_once('=') {
        Some((column, value)) if !column.is_empty() && !value.is_empty() => {
            Ok((column.to_string(), FilterValue::from(value)))
        }
        _ => Err(format!("expected column=value, got '{}'", s)),
    }
}

fn parse_action(s: &str) -> Result<TestCaseAction, String> {
    TestCaseAction::parse(s).ok_or_else(|| format!("unknown action '{}'", s))
}
