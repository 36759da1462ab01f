#![deny(warnings)]

//! Headless front end for the upgrade store: list, rank and edit upgrades.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use persistence::UpgradeStore;
use planner_core::{amount, Category, CategoryFilter, PlannerConfig, Upgrade};
use planner_econ::{payback_hours, Ranked};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "upgrade-planner",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PLANNER_BUILD_INFO"), ")"),
    about = "Plan game upgrades by income gained per unit of cost"
)]
struct Cli {
    /// Backing JSON file with the upgrade list.
    #[arg(long, short, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List upgrades, optionally limited to one category.
    List {
        #[arg(long, short, default_value = CategoryFilter::ALL_LABEL)]
        category: String,
    },
    /// Show the most profitable unlocked upgrades.
    Rank {
        #[arg(long, short, value_parser = parse_top)]
        top: Option<usize>,
    },
    /// Show the single most profitable unlocked upgrade.
    Best,
    /// Change cost, income increase and category of one upgrade and save.
    Edit {
        /// Position in the list as printed by `list`.
        index: usize,
        #[arg(long, value_parser = parse_amount)]
        cost: Option<Decimal>,
        #[arg(long, value_parser = parse_amount)]
        income: Option<Decimal>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show the categories offered for filtering and editing.
    Categories,
}

fn parse_amount(s: &str) -> Result<Decimal, String> {
    let value = s
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if !amount::is_exact(&value) {
        return Err(format!("'{s}' has more precision than can be saved"));
    }
    Ok(value)
}

fn parse_top(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("'{s}' is not a count: {e}")),
    }
}

fn payback_label(u: &Upgrade) -> String {
    match payback_hours(u.cost, u.income_increase) {
        Ok(h) => format!("{}h", h.round_dp(2).normalize()),
        Err(_) => "never".to_string(),
    }
}

fn render_line(index: usize, u: &Upgrade, rank: Option<usize>) -> String {
    let status = if u.unlocked { "unlocked" } else { "locked" };
    let mut line = format!(
        "[{index}] {}, {} - Cost: {}, Income Increase: {}, Payback: {} [{status}]",
        u.name,
        u.category,
        u.cost.normalize(),
        u.income_increase.normalize(),
        payback_label(u),
    );
    if let Some(pos) = rank {
        line.push_str(&format!(" #{}", pos + 1));
    }
    line
}

fn render_ranked(store: &UpgradeStore, ranked: &[Ranked]) -> Vec<String> {
    ranked
        .iter()
        .enumerate()
        .filter_map(|(pos, r)| {
            store.get(r.index).map(|u| {
                format!(
                    "#{} (ratio {}) {}",
                    pos + 1,
                    r.ratio.round_dp(4).normalize(),
                    render_line(r.index, u, None)
                )
            })
        })
        .collect()
}

fn run<W: Write>(
    cmd: Cmd,
    store: &mut UpgradeStore,
    config: &PlannerConfig,
    out: &mut W,
) -> Result<()> {
    match cmd {
        Cmd::List { category } => {
            let filter: CategoryFilter = category.parse().unwrap_or_default();
            let ranked = store.rank_by_profitability(config.top_n)?;
            for (index, u) in store.filter(&filter) {
                let pos = ranked.iter().position(|r| r.index == index);
                writeln!(out, "{}", render_line(index, u, pos))?;
            }
        }
        Cmd::Rank { top } => {
            let top_n = top.unwrap_or(config.top_n);
            let ranked = store.rank_by_profitability(top_n)?;
            if ranked.is_empty() {
                writeln!(out, "No unlocked upgrades")?;
            }
            for line in render_ranked(store, &ranked) {
                writeln!(out, "{line}")?;
            }
        }
        Cmd::Best => write_best(store, out)?,
        Cmd::Edit {
            index,
            cost,
            income,
            category,
        } => {
            let current = store
                .get(index)
                .cloned()
                .with_context(|| format!("no upgrade at index {index} ({} loaded)", store.len()))?;
            let cost = cost.unwrap_or(current.cost);
            let income = income.unwrap_or(current.income_increase);
            let category = category.map(Category::new).unwrap_or(current.category);
            store.update_record(index, cost, income, category)?;
            store
                .save()
                .with_context(|| format!("saving {}", store.path().display()))?;
            if let Some(u) = store.get(index) {
                writeln!(out, "Updated {}", render_line(index, u, None))?;
            }
            write_best(store, out)?;
        }
        Cmd::Categories => {
            let mut names: Vec<String> = Category::KNOWN.iter().map(|s| s.to_string()).collect();
            for c in store.categories() {
                if !c.is_known() {
                    names.push(c.to_string());
                }
            }
            writeln!(out, "{}", CategoryFilter::ALL_LABEL)?;
            for n in names {
                writeln!(out, "{n}")?;
            }
        }
    }
    Ok(())
}

fn write_best<W: Write>(store: &UpgradeStore, out: &mut W) -> Result<()> {
    match store.most_profitable()? {
        Some(best) => {
            if let Some(u) = store.get(best.index) {
                writeln!(out, "The most profitable upgrade to buy is: {}", u.name)?;
            }
        }
        None => writeln!(out, "No unlocked upgrades")?,
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PlannerConfig::default();
    if let Some(file) = cli.file {
        config.data_file = file;
    }
    info!(file = %config.data_file.display(), top_n = config.top_n, "starting CLI");

    let mut store = UpgradeStore::open(&config.data_file)
        .with_context(|| format!("loading {}", config.data_file.display()))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli.command, &mut store, &config, &mut out)
}
