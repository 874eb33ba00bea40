use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

mod compiler;
mod config;
mod plan;
mod protocols;
mod registry;
mod valuation;

use compiler::{Direction, StrategyManager};
use config::{CassiniConfig, load_config};
use plan::Plan;
use valuation::{SnapshotStateReader, StateSnapshot, StrategyValuer};

#[derive(Parser, Debug)]
#[command(name = "cassini", version, about = "金库策略执行计划编译器")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（默认查找 cassini.toml 或 config/cassini.toml）"
    )]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 编译执行计划并输出 JSON
    #[command(subcommand)]
    Plan(PlanCmd),
    /// 校验策略步骤与池子注册表
    Validate,
    /// 基于状态快照估算金库总价值
    Value(ValueCmd),
}

#[derive(Subcommand, Debug)]
enum PlanCmd {
    /// 存入方向（正向遍历）
    Deposit,
    /// 取出方向（反向解绕）
    Withdraw,
    /// 收割奖励并换回底层资产
    Harvest,
}

#[derive(Args, Debug)]
struct ValueCmd {
    #[arg(long, value_name = "FILE", help = "状态快照 JSON 文件")]
    snapshot: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.clone())?;
    init_tracing(&config.logging);

    match cli.command {
        Command::Plan(cmd) => run_plan(&config, cmd),
        Command::Validate => run_validate(&config),
        Command::Value(cmd) => run_value(&config, cmd).await,
    }
}

fn init_tracing(config: &config::LoggingConfig) {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

fn build_manager(config: &CassiniConfig) -> Result<StrategyManager> {
    config
        .manager()
        .context("pool registry configuration is invalid")
}

fn run_plan(config: &CassiniConfig, cmd: PlanCmd) -> Result<()> {
    let manager = build_manager(config)?;
    let strategy = config.strategy();
    let plan = match cmd {
        PlanCmd::Deposit => manager.compile(&strategy, Direction::Deposit)?,
        PlanCmd::Withdraw => manager.compile(&strategy, Direction::Withdraw)?,
        PlanCmd::Harvest => manager.compile_harvest(&strategy)?,
    };
    emit_plan(&plan)
}

fn emit_plan(plan: &Plan) -> Result<()> {
    let rendered = serde_json::to_string_pretty(plan).context("failed to render plan as JSON")?;
    println!("{rendered}");
    Ok(())
}

fn run_validate(config: &CassiniConfig) -> Result<()> {
    let manager = build_manager(config)?;
    let strategy = config.strategy();
    if strategy.is_empty() {
        println!("ok: no active strategy");
        return Ok(());
    }
    manager.validate(&strategy)?;
    info!(
        target: "cassini",
        steps = strategy.len(),
        pools = manager.registry().len(),
        "strategy configuration is valid"
    );
    println!("ok: {} step(s), {} pool(s)", strategy.len(), manager.registry().len());
    Ok(())
}

async fn run_value(config: &CassiniConfig, cmd: ValueCmd) -> Result<()> {
    let manager = build_manager(config)?;
    let strategy = config.strategy();

    let raw = fs::read_to_string(&cmd.snapshot)
        .with_context(|| format!("failed to read snapshot at {}", cmd.snapshot.display()))?;
    let snapshot: StateSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot at {}", cmd.snapshot.display()))?;
    let reader = SnapshotStateReader::new(snapshot);

    let total = StrategyValuer::new(&manager)
        .total_value(&strategy, &reader)
        .await?;
    println!("{total}");
    Ok(())
}
