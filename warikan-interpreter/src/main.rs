#![warn(clippy::uninlined_format_args)]

mod config;

use std::{borrow::Cow, env, path::Path, process};

use config::{AppConfig, OutputFormat};
use tracing_subscriber::EnvFilter;
use warikan_application::{SettlementPlan, SettlementService};
use warikan_domain::Balance;
use warikan_infrastructure::{JsonLedgerSource, RateTable};

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> CliResult<()> {
    let Some(path) = env::args().nth(1) else {
        return Err("Usage: warikan <ledger.json>".into());
    };

    let config = AppConfig::from_env()?;
    let plan = plan_file(Path::new(&path), &config)?;

    match config.output {
        OutputFormat::Text => print!("{}", render_plan(&plan)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan)
                .map_err(|err| format!("Failed to encode plan: {err}"))?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Plans the ledger at `path`, treating its directory as the ledger store
/// and its file stem as the group name.
fn plan_file(path: &Path, config: &AppConfig) -> CliResult<SettlementPlan> {
    let rates = config
        .rates_path
        .as_deref()
        .map(RateTable::from_path)
        .transpose()
        .map_err(|err| format!("Failed to load rates: {}", describe(&err)))?;

    let group = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or("Ledger path has no usable file name")?;
    let root = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let source = JsonLedgerSource::new(root);
    let mut service = SettlementService::new(&source);
    if let Some(rates) = rates.as_ref() {
        service = service.with_rates(rates);
    }

    let plan = service
        .plan(group, &config.mode)
        .map_err(|err| format!("Failed to settle '{}': {}", path.display(), describe(&err)))?;
    Ok(plan)
}

/// Joins an error with its sources into one line.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn render_plan(plan: &SettlementPlan) -> String {
    let mut out = String::from("Balances\n");
    for balance in &plan.balances {
        out.push_str(&render_balance(balance));
    }

    out.push_str("\nPayments\n");
    if plan.payments.is_empty() {
        out.push_str("  (everyone is settled)\n");
    }
    for payment in plan.all_payments() {
        out.push_str(&format!("  {payment}\n"));
    }

    if !plan.is_complete() {
        out.push_str("\nUnmatched\n");
        for residual in &plan.residuals {
            out.push_str(&format!(
                "  {}: {:.2} {}\n",
                residual.member, residual.amount, residual.currency
            ));
        }
    }
    out
}

fn render_balance(balance: &Balance) -> String {
    let net = balance.net.round_cents();
    let sign = if net.is_positive() { "+" } else { "" };
    format!(
        "  {} ({}): {sign}{net:.2} {}\n",
        balance.display_name, balance.member, balance.currency
    )
}
