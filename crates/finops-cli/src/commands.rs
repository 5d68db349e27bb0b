use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use finops_agents::{
    prepare, run_policy, FinopsConfig, GatewayBackend, Policy, PolicyKind, ReplayBackend,
    RunSettings,
};
use month_window::{parse_timezone, YearMonth};
use tracing::info;

#[derive(Args)]
pub struct WindowArgs {
    /// Month to evaluate
    #[arg(long, value_name = "YYYY-MM")]
    month: String,

    /// IANA timezone the month is framed in [default: Europe/Rome]
    #[arg(long, value_name = "TZ")]
    timezone: Option<String>,

    /// Evaluate as of this instant instead of the system clock
    #[arg(long, value_name = "RFC3339")]
    now: Option<String>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Args)]
pub struct PolicyArgs {
    #[command(flatten)]
    window: WindowArgs,

    /// Directory reports and findings are written to [default: reports]
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Use a captured agent transcript instead of calling the gateway
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Print the agent prompt and exit without running it
    #[arg(long)]
    print_prompt: bool,
}

pub fn window(args: WindowArgs) -> Result<()> {
    let month = parse_month(&args.month)?;
    let now = parse_now(args.now.as_deref())?;
    let config = load_config(&args, None)?;

    let window = month
        .window(&config.timezone, now)
        .with_context(|| format!("Cannot frame {month} in {}", config.timezone))?;
    println!("{}", serde_json::to_string_pretty(&window.summary())?);
    Ok(())
}

pub async fn policy(kind: PolicyKind, args: PolicyArgs) -> Result<()> {
    let month = parse_month(&args.window.month)?;
    let now = parse_now(args.window.now.as_deref())?;
    let config = load_config(&args.window, args.output_dir.as_deref())?;

    let policy = Policy::from_params(kind, &config.policies);
    let settings = RunSettings {
        timezone: config.timezone.clone(),
        output_dir: config.output_dir.clone(),
        now,
    };

    if args.print_prompt {
        let (_, task) = prepare(&policy, month, &settings)?;
        println!("{}\n\n{}", kind.profile().system_prompt(), task.user_prompt());
        return Ok(());
    }

    let outcome = match &args.replay {
        Some(path) => run_policy(&policy, month, &settings, &ReplayBackend::new(path)).await?,
        None => {
            info!(
                gateway = %config.gateway.base_url,
                model = %config.gateway.model,
                telemetry = config.telemetry.enabled,
                "calling agent"
            );
            let backend = GatewayBackend::new(&config.gateway, &config.telemetry)?;
            run_policy(&policy, month, &settings, &backend).await?
        }
    };

    println!("{}", outcome.report_text);
    info!(path = %outcome.markdown_path.display(), "{} report written", kind.id());
    if let Some(path) = &outcome.findings_path {
        info!(path = %path.display(), "{} findings written", kind.id());
    }
    Ok(())
}

fn parse_month(value: &str) -> Result<YearMonth> {
    value
        .parse()
        .with_context(|| format!("Invalid --month value '{value}'. Use YYYY-MM"))
}

fn parse_now(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("Invalid --now value '{v}'. Use RFC 3339"))
        })
        .transpose()
}

/// Defaults, then the config file, then `FINOPS_*` variables, then flags.
fn load_config(args: &WindowArgs, output_dir: Option<&Path>) -> Result<FinopsConfig> {
    if let Some(tz) = &args.timezone {
        parse_timezone(tz).with_context(|| format!("Invalid --timezone value '{tz}'"))?;
    }

    let config = FinopsConfig::load(args.config.as_deref(), |config| {
        if let Some(tz) = &args.timezone {
            config.timezone = tz.clone();
        }
        if let Some(dir) = output_dir {
            config.output_dir = dir.to_path_buf();
        }
    })?;
    Ok(config)
}
