//! Task descriptions for the policy agents.
//!
//! Every calendar fact in a prompt (window bounds, "today", day counts) comes
//! from the [`MonthWindow`]; the agent is only asked to fetch data and apply
//! the stated rules. Each prompt ends with the FINDINGS JSON shape the agent
//! must emit, rendered with `serde_json` so the example itself is valid JSON.
//!
//! Wording changes here change agent behaviour; treat the text as an interface.

use month_window::{MonthWindow, WindowPhase, WindowSummary, YearMonth};
use serde_json::{json, Value};

use crate::agent::Task;
use crate::policy::{DbLicenseParams, DbLimitParams, Policy, SpendCapParams};

/// Build the agent task for `policy` over `month`.
pub fn build_task(policy: &Policy, month: YearMonth, window: &MonthWindow) -> Task {
    let summary = window.summary();
    let description = match policy {
        Policy::SpendCap(params) => spend_cap_description(params, month, &summary),
        Policy::DbLimit(params) => db_limit_description(params, month, &summary),
        Policy::DbLicense(params) => db_license_description(params, month, &summary),
    };
    let kind = policy.kind();
    Task {
        policy_id: kind.id().to_string(),
        description,
        expected_output: kind.expected_output().to_string(),
    }
}

fn spend_cap_description(p: &SpendCapParams, month: YearMonth, w: &WindowSummary) -> String {
    let schema = json!({
        "month": month.to_string(),
        "timezone": w.timezone,
        "today": w.today.to_string(),
        "hard_cap_usd": p.hard_cap_usd,
        "soft_cap_usd": p.soft_cap_usd,
        "compartments": [{
            "compartment": "<name-or-ocid>",
            "mtd_usd": 0.0,
            "avg_daily": 0.0,
            "forecast_eom": 0.0,
            "soft_breach": false,
            "hard_breach": false
        }]
    });
    let min_days = p.min_days_observed_for_forecast;

    format!(
        r#"You are enforcing policy POL-COMP-SPEND-001 (Monthly Spend Cap per Compartment) for the month {month}
in timezone {tz}.

**Date window**
- Month start: {start}
- Month end:   {end}
- Today:       {today}
- Days observed so far: {observed}
- Remaining days in month: {remaining}
- Is month end today? {month_end}
{phase}
**Policy thresholds**
- HARD cap at month end: ${hard}
- SOFT cap at any time (forecast-to-EOM): ${soft}
- Ignore forecasting if days_observed < {min_days} or if you're at month end.

**Data requirements (use MCP tools only)**
1) Retrieve **daily amount (USD)** for each **compartment** between {start} and {today} (inclusive).
   - Use amount (USD), not quantity.
   - If a weekly or monthly endpoint is easier, you must reconstruct **MTD daily** to compute average daily.

**Calculations**
- For each compartment:
  - MTD_USD = sum(daily USD from {start} to {today})
  - If days_observed >= {min_days}:
      avg_daily = MTD_USD / days_observed
      forecast_eom = MTD_USD + avg_daily * {remaining}
    Else:
      avg_daily and forecast_eom = null
- Soft breach: forecast_eom > {soft} (only if forecast_eom is not null)
- Hard breach: only if **today == month end** AND MTD_USD > {hard}

**Output requirements**
1) A concise Markdown report:
   - Top compartments by MTD spend (table)
   - Summary of soft/hard breaches (counts)
   - Short recommendations for any breached compartments
2) A **machine-readable JSON** called FINDINGS at the end of your answer in a fenced code block:
{schema}
Only include keys with numeric values as numbers (no strings). Keep monetary values with 2 decimals.
If data is missing for a compartment, exclude it from the JSON."#,
        tz = w.timezone,
        start = w.start,
        end = w.end,
        today = w.today,
        observed = w.days_observed,
        remaining = w.remaining_days,
        month_end = capitalized_bool(w.is_month_end),
        phase = phase_note(w),
        hard = p.hard_cap_usd,
        soft = p.soft_cap_usd,
        schema = fenced_json(&schema),
    )
}

fn db_limit_description(p: &DbLimitParams, month: YearMonth, w: &WindowSummary) -> String {
    let schema = json!({
        "policy_id": "POL-DB-LIMIT-002",
        "month": month.to_string(),
        "timezone": w.timezone,
        "limits": {
            "soft": p.soft_limit_count,
            "hard": p.hard_limit_count,
            "exempt_tags": p.exempt_tags
        },
        "top_by_database_spend": p.top_n_compartments,
        "compartments": [{
            "compartment": "<name-or-ocid>",
            "database_spend_usd": 0.0,
            "total_count": 0,
            "exempted_count": 0,
            "effective_count": 0,
            "soft_breach": false,
            "hard_breach": false
        }]
    });
    let tags = json_list(&p.exempt_tags);

    format!(
        r#"You are enforcing **POL-DB-LIMIT-002 (Autonomous Database Count Limit per Compartment)**.

**Time window (actuals only)**
- From: {start}
- To:   {end}
- Timezone: {tz}
{phase}
**Policy thresholds**
- SOFT limit: ≤ {soft} Autonomous Databases (ADB) per compartment
- HARD limit: ≤ {hard} Autonomous Databases (ADB) per compartment
- Exempt tags (excluded from effective count): {tags}

**Approach (minimize tool calls)**
1) Using MCP tools, compute the **TOP {top_n} compartments by 'Database' amount (USD)** within [{start}, {end}].
   - Use amount (USD) not quantity.
   - Filter/aggregate by service/category equivalent to "Database".
   - Return a list of top compartments by spend (descending).

2) For **each of those top compartments**, use MCP to **list/count Autonomous Databases** (ADB).
   - Include defined and freeform tags so we can detect exemptions.
   - Compute:
        total_count = number of ADBs (all)
        exempted_count = number of ADBs that have ANY of the exempt tags {tags}
        effective_count = total_count - exempted_count

3) Evaluate policy:
   - soft_breach = (effective_count > {soft})
   - hard_breach = (effective_count > {hard})

**Output requirements**
1) A concise **Markdown report**:
   - Table: TOP compartments by 'Database' spend with columns:
     [compartment, database_spend_usd, total_count, exempted_count, effective_count, soft_breach, hard_breach]
   - Short recommendations for any breached compartments (e.g., consolidate, justify with tags, decommission).

2) A **machine-readable JSON** called FINDINGS at the end of your answer in a fenced code block:
{schema}
Only include keys with numeric values as numbers (no strings). Keep monetary values with 2 decimals for spend.
Exclude compartments with missing data."#,
        start = w.start,
        end = w.end,
        tz = w.timezone,
        phase = phase_note(w),
        soft = p.soft_limit_count,
        hard = p.hard_limit_count,
        top_n = p.top_n_compartments,
        schema = fenced_json(&schema),
    )
}

fn db_license_description(p: &DbLicenseParams, month: YearMonth, w: &WindowSummary) -> String {
    let schema = json!({
        "policy_id": "POL-DB-LICENSE-003",
        "month": month.to_string(),
        "timezone": w.timezone,
        "limits": {
            "allowed_license_models": p.allowed_license_models,
            "exempt_tags": p.exempt_tags
        },
        "top_by_database_spend": p.top_n_compartments,
        "compartments": [{
            "compartment": "<name-or-ocid>",
            "database_spend_usd": 0.0,
            "total_adb": 0,
            "non_compliant_count": 0,
            "hard_breach": false,
            "non_compliant": [{
                "display_name": "<db-name>",
                "ocid": "<db-ocid>",
                "license_model": "<value>"
            }]
        }]
    });
    let allowed = json_list(&p.allowed_license_models);
    let tags = json_list(&p.exempt_tags);

    format!(
        r#"You are enforcing **POL-DB-LICENSE-003 (BYOL license model for Autonomous Databases)**.

**Time window (for TOP list only)**
- From: {start}
- To:   {end}
- Timezone: {tz}
{phase}
**Policy (hard requirement)**
- Every ADB must have `license_model` in {allowed}.
- Exemptions via tags (any=value): {tags}.
- There is **no soft limit**: any non-BYOL without exemption is **non-compliant**.

**Approach (minimize tool calls)**
1) Using MCP tools, compute the **TOP {top_n} compartments by 'Database' amount (USD)** within [{start}, {end}].
   - Use amount (USD), not quantity.
   - Filter/aggregate by the service equal to "Database".
   - Return a list of top compartments by spend (descending).

2) For **each of those top compartments**, use MCP to **list Autonomous Databases** (ADB).
   - Include fields: display_name, ocid, compartment, license_model, and tags (defined + freeform).
   - For each ADB:
        exempt = has ANY tag in {tags}
        compliant = (license_model in {allowed}) OR exempt
   - Compute per compartment:
        total_adb = number of ADBs (all)
        non_compliant = list of ADBs where compliant == False

3) Evaluate policy (hard only):
   - hard_breach = (len(non_compliant) > 0)

**Output requirements**
1) A concise **Markdown report**:
   - Table for TOP compartments:
     [compartment, database_spend_usd, total_adb, non_compliant_count, hard_breach]
   - Under the table, if a compartment is in breach, list the offending DBs with (display_name, ocid, license_model).

2) A **machine-readable JSON** called FINDINGS at the end of your answer in a fenced code block:
{schema}
Only include keys with numeric values as numbers (no strings). Keep monetary values with 2 decimals for spend.
Exclude compartments with missing data."#,
        start = w.start,
        end = w.end,
        tz = w.timezone,
        phase = phase_note(w),
        top_n = p.top_n_compartments,
        schema = fenced_json(&schema),
    )
}

/// Extra lines telling the agent the observation day was clamped.
fn phase_note(w: &WindowSummary) -> String {
    match w.phase {
        WindowPhase::InProgress => String::new(),
        WindowPhase::NotStarted => format!(
            "- Note: the month has not started yet; \"today\" is set to the first day ({}). \
             Treat any data as projected, not actual.\n",
            w.start
        ),
        WindowPhase::Concluded => format!(
            "- Note: the month has already concluded; \"today\" is set to the last day ({}). \
             All days of the month are observed.\n",
            w.end
        ),
    }
}

fn fenced_json(value: &Value) -> String {
    let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("```json\n{body}\n```")
}

fn json_list(items: &[String]) -> String {
    Value::from(items.to_vec()).to_string()
}

fn capitalized_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
