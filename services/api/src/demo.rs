use crate::infra::{seed_demo_store, InMemoryComplianceStore, DEMO_COMPANIES, DEMO_VENDOR};
use chrono::{Duration, NaiveDate, Utc};
use clap::Args;
use ropeline::config::RatingConfig;
use ropeline::error::AppError;
use ropeline::safety::activity::ActivityLogImporter;
use ropeline::safety::csr::{
    CompanyComplianceSnapshot, CompanyId, CsrEngine, CsrRatingService, CsrRatingView,
    CsrServiceError, RatingCache, ScoringPeriod, ScoringPolicy, SnapshotSubmission,
    VendorComparison, VendorId,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Trailing window used when only one bound of the period is given.
const DEFAULT_PERIOD_DAYS: i64 = 90;

#[derive(Args, Debug)]
pub(crate) struct CsrScoreArgs {
    /// Snapshot JSON with company_id, required_documents, work_sessions, toolbox_meetings,
    /// harness_inspections and acknowledgable_documents
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Activity CSV export (Record Type,Date,Project ID,Session ID) merged into the snapshot
    #[arg(long)]
    pub(crate) activity_csv: Option<PathBuf>,
    /// First day of the scoring period (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Last day of the scoring period (YYYY-MM-DD). Defaults to today when --start is given.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end: Option<NaiveDate>,
    /// Toolbox coverage window in days (odd)
    #[arg(long, value_parser = parse_window_days)]
    pub(crate) window_days: Option<u32>,
    /// Print the rating as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = parse_reporting_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the vendor comparison as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn parse_window_days(raw: &str) -> Result<u32, String> {
    let days: u32 = raw
        .trim()
        .parse()
        .map_err(|err| format!("'{raw}' is not a number of days ({err})"))?;
    if days % 2 == 0 {
        return Err(format!("window must be an odd number of days, got {days}"));
    }
    Ok(days)
}

/// Reporting dates must leave room for the trailing period and the seeded history before them.
pub(crate) fn parse_reporting_date(raw: &str) -> Result<NaiveDate, String> {
    let date = crate::infra::parse_date(raw)?;
    date.checked_sub_signed(Duration::days(DEFAULT_PERIOD_DAYS))
        .map(|_| date)
        .ok_or_else(|| format!("'{raw}' leaves no {DEFAULT_PERIOD_DAYS}-day history to rate"))
}

pub(crate) fn run_csr_score(args: CsrScoreArgs) -> Result<(), AppError> {
    let today = Utc::now().date_naive();
    let view = score_snapshot_file(&args, today)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", render_rating(&view));
    }
    Ok(())
}

pub(crate) fn score_snapshot_file(
    args: &CsrScoreArgs,
    today: NaiveDate,
) -> Result<CsrRatingView, AppError> {
    let raw = std::fs::read_to_string(&args.snapshot)?;
    let submission: SnapshotSubmission = serde_json::from_str(&raw)?;
    let mut snapshot = CompanyComplianceSnapshot::try_from(submission)?;

    let policy = ScoringPolicy::new(
        args.window_days
            .unwrap_or(RatingConfig::default().toolbox_window_days),
    );
    let period = resolve_period(args.start, args.end, today)?;

    if let Some(path) = &args.activity_csv {
        let mut activity = ActivityLogImporter::from_path(path)?;
        if let Some(period) = &period {
            activity = activity.restrict_to(period, policy.toolbox_rule().reach_days());
        }
        snapshot = activity.merge_into(snapshot);
    }

    let result = CsrEngine::new(policy).score(&snapshot);
    Ok(CsrRatingView::from_result(&result, period))
}

fn resolve_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<Option<ScoringPeriod>, AppError> {
    if start.is_none() && end.is_none() {
        return Ok(None);
    }
    let end = end.unwrap_or(today);
    let start = start.unwrap_or_else(|| {
        end.checked_sub_signed(Duration::days(DEFAULT_PERIOD_DAYS - 1))
            .unwrap_or(NaiveDate::MIN)
    });
    Ok(Some(ScoringPeriod::new(start, end)?))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let (views, comparison) = demo_ratings(today)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    println!("Company Safety Rating demo");
    for view in &views {
        println!("\n{}", render_rating(view));
    }
    println!("\n{}", render_vendor(&comparison));
    Ok(())
}

pub(crate) fn demo_ratings(
    today: NaiveDate,
) -> Result<(Vec<CsrRatingView>, VendorComparison), AppError> {
    let policy = ScoringPolicy::default();
    let store = InMemoryComplianceStore::new(policy.toolbox_rule().reach_days());
    seed_demo_store(&store, today).map_err(CsrServiceError::from)?;
    let service = CsrRatingService::new(
        Arc::new(store),
        CsrEngine::new(policy),
        RatingCache::disabled(),
    );

    let period = ScoringPeriod::new(today - Duration::days(DEFAULT_PERIOD_DAYS - 1), today)?;
    let mut views = Vec::with_capacity(DEMO_COMPANIES.len());
    for company in DEMO_COMPANIES {
        let result = service.rate_company(&CompanyId(company.to_string()), &period)?;
        views.push(CsrRatingView::from_result(&result, Some(period)));
    }
    let comparison = service.compare_vendor(&VendorId(DEMO_VENDOR.to_string()), &period)?;

    Ok((views, comparison))
}

pub(crate) fn render_rating(view: &CsrRatingView) -> String {
    let mut lines = vec![format!("Company Safety Rating: {}", view.company_id)];
    if let Some(period) = &view.period {
        lines.push(format!("Period: {} to {}", period.start(), period.end()));
    }
    lines.push(format!(
        "Overall score: {:.2} ({}, {})",
        view.overall_score, view.band_label, view.color
    ));

    lines.push(String::new());
    lines.push("Categories".to_string());
    for category in &view.categories {
        if category.scored {
            lines.push(format!(
                "- {}: -{:.2} of {:.0} | {}",
                category.label, category.penalty, category.max_penalty, category.detail
            ));
        } else {
            lines.push(format!("- {}: {}", category.label, category.detail));
        }
    }

    if view.improvement_prompts.is_empty() {
        lines.push("\nImprovement prompts: none".to_string());
    } else {
        lines.push("\nImprovement prompts".to_string());
        for prompt in &view.improvement_prompts {
            lines.push(format!(
                "- {} (+{:.2} points): {}",
                prompt.label, prompt.recoverable_points, prompt.message
            ));
        }
    }

    lines.join("\n")
}

pub(crate) fn render_vendor(comparison: &VendorComparison) -> String {
    let mut lines = vec![format!(
        "Vendor comparison: {} ({} companies, {} to {})",
        comparison.vendor_id,
        comparison.company_count,
        comparison.period.start(),
        comparison.period.end()
    )];

    match (
        comparison.average_score,
        comparison.lowest_score,
        comparison.highest_score,
    ) {
        (Some(average), Some(lowest), Some(highest)) => lines.push(format!(
            "Average {average:.2} | lowest {lowest:.2} | highest {highest:.2}"
        )),
        _ => lines.push("No rated companies".to_string()),
    }

    for (rank, row) in comparison.companies.iter().enumerate() {
        lines.push(format!(
            "{}. {}: {:.2} ({})",
            rank + 1,
            row.company_id,
            row.overall_score,
            row.band.label()
        ));
    }

    lines.join("\n")
}
