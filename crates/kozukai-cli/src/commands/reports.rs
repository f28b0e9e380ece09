//! Report command implementations

use anyhow::Result;
use kozukai_core::{
    category_report, compare, distinct_periods, monthly_report, overview, search_report,
    time_report, CompareError, ExpenseRecord,
};
use serde::Serialize;

use super::{
    apply_filter, format_yen, no_data, notice, print_json, resolve_filter, resolve_period_range,
    truncate,
};
use crate::cli::{FilterArgs, ReportCommand};

/// Run one report command against a loaded record set
pub fn run_report(command: &ReportCommand, records: &[ExpenseRecord], json: bool) -> Result<()> {
    if no_data(records, json) {
        return Ok(());
    }
    match command {
        ReportCommand::Overview => cmd_overview(records, json),
        ReportCommand::Periods => cmd_periods(records, json),
        ReportCommand::Monthly { filter } => cmd_monthly(records, filter, json),
        ReportCommand::Categories { limit, filter } => {
            cmd_categories(records, *limit, filter, json)
        }
        ReportCommand::Search { term, filter } => {
            cmd_search(records, &term.join(" "), filter, json)
        }
        ReportCommand::Trends { filter } => cmd_trends(records, filter, json),
        ReportCommand::Compare {
            a_from,
            a_to,
            b_from,
            b_to,
        } => cmd_compare(
            records,
            (a_from.as_str(), a_to.as_str()),
            (b_from.as_str(), b_to.as_str()),
            json,
        ),
    }
}

pub fn cmd_overview(records: &[ExpenseRecord], json: bool) -> Result<()> {
    let o = overview(records);
    if json {
        return print_json(&o);
    }

    println!();
    println!("📊 Data Overview");
    println!("   ─────────────────────────────────────────────");
    println!("   Records:  {}", o.record_count);
    println!("   Total:    {}", format_yen(o.total_amount));
    if let (Some(first), Some(last)) = (o.first_timestamp, o.last_timestamp) {
        println!(
            "   Recorded: {} ～ {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }
    if let Some(periods) = &o.periods {
        println!(
            "   Periods:  {} ({} months)",
            periods.display(),
            o.period_count
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct PeriodEntry {
    index: usize,
    period: String,
    label: String,
}

pub fn cmd_periods(records: &[ExpenseRecord], json: bool) -> Result<()> {
    let entries: Vec<PeriodEntry> = distinct_periods(records)
        .into_iter()
        .enumerate()
        .map(|(index, key)| PeriodEntry {
            index,
            label: key.display(),
            period: key.to_string(),
        })
        .collect();

    if json {
        return print_json(&entries);
    }

    println!();
    println!("📅 Closing Months");
    println!("   {:>5} │ {:8} │ {}", "Index", "Key", "Label");
    println!("   ──────┼──────────┼─────────────");
    for e in &entries {
        println!("   {:>5} │ {:8} │ {}", e.index, e.period, e.label);
    }
    Ok(())
}

pub fn cmd_monthly(records: &[ExpenseRecord], filter: &FilterArgs, json: bool) -> Result<()> {
    let filter = resolve_filter(filter, records)?;
    let view = apply_filter(filter, records, json);
    let report = monthly_report(&view.records);
    if json {
        return print_json(&report);
    }

    println!();
    println!("📊 Monthly Spending");
    if report.rows.is_empty() {
        println!("   No spending found for this selection.");
        return Ok(());
    }
    println!(
        "   {:12} │ {:>12} │ {:>5} │ {:>10}",
        "Month", "Total", "Count", "Mean"
    );
    println!("   ─────────────┼──────────────┼───────┼────────────");
    for row in &report.rows {
        println!(
            "   {:12} │ {:>12} │ {:>5} │ {:>10}",
            row.label,
            format_yen(row.total),
            row.count,
            format_yen(row.mean)
        );
    }
    println!();
    println!("   Monthly mean: {}", format_yen(report.stats.mean_total));
    println!("   Highest:      {}", format_yen(report.stats.max_total));
    println!("   Lowest:       {}", format_yen(report.stats.min_total));
    Ok(())
}

pub fn cmd_categories(
    records: &[ExpenseRecord],
    limit: Option<usize>,
    filter: &FilterArgs,
    json: bool,
) -> Result<()> {
    let filter = resolve_filter(filter, records)?;
    let view = apply_filter(filter, records, json);
    let mut report = category_report(&view.records);
    if let Some(n) = limit {
        report.rows.truncate(n);
    }
    if json {
        return print_json(&report);
    }

    println!();
    println!("🏷️  Spending by Category");
    if report.rows.is_empty() {
        println!("   No spending found for this selection.");
        return Ok(());
    }
    println!(
        "   {:20} │ {:>12} │ {:>5} │ {:>10}",
        "Category", "Total", "Count", "Mean"
    );
    println!("   ─────────────────────┼──────────────┼───────┼────────────");
    for row in &report.rows {
        println!(
            "   {:20} │ {:>12} │ {:>5} │ {:>10}",
            truncate(&row.key, 20),
            format_yen(row.total),
            row.count,
            format_yen(row.mean)
        );
    }
    Ok(())
}

pub fn cmd_search(
    records: &[ExpenseRecord],
    term: &str,
    filter: &FilterArgs,
    json: bool,
) -> Result<()> {
    let term = term.trim();
    if term.is_empty() {
        notice("Enter a search term.", json);
        return Ok(());
    }

    let filter = resolve_filter(filter, records)?;
    let view = apply_filter(filter, records, json);
    let report = search_report(&view.records, term);
    if json {
        return print_json(&report);
    }

    println!();
    println!("🔍 Search: \"{}\"", report.term);
    if report.match_count == 0 {
        println!("   No matching records.");
        return Ok(());
    }
    println!("   Matches: {}", report.match_count);
    println!("   Total:   {}", format_yen(report.total));
    println!("   Mean:    {}", format_yen(report.mean));

    if !report.monthly.is_empty() {
        println!();
        for point in &report.monthly {
            println!("   {:12} {:>12}", point.label, format_yen(point.amount));
        }
    }

    println!();
    println!(
        "   {:16} │ {:20} │ {:>10} │ {}",
        "Date", "Category", "Amount", "Month"
    );
    println!("   ─────────────────┼──────────────────────┼────────────┼─────────────");
    for r in &report.records {
        println!(
            "   {:16} │ {:20} │ {:>10} │ {}",
            r.timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
            truncate(&r.category, 20),
            r.amount.map(format_yen).unwrap_or_else(|| "-".into()),
            r.period_label().unwrap_or_else(|| "-".into())
        );
    }
    Ok(())
}

pub fn cmd_trends(records: &[ExpenseRecord], filter: &FilterArgs, json: bool) -> Result<()> {
    let filter = resolve_filter(filter, records)?;
    let view = apply_filter(filter, records, json);
    let report = time_report(&view.records);
    if json {
        return print_json(&report);
    }

    println!();
    println!("📈 Spending by Weekday");
    for point in &report.weekdays {
        println!("   {:10} {:>12}", point.weekday, format_yen(point.amount));
    }

    println!();
    println!("📅 Daily Spending");
    for point in &report.daily {
        println!("   {} {:>12}", point.date, format_yen(point.amount));
    }
    Ok(())
}

pub fn cmd_compare(
    records: &[ExpenseRecord],
    a: (&str, &str),
    b: (&str, &str),
    json: bool,
) -> Result<()> {
    let range_a = resolve_period_range(records, a.0, a.1)?;
    let range_b = resolve_period_range(records, b.0, b.1)?;

    let result = match compare(records, range_a, range_b) {
        Ok(result) => result,
        Err(e @ CompareError::InsufficientData { .. }) => {
            notice(&e.to_string(), json);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if json {
        return print_json(&result);
    }

    println!();
    println!("⚖️  Period Comparison");
    println!("   A: {}", result.range_a.display());
    println!("   B: {}", result.range_b.display());
    println!("   ─────────────────────────────────────────────────────────");
    println!(
        "   {:8} │ {:>12} │ {:>12} │ {:>12} │ {:>8}",
        "", "A", "B", "Change", "%"
    );
    println!(
        "   {:8} │ {:>12} │ {:>12} │ {:>12} │ {:>7.1}%",
        "Total",
        format_yen(result.a.total),
        format_yen(result.b.total),
        format_yen(result.total_delta),
        result.total_change_pct
    );
    println!(
        "   {:8} │ {:>12} │ {:>12} │ {:>12} │ {:>7.1}%",
        "Mean",
        format_yen(result.a.mean),
        format_yen(result.b.mean),
        format_yen(result.mean_delta),
        result.mean_change_pct
    );
    println!(
        "   {:8} │ {:>12} │ {:>12} │ {:>12} │ {:>7.1}%",
        "Count", result.a.count, result.b.count, result.count_delta, result.count_change_pct
    );

    if !result.categories.is_empty() {
        println!();
        println!("   Category changes (top categories in both ranges)");
        for c in &result.categories {
            println!(
                "   {:20} {:>12} → {:>12}  {:>12} ({:+.1}%)",
                truncate(&c.category, 20),
                format_yen(c.total_a),
                format_yen(c.total_b),
                format_yen(c.delta),
                c.change_pct
            );
        }
    }
    Ok(())
}
