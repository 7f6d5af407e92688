use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use crate::simulation::SimulationReport;

pub fn write_console_report(
    out: &mut dyn Write,
    report: &SimulationReport,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Expert Mission Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "====================================".cyan())?;

    let status = if report.passed() {
        "✅ PASS".green()
    } else {
        "❌ FAIL".red()
    };
    writeln!(out, "{status} seed {}", report.base_seed.to_string().bold())?;
    writeln!(out, "Days simulated: {}", report.days)?;
    writeln!(out, "Port visits: {}", report.port_visits)?;
    writeln!(
        out,
        "Offers: {} offered, {} accepted, {} abandoned",
        report.offered, report.accepted, report.abandoned
    )?;
    writeln!(
        out,
        "Deliveries: {} ({} late)",
        report.delivered,
        report.late_deliveries.to_string().yellow()
    )?;
    writeln!(
        out,
        "Earned: {} gold, {} reputation",
        report.gold_earned, report.reputation_earned
    )?;
    writeln!(out, "Net demand shift: {}", report.net_demand_shift)?;
    writeln!(out, "Save round-trips: {}", report.save_round_trips)?;
    writeln!(out, "Offer digest: {}", report.offer_digest.bright_white())?;
    writeln!(out, "Total time: {total_duration:?}")?;

    if !report.failures.is_empty() {
        writeln!(out, "Failures:")?;
        for failure in &report.failures {
            writeln!(out, "  • {}", failure.red())?;
        }
    }
    Ok(())
}

pub fn write_json_report(out: &mut dyn Write, report: &SimulationReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn write_markdown_report(out: &mut dyn Write, report: &SimulationReport) -> Result<()> {
    let status = if report.passed() { "✅" } else { "❌" };
    writeln!(out, "# Expert Mission Simulation\n")?;
    writeln!(out, "## {status} Seed {}\n", report.base_seed)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "| --- | --- |")?;
    writeln!(out, "| Days | {} |", report.days)?;
    writeln!(out, "| Port visits | {} |", report.port_visits)?;
    writeln!(out, "| Offered | {} |", report.offered)?;
    writeln!(out, "| Accepted | {} |", report.accepted)?;
    writeln!(out, "| Abandoned | {} |", report.abandoned)?;
    writeln!(out, "| Delivered | {} |", report.delivered)?;
    writeln!(out, "| Late deliveries | {} |", report.late_deliveries)?;
    writeln!(out, "| Gold earned | {} |", report.gold_earned)?;
    writeln!(out, "| Reputation earned | {} |", report.reputation_earned)?;
    writeln!(out, "| Net demand shift | {} |", report.net_demand_shift)?;
    writeln!(out, "| Save round-trips | {} |", report.save_round_trips)?;
    writeln!(out, "| Offer digest | `{}` |", report.offer_digest)?;

    if !report.failures.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for failure in &report.failures {
            writeln!(out, "- {failure}")?;
        }
    }
    Ok(())
}
