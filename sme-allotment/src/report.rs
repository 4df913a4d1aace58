//! Plain-text rendering of allotment reports for the terminal.

use std::fmt::Write;

use crate::ledger::HistoricalLedger;
use crate::source::SubscriptionRecord;
use crate::AllotmentReport;

/// Format whole rupees with thousands separators, e.g. `160000` → `₹160,000`.
pub fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₹{}", grouped)
}

/// Render the decision table with a short header.
pub fn render_report(report: &AllotmentReport) -> String {
    let mut out = String::new();

    let ipo = if report.ipo_name.is_empty() {
        "(no IPO selected)"
    } else {
        report.ipo_name.as_str()
    };
    let _ = writeln!(out, "Prediction for: {}", ipo);
    let _ = writeln!(
        out,
        "HNI multiple: {}x ({:?}), mode: {}, budget: {}",
        report.subscription,
        report.subscription_origin,
        report.mode,
        format_rupees(report.capital_budget)
    );
    if let Some(gmp) = report.grey_market_premium {
        let _ = writeln!(out, "GMP: ₹{}", gmp);
    }

    for advisory in &report.advisories {
        let _ = writeln!(out, "! {}", advisory);
    }

    if report.rows.is_empty() {
        let _ = writeln!(out, "No data for this budget.");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>5}  {:>10}  {:>10}  {:>12}  {:>10}  {:>16}",
        "Lots", "Allot. %", "Confidence", "Capital", "Exp. shr", "₹/Exp. share"
    );
    for row in &report.rows {
        let cost = row
            .cost_per_expected_share
            .map(|c| format_rupees(c.round() as u64))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>5}  {:>10.2}  {:>10}  {:>12}  {:>10.2}  {:>16}",
            row.lots,
            row.allotment_percent(),
            row.confidence_band,
            format_rupees(row.capital_required),
            row.expected_shares,
            cost
        );
    }

    out
}

/// Render the live subscription list.
pub fn render_live(records: &[SubscriptionRecord]) -> String {
    if records.is_empty() {
        return "Live HNI data could not be loaded.\n".to_string();
    }

    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "{} ({}x HNI)", record.ipo_name, record.hni_multiple);
    }
    out
}

/// Render the IPOs with historical data and their premium quotes.
pub fn render_history(ledger: &HistoricalLedger) -> String {
    let mut out = String::new();
    for name in ledger.ipo_names() {
        match ledger.grey_market_premium(&name) {
            Some(gmp) => {
                let _ = writeln!(out, "{} (GMP ₹{})", name, gmp);
            }
            None => {
                let _ = writeln!(out, "{}", name);
            }
        }
    }
    out
}
