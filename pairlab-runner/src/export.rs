//! Reporting and export: JSON, CSV and Markdown artifacts.
//!
//! - **JSON**: the full [`RunReport`], schema-versioned
//! - **CSV**: trade history and per-bar portfolio values
//! - **Markdown**: single-run report and a ranked strategy comparison table
//!
//! Reports with a newer `schema_version` than this build understands are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use pairlab_core::domain::{PortfolioSnapshot, TradeRecord};

use crate::runner::{RunReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a report, rejecting schema versions newer than this build.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Trade history as CSV. `realized_pnl` is blank on buys.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "symbol",
        "side",
        "quantity",
        "price",
        "gross_amount",
        "fee",
        "slippage_cost",
        "net_amount",
        "realized_pnl",
        "reason",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.date.to_string(),
            &t.symbol,
            &t.side.to_string(),
            &t.quantity.to_string(),
            &format!("{:.6}", t.price),
            &format!("{:.2}", t.gross_amount),
            &format!("{:.2}", t.fee),
            &format!("{:.2}", t.slippage_cost),
            &format!("{:.2}", t.net_amount),
            &t.realized_pnl.map(|p| format!("{p:.2}")).unwrap_or_default(),
            &t.reason,
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per bar: cash, value, P&L split and drawdown.
pub fn export_portfolio_csv(snapshots: &[PortfolioSnapshot]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "cash",
        "value",
        "realized_pnl",
        "unrealized_pnl",
        "total_pnl",
        "peak_value",
        "drawdown_pct",
    ])?;
    for s in snapshots {
        wtr.write_record([
            &s.date.to_string(),
            &format!("{:.2}", s.cash),
            &format!("{:.2}", s.value),
            &format!("{:.2}", s.realized_pnl),
            &format!("{:.2}", s.unrealized_pnl),
            &format!("{:.2}", s.total_pnl),
            &format!("{:.2}", s.peak_value),
            &format!("{:.4}", s.drawdown_pct),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `report.json`, `trades.csv`, `portfolio.csv` and `report.md` into
/// `{strategy}_{run_id prefix}/` under `output_dir`. Returns the directory.
pub fn save_artifacts(report: &RunReport, output_dir: &Path) -> Result<PathBuf> {
    let short_id = report.run_id.get(..12).unwrap_or(&report.run_id);
    let run_dir = output_dir.join(format!("{}_{short_id}", report.strategy_name()));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let write = |name: &str, content: String| -> Result<()> {
        let path = run_dir.join(name);
        std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    };
    write("report.json", export_json(report)?)?;
    write("trades.csv", export_trades_csv(&report.result.trade_history)?)?;
    write("portfolio.csv", export_portfolio_csv(&report.result.portfolio_values)?)?;
    write("report.md", generate_report(report))?;

    Ok(run_dir)
}

pub fn load_artifacts(dir: &Path) -> Result<RunReport> {
    let path = dir.join("report.json");
    let json =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

pub fn generate_report(report: &RunReport) -> String {
    let r = &report.result;
    let m = &report.metrics;
    let mut md = String::with_capacity(2048);

    md.push_str(&format!("# Backtest Report: {}\n\n", report.strategy_name()));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbols | {} |\n", r.symbols.join(", ")));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        report.config.backtest.start_date, report.config.backtest.end_date
    ));
    md.push_str(&format!("| Initial Capital | {:.0} |\n", r.initial_capital));
    md.push_str(&format!("| Bars | {} |\n", r.bar_count));
    md.push_str(&format!("| Run ID | {} |\n", report.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    if report.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Results\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Final Value | {:.2} |\n", r.final_value));
    md.push_str(&format!("| Total Return | {:.2}% |\n", r.total_return_pct));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", r.max_drawdown_pct));
    md.push_str(&format!("| Realized P&L | {:.2} |\n", r.realized_pnl));
    md.push_str(&format!("| Unrealized P&L | {:.2} |\n", r.unrealized_pnl));
    md.push_str(&format!("| Trades | {} |\n", r.total_trades));
    md.push_str(&format!(
        "| Win Rate | {:.1}% ({}W / {}L) |\n",
        r.win_rate_pct, r.winning_trades, r.losing_trades
    ));
    md.push_str(&format!("| Rejected Orders | {} |\n", r.rejections.len()));
    md.push('\n');

    md.push_str("## Performance\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| CAGR | {:.2}% |\n", m.cagr_pct));
    md.push_str(&format!("| Sharpe | {:.3} |\n", m.sharpe));
    md.push_str(&format!("| Sortino | {:.3} |\n", m.sortino));
    md.push_str(&format!("| Calmar | {:.3} |\n", m.calmar));
    md.push_str(&format!("| Profit Factor | {:.2} |\n", m.profit_factor));
    md.push_str(&format!("| Exposure | {:.1}% |\n", m.exposure_pct));
    md.push_str(&format!("| Fees Paid | {:.2} |\n", m.fees_paid));
    md.push_str(&format!("| Slippage Paid | {:.2} |\n", m.slippage_paid));
    md.push('\n');

    md
}

/// Ranked comparison table, one row per report in the given order.
pub fn generate_comparison(reports: &[RunReport]) -> String {
    let mut md = String::with_capacity(256 + reports.len() * 128);
    md.push_str("# Strategy Comparison\n\n");
    md.push_str("| Rank | Strategy | Final Value | Return | Max DD | Trades | Realized P&L | Win Rate |\n");
    md.push_str("| ---: | --- | ---: | ---: | ---: | ---: | ---: | ---: |\n");
    for (i, report) in reports.iter().enumerate() {
        let r = &report.result;
        md.push_str(&format!(
            "| {} | {} | {:.0} | {:.2}% | {:.2}% | {} | {:.0} | {:.1}% |\n",
            i + 1,
            report.strategy_name(),
            r.final_value,
            r.total_return_pct,
            r.max_drawdown_pct,
            r.total_trades,
            r.realized_pnl,
            r.win_rate_pct,
        ));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pairlab_core::domain::Side;

    fn trade(side: Side, pnl: Option<f64>) -> TradeRecord {
        TradeRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            symbol: "1579.T".into(),
            side,
            quantity: 100,
            price: 250.5,
            gross_amount: 25_050.0,
            fee: 50.1,
            slippage_cost: 25.0,
            net_amount: 25_100.1,
            realized_pnl: pnl,
            reason: "RSI oversold, buy".into(),
        }
    }

    #[test]
    fn trades_csv_has_header_and_rows() {
        let csv = export_trades_csv(&[trade(Side::Buy, None), trade(Side::Sell, Some(-12.5))]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,symbol,side"));
        assert!(lines[1].contains(",BUY,"));
        assert!(lines[1].contains(",,")); // blank realized_pnl
        assert!(lines[2].contains("-12.50"));
        // reason contains a comma and must be quoted
        assert!(lines[1].ends_with("\"RSI oversold, buy\""));
    }

    #[test]
    fn portfolio_csv_one_row_per_snapshot() {
        let snap = PortfolioSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            cash: 1000.0,
            positions: Default::default(),
            value: 1000.0,
            realized_pnl: 0.0,
            unrealized_pnl: 0.0,
            total_pnl: 0.0,
            peak_value: 1000.0,
            drawdown_pct: 0.0,
        };
        let csv = export_portfolio_csv(&[snap.clone(), snap]).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn import_rejects_unparseable_json() {
        assert!(import_json("{not json").is_err());
    }
}
