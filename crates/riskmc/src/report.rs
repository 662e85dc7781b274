//! Text and JSON rendering of command results

use std::io::Write;

use riskmc_core::optimization::{EnsembleOutcome, ProgressiveRow};
use riskmc_core::risk::Histogram;
use riskmc_core::{ErcOutcome, RiskResult, SimulationMethod};
use serde::Serialize;

/// Output of `riskmc risk`
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub category: String,
    pub method: SimulationMethod,
    pub n_simulations: usize,
    pub assets: Vec<String>,
    pub weights: Vec<f64>,
    pub results: Vec<RiskResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Histogram>,
}

/// Convergence summary of one optimizer run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub converged: bool,
    pub iterations: usize,
    pub rel_dev: Option<f64>,
    pub expected_shortfall: Option<f64>,
}

impl From<&ErcOutcome> for RunSummary {
    fn from(outcome: &ErcOutcome) -> Self {
        Self {
            converged: outcome.converged,
            iterations: outcome.iterations,
            rel_dev: outcome.final_rel_dev(),
            expected_shortfall: outcome.final_expected_shortfall(),
        }
    }
}

/// Output of `riskmc erc`
#[derive(Debug, Clone, Serialize)]
pub struct ErcReport {
    pub category: String,
    pub method: SimulationMethod,
    pub assets: Vec<String>,
    pub weights: Vec<f64>,
    pub runs: Vec<RunSummary>,
}

impl ErcReport {
    pub fn single(category: &str, method: SimulationMethod, assets: Vec<String>, outcome: &ErcOutcome) -> Self {
        Self {
            category: category.to_string(),
            method,
            assets,
            weights: outcome.weights.as_slice().to_vec(),
            runs: vec![RunSummary::from(outcome)],
        }
    }

    pub fn ensemble(
        category: &str,
        method: SimulationMethod,
        assets: Vec<String>,
        outcome: &EnsembleOutcome,
    ) -> Self {
        Self {
            category: category.to_string(),
            method,
            assets,
            weights: outcome.weights.as_slice().to_vec(),
            runs: outcome.members.iter().map(RunSummary::from).collect(),
        }
    }
}

/// Output of `riskmc progressive`
#[derive(Debug, Clone, Serialize)]
pub struct ProgressiveReport {
    pub category: String,
    pub members: usize,
    pub assets: Vec<String>,
    pub rows: Vec<ProgressiveRow>,
}

pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> color_eyre::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn name_width(assets: &[String]) -> usize {
    assets.iter().map(String::len).max().unwrap_or(0).max(5)
}

pub fn write_risk<W: Write>(out: &mut W, report: &RiskReport) -> color_eyre::Result<()> {
    writeln!(out, "Category:    {}", report.category)?;
    writeln!(out, "Method:      {}", report.method)?;
    writeln!(out, "Simulations: {}", report.n_simulations)?;

    let width = name_width(&report.assets);
    for result in &report.results {
        writeln!(out)?;
        writeln!(
            out,
            "{} at alpha {}%: {:.6}",
            result.measure,
            result.alpha,
            result.portfolio_loss()
        )?;
        writeln!(out, "  {:<width$}  {:>8}  {:>12}", "Asset", "Weight", "Contribution")?;
        for ((asset, weight), rc) in report
            .assets
            .iter()
            .zip(&report.weights)
            .zip(result.contributions())
        {
            writeln!(out, "  {asset:<width$}  {weight:>8.4}  {rc:>12.6}")?;
        }
    }

    if let Some(histogram) = &report.histogram {
        writeln!(out)?;
        writeln!(out, "Portfolio loss histogram:")?;
        let peak = histogram.counts.iter().copied().max().unwrap_or(0).max(1);
        for (edge, count) in histogram.edges().zip(&histogram.counts) {
            let bar = "#".repeat(count * 40 / peak);
            writeln!(out, "  {edge:>10.5}  {count:>6}  {bar}")?;
        }
    }
    Ok(())
}

pub fn write_erc<W: Write>(out: &mut W, report: &ErcReport) -> color_eyre::Result<()> {
    writeln!(out, "Category: {}", report.category)?;
    writeln!(out, "Method:   {}", report.method)?;

    let converged = report.runs.iter().filter(|r| r.converged).count();
    if let [run] = report.runs.as_slice() {
        let status = if run.converged { "converged" } else { "not converged" };
        writeln!(out, "Status:   {status} after {} iterations", run.iterations)?;
        if let (Some(es), Some(dev)) = (run.expected_shortfall, run.rel_dev) {
            writeln!(out, "ES:       {es:.6} (relative deviation {dev:.2e})")?;
        }
    } else {
        writeln!(
            out,
            "Ensemble: {converged}/{} runs converged",
            report.runs.len()
        )?;
    }

    writeln!(out)?;
    let width = name_width(&report.assets);
    writeln!(out, "  {:<width$}  {:>8}", "Asset", "Weight")?;
    for (asset, weight) in report.assets.iter().zip(&report.weights) {
        writeln!(out, "  {asset:<width$}  {weight:>8.4}")?;
    }
    Ok(())
}

pub fn write_progressive<W: Write>(out: &mut W, report: &ProgressiveReport) -> color_eyre::Result<()> {
    writeln!(out, "Category: {}", report.category)?;
    writeln!(out, "Members:  {}", report.members)?;
    writeln!(out)?;

    write!(out, "{:<14}  {:>8}  {:>6}  {:>9}", "Method", "Fraction", "Dates", "Converged")?;
    for asset in &report.assets {
        write!(out, "  {asset:>8}")?;
    }
    writeln!(out)?;

    for row in &report.rows {
        write!(
            out,
            "{:<14}  {:>8.2}  {:>6}  {:>9}",
            row.method.kind().name(),
            row.fraction,
            row.dates,
            format!("{}/{}", row.converged_members, report.members)
        )?;
        for weight in row.weights.as_slice() {
            write!(out, "  {weight:>8.4}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskmc_core::RiskMeasure;

    fn risk_report() -> RiskReport {
        RiskReport {
            category: "Close".into(),
            method: SimulationMethod::Vanilla { block_size: 10 },
            n_simulations: 100,
            assets: vec!["AAA".into(), "BBB".into()],
            weights: vec![0.5, 0.5],
            results: vec![RiskResult::new(RiskMeasure::ES, 5.0, vec![0.03, 0.01], 0.04)],
            histogram: Some(Histogram::from_values(&[0.0, 0.5, 1.0], 2)),
        }
    }

    #[test]
    fn test_risk_table() {
        let mut out = Vec::new();
        write_risk(&mut out, &risk_report()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ES at alpha 5%: 0.040000"));
        assert!(text.contains("AAA"));
        assert!(text.contains("0.030000"));
        assert!(text.contains("Portfolio loss histogram"));
    }

    #[test]
    fn test_risk_json() {
        let mut out = Vec::new();
        write_json(&mut out, &risk_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["assets"][1], "BBB");
        assert_eq!(value["method"]["type"], "vanilla");
        assert_eq!(value["results"][0]["measure"], "ES");
    }

    #[test]
    fn test_erc_single_run_status() {
        let report = ErcReport {
            category: "Close".into(),
            method: SimulationMethod::default(),
            assets: vec!["AAA".into(), "BBB".into()],
            weights: vec![0.4, 0.6],
            runs: vec![RunSummary {
                converged: true,
                iterations: 7,
                rel_dev: Some(5e-4),
                expected_shortfall: Some(0.02),
            }],
        };
        let mut out = Vec::new();
        write_erc(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("converged after 7 iterations"));
        assert!(text.contains("0.6000"));
    }
}
