//! Token Vetter CLI
//!
//! Vets one or more Solana mint addresses and prints the outcome.
//!
//! Usage:
//!   token_vetter <MINT> [MINT...]
//!   token_vetter --json <MINT> [MINT...]

use eyre::{eyre, Result};
use token_vetter::core::format_age_display;
use token_vetter::{VettingConfig, VettingPipeline, VettingReport};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let mut json = false;
    let mut addresses = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            _ => addresses.push(arg),
        }
    }

    if addresses.is_empty() {
        print_usage();
        return Err(eyre!("No contract address given"));
    }

    let pipeline = VettingPipeline::from_config(VettingConfig::from_env()).map_err(|e| eyre!("{}", e))?;

    if addresses.len() == 1 {
        let report = pipeline.vet(&addresses[0]).await.map_err(|e| eyre!("{}", e))?;
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        return Ok(());
    }

    let batch = pipeline.vet_batch(&addresses).await.map_err(|e| eyre!("{}", e))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    for entry in &batch.results {
        match (&entry.report, &entry.error) {
            (Some(report), _) => print_report(report),
            (None, Some(err)) => println!("❌ [{}] {}: {}\n", entry.index, entry.address, err),
            (None, None) => {}
        }
    }
    let stats = &batch.stats;
    println!(
        "📊 {} vetted: {} eligible, {} too young, {} no tier, {} failed",
        stats.total, stats.eligible, stats.too_young, stats.no_tier_match, stats.failed
    );
    if let Some(avg) = stats.average_eligible_score {
        println!("   Average eligible risk score: {:.1}", avg);
    }
    for group in &batch.tiers {
        let members: Vec<String> = group
            .tokens
            .iter()
            .map(|t| format!("{} ({})", t.symbol, t.risk_score))
            .collect();
        println!("   {}: {}", group.tier, members.join(", "));
    }

    Ok(())
}

fn print_report(report: &VettingReport) {
    let s = &report.snapshot;
    println!("🔎 {} ({})", s.identity.symbol, report.address);
    println!("   {}", report.summary);
    println!(
        "   Age: {} [{}]",
        format_age_display(s.age.project_age_days),
        s.age.confidence.as_str()
    );
    println!(
        "   Liquidity: ${:.0} | LP: {:?} | Holders: {} | Top holder: {:.1}%",
        s.liquidity.liquidity_usd,
        s.liquidity.lp_status,
        s.holders
            .holder_count
            .map_or_else(|| "unknown".to_string(), |count| count.to_string()),
        s.holders.distribution.top1_percent
    );
    println!(
        "   Contract security: {}/100 ({} vulnerabilities)",
        s.contract.security_score,
        s.contract.vulnerabilities.len()
    );
    if let Some(score) = &report.score {
        for factor in &score.breakdown {
            println!(
                "     - {}: {} (weight {:.2}) {}",
                factor.name, factor.score, factor.weight, factor.reason
            );
        }
    }
    if report.degraded {
        let p = &s.provenance;
        println!(
            "   ⚠️ Degraded sources: metadata={} age={} holders={} liquidity={}",
            p.metadata.source.as_str(),
            p.age.source.as_str(),
            p.holders.source.as_str(),
            p.liquidity.source.as_str()
        );
    }
    println!();
}

fn print_usage() {
    println!("Usage: token_vetter [--json] <MINT> [MINT...]");
}
