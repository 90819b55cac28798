//! Smart-Contract Risk Analyzer
//!
//! On-chain authority flags plus an optional external audit signal.
//!
//! Internal score: 100 - 40/critical - 20/high - 10/medium, then -30 for an
//! active mint authority and -15 for an active freeze authority, clamped.
//! With an external score: final = 0.7 * internal + 0.3 * external.

use crate::models::{
    AuthorityStatus, ContractRisk, ContractRiskLevel, Severity, Vulnerability,
};
use crate::providers::AuditSignal;

const CRITICAL_PENALTY: i32 = 40;
const HIGH_PENALTY: i32 = 20;
const MEDIUM_PENALTY: i32 = 10;
const MINT_AUTHORITY_PENALTY: i32 = 30;
const FREEZE_AUTHORITY_PENALTY: i32 = 15;

const INTERNAL_WEIGHT: f64 = 0.7;
const EXTERNAL_WEIGHT: f64 = 0.3;

pub fn analyze_contract(
    mint_authority: &AuthorityStatus,
    freeze_authority: &AuthorityStatus,
    audit: Option<&AuditSignal>,
) -> ContractRisk {
    let mut vulnerabilities = Vec::new();

    if let AuthorityStatus::Active(addr) = mint_authority {
        vulnerabilities.push(Vulnerability {
            severity: Severity::Critical,
            title: "Mint authority active".to_string(),
            detail: format!("{} can mint unlimited supply", addr),
        });
    }
    if let AuthorityStatus::Active(addr) = freeze_authority {
        vulnerabilities.push(Vulnerability {
            severity: Severity::High,
            title: "Freeze authority active".to_string(),
            detail: format!("{} can freeze holder accounts", addr),
        });
    }
    if *mint_authority == AuthorityStatus::Unknown || *freeze_authority == AuthorityStatus::Unknown {
        vulnerabilities.push(Vulnerability {
            severity: Severity::Medium,
            title: "Authority status unknown".to_string(),
            detail: "Mint/freeze authorities could not be read on-chain".to_string(),
        });
    }

    if let Some(signal) = audit {
        for (level, name) in &signal.findings {
            // Authorities are already covered by the on-chain check
            if name.to_lowercase().contains("authority") {
                continue;
            }
            let severity = match level.to_lowercase().as_str() {
                "danger" => Severity::High,
                "warn" => Severity::Medium,
                _ => continue,
            };
            vulnerabilities.push(Vulnerability {
                severity,
                title: name.clone(),
                detail: format!("External audit finding ({})", level),
            });
        }
    }

    let count = |s: Severity| vulnerabilities.iter().filter(|v| v.severity == s).count() as u32;
    let critical_count = count(Severity::Critical);
    let high_count = count(Severity::High);
    let medium_count = count(Severity::Medium);

    let mut internal = 100
        - CRITICAL_PENALTY * critical_count as i32
        - HIGH_PENALTY * high_count as i32
        - MEDIUM_PENALTY * medium_count as i32;
    if mint_authority.is_active() {
        internal -= MINT_AUTHORITY_PENALTY;
    }
    if freeze_authority.is_active() {
        internal -= FREEZE_AUTHORITY_PENALTY;
    }
    let internal_score = internal.clamp(0, 100) as u8;

    let external_score = audit.map(|a| a.external_score.min(100));
    let security_score = match external_score {
        Some(ext) => (INTERNAL_WEIGHT * internal_score as f64 + EXTERNAL_WEIGHT * ext as f64)
            .round()
            .clamp(0.0, 100.0) as u8,
        None => internal_score,
    };

    let risk_level = if critical_count > 0 || security_score < 30 {
        ContractRiskLevel::Critical
    } else if high_count > 0 || security_score < 50 {
        ContractRiskLevel::High
    } else if medium_count > 0 || security_score < 70 {
        ContractRiskLevel::Medium
    } else {
        ContractRiskLevel::Low
    };

    let authority_risk = if mint_authority.is_active() {
        ContractRiskLevel::Critical
    } else if freeze_authority.is_active() {
        ContractRiskLevel::High
    } else if *mint_authority == AuthorityStatus::Unknown
        || *freeze_authority == AuthorityStatus::Unknown
    {
        ContractRiskLevel::Medium
    } else {
        ContractRiskLevel::Low
    };

    ContractRisk {
        critical_count,
        high_count,
        medium_count,
        authority_risk,
        has_full_audit: audit.and_then(|a| a.has_full_audit),
        has_bug_bounty: audit.and_then(|a| a.has_bug_bounty),
        internal_score,
        external_score,
        security_score,
        risk_level,
        vulnerabilities,
    }
}
