//! Risk scoring
//!
//! Both scores are deterministic functions of their inputs and saturate at 100.

use crate::profile::AddressRiskProfile;
use crate::{EvasionPattern, RiskLevel, RiskScore};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    /// Score a single transaction from its native value and evasion pattern.
    pub fn transaction_score(value: Decimal, pattern: EvasionPattern) -> RiskScore {
        let mut points = 0u32;

        if value > Decimal::from(100) {
            points += 30;
        } else if value > Decimal::from(10) {
            points += 20;
        } else if value > Decimal::ONE {
            points += 10;
        }

        points += match pattern {
            EvasionPattern::Mixing => 40,
            EvasionPattern::Layering => 30,
            _ => 0,
        };

        RiskScore::saturating(points)
    }

    /// Score an address from its accumulated profile counters.
    pub fn profile_score(profile: &AddressRiskProfile) -> RiskScore {
        RiskScore::saturating(
            Self::profile_factors(profile)
                .iter()
                .map(|(points, _)| *points)
                .sum(),
        )
    }

    /// Explain an address score as human-readable risk factors
    pub fn assess_profile(profile: &AddressRiskProfile) -> ProfileAssessment {
        let risk_score = Self::profile_score(profile);

        ProfileAssessment {
            address: profile.address.clone(),
            risk_score,
            risk_level: RiskLevel::from(risk_score),
            risk_factors: Self::profile_factors(profile)
                .into_iter()
                .map(|(_, factor)| factor)
                .collect(),
            assessed_at: Utc::now(),
        }
    }

    fn profile_factors(profile: &AddressRiskProfile) -> Vec<(u32, String)> {
        let mut factors = Vec::new();
        let volume = profile.total_volume_usd;

        if volume > Decimal::from(1_000_000) {
            factors.push((30, "Volume above $1M".to_string()));
        } else if volume > Decimal::from(100_000) {
            factors.push((20, "Volume above $100k".to_string()));
        } else if volume > Decimal::from(10_000) {
            factors.push((10, "Volume above $10k".to_string()));
        }

        if profile.tx_count > 1000 {
            factors.push((20, "More than 1000 transactions".to_string()));
        } else if profile.tx_count > 100 {
            factors.push((10, "More than 100 transactions".to_string()));
        }

        if profile.layering_events > 0 {
            factors.push((25, format!("{} layering events", profile.layering_events)));
        }
        if profile.mixing_events > 0 {
            factors.push((25, format!("{} mixing events", profile.mixing_events)));
        }

        factors
    }
}

/// Address risk assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAssessment {
    /// Assessed address
    pub address: String,

    /// Risk score
    pub risk_score: RiskScore,

    /// Risk level
    pub risk_level: RiskLevel,

    /// Risk factors detected
    pub risk_factors: Vec<String>,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}
