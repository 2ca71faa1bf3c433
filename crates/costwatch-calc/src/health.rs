//! BOM 健康度評分
//!
//! overall = 資料品質 × 0.2 + 覆蓋率 × 0.3 + 差異 × 0.3 + 異常 × 0.2
//!
//! 各子分數 0–100；來源資料為空時該子分數為 100。

use costwatch_core::numeric::{clamp_score, round_half_up, safe_div};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::anomaly::{AnomalyDetector, AnomalyItem};
use crate::coverage::BomCoverageResult;
use crate::validation::BomValidationResult;
use crate::variance::ConsumptionVarianceResult;

/// 平均偏差達此百分比時差異分數歸零
const VARIANCE_FLOOR_PCT: i64 = 30;
/// 高嚴重度比例的扣分倍率（50% 即歸零）
const HIGH_SEVERITY_PENALTY: i64 = 200;

/// 各子分數權重（合計 1）
const WEIGHT_DATA_QUALITY: Decimal = Decimal::from_parts(2, 0, 0, false, 1);
const WEIGHT_COVERAGE: Decimal = Decimal::from_parts(3, 0, 0, false, 1);
const WEIGHT_VARIANCE: Decimal = Decimal::from_parts(3, 0, 0, false, 1);
const WEIGHT_ANOMALY: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// 健康等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthGrade {
    A,
    B,
    C,
    D,
    F,
}

impl HealthGrade {
    fn from_score(score: Decimal) -> Self {
        if score >= Decimal::from(90) {
            Self::A
        } else if score >= Decimal::from(80) {
            Self::B
        } else if score >= Decimal::from(70) {
            Self::C
        } else if score >= Decimal::from(60) {
            Self::D
        } else {
            Self::F
        }
    }
}

/// BOM 健康度
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomHealthScore {
    pub data_quality: Decimal,
    pub coverage_score: Decimal,
    pub variance_score: Decimal,
    pub anomaly_score: Decimal,
    pub overall: Decimal,
    pub grade: HealthGrade,
    /// 差異項目的平均絕對偏差（%）
    pub avg_abs_diff_pct: Decimal,
    pub high_severity_count: usize,
}

/// 健康度評分器
pub struct HealthScorer;

impl HealthScorer {
    pub fn score(
        validation: &BomValidationResult,
        coverage: &BomCoverageResult,
        variance: &ConsumptionVarianceResult,
        anomalies: &[AnomalyItem],
    ) -> BomHealthScore {
        let data_quality = if validation.total_rows == 0 {
            Decimal::ONE_HUNDRED
        } else {
            clamp_score(validation.compliance_pct)
        };

        let coverage_score = if coverage.total_sold_products == 0 {
            Decimal::ONE_HUNDRED
        } else {
            clamp_score(coverage.completeness_score)
        };

        let avg_abs_diff_pct = Self::avg_abs_diff_pct(variance);
        let variance_score = if variance.items.is_empty() {
            Decimal::ONE_HUNDRED
        } else {
            let penalty = avg_abs_diff_pct / Decimal::from(VARIANCE_FLOOR_PCT) * Decimal::ONE_HUNDRED;
            clamp_score(round_half_up(Decimal::ONE_HUNDRED - penalty))
        };

        let high_severity_count = AnomalyDetector::high_severity_count(anomalies);
        let anomaly_score = if anomalies.is_empty() {
            Decimal::ONE_HUNDRED
        } else {
            let ratio = Decimal::from(high_severity_count) / Decimal::from(anomalies.len());
            clamp_score(round_half_up(
                Decimal::ONE_HUNDRED - ratio * Decimal::from(HIGH_SEVERITY_PENALTY),
            ))
        };

        let overall = clamp_score(round_half_up(
            data_quality * WEIGHT_DATA_QUALITY
                + coverage_score * WEIGHT_COVERAGE
                + variance_score * WEIGHT_VARIANCE
                + anomaly_score * WEIGHT_ANOMALY,
        ));

        tracing::debug!(
            "BOM 健康度: {} (品質 {}, 覆蓋 {}, 差異 {}, 異常 {})",
            overall,
            data_quality,
            coverage_score,
            variance_score,
            anomaly_score
        );

        BomHealthScore {
            data_quality,
            coverage_score,
            variance_score,
            anomaly_score,
            overall,
            grade: HealthGrade::from_score(overall),
            avg_abs_diff_pct: costwatch_core::numeric::round_dp(avg_abs_diff_pct, 2),
            high_severity_count,
        }
    }

    /// mean(|實際 − 理論| / 理論 × 100)，理論為 0 時分母視為 1
    fn avg_abs_diff_pct(variance: &ConsumptionVarianceResult) -> Decimal {
        if variance.items.is_empty() {
            return Decimal::ZERO;
        }
        let total: Decimal = variance
            .items
            .iter()
            .map(|item| {
                let denominator = if item.expected_qty.is_zero() {
                    Decimal::ONE
                } else {
                    item.expected_qty.abs()
                };
                safe_div((item.actual_qty - item.expected_qty).abs(), denominator) * Decimal::ONE_HUNDRED
            })
            .sum();
        total / Decimal::from(variance.items.len())
    }
}
