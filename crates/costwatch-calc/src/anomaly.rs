//! 耗用異常偵測

use rust_decimal::Decimal;
use serde::Serialize;

use crate::variance::VarianceItem;

/// 判定為異常的最低偏差（%）
const ANOMALY_THRESHOLD_PCT: i64 = 10;
const MEDIUM_THRESHOLD_PCT: i64 = 20;
const HIGH_THRESHOLD_PCT: i64 = 30;

/// 異常類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// 實際用量高於理論
    Overuse,
    /// 實際用量低於理論
    Underuse,
    /// 實際均價高於標準價
    PriceSpike,
    /// 實際均價低於標準價
    PriceDrop,
}

/// 嚴重程度（由高到低排序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    fn from_pct(abs_pct: Decimal) -> Self {
        if abs_pct >= Decimal::from(HIGH_THRESHOLD_PCT) {
            Self::High
        } else if abs_pct >= Decimal::from(MEDIUM_THRESHOLD_PCT) {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// 異常項目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyItem {
    pub material_code: String,
    pub material_name: String,
    pub kinds: Vec<AnomalyKind>,
    pub severity: Severity,
    /// 數量與價格偏差中較大的絕對百分比
    pub deviation_pct: Decimal,
}

/// 異常偵測器
pub struct AnomalyDetector;

impl AnomalyDetector {
    /// 由差異明細偵測異常
    ///
    /// 數量偏差 ≥ 10% 視為用量異常；主檔單價下價格偏差 ≥ 10% 視為價格異常
    /// （估計單價的價格偏差恆為 0，不列入）。
    pub fn detect(items: &[VarianceItem]) -> Vec<AnomalyItem> {
        let threshold = Decimal::from(ANOMALY_THRESHOLD_PCT);
        let mut anomalies = Vec::new();

        for item in items {
            let qty_pct = item.qty_diff_pct.abs();
            let price_pct = if item.standard_price.is_estimated() {
                Decimal::ZERO
            } else {
                item.price_diff_pct.abs()
            };

            let mut kinds = Vec::new();
            if qty_pct >= threshold {
                kinds.push(if item.qty_diff_pct > Decimal::ZERO {
                    AnomalyKind::Overuse
                } else {
                    AnomalyKind::Underuse
                });
            }
            if price_pct >= threshold {
                kinds.push(if item.price_diff_pct > Decimal::ZERO {
                    AnomalyKind::PriceSpike
                } else {
                    AnomalyKind::PriceDrop
                });
            }
            if kinds.is_empty() {
                continue;
            }

            let deviation_pct = qty_pct.max(price_pct);
            anomalies.push(AnomalyItem {
                material_code: item.material_code.clone(),
                material_name: item.material_name.clone(),
                kinds,
                severity: Severity::from_pct(deviation_pct),
                deviation_pct,
            });
        }

        anomalies.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.material_code.cmp(&b.material_code))
        });

        tracing::debug!("異常偵測: {} 項", anomalies.len());

        anomalies
    }

    /// 高嚴重度項目數
    pub fn high_severity_count(anomalies: &[AnomalyItem]) -> usize {
        anomalies
            .iter()
            .filter(|a| a.severity == Severity::High)
            .count()
    }
}
