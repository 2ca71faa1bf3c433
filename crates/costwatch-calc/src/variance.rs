//! 耗用差異分析
//!
//! 理論耗用 vs 實際採購，將總成本差異拆解為數量差異與價格差異：
//! - 價格差異 = round((實際均價 − 標準價) × 實際數量)
//! - 數量差異 = round((實際數量 − 理論數量) × 標準價)
//! - 總差異 = 價格差異 + 數量差異

use costwatch_core::numeric::{percent, round_dp, round_half_up, safe_div};
use costwatch_core::PurchaseRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::consumption::ExpectedConsumption;
use crate::master::MasterData;

/// 單價保留位數
const PRICE_DP: u32 = 4;
/// 百分比保留位數
const PCT_DP: u32 = 2;

/// 物料採購彙總
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MaterialPurchases {
    pub quantity: Decimal,
    pub total_cost: Decimal,
}

impl MaterialPurchases {
    /// 實際均價（數量為零時為 0）
    pub fn average_price(&self) -> Decimal {
        safe_div(self.total_cost, self.quantity)
    }
}

/// 依物料彙總的採購
#[derive(Debug, Clone, Default, Serialize)]
pub struct PurchaseTotals {
    materials: BTreeMap<String, MaterialPurchases>,
}

impl PurchaseTotals {
    /// 依物料代碼加總數量與金額（缺代碼者略過）
    pub fn aggregate(records: &[PurchaseRecord]) -> Self {
        let mut materials: BTreeMap<String, MaterialPurchases> = BTreeMap::new();
        for record in records {
            let Some(code) = record.code() else {
                continue;
            };
            let totals = materials.entry(code.to_string()).or_default();
            totals.quantity += record.quantity;
            totals.total_cost += record.total_cost;
        }
        Self { materials }
    }

    pub fn get(&self, material_code: &str) -> Option<&MaterialPurchases> {
        self.materials.get(material_code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialPurchases)> {
        self.materials.iter().map(|(code, totals)| (code.as_str(), totals))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// 標準單價來源
///
/// 主檔沒有單價時以實際均價代替（`Estimated`），此時價格差異恆為 0，
/// 下游必須能區分這類較低可信度的結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "price", rename_all = "snake_case")]
pub enum PriceSource {
    /// 來自物料主檔
    Authoritative(Decimal),
    /// 以實際均價估計
    Estimated(Decimal),
}

impl PriceSource {
    pub fn price(self) -> Decimal {
        match self {
            Self::Authoritative(price) | Self::Estimated(price) => price,
        }
    }

    pub fn is_estimated(self) -> bool {
        matches!(self, Self::Estimated(_))
    }
}

/// 差異方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Favorability {
    /// 花費低於預期
    Favorable,
    /// 花費高於預期
    Unfavorable,
    Neutral,
}

impl Favorability {
    fn of(total_variance: Decimal) -> Self {
        if total_variance < Decimal::ZERO {
            Self::Favorable
        } else if total_variance > Decimal::ZERO {
            Self::Unfavorable
        } else {
            Self::Neutral
        }
    }
}

/// 單一物料的差異明細
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceItem {
    pub material_code: String,
    pub material_name: String,
    pub expected_qty: Decimal,
    pub actual_qty: Decimal,
    pub actual_total_cost: Decimal,
    pub standard_price: PriceSource,
    pub actual_avg_price: Decimal,
    pub qty_diff: Decimal,
    pub qty_diff_pct: Decimal,
    pub price_diff: Decimal,
    pub price_diff_pct: Decimal,
    pub qty_variance: Decimal,
    pub price_variance: Decimal,
    pub total_variance: Decimal,
    pub favorability: Favorability,
}

/// 耗用差異分析結果
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConsumptionVarianceResult {
    /// 依 |總差異| 遞減排序
    pub items: Vec<VarianceItem>,
    pub total_price_variance: Decimal,
    pub total_qty_variance: Decimal,
    pub total_variance: Decimal,
    pub favorable_count: usize,
    pub unfavorable_count: usize,
    /// 以實際均價估計標準價的項目數
    pub estimated_price_count: usize,
    /// 有理論耗用但沒有採購紀錄的物料
    pub unpurchased_materials: Vec<String>,
}

/// 耗用差異分析器
pub struct VarianceAnalyzer;

impl VarianceAnalyzer {
    /// 分析同時具有理論耗用與採購紀錄的物料
    ///
    /// 估計單價的項目仍計入總計，但以 `PriceSource::Estimated` 與
    /// `estimated_price_count` 明確標示。
    pub fn analyze(
        expected: &[ExpectedConsumption],
        purchases: &PurchaseTotals,
        master: &MasterData,
    ) -> ConsumptionVarianceResult {
        let mut result = ConsumptionVarianceResult::default();

        for consumption in expected {
            let Some(actual) = purchases.get(&consumption.material_code) else {
                result
                    .unpurchased_materials
                    .push(consumption.material_code.clone());
                continue;
            };

            let item = Self::analyze_material(consumption, actual, master);

            if item.standard_price.is_estimated() {
                tracing::warn!(
                    "物料 {} 無主檔單價，以實際均價 {} 估計",
                    item.material_code,
                    item.actual_avg_price
                );
                result.estimated_price_count += 1;
            }
            match item.favorability {
                Favorability::Favorable => result.favorable_count += 1,
                Favorability::Unfavorable => result.unfavorable_count += 1,
                Favorability::Neutral => {}
            }
            result.total_price_variance += item.price_variance;
            result.total_qty_variance += item.qty_variance;
            result.total_variance += item.total_variance;
            result.items.push(item);
        }

        result.items.sort_by(|a, b| {
            b.total_variance
                .abs()
                .cmp(&a.total_variance.abs())
                .then_with(|| a.material_code.cmp(&b.material_code))
        });
        result.unpurchased_materials.sort();

        tracing::debug!(
            "耗用差異: {} 項, 總差異 {}, 有利 {} / 不利 {}",
            result.items.len(),
            result.total_variance,
            result.favorable_count,
            result.unfavorable_count
        );

        result
    }

    /// 單一物料差異
    fn analyze_material(
        consumption: &ExpectedConsumption,
        actual: &MaterialPurchases,
        master: &MasterData,
    ) -> VarianceItem {
        let expected_qty = consumption.expected_qty;
        let actual_qty = actual.quantity;
        let actual_avg_price = round_dp(actual.average_price(), PRICE_DP);

        let standard_price = match master.unit_price(&consumption.material_code) {
            Some(price) => PriceSource::Authoritative(price),
            None => PriceSource::Estimated(actual_avg_price),
        };
        let standard = standard_price.price();

        let qty_diff = actual_qty - expected_qty;
        let price_diff = actual_avg_price - standard;

        let price_variance = round_half_up(price_diff * actual_qty);
        let qty_variance = round_half_up(qty_diff * standard);
        let total_variance = price_variance + qty_variance;

        let material_name = if consumption.material_name.is_empty() {
            master
                .name(&consumption.material_code)
                .unwrap_or_default()
                .to_string()
        } else {
            consumption.material_name.clone()
        };

        VarianceItem {
            material_code: consumption.material_code.clone(),
            material_name,
            expected_qty,
            actual_qty,
            actual_total_cost: actual.total_cost,
            standard_price,
            actual_avg_price,
            qty_diff,
            qty_diff_pct: round_dp(percent(qty_diff, expected_qty), PCT_DP),
            price_diff,
            price_diff_pct: round_dp(percent(price_diff, standard), PCT_DP),
            qty_variance,
            price_variance,
            total_variance,
            favorability: Favorability::of(total_variance),
        }
    }
}
