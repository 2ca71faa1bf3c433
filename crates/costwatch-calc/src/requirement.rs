//! 訂購需求計算
//!
//! 產品需求統計經 BOM 單位耗用量轉為物料日需求，再計算：
//! - 總需求 = 有效提前期 L 天內的日平均需求加總
//! - 安全庫存 = round(Z × σ × √L)
//! - 淨需求 = max(0, 總需求 + 安全庫存 − (現有 + 在途))
//! - 訂購量 = 淨需求向上取整到包裝單位，且不低於最小訂購量

use chrono::NaiveDate;
use costwatch_core::numeric::{ceil_to_multiple, round_dp, round_half_up, safe_div, sqrt};
use costwatch_core::{AnalysisConfig, ServiceLevel, StockPosition};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::demand::{DayOfWeek, DemandModel};
use crate::master::MasterData;
use crate::recipe::RecipeIndex;
use crate::recommendation::OrderStatus;

/// 日均耗用為 0 時的庫存天數（視為無限）
pub const STOCK_DAYS_SENTINEL: i64 = 999;

const QTY_DP: u32 = 2;
const STAT_DP: u32 = 4;

/// 單一物料的訂購建議
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCalculation {
    pub material_code: String,
    pub material_name: String,
    pub category: String,
    pub unit: String,
    pub gross_requirement: Decimal,
    pub safety_stock: Decimal,
    pub total_requirement: Decimal,
    pub current_stock: Decimal,
    pub in_transit: Decimal,
    pub available_stock: Decimal,
    pub net_requirement: Decimal,
    pub order_qty: Decimal,
    pub unit_price: Decimal,
    pub estimated_cost: Decimal,
    /// 物料提前期（天）
    pub lead_time_days: u32,
    /// 提前期 + 安全天數
    pub effective_lead_time: u32,
    pub moq: Decimal,
    pub packaging_unit: Decimal,
    pub avg_daily_consumption: Decimal,
    /// 物料日需求標準差
    pub daily_std_dev: Decimal,
    pub stock_days: Decimal,
    pub status: OrderStatus,
}

/// 物料某一星期的日需求（平均, 變異數）
#[derive(Debug, Clone, Copy, Default)]
struct DailyDemand {
    mean: Decimal,
    variance: Decimal,
}

/// 訂購需求計算器
pub struct RequirementCalculator<'a> {
    config: &'a AnalysisConfig,
    model: &'a DemandModel,
    recipes: &'a RecipeIndex,
    master: &'a MasterData,
    as_of: NaiveDate,
}

impl<'a> RequirementCalculator<'a> {
    pub fn new(
        config: &'a AnalysisConfig,
        model: &'a DemandModel,
        recipes: &'a RecipeIndex,
        master: &'a MasterData,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            config,
            model,
            recipes,
            master,
            as_of,
        }
    }

    /// 計算所有物料（缺代碼者略過）
    pub fn calculate_all(&self, positions: &[StockPosition]) -> Vec<OrderCalculation> {
        positions
            .iter()
            .filter(|p| !p.material_code.trim().is_empty())
            .map(|p| self.calculate(p))
            .collect()
    }

    /// 單一物料訂購計算
    pub fn calculate(&self, position: &StockPosition) -> OrderCalculation {
        let material_code = position.material_code.trim();
        let profile = self.daily_profile(material_code);

        let lead_time_days = self.config.lead_time(position.lead_time_days);
        let effective_lead_time = self.config.effective_lead_time(position.lead_time_days);

        let horizon: Vec<DayOfWeek> = self
            .as_of
            .iter_days()
            .take(effective_lead_time as usize)
            .map(DayOfWeek::of)
            .collect();

        let gross_requirement = round_dp(
            horizon.iter().map(|day| profile[*day as usize].mean).sum::<Decimal>(),
            QTY_DP,
        );

        let daily_std_dev = if horizon.is_empty() {
            Decimal::ZERO
        } else {
            let variance = horizon
                .iter()
                .map(|day| profile[*day as usize].variance)
                .sum::<Decimal>()
                / Decimal::from(horizon.len());
            round_dp(sqrt(variance), STAT_DP)
        };

        let safety_stock = safety_stock(self.config.service_level, daily_std_dev, effective_lead_time);
        let total_requirement = gross_requirement + safety_stock;
        let available_stock = position.available_stock();
        let net_requirement = (total_requirement - available_stock).max(Decimal::ZERO);
        let order_qty = order_quantity(net_requirement, position.packaging_unit, position.moq);

        let avg_daily_consumption = round_dp(
            profile.iter().map(|d| d.mean).sum::<Decimal>() / Decimal::from(7),
            STAT_DP,
        );

        let unit_price = if position.unit_price > Decimal::ZERO {
            position.unit_price
        } else {
            self.master.unit_price(material_code).unwrap_or(Decimal::ZERO)
        };

        let material_name = if position.material_name.trim().is_empty() {
            self.master
                .name(material_code)
                .unwrap_or_default()
                .to_string()
        } else {
            position.material_name.trim().to_string()
        };

        let mut calculation = OrderCalculation {
            material_code: material_code.to_string(),
            material_name,
            category: position.category.clone(),
            unit: position.unit.clone(),
            gross_requirement,
            safety_stock,
            total_requirement,
            current_stock: position.current_stock,
            in_transit: position.in_transit,
            available_stock,
            net_requirement,
            order_qty,
            unit_price,
            estimated_cost: round_dp(order_qty * unit_price, QTY_DP),
            lead_time_days,
            effective_lead_time,
            moq: position.moq,
            packaging_unit: position.effective_packaging_unit(),
            avg_daily_consumption,
            daily_std_dev,
            stock_days: stock_days(available_stock, avg_daily_consumption),
            status: OrderStatus::Normal,
        };
        calculation.status = OrderStatus::classify(&calculation, self.config.overstock_multiple);

        tracing::debug!(
            "物料 {} 訂購: 總需求 {}, 安全庫存 {}, 淨需求 {}, 訂購量 {}, 狀態 {:?}",
            calculation.material_code,
            calculation.gross_requirement,
            calculation.safety_stock,
            calculation.net_requirement,
            calculation.order_qty,
            calculation.status
        );

        calculation
    }

    /// 物料各星期的日需求：μ = Σ 單位耗用 × 產品平均；σ² = Σ (單位耗用 × 產品標準差)²
    fn daily_profile(&self, material_code: &str) -> [DailyDemand; 7] {
        let mut profile = [DailyDemand::default(); 7];
        for (product, ratio) in self.recipes.consumers_of(material_code) {
            for day in DayOfWeek::ALL {
                let entry = &mut profile[day as usize];
                entry.mean += ratio * self.model.mean(day, product);
                let sigma = ratio * self.model.std_dev(day, product);
                entry.variance += sigma * sigma;
            }
        }
        profile
    }
}

/// 安全庫存 = round(Z × σ × √L)
pub fn safety_stock(level: ServiceLevel, daily_std_dev: Decimal, effective_lead_time: u32) -> Decimal {
    let lead = sqrt(Decimal::from(effective_lead_time));
    round_half_up(level.z_score() * daily_std_dev * lead).max(Decimal::ZERO)
}

/// 訂購量：淨需求向上取整到包裝單位，再提高到不低於最小訂購量的包裝倍數；淨需求為 0 時為 0
pub fn order_quantity(net_requirement: Decimal, packaging_unit: Decimal, moq: Decimal) -> Decimal {
    if net_requirement <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let qty = ceil_to_multiple(net_requirement, packaging_unit);
    if qty < moq {
        ceil_to_multiple(moq, packaging_unit)
    } else {
        qty
    }
}

/// 庫存天數；日均耗用 ≤ 0 時回傳哨兵值 999
pub fn stock_days(available_stock: Decimal, avg_daily_consumption: Decimal) -> Decimal {
    if avg_daily_consumption <= Decimal::ZERO {
        return Decimal::from(STOCK_DAYS_SENTINEL);
    }
    round_dp(safe_div(available_stock, avg_daily_consumption), 1)
}
