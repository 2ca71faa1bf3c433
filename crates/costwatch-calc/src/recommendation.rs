//! 訂購建議彙總

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::requirement::OrderCalculation;

/// 物料狀態（依處理優先順序排列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 庫存低於安全庫存，且撐不到提前期
    Shortage,
    /// 需要補貨但尚未跌破安全庫存（或庫存天數低於有效提前期）
    Urgent,
    Normal,
    /// 現有庫存超過安全庫存的設定倍數
    Overstock,
}

impl OrderStatus {
    /// 判定狀態
    pub fn classify(calc: &OrderCalculation, overstock_multiple: Decimal) -> Self {
        let needs_order = calc.net_requirement > Decimal::ZERO;
        let below_safety = calc.current_stock < calc.safety_stock;

        if needs_order && below_safety && calc.stock_days < Decimal::from(calc.lead_time_days) {
            Self::Shortage
        } else if needs_order
            && (below_safety || calc.stock_days < Decimal::from(calc.effective_lead_time))
        {
            Self::Urgent
        } else if calc.safety_stock > Decimal::ZERO
            && calc.current_stock > overstock_multiple * calc.safety_stock
        {
            Self::Overstock
        } else {
            Self::Normal
        }
    }

    /// 報表顯示用標籤
    pub fn label(self) -> &'static str {
        match self {
            Self::Shortage => "缺貨",
            Self::Urgent => "緊急",
            Self::Normal => "正常",
            Self::Overstock => "過剩",
        }
    }
}

/// 分類彙總
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CategorySummary {
    pub item_count: usize,
    /// 訂購量 > 0 的項目數
    pub order_item_count: usize,
    pub estimated_cost: Decimal,
}

/// 訂購建議 KPI
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OrderSummary {
    pub total_items: usize,
    pub urgent_count: usize,
    pub shortage_count: usize,
    pub overstock_count: usize,
    /// Σ 訂購量 × 單價
    pub total_estimated_cost: Decimal,
    pub by_category: BTreeMap<String, CategorySummary>,
}

/// 訂購建議
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecommendation {
    pub as_of: NaiveDate,
    /// 依狀態優先順序、物料代碼排序
    pub items: Vec<OrderCalculation>,
    pub summary: OrderSummary,
}

impl OrderRecommendation {
    /// 需要下單的項目
    pub fn orders(&self) -> impl Iterator<Item = &OrderCalculation> {
        self.items.iter().filter(|item| item.order_qty > Decimal::ZERO)
    }
}

/// 訂購建議彙總器
pub struct RecommendationAggregator;

impl RecommendationAggregator {
    pub fn aggregate(mut items: Vec<OrderCalculation>, as_of: NaiveDate) -> OrderRecommendation {
        items.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then_with(|| a.material_code.cmp(&b.material_code))
        });

        let mut summary = OrderSummary {
            total_items: items.len(),
            ..Default::default()
        };

        for item in &items {
            match item.status {
                OrderStatus::Shortage => summary.shortage_count += 1,
                OrderStatus::Urgent => summary.urgent_count += 1,
                OrderStatus::Overstock => summary.overstock_count += 1,
                OrderStatus::Normal => {}
            }
            summary.total_estimated_cost += item.estimated_cost;

            let category = if item.category.trim().is_empty() {
                "未分類".to_string()
            } else {
                item.category.trim().to_string()
            };
            let entry = summary.by_category.entry(category).or_default();
            entry.item_count += 1;
            entry.estimated_cost += item.estimated_cost;
            if item.order_qty > Decimal::ZERO {
                entry.order_item_count += 1;
            }
        }

        tracing::info!(
            "訂購建議: {} 項, 缺貨 {}, 緊急 {}, 預估金額 {}",
            summary.total_items,
            summary.shortage_count,
            summary.urgent_count,
            summary.total_estimated_cost
        );

        OrderRecommendation {
            as_of,
            items,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(code: &str, category: &str) -> OrderCalculation {
        OrderCalculation {
            material_code: code.to_string(),
            material_name: String::new(),
            category: category.to_string(),
            unit: "kg".to_string(),
            gross_requirement: Decimal::ZERO,
            safety_stock: Decimal::from(10),
            total_requirement: Decimal::ZERO,
            current_stock: Decimal::from(15),
            in_transit: Decimal::ZERO,
            available_stock: Decimal::from(15),
            net_requirement: Decimal::ZERO,
            order_qty: Decimal::ZERO,
            unit_price: Decimal::from(2),
            estimated_cost: Decimal::ZERO,
            lead_time_days: 2,
            effective_lead_time: 3,
            moq: Decimal::ZERO,
            packaging_unit: Decimal::ONE,
            avg_daily_consumption: Decimal::from(5),
            daily_std_dev: Decimal::ZERO,
            stock_days: Decimal::from(3),
            status: OrderStatus::Normal,
        }
    }

    #[test]
    fn test_classify_status() {
        let multiple = Decimal::from(3);

        let normal = calc("M1", "");
        assert_eq!(OrderStatus::classify(&normal, multiple), OrderStatus::Normal);

        let mut shortage = calc("M2", "");
        shortage.current_stock = Decimal::from(5);
        shortage.net_requirement = Decimal::from(20);
        shortage.stock_days = Decimal::ONE;
        assert_eq!(OrderStatus::classify(&shortage, multiple), OrderStatus::Shortage);

        // 低於安全庫存但還撐得過提前期 → 緊急
        let mut urgent = shortage.clone();
        urgent.stock_days = Decimal::new(25, 1);
        assert_eq!(OrderStatus::classify(&urgent, multiple), OrderStatus::Urgent);

        // 未低於安全庫存，但庫存天數不足有效提前期 → 緊急
        let mut near = calc("M3", "");
        near.net_requirement = Decimal::from(4);
        near.stock_days = Decimal::new(29, 1);
        assert_eq!(OrderStatus::classify(&near, multiple), OrderStatus::Urgent);

        let mut overstock = calc("M4", "");
        overstock.current_stock = Decimal::from(31);
        assert_eq!(OrderStatus::classify(&overstock, multiple), OrderStatus::Overstock);
    }

    #[test]
    fn test_aggregate_summary() {
        let mut a = calc("M2", "Dairy");
        a.status = OrderStatus::Urgent;
        a.order_qty = Decimal::from(10);
        a.estimated_cost = Decimal::from(20);

        let mut b = calc("M1", "Dairy");
        b.status = OrderStatus::Shortage;
        b.order_qty = Decimal::from(5);
        b.estimated_cost = Decimal::from(10);

        let c = calc("M3", "");

        let recommendation = RecommendationAggregator::aggregate(
            vec![c, a, b],
            NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
        );

        let order: Vec<_> = recommendation.items.iter().map(|i| i.material_code.as_str()).collect();
        assert_eq!(order, vec!["M1", "M2", "M3"]);

        let summary = &recommendation.summary;
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.shortage_count, 1);
        assert_eq!(summary.urgent_count, 1);
        assert_eq!(summary.total_estimated_cost, Decimal::from(30));
        assert_eq!(summary.by_category["Dairy"].order_item_count, 2);
        assert_eq!(summary.by_category["Dairy"].estimated_cost, Decimal::from(30));
        assert_eq!(summary.by_category["未分類"].item_count, 1);
        assert_eq!(recommendation.orders().count(), 2);
    }
}
