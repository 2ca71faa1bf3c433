//! 訂購建議 CSV 匯出
//!
//! 欄位順序為下游相容介面，不可調整。

use costwatch_core::{EngineError, Result};
use std::io::Write;

use crate::recommendation::OrderRecommendation;

/// CSV 表頭（固定順序）
pub const ORDER_CSV_HEADER: [&str; 15] = [
    "物料代碼",
    "物料名稱",
    "分類",
    "單位",
    "總需求",
    "安全庫存",
    "現有庫存",
    "在途數量",
    "淨需求",
    "訂購量",
    "單價",
    "預估金額",
    "提前期",
    "最小訂購量",
    "狀態",
];

/// 將訂購建議寫成 CSV
pub fn write_order_csv<W: Write>(recommendation: &OrderRecommendation, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(ORDER_CSV_HEADER)
        .map_err(|e| EngineError::Export(e.to_string()))?;

    for item in &recommendation.items {
        let record = [
            item.material_code.clone(),
            item.material_name.clone(),
            item.category.clone(),
            item.unit.clone(),
            item.gross_requirement.normalize().to_string(),
            item.safety_stock.normalize().to_string(),
            item.current_stock.normalize().to_string(),
            item.in_transit.normalize().to_string(),
            item.net_requirement.normalize().to_string(),
            item.order_qty.normalize().to_string(),
            item.unit_price.normalize().to_string(),
            item.estimated_cost.normalize().to_string(),
            item.lead_time_days.to_string(),
            item.moq.normalize().to_string(),
            item.status.label().to_string(),
        ];
        csv_writer
            .write_record(&record)
            .map_err(|e| EngineError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| EngineError::Export(e.to_string()))?;

    tracing::debug!("CSV 匯出: {} 列", recommendation.items.len());

    Ok(())
}

/// 匯出為字串
pub fn order_csv_string(recommendation: &OrderRecommendation) -> Result<String> {
    let mut buffer = Vec::new();
    write_order_csv(recommendation, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| EngineError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::{OrderStatus, RecommendationAggregator};
    use crate::requirement::OrderCalculation;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn test_csv_column_order() {
        let item = OrderCalculation {
            material_code: "M1".to_string(),
            material_name: "Milk".to_string(),
            category: "Dairy".to_string(),
            unit: "L".to_string(),
            gross_requirement: Decimal::new(1500, 2),
            safety_stock: Decimal::from(29),
            total_requirement: Decimal::from(44),
            current_stock: Decimal::from(4),
            in_transit: Decimal::from(2),
            available_stock: Decimal::from(6),
            net_requirement: Decimal::from(38),
            order_qty: Decimal::from(42),
            unit_price: Decimal::new(25, 1),
            estimated_cost: Decimal::new(10500, 2),
            lead_time_days: 2,
            effective_lead_time: 3,
            moq: Decimal::from(12),
            packaging_unit: Decimal::from(6),
            avg_daily_consumption: Decimal::from(5),
            daily_std_dev: Decimal::from(10),
            stock_days: Decimal::new(12, 1),
            status: OrderStatus::Shortage,
        };
        let recommendation =
            RecommendationAggregator::aggregate(vec![item], NaiveDate::from_ymd_opt(2025, 11, 3).unwrap());

        let csv = order_csv_string(&recommendation).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], ORDER_CSV_HEADER.join(","));
        assert_eq!(lines[1], "M1,Milk,Dairy,L,15,29,4,2,38,42,2.5,105,2,12,缺貨");
    }
}
