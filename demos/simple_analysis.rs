//! 簡單耗用差異與訂購建議示例

use chrono::{Duration, NaiveDate};
use costwatch::costwatch_calc::order_csv_string;
use costwatch::costwatch_core::{
    BomRecipeRow, MaterialMasterEntry, PurchaseRecord, SalesRecord, StockPosition,
};
use costwatch::{load_snapshot_with_timeout, AnalysisConfig, Analyzer, InMemorySource, InputSnapshot, ServiceLevel};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    costwatch::logging::init();

    println!("=== 耗用差異與訂購建議示例 ===\n");

    let as_of = NaiveDate::from_ymd_opt(2025, 11, 3).ok_or("無效日期")?;

    // 過去四週每天賣 40 杯拿鐵、週末多賣 20 杯
    let sales = (1..=28)
        .map(|days_back| {
            let date = as_of - Duration::days(days_back);
            let qty = if days_back % 7 == 1 || days_back % 7 == 2 { 60 } else { 40 };
            SalesRecord::new("DRK001", "拿鐵", Decimal::from(qty)).with_sold_on(date)
        })
        .collect();

    let snapshot = InputSnapshot {
        sales,
        purchases: vec![
            PurchaseRecord::new("MAT001", Decimal::from(260), Decimal::from(2860)),
            PurchaseRecord::new("MAT002", Decimal::from(25), Decimal::from(12500)),
        ],
        bom_rows: vec![
            BomRecipeRow::new("DRK001", "MAT001", Decimal::new(2, 1), Decimal::ONE)
                .with_product_name("拿鐵")
                .with_material_name("鮮奶"),
            BomRecipeRow::new("DRK001", "MAT002", Decimal::new(18, 3), Decimal::ONE)
                .with_product_name("拿鐵")
                .with_material_name("咖啡豆"),
        ],
        materials: vec![
            MaterialMasterEntry::new("MAT001", "鮮奶").with_unit_price(Decimal::from(10)),
            MaterialMasterEntry::new("MAT002", "咖啡豆").with_unit_price(Decimal::from(480)),
        ],
        stock_positions: vec![
            StockPosition::new("MAT001", Decimal::from(20))
                .with_category("乳製品", "L")
                .with_in_transit(Decimal::from(10))
                .with_order_policy(Decimal::from(24), Decimal::from(12)),
            StockPosition::new("MAT002", Decimal::from(8))
                .with_category("咖啡豆", "kg")
                .with_lead_time(5)
                .with_order_policy(Decimal::ONE, Decimal::ONE),
        ],
    };

    let source = InMemorySource::new(snapshot);
    let snapshot = load_snapshot_with_timeout(&source, std::time::Duration::from_secs(5)).await?;

    let config = AnalysisConfig::default()
        .with_service_level(ServiceLevel::P97)
        .validate()?;
    let report = Analyzer::new(config).analyze(&snapshot, as_of);

    println!("耗用差異:");
    for item in &report.variance.items {
        println!(
            "  - {} {}: 理論 {}, 實際 {}, 數量差異 {}, 價格差異 {}, 總差異 {}",
            item.material_code,
            item.material_name,
            item.expected_qty,
            item.actual_qty,
            item.qty_variance,
            item.price_variance,
            item.total_variance
        );
    }

    println!(
        "\nBOM 健康度: {} ({:?})，覆蓋率 {}%",
        report.health.overall, report.health.grade, report.coverage.completeness_score
    );

    println!("\n訂購建議:");
    for item in report.orders.orders() {
        println!(
            "  - {} {}: 訂購 {} {}, 預估 {}, 狀態 {}",
            item.material_code,
            item.material_name,
            item.order_qty,
            item.unit,
            item.estimated_cost,
            item.status.label()
        );
    }

    println!("\nCSV:\n{}", order_csv_string(&report.orders)?);

    Ok(())
}
