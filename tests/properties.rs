//! 性質測試（proptest）

use chrono::{Duration, NaiveDate};
use costwatch::costwatch_calc::requirement::{order_quantity, safety_stock};
use costwatch::costwatch_calc::{
    AnomalyDetector, BomValidator, CoverageAuditor, ExpectedConsumptionCalculator, HealthScorer,
    MasterData, PurchaseTotals, RecipeIndex, SalesTotals, VarianceAnalyzer,
};
use costwatch::costwatch_core::{
    BomRecipeRow, MaterialMasterEntry, PurchaseRecord, SalesRecord, StockPosition,
};
use costwatch::{AnalysisConfig, Analyzer, InputSnapshot, ServiceLevel};
use proptest::prelude::*;
use rust_decimal::Decimal;

const PRODUCTS: [&str; 4] = ["A1", "A2", "B10", "C3"];
const MATERIALS: [&str; 4] = ["M1", "M2", "M3", "M4"];
/// 只用可整除的批量，讓單位耗用為有限小數
const BATCH_SIZES: [i64; 7] = [1, 2, 4, 5, 8, 10, 20];

fn qty(max: i64) -> impl Strategy<Value = Decimal> {
    (0..=max).prop_map(Decimal::from)
}

fn price() -> impl Strategy<Value = Decimal> {
    (1i64..=5000).prop_map(|cents| Decimal::new(cents, 2))
}

fn sales_strategy() -> impl Strategy<Value = Vec<SalesRecord>> {
    prop::collection::vec((0..PRODUCTS.len(), qty(200), 1i64..=28), 0..30).prop_map(|rows| {
        rows.into_iter()
            .map(|(p, q, days_back)| {
                SalesRecord::new(PRODUCTS[p], "", q).with_sold_on(as_of() - Duration::days(days_back))
            })
            .collect()
    })
}

fn bom_strategy() -> impl Strategy<Value = Vec<BomRecipeRow>> {
    prop::collection::vec(
        (0..PRODUCTS.len(), 0..MATERIALS.len(), qty(50), 0..BATCH_SIZES.len()),
        0..12,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(p, m, c, b)| BomRecipeRow::new(PRODUCTS[p], MATERIALS[m], c, Decimal::from(BATCH_SIZES[b])))
            .collect()
    })
}

fn purchase_strategy() -> impl Strategy<Value = Vec<PurchaseRecord>> {
    prop::collection::vec((0..MATERIALS.len(), 1i64..=500, price()), 0..10).prop_map(|rows| {
        rows.into_iter()
            .map(|(m, q, p)| PurchaseRecord::new(MATERIALS[m], Decimal::from(q), Decimal::from(q) * p))
            .collect()
    })
}

fn master_strategy() -> impl Strategy<Value = Vec<MaterialMasterEntry>> {
    prop::collection::vec((0..MATERIALS.len(), prop::option::of(price())), 0..6).prop_map(|rows| {
        rows.into_iter()
            .map(|(m, p)| {
                let entry = MaterialMasterEntry::new(MATERIALS[m], "");
                match p {
                    Some(p) => entry.with_unit_price(p),
                    None => entry,
                }
            })
            .collect()
    })
}

fn snapshot_strategy() -> impl Strategy<Value = InputSnapshot> {
    (
        sales_strategy(),
        purchase_strategy(),
        bom_strategy(),
        master_strategy(),
        prop::collection::vec((0..MATERIALS.len(), qty(300)), 0..4),
    )
        .prop_map(|(sales, purchases, bom_rows, materials, stock)| InputSnapshot {
            sales,
            purchases,
            bom_rows,
            materials,
            stock_positions: stock
                .into_iter()
                .map(|(m, q)| StockPosition::new(MATERIALS[m], q))
                .collect(),
        })
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// 理論耗用 = 各產品貢獻之和 = Σ 銷量 × 單位耗用
    #[test]
    fn expected_consumption_is_conserved(sales in sales_strategy(), bom in bom_strategy()) {
        let totals = SalesTotals::aggregate(&sales);
        let recipes = RecipeIndex::build(&bom);
        let expected = ExpectedConsumptionCalculator::calculate(&totals, &recipes);

        let mut grand_total = Decimal::ZERO;
        for item in &expected {
            let sum: Decimal = item.breakdown.iter().map(|b| b.contribution_qty).sum();
            prop_assert_eq!(item.expected_qty, sum);
            grand_total += item.expected_qty;
        }

        let mut direct = Decimal::ZERO;
        for (product, product_sales) in totals.iter() {
            if let Some(materials) = recipes.get(product) {
                for entry in materials.values() {
                    direct += product_sales.quantity * entry.unit_ratio();
                }
            }
        }
        prop_assert_eq!(grand_total, direct);
    }

    /// 總差異 = 數量差異 + 價格差異（逐項與總計皆成立）
    #[test]
    fn variance_decomposes(
        sales in sales_strategy(),
        bom in bom_strategy(),
        purchases in purchase_strategy(),
        materials in master_strategy(),
    ) {
        let expected = ExpectedConsumptionCalculator::calculate(
            &SalesTotals::aggregate(&sales),
            &RecipeIndex::build(&bom),
        );
        let result = VarianceAnalyzer::analyze(
            &expected,
            &PurchaseTotals::aggregate(&purchases),
            &MasterData::build(&materials),
        );

        for item in &result.items {
            prop_assert_eq!(item.total_variance, item.qty_variance + item.price_variance);
        }
        prop_assert_eq!(
            result.total_variance,
            result.total_qty_variance + result.total_price_variance
        );
        prop_assert_eq!(
            result.items.len() + result.unpurchased_materials.len(),
            expected.len()
        );
    }

    /// 所有分數都在 [0, 100]
    #[test]
    fn scores_are_bounded(snapshot in snapshot_strategy()) {
        let recipes = RecipeIndex::build(&snapshot.bom_rows);
        let expected = ExpectedConsumptionCalculator::calculate(
            &SalesTotals::aggregate(&snapshot.sales),
            &recipes,
        );
        let variance = VarianceAnalyzer::analyze(
            &expected,
            &PurchaseTotals::aggregate(&snapshot.purchases),
            &MasterData::build(&snapshot.materials),
        );
        let anomalies = AnomalyDetector::detect(&variance.items);
        let coverage = CoverageAuditor::audit(&snapshot.sales, &snapshot.bom_rows, &snapshot.purchases);
        let validation = BomValidator::validate(&snapshot.bom_rows);
        let health = HealthScorer::score(&validation, &coverage, &variance, &anomalies);

        let bounded = |x: Decimal| x >= Decimal::ZERO && x <= Decimal::ONE_HUNDRED;
        prop_assert!(bounded(coverage.completeness_score));
        prop_assert!(bounded(validation.compliance_pct));
        prop_assert!(bounded(health.data_quality));
        prop_assert!(bounded(health.coverage_score));
        prop_assert!(bounded(health.variance_score));
        prop_assert!(bounded(health.anomaly_score));
        prop_assert!(bounded(health.overall));
    }

    /// 安全庫存隨標準差與提前期遞增
    #[test]
    fn safety_stock_is_monotonic(
        sigma in 5i64..=500,
        extra_sigma in 0i64..=100,
        lead in 1u32..=30,
        extra_lead in 0u32..=10,
        level_idx in 0usize..4,
    ) {
        let level = ServiceLevel::ALL[level_idx];
        let base = safety_stock(level, Decimal::from(sigma), lead);

        prop_assert!(safety_stock(level, Decimal::from(sigma + extra_sigma), lead) >= base);
        prop_assert!(safety_stock(level, Decimal::from(sigma), lead + extra_lead) >= base);
        prop_assert!(base > Decimal::ZERO);
    }

    /// 服務水準越高安全庫存越高；σ√L ≥ 5 時嚴格遞增
    #[test]
    fn safety_stock_increases_with_service_level(
        sigma in 1i64..=500,
        lead in 1u32..=30,
    ) {
        let sigma = Decimal::from(sigma);
        let stocks: Vec<Decimal> = ServiceLevel::ALL
            .iter()
            .map(|&level| safety_stock(level, sigma, lead))
            .collect();
        let strict = sigma * sigma * Decimal::from(lead) >= Decimal::from(25);

        for i in 0..stocks.len() {
            for j in (i + 1)..stocks.len() {
                if strict {
                    prop_assert!(stocks[j] > stocks[i], "{:?} at σ={} L={}", stocks, sigma, lead);
                } else {
                    prop_assert!(stocks[j] >= stocks[i], "{:?} at σ={} L={}", stocks, sigma, lead);
                }
            }
        }
    }

    /// 訂購量為包裝單位倍數，且不低於淨需求與最小訂購量
    #[test]
    fn order_quantity_respects_packaging(
        net in 0i64..=10_000,
        pack in 1i64..=48,
        moq in 0i64..=200,
    ) {
        let net = Decimal::from(net);
        let pack = Decimal::from(pack);
        let moq = Decimal::from(moq);
        let order = order_quantity(net, pack, moq);

        if net.is_zero() {
            prop_assert_eq!(order, Decimal::ZERO);
        } else {
            prop_assert!(order >= net);
            prop_assert!(order >= moq);
            prop_assert!((order % pack).is_zero());
            prop_assert!(order - net < pack || order - pack < moq);
        }
    }

    /// 同一快照重複分析結果完全相同
    #[test]
    fn analysis_is_idempotent(snapshot in snapshot_strategy()) {
        let analyzer = Analyzer::new(AnalysisConfig::default());
        let first = analyzer.analyze(&snapshot, as_of());
        let second = analyzer.analyze(&snapshot, as_of());

        prop_assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
        prop_assert_eq!(first, second);
    }
}
