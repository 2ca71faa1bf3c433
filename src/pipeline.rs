//! 分析管線
//!
//! 對一份凍結的輸入快照依序執行所有計算步驟。同樣的輸入一定產生同樣的輸出
//! （所有映射皆為 BTreeMap、所有清單皆已排序），可直接作為快取鍵值。

use chrono::NaiveDate;
use costwatch_calc::{
    AnomalyDetector, AnomalyItem, BatchSizeConflict, BomCoverageResult, BomHealthScore,
    BomValidationResult, BomValidator, ConsumptionVarianceResult, CoverageAuditor,
    DayOfWeekStat, DemandModel, ExpectedConsumption, ExpectedConsumptionCalculator,
    HealthScorer, MasterData, OrderRecommendation, PurchaseTotals, RecipeIndex,
    RecommendationAggregator, RequirementCalculator, SalesTotals, VarianceAnalyzer,
};
use costwatch_core::{
    AnalysisConfig, BomRecipeRow, MaterialMasterEntry, PurchaseRecord, Result, SalesRecord,
    StockPosition,
};
use serde::{Deserialize, Serialize};

/// 分析輸入快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub sales: Vec<SalesRecord>,
    pub purchases: Vec<PurchaseRecord>,
    pub bom_rows: Vec<BomRecipeRow>,
    pub materials: Vec<MaterialMasterEntry>,
    pub stock_positions: Vec<StockPosition>,
}

/// 分析結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub as_of: NaiveDate,
    pub config: AnalysisConfig,
    pub expected_consumption: Vec<ExpectedConsumption>,
    pub variance: ConsumptionVarianceResult,
    pub coverage: BomCoverageResult,
    pub validation: BomValidationResult,
    pub anomalies: Vec<AnomalyItem>,
    pub health: BomHealthScore,
    pub demand_stats: Vec<DayOfWeekStat>,
    pub recipe_conflicts: Vec<BatchSizeConflict>,
    pub orders: OrderRecommendation,
}

impl AnalysisReport {
    /// 序列化為 JSON（供 UI 層使用）
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 以指定配置分析一份快照
pub fn analyze(snapshot: &InputSnapshot, config: &AnalysisConfig, as_of: NaiveDate) -> AnalysisReport {
    Analyzer::new(config.clone()).analyze(snapshot, as_of)
}

/// 分析器
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// 創建分析器（配置應已通過驗證）
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// 主分析入口
    pub fn analyze(&self, snapshot: &InputSnapshot, as_of: NaiveDate) -> AnalysisReport {
        tracing::info!(
            "開始分析：銷售 {} 筆，採購 {} 筆，BOM {} 筆，主檔 {} 筆，庫存 {} 筆",
            snapshot.sales.len(),
            snapshot.purchases.len(),
            snapshot.bom_rows.len(),
            snapshot.materials.len(),
            snapshot.stock_positions.len()
        );

        let start_time = std::time::Instant::now();

        // Step 1: 主檔與配方索引
        tracing::debug!("Step 1: 主檔與配方索引");
        let master = MasterData::build(&snapshot.materials);
        let recipes = RecipeIndex::build(&snapshot.bom_rows);

        // Step 2: 理論耗用
        tracing::debug!("Step 2: 理論耗用");
        let sales_totals = SalesTotals::aggregate(&snapshot.sales);
        let expected_consumption = ExpectedConsumptionCalculator::calculate(&sales_totals, &recipes);

        // Step 3: 耗用差異與異常
        tracing::debug!("Step 3: 耗用差異");
        let purchase_totals = PurchaseTotals::aggregate(&snapshot.purchases);
        let variance = VarianceAnalyzer::analyze(&expected_consumption, &purchase_totals, &master);
        let anomalies = AnomalyDetector::detect(&variance.items);

        // Step 4: 覆蓋率、驗證、健康度
        tracing::debug!("Step 4: 覆蓋率與健康度");
        let coverage = CoverageAuditor::audit(&snapshot.sales, &snapshot.bom_rows, &snapshot.purchases);
        let validation = BomValidator::validate(&snapshot.bom_rows);
        let health = HealthScorer::score(&validation, &coverage, &variance, &anomalies);

        // Step 5: 需求統計與訂購建議
        tracing::debug!("Step 5: 需求統計與訂購建議");
        let model = DemandModel::build(&snapshot.sales, as_of, self.config.window_weeks());
        let calculator = RequirementCalculator::new(&self.config, &model, &recipes, &master, as_of);
        let orders = RecommendationAggregator::aggregate(
            calculator.calculate_all(&snapshot.stock_positions),
            as_of,
        );

        tracing::info!(
            "分析完成，耗時 {:?}；健康度 {}，總差異 {}",
            start_time.elapsed(),
            health.overall,
            variance.total_variance
        );

        AnalysisReport {
            as_of,
            config: self.config.clone(),
            expected_consumption,
            variance,
            coverage,
            validation,
            anomalies,
            health,
            demand_stats: model.stats().cloned().collect(),
            recipe_conflicts: recipes.conflicts().to_vec(),
            orders,
        }
    }
}
