//! # Costwatch Calculation Engine
//!
//! BOM 耗用差異與統計訂購計算引擎（純函數、單執行緒、無 I/O）

pub mod anomaly;
pub mod consumption;
pub mod coverage;
pub mod demand;
pub mod export;
pub mod health;
pub mod master;
pub mod recipe;
pub mod recommendation;
pub mod requirement;
pub mod validation;
pub mod variance;

// Re-export 主要類型
pub use anomaly::{AnomalyDetector, AnomalyItem, AnomalyKind, Severity};
pub use consumption::{
    ConsumptionBreakdown, ExpectedConsumption, ExpectedConsumptionCalculator, SalesTotals,
};
pub use coverage::{BomCoverageResult, CoverageAuditor, ProductRef};
pub use demand::{DayOfWeek, DayOfWeekStat, DemandModel};
pub use export::{order_csv_string, write_order_csv, ORDER_CSV_HEADER};
pub use health::{BomHealthScore, HealthGrade, HealthScorer};
pub use master::MasterData;
pub use recipe::{BatchSizeConflict, RecipeEntry, RecipeIndex};
pub use recommendation::{
    CategorySummary, OrderRecommendation, OrderStatus, OrderSummary, RecommendationAggregator,
};
pub use requirement::{OrderCalculation, RequirementCalculator};
pub use validation::{BomErrorType, BomValidationResult, BomValidator, RowValidation, SopCode};
pub use variance::{
    ConsumptionVarianceResult, Favorability, PriceSource, PurchaseTotals, VarianceAnalyzer,
    VarianceItem,
};
