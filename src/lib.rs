//! # Costwatch
//!
//! 製造成本儀表板的分析核心：BOM 耗用差異、覆蓋率與健康度、統計訂購建議。
//!
//! 資料來源並行載入後凍結為 [`InputSnapshot`]，再交給純函數的 [`Analyzer`]。

pub mod logging;
pub mod pipeline;
pub mod source;

pub use costwatch_calc;
pub use costwatch_core;

pub use costwatch_core::{AnalysisConfig, EngineError, Result, ServiceLevel};
pub use pipeline::{analyze, AnalysisReport, Analyzer, InputSnapshot};
pub use source::{load_snapshot, load_snapshot_with_timeout, InMemorySource, RecordSource};
