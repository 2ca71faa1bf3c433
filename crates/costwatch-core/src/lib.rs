//! # Costwatch Core
//!
//! 核心資料模型與類型定義

pub mod bom;
pub mod config;
pub mod inventory;
pub mod material;
pub mod numeric;
pub mod purchase;
pub mod sales;

// Re-export 主要類型
pub use bom::BomRecipeRow;
pub use config::{AnalysisConfig, ServiceLevel};
pub use inventory::StockPosition;
pub use material::MaterialMasterEntry;
pub use purchase::PurchaseRecord;
pub use sales::SalesRecord;

use std::time::Duration;

/// 分析引擎錯誤類型
///
/// 資料品質問題（缺代碼、批量為零等）不會產生錯誤，只會被略過或分類統計；
/// 只有配置、資料來源、匯出相關問題才會回傳錯誤。
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("不支援的服務水準: {0}%（僅支援 90/95/97/99）")]
    InvalidServiceLevel(u8),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("資料來源 {source_name} 載入失敗: {message}")]
    Source {
        source_name: &'static str,
        message: String,
    },

    #[error("資料載入逾時（{0:?}）")]
    Timeout(Duration),

    #[error("匯出錯誤: {0}")]
    Export(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
