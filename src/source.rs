//! 資料來源
//!
//! 五種輸入彼此獨立，以 `tokio::try_join!` 並行載入；任一來源失敗即整批失敗，
//! 不會產生半套快照。

use async_trait::async_trait;
use costwatch_core::{
    BomRecipeRow, EngineError, MaterialMasterEntry, PurchaseRecord, Result, SalesRecord,
    StockPosition,
};
use std::time::Duration;

use crate::pipeline::InputSnapshot;

/// 資料來源介面（資料庫、API、檔案等由外部實作）
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_sales(&self) -> Result<Vec<SalesRecord>>;

    async fn fetch_purchases(&self) -> Result<Vec<PurchaseRecord>>;

    async fn fetch_bom(&self) -> Result<Vec<BomRecipeRow>>;

    async fn fetch_materials(&self) -> Result<Vec<MaterialMasterEntry>>;

    async fn fetch_stock_positions(&self) -> Result<Vec<StockPosition>>;
}

/// 並行載入所有輸入並凍結為快照
pub async fn load_snapshot(source: &dyn RecordSource) -> Result<InputSnapshot> {
    let (sales, purchases, bom_rows, materials, stock_positions) = tokio::try_join!(
        source.fetch_sales(),
        source.fetch_purchases(),
        source.fetch_bom(),
        source.fetch_materials(),
        source.fetch_stock_positions(),
    )?;

    tracing::info!(
        "資料載入完成：銷售 {}，採購 {}，BOM {}，主檔 {}，庫存 {}",
        sales.len(),
        purchases.len(),
        bom_rows.len(),
        materials.len(),
        stock_positions.len()
    );

    Ok(InputSnapshot {
        sales,
        purchases,
        bom_rows,
        materials,
        stock_positions,
    })
}

/// 帶逾時的載入
pub async fn load_snapshot_with_timeout(
    source: &dyn RecordSource,
    timeout: Duration,
) -> Result<InputSnapshot> {
    match tokio::time::timeout(timeout, load_snapshot(source)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("資料載入逾時: {:?}", timeout);
            Err(EngineError::Timeout(timeout))
        }
    }
}

/// 記憶體資料來源（測試、示範、以及已經取得資料的呼叫端使用）
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    snapshot: InputSnapshot,
}

impl InMemorySource {
    pub fn new(snapshot: InputSnapshot) -> Self {
        Self { snapshot }
    }
}

impl From<InputSnapshot> for InMemorySource {
    fn from(snapshot: InputSnapshot) -> Self {
        Self::new(snapshot)
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn fetch_sales(&self) -> Result<Vec<SalesRecord>> {
        Ok(self.snapshot.sales.clone())
    }

    async fn fetch_purchases(&self) -> Result<Vec<PurchaseRecord>> {
        Ok(self.snapshot.purchases.clone())
    }

    async fn fetch_bom(&self) -> Result<Vec<BomRecipeRow>> {
        Ok(self.snapshot.bom_rows.clone())
    }

    async fn fetch_materials(&self) -> Result<Vec<MaterialMasterEntry>> {
        Ok(self.snapshot.materials.clone())
    }

    async fn fetch_stock_positions(&self) -> Result<Vec<StockPosition>> {
        Ok(self.snapshot.stock_positions.clone())
    }
}
