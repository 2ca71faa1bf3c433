//! 物料主檔模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 物料主檔（標準單價來源）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialMasterEntry {
    /// 物料代碼
    pub material_code: String,

    /// 物料名稱
    pub material_name: String,

    /// 標準單價（主檔可能未登錄）
    pub unit_price: Option<Decimal>,
}

impl MaterialMasterEntry {
    /// 創建新的主檔紀錄
    pub fn new(material_code: impl Into<String>, material_name: impl Into<String>) -> Self {
        Self {
            material_code: material_code.into(),
            material_name: material_name.into(),
            unit_price: None,
        }
    }

    /// 建構器模式：設置標準單價
    pub fn with_unit_price(mut self, price: Decimal) -> Self {
        self.unit_price = Some(price);
        self
    }

    /// 去除空白後的物料代碼
    pub fn code(&self) -> Option<&str> {
        let code = self.material_code.trim();
        (!code.is_empty()).then_some(code)
    }
}
