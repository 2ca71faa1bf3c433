//! 採購紀錄模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 採購紀錄（已實現採購）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// 物料代碼
    pub material_code: String,

    /// 採購數量
    pub quantity: Decimal,

    /// 採購總金額
    pub total_cost: Decimal,
}

impl PurchaseRecord {
    /// 創建新的採購紀錄
    pub fn new(material_code: impl Into<String>, quantity: Decimal, total_cost: Decimal) -> Self {
        Self {
            material_code: material_code.into(),
            quantity,
            total_cost,
        }
    }

    /// 去除空白後的物料代碼，空代碼回傳 None
    pub fn code(&self) -> Option<&str> {
        let code = self.material_code.trim();
        (!code.is_empty()).then_some(code)
    }

    /// 單價（數量為零時為 0）
    pub fn unit_price(&self) -> Decimal {
        crate::numeric::safe_div(self.total_cost, self.quantity)
    }
}
