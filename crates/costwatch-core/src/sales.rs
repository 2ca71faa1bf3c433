//! 銷售紀錄模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 銷售紀錄（已實現銷售）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// 產品代碼
    pub product_code: String,

    /// 產品名稱
    pub product_name: String,

    /// 銷售數量
    pub quantity: Decimal,

    /// 銷售日期（用於需求統計視窗）
    pub sold_on: Option<NaiveDate>,
}

impl SalesRecord {
    /// 創建新的銷售紀錄
    pub fn new(product_code: impl Into<String>, product_name: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            product_code: product_code.into(),
            product_name: product_name.into(),
            quantity,
            sold_on: None,
        }
    }

    /// 建構器模式：設置銷售日期
    pub fn with_sold_on(mut self, date: NaiveDate) -> Self {
        self.sold_on = Some(date);
        self
    }

    /// 去除空白後的產品代碼，空代碼回傳 None
    pub fn code(&self) -> Option<&str> {
        let code = self.product_code.trim();
        (!code.is_empty()).then_some(code)
    }

    /// 是否為有效銷售（有代碼且數量為正）
    pub fn is_realized(&self) -> bool {
        self.code().is_some() && self.quantity > Decimal::ZERO
    }
}
