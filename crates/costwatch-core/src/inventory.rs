//! 庫存與採購政策模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 物料庫存狀態與供應商政策（訂購計算輸入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPosition {
    /// 物料代碼
    pub material_code: String,

    /// 物料名稱
    pub material_name: String,

    /// 分類
    pub category: String,

    /// 單位
    pub unit: String,

    /// 現有庫存
    pub current_stock: Decimal,

    /// 在途數量
    pub in_transit: Decimal,

    /// 單價
    pub unit_price: Decimal,

    /// 物料專屬提前期（天），未設定時使用全域預設
    pub lead_time_days: Option<u32>,

    /// 最小訂購量
    pub moq: Decimal,

    /// 包裝單位（訂購量必須是此倍數）
    pub packaging_unit: Decimal,
}

impl StockPosition {
    /// 創建新的庫存狀態
    pub fn new(material_code: impl Into<String>, current_stock: Decimal) -> Self {
        Self {
            material_code: material_code.into(),
            material_name: String::new(),
            category: String::new(),
            unit: String::new(),
            current_stock,
            in_transit: Decimal::ZERO,
            unit_price: Decimal::ZERO,
            lead_time_days: None,
            moq: Decimal::ZERO,
            packaging_unit: Decimal::ONE,
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.material_name = name.into();
        self
    }

    /// 建構器模式：設置分類與單位
    pub fn with_category(mut self, category: impl Into<String>, unit: impl Into<String>) -> Self {
        self.category = category.into();
        self.unit = unit.into();
        self
    }

    /// 建構器模式：設置在途數量
    pub fn with_in_transit(mut self, qty: Decimal) -> Self {
        self.in_transit = qty;
        self
    }

    /// 建構器模式：設置單價
    pub fn with_unit_price(mut self, price: Decimal) -> Self {
        self.unit_price = price;
        self
    }

    /// 建構器模式：設置物料專屬提前期
    pub fn with_lead_time(mut self, days: u32) -> Self {
        self.lead_time_days = Some(days);
        self
    }

    /// 建構器模式：設置最小訂購量與包裝單位
    pub fn with_order_policy(mut self, moq: Decimal, packaging_unit: Decimal) -> Self {
        self.moq = moq;
        self.packaging_unit = packaging_unit;
        self
    }

    /// 可用庫存（現有 + 在途）
    pub fn available_stock(&self) -> Decimal {
        self.current_stock + self.in_transit
    }

    /// 有效包裝單位（非正值視為 1）
    pub fn effective_packaging_unit(&self) -> Decimal {
        if self.packaging_unit > Decimal::ZERO {
            self.packaging_unit
        } else {
            Decimal::ONE
        }
    }
}
