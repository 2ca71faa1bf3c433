//! BOM 配方列模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// BOM 配方列：一條「產品 → 物料」耗用規則
///
/// 同一 (產品, 物料) 可能出現多列，彙總時以加總方式合併。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomRecipeRow {
    /// 產品代碼
    pub product_code: String,

    /// 產品名稱
    pub product_name: String,

    /// 物料代碼
    pub material_code: String,

    /// 物料名稱
    pub material_name: String,

    /// 每批耗用量
    pub consumption_qty: Option<Decimal>,

    /// 生產批量
    pub production_batch_qty: Option<Decimal>,
}

impl BomRecipeRow {
    /// 創建新的配方列
    pub fn new(
        product_code: impl Into<String>,
        material_code: impl Into<String>,
        consumption_qty: Decimal,
        production_batch_qty: Decimal,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            product_name: String::new(),
            material_code: material_code.into(),
            material_name: String::new(),
            consumption_qty: Some(consumption_qty),
            production_batch_qty: Some(production_batch_qty),
        }
    }

    /// 建構器模式：設置產品名稱
    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    /// 建構器模式：設置物料名稱
    pub fn with_material_name(mut self, name: impl Into<String>) -> Self {
        self.material_name = name.into();
        self
    }

    /// 去除空白後的產品代碼
    pub fn product(&self) -> Option<&str> {
        let code = self.product_code.trim();
        (!code.is_empty()).then_some(code)
    }

    /// 去除空白後的物料代碼
    pub fn material(&self) -> Option<&str> {
        let code = self.material_code.trim();
        (!code.is_empty()).then_some(code)
    }

    /// 每單位產品耗用量（耗用量 / 批量）
    ///
    /// 缺少代碼、耗用量、批量或批量為零時回傳 None。
    pub fn unit_ratio(&self) -> Option<Decimal> {
        self.product()?;
        self.material()?;
        let consumption = self.consumption_qty?;
        let batch = self.production_batch_qty?;
        if batch.is_zero() {
            return None;
        }
        consumption.checked_div(batch)
    }

    /// 是否為可用於展開的有效列
    pub fn is_usable(&self) -> bool {
        self.unit_ratio().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_ratio() {
        let row = BomRecipeRow::new("P1", "M1", Decimal::from(12), Decimal::from(100))
            .with_product_name("Latte")
            .with_material_name("Milk");

        assert_eq!(row.unit_ratio(), Some(Decimal::new(12, 2)));
        assert!(row.is_usable());
    }

    #[test]
    fn test_unusable_rows() {
        let zero_batch = BomRecipeRow::new("P1", "M1", Decimal::from(12), Decimal::ZERO);
        assert_eq!(zero_batch.unit_ratio(), None);

        let no_material = BomRecipeRow::new("P1", " ", Decimal::from(12), Decimal::from(10));
        assert_eq!(no_material.unit_ratio(), None);

        let mut missing_qty = BomRecipeRow::new("P1", "M1", Decimal::ONE, Decimal::ONE);
        missing_qty.consumption_qty = None;
        assert!(!missing_qty.is_usable());
    }
}
