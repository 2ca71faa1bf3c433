//! BOM 覆蓋率稽核
//!
//! 交叉比對「有銷售的產品」、「有 BOM 的產品」與「有採購的物料」。

use costwatch_core::numeric::{percent, round_half_up};
use costwatch_core::{BomRecipeRow, PurchaseRecord, SalesRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 產品代碼與名稱
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRef {
    pub product_code: String,
    pub product_name: String,
}

/// BOM 覆蓋率快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomCoverageResult {
    pub total_sold_products: usize,
    /// 有銷售且有 BOM
    pub covered_products: Vec<ProductRef>,
    /// 有銷售但沒有 BOM
    pub uncovered_products: Vec<ProductRef>,
    /// 有採購但不在任何 BOM 中的物料（成本無法歸屬）
    pub orphan_materials: Vec<String>,
    /// 有 BOM 但期間內沒有銷售的產品
    pub unsold_bom_products: Vec<String>,
    /// 0–100；沒有銷售產品時為 0
    pub completeness_score: Decimal,
}

/// BOM 覆蓋率稽核器
pub struct CoverageAuditor;

impl CoverageAuditor {
    /// 執行覆蓋率稽核（所有清單依代碼遞增）
    pub fn audit(
        sales: &[SalesRecord],
        bom_rows: &[BomRecipeRow],
        purchases: &[PurchaseRecord],
    ) -> BomCoverageResult {
        let mut sold: BTreeMap<&str, &str> = BTreeMap::new();
        for record in sales.iter().filter(|r| r.is_realized()) {
            if let Some(code) = record.code() {
                let name = sold.entry(code).or_insert("");
                if name.is_empty() {
                    *name = record.product_name.trim();
                }
            }
        }

        let mut bom_products: BTreeSet<&str> = BTreeSet::new();
        let mut bom_materials: BTreeSet<&str> = BTreeSet::new();
        for row in bom_rows {
            if let (Some(product), Some(material)) = (row.product(), row.material()) {
                bom_products.insert(product);
                bom_materials.insert(material);
            }
        }

        let purchased: BTreeSet<&str> = purchases.iter().filter_map(|p| p.code()).collect();

        let (covered, uncovered): (Vec<ProductRef>, Vec<ProductRef>) = sold
            .iter()
            .map(|(&code, &name)| ProductRef {
                product_code: code.to_string(),
                product_name: name.to_string(),
            })
            .partition(|product| bom_products.contains(product.product_code.as_str()));

        let orphan_materials: Vec<String> = purchased
            .difference(&bom_materials)
            .map(|code| code.to_string())
            .collect();

        let unsold_bom_products: Vec<String> = bom_products
            .iter()
            .filter(|code| !sold.contains_key(*code))
            .map(|code| code.to_string())
            .collect();

        let total_sold_products = sold.len();
        let completeness_score = if total_sold_products == 0 {
            Decimal::ZERO
        } else {
            round_half_up(percent(
                Decimal::from(covered.len()),
                Decimal::from(total_sold_products),
            ))
        };

        tracing::debug!(
            "BOM 覆蓋率: {}/{} 產品, 孤立物料 {} 個, 完整度 {}",
            covered.len(),
            total_sold_products,
            orphan_materials.len(),
            completeness_score
        );

        BomCoverageResult {
            total_sold_products,
            covered_products: covered,
            uncovered_products: uncovered,
            orphan_materials,
            unsold_bom_products,
            completeness_score,
        }
    }
}
