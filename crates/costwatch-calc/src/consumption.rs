//! 理論耗用量計算
//!
//! 銷售數量 × BOM 單位耗用量 → 每個物料的理論耗用量與各產品貢獻明細。

use costwatch_core::SalesRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::recipe::RecipeIndex;

/// 產品銷售彙總
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product_name: String,
    pub quantity: Decimal,
}

/// 依產品彙總的銷售數量
#[derive(Debug, Clone, Default, Serialize)]
pub struct SalesTotals {
    products: BTreeMap<String, ProductSales>,
}

impl SalesTotals {
    /// 依產品代碼加總銷售數量（缺代碼者略過，名稱取第一個非空值）
    pub fn aggregate(records: &[SalesRecord]) -> Self {
        let mut products: BTreeMap<String, ProductSales> = BTreeMap::new();

        for record in records {
            let Some(code) = record.code() else {
                continue;
            };
            let totals = products.entry(code.to_string()).or_insert_with(|| ProductSales {
                product_name: String::new(),
                quantity: Decimal::ZERO,
            });
            totals.quantity += record.quantity;
            if totals.product_name.is_empty() {
                totals.product_name = record.product_name.trim().to_string();
            }
        }

        Self { products }
    }

    /// 單一產品的銷售彙總
    pub fn get(&self, product_code: &str) -> Option<&ProductSales> {
        self.products.get(product_code)
    }

    /// 依產品代碼遞增迭代
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductSales)> {
        self.products.iter().map(|(code, sales)| (code.as_str(), sales))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// 單一產品對物料耗用的貢獻
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionBreakdown {
    pub product_code: String,
    pub product_name: String,
    pub sales_qty: Decimal,
    pub unit_ratio: Decimal,
    pub contribution_qty: Decimal,
}

/// 物料理論耗用量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedConsumption {
    pub material_code: String,
    pub material_name: String,
    /// 等於 `breakdown` 各項 `contribution_qty` 之和
    pub expected_qty: Decimal,
    pub breakdown: Vec<ConsumptionBreakdown>,
}

impl ExpectedConsumption {
    fn new(material_code: &str, material_name: &str) -> Self {
        Self {
            material_code: material_code.to_string(),
            material_name: material_name.to_string(),
            expected_qty: Decimal::ZERO,
            breakdown: Vec::new(),
        }
    }

    fn add(&mut self, item: ConsumptionBreakdown) {
        self.expected_qty += item.contribution_qty;
        self.breakdown.push(item);
    }
}

/// 理論耗用量計算器
pub struct ExpectedConsumptionCalculator;

impl ExpectedConsumptionCalculator {
    /// 計算理論耗用量
    ///
    /// 只計入銷售數量 > 0 的產品；結果依 `expected_qty` 遞減排序，
    /// 同值再依物料代碼遞增。
    pub fn calculate(sales: &SalesTotals, recipes: &RecipeIndex) -> Vec<ExpectedConsumption> {
        let mut by_material: BTreeMap<&str, ExpectedConsumption> = BTreeMap::new();

        for (product_code, product_sales) in sales.iter() {
            if product_sales.quantity <= Decimal::ZERO {
                continue;
            }
            let Some(materials) = recipes.get(product_code) else {
                continue;
            };

            for (material_code, entry) in materials {
                let unit_ratio = entry.unit_ratio();
                let contribution_qty = product_sales.quantity * unit_ratio;

                let product_name = if product_sales.product_name.is_empty() {
                    entry.product_name.clone()
                } else {
                    product_sales.product_name.clone()
                };

                by_material
                    .entry(material_code.as_str())
                    .or_insert_with(|| ExpectedConsumption::new(material_code, &entry.material_name))
                    .add(ConsumptionBreakdown {
                        product_code: product_code.to_string(),
                        product_name,
                        sales_qty: product_sales.quantity,
                        unit_ratio,
                        contribution_qty,
                    });
            }
        }

        let mut results: Vec<ExpectedConsumption> = by_material.into_values().collect();
        results.sort_by(|a, b| {
            b.expected_qty
                .cmp(&a.expected_qty)
                .then_with(|| a.material_code.cmp(&b.material_code))
        });

        tracing::debug!("理論耗用量: {} 個物料", results.len());

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costwatch_core::BomRecipeRow;

    #[test]
    fn test_single_product_expected_consumption() {
        // P1 賣 100，P1→M1 每 100 批耗用 12 → M1 理論耗用 12
        let sales = SalesTotals::aggregate(&[SalesRecord::new("P1", "Latte", Decimal::from(100))]);
        let recipes = RecipeIndex::build(&[BomRecipeRow::new(
            "P1",
            "M1",
            Decimal::from(12),
            Decimal::from(100),
        )]);

        let result = ExpectedConsumptionCalculator::calculate(&sales, &recipes);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].material_code, "M1");
        assert_eq!(result[0].expected_qty, Decimal::from(12));
        assert_eq!(result[0].breakdown[0].unit_ratio, Decimal::new(12, 2));
        assert_eq!(result[0].breakdown[0].product_name, "Latte");
    }

    #[test]
    fn test_shared_material_accumulates_and_sorts() {
        let sales = SalesTotals::aggregate(&[
            SalesRecord::new("P1", "Latte", Decimal::from(60)),
            SalesRecord::new("P1", "Latte", Decimal::from(40)),
            SalesRecord::new("P2", "Mocha", Decimal::from(10)),
            SalesRecord::new("P3", "Tea", Decimal::ZERO),
        ]);
        let recipes = RecipeIndex::build(&[
            BomRecipeRow::new("P1", "M1", Decimal::from(12), Decimal::from(100)),
            BomRecipeRow::new("P2", "M1", Decimal::from(1), Decimal::from(1)),
            BomRecipeRow::new("P2", "M2", Decimal::from(50), Decimal::from(1)),
            BomRecipeRow::new("P3", "M3", Decimal::from(1), Decimal::from(1)),
        ]);

        let result = ExpectedConsumptionCalculator::calculate(&sales, &recipes);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].material_code, "M2");
        assert_eq!(result[0].expected_qty, Decimal::from(500));
        assert_eq!(result[1].material_code, "M1");
        assert_eq!(result[1].expected_qty, Decimal::from(22));

        for item in &result {
            let sum: Decimal = item.breakdown.iter().map(|b| b.contribution_qty).sum();
            assert_eq!(sum, item.expected_qty);
        }
    }

    #[test]
    fn test_no_sales_no_consumption() {
        let recipes = RecipeIndex::build(&[BomRecipeRow::new(
            "P1",
            "M1",
            Decimal::ONE,
            Decimal::ONE,
        )]);
        let result = ExpectedConsumptionCalculator::calculate(&SalesTotals::default(), &recipes);
        assert!(result.is_empty());
    }
}
