//! BOM 配方索引
//!
//! 產品 → 物料 → {耗用量, 生產批量} 的兩層映射。

use costwatch_core::numeric::safe_div;
use costwatch_core::BomRecipeRow;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 單一 (產品, 物料) 的合併配方
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeEntry {
    /// 合併後耗用量（以 `production_batch_qty` 為基準）
    pub consumption_qty: Decimal,
    /// 生產批量
    pub production_batch_qty: Decimal,
    pub material_name: String,
    pub product_name: String,
}

impl RecipeEntry {
    /// 每單位產品耗用量
    pub fn unit_ratio(&self) -> Decimal {
        safe_div(self.consumption_qty, self.production_batch_qty)
    }
}

/// 同一 (產品, 物料) 多列之間生產批量不一致
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSizeConflict {
    pub product_code: String,
    pub material_code: String,
    /// 出現過的批量（去重、遞增）
    pub batch_sizes: Vec<Decimal>,
    /// 採用的批量
    pub chosen: Decimal,
}

/// 合併前暫存
#[derive(Default)]
struct PairRows {
    rows: Vec<(Decimal, Decimal)>,
    product_name: String,
    material_name: String,
}

/// BOM 配方索引
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecipeIndex {
    recipes: BTreeMap<String, BTreeMap<String, RecipeEntry>>,
    conflicts: Vec<BatchSizeConflict>,
    skipped_rows: usize,
}

impl RecipeIndex {
    /// 由 BOM 配方列建立索引
    ///
    /// 缺產品代碼、物料代碼、耗用量或批量（或批量為零）的列會被略過。
    /// 同一 (產品, 物料) 的多列以加總合併；批量不一致時採用出現次數最多的批量
    /// （同票取較小者），其餘列的耗用量依單位比例換算到該批量後再加總。
    pub fn build(rows: &[BomRecipeRow]) -> Self {
        let mut pairs: BTreeMap<(String, String), PairRows> = BTreeMap::new();
        let mut skipped_rows = 0;

        for row in rows {
            let (Some(product), Some(material)) = (row.product(), row.material()) else {
                skipped_rows += 1;
                continue;
            };
            let (Some(consumption), Some(batch)) = (row.consumption_qty, row.production_batch_qty) else {
                skipped_rows += 1;
                continue;
            };
            if batch.is_zero() {
                skipped_rows += 1;
                continue;
            }

            let pair = pairs
                .entry((product.to_string(), material.to_string()))
                .or_default();
            pair.rows.push((consumption, batch));
            if pair.product_name.is_empty() {
                pair.product_name = row.product_name.trim().to_string();
            }
            if pair.material_name.is_empty() {
                pair.material_name = row.material_name.trim().to_string();
            }
        }

        if skipped_rows > 0 {
            tracing::warn!("BOM 配方索引: 略過 {} 筆不完整的配方列", skipped_rows);
        }

        let mut recipes: BTreeMap<String, BTreeMap<String, RecipeEntry>> = BTreeMap::new();
        let mut conflicts = Vec::new();

        for ((product, material), pair) in pairs {
            let chosen = Self::canonical_batch_size(&pair.rows);

            let consumption_qty = pair
                .rows
                .iter()
                .map(|&(consumption, batch)| {
                    if batch == chosen {
                        consumption
                    } else {
                        safe_div(consumption * chosen, batch)
                    }
                })
                .sum::<Decimal>();

            let batch_sizes: BTreeSet<Decimal> = pair.rows.iter().map(|&(_, batch)| batch).collect();
            if batch_sizes.len() > 1 {
                tracing::warn!(
                    "BOM 批量不一致: {} → {} 批量 {:?}，採用 {}",
                    product,
                    material,
                    batch_sizes,
                    chosen
                );
                conflicts.push(BatchSizeConflict {
                    product_code: product.clone(),
                    material_code: material.clone(),
                    batch_sizes: batch_sizes.into_iter().collect(),
                    chosen,
                });
            }

            recipes.entry(product).or_default().insert(
                material,
                RecipeEntry {
                    consumption_qty,
                    production_batch_qty: chosen,
                    material_name: pair.material_name,
                    product_name: pair.product_name,
                },
            );
        }

        tracing::debug!(
            "BOM 配方索引: 產品 {} 個, 批量衝突 {} 組",
            recipes.len(),
            conflicts.len()
        );

        Self {
            recipes,
            conflicts,
            skipped_rows,
        }
    }

    /// 出現次數最多的批量，同票取較小者
    fn canonical_batch_size(rows: &[(Decimal, Decimal)]) -> Decimal {
        let mut counts: BTreeMap<Decimal, usize> = BTreeMap::new();
        for &(_, batch) in rows {
            *counts.entry(batch).or_default() += 1;
        }

        let mut chosen = Decimal::ONE;
        let mut best = 0;
        for (batch, count) in counts {
            if count > best {
                chosen = batch;
                best = count;
            }
        }
        chosen
    }

    /// 產品的所有物料配方
    pub fn get(&self, product_code: &str) -> Option<&BTreeMap<String, RecipeEntry>> {
        self.recipes.get(product_code)
    }

    /// 單一 (產品, 物料) 配方
    pub fn entry(&self, product_code: &str, material_code: &str) -> Option<&RecipeEntry> {
        self.recipes.get(product_code)?.get(material_code)
    }

    /// 產品是否有配方
    pub fn contains_product(&self, product_code: &str) -> bool {
        self.recipes.contains_key(product_code)
    }

    /// 所有有配方的產品（遞增）
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    /// 出現在任一配方中的物料
    pub fn material_codes(&self) -> BTreeSet<&str> {
        self.recipes
            .values()
            .flat_map(|materials| materials.keys().map(String::as_str))
            .collect()
    }

    /// 使用某物料的產品及其單位耗用量
    pub fn consumers_of<'a>(&'a self, material_code: &'a str) -> impl Iterator<Item = (&'a str, Decimal)> + 'a {
        self.recipes.iter().filter_map(move |(product, materials)| {
            materials
                .get(material_code)
                .map(|entry| (product.as_str(), entry.unit_ratio()))
        })
    }

    /// 批量衝突清單
    pub fn conflicts(&self) -> &[BatchSizeConflict] {
        &self.conflicts
    }

    /// 被略過的列數
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// 產品數量
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// 是否為空
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
