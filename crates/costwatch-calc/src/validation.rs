//! BOM 結構驗證
//!
//! 逐列檢查 BOM 配方列是否符合 SOP 代碼規範與數量規則。
//! 驗證失敗不會中斷分析，只會分類統計。

use costwatch_core::numeric::{percent, round_half_up};
use costwatch_core::BomRecipeRow;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// SOP 代碼：`<1–3 個大寫字母><1+ 個數字>[-<1+ 個英數字>]`
///
/// 例如 `P1`、`MAT0042`、`RM12-B`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SopCode<'a> {
    pub prefix: &'a str,
    pub number: &'a str,
    pub suffix: Option<&'a str>,
}

/// SOP 代碼解析錯誤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SopCodeError {
    Empty,
    MissingPrefix,
    PrefixTooLong,
    MissingNumber,
    InvalidSuffix,
    UnexpectedCharacter(char),
}

impl<'a> SopCode<'a> {
    const MAX_PREFIX_LEN: usize = 3;

    pub fn parse(code: &'a str) -> Result<Self, SopCodeError> {
        if code.is_empty() {
            return Err(SopCodeError::Empty);
        }

        let prefix_len = code
            .bytes()
            .take_while(|b| b.is_ascii_uppercase())
            .count();
        if prefix_len == 0 {
            return Err(SopCodeError::MissingPrefix);
        }
        if prefix_len > Self::MAX_PREFIX_LEN {
            return Err(SopCodeError::PrefixTooLong);
        }

        let rest = &code[prefix_len..];
        let number_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if number_len == 0 {
            return Err(SopCodeError::MissingNumber);
        }

        let tail = &rest[number_len..];
        let suffix = match tail.chars().next() {
            None => None,
            Some('-') => {
                let suffix = &tail[1..];
                if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_alphanumeric()) {
                    return Err(SopCodeError::InvalidSuffix);
                }
                Some(suffix)
            }
            Some(other) => return Err(SopCodeError::UnexpectedCharacter(other)),
        };

        Ok(Self {
            prefix: &code[..prefix_len],
            number: &rest[..number_len],
            suffix,
        })
    }
}

impl SopCode<'_> {
    pub fn is_valid(code: &str) -> bool {
        SopCode::parse(code).is_ok()
    }
}

/// BOM 列錯誤類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BomErrorType {
    MissingProductCode,
    MissingMaterialCode,
    InvalidProductCode,
    InvalidMaterialCode,
    /// 產品代碼與物料代碼相同
    SelfReference,
    MissingConsumption,
    NonPositiveConsumption,
    MissingBatchSize,
    NonPositiveBatchSize,
    /// 同一 (產品, 物料) 的第二筆以後（僅提示，配方索引會加總合併）
    DuplicateRow,
}

impl BomErrorType {
    /// 是否使該列不合規
    pub fn is_blocking(self) -> bool {
        !matches!(self, Self::DuplicateRow)
    }
}

impl fmt::Display for BomErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingProductCode => "缺少產品代碼",
            Self::MissingMaterialCode => "缺少物料代碼",
            Self::InvalidProductCode => "產品代碼不符 SOP 規範",
            Self::InvalidMaterialCode => "物料代碼不符 SOP 規範",
            Self::SelfReference => "產品與物料代碼相同",
            Self::MissingConsumption => "缺少耗用量",
            Self::NonPositiveConsumption => "耗用量必須大於 0",
            Self::MissingBatchSize => "缺少生產批量",
            Self::NonPositiveBatchSize => "生產批量必須大於 0",
            Self::DuplicateRow => "重複的配方列",
        };
        f.write_str(text)
    }
}

/// 單列驗證結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowValidation {
    pub row_index: usize,
    pub product_code: String,
    pub material_code: String,
    pub errors: Vec<BomErrorType>,
}

impl RowValidation {
    /// 沒有阻斷性錯誤即為合規
    pub fn is_valid(&self) -> bool {
        self.errors.iter().all(|e| !e.is_blocking())
    }
}

/// BOM 驗證結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomValidationResult {
    pub rows: Vec<RowValidation>,
    /// 錯誤類型 → 次數
    pub error_summary: BTreeMap<BomErrorType, usize>,
    pub valid_rows: usize,
    pub total_rows: usize,
    /// 合規率 0–100；沒有任何列時為 100
    pub compliance_pct: Decimal,
}

impl BomValidationResult {
    /// 不合規的列
    pub fn invalid_rows(&self) -> impl Iterator<Item = &RowValidation> {
        self.rows.iter().filter(|row| !row.is_valid())
    }
}

/// BOM 驗證器
pub struct BomValidator;

impl BomValidator {
    pub fn validate(rows: &[BomRecipeRow]) -> BomValidationResult {
        let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
        let mut error_summary: BTreeMap<BomErrorType, usize> = BTreeMap::new();
        let mut results = Vec::with_capacity(rows.len());

        for (row_index, row) in rows.iter().enumerate() {
            let errors = Self::validate_row(row, &mut seen);
            for &error in &errors {
                *error_summary.entry(error).or_default() += 1;
            }
            results.push(RowValidation {
                row_index,
                product_code: row.product_code.trim().to_string(),
                material_code: row.material_code.trim().to_string(),
                errors,
            });
        }

        let total_rows = results.len();
        let valid_rows = results.iter().filter(|r| r.is_valid()).count();
        let compliance_pct = if total_rows == 0 {
            Decimal::ONE_HUNDRED
        } else {
            round_half_up(percent(Decimal::from(valid_rows), Decimal::from(total_rows)))
        };

        if valid_rows < total_rows {
            tracing::warn!(
                "BOM 驗證: {}/{} 列不合規 {:?}",
                total_rows - valid_rows,
                total_rows,
                error_summary
            );
        }

        BomValidationResult {
            rows: results,
            error_summary,
            valid_rows,
            total_rows,
            compliance_pct,
        }
    }

    fn validate_row<'a>(row: &'a BomRecipeRow, seen: &mut BTreeSet<(&'a str, &'a str)>) -> Vec<BomErrorType> {
        let mut errors = Vec::new();

        let product = row.product();
        let material = row.material();

        match product {
            None => errors.push(BomErrorType::MissingProductCode),
            Some(code) if !SopCode::is_valid(code) => errors.push(BomErrorType::InvalidProductCode),
            Some(_) => {}
        }
        match material {
            None => errors.push(BomErrorType::MissingMaterialCode),
            Some(code) if !SopCode::is_valid(code) => errors.push(BomErrorType::InvalidMaterialCode),
            Some(_) => {}
        }
        if let (Some(product), Some(material)) = (product, material) {
            if product == material {
                errors.push(BomErrorType::SelfReference);
            }
            if !seen.insert((product, material)) {
                errors.push(BomErrorType::DuplicateRow);
            }
        }

        match row.consumption_qty {
            None => errors.push(BomErrorType::MissingConsumption),
            Some(qty) if qty <= Decimal::ZERO => errors.push(BomErrorType::NonPositiveConsumption),
            Some(_) => {}
        }
        match row.production_batch_qty {
            None => errors.push(BomErrorType::MissingBatchSize),
            Some(qty) if qty <= Decimal::ZERO => errors.push(BomErrorType::NonPositiveBatchSize),
            Some(_) => {}
        }

        errors
    }
}
