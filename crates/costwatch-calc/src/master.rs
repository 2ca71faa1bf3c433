//! 物料主檔正規化

use costwatch_core::MaterialMasterEntry;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// 物料主檔查詢表（代碼 → 名稱 / 標準單價）
#[derive(Debug, Clone, Default)]
pub struct MasterData {
    names: HashMap<String, String>,
    prices: HashMap<String, Decimal>,
}

impl MasterData {
    /// 由主檔紀錄建立查詢表
    ///
    /// 缺代碼的紀錄略過；重複代碼以第一筆為準，
    /// 但若第一筆沒有單價而後續有，則補上單價。
    pub fn build(entries: &[MaterialMasterEntry]) -> Self {
        let mut names = HashMap::new();
        let mut prices = HashMap::new();

        for entry in entries {
            let Some(code) = entry.code() else {
                continue;
            };

            names
                .entry(code.to_string())
                .or_insert_with(|| entry.material_name.trim().to_string());

            if let Some(price) = entry.unit_price {
                prices.entry(code.to_string()).or_insert(price);
            }
        }

        tracing::debug!("物料主檔: {} 筆, 有單價 {} 筆", names.len(), prices.len());

        Self { names, prices }
    }

    /// 物料名稱
    pub fn name(&self, material_code: &str) -> Option<&str> {
        self.names.get(material_code).map(String::as_str)
    }

    /// 標準單價
    pub fn unit_price(&self, material_code: &str) -> Option<Decimal> {
        self.prices.get(material_code).copied()
    }

    /// 物料數量
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// 是否為空
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_master_data() {
        let entries = vec![
            MaterialMasterEntry::new("M1", "Milk").with_unit_price(Decimal::from(100)),
            MaterialMasterEntry::new("M2", "Sugar"),
            MaterialMasterEntry::new("", "Nameless").with_unit_price(Decimal::ONE),
        ];

        let master = MasterData::build(&entries);

        assert_eq!(master.len(), 2);
        assert_eq!(master.name("M1"), Some("Milk"));
        assert_eq!(master.unit_price("M1"), Some(Decimal::from(100)));
        assert_eq!(master.unit_price("M2"), None);
        assert_eq!(master.name("M3"), None);
    }

    #[test]
    fn test_duplicate_codes_keep_first_price() {
        let entries = vec![
            MaterialMasterEntry::new("M1", "Milk"),
            MaterialMasterEntry::new("M1", "Milk 2").with_unit_price(Decimal::from(90)),
            MaterialMasterEntry::new("M1", "Milk 3").with_unit_price(Decimal::from(80)),
        ];

        let master = MasterData::build(&entries);

        assert_eq!(master.name("M1"), Some("Milk"));
        assert_eq!(master.unit_price("M1"), Some(Decimal::from(90)));
    }
}
