//! 星期別需求統計
//!
//! 以最近 N 週的銷售計算每個 (星期, 產品) 的平均數、樣本標準差、最小、最大值。
//! 不做平滑、季節性或趨勢模型。

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use costwatch_core::numeric::{round_dp, sqrt};
use costwatch_core::SalesRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 統計值保留位數
const STAT_DP: u32 = 4;

/// 星期（週一起算）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// 單一 (星期, 產品) 的需求統計
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOfWeekStat {
    pub day_of_week: DayOfWeek,
    pub product_code: String,
    pub mean: Decimal,
    /// 樣本標準差（n − 1），樣本數 < 2 時為 0
    pub std_dev: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub sample_count: usize,
}

impl DayOfWeekStat {
    fn from_samples(day_of_week: DayOfWeek, product_code: &str, samples: &[Decimal]) -> Self {
        let n = samples.len();
        let sum: Decimal = samples.iter().copied().sum();
        let mean = if n == 0 { Decimal::ZERO } else { sum / Decimal::from(n) };

        let std_dev = if n < 2 {
            Decimal::ZERO
        } else {
            let squares: Decimal = samples.iter().map(|x| (*x - mean) * (*x - mean)).sum();
            sqrt(squares / Decimal::from(n - 1))
        };

        Self {
            day_of_week,
            product_code: product_code.to_string(),
            mean: round_dp(mean, STAT_DP),
            std_dev: round_dp(std_dev, STAT_DP),
            min: samples.iter().copied().min().unwrap_or(Decimal::ZERO),
            max: samples.iter().copied().max().unwrap_or(Decimal::ZERO),
            sample_count: n,
        }
    }
}

/// 需求統計模型
#[derive(Debug, Clone)]
pub struct DemandModel {
    window_start: NaiveDate,
    window_end: NaiveDate,
    stats: BTreeMap<(DayOfWeek, String), DayOfWeekStat>,
}

impl DemandModel {
    /// 以 `[as_of − 7 × weeks 天, as_of)` 的銷售建立統計
    ///
    /// 先彙總 (日期, 產品) 的日銷量；視窗內出現過的產品，
    /// 每個日期都算一個樣本，當天沒有銷售則為 0。
    pub fn build(records: &[SalesRecord], as_of: NaiveDate, forecast_weeks: u32) -> Self {
        let window_days = i64::from(forecast_weeks) * 7;
        let window_start = as_of
            .checked_sub_signed(Duration::days(window_days))
            .unwrap_or(NaiveDate::MIN);

        let mut daily: BTreeMap<(&str, NaiveDate), Decimal> = BTreeMap::new();
        let mut products: BTreeSet<&str> = BTreeSet::new();
        let mut excluded = 0usize;

        for record in records {
            let (Some(code), Some(date)) = (record.code(), record.sold_on) else {
                excluded += 1;
                continue;
            };
            if date < window_start || date >= as_of {
                excluded += 1;
                continue;
            }
            *daily.entry((code, date)).or_default() += record.quantity;
            products.insert(code);
        }

        let mut samples: BTreeMap<(DayOfWeek, &str), Vec<Decimal>> = BTreeMap::new();
        for &product in &products {
            for date in window_start.iter_days().take_while(|d| *d < as_of) {
                let qty = daily.get(&(product, date)).copied().unwrap_or(Decimal::ZERO);
                samples
                    .entry((DayOfWeek::of(date), product))
                    .or_default()
                    .push(qty);
            }
        }

        let stats = samples
            .into_iter()
            .map(|((day, product), values)| {
                (
                    (day, product.to_string()),
                    DayOfWeekStat::from_samples(day, product, &values),
                )
            })
            .collect();

        tracing::debug!(
            "需求統計: 視窗 {} ~ {}, 產品 {} 個, 排除紀錄 {} 筆",
            window_start,
            as_of,
            products.len(),
            excluded
        );

        Self {
            window_start,
            window_end: as_of,
            stats,
        }
    }

    /// 統計視窗 `[start, end)`
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        (self.window_start, self.window_end)
    }

    pub fn stat(&self, day: DayOfWeek, product_code: &str) -> Option<&DayOfWeekStat> {
        self.stats.get(&(day, product_code.to_string()))
    }

    /// 平均日需求（無資料為 0）
    pub fn mean(&self, day: DayOfWeek, product_code: &str) -> Decimal {
        self.stat(day, product_code).map_or(Decimal::ZERO, |s| s.mean)
    }

    /// 日需求標準差（無資料為 0）
    pub fn std_dev(&self, day: DayOfWeek, product_code: &str) -> Decimal {
        self.stat(day, product_code).map_or(Decimal::ZERO, |s| s.std_dev)
    }

    /// 依 (星期, 產品) 排序的所有統計
    pub fn stats(&self) -> impl Iterator<Item = &DayOfWeekStat> {
        self.stats.values()
    }

    pub fn products(&self) -> BTreeSet<&str> {
        self.stats.keys().map(|(_, product)| product.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
