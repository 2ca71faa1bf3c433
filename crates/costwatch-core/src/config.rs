//! 分析配置模型
//!
//! 配置在建構時驗證，之後不可變；每次分析都以值傳入。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Result};

/// 服務水準（不缺貨機率目標），決定安全係數 Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ServiceLevel {
    /// 90%
    P90,
    /// 95%
    P95,
    /// 97%
    P97,
    /// 99%
    P99,
}

impl ServiceLevel {
    /// 所有支援的服務水準（由低到高）
    pub const ALL: [ServiceLevel; 4] = [Self::P90, Self::P95, Self::P97, Self::P99];

    /// 安全係數 Z
    pub fn z_score(self) -> Decimal {
        match self {
            Self::P90 => Decimal::new(128, 2),
            Self::P95 => Decimal::new(165, 2),
            Self::P97 => Decimal::new(188, 2),
            Self::P99 => Decimal::new(233, 2),
        }
    }

    /// 百分比數值
    pub fn percent(self) -> u8 {
        match self {
            Self::P90 => 90,
            Self::P95 => 95,
            Self::P97 => 97,
            Self::P99 => 99,
        }
    }

    /// 寬鬆解析：不支援的數值回落到 95%（Z = 1.65）
    pub fn from_percent_lossy(percent: u8) -> Self {
        Self::try_from(percent).unwrap_or(Self::P95)
    }
}

impl Default for ServiceLevel {
    fn default() -> Self {
        Self::P95
    }
}

impl TryFrom<u8> for ServiceLevel {
    type Error = EngineError;

    fn try_from(percent: u8) -> Result<Self> {
        match percent {
            90 => Ok(Self::P90),
            95 => Ok(Self::P95),
            97 => Ok(Self::P97),
            99 => Ok(Self::P99),
            other => Err(EngineError::InvalidServiceLevel(other)),
        }
    }
}

impl From<ServiceLevel> for u8 {
    fn from(level: ServiceLevel) -> Self {
        level.percent()
    }
}

/// 分析參數配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 服務水準
    pub service_level: ServiceLevel,

    /// 需求統計視窗（週）
    pub forecast_weeks: u32,

    /// 預設提前期（天）
    pub default_lead_time: u32,

    /// 安全天數
    pub safety_days: u32,

    /// 庫存過剩倍數（現有庫存超過安全庫存的倍數即視為過剩）
    pub overstock_multiple: Decimal,
}

impl AnalysisConfig {
    /// 統計視窗上限（週）
    pub const MAX_FORECAST_WEEKS: u32 = 52;

    /// 提前期上限（天），同時適用於預設值與各物料設定
    pub const MAX_LEAD_TIME_DAYS: u32 = 365;

    /// 安全天數上限
    pub const MAX_SAFETY_DAYS: u32 = 365;

    /// 創建並驗證配置
    pub fn new(
        service_level: ServiceLevel,
        forecast_weeks: u32,
        default_lead_time: u32,
        safety_days: u32,
    ) -> Result<Self> {
        Self {
            service_level,
            forecast_weeks,
            default_lead_time,
            safety_days,
            ..Self::default()
        }
        .validate()
    }

    /// 從 JSON 載入並驗證
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// 建構器模式：設置服務水準
    pub fn with_service_level(mut self, level: ServiceLevel) -> Self {
        self.service_level = level;
        self
    }

    /// 建構器模式：設置統計視窗
    pub fn with_forecast_weeks(mut self, weeks: u32) -> Self {
        self.forecast_weeks = weeks;
        self
    }

    /// 建構器模式：設置預設提前期
    pub fn with_default_lead_time(mut self, days: u32) -> Self {
        self.default_lead_time = days;
        self
    }

    /// 建構器模式：設置安全天數
    pub fn with_safety_days(mut self, days: u32) -> Self {
        self.safety_days = days;
        self
    }

    /// 建構器模式：設置過剩倍數
    pub fn with_overstock_multiple(mut self, multiple: Decimal) -> Self {
        self.overstock_multiple = multiple;
        self
    }

    /// 驗證配置，通過後回傳自身
    pub fn validate(self) -> Result<Self> {
        if self.forecast_weeks == 0 || self.forecast_weeks > Self::MAX_FORECAST_WEEKS {
            return Err(EngineError::InvalidConfig(format!(
                "forecast_weeks 必須介於 1 與 {}，實際為 {}",
                Self::MAX_FORECAST_WEEKS,
                self.forecast_weeks
            )));
        }
        if self.default_lead_time > Self::MAX_LEAD_TIME_DAYS {
            return Err(EngineError::InvalidConfig(format!(
                "default_lead_time 不得超過 {} 天，實際為 {}",
                Self::MAX_LEAD_TIME_DAYS,
                self.default_lead_time
            )));
        }
        if self.safety_days > Self::MAX_SAFETY_DAYS {
            return Err(EngineError::InvalidConfig(format!(
                "safety_days 不得超過 {} 天，實際為 {}",
                Self::MAX_SAFETY_DAYS,
                self.safety_days
            )));
        }
        if self.overstock_multiple <= Decimal::ONE {
            return Err(EngineError::InvalidConfig(format!(
                "overstock_multiple 必須大於 1，實際為 {}",
                self.overstock_multiple
            )));
        }
        Ok(self)
    }

    /// 有效提前期 L = 提前期 + 安全天數
    pub fn effective_lead_time(&self, lead_time_days: Option<u32>) -> u32 {
        self.lead_time(lead_time_days)
            .saturating_add(self.safety_days.min(Self::MAX_SAFETY_DAYS))
    }

    /// 物料提前期（未設定時使用預設值，超過上限者截斷）
    pub fn lead_time(&self, lead_time_days: Option<u32>) -> u32 {
        lead_time_days
            .unwrap_or(self.default_lead_time)
            .min(Self::MAX_LEAD_TIME_DAYS)
    }

    /// 需求統計視窗（週），截斷到上限
    pub fn window_weeks(&self) -> u32 {
        self.forecast_weeks.min(Self::MAX_FORECAST_WEEKS)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            service_level: ServiceLevel::P95,
            forecast_weeks: 4,
            default_lead_time: 2,
            safety_days: 1,
            overstock_multiple: Decimal::from(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(90, Decimal::new(128, 2))]
    #[case(95, Decimal::new(165, 2))]
    #[case(97, Decimal::new(188, 2))]
    #[case(99, Decimal::new(233, 2))]
    fn test_z_score_table(#[case] percent: u8, #[case] z: Decimal) {
        let level = ServiceLevel::try_from(percent).unwrap();
        assert_eq!(level.z_score(), z);
        assert_eq!(u8::from(level), percent);
    }

    #[test]
    fn test_unsupported_service_level() {
        assert!(matches!(
            ServiceLevel::try_from(80),
            Err(EngineError::InvalidServiceLevel(80))
        ));
        assert_eq!(ServiceLevel::from_percent_lossy(80).z_score(), Decimal::new(165, 2));
    }

    #[test]
    fn test_create_config() {
        let config = AnalysisConfig::new(ServiceLevel::P99, 8, 3, 2).unwrap();

        assert_eq!(config.service_level, ServiceLevel::P99);
        assert_eq!(config.forecast_weeks, 8);
        assert_eq!(config.effective_lead_time(None), 5);
        assert_eq!(config.effective_lead_time(Some(7)), 9);
    }

    #[test]
    fn test_invalid_forecast_weeks() {
        assert!(AnalysisConfig::new(ServiceLevel::P95, 0, 2, 1).is_err());
        assert!(AnalysisConfig::new(ServiceLevel::P95, 53, 2, 1).is_err());
    }

    #[rstest]
    #[case(r#"{"default_lead_time": 4294967295, "safety_days": 1}"#)]
    #[case(r#"{"default_lead_time": 366}"#)]
    #[case(r#"{"safety_days": 4294967295}"#)]
    fn test_oversized_days_rejected(#[case] json: &str) {
        assert!(matches!(
            AnalysisConfig::from_json(json),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_lead_time_clamped() {
        let config = AnalysisConfig::default();
        assert_eq!(config.lead_time(Some(u32::MAX)), AnalysisConfig::MAX_LEAD_TIME_DAYS);
        assert_eq!(config.effective_lead_time(Some(u32::MAX)), 366);

        // 未經驗證的配置也不會溢位
        let unchecked = AnalysisConfig {
            default_lead_time: u32::MAX,
            safety_days: u32::MAX,
            forecast_weeks: u32::MAX,
            ..AnalysisConfig::default()
        };
        assert_eq!(unchecked.effective_lead_time(None), 730);
        assert_eq!(unchecked.window_weeks(), AnalysisConfig::MAX_FORECAST_WEEKS);
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::default()
            .with_service_level(ServiceLevel::P90)
            .with_forecast_weeks(6)
            .with_default_lead_time(4)
            .with_safety_days(0)
            .with_overstock_multiple(Decimal::ONE)
            .validate();

        // 過剩倍數不得 <= 1
        assert!(config.is_err());
    }

    #[test]
    fn test_config_from_json() {
        let config = AnalysisConfig::from_json(
            r#"{"service_level": 97, "forecast_weeks": 6, "default_lead_time": 3}"#,
        )
        .unwrap();

        assert_eq!(config.service_level, ServiceLevel::P97);
        assert_eq!(config.forecast_weeks, 6);
        assert_eq!(config.safety_days, 1);

        assert!(AnalysisConfig::from_json(r#"{"service_level": 93}"#).is_err());
    }
}
