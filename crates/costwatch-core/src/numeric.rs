//! 數值工具（捨入與安全除法）
//!
//! 每個衍生欄位在產出時即捨入，不串接未捨入的中間值。

use rust_decimal::prelude::*;

/// 四捨五入到整數（0.5 往正無窮方向進位）
pub fn round_half_up(value: Decimal) -> Decimal {
    (value + Decimal::new(5, 1)).floor()
}

/// 捨入到指定小數位數（中點遠離零）
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// 安全除法：分母為零或溢位時回傳 0
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// 百分比：`numerator / denominator * 100`，分母為零時為 0
pub fn percent(numerator: Decimal, denominator: Decimal) -> Decimal {
    safe_div(numerator, denominator) * Decimal::ONE_HUNDRED
}

/// 限制在 [0, 100]
pub fn clamp_score(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED)
}

/// 平方根（負數視為 0）
pub fn sqrt(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    value.sqrt().unwrap_or(Decimal::ZERO)
}

/// 向上取整到 `multiple` 的倍數（倍數非正時視為 1）
pub fn ceil_to_multiple(value: Decimal, multiple: Decimal) -> Decimal {
    let multiple = if multiple > Decimal::ZERO {
        multiple
    } else {
        Decimal::ONE
    };
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (value / multiple).ceil() * multiple
}
