//! # 比率换算

const F64_EXACT_INTEGER_MAX: u64 = 1u64 << f64::MANTISSA_DIGITS;

/// 将无符号整数比值转换为浮点表示。
/// 超出 `f64` 精确整数范围时同时右移分子分母，保持比值稳定。
#[must_use]
pub fn ratio_as_f64(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    if numerator == 0 {
        return Some(0.0);
    }

    let mut num = numerator;
    let mut den = denominator;

    while num > F64_EXACT_INTEGER_MAX || den > F64_EXACT_INTEGER_MAX {
        num >>= 1;
        den >>= 1;
        if den == 0 {
            return None;
        }
    }

    #[allow(clippy::cast_precision_loss)] // 缩放后数值已位于安全范围内
    Some(num as f64 / den as f64)
}

/// 以百分比形式返回比值，分母为 0 时为 0
#[must_use]
pub fn ratio_as_percentage(numerator: u64, denominator: u64) -> f64 {
    ratio_as_f64(numerator, denominator).map_or(0.0, |ratio| ratio * 100.0)
}

/// 保留两位小数
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_with_zero_denominator() {
        assert_eq!(ratio_as_f64(3, 0), None);
        assert!(ratio_as_percentage(3, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage() {
        assert!((ratio_as_percentage(1, 4) - 25.0).abs() < f64::EPSILON);
        assert!((round2(ratio_as_percentage(1, 3)) - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_huge_values_keep_ratio() {
        let ratio = ratio_as_f64(u64::MAX / 2, u64::MAX).unwrap();
        assert!((ratio - 0.5).abs() < 1e-9);
    }
}
