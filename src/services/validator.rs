//! 学号校验 - 业务能力层

use crate::error::ValidationError;
use crate::models::Enrollment;

/// 学号允许的长度
pub const ENROLLMENT_LENGTHS: [usize; 2] = [9, 10];

/// 校验学号：只能是 9 或 10 位 ASCII 数字，不做裁剪
pub fn validate(enrollment: &str) -> Result<Enrollment, ValidationError> {
    if !ENROLLMENT_LENGTHS.contains(&enrollment.len()) {
        return Err(ValidationError::InvalidInput {
            value: enrollment.to_string(),
            reason: "学号必须为 9 或 10 位",
        });
    }
    if !enrollment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidInput {
            value: enrollment.to_string(),
            reason: "学号只能包含数字",
        });
    }
    Ok(Enrollment::new_unchecked(enrollment.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_lengths() {
        assert_eq!(validate("123456789").unwrap().as_str(), "123456789");
        assert_eq!(validate("2001234567").unwrap().as_str(), "2001234567");
    }

    #[test]
    fn test_rejects_other_lengths() {
        for input in ["", "1", "12345678", "12345678901", "000000000000"] {
            assert!(validate(input).is_err(), "应该拒绝: {:?}", input);
        }
    }

    #[test]
    fn test_rejects_non_digits() {
        for input in ["12345678a", "1234 56789", " 123456789", "١٢٣٤٥٦٧٨٩", "-12345678"] {
            assert!(
                matches!(validate(input), Err(ValidationError::InvalidInput { .. })),
                "应该拒绝: {:?}",
                input
            );
        }
    }
}
