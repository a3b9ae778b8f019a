/// Severity classification of a window's fluctuation metric.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Fluctuation (in basis points) a window must exceed to be a [`Severity::Warning`].
pub const DEFAULT_WARNING_BPS: Decimal = Decimal::ONE;

/// Fluctuation (in basis points) a window must exceed to be a [`Severity::Alert`].
pub const DEFAULT_ALERT_BPS: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Discrete volatility tier, ordered `Normal < Warning < Alert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Alert,
}

impl Severity {
    /// Numeric alert level used by display consumers (1, 2, 3).
    pub fn level(&self) -> u8 {
        match self {
            Severity::Normal => 1,
            Severity::Warning => 2,
            Severity::Alert => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Alert => "alert",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basis point boundaries between [`Severity`] tiers.
///
/// Both boundaries are exclusive: a fluctuation exactly equal to `alert_bps` is a
/// [`Severity::Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AlertThresholds {
    pub warning_bps: Decimal,
    pub alert_bps: Decimal,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning_bps: DEFAULT_WARNING_BPS,
            alert_bps: DEFAULT_ALERT_BPS,
        }
    }
}

impl AlertThresholds {
    pub fn new(warning_bps: Decimal, alert_bps: Decimal) -> Self {
        Self {
            warning_bps,
            alert_bps,
        }
    }

    pub fn classify(&self, fluctuation_bps: Decimal) -> Severity {
        if fluctuation_bps > self.alert_bps {
            Severity::Alert
        } else if fluctuation_bps > self.warning_bps {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classify_default_thresholds() {
        struct TestCase {
            input: Decimal,
            expected: Severity,
        }

        let tests = vec![
            TestCase {
                // TC0: flat window
                input: dec!(0),
                expected: Severity::Normal,
            },
            TestCase {
                // TC1: warning boundary is exclusive
                input: dec!(1.0),
                expected: Severity::Normal,
            },
            TestCase {
                // TC2: just above warning boundary
                input: dec!(1.0001),
                expected: Severity::Warning,
            },
            TestCase {
                // TC3: alert boundary is exclusive
                input: dec!(5.0),
                expected: Severity::Warning,
            },
            TestCase {
                // TC4: just above alert boundary
                input: dec!(5.0001),
                expected: Severity::Alert,
            },
            TestCase {
                // TC5: large move
                input: dec!(1000.0000),
                expected: Severity::Alert,
            },
        ];

        let thresholds = AlertThresholds::default();
        for (index, test) in tests.into_iter().enumerate() {
            let actual = thresholds.classify(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_classify_custom_thresholds() {
        let thresholds = AlertThresholds::new(dec!(10), dec!(50));

        assert_eq!(thresholds.classify(dec!(9.9999)), Severity::Normal);
        assert_eq!(thresholds.classify(dec!(10.0001)), Severity::Warning);
        assert_eq!(thresholds.classify(dec!(50)), Severity::Warning);
        assert_eq!(thresholds.classify(dec!(50.0001)), Severity::Alert);
    }

    #[test]
    fn test_severity_levels_and_serde() {
        struct TestCase {
            input: Severity,
            expected_level: u8,
            expected_json: &'static str,
        }

        let tests = vec![
            TestCase {
                // TC0: normal tier
                input: Severity::Normal,
                expected_level: 1,
                expected_json: r#""normal""#,
            },
            TestCase {
                // TC1: warning tier
                input: Severity::Warning,
                expected_level: 2,
                expected_json: r#""warning""#,
            },
            TestCase {
                // TC2: alert tier
                input: Severity::Alert,
                expected_level: 3,
                expected_json: r#""alert""#,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(test.input.level(), test.expected_level, "TC{} failed", index);
            assert_eq!(
                serde_json::to_string(&test.input).unwrap(),
                test.expected_json,
                "TC{} failed",
                index
            );
        }

        assert!(Severity::Alert > Severity::Warning);
        assert!(Severity::Warning > Severity::Normal);
    }
}
