//! Schedule — whether a rule fires immediately or after a fixed delay.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::{self, Timestamp};

/// The two rule dispositions, without any delay payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Immediate,
    Scheduled,
}

impl RuleType {
    /// Wire/storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(Self::Immediate),
            "scheduled" => Ok(Self::Scheduled),
            other => Err(ValidationError::InvalidRuleType(other.to_string())),
        }
    }
}

/// Unit of a scheduling delay. Days are fixed 24-hour spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayUnit {
    Minutes,
    Hours,
    Days,
}

impl DelayUnit {
    /// Wire/storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }

    /// Length of `amount` units, or `None` when it does not fit a [`TimeDelta`].
    #[must_use]
    pub fn span(self, amount: u32) -> Option<TimeDelta> {
        let amount = i64::from(amount);
        match self {
            Self::Minutes => TimeDelta::try_minutes(amount),
            Self::Hours => TimeDelta::try_hours(amount),
            Self::Days => TimeDelta::try_days(amount),
        }
    }
}

impl fmt::Display for DelayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DelayUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            other => Err(ValidationError::InvalidDelayUnit(other.to_string())),
        }
    }
}

/// Scheduling disposition of a rule.
///
/// A delay can only exist on the `Scheduled` variant and is always positive,
/// so "immediate with a delay" and "scheduled without one" cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule_type", rename_all = "snake_case")]
pub enum Schedule {
    /// Fire as soon as the trigger occurs.
    Immediate,
    /// Fire once the delay has elapsed after the trigger.
    Scheduled {
        delay_time: NonZeroU32,
        delay_unit: DelayUnit,
    },
}

impl Schedule {
    /// Build a scheduled disposition.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveDelay`] when `delay_time` is zero.
    pub fn scheduled(delay_time: u32, delay_unit: DelayUnit) -> Result<Self, ValidationError> {
        let delay_time =
            NonZeroU32::new(delay_time).ok_or(ValidationError::NonPositiveDelay(0))?;
        Ok(Self::Scheduled {
            delay_time,
            delay_unit,
        })
    }

    /// Build a schedule from its untyped, stored or submitted parts.
    ///
    /// Delay fields passed alongside `immediate` are discarded.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidRuleType`] for anything but `immediate`/`scheduled`
    /// - [`ValidationError::MissingDelay`] when a scheduled rule lacks either delay field
    /// - [`ValidationError::NonPositiveDelay`] when the delay is zero or negative
    /// - [`ValidationError::DelayOutOfRange`] when the delay does not fit 32 bits
    /// - [`ValidationError::InvalidDelayUnit`] for an unknown unit
    pub fn from_parts(
        rule_type: &str,
        delay_time: Option<i64>,
        delay_unit: Option<&str>,
    ) -> Result<Self, ValidationError> {
        match rule_type.parse::<RuleType>()? {
            RuleType::Immediate => Ok(Self::Immediate),
            RuleType::Scheduled => {
                let (Some(time), Some(unit)) = (delay_time, delay_unit) else {
                    return Err(ValidationError::MissingDelay);
                };
                if time <= 0 {
                    return Err(ValidationError::NonPositiveDelay(time));
                }
                let time = u32::try_from(time).map_err(|_| ValidationError::DelayOutOfRange)?;
                Self::scheduled(time, unit.parse()?)
            }
        }
    }

    #[must_use]
    pub fn rule_type(&self) -> RuleType {
        match self {
            Self::Immediate => RuleType::Immediate,
            Self::Scheduled { .. } => RuleType::Scheduled,
        }
    }

    #[must_use]
    pub fn delay_time(&self) -> Option<u32> {
        match self {
            Self::Immediate => None,
            Self::Scheduled { delay_time, .. } => Some(delay_time.get()),
        }
    }

    #[must_use]
    pub fn delay_unit(&self) -> Option<DelayUnit> {
        match self {
            Self::Immediate => None,
            Self::Scheduled { delay_unit, .. } => Some(*delay_unit),
        }
    }

    /// Compute when a firing at `now` becomes due.
    ///
    /// Returns `Ok(None)` for immediate rules. The offset is a plain
    /// fixed-length duration: no calendar or timezone arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DelayOutOfRange`] when the resulting time
    /// cannot be represented or falls after year [`time::MAX_YEAR`].
    pub fn due_at(&self, now: Timestamp) -> Result<Option<Timestamp>, ValidationError> {
        match self {
            Self::Immediate => Ok(None),
            Self::Scheduled {
                delay_time,
                delay_unit,
            } => delay_unit
                .span(delay_time.get())
                .and_then(|span| now.checked_add_signed(span))
                .filter(|due| time::is_representable(*due))
                .map(Some)
                .ok_or(ValidationError::DelayOutOfRange),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("immediate"),
            Self::Scheduled {
                delay_time,
                delay_unit,
            } => write!(f, "scheduled(+{delay_time} {delay_unit})"),
        }
    }
}
