//! # Statistics Module / 统计模块
//!
//! Reduces the per-iteration durations of a benchmark into a summary.
//! Durations stay integral nanoseconds throughout, so sums and averages of
//! controlled inputs are exact.
//!
//! 将基准测试每次迭代的耗时归约为摘要。全程使用整数纳秒，
//! 因此可控输入的求和与平均值是精确的。

use anyhow::{Result, bail};
use std::time::Duration;

/// `(total, max, min, average)` over the measured iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: Duration,
    pub max: Duration,
    pub min: Duration,
    pub avg: Duration,
}

/// Reduces `durations` into a [`Summary`].
///
/// Fails on an empty slice; callers only reduce after at least one
/// measurement.
///
/// 将 `durations` 归约为 [`Summary`]。空切片会返回错误。
pub fn reduce(durations: &[Duration]) -> Result<Summary> {
    let (Some(max), Some(min)) = (durations.iter().max(), durations.iter().min()) else {
        bail!("no measurements to reduce");
    };
    let total: Duration = durations.iter().sum();
    let count = u32::try_from(durations.len())?;
    Ok(Summary {
        total,
        max: *max,
        min: *min,
        avg: total / count,
    })
}

/// What one case reports: a single duration for one-shot runs, or a
/// summary for repeated runs.
///
/// 单个用例的测量结果：单次运行为一个耗时，重复运行为摘要。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    Single(Duration),
    Aggregate(Summary),
}

impl Measurement {
    /// Builds the measurement for a run: one sample stays a single
    /// duration, more samples are reduced.
    pub fn from_samples(samples: &[Duration]) -> Result<Self> {
        match samples {
            [single] => Ok(Measurement::Single(*single)),
            _ => reduce(samples).map(Measurement::Aggregate),
        }
    }

    /// The duration shown on the case's status line.
    pub fn headline(&self) -> Duration {
        match self {
            Measurement::Single(duration) => *duration,
            Measurement::Aggregate(summary) => summary.total,
        }
    }

    /// The table columns, matching [`Measurement::headers`].
    pub fn columns(&self) -> Vec<Duration> {
        match self {
            Measurement::Single(duration) => vec![*duration],
            Measurement::Aggregate(s) => vec![s.total, s.max, s.min, s.avg],
        }
    }

    /// Table headers for a run of `iterations`.
    pub fn headers(iterations: usize) -> &'static [&'static str] {
        match iterations {
            1 => &["time"],
            _ => &["full", "max", "min", "avg"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_exactly() {
        let samples = [
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(300),
        ];
        let summary = reduce(&samples).unwrap();
        assert_eq!(summary.total, Duration::from_millis(600));
        assert_eq!(summary.max, Duration::from_millis(300));
        assert_eq!(summary.min, Duration::from_millis(100));
        assert_eq!(summary.avg, Duration::from_millis(200));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(reduce(&[]).is_err());
    }

    #[test]
    fn one_sample_stays_single() {
        let measurement = Measurement::from_samples(&[Duration::from_secs(2)]).unwrap();
        assert_eq!(measurement, Measurement::Single(Duration::from_secs(2)));
        assert_eq!(measurement.columns().len(), Measurement::headers(1).len());
    }
}
