//! Per-stream contribution schedule with annual step-up

use crate::plan::ContributionStream;

/// Running contribution state of one SIP stream within a phase
#[derive(Debug, Clone)]
pub struct ContributionSchedule {
    /// First month (1-indexed) the stream contributes
    applies_from_period: u32,

    /// Step-up multiplier applied after each 12th month
    step_up_factor: Option<f64>,

    /// Amount contributed in the next active month
    current_amount: f64,

    /// Sum of everything contributed so far
    invested: f64,
}

impl ContributionSchedule {
    pub fn from_stream(stream: &ContributionStream) -> Self {
        let step_up_factor =
            (stream.step_up_percent > 0.0).then(|| 1.0 + stream.step_up_percent / 100.0);
        Self {
            applies_from_period: stream.applies_from_period,
            step_up_factor,
            current_amount: stream.periodic_amount,
            invested: 0.0,
        }
    }

    /// Contribution for `period`, recorded as invested. Zero before the stream starts.
    pub fn contribute(&mut self, period: u32) -> f64 {
        if period < self.applies_from_period {
            return 0.0;
        }
        self.invested += self.current_amount;
        self.current_amount
    }

    /// Apply the annual step-up. Called after the 12th month's contribution
    /// and growth have been recorded.
    pub fn step_up(&mut self) {
        if let Some(factor) = self.step_up_factor {
            self.current_amount *= factor;
        }
    }

    pub fn current_amount(&self) -> f64 {
        self.current_amount
    }

    pub fn invested(&self) -> f64 {
        self.invested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateSpec;

    #[test]
    fn test_step_up_applies_from_month_13() {
        let stream = ContributionStream::new("SIP 1", 1_000.0, RateSpec::nominal_monthly(12.0))
            .with_step_up(10.0);
        let mut schedule = ContributionSchedule::from_stream(&stream);

        for month in 1..=12 {
            assert_eq!(schedule.contribute(month), 1_000.0);
        }
        schedule.step_up();
        assert!((schedule.contribute(13) - 1_100.0).abs() < 1e-9);
        assert!((schedule.invested() - 13_100.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_step_up_keeps_amount() {
        let stream = ContributionStream::new("SIP 1", 500.0, RateSpec::nominal_monthly(8.0));
        let mut schedule = ContributionSchedule::from_stream(&stream);
        schedule.step_up();
        schedule.step_up();
        assert_eq!(schedule.current_amount(), 500.0);
    }

    #[test]
    fn test_inactive_before_first_period() {
        let stream =
            ContributionStream::new("SIP 1", 500.0, RateSpec::nominal_monthly(8.0)).starting_at(4);
        let mut schedule = ContributionSchedule::from_stream(&stream);
        assert_eq!(schedule.contribute(3), 0.0);
        assert_eq!(schedule.invested(), 0.0);
        assert_eq!(schedule.contribute(4), 500.0);
    }
}
