use serde::Serialize;

use crate::services::grading::round2;

/// Direction of a student's recent score rates, judged by comparing the
/// first and second half of the window with a 5 percentage-point band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ScoreTrend {
    Improving,
    Declining,
    Stable,
}

const TREND_THRESHOLD: f64 = 5.0;

pub(crate) fn classify_trend(score_rates: &[f64]) -> ScoreTrend {
    if score_rates.len() < 3 {
        return ScoreTrend::Stable;
    }

    let mid = score_rates.len() / 2;
    let early = &score_rates[..mid];
    let recent = &score_rates[score_rates.len() - mid..];
    let early_avg = early.iter().sum::<f64>() / early.len() as f64;
    let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;

    if recent_avg > early_avg + TREND_THRESHOLD {
        ScoreTrend::Improving
    } else if recent_avg < early_avg - TREND_THRESHOLD {
        ScoreTrend::Declining
    } else {
        ScoreTrend::Stable
    }
}

/// Score as a percentage of the achievable total; 0 when nothing was
/// achievable.
pub(crate) fn score_rate(score: f64, full_score: f64) -> f64 {
    if full_score <= 0.0 {
        return 0.0;
    }
    round2(score / full_score * 100.0)
}

pub(crate) fn completion_rate(submitted_count: i64, enrolled_count: i64) -> f64 {
    if enrolled_count <= 0 {
        return 0.0;
    }
    round2(submitted_count as f64 / enrolled_count as f64 * 100.0)
}

pub(crate) fn average_score_rate(scores: &[f64], full_score: f64) -> f64 {
    if scores.is_empty() || full_score <= 0.0 {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    round2(mean / full_score * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_requires_three_data_points() {
        assert_eq!(classify_trend(&[]), ScoreTrend::Stable);
        assert_eq!(classify_trend(&[10.0]), ScoreTrend::Stable);
        assert_eq!(classify_trend(&[10.0, 90.0]), ScoreTrend::Stable);
    }

    #[test]
    fn trend_improving_when_recent_half_clearly_higher() {
        assert_eq!(classify_trend(&[50.0, 55.0, 70.0, 80.0]), ScoreTrend::Improving);
        assert_eq!(classify_trend(&[40.0, 60.0, 75.0]), ScoreTrend::Improving);
    }

    #[test]
    fn trend_declining_when_recent_half_clearly_lower() {
        assert_eq!(classify_trend(&[90.0, 85.0, 60.0, 55.0]), ScoreTrend::Declining);
    }

    #[test]
    fn trend_stable_inside_threshold_band() {
        assert_eq!(classify_trend(&[70.0, 72.0, 74.0, 71.0]), ScoreTrend::Stable);
        // Exactly +5 points is still stable; the comparison is strict.
        assert_eq!(classify_trend(&[70.0, 70.0, 75.0, 75.0]), ScoreTrend::Stable);
    }

    #[test]
    fn score_rate_guards_zero_full_score() {
        assert_eq!(score_rate(10.0, 0.0), 0.0);
        assert_eq!(score_rate(15.0, 20.0), 75.0);
        assert_eq!(score_rate(1.0, 3.0), 33.33);
    }

    #[test]
    fn completion_rate_guards_empty_roster() {
        assert_eq!(completion_rate(5, 0), 0.0);
        assert_eq!(completion_rate(5, 20), 25.0);
        assert_eq!(completion_rate(0, 20), 0.0);
    }

    #[test]
    fn average_score_rate_guards_degenerate_inputs() {
        assert_eq!(average_score_rate(&[], 20.0), 0.0);
        assert_eq!(average_score_rate(&[10.0, 20.0], 0.0), 0.0);
        assert_eq!(average_score_rate(&[10.0, 20.0], 20.0), 75.0);
    }
}
