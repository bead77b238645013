use valuation_core::{MetricSignal, Threshold};

/// Map one metric value onto green / yellow / red.
///
/// Boundaries are inclusive on the better side: a value exactly at the green
/// cut-off is green. `None` yields [`MetricSignal::Na`].
pub fn signal_for_metric(
    value: Option<f64>,
    green_threshold: f64,
    yellow_threshold: f64,
    higher_is_better: bool,
) -> MetricSignal {
    let Some(value) = value else {
        return MetricSignal::Na;
    };

    if higher_is_better {
        if value >= green_threshold {
            MetricSignal::Green
        } else if value >= yellow_threshold {
            MetricSignal::Yellow
        } else {
            MetricSignal::Red
        }
    } else if value <= green_threshold {
        MetricSignal::Green
    } else if value <= yellow_threshold {
        MetricSignal::Yellow
    } else {
        MetricSignal::Red
    }
}

/// [`signal_for_metric`] against a configured threshold pair
pub fn classify(value: Option<f64>, threshold: Threshold, higher_is_better: bool) -> MetricSignal {
    signal_for_metric(value, threshold.green, threshold.yellow, higher_is_better)
}
