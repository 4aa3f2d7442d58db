//! History + prediction series merge for the CPU/RAM line charts.

use crate::types::PredictionSeries;

/// Two aligned datasets over one label axis. `None` is a gap in that line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSeries {
    pub labels: Vec<String>,
    pub history: Vec<Option<f64>>,
    pub prediction: Vec<Option<f64>>,
}

/// History keeps its points and gets one gap per predicted step; the prediction line
/// starts on the last historical point so both segments join.
pub fn merge_history_with_prediction(
    labels: &[String],
    history: &[Option<f64>],
    prediction: Option<&PredictionSeries>,
) -> MergedSeries {
    let h = history.len();
    let mut out = MergedSeries {
        labels: labels.to_vec(),
        history: history.to_vec(),
        prediction: vec![None; h],
    };
    if let (Some(last), Some(slot)) = (history.last(), out.prediction.last_mut()) {
        *slot = *last;
    }

    if let Some(p) = prediction {
        out.labels.extend(p.labels.iter().cloned());
        out.prediction.extend(p.data.iter().copied());
        out.history.extend(std::iter::repeat(None).take(p.data.len()));
    }
    out
}

impl MergedSeries {
    /// `(x, y)` points for a chart dataset, skipping gaps.
    pub fn points(series: &[Option<f64>]) -> Vec<(f64, f64)> {
        series
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|y| (i as f64, y)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.history.len().max(self.prediction.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize, prefix: &str) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn padding_counts_match_lengths() {
        for (hn, pn) in [(1usize, 1usize), (5, 3), (12, 24), (3, 0)] {
            let hist: Vec<Option<f64>> = (0..hn).map(|i| Some(i as f64)).collect();
            let pred = PredictionSeries {
                labels: labels(pn, "p"),
                data: (0..pn).map(|i| Some(50.0 + i as f64)).collect(),
            };
            let m = merge_history_with_prediction(&labels(hn, "h"), &hist, Some(&pred));

            assert_eq!(m.labels.len(), hn + pn);
            assert_eq!(m.history.len(), hn + pn);
            assert_eq!(m.prediction.len(), hn + pn);

            let trailing = m.history.iter().rev().take_while(|v| v.is_none()).count();
            assert_eq!(trailing, pn, "H={hn} P={pn}");
            let leading = m.prediction.iter().take_while(|v| v.is_none()).count();
            assert_eq!(leading, hn - 1, "H={hn} P={pn}");
            assert_eq!(m.prediction[hn - 1], hist[hn - 1]);
            assert_eq!(m.history[hn - 1], hist[hn - 1]);
        }
    }

    #[test]
    fn labels_concatenate_in_order() {
        let pred = PredictionSeries {
            labels: vec!["13:00".into(), "14:00".into()],
            data: vec![Some(40.0), Some(41.0)],
        };
        let m = merge_history_with_prediction(
            &["11:00".to_string(), "12:00".to_string()],
            &[Some(10.0), Some(20.0)],
            Some(&pred),
        );
        assert_eq!(m.labels, vec!["11:00", "12:00", "13:00", "14:00"]);
        assert_eq!(m.history, vec![Some(10.0), Some(20.0), None, None]);
        assert_eq!(m.prediction, vec![None, Some(20.0), Some(40.0), Some(41.0)]);
    }

    #[test]
    fn without_prediction_only_boundary_is_set() {
        let m = merge_history_with_prediction(&labels(3, "h"), &[Some(1.0), Some(2.0), Some(3.0)], None);
        assert_eq!(m.prediction, vec![None, None, Some(3.0)]);
        assert_eq!(m.labels.len(), 3);
    }

    #[test]
    fn empty_history() {
        let pred = PredictionSeries {
            labels: labels(2, "p"),
            data: vec![Some(5.0), None],
        };
        let m = merge_history_with_prediction(&[], &[], Some(&pred));
        assert_eq!(m.history, vec![None, None]);
        assert_eq!(m.prediction, vec![Some(5.0), None]);
    }

    #[test]
    fn gaps_pass_through_and_missing_last_point_leaves_no_boundary() {
        let pred = PredictionSeries {
            labels: labels(1, "p"),
            data: vec![Some(9.0)],
        };
        let m = merge_history_with_prediction(&labels(3, "h"), &[Some(1.0), None, None], Some(&pred));
        assert_eq!(m.history, vec![Some(1.0), None, None, None]);
        assert_eq!(m.prediction, vec![None, None, None, Some(9.0)]);
    }

    #[test]
    fn points_skip_gaps() {
        let pts = MergedSeries::points(&[None, Some(2.0), None, Some(4.0)]);
        assert_eq!(pts, vec![(1.0, 2.0), (3.0, 4.0)]);
    }
}
