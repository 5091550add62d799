//! Multi-instrument date alignment.
//!
//! The simulation timeline is the intersection of every instrument's dates:
//! a date on which any instrument has no bar is skipped entirely. Each
//! instrument keeps its own full history; alignment only records where each
//! timeline date sits inside that history.

use crate::domain::PriceSeries;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Common timeline plus, per instrument, the bar index for each timeline date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedTimeline {
    pub dates: Vec<NaiveDate>,
    /// `bar_index[instrument][t]` is the index into that instrument's bars of `dates[t]`.
    pub bar_index: Vec<Vec<usize>>,
}

impl AlignedTimeline {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Align instruments on the intersection of their dates.
///
/// An empty input, or any instrument with no bars, yields an empty timeline.
pub fn align_intersection(series: &[PriceSeries]) -> AlignedTimeline {
    let Some((first, rest)) = series.split_first() else {
        return AlignedTimeline::default();
    };

    let mut common: BTreeSet<NaiveDate> = first.dates().collect();
    for s in rest {
        let dates: BTreeSet<NaiveDate> = s.dates().collect();
        common.retain(|d| dates.contains(d));
    }
    let dates: Vec<NaiveDate> = common.into_iter().collect();

    let bar_index = series
        .iter()
        .map(|s| {
            let lookup: HashMap<NaiveDate, usize> =
                s.bars.iter().enumerate().map(|(i, b)| (b.date, i)).collect();
            dates.iter().filter_map(|d| lookup.get(d).copied()).collect()
        })
        .collect();

    AlignedTimeline { dates, bar_index }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn intersection_drops_unshared_dates() {
        let a = PriceSeries::new(
            "A",
            vec![bar("2024-01-01", 1.0), bar("2024-01-02", 2.0), bar("2024-01-03", 3.0)],
        );
        let b = PriceSeries::new("B", vec![bar("2024-01-02", 20.0), bar("2024-01-03", 30.0), bar("2024-01-04", 40.0)]);

        let aligned = align_intersection(&[a, b]);

        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.dates[0], NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(aligned.bar_index[0], vec![1, 2]);
        assert_eq!(aligned.bar_index[1], vec![0, 1]);
    }

    #[test]
    fn single_instrument_keeps_all_dates() {
        let a = PriceSeries::new("A", vec![bar("2024-01-01", 1.0), bar("2024-01-02", 2.0)]);
        let aligned = align_intersection(&[a]);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.bar_index[0], vec![0, 1]);
    }

    #[test]
    fn empty_instrument_empties_timeline() {
        let a = PriceSeries::new("A", vec![bar("2024-01-01", 1.0)]);
        let aligned = align_intersection(&[a, PriceSeries::empty("B")]);
        assert!(aligned.is_empty());
        assert!(align_intersection(&[]).is_empty());
    }
}
