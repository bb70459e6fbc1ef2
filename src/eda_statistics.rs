use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use ndarray_stats::{interpolate::Linear, Quantile1dExt, QuantileExt};
use noisy_float::types::{n64, N64};
use ordered_float::OrderedFloat;
use statrs::statistics::{Data, Distribution, Max, Min};
use tracing::{debug, warn};

use crate::load_clean::Dataset;
use crate::models::{Factor, MissingPolicy, ReportRow};

/// Number of countries shown in the happiest-countries ranking.
pub const TOP_N: usize = 5;

/// Grid resolution of the kernel density estimate.
const DENSITY_POINTS: usize = 64;

/// Bandwidth used when the scores have no spread to estimate one from.
const DEGENERATE_BANDWIDTH: f64 = 0.1;

/// Mean happiness score of one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearMean {
    pub year: u16,
    pub mean: f64,
    pub count: usize,
}

/// Mean of one factor column over a year's rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorMean {
    pub factor: Factor,
    pub mean: f64,
}

/// One wedge of a composition chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub percent: f64,
}

/// Shares of a positive total; percentages sum to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub slices: Vec<Slice>,
}

impl Composition {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

/// Five-number summary plus a density curve, enough to draw a violin.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSummary {
    pub count: usize,
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
    pub bandwidth: f64,
    /// `(score, density)` pairs, ascending by score.
    pub density: Vec<(f64, f64)>,
}

/// Highest-scoring rows of a year; equal scores keep their file order.
pub fn top_countries(dataset: &Dataset, year: u16, n: usize) -> Vec<&ReportRow> {
    let mut rows: Vec<&ReportRow> = dataset.rows().iter().filter(|r| r.year == year).collect();
    rows.sort_by_key(|r| Reverse(OrderedFloat(r.score)));
    rows.truncate(n);
    debug!(year, shown = rows.len(), "ranked top countries");
    rows
}

/// Average score for every year present, ascending by year.
pub fn mean_score_per_year(dataset: &Dataset) -> Vec<YearMean> {
    let mut totals: BTreeMap<u16, (f64, usize)> = BTreeMap::new();

    for row in dataset.rows() {
        let entry = totals.entry(row.year).or_insert((0.0, 0));
        entry.0 += row.score;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(year, (total, count))| YearMean {
            year,
            mean: total / count as f64,
            count,
        })
        .collect()
}

/// Column-wise factor means for a year. Missing cells are left out of their
/// column's average, and a column with no values at all is dropped.
pub fn factor_means(dataset: &Dataset, year: u16) -> Vec<FactorMean> {
    let rows: Vec<&ReportRow> = dataset.rows().iter().filter(|r| r.year == year).collect();
    if rows.is_empty() {
        return Vec::new();
    }

    // Missing cells hold zero in `values` and zero in `present`, so the
    // column sums give the total and count of the observed values.
    let shape = (rows.len(), Factor::ALL.len());
    let mut values = Array2::<f64>::zeros(shape);
    let mut present = Array2::<f64>::zeros(shape);
    for (i, row) in rows.iter().enumerate() {
        for (j, &factor) in Factor::ALL.iter().enumerate() {
            if let Some(value) = row.factor(factor, MissingPolicy::Exclude) {
                values[(i, j)] = value;
                present[(i, j)] = 1.0;
            }
        }
    }

    let totals = values.sum_axis(Axis(0));
    let counts = present.sum_axis(Axis(0));
    Factor::ALL
        .iter()
        .zip(totals.iter().zip(counts.iter()))
        .filter_map(|(&factor, (&total, &count))| {
            (count > 0.0).then(|| FactorMean {
                factor,
                mean: total / count,
            })
        })
        .collect()
}

/// The row for a (Country, Year) pair, if the report has one.
pub fn lookup<'a>(dataset: &'a Dataset, country: &str, year: u16) -> Option<&'a ReportRow> {
    dataset
        .rows()
        .iter()
        .find(|r| r.year == year && r.country == country)
}

/// `(year, score)` pairs of one country, ascending by year.
pub fn country_trend(dataset: &Dataset, country: &str) -> Vec<(u16, f64)> {
    let mut trend: Vec<(u16, f64)> = dataset
        .rows()
        .iter()
        .filter(|r| r.country == country)
        .map(|r| (r.year, r.score))
        .collect();
    trend.sort_by_key(|&(year, _)| year);
    trend
}

/// Every score recorded for a year, in file order.
pub fn scores_for_year(dataset: &Dataset, year: u16) -> Vec<f64> {
    dataset
        .rows()
        .iter()
        .filter(|r| r.year == year)
        .map(|r| r.score)
        .collect()
}

/// Smallest and largest non-NaN value.
pub fn score_bounds(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let view = ArrayView1::from(values);
    let lo = *view.min_skipnan();
    let hi = *view.max_skipnan();
    if lo.is_nan() || hi.is_nan() {
        None
    } else {
        Some((lo, hi))
    }
}

/// Quartiles and a Gaussian kernel density estimate of `scores`.
///
/// Quartiles interpolate linearly between order statistics. The bandwidth
/// follows Silverman's rule of thumb; the density grid extends two
/// bandwidths past either extreme.
pub fn describe_distribution(scores: &[f64]) -> Option<DistributionSummary> {
    let finite: Vec<f64> = scores.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }

    let n = finite.len();
    let mut ordered: Array1<N64> = finite.iter().copied().map(n64).collect();
    let lower_quartile = linear_quantile(&mut ordered, 0.25)?;
    let median = linear_quantile(&mut ordered, 0.5)?;
    let upper_quartile = linear_quantile(&mut ordered, 0.75)?;

    let data = Data::new(finite.clone());
    let std_dev = data.std_dev().unwrap_or(0.0);
    let mut bandwidth = 1.06 * std_dev * (n as f64).powf(-0.2);
    if !bandwidth.is_finite() || bandwidth <= 0.0 {
        bandwidth = DEGENERATE_BANDWIDTH;
    }

    let min = data.min();
    let max = data.max();
    let lo = min - 2.0 * bandwidth;
    let hi = max + 2.0 * bandwidth;
    let step = (hi - lo) / (DENSITY_POINTS - 1) as f64;
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * PI).sqrt());
    let density = (0..DENSITY_POINTS)
        .map(|i| {
            let y = lo + step * i as f64;
            let d: f64 = finite
                .iter()
                .map(|&x| (-0.5 * ((y - x) / bandwidth).powi(2)).exp())
                .sum();
            (y, d * norm)
        })
        .collect();

    Some(DistributionSummary {
        count: n,
        min,
        lower_quartile,
        median,
        upper_quartile,
        max,
        bandwidth,
        density,
    })
}

fn linear_quantile(values: &mut Array1<N64>, q: f64) -> Option<f64> {
    values.quantile_mut(n64(q), &Linear).ok().map(|v| v.raw())
}

/// Turns labelled values into percentage shares.
///
/// Non-positive values cannot form a wedge and are dropped. Returns `None`
/// when nothing positive remains.
pub fn compose<I, S>(parts: I) -> Option<Composition>
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    let mut kept = Vec::new();
    for (label, value) in parts {
        let label = label.into();
        if value.is_finite() && value > 0.0 {
            kept.push((label, value));
        } else if value < 0.0 {
            warn!(label = %label, value, "negative share dropped from composition");
        } else {
            debug!(label = %label, "empty share dropped from composition");
        }
    }

    let total: f64 = kept.iter().map(|(_, v)| v).sum();
    if kept.is_empty() || total <= 0.0 {
        return None;
    }

    Some(Composition {
        slices: kept
            .into_iter()
            .map(|(label, value)| Slice {
                label,
                value,
                percent: value / total * 100.0,
            })
            .collect(),
    })
}

/// Average factor composition of a year, labelled by column name.
pub fn yearly_composition(dataset: &Dataset, year: u16) -> Option<Composition> {
    compose(
        factor_means(dataset, year)
            .into_iter()
            .map(|m| (m.factor.column(), m.mean)),
    )
}

/// Factor composition of one row, missing factors counted as zero.
pub fn row_composition(row: &ReportRow) -> Option<Composition> {
    compose(Factor::ALL.iter().map(|&factor| {
        (
            factor.short_label(),
            row.factor(factor, MissingPolicy::ZeroFill).unwrap_or(0.0),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: Vec<ReportRow>) -> Dataset {
        Dataset::from_rows(rows).expect("dataset")
    }

    #[test]
    fn mean_of_known_fixture() {
        let data = dataset(vec![
            ReportRow::new("A", 2015, 4.0),
            ReportRow::new("B", 2015, 6.0),
        ]);
        let means = mean_score_per_year(&data);
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].year, 2015);
        assert_eq!(means[0].mean, 5.0);
        assert_eq!(means[0].count, 2);
    }

    #[test]
    fn absent_years_produce_no_mean() {
        let data = dataset(vec![
            ReportRow::new("A", 2015, 4.0),
            ReportRow::new("A", 2017, 5.0),
        ]);
        let years: Vec<u16> = mean_score_per_year(&data).iter().map(|m| m.year).collect();
        assert_eq!(years, vec![2015, 2017]);
    }

    #[test]
    fn top_countries_ties_keep_file_order() {
        let data = dataset(vec![
            ReportRow::new("First", 2016, 7.0),
            ReportRow::new("Second", 2016, 7.0),
            ReportRow::new("Low", 2016, 3.0),
            ReportRow::new("High", 2016, 7.5),
            ReportRow::new("Other year", 2015, 9.0),
        ]);
        let names: Vec<&str> = top_countries(&data, 2016, TOP_N)
            .iter()
            .map(|r| r.country.as_str())
            .collect();
        assert_eq!(names, vec!["High", "First", "Second", "Low"]);
    }

    #[test]
    fn top_countries_truncates_to_n() {
        let rows = (0..8)
            .map(|i| ReportRow::new(format!("C{i}"), 2018, i as f64))
            .collect();
        let data = dataset(rows);
        let top = top_countries(&data, 2018, TOP_N);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].country, "C7");
        assert_eq!(top[4].country, "C3");
    }

    #[test]
    fn factor_means_exclude_missing_values() {
        let data = dataset(vec![
            ReportRow::new("A", 2019, 6.0)
                .with_factor(Factor::Gdp, 1.0)
                .with_factor(Factor::Generosity, 0.2),
            ReportRow::new("B", 2019, 5.0).with_factor(Factor::Gdp, 2.0),
        ]);
        let means = factor_means(&data, 2019);
        assert_eq!(
            means,
            vec![
                FactorMean {
                    factor: Factor::Gdp,
                    mean: 1.5
                },
                FactorMean {
                    factor: Factor::Generosity,
                    mean: 0.2
                },
            ]
        );
    }

    #[test]
    fn row_composition_zero_fills_missing_factors() {
        let row = ReportRow::new("A", 2019, 6.0)
            .with_factor(Factor::Gdp, 1.0)
            .with_factor(Factor::Freedom, 3.0);
        let composition = row_composition(&row).expect("composition");
        let labels: Vec<&str> = composition.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["GDP", "Freedom"]);
        assert_eq!(composition.slices[0].percent, 25.0);
        assert_eq!(composition.slices[1].percent, 75.0);
    }

    #[test]
    fn row_without_factors_has_no_composition() {
        assert!(row_composition(&ReportRow::new("A", 2019, 6.0)).is_none());
    }

    #[test]
    fn compose_drops_negative_shares() {
        let composition = compose([("a", 1.0), ("b", -0.5), ("c", 3.0)]).expect("composition");
        assert_eq!(composition.slices.len(), 2);
        assert_eq!(composition.total(), 4.0);
    }

    #[test]
    fn lookup_misses_unknown_pair() {
        let data = dataset(vec![ReportRow::new("Norway", 2017, 7.5)]);
        assert!(lookup(&data, "Norway", 2017).is_some());
        assert!(lookup(&data, "Norway", 2018).is_none());
        assert!(lookup(&data, "Sweden", 2017).is_none());
    }

    #[test]
    fn country_trend_is_sorted_by_year() {
        let data = dataset(vec![
            ReportRow::new("Chile", 2017, 6.6),
            ReportRow::new("Chile", 2015, 6.7),
            ReportRow::new("Peru", 2016, 5.7),
        ]);
        assert_eq!(country_trend(&data, "Chile"), vec![(2015, 6.7), (2017, 6.6)]);
    }

    #[test]
    fn distribution_summary_orders_quantiles() {
        let summary = describe_distribution(&[3.0, 4.0, 5.0, 6.0, 7.0]).expect("summary");
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 3.0);
        assert_eq!(summary.max, 7.0);
        assert_eq!(summary.median, 5.0);
        assert!(summary.lower_quartile <= summary.median);
        assert!(summary.median <= summary.upper_quartile);
        assert_eq!(summary.density.len(), DENSITY_POINTS);
        assert!(summary.density.iter().all(|&(_, d)| d >= 0.0));
    }

    #[test]
    fn quartiles_interpolate_between_order_statistics() {
        let summary = describe_distribution(&[3.0, 4.0, 5.0, 6.0, 7.0]).expect("summary");
        assert_eq!(summary.lower_quartile, 4.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.upper_quartile, 6.0);

        let summary = describe_distribution(&[1.0, 2.0, 3.0, 4.0]).expect("summary");
        assert_eq!(summary.lower_quartile, 1.75);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.upper_quartile, 3.25);
    }

    #[test]
    fn single_score_uses_fallback_bandwidth() {
        let summary = describe_distribution(&[5.0]).expect("summary");
        assert_eq!(summary.bandwidth, DEGENERATE_BANDWIDTH);
    }

    #[test]
    fn score_bounds_skip_nan() {
        assert_eq!(score_bounds(&[4.0, f64::NAN, 2.5]), Some((2.5, 4.0)));
        assert_eq!(score_bounds(&[]), None);
    }
}
