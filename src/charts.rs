use std::f64::consts::TAU;
use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, info};

use crate::eda_statistics::{
    country_trend, describe_distribution, lookup, mean_score_per_year, row_composition,
    scores_for_year, score_bounds, top_countries, yearly_composition, Composition,
    DistributionSummary, YearMean, TOP_N,
};
use crate::error::{self, RenderError, SelectionError};
use crate::load_clean::Dataset;
use crate::views::Selection;

/// Notice shown when a (Country, Year) pair has no row.
pub const NO_ROW_NOTICE: &str = "No data available for this country and year combination.";

const SKY: RGBColor = RGBColor(135, 206, 235);
const LIGHT_BLUE: RGBColor = RGBColor(198, 219, 239);
const DARK_BLUE: RGBColor = RGBColor(8, 81, 156);
const TREND_GREEN: RGBColor = RGBColor(34, 139, 34);
const VIOLIN_FILL: RGBColor = RGBColor(161, 201, 244);

const PASTEL: [RGBColor; 7] = [
    RGBColor(161, 201, 244),
    RGBColor(255, 180, 130),
    RGBColor(141, 229, 161),
    RGBColor(255, 159, 155),
    RGBColor(208, 187, 255),
    RGBColor(222, 187, 155),
    RGBColor(250, 176, 228),
];

const SET2: [RGBColor; 7] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
];

/// Plot data produced by a view, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    /// Horizontal lollipop of `(country, score)`, best first.
    Lollipop { title: String, entries: Vec<(String, f64)> },
    /// Mean score per year, drawn as sized markers.
    YearScatter { title: String, means: Vec<YearMean> },
    Violin {
        title: String,
        summary: DistributionSummary,
    },
    /// Donut of averaged factor shares.
    Donut {
        title: String,
        composition: Composition,
    },
    /// Score line over the years of one country.
    Trend {
        title: String,
        points: Vec<(u16, f64)>,
    },
    /// Pie of one row's factor shares.
    Pie {
        title: String,
        composition: Composition,
    },
}

/// Outcome of the prepare step of a view.
#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    Plot(Plot),
    /// Nothing to draw; show the notice instead.
    Empty { notice: String },
}

/// Outcome of a render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<T> {
    Chart(T),
    Empty { notice: String },
}

struct PieStyle {
    start_angle: f64,
    /// Hole radius as a fraction of the pie radius.
    donut_hole: Option<f64>,
    /// Percentage labels are drawn only on slices above this share.
    label_threshold: f64,
    palette: &'static [RGBColor],
}

const DONUT_STYLE: PieStyle = PieStyle {
    start_angle: 140.0,
    donut_hole: Some(0.5),
    label_threshold: 3.0,
    palette: &PASTEL,
};

const PIE_STYLE: PieStyle = PieStyle {
    start_angle: 90.0,
    donut_hole: None,
    label_threshold: 0.0,
    palette: &SET2,
};

pub(crate) fn prepare_top_countries(
    dataset: &Dataset,
    selection: &Selection,
) -> Result<Prepared, SelectionError> {
    let year = selection.require_year()?;
    let entries: Vec<(String, f64)> = top_countries(dataset, year, TOP_N)
        .into_iter()
        .map(|r| (r.country.clone(), r.score))
        .collect();
    if entries.is_empty() {
        return Ok(empty(format!("No scores recorded for {year}.")));
    }
    Ok(Prepared::Plot(Plot::Lollipop {
        title: "Top 5 Happiest Countries (Lollipop Chart)".to_string(),
        entries,
    }))
}

pub(crate) fn prepare_average_by_year(
    dataset: &Dataset,
    _selection: &Selection,
) -> Result<Prepared, SelectionError> {
    let means = mean_score_per_year(dataset);
    if means.is_empty() {
        return Ok(empty("No scores recorded.".to_string()));
    }
    Ok(Prepared::Plot(Plot::YearScatter {
        title: "Average World Happiness Score per Year".to_string(),
        means,
    }))
}

pub(crate) fn prepare_distribution(
    dataset: &Dataset,
    selection: &Selection,
) -> Result<Prepared, SelectionError> {
    let year = selection.require_year()?;
    Ok(match describe_distribution(&scores_for_year(dataset, year)) {
        Some(summary) => Prepared::Plot(Plot::Violin {
            title: format!("World Happiness Score Distribution - {year}"),
            summary,
        }),
        None => empty(format!("No scores recorded for {year}.")),
    })
}

pub(crate) fn prepare_factor_composition(
    dataset: &Dataset,
    selection: &Selection,
) -> Result<Prepared, SelectionError> {
    let year = selection.require_year()?;
    Ok(match yearly_composition(dataset, year) {
        Some(composition) => Prepared::Plot(Plot::Donut {
            title: format!("Happiness Score Factor Composition {year}"),
            composition,
        }),
        None => empty(format!("No factor data available for {year}.")),
    })
}

pub(crate) fn prepare_country_trend(
    dataset: &Dataset,
    selection: &Selection,
) -> Result<Prepared, SelectionError> {
    let country = selection.require_country()?;
    let points = country_trend(dataset, country);
    if points.is_empty() {
        return Ok(empty(format!("No scores recorded for {country}.")));
    }
    Ok(Prepared::Plot(Plot::Trend {
        title: format!("Happiness Score - {country}"),
        points,
    }))
}

pub(crate) fn prepare_country_proportion(
    dataset: &Dataset,
    selection: &Selection,
) -> Result<Prepared, SelectionError> {
    let year = selection.require_year()?;
    let country = selection.require_country()?;
    let Some(row) = lookup(dataset, country, year) else {
        return Ok(empty(NO_ROW_NOTICE.to_string()));
    };
    Ok(match row_composition(row) {
        Some(composition) => Prepared::Plot(Plot::Pie {
            title: format!("Factor Proportion - {country} ({year})"),
            composition,
        }),
        None => empty(format!("No factor data available for {country} in {year}.")),
    })
}

fn empty(notice: String) -> Prepared {
    debug!(%notice, "view has nothing to draw");
    Prepared::Empty { notice }
}

/// Runs the prepare step of the selected view.
pub fn prepare(dataset: &Dataset, selection: &Selection) -> Result<Prepared, SelectionError> {
    (selection.view().spec().prepare)(dataset, selection)
}

/// Renders the selected view to an SVG document.
pub fn render_view_svg(
    dataset: &Dataset,
    selection: &Selection,
    size: Option<(u32, u32)>,
) -> error::Result<Rendered<String>> {
    let size = size.unwrap_or(selection.view().spec().size);
    match prepare(dataset, selection)? {
        Prepared::Plot(plot) => Ok(Rendered::Chart(render_svg(&plot, size)?)),
        Prepared::Empty { notice } => Ok(Rendered::Empty { notice }),
    }
}

/// Renders the selected view to `path`; see [`render_to_file`].
pub fn render_view_to_file(
    dataset: &Dataset,
    selection: &Selection,
    path: &Path,
    size: Option<(u32, u32)>,
) -> error::Result<Rendered<()>> {
    let size = size.unwrap_or(selection.view().spec().size);
    match prepare(dataset, selection)? {
        Prepared::Plot(plot) => {
            render_to_file(&plot, path, size)?;
            Ok(Rendered::Chart(()))
        }
        Prepared::Empty { notice } => Ok(Rendered::Empty { notice }),
    }
}

/// Draws a plot to `path`. A `.png` extension selects the bitmap backend,
/// anything else is written as SVG.
pub fn render_to_file(plot: &Plot, path: &Path, size: (u32, u32)) -> Result<(), RenderError> {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw(&root, plot).map_err(draw_error)?;
        root.present().map_err(draw_error)?;
    } else {
        let svg = render_svg(plot, size)?;
        fs::write(path, svg).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    info!(path = %path.display(), "chart saved");
    Ok(())
}

/// Draws a plot into an in-memory SVG document.
pub fn render_svg(plot: &Plot, size: (u32, u32)) -> Result<String, RenderError> {
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        draw(&root, plot).map_err(draw_error)?;
        root.present().map_err(draw_error)?;
    }
    Ok(buffer)
}

fn draw_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw {
        message: err.to_string(),
    }
}

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Draws a plot onto any plotters backend.
pub fn draw<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, plot: &Plot) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    match plot {
        Plot::Lollipop { title, entries } => draw_lollipop(root, title, entries),
        Plot::YearScatter { title, means } => draw_year_scatter(root, title, means),
        Plot::Violin { title, summary } => draw_violin(root, title, summary),
        Plot::Donut { title, composition } => {
            draw_composition(root, title, composition, &DONUT_STYLE)
        }
        Plot::Trend { title, points } => draw_trend(root, title, points),
        Plot::Pie { title, composition } => draw_composition(root, title, composition, &PIE_STYLE),
    }
}

// Pads a value range so single-valued data still gets a visible axis.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    let pad = ((hi - lo) * 0.1).max(0.25);
    (lo - pad, hi + pad)
}

fn category_label<T: ToString>(items: &[T], index: i32) -> String {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn draw_lollipop<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    entries: &[(String, f64)],
) -> DrawResult<DB> {
    let n = entries.len() as i32;
    let x_max = entries.iter().map(|(_, s)| *s).fold(0.0, f64::max).max(1.0) * 1.1;
    // Best entry on top: row i sits at y = n - 1 - i.
    let names: Vec<&str> = entries.iter().rev().map(|(c, _)| c.as_str()).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(0.0..x_max, -1..n)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(entries.len() + 1)
        .y_label_formatter(&|y| category_label(&names, *y))
        .x_desc("Happiness Score")
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (_, score))| {
        let y = n - 1 - i as i32;
        PathElement::new(vec![(0.0, y), (*score, y)], SKY.stroke_width(3))
    }))?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (_, score))| {
        Circle::new((*score, n - 1 - i as i32), 7, BLUE.mix(0.8).filled())
    }))?;

    Ok(())
}

fn draw_year_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    means: &[YearMean],
) -> DrawResult<DB> {
    let values: Vec<f64> = means.iter().map(|m| m.mean).collect();
    let (lo, hi) = score_bounds(&values).unwrap_or((0.0, 10.0));
    let (y_lo, y_hi) = padded((lo, hi));
    let years: Vec<u16> = means.iter().map(|m| m.year).collect();
    let n = means.len() as i32;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-1..n, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_labels(means.len() + 1)
        .x_label_formatter(&|x| category_label(&years, *x))
        .x_desc("Year")
        .y_desc("Average Score")
        .draw()?;

    chart.draw_series(means.iter().enumerate().map(|(i, m)| {
        let t = if hi > lo { (m.mean - lo) / (hi - lo) } else { 0.5 };
        let radius = (6.0 + 14.0 * t).round() as i32;
        EmptyElement::at((i as i32, m.mean))
            + Circle::new((0, 0), radius, blend(LIGHT_BLUE, DARK_BLUE, t).filled())
            + Text::new(
                format!("{:.2}", m.mean),
                (-14, -radius - 16),
                ("sans-serif", 13).into_font(),
            )
    }))?;

    Ok(())
}

fn blend(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t.clamp(0.0, 1.0)).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

fn draw_violin<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    summary: &DistributionSummary,
) -> DrawResult<DB> {
    let grid: Vec<f64> = summary.density.iter().map(|&(y, _)| y).collect();
    let (y_lo, y_hi) = score_bounds(&grid).unwrap_or((summary.min, summary.max));
    let peak = summary
        .density
        .iter()
        .map(|&(_, d)| d)
        .fold(0.0, f64::max)
        .max(f64::MIN_POSITIVE);
    let half_width = |d: f64| 0.8 * d / peak;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 18))
        .margin(20)
        .x_label_area_size(20)
        .y_label_area_size(60)
        .build_cartesian_2d(-1.0..1.0, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc("Happiness Score")
        .draw()?;

    let mut outline: Vec<(f64, f64)> = summary
        .density
        .iter()
        .map(|&(y, d)| (half_width(d), y))
        .collect();
    outline.extend(summary.density.iter().rev().map(|&(y, d)| (-half_width(d), y)));

    chart.draw_series(std::iter::once(Polygon::new(
        outline.clone(),
        VIOLIN_FILL.mix(0.8).filled(),
    )))?;
    if let Some(&first) = outline.first() {
        outline.push(first);
    }
    chart.draw_series(std::iter::once(PathElement::new(outline, BLACK.stroke_width(1))))?;

    // Quartile lines span the violin width at their score.
    let width_at = |score: f64| {
        summary
            .density
            .iter()
            .min_by(|a, b| (a.0 - score).abs().total_cmp(&(b.0 - score).abs()))
            .map(|&(_, d)| half_width(d))
            .unwrap_or(0.0)
    };
    let quartiles = [
        (summary.lower_quartile, 1),
        (summary.median, 3),
        (summary.upper_quartile, 1),
    ];
    chart.draw_series(quartiles.iter().map(|&(score, stroke)| {
        let w = width_at(score);
        PathElement::new(
            vec![(-w, score), (w, score)],
            BLACK.mix(0.7).stroke_width(stroke),
        )
    }))?;

    Ok(())
}

fn draw_trend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    points: &[(u16, f64)],
) -> DrawResult<DB> {
    let scores: Vec<f64> = points.iter().map(|&(_, s)| s).collect();
    let (y_lo, y_hi) = padded(score_bounds(&scores).unwrap_or((0.0, 10.0)));
    let years: Vec<u16> = points.iter().map(|&(y, _)| y).collect();
    let n = points.len() as i32;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-1..n, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_labels(points.len() + 1)
        .x_label_formatter(&|x| category_label(&years, *x))
        .x_desc("Year")
        .y_desc("Happiness Score")
        .draw()?;

    chart.draw_series(LineSeries::new(
        scores.iter().enumerate().map(|(i, &s)| (i as i32, s)),
        BLUE.stroke_width(2),
    ))?;

    chart.draw_series(
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| Circle::new((i as i32, s), 5, TREND_GREEN.filled())),
    )?;

    Ok(())
}

fn draw_composition<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    composition: &Composition,
    style: &PieStyle,
) -> DrawResult<DB> {
    let body = root.titled(title, ("sans-serif", 20))?;
    let (width, _) = body.dim_in_pixel();
    let (pie_area, legend_area) = body.split_horizontally((width as f64 * 0.62) as u32);

    let (pw, ph) = pie_area.dim_in_pixel();
    let center = ((pw / 2) as i32, (ph / 2) as i32);
    let radius = pw.min(ph) as f64 * 0.42;
    let sizes: Vec<f64> = composition.slices.iter().map(|s| s.value).collect();
    let colors: Vec<RGBColor> = (0..sizes.len())
        .map(|i| style.palette[i % style.palette.len()])
        .collect();
    let labels = vec![""; sizes.len()];

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(style.start_angle);
    if let Some(hole) = style.donut_hole {
        pie.donut_hole(radius * hole);
    }
    pie_area.draw(&pie)?;

    // Percentages sit midway across the ring, following the wedge order.
    let label_radius = match style.donut_hole {
        Some(hole) => radius * (1.0 + hole) / 2.0,
        None => radius * 0.65,
    };
    let font = ("sans-serif", 13)
        .into_font()
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));
    let mut cumulative = 0.0;
    for slice in &composition.slices {
        let share = slice.percent / 100.0;
        let theta = style.start_angle.to_radians() + TAU * (cumulative + share / 2.0);
        cumulative += share;
        if slice.percent <= style.label_threshold {
            continue;
        }
        let at = (
            center.0 + (label_radius * theta.cos()).round() as i32,
            center.1 + (label_radius * theta.sin()).round() as i32,
        );
        pie_area.draw(&Text::new(format!("{:.1}%", slice.percent), at, font.clone()))?;
    }

    let row_height = 22;
    let (_, lh) = legend_area.dim_in_pixel();
    let top = (lh as i32 - row_height * (composition.slices.len() as i32 + 1)) / 2;
    legend_area.draw(&Text::new(
        "Factor",
        (10, top),
        ("sans-serif", 14).into_font().style(FontStyle::Bold),
    ))?;
    for (i, (slice, color)) in composition.slices.iter().zip(&colors).enumerate() {
        let y = top + row_height * (i as i32 + 1);
        legend_area.draw(&Rectangle::new([(10, y), (24, y + 14)], color.filled()))?;
        legend_area.draw(&Text::new(
            slice.label.as_str(),
            (30, y),
            ("sans-serif", 12).into_font(),
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Factor, ReportRow};
    use crate::views::View;

    fn dataset() -> Dataset {
        Dataset::from_rows(vec![
            ReportRow::new("Finland", 2019, 7.769)
                .with_factor(Factor::Gdp, 1.34)
                .with_factor(Factor::SocialSupport, 1.587),
            ReportRow::new("Denmark", 2019, 7.6).with_factor(Factor::Gdp, 1.383),
            ReportRow::new("Finland", 2018, 7.632),
        ])
        .expect("dataset")
    }

    #[test]
    fn every_view_prepares_for_default_selection() {
        let data = dataset();
        for view in View::ALL {
            let selection = Selection::resolve(&data, view, None, None).expect("resolve");
            prepare(&data, &selection).expect("prepare");
        }
    }

    #[test]
    fn missing_country_year_is_empty_state() {
        let data = dataset();
        let selection =
            Selection::resolve(&data, View::CountryProportion, Some(2018), Some("Denmark"))
                .expect("resolve");
        assert_eq!(
            prepare(&data, &selection).expect("prepare"),
            Prepared::Empty {
                notice: NO_ROW_NOTICE.to_string()
            }
        );
        let rendered = render_view_svg(&data, &selection, None).expect("render");
        assert_eq!(
            rendered,
            Rendered::Empty {
                notice: NO_ROW_NOTICE.to_string()
            }
        );
    }

    #[test]
    fn year_without_factors_is_empty_composition() {
        let data = dataset();
        let selection = Selection::resolve(&data, View::FactorComposition, Some(2018), None)
            .expect("resolve");
        assert!(matches!(
            prepare(&data, &selection).expect("prepare"),
            Prepared::Empty { .. }
        ));
    }

    #[test]
    fn top_countries_plot_is_ranked() {
        let data = dataset();
        let selection =
            Selection::resolve(&data, View::TopCountries, Some(2019), None).expect("resolve");
        match prepare(&data, &selection).expect("prepare") {
            Prepared::Plot(Plot::Lollipop { entries, .. }) => {
                assert_eq!(entries[0].0, "Finland");
                assert_eq!(entries[1].0, "Denmark");
            }
            other => panic!("unexpected plot: {other:?}"),
        }
    }

    #[test]
    fn category_labels_outside_range_are_blank() {
        let years = [2015u16, 2016];
        assert_eq!(category_label(&years, -1), "");
        assert_eq!(category_label(&years, 1), "2016");
        assert_eq!(category_label(&years, 2), "");
    }

    #[test]
    fn padding_widens_flat_ranges() {
        assert_eq!(padded((5.0, 5.0)), (4.75, 5.25));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(LIGHT_BLUE, DARK_BLUE, 0.0), LIGHT_BLUE);
        assert_eq!(blend(LIGHT_BLUE, DARK_BLUE, 1.0), DARK_BLUE);
    }
}
