//! HTML dashboard page
//!
//! Lays a rendered view out the way the dashboard presents it: sidebar with
//! the view list and the selectors the view shows, then title, header,
//! caption and the chart (or the empty-state notice). The page is
//! self-contained; the chart SVG is inlined.

use std::fmt::Write;

use crate::charts::Rendered;
use crate::load_clean::Dataset;
use crate::views::{Selection, View};

pub const PAGE_TITLE: &str = "World Happiness Dashboard (2015 - 2019)";

/// Render the complete dashboard page for a selection.
pub fn render_page(dataset: &Dataset, selection: &Selection, chart: &Rendered<String>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <aside class="sidebar">
        {sidebar}
    </aside>
    <main>
        <h1>{title}</h1>
        <p class="intro">Interactive exploration of the World Happiness Report 2015&ndash;2019.</p>
        <h2>{header}</h2>
        {caption}
        {body}
        {footer}
    </main>
</body>
</html>"#,
        title = PAGE_TITLE,
        css = inline_css(),
        sidebar = render_sidebar(dataset, selection),
        header = html_escape(&selection.header()),
        caption = selection
            .caption()
            .map(|c| format!(r#"<p class="caption">{}</p>"#, html_escape(c)))
            .unwrap_or_default(),
        body = render_body(chart),
        footer = render_footer(),
    )
}

fn render_sidebar(dataset: &Dataset, selection: &Selection) -> String {
    let mut html = String::from("<h3>Navigation</h3>\n        <fieldset>\n");
    for view in View::ALL {
        let checked = if view == selection.view() { " checked" } else { "" };
        let _ = writeln!(
            html,
            r#"            <label><input type="radio" name="view" value="{key}"{checked} disabled> {label}</label>"#,
            key = view.key(),
            label = html_escape(view.label()),
        );
    }
    html.push_str("        </fieldset>\n");

    if let Some(year) = selection.year() {
        let options: Vec<String> = dataset.years().iter().map(u16::to_string).collect();
        html.push_str(&render_select("Year", &options, &year.to_string()));
    }
    if let Some(country) = selection.country() {
        let options: Vec<String> = dataset.countries().iter().map(|c| c.to_string()).collect();
        html.push_str(&render_select("Country", &options, country));
    }
    html
}

fn render_select(label: &str, options: &[String], selected: &str) -> String {
    let mut html = format!(
        "        <label class=\"select\">Select {label}\n            <select disabled>\n"
    );
    for option in options {
        let marker = if option == selected { " selected" } else { "" };
        let _ = writeln!(
            html,
            "                <option{marker}>{}</option>",
            html_escape(option)
        );
    }
    html.push_str("            </select>\n        </label>\n");
    html
}

fn render_body(chart: &Rendered<String>) -> String {
    match chart {
        Rendered::Chart(svg) => format!(r#"<figure class="chart">{svg}</figure>"#),
        Rendered::Empty { notice } => {
            format!(r#"<div class="warning">{}</div>"#, html_escape(notice))
        }
    }
}

fn render_footer() -> String {
    r#"<footer>
    <hr>
    <p>Data: World Happiness Report</p>
</footer>"#
        .to_string()
}

fn inline_css() -> &'static str {
    r#"
body { display: flex; margin: 0; font-family: sans-serif; color: #262730; }
.sidebar { width: 260px; min-height: 100vh; padding: 1.5rem; background: #f0f2f6; }
.sidebar fieldset { border: none; padding: 0; }
.sidebar label { display: block; margin: 0.4rem 0; }
.sidebar .select { margin-top: 1.2rem; }
.sidebar select { display: block; width: 100%; margin-top: 0.3rem; }
main { flex: 1; padding: 2rem 3rem; }
.intro, .caption { color: #6b6f76; }
.chart svg { max-width: 100%; height: auto; }
.warning { padding: 1rem; border-radius: 0.4rem; background: #fffce7; color: #926c05; }
footer { text-align: center; font-size: 12px; color: gray; margin-top: 2rem; }
footer hr { border: 1px solid #eee; }
"#
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::NO_ROW_NOTICE;
    use crate::models::ReportRow;

    fn dataset() -> Dataset {
        Dataset::from_rows(vec![
            ReportRow::new("Côte d'Ivoire", 2017, 4.18),
            ReportRow::new("Ghana", 2016, 4.28),
        ])
        .expect("dataset")
    }

    #[test]
    fn empty_state_page_shows_warning() {
        let data = dataset();
        let selection =
            Selection::resolve(&data, View::CountryProportion, Some(2016), Some("Côte d'Ivoire"))
                .expect("resolve");
        let page = render_page(
            &data,
            &selection,
            &Rendered::Empty {
                notice: NO_ROW_NOTICE.to_string(),
            },
        );
        assert!(page.contains(r#"<div class="warning">No data available"#));
        assert!(page.contains("Côte d&#39;Ivoire (2016)"));
        assert!(page.contains(r#"value="country-proportion" checked"#));
        assert!(page.contains("<option selected>2016</option>"));
    }

    #[test]
    fn selectors_follow_view_filters() {
        let data = dataset();
        let selection =
            Selection::resolve(&data, View::AverageByYear, None, None).expect("resolve");
        let page = render_page(&data, &selection, &Rendered::Chart("<svg></svg>".to_string()));
        assert!(!page.contains("<select"));
        assert!(page.contains(r#"<figure class="chart"><svg></svg></figure>"#));
        assert!(page.contains(r#"<p class="caption">"#));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(html_escape("<a & b>"), "&lt;a &amp; b&gt;");
    }
}
