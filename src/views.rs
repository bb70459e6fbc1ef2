//! The six dashboard views and the selection each one needs.
//!
//! Every view is described once, in [`VIEW_TABLE`]: its sidebar label, the
//! filters it requires, its header and caption text, its default chart size
//! and the function that prepares its plot data.

use std::fmt;

use tracing::debug;

use crate::charts::{self, Prepared};
use crate::error::SelectionError;
use crate::load_clean::Dataset;

/// A sidebar menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    TopCountries,
    AverageByYear,
    Distribution,
    FactorComposition,
    CountryTrend,
    CountryProportion,
}

/// Which selectors a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Filters {
    pub year: bool,
    pub country: bool,
}

impl Filters {
    const NONE: Filters = Filters {
        year: false,
        country: false,
    };
    const YEAR: Filters = Filters {
        year: true,
        country: false,
    };
    const COUNTRY: Filters = Filters {
        year: false,
        country: true,
    };
    const BOTH: Filters = Filters {
        year: true,
        country: true,
    };
}

/// Static description of one view.
pub struct ViewSpec {
    pub view: View,
    /// Stable command-line key.
    pub key: &'static str,
    /// Sidebar radio label.
    pub label: &'static str,
    pub filters: Filters,
    /// Header template; `{year}` and `{country}` are substituted.
    pub header: &'static str,
    pub caption: Option<&'static str>,
    /// Default chart size in pixels.
    pub size: (u32, u32),
    pub prepare: fn(&Dataset, &Selection) -> Result<Prepared, SelectionError>,
}

pub static VIEW_TABLE: [ViewSpec; 6] = [
    ViewSpec {
        view: View::TopCountries,
        key: "top-countries",
        label: "Happiest Countries per Year",
        filters: Filters::YEAR,
        header: "Top 5 Happiest Countries - {year}",
        caption: None,
        size: (800, 500),
        prepare: charts::prepare_top_countries,
    },
    ViewSpec {
        view: View::AverageByYear,
        key: "average-by-year",
        label: "Average Score per Year",
        filters: Filters::NONE,
        header: "Average World Happiness Score per Year",
        caption: Some("Each marker is the mean score of every country reported that year."),
        size: (700, 400),
        prepare: charts::prepare_average_by_year,
    },
    ViewSpec {
        view: View::Distribution,
        key: "distribution",
        label: "World Happiness Score Distribution",
        filters: Filters::YEAR,
        header: "World Happiness Score Distribution per Year",
        caption: Some(
            "Distribution of country happiness scores for the selected year. \
             The violin shows spread, density and the quartiles of the scores.",
        ),
        size: (600, 500),
        prepare: charts::prepare_distribution,
    },
    ViewSpec {
        view: View::FactorComposition,
        key: "factor-composition",
        label: "Factor Composition of the Score",
        filters: Filters::YEAR,
        header: "Factor Composition of the Score",
        caption: Some(
            "Average share of each contributing factor in the world happiness score \
             for the selected year.",
        ),
        size: (600, 500),
        prepare: charts::prepare_factor_composition,
    },
    ViewSpec {
        view: View::CountryTrend,
        key: "country-trend",
        label: "Score Trend for a Country",
        filters: Filters::COUNTRY,
        header: "Happiness Score Trend - {country}",
        caption: None,
        size: (600, 400),
        prepare: charts::prepare_country_trend,
    },
    ViewSpec {
        view: View::CountryProportion,
        key: "country-proportion",
        label: "Score Proportion per Country",
        filters: Filters::BOTH,
        header: "Factor Proportion of the Score - {country} ({year})",
        caption: None,
        size: (700, 500),
        prepare: charts::prepare_country_proportion,
    },
];

impl View {
    pub const ALL: [View; 6] = [
        View::TopCountries,
        View::AverageByYear,
        View::Distribution,
        View::FactorComposition,
        View::CountryTrend,
        View::CountryProportion,
    ];

    pub fn spec(self) -> &'static ViewSpec {
        // VIEW_TABLE is laid out in View::ALL order.
        &VIEW_TABLE[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn filters(self) -> Filters {
        self.spec().filters
    }

    pub fn from_key(key: &str) -> Option<View> {
        VIEW_TABLE.iter().find(|s| s.key == key).map(|s| s.view)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The current menu choice plus the filters it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    view: View,
    year: Option<u16>,
    country: Option<String>,
}

impl Selection {
    /// Resolves a requested selection against the values present in the data.
    ///
    /// Filters the view does not use are dropped. A required filter that was
    /// not given falls back to the first of its sorted values.
    pub fn resolve(
        dataset: &Dataset,
        view: View,
        year: Option<u16>,
        country: Option<&str>,
    ) -> Result<Self, SelectionError> {
        let filters = view.filters();

        let year = if filters.year {
            let years = dataset.years();
            match year {
                Some(y) if years.contains(&y) => Some(y),
                Some(y) => {
                    return Err(SelectionError::UnknownYear {
                        year: y,
                        available: years
                            .iter()
                            .map(u16::to_string)
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
                }
                None => years.first().copied(),
            }
        } else {
            if let Some(y) = year {
                debug!(view = view.key(), year = y, "ignoring year filter");
            }
            None
        };

        let country = if filters.country {
            let countries = dataset.countries();
            match country {
                Some(c) if countries.contains(&c) => Some(c.to_string()),
                Some(c) => {
                    return Err(SelectionError::UnknownCountry {
                        country: c.to_string(),
                        available: countries.join(", "),
                    })
                }
                None => countries.first().map(|c| c.to_string()),
            }
        } else {
            if let Some(c) = country {
                debug!(view = view.key(), country = c, "ignoring country filter");
            }
            None
        };

        debug!(view = view.key(), ?year, ?country, "selection resolved");
        Ok(Selection {
            view,
            year,
            country,
        })
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn year(&self) -> Option<u16> {
        self.year
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn require_year(&self) -> Result<u16, SelectionError> {
        self.year.ok_or(SelectionError::MissingFilter {
            view: self.view.key(),
            filter: "year",
        })
    }

    pub fn require_country(&self) -> Result<&str, SelectionError> {
        self.country().ok_or(SelectionError::MissingFilter {
            view: self.view.key(),
            filter: "country",
        })
    }

    /// Header text with the selected filters filled in.
    pub fn header(&self) -> String {
        let mut header = self.view.spec().header.to_string();
        if let Some(year) = self.year {
            header = header.replace("{year}", &year.to_string());
        }
        if let Some(country) = &self.country {
            header = header.replace("{country}", country);
        }
        header
    }

    pub fn caption(&self) -> Option<&'static str> {
        self.view.spec().caption
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportRow;

    fn dataset() -> Dataset {
        Dataset::from_rows(vec![
            ReportRow::new("Norway", 2016, 7.4),
            ReportRow::new("Denmark", 2015, 7.5),
            ReportRow::new("Norway", 2015, 7.5),
        ])
        .expect("dataset")
    }

    #[test]
    fn table_matches_view_order() {
        for view in View::ALL {
            assert_eq!(view.spec().view, view);
        }
    }

    #[test]
    fn keys_round_trip() {
        for view in View::ALL {
            assert_eq!(View::from_key(view.key()), Some(view));
        }
        assert_eq!(View::from_key("histogram"), None);
    }

    #[test]
    fn filter_mapping() {
        assert_eq!(View::TopCountries.filters(), Filters::YEAR);
        assert_eq!(View::AverageByYear.filters(), Filters::NONE);
        assert_eq!(View::Distribution.filters(), Filters::YEAR);
        assert_eq!(View::FactorComposition.filters(), Filters::YEAR);
        assert_eq!(View::CountryTrend.filters(), Filters::COUNTRY);
        assert_eq!(View::CountryProportion.filters(), Filters::BOTH);
    }

    #[test]
    fn unset_filters_default_to_first_value() {
        let data = dataset();
        let sel = Selection::resolve(&data, View::CountryProportion, None, None).expect("resolve");
        assert_eq!(sel.year(), Some(2015));
        assert_eq!(sel.country(), Some("Denmark"));
        assert_eq!(sel.header(), "Factor Proportion of the Score - Denmark (2015)");
    }

    #[test]
    fn unused_filters_are_dropped() {
        let data = dataset();
        let sel = Selection::resolve(&data, View::AverageByYear, Some(2016), Some("Norway"))
            .expect("resolve");
        assert_eq!(sel.year(), None);
        assert_eq!(sel.country(), None);
    }

    #[test]
    fn out_of_domain_values_are_rejected() {
        let data = dataset();
        let err = Selection::resolve(&data, View::TopCountries, Some(2020), None).unwrap_err();
        assert_eq!(
            err,
            SelectionError::UnknownYear {
                year: 2020,
                available: "2015, 2016".to_string()
            }
        );
        let err =
            Selection::resolve(&data, View::CountryTrend, None, Some("Atlantis")).unwrap_err();
        assert_eq!(
            err,
            SelectionError::UnknownCountry {
                country: "Atlantis".to_string(),
                available: "Denmark, Norway".to_string()
            }
        );
    }

    #[test]
    fn missing_filter_is_reported() {
        let data = dataset();
        let sel = Selection::resolve(&data, View::AverageByYear, None, None).expect("resolve");
        assert!(sel.require_year().is_err());
    }
}
