use serde::Deserialize;

/// Raw CSV record, one per line of the cleaned report.
#[derive(Debug, Deserialize)]
pub(crate) struct HappinessRecord {
    #[serde(rename = "Country")]
    pub(crate) country: String,

    #[serde(rename = "Year")]
    pub(crate) year: u16,

    #[serde(rename = "Happiness Score")]
    pub(crate) score: f64,

    #[serde(rename = "GDP per capita", default)]
    pub(crate) gdp: Option<f64>,

    #[serde(rename = "Social support", default)]
    pub(crate) social_support: Option<f64>,

    #[serde(rename = "Healthy life expectancy", default)]
    pub(crate) life_expectancy: Option<f64>,

    #[serde(rename = "Freedom to make life choices", default)]
    pub(crate) freedom: Option<f64>,

    #[serde(rename = "Generosity", default)]
    pub(crate) generosity: Option<f64>,

    #[serde(rename = "Perceptions of corruption", default)]
    pub(crate) corruption: Option<f64>,

    #[serde(rename = "Dystopia Residual", default)]
    pub(crate) dystopia_residual: Option<f64>,
}

impl HappinessRecord {
    pub(crate) fn into_row(self) -> ReportRow {
        ReportRow {
            country: self.country,
            year: self.year,
            score: self.score,
            factors: FactorValues([
                self.gdp,
                self.social_support,
                self.life_expectancy,
                self.freedom,
                self.generosity,
                self.corruption,
                self.dystopia_residual,
            ]),
        }
    }
}

/// One of the seven additive components of the happiness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Factor {
    Gdp,
    SocialSupport,
    HealthyLife,
    Freedom,
    Generosity,
    Corruption,
    DystopiaResidual,
}

impl Factor {
    /// All factors in column order.
    pub const ALL: [Factor; 7] = [
        Factor::Gdp,
        Factor::SocialSupport,
        Factor::HealthyLife,
        Factor::Freedom,
        Factor::Generosity,
        Factor::Corruption,
        Factor::DystopiaResidual,
    ];

    /// Header name of the factor column in the report CSV.
    pub fn column(self) -> &'static str {
        match self {
            Factor::Gdp => "GDP per capita",
            Factor::SocialSupport => "Social support",
            Factor::HealthyLife => "Healthy life expectancy",
            Factor::Freedom => "Freedom to make life choices",
            Factor::Generosity => "Generosity",
            Factor::Corruption => "Perceptions of corruption",
            Factor::DystopiaResidual => "Dystopia Residual",
        }
    }

    /// Short legend label.
    pub fn short_label(self) -> &'static str {
        match self {
            Factor::Gdp => "GDP",
            Factor::SocialSupport => "Social Support",
            Factor::HealthyLife => "Healthy Life",
            Factor::Freedom => "Freedom",
            Factor::Generosity => "Generosity",
            Factor::Corruption => "Corruption",
            Factor::DystopiaResidual => "Dystopia Residual",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Factor values of a single row; `None` marks a missing cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FactorValues(pub [Option<f64>; 7]);

impl FactorValues {
    pub fn get(&self, factor: Factor) -> Option<f64> {
        self.0[factor.index()]
    }
}

/// How a chart treats a missing factor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Leave the value out of the average it would contribute to.
    Exclude,
    /// Count the value as zero.
    ZeroFill,
}

/// One (Country, Year) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub country: String,
    pub year: u16,
    pub score: f64,
    pub factors: FactorValues,
}

impl ReportRow {
    pub fn new(country: impl Into<String>, year: u16, score: f64) -> Self {
        ReportRow {
            country: country.into(),
            year,
            score,
            factors: FactorValues::default(),
        }
    }

    /// Builder-style setter used when assembling rows by hand.
    pub fn with_factor(mut self, factor: Factor, value: f64) -> Self {
        self.factors.0[factor.index()] = Some(value);
        self
    }

    /// Factor value under the given missing-value policy.
    pub fn factor(&self, factor: Factor, policy: MissingPolicy) -> Option<f64> {
        match (self.factors.get(factor), policy) {
            (Some(value), _) if !value.is_nan() => Some(value),
            (_, MissingPolicy::ZeroFill) => Some(0.0),
            (_, MissingPolicy::Exclude) => None,
        }
    }
}
