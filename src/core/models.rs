use super::types::PriceModel;

pub const MIN_CONFIDENCE: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 1.5;

impl PriceModel {
    pub const ALL: [PriceModel; 5] = [
        PriceModel::PowerLaw,
        PriceModel::Saylor,
        PriceModel::LogRegression,
        PriceModel::StockToFlow,
        PriceModel::Metcalfe,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PriceModel::PowerLaw => "power-law",
            PriceModel::Saylor => "saylor",
            PriceModel::LogRegression => "log-regression",
            PriceModel::StockToFlow => "stock-to-flow",
            PriceModel::Metcalfe => "metcalfe",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PriceModel::PowerLaw => "Power Law",
            PriceModel::Saylor => "Saylor (moderate)",
            PriceModel::LogRegression => "Log Regression",
            PriceModel::StockToFlow => "Stock-to-Flow",
            PriceModel::Metcalfe => "Metcalfe's Law",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PriceModel::PowerLaw => "Compounding 35% a year, the most aggressive long-run curve.",
            PriceModel::Saylor => "Compounding 25% a year; a moderate adoption path.",
            PriceModel::LogRegression => {
                "Logarithmic growth with diminishing returns as the asset matures."
            }
            PriceModel::StockToFlow => {
                "Scarcity driven by halvings, approximated as 40% a year compounding."
            }
            PriceModel::Metcalfe => "Network value tracking user growth, 30% a year compounding.",
        }
    }

    fn growth_multiplier(self, t: f64) -> f64 {
        match self {
            PriceModel::PowerLaw => 1.35_f64.powf(t),
            PriceModel::Saylor => 1.25_f64.powf(t),
            PriceModel::LogRegression => 1.0 + 0.5 * (1.0 + t).ln(),
            PriceModel::StockToFlow => 1.40_f64.powf(t),
            PriceModel::Metcalfe => 1.30_f64.powf(t),
        }
    }

    /// Projected price `years_from_now` years out. Confidence is clamped to
    /// [0.5, 1.5] and applied as an exponent on the growth multiple, so
    /// `t = 0` always returns `current_price`.
    pub fn price_at(self, years_from_now: f64, current_price: f64, confidence: f64) -> f64 {
        let t = if years_from_now.is_finite() {
            years_from_now.max(0.0)
        } else {
            0.0
        };
        current_price * self.growth_multiplier(t).powf(clamp_confidence(confidence))
    }
}

pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PriceCurve {
    model: PriceModel,
    current_price: f64,
    confidence: f64,
}

impl PriceCurve {
    pub fn new(model: PriceModel, current_price: f64, confidence: f64) -> Self {
        Self {
            model,
            current_price,
            confidence: clamp_confidence(confidence),
        }
    }

    pub fn at(&self, years_from_now: f64) -> f64 {
        self.model
            .price_at(years_from_now, self.current_price, self.confidence)
    }
}
