use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fee and tax rates applied on top of the nightly price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Platform service fee, as a fraction of the base price
    pub service_fee_rate: f64,

    /// Tourist/VAT taxes, as a fraction of the base price
    pub tax_rate: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            service_fee_rate: 0.10,
            tax_rate: 0.05,
        }
    }
}

/// Price of a stay, recomputed on every read and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub nights: i64,
    pub unit_price: i64,
    pub base_price: i64,
    pub service_fee: i64,
    pub taxes: i64,
    pub total: i64,
}

/// Number of nights between two dates.
///
/// Returns 0 when either date is missing and also when `end` is not after
/// `start`; reversed ranges are not rejected here.
pub fn total_nights(start: Option<NaiveDate>, end: Option<NaiveDate>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => (end - start).num_days().max(0),
        _ => 0,
    }
}

pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price a stay of `unit_price` per night over `[start, end)`.
    pub fn quote(&self, unit_price: i64, start: Option<NaiveDate>, end: Option<NaiveDate>) -> PricingBreakdown {
        let nights = total_nights(start, end);
        let base_price = unit_price * nights;
        let service_fee = round_fraction(base_price, self.config.service_fee_rate);
        let taxes = round_fraction(base_price, self.config.tax_rate);

        PricingBreakdown {
            nights,
            unit_price,
            base_price,
            service_fee,
            taxes,
            total: base_price + service_fee + taxes,
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

fn round_fraction(amount: i64, rate: f64) -> i64 {
    (amount as f64 * rate).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    #[test]
    fn test_three_nights_at_100() {
        let engine = PricingEngine::default();
        let quote = engine.quote(100, date("2024-06-01"), date("2024-06-04"));

        assert_eq!(quote.nights, 3);
        assert_eq!(quote.base_price, 300);
        assert_eq!(quote.service_fee, 30);
        assert_eq!(quote.taxes, 15);
        assert_eq!(quote.total, 345);
    }

    #[test]
    fn test_nights_across_month_boundary() {
        assert_eq!(total_nights(date("2024-02-27"), date("2024-03-02")), 4);
    }

    #[test]
    fn test_missing_or_reversed_dates_give_zero_nights() {
        assert_eq!(total_nights(None, date("2024-06-04")), 0);
        assert_eq!(total_nights(date("2024-06-04"), None), 0);
        assert_eq!(total_nights(date("2024-06-04"), date("2024-06-04")), 0);
        assert_eq!(total_nights(date("2024-06-04"), date("2024-06-01")), 0);

        let quote = PricingEngine::default().quote(100, date("2024-06-04"), date("2024-06-01"));
        assert_eq!(quote.total, 0);
    }

    #[test]
    fn test_fees_are_rounded() {
        // 3 nights at 33 = 99 -> fee 9.9 -> 10, taxes 4.95 -> 5
        let quote = PricingEngine::default().quote(33, date("2024-06-01"), date("2024-06-04"));
        assert_eq!(quote.service_fee, 10);

        // 3 nights at 41 = 123 -> fee 12.3 -> 12, taxes 6.15 -> 6
        let quote = PricingEngine::default().quote(41, date("2024-06-01"), date("2024-06-04"));
        assert_eq!(quote.service_fee, 12);
        assert_eq!(quote.taxes, 6);
        assert_eq!(quote.total, 141);
    }
}
