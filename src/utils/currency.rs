/// Currency utility functions for credits and USD cents.
///
/// All USD values in the database are stored in cents to avoid
/// floating-point precision issues; 100 credits are worth $1.00, so one
/// credit is worth exactly one cent.

/// USD value of a number of credits, in cents.
pub fn credits_to_cents(credits: i64) -> i64 {
    credits
}

/// Convert cents to USD (divide by 100).
pub fn cents_to_usd(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Convert USD to cents (multiply by 100).
pub fn usd_to_cents(usd: f64) -> i64 {
    (usd * 100.0).round() as i64
}

/// Round a currency amount to two decimal places.
pub fn round_2dp(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Format cents as a USD string with 2 decimal places.
pub fn format_cents_as_usd(cents: i64) -> String {
    format!("${:.2}", cents_to_usd(cents))
}

/// Value of `cents` USD in a target currency, rounded to 2 decimal
/// places. `rate_to_usd` is the USD value of one unit of that currency.
pub fn cents_to_currency(cents: i64, rate_to_usd: f64) -> f64 {
    round_2dp(cents_to_usd(cents) / rate_to_usd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credits_to_cents() {
        assert_eq!(credits_to_cents(100), 100);
        assert_eq!(credits_to_cents(10), 10);
    }

    #[test]
    fn test_cents_to_usd() {
        assert_eq!(cents_to_usd(10000), 100.0);
        assert_eq!(cents_to_usd(50), 0.50);
        assert_eq!(cents_to_usd(999), 9.99);
    }

    #[test]
    fn test_usd_to_cents() {
        assert_eq!(usd_to_cents(100.0), 10000);
        assert_eq!(usd_to_cents(0.50), 50);
        assert_eq!(usd_to_cents(9.99), 999);
    }

    #[test]
    fn test_round_2dp() {
        assert_eq!(round_2dp(568.181818), 568.18);
        assert_eq!(round_2dp(0.005), 0.01);
    }

    #[test]
    fn test_format_cents_as_usd() {
        assert_eq!(format_cents_as_usd(10000), "$100.00");
        assert_eq!(format_cents_as_usd(50), "$0.50");
    }

    #[test]
    fn test_cents_to_currency() {
        // $25.00 at 0.044 USD per lira.
        assert_eq!(cents_to_currency(2500, 0.044), 568.18);
        assert_eq!(cents_to_currency(2500, 1.0), 25.0);
        assert_eq!(cents_to_currency(1000, 1.08), 9.26);
    }
}
