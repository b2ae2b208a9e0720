use crate::engine::ConversionResult;

pub const HEADER: &str = "### Currency Conversion (tool)";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Renders the display block handed back to the caller.
pub fn format_conversion(result: &ConversionResult) -> String {
    let src = &result.source;
    let dst = &result.destination;
    format!(
        "{HEADER}\n\
         - Normalized: {}\n\
         - Rate: 1 {src} = {} {dst}\n\
         - Amount: {} {src} → {} {dst}\n\
         - Source: {} · {}\n",
        result.normalized_query,
        result.rate,
        result.amount,
        result.converted_amount,
        result.provider,
        result.timestamp.format(TIMESTAMP_FORMAT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CurrencyCode;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_conversion() {
        let result = ConversionResult {
            amount: 100.0,
            source: CurrencyCode::usd(),
            destination: CurrencyCode::new("EUR"),
            rate: 0.9123,
            converted_amount: 91.23,
            provider: "exchangerate.host".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap(),
            normalized_query: "100 USD -> EUR".to_string(),
        };

        assert_eq!(
            format_conversion(&result),
            "### Currency Conversion (tool)\n\
             - Normalized: 100 USD -> EUR\n\
             - Rate: 1 USD = 0.9123 EUR\n\
             - Amount: 100 USD → 91.23 EUR\n\
             - Source: exchangerate.host · 2024-03-09 07:05:01 UTC\n"
        );
    }
}
