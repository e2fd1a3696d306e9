/// Money is represented as a signed integer number of minor units to avoid
/// floating-point precision issues. For EUR/USD, 1 unit = 100 minor units,
/// so $50.00 = 5000. Positive amounts are credits, negative amounts debits.
pub type MinorUnits = i64;

/// Format minor units as a human-readable amount string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_minor_units(amount: MinorUnits) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.abs();
    let units = abs / 100;
    let remainder = abs % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}
