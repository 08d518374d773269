/// Formats an EUR amount with thousands separators, e.g. `€1,234.50`.
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}€{}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_money() {
        assert_eq!(format_money(0.0), "€0.00");
        assert_eq!(format_money(7.5), "€7.50");
        assert_eq!(format_money(999.999), "€1,000.00");
        assert_eq!(format_money(1234567.891), "€1,234,567.89");
        assert_eq!(format_money(-42.0), "-€42.00");
    }
}
