//! Display formatting for Brazilian currency.

/// Formats an amount as `R$ 1.234,56`: `.` between thousands, `,` before
/// the two decimals, sign ahead of the digits.
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let negative = value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.');
    let sign = if negative { "-" } else { "" };
    format!("R$ {}{},{}", sign, grouped, frac_part)
}
