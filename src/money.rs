use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// `$1,234.56`, with a leading minus for negative amounts
pub fn format_usd(amount: Decimal) -> String {
    format_with_places(amount, 2)
}

/// `$1,235`
pub fn format_usd_whole(amount: Decimal) -> String {
    format_with_places(amount, 0)
}

/// `12%`, `8.75%`
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * dec!(100)).normalize())
}

fn format_with_places(amount: Decimal, places: u32) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", places as usize, rounded);
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}${grouped}.{fraction}"),
        None => format!("{sign}${grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_usd(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_usd(dec!(100)), "$100.00");
        assert_eq!(format_usd(dec!(0)), "$0.00");
        assert_eq!(format_usd_whole(dec!(11600)), "$11,600");
        assert_eq!(format_usd_whole(dec!(609350)), "$609,350");
    }

    #[test]
    fn negative_amounts() {
        assert_eq!(format_usd(dec!(-3984)), "-$3,984.00");
        assert_eq!(format_usd(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn rates() {
        assert_eq!(format_rate(dec!(0.10)), "10%");
        assert_eq!(format_rate(dec!(0.37)), "37%");
        assert_eq!(format_rate(dec!(0.0875)), "8.75%");
    }
}
