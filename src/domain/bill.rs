use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

const MESSAGE_BASE_URL: &str = "https://wa.me/";

/// Bytes left unescaped in the message: letters, digits and `_.-~/`.
const MESSAGE_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Render an amount the way a floating-point sum prints:
/// whole numbers keep one decimal place ("800.0"), others print as-is ("812.5"),
/// and magnitudes from 1e16 up or below 1e-4 switch to exponent form ("1e+16").
pub fn format_amount(amount: f64) -> String {
    if amount.is_nan() {
        return "nan".to_string();
    }
    if amount.is_infinite() {
        return if amount > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = amount.abs();
    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-4) {
        let formatted = format!("{:e}", amount);
        let (mantissa, exponent) = formatted
            .split_once('e')
            .unwrap_or((formatted.as_str(), "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{}e{}{:0>2}", mantissa, sign, digits);
    }

    if amount.fract() == 0.0 {
        format!("{:.1}", amount)
    } else {
        format!("{}", amount)
    }
}

pub fn bill_message(customer_name: &str, total: f64) -> String {
    format!(
        "Hello {}, your total bill is ₹{}. Thank you!",
        customer_name,
        format_amount(total)
    )
}

/// Percent-encode text for a URL query value, spaces as `%20`.
fn encode_query_value(text: &str) -> String {
    utf8_percent_encode(text, MESSAGE_SAFE).to_string()
}

/// Build a pre-filled messaging link for a bill.
/// The contact is inserted verbatim; no phone-number normalization happens.
pub fn bill_link(contact: &str, customer_name: &str, total: f64) -> String {
    format!(
        "{}{}?text={}",
        MESSAGE_BASE_URL,
        contact,
        encode_query_value(&bill_message(customer_name, total))
    )
}
