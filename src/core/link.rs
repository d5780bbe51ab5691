use crate::domain::model::{CanonicalPhone, Provider};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except ASCII alphanumerics and `-._~` is escaped, so `&`, `=`,
/// `+`, `/` and `#` in a message never leak into the URL structure.
const MESSAGE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const WA_ME_BASE: &str = "https://wa.me/";
pub const API_BASE: &str = "https://api.whatsapp.com/send";

pub fn encode_message(text: &str) -> String {
    utf8_percent_encode(text, MESSAGE_ENCODE_SET).to_string()
}

/// Builds the deep link. The phone is not checked here; an empty phone
/// still yields a well-formed but useless URL.
pub fn build_link(phone: &CanonicalPhone, text: &str, provider: Provider) -> String {
    let encoded = encode_message(text);
    match provider {
        Provider::WaMe => format!("{}{}?text={}", WA_ME_BASE, phone, encoded),
        Provider::Api => format!("{}?phone={}&text={}", API_BASE, phone, encoded),
    }
}
