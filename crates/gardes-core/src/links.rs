//! Outbound deep links: telephone dialer and maps search.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// `tel:` URL for a phone number, with separators stripped so dialers
/// accept it verbatim.
#[must_use]
pub fn dial_link(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{digits}")
}

/// Maps search URL centered on a coordinate pair.
#[must_use]
pub fn maps_search_link(latitude: f64, longitude: f64) -> String {
    let query = format!("{latitude},{longitude}");
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        utf8_percent_encode(&query, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dial_link_strips_separators() {
        assert_eq!(dial_link("+237 697 345 678"), "tel:+237697345678");
        assert_eq!(dial_link("06.12.34.56.78"), "tel:0612345678");
    }

    #[test]
    fn maps_link_encodes_coordinates() {
        let link = maps_search_link(9.3017, 13.3921);
        assert_eq!(
            link,
            "https://www.google.com/maps/search/?api=1&query=9%2E3017%2C13%2E3921"
        );
    }

    #[test]
    fn maps_link_handles_negative_coordinates() {
        let link = maps_search_link(-33.8688, 151.2093);
        assert!(link.contains("%2D33%2E8688"));
    }
}
