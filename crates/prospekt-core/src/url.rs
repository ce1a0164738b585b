/// Ensures `url` carries an explicit scheme.
///
/// Protocol-relative URLs (`//cdn.example/x.jpg`) get `https:`; bare hosts
/// get `https://`. Empty input stays empty.
#[must_use]
pub fn validate_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        format!("https://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_absolute_urls() {
        assert_eq!(validate_url("http://a.de/x"), "http://a.de/x");
        assert_eq!(validate_url("https://a.de/x"), "https://a.de/x");
    }

    #[test]
    fn adds_scheme_to_protocol_relative_url() {
        assert_eq!(validate_url("//cdn.a.de/x.jpg"), "https://cdn.a.de/x.jpg");
    }

    #[test]
    fn adds_scheme_to_bare_host() {
        assert_eq!(validate_url("a.de/x"), "https://a.de/x");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(validate_url(""), "");
    }
}
