use url::Url;

/// Build an upstream URL from a base URL, an API path, and query pairs.
/// Any path already on the base URL is kept as a prefix.
pub fn build_upstream_url(
    base_url: &str,
    path: &str,
    query: &[(&str, &str)],
) -> Result<Url, url::ParseError> {
    let mut parsed = Url::parse(base_url)?;

    let normalized_base = parsed.path().trim_end_matches('/');
    let trimmed_path = path.trim_start_matches('/');

    let full_path = if normalized_base.is_empty() || normalized_base == "/" {
        if trimmed_path.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed_path}")
        }
    } else if trimmed_path.is_empty() {
        normalized_base.to_string()
    } else {
        format!("{normalized_base}/{trimmed_path}")
    };

    parsed.set_path(&full_path);
    parsed.set_query(None);
    if !query.is_empty() {
        parsed.query_pairs_mut().extend_pairs(query);
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_query_pairs() {
        let got = build_upstream_url(
            "https://generativelanguage.googleapis.com",
            "/v1beta/models",
            &[("pageSize", "1000"), ("pageToken", "abc=")],
        )
        .unwrap();
        assert_eq!(
            got.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models?pageSize=1000&pageToken=abc%3D"
        );
    }

    #[test]
    fn test_keeps_base_path() {
        let got = build_upstream_url("http://127.0.0.1:9000/gemini/", "/v1beta/models", &[]).unwrap();
        assert_eq!(got.as_str(), "http://127.0.0.1:9000/gemini/v1beta/models");
    }

    #[test]
    fn test_method_suffix_in_path() {
        let got = build_upstream_url(
            "https://generativelanguage.googleapis.com",
            "/v1beta/models/gemini-2.5-flash:generateContent",
            &[],
        )
        .unwrap();
        assert_eq!(
            got.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(build_upstream_url("://bad", "/v1beta/models", &[]).is_err());
    }
}
