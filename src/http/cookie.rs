// Session cookie parsing and issuing

use axum::http::{header, HeaderMap, HeaderValue};

/// Value of the cookie `name`, if the request carries a non-empty one
pub fn find(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim().trim_matches('"').to_string())
        })
        .find(|value| !value.is_empty())
}

pub fn issue(name: &str, session_id: &str, max_age_secs: u64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{name}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_among_several_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("csrftoken=abc; sessionid=xyz123; theme=dark"),
        );
        assert_eq!(find(&headers, "sessionid"), Some("xyz123".to_string()));
        assert_eq!(find(&headers, "missing"), None);
    }

    #[test]
    fn test_empty_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sessionid="));
        assert_eq!(find(&headers, "sessionid"), None);
    }

    #[test]
    fn test_issue() {
        let value = issue("sessionid", "abc", 60).unwrap();
        assert!(value.to_str().unwrap().starts_with("sessionid=abc;"));
    }
}
