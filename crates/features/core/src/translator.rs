//! Mapping between entity ids and the URLs they are served under.

/// Translates between ids (paths relative to the base URL, no leading slash)
/// and absolute URLs or absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTranslator {
    base_url: String,
    base_path: String,
}

impl UrlTranslator {
    /// `base_url` may be absolute (`http://host:8000/api`) or a bare path (`/api`).
    /// Trailing slashes are dropped.
    #[must_use]
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let base_url = base_url.as_ref().trim_end_matches('/').to_owned();
        let base_path = match base_url.find("://") {
            Some(scheme_end) => {
                let authority_start = scheme_end + 3;
                base_url[authority_start..]
                    .find('/')
                    .map_or_else(String::new, |p| base_url[authority_start + p..].to_owned())
            },
            None => base_url.clone(),
        };
        Self { base_url, base_path }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Path component of the base URL, empty when served from the root.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// `base_url + "/" + kind_location + id`.
    #[must_use]
    pub fn to_url(&self, id: &str, kind_location: Option<&str>) -> String {
        format!("{}/{}{}", self.base_url, kind_location.unwrap_or_default(), id)
    }

    /// Joins `path` under the base URL, or under the base path when `path_only`.
    #[must_use]
    pub fn url_build(&self, path: &str, path_only: bool) -> String {
        let base = if path_only { &self.base_path } else { &self.base_url };
        format!("{base}/{}", path.trim_start_matches('/'))
    }

    /// Strips the base URL or the base path, then leading slashes.
    ///
    /// Values outside the base are only stripped of their leading slashes.
    #[must_use]
    pub fn to_id(&self, url: &str) -> String {
        let relative = strip_base(url, &self.base_url)
            .or_else(|| strip_base(url, &self.base_path))
            .unwrap_or(url);
        relative.trim_start_matches('/').to_owned()
    }
}

fn strip_base<'a>(url: &'a str, base: &str) -> Option<&'a str> {
    if base.is_empty() {
        return None;
    }
    url.strip_prefix(base).filter(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_base_path() {
        let translator = UrlTranslator::new("http://localhost:8000/api/");
        assert_eq!(translator.base_url(), "http://localhost:8000/api");
        assert_eq!(translator.base_path(), "/api");
        assert_eq!(UrlTranslator::new("http://localhost:8000").base_path(), "");
        assert_eq!(UrlTranslator::new("/api").base_path(), "/api");
    }

    #[test]
    fn renders_urls() {
        let translator = UrlTranslator::new("http://localhost:8000/api");
        assert_eq!(translator.to_url("abc", Some("compute/")), "http://localhost:8000/api/compute/abc");
        assert_eq!(translator.to_url("compute/abc", None), "http://localhost:8000/api/compute/abc");
        assert_eq!(translator.url_build("/my_stuff/", true), "/api/my_stuff/");
        assert_eq!(translator.url_build("my_stuff/", false), "http://localhost:8000/api/my_stuff/");
    }

    #[test]
    fn strips_to_ids() {
        let translator = UrlTranslator::new("http://localhost:8000/api");
        assert_eq!(translator.to_id("http://localhost:8000/api/compute/abc"), "compute/abc");
        assert_eq!(translator.to_id("/api/my_stuff/"), "my_stuff/");
        assert_eq!(translator.to_id("/compute/abc"), "compute/abc");
        assert_eq!(translator.to_id("compute/abc"), "compute/abc");
        assert_eq!(translator.to_id("/apiary/x"), "apiary/x");
    }

    #[test]
    fn round_trips_ids() {
        for base in ["http://localhost:8000", "http://example.org/occi/api", "/api"] {
            let translator = UrlTranslator::new(base);
            for id in ["compute/1", "a", "link/storage/x-1"] {
                assert_eq!(translator.to_id(&translator.to_url(id, None)), id);
            }
        }
    }
}
