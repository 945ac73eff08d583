use std::borrow::Cow;

#[occi_derive::occi_error]
pub enum PathGuardError {
    #[status(400)]
    #[error("Invalid request path{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Checks on request paths before they are used as entity ids.
#[derive(Debug)]
pub struct PathGuard;

impl PathGuard {
    /// Turns a path relative to the base path into an id.
    ///
    /// Leading slashes are dropped; a trailing slash is kept since it marks a
    /// collection.
    ///
    /// # Errors
    /// Rejects `.`/`..` segments, empty inner segments, and control characters.
    pub fn sanitize<P>(path: P) -> Result<String, PathGuardError>
    where
        P: AsRef<str>,
    {
        let path = path.as_ref().trim_start_matches('/');

        if path.chars().any(char::is_control) {
            return Err(Self::invalid(path, "control character"));
        }

        let segments = path.strip_suffix('/').unwrap_or(path);
        if segments.is_empty() {
            return Ok(path.to_owned());
        }
        for segment in segments.split('/') {
            match segment {
                "" => return Err(Self::invalid(path, "empty segment")),
                "." | ".." => return Err(Self::invalid(path, "relative segment")),
                _ => {},
            }
        }

        Ok(path.to_owned())
    }

    fn invalid(path: &str, reason: &'static str) -> PathGuardError {
        PathGuardError::Validation { message: format!("'{path}'").into(), context: Some(reason.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_sanitizing() {
        assert_eq!(PathGuard::sanitize("/compute/abc").unwrap(), "compute/abc");
        assert_eq!(PathGuard::sanitize("/compute/").unwrap(), "compute/");
        assert_eq!(PathGuard::sanitize("/").unwrap(), "");

        assert!(PathGuard::sanitize("/compute/../secret").is_err());
        assert!(PathGuard::sanitize("/compute//abc").is_err());
        assert!(PathGuard::sanitize("/compute/\u{0}").is_err());
    }
}
