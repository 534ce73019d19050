use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid base URL '{base}': {source}")]
    InvalidBase {
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot resolve '{name}' against {base}: {source}")]
    InvalidName {
        name: String,
        base: String,
        #[source]
        source: url::ParseError,
    },
}

/// Turns entry names into canonical project page URLs under a fixed origin.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    base: Url,
    prefix: String,
}

impl UrlResolver {
    pub fn new(base: &str) -> Result<Self, ResolveError> {
        let base = Url::parse(base).map_err(|source| ResolveError::InvalidBase {
            base: base.to_string(),
            source,
        })?;
        let prefix = base.as_str().trim_end_matches('/').to_string();
        Ok(Self { base, prefix })
    }

    /// Origin prefix an already-canonical URL starts with (e.g. "https://github.com").
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_canonical(&self, url: &str) -> bool {
        url.starts_with(&self.prefix)
    }

    /// Return `current_url` if it is already canonical, otherwise resolve
    /// `name` as a reference against the base URL.
    pub fn resolve(&self, name: &str, current_url: &str) -> Result<String, ResolveError> {
        if self.is_canonical(current_url) {
            return Ok(current_url.to_string());
        }

        self.base
            .join(name)
            .map(String::from)
            .map_err(|source| ResolveError::InvalidName {
                name: name.to_string(),
                base: self.base.to_string(),
                source,
            })
    }
}
