use crate::url::protocol::Scheme;

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Knobs for [`crate::curl::CurlParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of cached parses; 0 disables the cache.
    pub cache_capacity: usize,
    /// Scheme prefixed to urls written without one.
    pub default_scheme: Scheme,
    /// Pretty print JSON bodies.
    pub pretty_body: bool,
    /// Attach the `Status code is 2xx` test to command line imports.
    pub add_default_tests: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            default_scheme: Scheme::Https,
            pretty_body: true,
            add_default_tests: true,
        }
    }
}

impl ParserConfig {
    pub fn set_cache_capacity(&mut self, capacity: usize) -> &mut Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn set_default_scheme(&mut self, scheme: Scheme) -> &mut Self {
        self.default_scheme = scheme;
        self
    }

    pub fn set_pretty_body(&mut self, pretty: bool) -> &mut Self {
        self.pretty_body = pretty;
        self
    }

    pub fn set_add_default_tests(&mut self, add: bool) -> &mut Self {
        self.add_default_tests = add;
        self
    }
}
