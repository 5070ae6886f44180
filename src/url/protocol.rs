use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Scheme {
    #[default]
    Https,
    Http,
    Ws,
    Wss,
    #[value(skip)]
    Unknown,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
            Scheme::Unknown => "",
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https)
    }
}

impl From<&str> for Scheme {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "https" => Scheme::Https,
            "http" => Scheme::Http,
            "ws" => Scheme::Ws,
            "wss" => Scheme::Wss,
            _ => Scheme::Unknown,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
