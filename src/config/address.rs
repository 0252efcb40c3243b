// ABOUTME: Parsing of endpoint addresses written as "[user@]host[:port]".
// ABOUTME: Accepts bracketed IPv6 literals like "deploy@[::1]:2222".

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub user: Option<String>,
    pub host: String,
    pub port: Option<u16>,
}

impl Address {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("address cannot be empty".to_string());
        }

        let (user, rest) = match s.rsplit_once('@') {
            Some((user, _)) if user.is_empty() => {
                return Err("user cannot be empty".to_string());
            }
            Some((user, rest)) => (Some(user.to_string()), rest),
            None => (None, s),
        };

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            let (host, after) = bracketed
                .split_once(']')
                .ok_or_else(|| format!("unterminated '[' in {}", s))?;
            match after {
                "" => (host, None),
                _ => {
                    let port = after
                        .strip_prefix(':')
                        .ok_or_else(|| format!("unexpected text after ']': {}", after))?;
                    (host, Some(parse_port(port)?))
                }
            }
        } else {
            match rest.split_once(':') {
                // A bare IPv6 literal has several colons and no port
                Some(_) if rest.matches(':').count() > 1 => (rest, None),
                Some((host, port)) => (host, Some(parse_port(port)?)),
                None => (rest, None),
            }
        };

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }

        Ok(Address {
            user,
            host: host.to_string(),
            port,
        })
    }
}

fn parse_port(s: &str) -> Result<u16, String> {
    match s.parse::<u16>() {
        Ok(0) | Err(_) => Err(format!("invalid port: {}", s)),
        Ok(port) => Ok(port),
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(user) = &self.user {
            write!(f, "{}@", user)?;
        }
        if self.host.contains(':') {
            write!(f, "[{}]", self.host)?;
        } else {
            write!(f, "{}", self.host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}
