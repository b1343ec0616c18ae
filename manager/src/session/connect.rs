use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;
use thiserror::Error;

use super::session::Session;

pub const DEFAULT_DATA_PORT: u16 = 11111;
pub const DEFAULT_RENDER_PORT: u16 = 22221;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The url names a scheme this build does not understand
    #[error("unsupported connection scheme `{scheme}`")]
    UnsupportedScheme { scheme: String },

    /// The url could not be parsed
    #[error("malformed server url `{url}`: {reason}")]
    Malformed { url: String, reason: &'static str },

    /// A port component was not a number in range
    #[error("`{text}` is not a valid port")]
    InvalidPort { text: String },

    /// The user cancelled while waiting for the connection
    #[error("connection attempt aborted")]
    Aborted,

    /// Every attempt was used up without a connection
    #[error("no connection after {attempts} attempts")]
    AttemptsExhausted { attempts: usize },

    /// The transport failed while handshaking
    #[error("connection handshake failed: {0}")]
    Handshake(String),
}

/// How the client and the server processes find each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Everything runs in this process.
    Builtin,
    /// One combined data+render server. `reverse` means the server dials the
    /// client.
    ClientServer { reverse: bool },
    /// Separate data and render servers.
    ClientDataRender { reverse: bool },
}

/// A parsed server url such as `cs://amber:11111` or
/// `cdsrs://ds-host:11111/rs-host:22221`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl {
    scheme: Scheme,
    data_host: String,
    data_port: u16,
    render_host: Option<String>,
    render_port: Option<u16>,
}

impl ServerUrl {
    pub fn builtin() -> Self {
        Self {
            scheme: Scheme::Builtin,
            data_host: String::new(),
            data_port: 0,
            render_host: None,
            render_port: None,
        }
    }

    pub fn parse(url: &str) -> Result<Self, ConnectError> {
        if url == "builtin:" || url == "builtin://" {
            return Ok(Self::builtin());
        }
        let (scheme_text, rest) = url.split_once("://").ok_or_else(|| ConnectError::Malformed {
            url: url.to_string(),
            reason: "missing `://`",
        })?;
        let scheme = match scheme_text {
            "cs" => Scheme::ClientServer { reverse: false },
            "csrc" => Scheme::ClientServer { reverse: true },
            "cdsrs" => Scheme::ClientDataRender { reverse: false },
            "cdsrsrc" => Scheme::ClientDataRender { reverse: true },
            other => {
                return Err(ConnectError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        };
        match scheme {
            Scheme::Builtin => Ok(Self::builtin()),
            Scheme::ClientServer { .. } => {
                let (host, port) = split_host_port(url, rest, DEFAULT_DATA_PORT)?;
                Ok(Self {
                    scheme,
                    data_host: host,
                    data_port: port,
                    render_host: None,
                    render_port: None,
                })
            }
            Scheme::ClientDataRender { .. } => {
                let (data_part, render_part) =
                    rest.split_once('/').ok_or_else(|| ConnectError::Malformed {
                        url: url.to_string(),
                        reason: "expected `data-host[:port]/render-host[:port]`",
                    })?;
                let (data_host, data_port) = split_host_port(url, data_part, DEFAULT_DATA_PORT)?;
                let (render_host, render_port) =
                    split_host_port(url, render_part, DEFAULT_RENDER_PORT)?;
                Ok(Self {
                    scheme,
                    data_host,
                    data_port,
                    render_host: Some(render_host),
                    render_port: Some(render_port),
                })
            }
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn data_host(&self) -> &str {
        &self.data_host
    }

    pub fn data_port(&self) -> u16 {
        self.data_port
    }

    pub fn render_host(&self) -> Option<&str> {
        self.render_host.as_deref()
    }

    pub fn render_port(&self) -> Option<u16> {
        self.render_port
    }

    /// True when the server side initiates the TCP connection.
    pub fn is_reverse(&self) -> bool {
        matches!(
            self.scheme,
            Scheme::ClientServer { reverse: true } | Scheme::ClientDataRender { reverse: true }
        )
    }
}

fn split_host_port(
    url: &str,
    part: &str,
    default_port: u16,
) -> Result<(String, u16), ConnectError> {
    if part.is_empty() {
        return Err(ConnectError::Malformed {
            url: url.to_string(),
            reason: "empty host",
        });
    }
    match part.rsplit_once(':') {
        Some((host, port_text)) => {
            let port = port_text
                .parse::<u16>()
                .map_err(|_| ConnectError::InvalidPort {
                    text: port_text.to_string(),
                })?;
            Ok((host.to_string(), port))
        }
        None => Ok((part.to_string(), default_port)),
    }
}

/// Shared cancellation flag for an in-flight connection wait. Cloned into
/// whatever thread drives the user interface.
#[derive(Clone, Default)]
pub struct ConnectAbort {
    flag: Arc<AtomicBool>,
}

impl ConnectAbort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// One strategy for reaching the processes a url names.
///
/// An attempt that returns `Ok(None)` did not connect yet but may on a later
/// try; reverse-connect waits are built from exactly that shape.
pub trait Connector {
    fn attempt(&mut self, url: &ServerUrl) -> Result<Option<Session>, ConnectError>;
}

/// Drive a connector until it produces a session, the abort flag is raised,
/// or the attempts run out. `progress` is called before each try with the
/// attempt number.
pub fn establish(
    connector: &mut dyn Connector,
    url: &ServerUrl,
    abort: &ConnectAbort,
    max_attempts: usize,
    mut progress: impl FnMut(usize),
) -> Result<Session, ConnectError> {
    for attempt in 0..max_attempts {
        if abort.is_aborted() {
            info!("connection wait aborted after {} attempts", attempt);
            return Err(ConnectError::Aborted);
        }
        progress(attempt);
        if let Some(session) = connector.attempt(url)? {
            return Ok(session);
        }
    }
    Err(ConnectError::AttemptsExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::builtin::BuiltinController;
    use crate::session::dispatcher::NativeFactory;

    #[test]
    fn urls_parse_with_default_ports() {
        let url = ServerUrl::parse("cs://amber").unwrap();
        assert_eq!(url.scheme(), Scheme::ClientServer { reverse: false });
        assert_eq!(url.data_host(), "amber");
        assert_eq!(url.data_port(), DEFAULT_DATA_PORT);
        assert!(url.render_host().is_none());

        let url = ServerUrl::parse("cdsrs://ds/rs:5000").unwrap();
        assert_eq!(url.data_port(), DEFAULT_DATA_PORT);
        assert_eq!(url.render_host(), Some("rs"));
        assert_eq!(url.render_port(), Some(5000));
    }

    #[test]
    fn reverse_schemes_are_recognized() {
        assert!(ServerUrl::parse("csrc://amber:2230").unwrap().is_reverse());
        assert!(ServerUrl::parse("cdsrsrc://a/b").unwrap().is_reverse());
        assert!(!ServerUrl::parse("cs://amber").unwrap().is_reverse());
    }

    #[test]
    fn bad_urls_are_diagnosed() {
        assert!(matches!(
            ServerUrl::parse("http://amber"),
            Err(ConnectError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            ServerUrl::parse("cdsrs://only-data"),
            Err(ConnectError::Malformed { .. })
        ));
        assert!(matches!(
            ServerUrl::parse("cs://amber:seventy"),
            Err(ConnectError::InvalidPort { .. })
        ));
    }

    struct SucceedsOnThird {
        tries: usize,
    }

    impl Connector for SucceedsOnThird {
        fn attempt(&mut self, _url: &ServerUrl) -> Result<Option<Session>, ConnectError> {
            self.tries += 1;
            if self.tries < 3 {
                return Ok(None);
            }
            Ok(Some(Session::new(Box::new(BuiltinController::new(
                NativeFactory::new(),
            )))))
        }
    }

    #[test]
    fn establish_retries_until_the_connector_succeeds() {
        let url = ServerUrl::builtin();
        let abort = ConnectAbort::new();
        let mut seen = Vec::new();
        let mut connector = SucceedsOnThird { tries: 0 };
        let session = establish(&mut connector, &url, &abort, 10, |attempt| {
            seen.push(attempt)
        })
        .unwrap();
        assert!(!session.has_render_server());
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn establish_honors_the_abort_flag() {
        let url = ServerUrl::builtin();
        let abort = ConnectAbort::new();
        abort.abort();
        let mut connector = SucceedsOnThird { tries: 0 };
        assert!(matches!(
            establish(&mut connector, &url, &abort, 10, |_| {}),
            Err(ConnectError::Aborted)
        ));
    }
}
