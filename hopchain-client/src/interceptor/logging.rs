//! Request and response logging.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use http::{HeaderMap, HeaderName};
use hopchain_core::{Chain, ChainError, Interceptor, Response};

/// How much of each exchange is logged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Nothing.
    None,
    /// Request line, response status, duration and body size.
    #[default]
    Basic,
    /// [`LogLevel::Basic`] plus request and response headers.
    Headers,
    /// [`LogLevel::Headers`] plus bodies that are valid UTF-8.
    Body,
}

type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// Logs each request and response passing through.
///
/// Installed as an application interceptor it logs once per call; as a
/// network interceptor it logs every attempt, including the headers added by
/// the bridge stage. Lines go to `tracing::info!` under the
/// `hopchain::http` target unless another sink is set.
///
/// # Example
///
/// ```no_run
/// use hopchain_client::{Client, LogLevel, LoggingInterceptor};
///
/// let logging = LoggingInterceptor::new(LogLevel::Headers).redact_header("authorization");
/// let client = Client::builder().add_network_interceptor(logging).build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct LoggingInterceptor {
    level: LogLevel,
    redacted: Vec<HeaderName>,
    sink: Sink,
}

impl fmt::Debug for LoggingInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingInterceptor")
            .field("level", &self.level)
            .field("redacted", &self.redacted)
            .finish_non_exhaustive()
    }
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

impl LoggingInterceptor {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            redacted: Vec::new(),
            sink: Arc::new(|line: &str| tracing::info!(target: "hopchain::http", "{}", line)),
        }
    }

    /// Replace the value of `name` with `██` in logged headers.
    ///
    /// Invalid header names are ignored.
    pub fn redact_header(mut self, name: &str) -> Self {
        if let Ok(name) = HeaderName::try_from(name) {
            self.redacted.push(name);
        }
        self
    }

    /// Send log lines to `sink` instead of `tracing`.
    pub fn with_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.sink = Arc::new(sink);
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn log(&self, line: &str) {
        (self.sink)(line)
    }

    fn log_headers(&self, headers: &HeaderMap) {
        for (name, value) in headers {
            if self.redacted.contains(name) {
                self.log(&format!("{}: ██", name));
            } else {
                self.log(&format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes())));
            }
        }
    }

    fn log_body(&self, end: &str, body: &[u8]) {
        match std::str::from_utf8(body) {
            Ok(text) if !text.is_empty() => {
                self.log("");
                self.log(text);
                self.log(&format!("{} ({}-byte body)", end, body.len()));
            }
            Ok(_) => self.log(end),
            Err(_) => self.log(&format!("{} (binary {}-byte body omitted)", end, body.len())),
        }
    }
}

impl Interceptor for LoggingInterceptor {
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
        if self.level == LogLevel::None {
            return chain.proceed(chain.request().clone());
        }

        let request = chain.request();
        let body_len = request.body().map_or(0, |body| body.len());
        if self.level == LogLevel::Basic && body_len > 0 {
            self.log(&format!("--> {} {} ({}-byte body)", request.method(), request.uri(), body_len));
        } else {
            self.log(&format!("--> {} {}", request.method(), request.uri()));
        }
        if self.level >= LogLevel::Headers {
            self.log_headers(request.headers());
            let end = format!("--> END {}", request.method());
            match request.body() {
                Some(body) if self.level == LogLevel::Body => self.log_body(&end, body),
                _ => self.log(&end),
            }
        }

        let started = Instant::now();
        let response = match chain.proceed(request.clone()) {
            Ok(response) => response,
            Err(e) => {
                self.log(&format!("<-- HTTP FAILED: {}", e));
                return Err(e);
            }
        };
        let took_ms = started.elapsed().as_millis();

        let response_len = response.body().map_or(0, |body| body.len());
        self.log(&format!(
            "<-- {} {} ({}ms, {}-byte body)",
            response.status(),
            response.request().uri(),
            took_ms,
            response_len
        ));
        if self.level >= LogLevel::Headers {
            self.log_headers(response.headers());
            match response.body() {
                Some(body) if self.level == LogLevel::Body => self.log_body("<-- END HTTP", body.bytes()),
                _ => self.log("<-- END HTTP"),
            }
        }

        Ok(response)
    }

    fn name(&self) -> std::borrow::Cow<'static, str> {
        "LoggingInterceptor".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Echo, run};
    use std::sync::Mutex;

    fn capture(interceptor: LoggingInterceptor) -> (Arc<Mutex<Vec<String>>>, Vec<Arc<dyn Interceptor>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let interceptor = interceptor.with_sink(move |line| sink.lock().unwrap().push(line.to_string()));
        (lines, vec![Arc::new(interceptor), Arc::new(Echo)])
    }

    #[test]
    fn test_none_logs_nothing() {
        let (lines, stages) = capture(LoggingInterceptor::new(LogLevel::None));
        run(&stages, "http://localhost/").unwrap();
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn test_basic() {
        let (lines, stages) = capture(LoggingInterceptor::new(LogLevel::Basic));
        run(&stages, "http://localhost/users").unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "--> GET http://localhost/users");
        assert!(lines[1].starts_with("<-- 200 OK http://localhost/users ("));
        assert!(lines[1].ends_with("ms, 2-byte body)"));
    }

    #[test]
    fn test_headers_redacted() {
        let (lines, stages) = capture(
            LoggingInterceptor::new(LogLevel::Body).redact_header("authorization"),
        );
        let stages: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(crate::HeaderInterceptor::new("authorization", "Bearer secret").unwrap()),
            stages[0].clone(),
            stages[1].clone(),
        ];
        run(&stages, "http://localhost/").unwrap();

        let lines = lines.lock().unwrap();
        assert!(lines.contains(&"authorization: ██".to_string()));
        assert!(!lines.iter().any(|line| line.contains("secret")));
        assert!(lines.contains(&"--> END GET".to_string()));
        assert!(lines.contains(&"ok".to_string()));
        assert_eq!(lines.last().unwrap(), "<-- END HTTP (2-byte body)");
    }

    #[test]
    fn test_failure_logged() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = lines.clone();
        let logging = LoggingInterceptor::new(LogLevel::Basic)
            .with_sink(move |line| sink.lock().unwrap().push(line.to_string()));
        let stages: Vec<Arc<dyn Interceptor>> =
            vec![Arc::new(logging), Arc::new(crate::CallServerInterceptor)];

        let err = run(&stages, "http://localhost/").unwrap_err();
        assert!(matches!(err, ChainError::NoExchange));
        assert_eq!(
            lines.lock().unwrap().last().unwrap(),
            "<-- HTTP FAILED: no exchange attached to the chain"
        );
    }
}
