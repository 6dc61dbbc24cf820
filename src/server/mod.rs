//! HTTP server rendering templates per request
//!
//! `GET /docs/intro` renders `docs/intro.<ext>` from the template directory.
//! The request is exposed to templates as `request.path`, `request.query`
//! and `request.params`.

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::engine::Engine;
use crate::error::{MustacheError, Result as RenderResult};
use crate::render::{Context, Deadline, Mapping, OutputCollector, RenderHost, Value};
use crate::template::Template;

/// Content type used when no `content-type` pragma is present
const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Capabilities templates may ask for with `{{%require:...}}`
const CAPABILITIES: &[&str] = &["request"];

/// Server state
struct ServerState {
    engine: Engine,
    data: Mapping,
    timeout: Duration,
}

/// Host for one HTTP request
pub struct RequestHost {
    path: String,
    query: String,
    deadline: Deadline,
    content_type: Mutex<Option<String>>,
}

impl RequestHost {
    pub fn new(path: &str, query: Option<&str>, timeout: Duration) -> Self {
        Self {
            path: path.to_string(),
            query: query.unwrap_or("").to_string(),
            deadline: Deadline::after(timeout),
            content_type: Mutex::new(None),
        }
    }

    /// Content type requested by a pragma, or the HTML default
    pub fn content_type(&self) -> String {
        self.content_type
            .lock()
            .ok()
            .and_then(|ct| ct.clone())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
    }
}

impl RenderHost for RequestHost {
    fn values_for_context(&self, _context: &Context<'_>, _output: &OutputCollector) -> RenderResult<Mapping> {
        let mut request = Mapping::new();
        request.insert("path".to_string(), Value::from(self.path.as_str()));
        request.insert("query".to_string(), Value::from(self.query.as_str()));
        request.insert("params".to_string(), Value::Map(parse_query(&self.query)));

        let mut values = Mapping::new();
        values.insert("request".to_string(), Value::Map(request));
        Ok(values)
    }

    fn inspect_pragmas(&self, template: &Template) -> RenderResult<()> {
        for pragma in template.collected_pragmas() {
            if let Some(capability) = pragma.get("require") {
                if !CAPABILITIES.iter().any(|c| *c == capability) {
                    return Err(MustacheError::Evaluation(format!(
                        "{} requires capability {:?}, which this server does not provide",
                        template.name(),
                        capability
                    )));
                }
            }
            if let Some(content_type) = pragma.get("content-type") {
                if let Ok(mut ct) = self.content_type.lock() {
                    ct.get_or_insert_with(|| content_type.to_string());
                }
            }
        }
        Ok(())
    }

    fn should_continue(&self) -> bool {
        self.deadline.should_continue()
    }
}

/// Split a query string into decoded parameters
pub fn parse_query(query: &str) -> Mapping {
    let mut params = Mapping::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(key);
        let value = decode(value);
        params.insert(key, Value::from(value));
    }
    params
}

fn decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Template name for a request path; `None` for paths escaping the root
pub fn template_name(path: &str) -> Option<String> {
    let clean = path.trim_start_matches('/');
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }
    if clean.is_empty() {
        Some("index".to_string())
    } else if clean.ends_with('/') {
        Some(format!("{}index", clean))
    } else {
        Some(clean.to_string())
    }
}

/// Start the server
pub async fn start(engine: Engine, data: Mapping, ip: &str, port: u16, timeout: Duration) -> Result<()> {
    let state = Arc::new(ServerState {
        engine,
        data,
        timeout,
    });

    let app = Router::new()
        .fallback(render_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Render the template matching the request path
async fn render_handler(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let Some(name) = template_name(uri.path()) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };
    let host = RequestHost::new(uri.path(), uri.query(), state.timeout);

    let rendered = tokio::task::spawn_blocking(move || {
        let result = state.engine.render_path(&name, state.data.clone(), &host);
        (result, host.content_type())
    })
    .await;

    match rendered {
        Ok((Ok(body), content_type)) => {
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Ok((Err(MustacheError::TemplateNotFound(path)), _)) => {
            tracing::debug!("No template for {}: {:?}", uri.path(), path);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
        Ok((Err(e), _)) => {
            tracing::error!("Failed to render {}: {}", uri.path(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Render task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::source::MemorySource;

    fn engine(source: MemorySource) -> Engine {
        Engine::with_source(EngineConfig::default(), Arc::new(source))
    }

    #[test]
    fn test_template_name() {
        assert_eq!(template_name("/").as_deref(), Some("index"));
        assert_eq!(template_name("/docs/").as_deref(), Some("docs/index"));
        assert_eq!(template_name("/docs/intro").as_deref(), Some("docs/intro"));
        assert_eq!(template_name("/../etc/passwd"), None);
    }

    #[test]
    fn test_parse_query() {
        let params = parse_query("q=hello+world&lang=en&flag&x=%3Cb%3E");
        assert_eq!(params.get("q"), Some(&Value::from("hello world")));
        assert_eq!(params.get("lang"), Some(&Value::from("en")));
        assert_eq!(params.get("flag"), Some(&Value::from("")));
        assert_eq!(params.get("x"), Some(&Value::from("<b>")));
    }

    #[test]
    fn test_request_values_and_content_type() {
        let engine = engine(
            MemorySource::new()
                .with("feed.mustache", "{{%content-type:text/plain}}{{request.path}}?{{request.params.q}}"),
        );
        let host = RequestHost::new("/feed", Some("q=a%26b"), Duration::from_secs(5));
        let body = engine.render_path("feed", Mapping::new(), &host).unwrap();
        assert_eq!(body, "/feed?a&amp;b");
        assert_eq!(host.content_type(), "text/plain");
    }

    #[test]
    fn test_default_content_type() {
        let host = RequestHost::new("/", None, Duration::from_secs(5));
        assert_eq!(host.content_type(), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_missing_capability() {
        let engine = engine(
            MemorySource::new()
                .with("index.mustache", "{{>admin}}")
                .with("admin.mustache", "{{%require:database}}secret"),
        );
        let host = RequestHost::new("/", None, Duration::from_secs(5));
        let err = engine.render_path("index", Mapping::new(), &host).unwrap_err();
        assert!(matches!(err, MustacheError::Evaluation(msg) if msg.contains("database")));
    }

    #[test]
    fn test_expired_deadline_interrupts() {
        let engine = engine(MemorySource::new().with("index.mustache", "{{#a}}x{{/a}}"));
        let host = RequestHost::new("/", None, Duration::ZERO);
        let mut data = Mapping::new();
        data.insert("a".to_string(), Value::from(true));
        let err = engine.render_path("index", data, &host).unwrap_err();
        assert!(matches!(err, MustacheError::Interrupted));
    }
}
