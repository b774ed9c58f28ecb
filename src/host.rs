//! What the combinator needs from the host web framework, and nothing more.
use crate::message::Message;

/// Per-request accessors the host provides.
pub trait HostRequest {
    fn csrf_token(&self) -> String;
    /// Pending notifications; read once per response.
    fn messages(&self) -> Vec<Message>;
}

/// Plain owned request state. Handy for tests, the CLI, and hosts with nothing fancier.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub csrf_token: String,
    pub messages: Vec<Message>,
}

impl RequestContext {
    pub fn new(csrf_token: impl Into<String>) -> Self {
        Self { csrf_token: csrf_token.into(), messages: Vec::new() }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

impl HostRequest for RequestContext {
    fn csrf_token(&self) -> String {
        self.csrf_token.clone()
    }
    fn messages(&self) -> Vec<Message> {
        self.messages.clone()
    }
}

/// A finished HTTP-level response. Views may return one directly to skip the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: content_type.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            content_type: "text/html; charset=utf-8".to_string(),
            headers: vec![("Location".to_string(), location.into())],
            body: String::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What a view hands back: props to wrap, or a finished response to pass through.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutput<P> {
    Props(P),
    Response(HttpResponse),
}

impl<P> From<HttpResponse> for ViewOutput<P> {
    fn from(response: HttpResponse) -> Self {
        Self::Response(response)
    }
}
