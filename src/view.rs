//! View binding: turn a "compute props" function into a request handler.
//!
//! Declaring a view registers its props record under the view's template name
//! (`home_page` → `HomePage`). Calling the bound view runs the function, then either passes
//! a raw response through or wraps the props in an `Envelope` served as
//! `application/ssr+json`. Errors from the view or from parameter decoding are returned
//! as-is; nothing here retries or recovers.
use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::descriptor::RecordType;
use crate::envelope::Envelope;
use crate::error::{RegistryError, ViewError};
use crate::host::{HostRequest, HttpResponse, ViewOutput};
use crate::registry::{self, TypeRegistry};

pub const CONTENT_TYPE: &str = "application/ssr+json";

/// Request keyword inputs (route captures and the like).
pub type Kwargs = Map<String, Value>;

type Handler = dyn Fn(&dyn HostRequest, &Kwargs) -> Result<HttpResponse, ViewError> + Send + Sync;

// ————————————————————————————————————————————————————————————————————————————
// NAMING
// ————————————————————————————————————————————————————————————————————————————

/// `home_page` → `HomePage`: split on `_`, title-case each segment, concatenate.
///
/// Title-casing uppercases the first letter of every run of letters and lowercases the
/// rest, so `page2view` → `Page2View` and `HTML_page` → `HtmlPage`.
pub fn to_title(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    for segment in snake.split('_') {
        let mut prev_cased = false;
        for c in segment.chars() {
            if c.is_alphabetic() {
                if prev_cased {
                    out.extend(c.to_lowercase());
                } else {
                    out.extend(c.to_uppercase());
                }
                prev_cased = true;
            } else {
                out.push(c);
                prev_cased = false;
            }
        }
    }
    out
}

// ————————————————————————————————————————————————————————————————————————————
// BOUND VIEW
// ————————————————————————————————————————————————————————————————————————————

pub struct BoundView {
    name: String,
    template_name: String,
    props_type: String,
    handler: Box<Handler>,
}

impl BoundView {
    pub fn name(&self) -> &str { &self.name }
    pub fn template_name(&self) -> &str { &self.template_name }
    pub fn props_type(&self) -> &str { &self.props_type }

    pub fn call(&self, request: &dyn HostRequest, kwargs: &Kwargs) -> Result<HttpResponse, ViewError> {
        (self.handler)(request, kwargs)
    }
}

impl fmt::Debug for BoundView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundView")
            .field("name", &self.name)
            .field("template_name", &self.template_name)
            .field("props_type", &self.props_type)
            .finish_non_exhaustive()
    }
}

/// Pass a raw response through, or wrap props in the envelope.
pub fn render<P: Serialize>(
    request: &dyn HostRequest,
    template_name: &str,
    output: ViewOutput<P>,
) -> Result<HttpResponse, ViewError> {
    let props = match output {
        ViewOutput::Response(response) => {
            tracing::debug!(template = template_name, status = response.status, "view returned a raw response");
            return Ok(response);
        }
        ViewOutput::Props(props) => props,
    };
    let envelope = Envelope::build(&props, template_name, request.csrf_token(), request.messages())?;
    let body = envelope.to_json().map_err(crate::error::EnvelopeError::from)?;
    Ok(HttpResponse::ok(CONTENT_TYPE, body))
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeRegistry {
    /// Declare a view that takes only the request.
    pub fn bind<P, F>(&mut self, name: &str, view: F) -> Result<BoundView, RegistryError>
    where
        P: RecordType + Serialize + 'static,
        F: Fn(&dyn HostRequest) -> anyhow::Result<ViewOutput<P>> + Send + Sync + 'static,
    {
        let template_name = self.declare::<P>(name)?;
        let tn = template_name.clone();
        let handler = move |request: &dyn HostRequest, _kwargs: &Kwargs| -> Result<HttpResponse, ViewError> {
            let output = view(request).map_err(ViewError::View)?;
            render(request, &tn, output)
        };
        Ok(bound::<P>(name, template_name, Box::new(handler)))
    }

    /// Declare a view whose parameter record is built from the request's keyword inputs.
    pub fn bind_with_params<P, K, F>(&mut self, name: &str, view: F) -> Result<BoundView, RegistryError>
    where
        P: RecordType + Serialize + 'static,
        K: DeserializeOwned + 'static,
        F: Fn(&dyn HostRequest, K) -> anyhow::Result<ViewOutput<P>> + Send + Sync + 'static,
    {
        let template_name = self.declare::<P>(name)?;
        let tn = template_name.clone();
        let handler = move |request: &dyn HostRequest, kwargs: &Kwargs| -> Result<HttpResponse, ViewError> {
            let params = crate::path_de::from_kwargs::<K>(kwargs)?;
            let output = view(request, params).map_err(ViewError::View)?;
            render(request, &tn, output)
        };
        Ok(bound::<P>(name, template_name, Box::new(handler)))
    }

    fn declare<P: RecordType>(&mut self, name: &str) -> Result<String, RegistryError> {
        let template_name = to_title(name);
        self.register(&template_name, P::record_descriptor())?;
        Ok(template_name)
    }
}

fn bound<P: RecordType>(name: &str, template_name: String, handler: Box<Handler>) -> BoundView {
    BoundView {
        name: name.to_string(),
        template_name,
        props_type: P::record_descriptor().name,
        handler,
    }
}

/// `TypeRegistry::bind` against the process-wide registry.
pub fn ssr<P, F>(name: &str, view: F) -> Result<BoundView, RegistryError>
where
    P: RecordType + Serialize + 'static,
    F: Fn(&dyn HostRequest) -> anyhow::Result<ViewOutput<P>> + Send + Sync + 'static,
{
    registry::global().write().bind(name, view)
}

/// `TypeRegistry::bind_with_params` against the process-wide registry.
pub fn ssr_with_params<P, K, F>(name: &str, view: F) -> Result<BoundView, RegistryError>
where
    P: RecordType + Serialize + 'static,
    K: DeserializeOwned + 'static,
    F: Fn(&dyn HostRequest, K) -> anyhow::Result<ViewOutput<P>> + Send + Sync + 'static,
{
    registry::global().write().bind_with_params(name, view)
}

// ————————————————————————————————————————————————————————————————————————————
// VIEW SET
// ————————————————————————————————————————————————————————————————————————————

/// Bound views by declared name, in declaration order.
#[derive(Debug, Default)]
pub struct ViewSet {
    views: IndexMap<String, BoundView>,
}

impl ViewSet {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, view: BoundView) -> &mut Self {
        self.views.insert(view.name.clone(), view);
        self
    }

    pub fn get(&self, name: &str) -> Option<&BoundView> {
        self.views.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundView> {
        self.views.values()
    }

    pub fn len(&self) -> usize { self.views.len() }
    pub fn is_empty(&self) -> bool { self.views.is_empty() }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RequestContext;
    use crate::message::{Message, INFO};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    crate::record! {
        #[derive(Debug, Serialize)]
        struct Greeting {
            greeting: String,
            tags: Vec<String>,
        }
    }

    #[derive(Debug, Deserialize)]
    struct ArticleParams {
        slug: String,
    }

    fn kwargs(v: Value) -> Kwargs {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn to_title_examples() {
        assert_eq!(to_title("home_page"), "HomePage");
        assert_eq!(to_title("x"), "X");
        assert_eq!(to_title("a_b_c"), "ABC");
        assert_eq!(to_title("page2view"), "Page2View");
        assert_eq!(to_title("HTML_page"), "HtmlPage");
        assert_eq!(to_title("double__under"), "DoubleUnder");
        assert_eq!(to_title(""), "");
    }

    #[test]
    fn bound_view_renders_envelope() {
        let mut reg = TypeRegistry::new();
        let view = reg
            .bind("greeting", |_req: &dyn HostRequest| {
                Ok(ViewOutput::Props(Greeting { greeting: "hi".into(), tags: vec!["a".into()] }))
            })
            .unwrap();
        assert_eq!(view.template_name(), "Greeting");
        assert_eq!(view.props_type(), "Greeting");
        assert!(reg.get("Greeting").is_some());

        let response = view.call(&RequestContext::new("T"), &Kwargs::new()).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "application/ssr+json");
        assert_eq!(
            serde_json::from_str::<Value>(&response.body).unwrap(),
            json!({
                "greeting": "hi",
                "tags": ["a"],
                "template_name": "Greeting",
                "csrf_token": "T",
                "messages": [],
            }),
        );
    }

    #[test]
    fn pending_messages_are_included() {
        let mut reg = TypeRegistry::new();
        let view = reg
            .bind("home_page", |_req: &dyn HostRequest| {
                Ok(ViewOutput::Props(Greeting { greeting: "yo".into(), tags: Vec::new() }))
            })
            .unwrap();
        let req = RequestContext::new("tok").with_message(Message::new(INFO, "Welcome back"));
        let response = view.call(&req, &Kwargs::new()).unwrap();
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["template_name"], "HomePage");
        assert_eq!(body["messages"], json!([{"level": 20, "level_tag": "info", "message": "Welcome back"}]));
        // registered under the template name, titled by the record
        assert_eq!(reg.export()["properties"]["HomePage"]["title"], "Greeting");
    }

    #[test]
    fn raw_response_bypasses_envelope() {
        let mut reg = TypeRegistry::new();
        let view = reg
            .bind("logout", |_req: &dyn HostRequest| -> anyhow::Result<ViewOutput<Greeting>> {
                Ok(HttpResponse::redirect("/login").into())
            })
            .unwrap();
        let response = view.call(&RequestContext::new("T"), &Kwargs::new()).unwrap();
        assert_eq!(response, HttpResponse::redirect("/login"));
        assert_eq!(response.header("location"), Some("/login"));
    }

    #[test]
    fn params_are_built_from_kwargs() {
        let mut reg = TypeRegistry::new();
        let view = reg
            .bind_with_params("article_detail", |_req: &dyn HostRequest, params: ArticleParams| {
                Ok(ViewOutput::Props(Greeting { greeting: params.slug, tags: Vec::new() }))
            })
            .unwrap();
        let response = view
            .call(&RequestContext::new("T"), &kwargs(json!({"slug": "intro"})))
            .unwrap();
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["greeting"], "intro");
        assert_eq!(body["template_name"], "ArticleDetail");

        let err = view
            .call(&RequestContext::new("T"), &kwargs(json!({"slug": 3})))
            .unwrap_err();
        match err {
            ViewError::Params(p) => assert_eq!(p.path, "slug"),
            other => panic!("expected params error, got {other:?}"),
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("database unavailable")]
    struct Unavailable;

    #[test]
    fn view_errors_propagate_unchanged() {
        let mut reg = TypeRegistry::new();
        let view = reg
            .bind("broken", |_req: &dyn HostRequest| -> anyhow::Result<ViewOutput<Greeting>> {
                Err(Unavailable.into())
            })
            .unwrap();
        let err = view.call(&RequestContext::new("T"), &Kwargs::new()).unwrap_err();
        match err {
            ViewError::View(inner) => assert!(inner.downcast_ref::<Unavailable>().is_some()),
            other => panic!("expected view error, got {other:?}"),
        }
    }

    #[test]
    fn conflicting_declarations_fail() {
        crate::record! {
            #[derive(Debug, Serialize)]
            struct Other {
                count: u32,
            }
        }
        let mut reg = TypeRegistry::new();
        reg.bind("home_page", |_req: &dyn HostRequest| {
            Ok(ViewOutput::Props(Greeting { greeting: String::new(), tags: Vec::new() }))
        })
        .unwrap();
        let err = reg
            .bind("home_page", |_req: &dyn HostRequest| Ok(ViewOutput::Props(Other { count: 1 })))
            .unwrap_err();
        assert!(matches!(err, RegistryError::NameCollision { .. }));
    }

    #[test]
    fn ssr_registers_in_the_global_registry() {
        let view = ssr("global_probe_page", |_req: &dyn HostRequest| {
            Ok(ViewOutput::Props(Greeting { greeting: "g".into(), tags: Vec::new() }))
        })
        .unwrap();
        assert_eq!(view.template_name(), "GlobalProbePage");
        assert!(registry::global().read().get("GlobalProbePage").is_some());
    }

    #[test]
    fn view_set_dispatches_by_name() {
        let mut reg = TypeRegistry::new();
        let mut views = ViewSet::new();
        views.add(
            reg.bind("greeting", |_req: &dyn HostRequest| {
                Ok(ViewOutput::Props(Greeting { greeting: "hi".into(), tags: Vec::new() }))
            })
            .unwrap(),
        );
        assert_eq!(views.len(), 1);
        assert!(views.get("greeting").is_some());
        assert!(views.get("Greeting").is_none());
        assert_eq!(views.iter().map(BoundView::template_name).collect::<Vec<_>>(), ["Greeting"]);
    }
}
