use std::collections::BTreeMap;

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use ssr_props::cli::CommandLineInterface;
use ssr_props::descriptor::{Describe, TypeDescriptor};
use ssr_props::form::{serialize_form, FormType, HostField, HostForm, Label};
use ssr_props::{registry, ssr, ssr_with_params, HostRequest, HttpResponse, ViewOutput, ViewSet};

// ————————————————————————————————————————————————————————————————————————————
// PROPS
// ————————————————————————————————————————————————————————————————————————————

ssr_props::record! {
    #[derive(Debug, Serialize)]
    pub struct HomeProps {
        pub greeting: String,
        pub tags: Vec<String>,
        pub visits: u32,
        pub is_staff: bool,
    }
}

/// A badge is either a text label or a counter.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Badge {
    Text(String),
    Count(u32),
}

impl Describe for Badge {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::union([TypeDescriptor::string(), TypeDescriptor::number()])
    }
}

ssr_props::record! {
    #[derive(Debug, Serialize)]
    pub struct ArticleProps {
        pub slug: String,
        pub title: String,
        pub page: u32,
        pub badges: Vec<Badge>,
        pub metadata: BTreeMap<String, String>,
        pub summary: Option<String>,
    }
}

#[derive(Debug, Deserialize)]
pub struct ArticleParams {
    pub slug: String,
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 { 1 }

ssr_props::record! {
    #[derive(Debug, Serialize)]
    pub struct ContactProps {
        pub form: Option<FormType>,
        pub sent: bool,
    }
}

ssr_props::record! {
    #[derive(Debug, Serialize)]
    pub struct LogoutProps {
        pub next: String,
    }
}

#[derive(Debug, Deserialize)]
pub struct LogoutParams {
    pub next: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// DEMO HOST FORM
// ————————————————————————————————————————————————————————————————————————————

struct DemoField {
    name: &'static str,
    label: &'static str,
    input_type: &'static str,
}

impl HostField for DemoField {
    fn name(&self) -> &str { self.name }
    fn label(&self) -> Label {
        let label = self.label;
        Label::deferred(move || label.to_string())
    }
    fn widget(&self) -> Value {
        json!({ "name": self.name, "input_type": self.input_type, "attrs": {} })
    }
}

struct DemoContactForm {
    fields: Vec<DemoField>,
}

impl DemoContactForm {
    fn new() -> Self {
        Self {
            fields: vec![
                DemoField { name: "email", label: "Email", input_type: "email" },
                DemoField { name: "message", label: "Message", input_type: "textarea" },
            ],
        }
    }
}

impl HostForm for DemoContactForm {
    fn fields(&self) -> Vec<&dyn HostField> {
        self.fields.iter().map(|f| f as &dyn HostField).collect()
    }
    fn errors(&self) -> IndexMap<String, Option<Vec<String>>> { IndexMap::new() }
    fn is_valid(&self) -> bool { true }
}

// ————————————————————————————————————————————————————————————————————————————
// VIEWS
// ————————————————————————————————————————————————————————————————————————————

fn declare_views() -> anyhow::Result<ViewSet> {
    let mut views = ViewSet::new();

    views.add(ssr("home_page", |_request: &dyn HostRequest| {
        Ok(ViewOutput::Props(HomeProps {
            greeting: "Hello".to_string(),
            tags: vec!["news".to_string(), "rust".to_string()],
            visits: 3,
            is_staff: false,
        }))
    })?);

    views.add(ssr_with_params("article_detail", |_request: &dyn HostRequest, params: ArticleParams| {
        let mut metadata = BTreeMap::new();
        metadata.insert("author".to_string(), "staff".to_string());
        Ok(ViewOutput::Props(ArticleProps {
            title: params.slug.replace('-', " "),
            slug: params.slug,
            page: params.page,
            badges: vec![Badge::Text("new".to_string()), Badge::Count(2)],
            metadata,
            summary: None,
        }))
    })?);

    views.add(ssr("contact_page", |_request: &dyn HostRequest| {
        let form = DemoContactForm::new();
        Ok(ViewOutput::Props(ContactProps {
            form: serialize_form(Some(&form)),
            sent: false,
        }))
    })?);

    views.add(ssr_with_params("logout", |_request: &dyn HostRequest, params: LogoutParams| {
        let next = params.next.unwrap_or_else(|| "/".to_string());
        let out: ViewOutput<LogoutProps> = HttpResponse::redirect(next).into();
        Ok(out)
    })?);

    Ok(views)
}

fn main() -> anyhow::Result<()> {
    let command_line_interface = CommandLineInterface::load();
    command_line_interface.init_tracing();

    let views = declare_views().context("failed to declare views")?;
    registry::freeze();

    command_line_interface.run(&views)
}
