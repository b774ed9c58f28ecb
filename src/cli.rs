//! Minimal CLI: declared views → (schema | views | render)
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::host::{HttpResponse, RequestContext};
use crate::message::Message;
use crate::view::{Kwargs, ViewSet};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// export the props schema of the declared views, or render one of them
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print or write the aggregate JSON schema
    Schema(SchemaOut),
    /// list declared views and their template names
    Views,
    /// run one view through the full request path and print the response
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct SchemaOut {
    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// declared view name, e.g. home_page
    view: String,

    /// CSRF token the request should report
    #[arg(long, default_value = "dev-token")]
    csrf_token: String,

    /// request keyword input as KEY=VALUE; VALUE is passed as a string, like a route capture
    #[arg(long = "kwarg", value_parser = parse_kwarg)]
    kwargs: Vec<(String, Value)>,

    /// typed request keyword input as KEY=JSON (e.g. page=2)
    #[arg(long = "kwarg-json", value_parser = parse_kwarg_json)]
    json_kwargs: Vec<(String, Value)>,

    /// pending notification as LEVEL:TEXT (e.g. success:Saved)
    #[arg(long = "message")]
    messages: Vec<Message>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// `RUST_LOG` wins; otherwise `--log-level`.
    pub fn init_tracing(&self) {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    pub fn run(&self, views: &ViewSet) -> Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                let schema_src = crate::registry::export_pretty().context("failed to serialize schema")?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("failed to create {}", parent.display()))?;
                    }
                    std::fs::write(out, &schema_src)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{schema_src}");
                }
            }
            Command::Views => {
                for view in views.iter() {
                    println!("{}\t{}\t{}", view.name(), view.template_name(), view.props_type());
                }
            }
            Command::Render(target) => {
                let response = target.render(views)?;
                println!("{} {}", response.status, response.content_type);
                for (name, value) in &response.headers {
                    println!("{name}: {value}");
                }
                println!();
                println!("{}", response.body);
            }
        }
        Ok(())
    }
}

impl RenderArgs {
    fn render(&self, views: &ViewSet) -> Result<HttpResponse> {
        let view = views
            .get(&self.view)
            .with_context(|| format!("no view named `{}`", self.view))?;
        let request = RequestContext {
            csrf_token: self.csrf_token.clone(),
            messages: self.messages.clone(),
        };
        // typed inputs win over plain ones for the same key
        let kwargs: Kwargs = self.kwargs.iter().chain(&self.json_kwargs).cloned().collect();
        view.call(&request, &kwargs)
            .with_context(|| format!("view `{}` failed", self.view))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn split_kwarg(raw: &str) -> Result<(&str, &str), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key, value))
}

fn parse_kwarg(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = split_kwarg(raw)?;
    Ok((key.to_string(), Value::from(value)))
}

fn parse_kwarg_json(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = split_kwarg(raw)?;
    let value = serde_json::from_str::<Value>(value)
        .map_err(|e| format!("invalid JSON for `{key}`: {e}"))?;
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostRequest, ViewOutput};
    use crate::registry::TypeRegistry;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[test]
    fn plain_kwargs_stay_strings() {
        assert_eq!(parse_kwarg("slug=2024").unwrap(), ("slug".to_string(), json!("2024")));
        assert_eq!(parse_kwarg("slug=intro").unwrap(), ("slug".to_string(), json!("intro")));
        assert_eq!(parse_kwarg("q=a=b").unwrap(), ("q".to_string(), json!("a=b")));
        assert!(parse_kwarg("novalue").is_err());
        assert!(parse_kwarg("=x").is_err());
    }

    #[test]
    fn json_kwargs_are_typed() {
        assert_eq!(parse_kwarg_json("page=2").unwrap(), ("page".to_string(), json!(2)));
        assert_eq!(parse_kwarg_json("tags=[\"a\"]").unwrap(), ("tags".to_string(), json!(["a"])));
        assert!(parse_kwarg_json("slug=intro").is_err());
    }

    #[derive(Debug, Deserialize)]
    struct ArticleParams {
        slug: String,
        page: Option<u32>,
    }

    crate::record! {
        #[derive(Debug, Serialize)]
        struct ArticleProps {
            slug: String,
            page: u32,
        }
    }

    fn article_views() -> ViewSet {
        let mut reg = TypeRegistry::new();
        let mut views = ViewSet::new();
        views.add(
            reg.bind_with_params("article_detail", |_req: &dyn HostRequest, params: ArticleParams| {
                Ok(ViewOutput::Props(ArticleProps { slug: params.slug, page: params.page.unwrap_or(1) }))
            })
            .unwrap(),
        );
        views
    }

    fn render_args(args: &[&str]) -> RenderArgs {
        let argv = ["ssr-props", "render"].iter().chain(args).copied();
        match CommandLineInterface::try_parse_from(argv).unwrap().cmd {
            Command::Render(target) => target,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn numeric_looking_slug_renders() {
        let target = render_args(&["article_detail", "--kwarg", "slug=2024", "--csrf-token", "T"]);
        let response = target.render(&article_views()).unwrap();
        assert_eq!(response.status, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["slug"], "2024");
        assert_eq!(body["page"], 1);
    }

    #[test]
    fn json_kwarg_feeds_typed_params() {
        let target = render_args(&["article_detail", "--kwarg", "slug=intro", "--kwarg-json", "page=3"]);
        let body: Value = serde_json::from_str(&target.render(&article_views()).unwrap().body).unwrap();
        assert_eq!(body["page"], 3);

        let target = render_args(&["article_detail", "--kwarg", "slug=intro", "--kwarg", "page=3"]);
        assert!(target.render(&article_views()).is_err());
    }

    #[test]
    fn render_args_parse() {
        let cli = CommandLineInterface::try_parse_from([
            "ssr-props", "render", "article_detail",
            "--kwarg", "slug=intro", "--message", "info:Hi", "--csrf-token", "T",
        ])
        .unwrap();
        match cli.cmd {
            Command::Render(args) => {
                assert_eq!(args.view, "article_detail");
                assert_eq!(args.csrf_token, "T");
                assert_eq!(args.kwargs, vec![("slug".to_string(), json!("intro"))]);
                assert_eq!(args.messages[0].level_tag, "info");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
