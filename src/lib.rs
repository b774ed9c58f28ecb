//! Typed view props for a client-side renderer.
//!
//! - `descriptor`: type-level shape of props records
//! - `schema`: descriptor → JSON-Schema-ish document
//! - `registry`: every declared props type, exported as one schema
//! - `envelope`: props + `template_name`/`csrf_token`/`messages` on the wire
//! - `view`: binds a props function to a request handler
//! - `form`: host form objects → plain props records
pub mod cli;
pub mod descriptor;
pub mod envelope;
pub mod error;
pub mod form;
pub mod host;
pub mod message;
pub mod path_de;
pub mod registry;
pub mod schema;
pub mod view;

pub use descriptor::{Describe, RecordDescriptor, RecordType, TypeDescriptor};
pub use envelope::Envelope;
pub use error::{DescriptorError, EnvelopeError, ParamsError, RegistryError, ViewError};
pub use host::{HostRequest, HttpResponse, RequestContext, ViewOutput};
pub use message::Message;
pub use registry::TypeRegistry;
pub use view::{ssr, ssr_with_params, to_title, BoundView, ViewSet, CONTENT_TYPE};
