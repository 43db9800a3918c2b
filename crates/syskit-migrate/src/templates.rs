//! Document templates.

use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use syskit_doc::SectionBody;

/// Template names and sources, compiled into the binary.
const TEMPLATES: &[(&str, &str)] = &[
    ("req_user_story", include_str!("../templates/req_user_story.md.hbs")),
    ("req_functional", include_str!("../templates/req_functional.md.hbs")),
    ("req_non_functional", include_str!("../templates/req_non_functional.md.hbs")),
    ("int_contract", include_str!("../templates/int_contract.md.hbs")),
    ("int_external", include_str!("../templates/int_external.md.hbs")),
    ("unit", include_str!("../templates/unit.md.hbs")),
    ("adr", include_str!("../templates/adr.md.hbs")),
];

/// Note written after the sentinel in sections `syskit trace` fills in.
pub const TRACE_NOTE: &str = "(will be filled by syskit trace)";

handlebars_helper!(lower: |s: str| s.to_lowercase());

/// Renders generated documents.
pub struct DocRenderer {
    handlebars: Handlebars<'static>,
}

impl DocRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();

        // Missing fields are template bugs, not empty strings
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("lower", Box::new(lower));

        for (name, source) in TEMPLATES {
            handlebars.register_template_string(name, *source)?;
        }

        Ok(Self { handlebars })
    }

    /// Render template `name` with `data`.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        Ok(self.handlebars.render(name, data)?)
    }
}

/// Placeholder for sections the traceability pass resolves.
pub fn trace_placeholder() -> String {
    SectionBody::pending(TRACE_NOTE).to_string()
}

/// Placeholder for sections left to document authors.
pub fn open_placeholder() -> String {
    SectionBody::pending("").to_string()
}

/// Template errors.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),
}
