//! HTML pages for the session login and logout views.
//!
//! Views build a [`PageContext`] and hand it to a [`PageRenderer`] together
//! with a configured template name, so neither the template nor the renderer
//! is baked into the view.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;

use crate::domain::Error;

/// Default template for the credential form.
pub const LOGIN_TEMPLATE: &str = "api/registration/login.html";
/// Default template shown after logout.
pub const LOGGED_OUT_TEMPLATE: &str = "api/registration/logged_out.html";
/// Default landing page after a successful login.
pub const DEFAULT_LOGIN_REDIRECT: &str = "/admin/";

/// Bound login form: echoed input plus validation messages.
///
/// The password is never echoed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    /// Messages not tied to a single field.
    pub non_field_errors: Vec<String>,
    /// Messages keyed by field name.
    pub field_errors: BTreeMap<&'static str, Vec<String>>,
}

impl LoginForm {
    pub fn unbound() -> Self {
        Self::default()
    }
}

/// Values a page template may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub title: String,
    /// `username` when authenticated, `AnonymousUser` otherwise.
    pub user: String,
    pub form: Option<LoginForm>,
    /// Post-login target carried through the form.
    pub next: Option<String>,
}

/// Turns a template name and a context into an HTML document.
pub trait PageRenderer: Send + Sync {
    fn render(&self, template: &str, context: &PageContext) -> Result<String, Error>;
}

/// Template names rejected when building the HTML renderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateConfigError {
    #[error("{setting} must name a template")]
    Blank { setting: &'static str },
    #[error("login and logged-out pages cannot share the template {name:?}")]
    Shared { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Login,
    LoggedOut,
}

/// Built-in renderer drawing the login and logged-out pages under the
/// template names chosen in [`AuthViewConfig`].
#[derive(Debug, Clone)]
pub struct HtmlPageRenderer {
    pages: HashMap<String, Page>,
}

impl HtmlPageRenderer {
    /// Register both pages under the configured names.
    ///
    /// # Errors
    ///
    /// Fails when a name is blank or both pages use the same name.
    pub fn new(config: &AuthViewConfig) -> Result<Self, TemplateConfigError> {
        let login = config.login_template.trim();
        let logged_out = config.logged_out_template.trim();
        if login.is_empty() {
            return Err(TemplateConfigError::Blank {
                setting: "login_template",
            });
        }
        if logged_out.is_empty() {
            return Err(TemplateConfigError::Blank {
                setting: "logged_out_template",
            });
        }
        if login == logged_out {
            return Err(TemplateConfigError::Shared {
                name: login.to_owned(),
            });
        }
        Ok(Self {
            pages: HashMap::from([
                (config.login_template.clone(), Page::Login),
                (config.logged_out_template.clone(), Page::LoggedOut),
            ]),
        })
    }
}

impl PageRenderer for HtmlPageRenderer {
    fn render(&self, template: &str, context: &PageContext) -> Result<String, Error> {
        let body = match self.pages.get(template) {
            Some(Page::Login) => login_body(context),
            Some(Page::LoggedOut) => logged_out_body(),
            None => return Err(Error::internal(format!("unknown template: {template}"))),
        };
        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body>\n<header><span id=\"user\">{user}</span></header>\n<main>\n{body}</main>\n</body>\n</html>\n",
            title = escape(&context.title),
            user = escape(&context.user),
        ))
    }
}

fn error_list(out: &mut String, messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    out.push_str("<ul class=\"errorlist\">");
    for message in messages {
        let _ = write!(out, "<li>{}</li>", escape(message));
    }
    out.push_str("</ul>\n");
}

fn login_body(context: &PageContext) -> String {
    let form = context.form.clone().unwrap_or_default();
    let mut out = String::from("<form method=\"post\" action=\"\">\n");
    error_list(&mut out, &form.non_field_errors);
    for (field, input_type, value) in [
        ("username", "text", form.username.as_str()),
        ("password", "password", ""),
    ] {
        if let Some(messages) = form.field_errors.get(field) {
            error_list(&mut out, messages);
        }
        let _ = writeln!(
            out,
            "<label for=\"id_{field}\">{field}</label> \
             <input type=\"{input_type}\" name=\"{field}\" id=\"id_{field}\" value=\"{}\" required>",
            escape(value),
        );
    }
    if let Some(next) = &context.next {
        let _ = writeln!(
            out,
            "<input type=\"hidden\" name=\"next\" value=\"{}\">",
            escape(next)
        );
    }
    out.push_str("<input type=\"submit\" value=\"Log in\">\n</form>\n");
    out
}

fn logged_out_body() -> String {
    "<p>Thanks for spending some quality time with the web site today.</p>\n\
     <p><a href=\"../login/\">Log in again</a></p>\n"
        .to_owned()
}

/// Escape text for HTML element content and quoted attributes.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Injected configuration for the login and logout views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthViewConfig {
    pub login_template: String,
    pub logged_out_template: String,
    pub login_redirect: String,
}

impl Default for AuthViewConfig {
    fn default() -> Self {
        Self {
            login_template: LOGIN_TEMPLATE.to_owned(),
            logged_out_template: LOGGED_OUT_TEMPLATE.to_owned(),
            login_redirect: DEFAULT_LOGIN_REDIRECT.to_owned(),
        }
    }
}

/// Configuration and renderer shared by the auth views.
#[derive(Clone)]
pub struct AuthViews {
    pub config: AuthViewConfig,
    pub renderer: Arc<dyn PageRenderer>,
}

impl AuthViews {
    pub fn new(config: AuthViewConfig, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { config, renderer }
    }

    /// Views drawn by [`HtmlPageRenderer`] under the configured template names.
    ///
    /// # Errors
    ///
    /// See [`HtmlPageRenderer::new`].
    pub fn html(config: AuthViewConfig) -> Result<Self, TemplateConfigError> {
        let renderer = HtmlPageRenderer::new(&config)?;
        Ok(Self::new(config, Arc::new(renderer)))
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use recording::RecordingPageRenderer;

#[cfg(any(test, feature = "test-support"))]
mod recording {
    use std::sync::Mutex;

    use super::{PageContext, PageRenderer};
    use crate::domain::Error;

    /// Renderer that remembers every call, for asserting on view context.
    #[derive(Debug, Default)]
    pub struct RecordingPageRenderer {
        calls: Mutex<Vec<(String, PageContext)>>,
    }

    impl RecordingPageRenderer {
        /// Template and context of the most recent render.
        pub fn last(&self) -> Option<(String, PageContext)> {
            self.calls
                .lock()
                .ok()
                .and_then(|calls| calls.last().cloned())
        }
    }

    impl PageRenderer for RecordingPageRenderer {
        fn render(&self, template: &str, context: &PageContext) -> Result<String, Error> {
            self.calls
                .lock()
                .map_err(|_| Error::internal("renderer lock poisoned"))?
                .push((template.to_owned(), context.clone()));
            Ok(format!("{template}|{}", context.user))
        }
    }
}
