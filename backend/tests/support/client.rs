//! In-process client for integration suites.
//!
//! Every request builds a fresh app from the shared [`TestHarness`], so the
//! fixed session key lets one app decrypt cookies issued by another. The
//! client keeps a one-cookie jar for the session and sends
//! `Host: testserver` so absolute links are predictable.

use std::cell::RefCell;
use std::future::Future;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderMap};
use actix_web::rt::{System, SystemRunner};
use actix_web::test;
use actix_web::web::Bytes;
use rest_auth::inbound::http::session_config::SESSION_COOKIE_NAME;
use rest_auth::test_support::{ADMIN_PASSWORD, ADMIN_USERNAME, TestHarness};
use serde_json::Value;

pub(crate) const HOST: &str = "testserver";

/// A recorded response.
#[derive(Debug)]
pub(crate) struct Reply {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Reply {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub(crate) fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("utf-8 body")
    }

    pub(crate) fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }
}

pub(crate) struct Client {
    runner: SystemRunner,
    harness: TestHarness,
    jar: RefCell<Option<Cookie<'static>>>,
}

impl Client {
    /// Client over a harness seeded with the administrator.
    pub(crate) fn seeded() -> Self {
        let runner = System::new();
        let harness = runner
            .block_on(TestHarness::seeded())
            .expect("seeded harness");
        Self::with_harness(runner, harness)
    }

    pub(crate) fn with_harness(runner: SystemRunner, harness: TestHarness) -> Self {
        Self {
            runner,
            harness,
            jar: RefCell::new(None),
        }
    }

    pub(crate) fn harness(&self) -> &TestHarness {
        &self.harness
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runner.block_on(future)
    }

    pub(crate) fn has_session(&self) -> bool {
        self.jar.borrow().is_some()
    }

    pub(crate) fn forget_session(&self) {
        self.jar.borrow_mut().take();
    }

    /// Send `request` with the jar cookie and record any session change.
    pub(crate) fn send(&self, request: test::TestRequest) -> Reply {
        let mut request = request.insert_header((header::HOST, HOST));
        if let Some(cookie) = self.jar.borrow().clone() {
            request = request.cookie(cookie);
        }
        let (reply, cookie) = self.runner.block_on(async {
            let app = test::init_service(self.harness.app()).await;
            let res = test::call_service(&app, request.to_request()).await;
            let cookie = res
                .response()
                .cookies()
                .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
                .map(Cookie::into_owned);
            let status = res.status();
            let headers = res.headers().clone();
            let body = test::read_body(res).await;
            (
                Reply {
                    status,
                    headers,
                    body,
                },
                cookie,
            )
        });
        if let Some(cookie) = cookie {
            *self.jar.borrow_mut() = (!cookie.value().is_empty()).then_some(cookie);
        }
        reply
    }

    pub(crate) fn get(&self, path: &str) -> Reply {
        self.send(test::TestRequest::get().uri(path))
    }

    /// Post an urlencoded form.
    pub(crate) fn post_form(&self, path: &str, pairs: &[(&str, &str)]) -> Reply {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.send(
            test::TestRequest::post()
                .uri(path)
                .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
                .set_payload(body),
        )
    }

    pub(crate) fn login(&self, username: &str, password: &str) -> Reply {
        self.post_form("/login/", &[("username", username), ("password", password)])
    }

    pub(crate) fn login_as_admin(&self) -> Reply {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD)
    }

    /// The user label the login view would render right now.
    pub(crate) fn page_user(&self) -> String {
        let reply = self.get("/login/");
        assert_eq!(reply.status, StatusCode::OK);
        let (_, context) = self.harness.renderer().last().expect("rendered page");
        context.user
    }
}
