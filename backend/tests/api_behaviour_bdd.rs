//! Behaviour tests for the session views and the user API.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

#[allow(dead_code)]
#[path = "support/client.rs"]
mod client;

use std::cell::RefCell;

use actix_web::http::header::{AUTHORIZATION, LOCATION};
use actix_web::http::{Method, StatusCode};
use actix_web::test as actix_test;
use client::{Client, Reply};
use rest_auth::test_support::{ADMIN_PASSWORD, ADMIN_USERNAME};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;

struct ApiWorld {
    client: RefCell<Option<Client>>,
    last: RefCell<Option<Reply>>,
}

impl ApiWorld {
    fn new() -> Self {
        Self {
            client: RefCell::new(None),
            last: RefCell::new(None),
        }
    }

    fn with_client<R>(&self, f: impl FnOnce(&Client) -> R) -> R {
        let client = self.client.borrow();
        f(client.as_ref().expect("credential store configured"))
    }

    fn record(&self, reply: Reply) {
        *self.last.borrow_mut() = Some(reply);
    }

    fn with_last<R>(&self, f: impl FnOnce(&Reply) -> R) -> R {
        let last = self.last.borrow();
        f(last.as_ref().expect("a response was recorded"))
    }
}

#[fixture]
fn world() -> ApiWorld {
    ApiWorld::new()
}

#[given("a credential store holding the administrator")]
fn a_credential_store_holding_the_administrator(world: &ApiWorld) {
    *world.client.borrow_mut() = Some(Client::seeded());
}

#[given("the client is logged in as the administrator")]
fn the_client_is_logged_in_as_the_administrator(world: &ApiWorld) {
    let reply = world.with_client(Client::login_as_admin);
    assert_eq!(reply.status, StatusCode::FOUND);
}

#[when("the client logs in as {username} with password {password}")]
fn the_client_logs_in(world: &ApiWorld, username: String, password: String) {
    let reply = world.with_client(|client| client.login(&username, &password));
    world.record(reply);
}

#[when("the client logs out")]
fn the_client_logs_out(world: &ApiWorld) {
    let reply = world.with_client(|client| client.get("/logout/"));
    world.record(reply);
}

#[when("the client requests {path}")]
fn the_client_requests(world: &ApiWorld, path: String) {
    let reply = world.with_client(|client| client.get(&path));
    world.record(reply);
}

#[when("the client sends {method} to {path}")]
fn the_client_sends(world: &ApiWorld, method: String, path: String) {
    let method = Method::from_bytes(method.as_bytes()).expect("http method");
    let reply = world.with_client(|client| {
        client.send(actix_test::TestRequest::default().method(method).uri(&path))
    });
    world.record(reply);
}

#[when("the client exchanges the administrator credentials for a token")]
fn the_client_exchanges_the_administrator_credentials(world: &ApiWorld) {
    let reply = world.with_client(|client| {
        client.post_form(
            "/token-auth/",
            &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
        )
    });
    world.record(reply);
}

#[when("the client exchanges {username} and {password} for a token")]
fn the_client_exchanges_credentials(world: &ApiWorld, username: String, password: String) {
    let reply = world.with_client(|client| {
        client.post_form(
            "/token-auth/",
            &[("username", username.as_str()), ("password", password.as_str())],
        )
    });
    world.record(reply);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &ApiWorld, status: u16) {
    world.with_last(|reply| assert_eq!(reply.status.as_u16(), status));
}

#[then("the response redirects to {target}")]
fn the_response_redirects_to(world: &ApiWorld, target: String) {
    world.with_last(|reply| {
        assert_eq!(reply.status, StatusCode::FOUND);
        assert_eq!(reply.header(LOCATION.as_str()), Some(target.as_str()));
    });
}

#[then("the login page shows the user {user}")]
fn the_login_page_shows_the_user(world: &ApiWorld, user: String) {
    let shown = world.with_client(Client::page_user);
    assert_eq!(shown, user);
}

#[then("the client holds no session")]
fn the_client_holds_no_session(world: &ApiWorld) {
    assert!(!world.with_client(Client::has_session));
}

#[then("the response body is {body}")]
fn the_response_body_is(world: &ApiWorld, body: String) {
    world.with_last(|reply| assert_eq!(reply.text(), body));
}

#[then("the token can be used to list users")]
fn the_token_can_be_used_to_list_users(world: &ApiWorld) {
    let token = world.with_last(|reply| {
        reply
            .json()
            .get("token")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .expect("token in body")
    });
    let reply = world.with_client(|client| {
        client.forget_session();
        client.send(
            actix_test::TestRequest::get()
                .uri("/users/")
                .insert_header((AUTHORIZATION, format!("Token {token}"))),
        )
    });
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json().as_array().map(Vec::len), Some(1));
}

#[scenario(path = "tests/features/session_login.feature")]
fn session_login_scenarios(world: ApiWorld) {
    drop(world);
}

#[scenario(path = "tests/features/users_api.feature")]
fn users_api_scenarios(world: ApiWorld) {
    drop(world);
}
