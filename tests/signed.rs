#![cfg(feature = "signed")]

// Tests for the signed token cookie: valid signatures round-trip, anything else starts over.
mod common;

use axum::body::Body;
use http::{Request, Response, header};
use tower::{ServiceBuilder, ServiceExt as _};

use tower_server_sessions::{
    Key, MemoryStore, SessionManager, SessionManagerLayer, SignedCookie, Token,
};

async fn call(layer: &SessionManagerLayer<SignedCookie>, cookie: Option<String>) -> Response<Body> {
    let svc = ServiceBuilder::new()
        .layer(layer.clone())
        .service_fn(common::get_handler);

    let mut req = Request::builder();
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    let req = req.body(Body::empty()).expect("request builds successfully");
    svc.oneshot(req).await.expect("service call succeeds")
}

fn signed_layer(store: &MemoryStore) -> SessionManagerLayer<SignedCookie> {
    SessionManagerLayer::signed(SessionManager::new(store.clone()), Key::generate())
}

#[tokio::test]
async fn signed_cookie_round_trips() {
    // Exercise: a request carrying the signed cookie from a previous response.
    // Expectation: the signature verifies and the same session is loaded.
    let store = MemoryStore::new();
    let layer = signed_layer(&store);

    let res = call(&layer, None).await;
    let first = common::get_session_cookie(&res);
    assert!(first.value().parse::<Token>().is_err());

    let res = call(&layer, Some(common::cookie_header_value(&first))).await;
    let second = common::get_session_cookie(&res);

    // A fresh signature is issued every time, but it wraps the same token.
    assert!(second.value().ends_with(&first.value()[first.value().len() - 36..]));
}

#[tokio::test]
async fn tampered_cookie_starts_a_new_session() {
    // Exercise: flip the last character of the signed value.
    // Expectation: verification fails and a different token is issued.
    let store = MemoryStore::new();
    let layer = signed_layer(&store);

    let res = call(&layer, None).await;
    let first = common::get_session_cookie(&res);
    let value = first.value();
    let flipped = if value.ends_with('0') { '1' } else { '0' };
    let tampered = format!("{}={}{}", first.name(), &value[..value.len() - 1], flipped);

    let res = call(&layer, Some(tampered)).await;
    let second = common::get_session_cookie(&res);

    assert_ne!(
        &second.value()[second.value().len() - 36..],
        &value[value.len() - 36..]
    );
}

#[tokio::test]
async fn unsigned_token_is_rejected() {
    // Exercise: a bare token that exists in the store but carries no signature.
    // Expectation: the store entry is not reachable through the signed layer.
    let store = MemoryStore::new();
    let layer = signed_layer(&store);
    let manager = layer.manager().clone();
    let session = manager.new_session();
    session.put(common::KEY, common::VALUE);
    manager.save(&session).await.expect("save succeeds");

    let res = call(&layer, Some(format!("Session={}", session.token()))).await;
    let issued = common::get_session_cookie(&res);

    assert!(!issued.value().ends_with(&session.token().to_string()));
    assert_eq!(common::body_string(res.into_body()).await, "");
}
