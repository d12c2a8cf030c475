use std::net::SocketAddr;

use axum::{Router, routing::get};
use time::Duration;
use tower_server_sessions::{
    CookieOptions, MemoryStore, SameSite, Session, SessionManager, SessionManagerLayer,
    continuously_delete_expired,
};

async fn index(session: Session) -> String {
    let n = session.get_int("n").unwrap_or(0);
    session.put("n", n + 1);
    format!("n={n}")
}

#[tokio::main]
async fn main() {
    let store = MemoryStore::new();

    let sweeper = store.clone();
    tokio::spawn(async move {
        if let Err(err) =
            continuously_delete_expired(&sweeper, std::time::Duration::from_secs(60)).await
        {
            eprintln!("expired session sweep stopped: {err}");
        }
    });

    let cookie_options = CookieOptions::default()
        // Default: "Session"
        .with_name("session")
        // Default: true
        .with_http_only(true)
        // Default: SameSite::Lax
        .with_same_site(SameSite::Strict)
        // Default: false (set to true behind HTTPS)
        .with_secure(false)
        // Default: "/"
        .with_path("/")
        // Default: None
        .without_domain()
        // Default: true
        .with_persist(true);
    let manager = SessionManager::new(store)
        // Default: 10 minutes
        .with_idle_timeout(Duration::hours(1))
        .with_cookie_options(cookie_options);

    let app = Router::new()
        .route("/", get(index))
        .layer(SessionManagerLayer::new(manager));

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("tcp listener binds successfully");
    let local_addr = listener.local_addr().expect("local address is available");
    println!("listening at http://{local_addr}");

    axum::serve(listener, app)
        .await
        .expect("server runs successfully");
}
