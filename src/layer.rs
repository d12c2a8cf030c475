use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use http::{Request, Response, StatusCode};
use tower_cookies::{CookieManager, Cookies};
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    controller::{CookieController, PlaintextCookie},
    manager::SessionManager,
};

/// `tower` layer that gives every request a [`Session`](crate::Session) loaded from the
/// manager's store and persists it once the inner service has responded.
///
/// The session is inserted into the request extensions. After the inner service returns, the
/// session is saved with a sliding expiry and a `Set-Cookie` carrying its token is added to the
/// response. If loading or saving fails the response is replaced with
/// `500 Internal Server Error` and no cookie is set.
#[derive(Debug, Clone)]
pub struct SessionManagerLayer<C: CookieController = PlaintextCookie> {
    manager: SessionManager,
    controller: C,
}

impl SessionManagerLayer<PlaintextCookie> {
    #[must_use]
    pub fn new(manager: SessionManager) -> Self {
        Self {
            manager,
            controller: PlaintextCookie,
        }
    }

    #[cfg(feature = "signed")]
    #[must_use]
    pub fn signed(
        manager: SessionManager,
        key: crate::Key,
    ) -> SessionManagerLayer<crate::SignedCookie> {
        Self::new(manager).with_controller(crate::SignedCookie::new(key))
    }
}

impl<C: CookieController> SessionManagerLayer<C> {
    #[must_use]
    pub fn with_controller<C2: CookieController>(
        self,
        controller: C2,
    ) -> SessionManagerLayer<C2> {
        SessionManagerLayer {
            manager: self.manager,
            controller,
        }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }
}

impl From<SessionManager> for SessionManagerLayer<PlaintextCookie> {
    fn from(manager: SessionManager) -> Self {
        Self::new(manager)
    }
}

#[derive(Debug, Clone)]
pub struct SessionManagerService<S, C: CookieController> {
    inner: S,
    manager: SessionManager,
    controller: C,
}

impl<S, C: CookieController> Layer<S> for SessionManagerLayer<C> {
    type Service = CookieManager<SessionManagerService<S, C>>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieManager::new(SessionManagerService {
            inner,
            manager: self.manager.clone(),
            controller: self.controller.clone(),
        })
    }
}

fn internal_server_error<B: Default>() -> Response<B> {
    let mut res = Response::default();
    *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    res
}

impl<ReqBody, ResBody, S, C> Service<Request<ReqBody>> for SessionManagerService<S, C>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Default + Send,
    C: CookieController,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let manager = self.manager.clone();
        let controller = self.controller.clone();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(cookies) = req.extensions().get::<Cookies>().cloned() else {
                tracing::error!("missing cookie jar; is the CookieManager layer installed?");
                return Ok(internal_server_error());
            };

            let name = manager.cookie_options().name();
            let token = controller.token(&cookies, name);
            let session = match manager.load_from_cookie(token.as_deref()).await {
                Ok(session) => session,
                Err(err) => {
                    tracing::error!(err = %err, "failed to load session");
                    return Ok(internal_server_error());
                }
            };
            req.extensions_mut().insert(session.clone());

            let res = inner.call(req).await?;

            let expires_at = match manager.save(&session).await {
                Ok(expires_at) => expires_at,
                Err(err) => {
                    tracing::error!(err = %err, token = %session.token(), "failed to save session");
                    return Ok(internal_server_error());
                }
            };
            controller.set(&cookies, manager.session_cookie(&session.token(), expires_at));

            Ok(res)
        })
    }
}
