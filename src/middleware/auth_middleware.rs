/// Bearer-token middleware for per-user resources
///
/// Wraps a scope or resource whose path carries an `{id}` segment. The
/// access token must be valid, unexpired and issued to that same id.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::AuthManager;
use crate::error::{AppError, AuthError, ValidationError};

const BEARER_PREFIX: &str = "Bearer ";

/// The user id the access token was verified against, available to
/// handlers as `web::ReqData<Identity>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Identity(pub Uuid);

pub struct AuthMiddleware {
    manager: web::Data<AuthManager>,
}

impl AuthMiddleware {
    pub fn new(manager: web::Data<AuthManager>) -> Self {
        Self { manager }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            manager: self.manager.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    manager: web::Data<AuthManager>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let user_id = match authorize(&req, &self.manager) {
            Ok(user_id) => user_id,
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Request rejected by auth middleware");
                return Box::pin(async move { Err(e.into()) });
            }
        };

        req.extensions_mut().insert(Identity(user_id));
        tracing::debug!(user_id = %user_id, "Access token verified");

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

/// Header, then path id, then token; the first failure wins.
fn authorize(req: &ServiceRequest, manager: &AuthManager) -> Result<Uuid, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidToken)?;

    let user_id = req
        .match_info()
        .get("id")
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| ValidationError::InvalidFormat("user id".to_string()))?;

    manager.verify_access_token(token, user_id)?;
    Ok(user_id)
}
