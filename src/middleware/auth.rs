use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::models::Role;
use crate::services::auth_service;

/// Identidade resolvida pelo middleware e injetada nas extensions da
/// requisição; os handlers a recebem via web::ReqData
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub role: Role,
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Get Authorization header
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(str::to_string);

        let token = match token {
            Some(token) => token,
            None => {
                return Box::pin(async move {
                    Err(actix_web::error::ErrorUnauthorized("Access token required"))
                });
            }
        };

        match auth_service::verify_token(&token) {
            Ok(claims) => {
                let user_id = match claims.sub.parse::<i64>() {
                    Ok(id) => id,
                    Err(_) => {
                        return Box::pin(async move {
                            Err(actix_web::error::ErrorUnauthorized("Invalid or expired token"))
                        });
                    }
                };

                req.extensions_mut().insert(AuthenticatedUser {
                    id: user_id,
                    role: claims.role,
                });

                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(e) => {
                log::warn!("❌ Token rejected: {}", e);
                Box::pin(async move {
                    Err(actix_web::error::ErrorUnauthorized("Invalid or expired token"))
                })
            }
        }
    }
}
