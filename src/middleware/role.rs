use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::str::FromStr;

use crate::utils::AppError;

/// Client-supplied role header. It is not authenticated; it only gates
/// which operations the UI is allowed to call.
pub const ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Read,
    Write,
    Delete,
    Administer,
}

impl Role {
    pub fn allows(&self, permission: Permission) -> bool {
        match (self, permission) {
            (_, Permission::Read) => true,
            (Role::Admin, _) => true,
            (Role::Faculty, Permission::Write) => true,
            _ => false,
        }
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.allows(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role '{}' is not allowed to {}",
                self.as_str(),
                match permission {
                    Permission::Read => "read",
                    Permission::Write => "modify records",
                    Permission::Delete => "delete records",
                    Permission::Administer => "perform admin operations",
                }
            )))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "faculty" => Ok(Role::Faculty),
            "student" => Ok(Role::Student),
            other => Err(AppError::Forbidden(format!("Unknown role '{}'", other))),
        }
    }
}

pub struct RoleMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RoleMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleMiddlewareService { service }))
    }
}

pub struct RoleMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RoleMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let role = match req.headers().get(ROLE_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| AppError::Forbidden("Malformed x-user-role header".into()))
                .and_then(Role::from_str),
            None => Err(AppError::Forbidden("Missing x-user-role header".into())),
        };

        match role {
            Ok(role) => {
                req.extensions_mut().insert(role);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(e) => {
                let response = e.error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_matrix() {
        use Permission::*;

        assert!([Read, Write, Delete, Administer].iter().all(|p| Role::Admin.allows(*p)));

        assert!(Role::Faculty.allows(Read));
        assert!(Role::Faculty.allows(Write));
        assert!(!Role::Faculty.allows(Delete));
        assert!(!Role::Faculty.allows(Administer));

        assert!(Role::Student.allows(Read));
        assert!(!Role::Student.allows(Write));
        assert!(!Role::Student.allows(Delete));
    }

    #[test]
    fn parses_header_values() {
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("FACULTY".parse::<Role>().unwrap(), Role::Faculty);
        assert!(matches!("guest".parse::<Role>(), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn require_explains_refusal() {
        match Role::Student.require(Permission::Delete) {
            Err(AppError::Forbidden(msg)) => assert_eq!(msg, "Role 'student' is not allowed to delete records"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
