//! # auth-service
//!
//! Application layer: the session/token lifecycle, account use cases, and
//! the request/response DTOs the HTTP layer speaks.

pub mod dto;
pub mod services;

pub use services::{
    AccessIdentity, AdminService, AuthService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, SessionService, UserService,
};
