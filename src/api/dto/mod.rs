//! Request/response DTOs for the REST API.

pub mod auth_dto;
pub mod common_dto;
pub mod notification_dto;
pub mod user_dto;

pub use auth_dto::{AuthTokenResponse, LoginRequest, SignupRequest};
pub use common_dto::{PaginationMeta, PaginationParams};
pub use notification_dto::{BroadcastRequest, DispatchResponse, SendNotificationRequest};
pub use user_dto::{ChangePasswordRequest, UpdateProfileRequest, UserDto, UserListResponse};
