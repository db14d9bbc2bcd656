//! # pulse-gateway
//!
//! REST API and realtime push gateway: user signup/login with JWT auth,
//! profile CRUD, and a push-notification side-channel that fans out
//! messages to connected clients over Server-Sent Events or WebSocket.
//!
//! The core is the in-memory connection registry: it tracks which
//! logical identities (authenticated users or minted guests) have which
//! live connections, possibly several devices or tabs each, and
//! delivers point-to-point or broadcast messages with best-effort
//! semantics and safe teardown under concurrent send/disconnect races.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, SSE, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Transport Adapters (realtime/sse, realtime/websocket)
//!     │
//!     ├── UserService (service/)
//!     ├── RealtimeHub + ConnectionRegistry (realtime/)
//!     │
//!     ├── JWT Authenticator (auth/)
//!     └── PostgreSQL Persistence (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod error;
pub mod persistence;
pub mod realtime;
pub mod service;
