//! Client-side session, auth gateway, and route authorization for the
//! career-prep app.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` owns the credential store, `gateway` is the only writer on the
//! success path, `guard`/`routes` read the store to decide what a page
//! navigation renders, and `api` uses the stored token for the CRUD surface.
//! `devserver` is a local fake backend for development and tests.

pub mod api;
pub mod config;
pub mod devserver;
pub mod gateway;
pub mod guard;
pub mod profile;
pub mod routes;
pub mod session;
pub mod storage;

pub use config::ClientConfig;
pub use gateway::{AuthError, AuthGateway, AuthResponse, SocialProvider};
pub use guard::{Access, Guarded, RequireAuth, RequireRole, RouteGuard};
pub use profile::{ProfileCache, UserProfile};
pub use routes::{Navigation, Page, navigate};
pub use session::{CredentialStore, Role, Session};
pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError};
