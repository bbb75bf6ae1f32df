//! Application Layer
//!
//! Use cases and application services.

pub mod account;
pub mod config;
pub mod jobs;
pub mod login;
pub mod password_reset;
pub mod profile;
pub mod register;
pub mod session;
pub mod tokens;
pub mod two_factor;
pub mod verify_email;

// Re-exports
pub use account::{AccountUseCase, SecurityLogQuery};
pub use config::AuthConfig;
pub use jobs::{AuthJob, AuthJobHandler};
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use password_reset::{
    ConfirmPasswordResetInput, ConfirmPasswordResetUseCase, RequestPasswordResetUseCase,
};
pub use profile::{ProfileUpdate, ProfileUseCase, UpdateMode};
pub use register::{RegisterInput, RegisterUseCase};
pub use session::{AuthenticateUseCase, LogoutUseCase, RefreshTokenUseCase};
pub use two_factor::{EnrollmentOutput, TwoFactorUseCase};
pub use verify_email::VerifyEmailUseCase;
