// src/services/mod.rs
//
// Shared services module containing the auth core primitives and the
// external-collaborator wirings used across domain modules

pub mod crypto;
pub mod google;
pub mod mailer;
pub mod media;
pub mod password;
pub mod tokens;

// Re-export commonly used types for convenience
pub use crypto::{EncryptedEnvelope, SymmetricCodec};
pub use google::GoogleOAuthService;
pub use mailer::Mailer;
pub use media::MediaService;
pub use tokens::{Claims, TokenError, TokenIssuer};
