//! Credentials of the demo account created by the seed migration.

pub const USERNAME: &str = "demo";
pub const EMAIL: &str = "demo@example.com";
pub const PASSWORD: &str = "demo-password";
