/// Versioned prefix for every HTTP API path
pub const API_PREFIX: &str = "/api/v1";

/// Name of the HTTP-only session cookie issued by the server
pub const SESSION_COOKIE: &str = "PSESSIONID";

/// Envelope codes the client branches on
pub const CODE_SUCCESS: &str = "SUCCESS";
pub const CODE_LOGIN_NEEDS_2FA: &str = "LOGIN_NEEDS_2FA";
pub const CODE_BAD_CREDENTIALS: &str = "BAD_CREDENTIALS";
pub const CODE_INVALID_TWO_FACTOR_CODE: &str = "INVALID_TWO_FACTOR_CODE";
pub const CODE_UNAUTHORIZED: &str = "UNAUTHORIZED";
pub const CODE_TWO_FACTOR_AUTH_NOT_ENABLED: &str = "TWO_FACTOR_AUTH_NOT_ENABLED";

/// Topic prefix for channel-scoped stream subscriptions
pub const TOPIC_PREFIX: &str = "channel.";

/// Well-known publish destination for outgoing chat messages
pub const SEND_DESTINATION: &str = "chat.send";

/// Fixed delay between transport reconnect attempts, in milliseconds
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;

/// Maximum gap between consecutive same-sender messages folded into one
/// presentation stack, in seconds
pub const STACK_WINDOW_SECS: i64 = 120;

/// Length of a time-based second-factor code (decimal digits)
pub const TOTP_CODE_LEN: usize = 6;

/// Length of a second-factor recovery code (alphanumeric)
pub const RECOVERY_CODE_LEN: usize = 8;
