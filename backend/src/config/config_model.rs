pub const IN_MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub payment_provider: PaymentProvider,
    pub webhook: Webhook,
    pub jwt: Jwt,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

impl Database {
    pub fn is_in_memory(&self) -> bool {
        self.url.trim() == IN_MEMORY_DATABASE_URL
    }
}

#[derive(Debug, Clone)]
pub struct PaymentProvider {
    pub base_url: String,
    pub access_token: String,
    pub webhook_url: String,
}

#[derive(Debug, Clone)]
pub struct Webhook {
    pub token: String,
}

/// Signing settings carried for the token-issuing side of the platform.
#[derive(Debug, Clone)]
pub struct Jwt {
    pub secret: String,
    pub refresh_secret: String,
    pub expiration_time: String,
}
