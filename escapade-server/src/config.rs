/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9050;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Marks the session cookie `Secure`, only for deployments behind HTTPS
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            secure_cookies: false,
        }
    }
}
