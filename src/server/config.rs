use crate::predict::SearchScope;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Which reference players the form's closest match is drawn from
    pub search_scope: SearchScope,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 5000,
            search_scope: SearchScope::Population,
        }
    }
}
