pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod imaging;
pub mod locale;
pub mod pagination;
pub mod text;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub api: api::ApiClient,
    /// Icon and portrait bytes, shared by every pagination session
    pub assets: cache::AssetCache,
    pub locales: std::sync::Arc<locale::Locales>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
