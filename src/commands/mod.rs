pub mod addons;
pub mod character;
pub mod news;
pub mod perks;
pub mod shrine;

use crate::api::ApiClient;
use crate::cache::AssetCache;
use crate::locale::Locales;
use crate::pagination::{
    spawn_pagination, PageRenderer, PaginationConfig, ReplyTarget, SerenityTransport,
};
use crate::{imaging, Context, Data, Error};
use poise::futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Icons in strips and detail views are drawn at this size.
pub const ICON_TILE: u32 = 96;

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        perks::perks(),
        addons::addons(),
        news::news(),
        shrine::shrine(),
        character::character(),
    ]
}

/// Locale of the invoking user, or the configured default.
pub fn locale_of(ctx: Context<'_>) -> String {
    ctx.locale()
        .map(str::to_string)
        .unwrap_or_else(|| ctx.data().locales.default_locale().to_string())
}

/// Unauthorized notice in the clicking user's own locale.
pub fn unauthorized_notice(locales: Arc<Locales>) -> impl Fn(&str) -> String + Send + Sync {
    move |locale| locales.get(locale, "pagination.unauthorized")
}

/// Icon bytes fetched through the shared asset cache.
#[derive(Clone)]
pub struct Icons {
    api: ApiClient,
    cache: AssetCache,
}

impl Icons {
    pub fn new(data: &Data) -> Self {
        Self::from_parts(data.api.clone(), data.assets.clone())
    }

    pub fn from_parts(api: ApiClient, cache: AssetCache) -> Self {
        Self { api, cache }
    }

    pub async fn load(&self, path: &str) -> Option<Arc<Vec<u8>>> {
        let loaded = self
            .cache
            .get_or_load(path, || async {
                self.api.fetch_asset(path).await.map(Arc::new)
            })
            .await;

        match loaded {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Failed to fetch asset {}: {}", path, e);
                None
            }
        }
    }

    /// One PNG row with an icon per path; missing icons leave a gap.
    pub async fn strip(&self, paths: &[Option<String>]) -> Option<Vec<u8>> {
        if paths.is_empty() {
            return None;
        }

        let icons: Vec<Arc<Vec<u8>>> = join_all(paths.iter().map(|path| async move {
            match path {
                Some(path) => self.load(path).await.unwrap_or_default(),
                None => Arc::default(),
            }
        }))
        .await;

        let composed = tokio::task::spawn_blocking(move || {
            let slices: Vec<&[u8]> = icons.iter().map(|icon| icon.as_slice()).collect();
            imaging::compose_icon_row(&slices, ICON_TILE)
        })
        .await;
        match composed {
            Ok(Ok(png)) => Some(png),
            Ok(Err(e)) => {
                debug!("Could not compose icon strip: {}", e);
                None
            }
            Err(e) => {
                warn!("Icon strip task failed: {}", e);
                None
            }
        }
    }
}

/// Put `config` on screen as the reply to a deferred slash command.
///
/// Returns once the first page is visible; the session keeps running in the
/// background until stopped or idle.
pub async fn paginate<T, R>(ctx: Context<'_>, config: PaginationConfig<T, R>) -> Result<(), Error>
where
    T: Send + Sync + 'static,
    R: PageRenderer<T> + 'static,
{
    let data = ctx.data();
    let config = config
        .idle_timeout(data.config.pagination_idle_timeout)
        .unauthorized_notice(unauthorized_notice(Arc::clone(&data.locales)));

    let transport = SerenityTransport::from_context(ctx, ReplyTarget::Deferred)?;
    spawn_pagination(config, transport).await?;
    Ok(())
}
