use crate::api::{ApiClient, NewsItem};
use crate::commands::{locale_of, paginate};
use crate::config::DISCORD_EMBED_LIMIT;
use crate::pagination::{PageContext, PageRenderer, PaginationConfig};
use crate::text::{markdown_to_discord, truncate_lines};
use crate::{Context, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use tracing::info;

const MAX_NEWS_ITEMS: usize = 10;
const NEWS_COLOUR: u32 = 0x1f_3a_5f;

/// Show the latest game news
#[poise::command(slash_command)]
pub async fn news(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let mut items = data.api.news().await?;
    if items.is_empty() {
        ctx.say(data.locales.get(&locale_of(ctx), "news.none")).await?;
        return Ok(());
    }
    items.truncate(MAX_NEWS_ITEMS);

    info!("Showing {} news items to user {}", items.len(), ctx.author().id);

    let renderer = NewsPages {
        api: data.api.clone(),
    };
    let config =
        PaginationConfig::new(items, renderer, ctx.author().id.get()).show_stop_button(true);
    paginate(ctx, config).await
}

struct NewsPages {
    api: ApiClient,
}

impl NewsPages {
    fn image_url(&self, image: &str) -> String {
        if image.starts_with("http://") || image.starts_with("https://") {
            image.to_string()
        } else {
            self.api.asset_url(image)
        }
    }
}

#[async_trait]
impl PageRenderer<NewsItem> for NewsPages {
    async fn render_embed(
        &self,
        items: &[NewsItem],
        _page: PageContext,
    ) -> anyhow::Result<serenity::CreateEmbed> {
        let item = items
            .first()
            .ok_or_else(|| anyhow::anyhow!("news page without an item"))?;

        let mut embed = serenity::CreateEmbed::new()
            .title(&item.title)
            .description(truncate_lines(
                &markdown_to_discord(&item.body),
                DISCORD_EMBED_LIMIT,
            ))
            .colour(NEWS_COLOUR)
            .timestamp(serenity::Timestamp::from_unix_timestamp(
                item.published.timestamp(),
            )?);

        if let Some(url) = &item.url {
            embed = embed.url(url);
        }
        if let Some(image) = &item.image {
            embed = embed.image(self.image_url(image));
        }
        Ok(embed)
    }
}
