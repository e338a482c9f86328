use crate::api::{find_character, Addon, Rarity, Role};
use crate::commands::{locale_of, paginate, Icons};
use crate::locale::Locales;
use crate::pagination::{PageAttachment, PageContext, PageRenderer, PaginationConfig};
use crate::text::{markdown_to_discord, truncate};
use crate::{Context, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Pages stay well under the embed field cap even for crowded rarities.
const MAX_ADDONS_PER_PAGE: usize = 10;
const ADDON_SUMMARY_CHARS: usize = 250;
const PORTRAIT_FILENAME: &str = "portrait.png";

/// List a killer's add-ons, one rarity per page
#[poise::command(slash_command)]
pub async fn addons(
    ctx: Context<'_>,
    #[description = "Killer name, e.g. Trapper"] killer: String,
) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let locale = locale_of(ctx);
    let (characters, addons) = tokio::try_join!(data.api.characters(), data.api.addons())?;

    let Some(found) = find_character(characters, &killer) else {
        let message = data
            .locales
            .format(&locale, "character.not_found", &[("query", killer.as_str())]);
        ctx.say(message).await?;
        return Ok(());
    };
    if found.role != Role::Killer || found.power.is_none() {
        let message = data
            .locales
            .format(&locale, "addons.not_killer", &[("name", found.name.as_str())]);
        ctx.say(message).await?;
        return Ok(());
    }

    let fitting: Vec<Addon> = addons.into_iter().filter(|addon| addon.fits(&found)).collect();
    let groups = group_by_rarity(fitting);
    if groups.is_empty() {
        let message = data
            .locales
            .format(&locale, "addons.none", &[("killer", found.name.as_str())]);
        ctx.say(message).await?;
        return Ok(());
    }

    info!(
        "Listing add-ons of {} on {} pages for user {}",
        found.name,
        groups.len(),
        ctx.author().id
    );

    let portrait = match &found.image {
        Some(path) => Icons::new(data).load(path).await,
        None => None,
    };

    let renderer = AddonPages {
        killer: found.name.clone(),
        locales: Arc::clone(&data.locales),
        locale,
    };
    let mut config = PaginationConfig::new(groups, renderer, ctx.author().id.get());
    if let Some(bytes) = portrait {
        config = config.thumbnail(PageAttachment::new(PORTRAIT_FILENAME, bytes.to_vec()));
    }
    paginate(ctx, config).await
}

/// Add-ons sharing a rarity, as shown on one page.
#[derive(Debug, Clone)]
pub struct RarityGroup {
    pub rarity: Rarity,
    pub addons: Vec<Addon>,
}

/// Group by rarity from common up, names sorted within a rarity. Crowded
/// rarities spill onto several pages.
pub fn group_by_rarity(addons: Vec<Addon>) -> Vec<RarityGroup> {
    let mut by_rarity: BTreeMap<Rarity, Vec<Addon>> = BTreeMap::new();
    for addon in addons {
        by_rarity.entry(addon.rarity).or_default().push(addon);
    }

    let mut groups = Vec::new();
    for (rarity, mut addons) in by_rarity {
        addons.sort_by(|a, b| a.name.cmp(&b.name));
        for chunk in addons.chunks(MAX_ADDONS_PER_PAGE) {
            groups.push(RarityGroup {
                rarity,
                addons: chunk.to_vec(),
            });
        }
    }
    groups
}

struct AddonPages {
    killer: String,
    locales: Arc<Locales>,
    locale: String,
}

#[async_trait]
impl PageRenderer<RarityGroup> for AddonPages {
    async fn render_embed(
        &self,
        items: &[RarityGroup],
        _page: PageContext,
    ) -> anyhow::Result<serenity::CreateEmbed> {
        let group = items
            .first()
            .ok_or_else(|| anyhow::anyhow!("add-on page without a rarity group"))?;

        let title = self.locales.format(
            &self.locale,
            "addons.title",
            &[("killer", self.killer.as_str())],
        );
        let mut embed = serenity::CreateEmbed::new()
            .title(title)
            .description(format!(
                "**{}**",
                self.locales.get(&self.locale, group.rarity.label_key())
            ))
            .colour(group.rarity.color());

        for addon in &group.addons {
            let summary = truncate(&markdown_to_discord(&addon.description), ADDON_SUMMARY_CHARS);
            let summary = if summary.is_empty() {
                "\u{200b}".to_string()
            } else {
                summary
            };
            embed = embed.field(&addon.name, summary, false);
        }
        Ok(embed)
    }
}
