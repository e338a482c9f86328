use crate::api::{find_character, Character, Perk};
use crate::commands::{locale_of, paginate, Icons};
use crate::config::{DISCORD_EMBED_LIMIT, DISCORD_FIELD_LIMIT};
use crate::locale::Locales;
use crate::pagination::{
    PageContext, PageRenderer, PaginationConfig, SelectMenuSpec, SelectOption, SelectionView,
};
use crate::text::{markdown_to_discord, truncate};
use crate::{Context, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

const PERKS_PER_PAGE: usize = 5;
const SUMMARY_CHARS: usize = 300;
const PERK_COLOUR: u32 = 0x8b_1a_1a;

/// Browse perks, optionally only those of one character
#[poise::command(slash_command)]
pub async fn perks(
    ctx: Context<'_>,
    #[description = "Only show this character's perks"] character: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let locale = locale_of(ctx);
    let (mut perks, characters) = tokio::try_join!(data.api.perks(), data.api.characters())?;

    let title = match character {
        Some(query) => {
            let Some(found) = find_character(characters.clone(), &query) else {
                let message =
                    data.locales
                        .format(&locale, "character.not_found", &[("query", query.as_str())]);
                ctx.say(message).await?;
                return Ok(());
            };
            perks.retain(|perk| perk.belongs_to(&found));
            data.locales
                .format(&locale, "perks.title_character", &[("name", found.name.as_str())])
        }
        None => data.locales.get(&locale, "perks.title"),
    };

    if perks.is_empty() {
        ctx.say(data.locales.get(&locale, "perks.none")).await?;
        return Ok(());
    }
    perks.sort_by(|a, b| a.name.cmp(&b.name));

    info!(
        "Listing {} perks for user {} ({})",
        perks.len(),
        ctx.author().id,
        title
    );

    let renderer = PerkPages {
        title,
        owners: owner_names(&characters),
        locales: Arc::clone(&data.locales),
        locale,
        icons: Icons::new(data),
    };
    let config = PaginationConfig::new(perks, renderer, ctx.author().id.get())
        .items_per_page(PERKS_PER_PAGE);
    paginate(ctx, config).await
}

fn owner_names(characters: &[Character]) -> HashMap<String, String> {
    characters
        .iter()
        .map(|c| (c.index.clone(), c.name.clone()))
        .collect()
}

struct PerkPages {
    title: String,
    /// Character index to display name.
    owners: HashMap<String, String>,
    locales: Arc<Locales>,
    locale: String,
    icons: Icons,
}

impl PerkPages {
    fn owner_line(&self, perk: &Perk) -> String {
        let owner = perk
            .character
            .and_then(|index| self.owners.get(&index.to_string()));
        match owner {
            Some(name) => self
                .locales
                .format(&self.locale, "perks.owner", &[("name", name.as_str())]),
            None => self.locales.get(&self.locale, "perks.general"),
        }
    }
}

#[async_trait]
impl PageRenderer<Perk> for PerkPages {
    async fn render_embed(
        &self,
        items: &[Perk],
        _page: PageContext,
    ) -> anyhow::Result<serenity::CreateEmbed> {
        let mut embed = serenity::CreateEmbed::new()
            .title(&self.title)
            .colour(PERK_COLOUR);

        for perk in items {
            let summary = truncate(&markdown_to_discord(&perk.description), SUMMARY_CHARS);
            let value = format!("*{}*\n{}", self.owner_line(perk), summary);
            embed = embed.field(&perk.name, truncate(&value, DISCORD_FIELD_LIMIT), false);
        }
        Ok(embed)
    }

    async fn render_image(
        &self,
        items: &[Perk],
        _page: PageContext,
    ) -> anyhow::Result<Option<Vec<u8>>> {
        let paths: Vec<Option<String>> = items.iter().map(|perk| perk.image.clone()).collect();
        Ok(self.icons.strip(&paths).await)
    }

    fn render_select_menu(&self, items: &[Perk]) -> Option<SelectMenuSpec> {
        let options = items
            .iter()
            .map(|perk| SelectOption::new(&perk.name, &perk.id).description(self.owner_line(perk)))
            .collect();
        Some(SelectMenuSpec::new(
            self.locales.get(&self.locale, "perks.select_placeholder"),
            options,
        ))
    }

    async fn resolve_selection(
        &self,
        value: &str,
        items: &[Perk],
    ) -> anyhow::Result<Option<SelectionView>> {
        let Some(perk) = items.iter().find(|perk| perk.id == value) else {
            return Ok(None);
        };

        let mut embed = serenity::CreateEmbed::new()
            .title(&perk.name)
            .colour(PERK_COLOUR)
            .description(truncate(
                &markdown_to_discord(&perk.description),
                DISCORD_EMBED_LIMIT,
            ))
            .field(
                self.locales.get(&self.locale, "perks.owner_heading"),
                self.owner_line(perk),
                true,
            );
        if let Some(level) = perk.teachable {
            embed = embed.field(
                self.locales.get(&self.locale, "perks.teachable"),
                level.to_string(),
                true,
            );
        }

        let view = SelectionView::new(embed);
        Ok(Some(match self.icons.strip(&[perk.image.clone()]).await {
            Some(icon) => view.with_image(icon),
            None => view,
        }))
    }
}
