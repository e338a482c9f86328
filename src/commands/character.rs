use crate::api::{ApiClient, Character, Perk, Role};
use crate::commands::locale_of;
use crate::config::DISCORD_FIELD_LIMIT;
use crate::locale::Locales;
use crate::text::{markdown_to_discord, truncate, truncate_lines};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use tracing::info;

const KILLER_COLOUR: u32 = 0x9e_1b_1b;
const SURVIVOR_COLOUR: u32 = 0x2d_6a_9f;
const BIO_CHARS: usize = 1500;

/// Look up a killer or survivor
#[poise::command(slash_command)]
pub async fn character(
    ctx: Context<'_>,
    #[description = "Character name"] name: String,
) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let locale = locale_of(ctx);
    let (found, perks) = tokio::try_join!(data.api.character(&name), data.api.perks())?;

    let Some(found) = found else {
        let message = data
            .locales
            .format(&locale, "character.not_found", &[("query", name.as_str())]);
        ctx.say(message).await?;
        return Ok(());
    };
    info!("Character {} requested by user {}", found.id, ctx.author().id);

    let embed = character_embed(&found, &perks, &data.api, &data.locales, &locale);
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn character_embed(
    character: &Character,
    perks: &[Perk],
    api: &ApiClient,
    locales: &Locales,
    locale: &str,
) -> serenity::CreateEmbed {
    let colour = match character.role {
        Role::Killer => KILLER_COLOUR,
        Role::Survivor => SURVIVOR_COLOUR,
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(&character.name)
        .colour(colour)
        .field(
            locales.get(locale, "character.role"),
            locales.get(locale, character.role.label_key()),
            true,
        );

    if let Some(bio) = &character.bio {
        let bio = truncate_lines(&markdown_to_discord(bio), BIO_CHARS);
        embed = embed.description(bio);
    }
    if let Some(difficulty) = &character.difficulty {
        embed = embed.field(locales.get(locale, "character.difficulty"), difficulty, true);
    }
    if let Some(dlc) = &character.dlc {
        embed = embed.field(locales.get(locale, "character.dlc"), dlc, true);
    }

    // Unique perks are listed in the character's own order.
    let names: Vec<&str> = character
        .perks
        .iter()
        .filter_map(|id| perks.iter().find(|perk| &perk.id == id))
        .map(|perk| perk.name.as_str())
        .collect();
    if !names.is_empty() {
        embed = embed.field(
            locales.get(locale, "character.perks"),
            truncate(&names.join("\n"), DISCORD_FIELD_LIMIT),
            false,
        );
    }

    if let Some(image) = &character.image {
        embed = embed.thumbnail(api.asset_url(image));
    }
    embed
}
