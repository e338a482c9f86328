use crate::api::{Perk, Shrine};
use crate::commands::{locale_of, Icons};
use crate::locale::Locales;
use crate::pagination::attachment_url;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use std::collections::HashMap;
use tracing::info;

const SHRINE_COLOUR: u32 = 0x6d_3f_a8;
const STRIP_FILENAME: &str = "shrine.png";

/// Show this week's Shrine of Secrets
#[poise::command(slash_command)]
pub async fn shrine(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let locale = locale_of(ctx);
    let (shrine, perks) = tokio::try_join!(data.api.shrine(), data.api.perks())?;
    info!("Shrine {} requested by user {}", shrine.id, ctx.author().id);

    let by_id: HashMap<&str, &Perk> = perks.iter().map(|perk| (perk.id.as_str(), perk)).collect();
    let mut embed = shrine_embed(&shrine, &by_id, &data.locales, &locale);

    let icons: Vec<Option<String>> = shrine
        .perks
        .iter()
        .map(|entry| by_id.get(entry.id.as_str()).and_then(|perk| perk.image.clone()))
        .collect();
    let mut reply = CreateReply::default();
    if let Some(strip) = Icons::new(data).strip(&icons).await {
        embed = embed.image(attachment_url(STRIP_FILENAME));
        reply = reply.attachment(serenity::CreateAttachment::bytes(strip, STRIP_FILENAME));
    }

    ctx.send(reply.embed(embed)).await?;
    Ok(())
}

fn shrine_embed(
    shrine: &Shrine,
    perks: &HashMap<&str, &Perk>,
    locales: &Locales,
    locale: &str,
) -> serenity::CreateEmbed {
    let resets = shrine.end.timestamp().to_string();
    let mut embed = serenity::CreateEmbed::new()
        .title(locales.get(locale, "shrine.title"))
        .description(locales.format(locale, "shrine.resets", &[("time", resets.as_str())]))
        .colour(SHRINE_COLOUR);

    for entry in &shrine.perks {
        let name = perks
            .get(entry.id.as_str())
            .map(|perk| perk.name.as_str())
            .unwrap_or(entry.id.as_str());
        let shards = entry.shards.to_string();
        let bloodpoints = entry.bloodpoints.to_string();
        let cost = locales.format(
            locale,
            "shrine.cost",
            &[("shards", shards.as_str()), ("bloodpoints", bloodpoints.as_str())],
        );
        embed = embed.field(name, cost, true);
    }
    embed
}
