//! [`InteractionTransport`] backed by a serenity slash-command interaction.

use async_trait::async_trait;
use poise::futures_util::stream::{BoxStream, StreamExt};
use poise::serenity_prelude as serenity;
use tokio::time::Instant;
use tracing::debug;

use super::components::NavComponents;
use super::error::TransportError;
use super::render::PagePayload;
use super::transport::{ComponentEvent, InteractionTransport};

/// How the first page reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTarget {
    /// The command has not answered yet; send the initial response.
    Initial,
    /// The command deferred; edit the "thinking" placeholder.
    Deferred,
}

pub struct SerenityTransport {
    ctx: serenity::Context,
    interaction: serenity::CommandInteraction,
    target: ReplyTarget,
    events: Option<BoxStream<'static, serenity::ComponentInteraction>>,
}

impl SerenityTransport {
    pub fn new(
        ctx: serenity::Context,
        interaction: serenity::CommandInteraction,
        target: ReplyTarget,
    ) -> Self {
        Self {
            ctx,
            interaction,
            target,
            events: None,
        }
    }

    /// Build a transport for a slash-command invocation.
    pub fn from_context<U: Send + Sync + 'static, E: 'static>(
        ctx: poise::Context<'_, U, E>,
        target: ReplyTarget,
    ) -> Result<Self, TransportError> {
        let serenity_ctx = ctx.serenity_context().clone();
        match ctx {
            poise::Context::Application(app) => {
                Ok(Self::new(serenity_ctx, app.interaction.clone(), target))
            }
            poise::Context::Prefix(_) => Err(TransportError::Other(
                "pagination requires a slash command invocation".to_string(),
            )),
        }
    }

    fn collect(&mut self, message_id: serenity::MessageId) {
        let stream = serenity::ComponentInteractionCollector::new(&self.ctx)
            .message_id(message_id)
            .stream();
        self.events = Some(stream.boxed());
    }
}

fn to_event(interaction: serenity::ComponentInteraction) -> ComponentEvent<serenity::ComponentInteraction> {
    let values = match &interaction.data.kind {
        serenity::ComponentInteractionDataKind::StringSelect { values } => values.clone(),
        _ => Vec::new(),
    };

    ComponentEvent {
        actor_id: interaction.user.id.get(),
        custom_id: interaction.data.custom_id.clone(),
        values,
        locale: interaction.locale.clone(),
        interaction,
    }
}

#[async_trait]
impl InteractionTransport for SerenityTransport {
    type Interaction = serenity::ComponentInteraction;

    fn session_key(&self) -> String {
        self.interaction.id.get().to_string()
    }

    async fn send(&mut self, payload: PagePayload) -> Result<(), TransportError> {
        let rows = payload.components.to_action_rows();
        let files = payload
            .attachments
            .iter()
            .map(|attachment| attachment.to_create_attachment());

        let message = match self.target {
            ReplyTarget::Initial => {
                let response = serenity::CreateInteractionResponseMessage::new()
                    .embed(payload.embed)
                    .components(rows)
                    .add_files(files);
                self.interaction
                    .create_response(
                        &self.ctx.http,
                        serenity::CreateInteractionResponse::Message(response),
                    )
                    .await?;
                self.interaction.get_response(&self.ctx.http).await?
            }
            ReplyTarget::Deferred => {
                let mut edit = serenity::EditInteractionResponse::new()
                    .embed(payload.embed)
                    .components(rows);
                for file in files {
                    edit = edit.new_attachment(file);
                }
                self.interaction.edit_response(&self.ctx.http, edit).await?
            }
        };

        debug!(
            "Paginated message {} sent for interaction {}",
            message.id, self.interaction.id
        );
        self.collect(message.id);
        Ok(())
    }

    async fn next_event(
        &mut self,
        deadline: Instant,
    ) -> Option<ComponentEvent<Self::Interaction>> {
        let events = self.events.as_mut()?;
        match tokio::time::timeout_at(deadline, events.next()).await {
            Ok(Some(interaction)) => Some(to_event(interaction)),
            Ok(None) | Err(_) => None,
        }
    }

    async fn update(
        &mut self,
        event: &ComponentEvent<Self::Interaction>,
        payload: PagePayload,
    ) -> Result<(), TransportError> {
        // The event was answered with a deferred update, so its webhook edits
        // the message. Files from the previous page are dropped.
        let mut edit = serenity::EditInteractionResponse::new()
            .embed(payload.embed)
            .components(payload.components.to_action_rows())
            .clear_attachments();
        for attachment in &payload.attachments {
            edit = edit.new_attachment(attachment.to_create_attachment());
        }

        event.interaction.edit_response(&self.ctx.http, edit).await?;
        Ok(())
    }

    async fn acknowledge(
        &mut self,
        event: &ComponentEvent<Self::Interaction>,
    ) -> Result<(), TransportError> {
        event
            .interaction
            .create_response(&self.ctx.http, serenity::CreateInteractionResponse::Acknowledge)
            .await?;
        Ok(())
    }

    async fn answer_ephemeral(
        &mut self,
        event: &ComponentEvent<Self::Interaction>,
        message: &str,
    ) -> Result<(), TransportError> {
        event
            .interaction
            .create_response(
                &self.ctx.http,
                serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content(message)
                        .ephemeral(true),
                ),
            )
            .await?;
        Ok(())
    }

    async fn disable(
        &mut self,
        via: Option<&ComponentEvent<Self::Interaction>>,
        components: NavComponents,
    ) -> Result<(), TransportError> {
        if self.events.take().is_none() {
            return Err(TransportError::NoMessage);
        }

        // Interaction tokens last 15 minutes. A component token is minted on
        // every click, so the latest one is still valid after long sessions.
        let edit =
            serenity::EditInteractionResponse::new().components(components.to_action_rows());
        match via {
            Some(event) => event.interaction.edit_response(&self.ctx.http, edit).await?,
            None => self.interaction.edit_response(&self.ctx.http, edit).await?,
        };
        Ok(())
    }
}
