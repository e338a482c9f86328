//! The seam between the controller and the chat platform.

use async_trait::async_trait;
use tokio::time::Instant;

use super::components::NavComponents;
use super::error::TransportError;
use super::render::PagePayload;

/// A button press or select-menu choice on the paginated message.
#[derive(Debug, Clone)]
pub struct ComponentEvent<I> {
    /// User who clicked.
    pub actor_id: u64,
    pub custom_id: String,
    /// Chosen select-menu values; empty for buttons.
    pub values: Vec<String>,
    /// Client locale of the user who clicked, e.g. `en-US`.
    pub locale: String,
    /// Platform handle used to answer the event.
    pub interaction: I,
}

/// Message operations the pagination controller needs.
///
/// Implementations must deliver events for one message, in arrival order.
#[async_trait]
pub trait InteractionTransport: Send {
    type Interaction: Send + Sync;

    /// Identifier embedded in component tokens; unique per session.
    fn session_key(&self) -> String;

    /// Send the first page (initial reply or edit of a deferred reply).
    async fn send(&mut self, payload: PagePayload) -> Result<(), TransportError>;

    /// Wait for the next event, or `None` once `deadline` passes.
    async fn next_event(
        &mut self,
        deadline: Instant,
    ) -> Option<ComponentEvent<Self::Interaction>>;

    /// Replace the message content with `payload` through an event that was
    /// already acknowledged.
    async fn update(
        &mut self,
        event: &ComponentEvent<Self::Interaction>,
        payload: PagePayload,
    ) -> Result<(), TransportError>;

    /// Answer `event` without changing the message. A later [`update`] through
    /// the same event may still edit it.
    ///
    /// [`update`]: InteractionTransport::update
    async fn acknowledge(
        &mut self,
        event: &ComponentEvent<Self::Interaction>,
    ) -> Result<(), TransportError>;

    /// Answer `event` with a message only its author can see.
    async fn answer_ephemeral(
        &mut self,
        event: &ComponentEvent<Self::Interaction>,
        message: &str,
    ) -> Result<(), TransportError>;

    /// Replace the message's components, leaving embed and files as they are.
    ///
    /// `via` is the latest accepted event, whose token outlives the command's.
    async fn disable(
        &mut self,
        via: Option<&ComponentEvent<Self::Interaction>>,
        components: NavComponents,
    ) -> Result<(), TransportError>;
}
