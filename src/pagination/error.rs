use poise::serenity_prelude as serenity;
use thiserror::Error;

/// Failures raised by [`start_pagination`](super::start_pagination) before or
/// while the first page is on screen.
#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("cannot paginate an empty item list")]
    EmptyItems,
    #[error("items per page must be at least 1")]
    ZeroItemsPerPage,
    #[error("idle timeout must be longer than zero")]
    ZeroIdleTimeout,
    #[error("failed to render the first page: {0}")]
    Render(#[source] anyhow::Error),
    #[error("failed to send the first page: {0}")]
    InitialSend(#[source] TransportError),
}

/// Errors surfaced by an [`InteractionTransport`](super::InteractionTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Discord(#[from] serenity::Error),
    #[error("no message has been sent for this session yet")]
    NoMessage,
    #[error("{0}")]
    Other(String),
}
