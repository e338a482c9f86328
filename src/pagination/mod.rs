//! Interactive pagination over a single Discord message.
//!
//! A command hands a [`PaginationConfig`] and an [`InteractionTransport`] to
//! [`start_pagination`]; the controller renders the first page, then answers
//! prev/next/stop/select events from the invoking user until the session is
//! stopped or sits idle for longer than the configured timeout.

use std::time::Duration;

/// Idle time after which a paginated message stops accepting input.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

mod components;
mod controller;
pub mod discord;
pub mod error;
mod render;
pub mod session;
pub mod token;
mod transport;

pub use components::{NavButton, NavComponents, NavSelect, SelectMenuSpec, SelectOption};
pub use controller::{
    spawn_pagination, start_pagination, NoticeFn, PaginationConfig, Paginator, SessionEnd,
    SessionOutcome,
};
pub use discord::{ReplyTarget, SerenityTransport};
pub use error::{PaginationError, TransportError};
pub use render::{
    attachment_url, PageAttachment, PagePayload, PageRenderer, SelectionView,
    DEFAULT_IMAGE_FILENAME,
};
pub use session::{PageContext, SessionState};
pub use transport::{ComponentEvent, InteractionTransport};
