//! Page renderer: turns the visible slice into an outgoing payload.

use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use super::components::{NavComponents, SelectMenuSpec};
use super::session::PageContext;

/// Default filename for per-page images.
pub const DEFAULT_IMAGE_FILENAME: &str = "page.png";

/// `attachment://` URL an embed uses to reference an uploaded file.
pub fn attachment_url(filename: &str) -> String {
    format!("attachment://{filename}")
}

/// A file uploaded alongside a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAttachment {
    pub filename: String,
    pub data: Vec<u8>,
}

impl PageAttachment {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    pub fn url(&self) -> String {
        attachment_url(&self.filename)
    }

    pub fn to_create_attachment(&self) -> serenity::CreateAttachment {
        serenity::CreateAttachment::bytes(self.data.clone(), self.filename.clone())
    }
}

/// Replacement view produced by a select-menu choice.
#[derive(Debug, Clone)]
pub struct SelectionView {
    pub embed: serenity::CreateEmbed,
    pub image: Option<Vec<u8>>,
}

impl SelectionView {
    pub fn new(embed: serenity::CreateEmbed) -> Self {
        Self { embed, image: None }
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }
}

/// Everything needed to send or edit the paginated message.
#[derive(Debug, Clone)]
pub struct PagePayload {
    pub embed: serenity::CreateEmbed,
    pub attachments: Vec<PageAttachment>,
    pub components: NavComponents,
    pub page_label: Option<String>,
}

/// Callbacks a command supplies to draw its pages.
///
/// Only [`render_embed`](PageRenderer::render_embed) is required.
#[async_trait]
pub trait PageRenderer<T: Send + Sync>: Send + Sync {
    async fn render_embed(
        &self,
        items: &[T],
        page: PageContext,
    ) -> anyhow::Result<serenity::CreateEmbed>;

    async fn render_image(
        &self,
        _items: &[T],
        _page: PageContext,
    ) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn render_select_menu(&self, _items: &[T]) -> Option<SelectMenuSpec> {
        None
    }

    /// Resolve a select-menu value picked while `items` were on screen.
    ///
    /// `Ok(None)` leaves the message untouched.
    async fn resolve_selection(
        &self,
        _value: &str,
        _items: &[T],
    ) -> anyhow::Result<Option<SelectionView>> {
        Ok(None)
    }
}

/// Presentation options shared by every render of a session.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub show_page_numbers: bool,
    pub image_filename: String,
    pub thumbnail: Option<PageAttachment>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_page_numbers: true,
            image_filename: DEFAULT_IMAGE_FILENAME.to_string(),
            thumbnail: None,
        }
    }
}

impl RenderOptions {
    /// Attach the per-page image and the precomputed thumbnail to `embed`.
    pub fn assemble(
        &self,
        mut embed: serenity::CreateEmbed,
        image: Option<Vec<u8>>,
        components: NavComponents,
        page: Option<PageContext>,
    ) -> PagePayload {
        let mut attachments = Vec::new();

        if let Some(thumbnail) = &self.thumbnail {
            embed = embed.thumbnail(thumbnail.url());
            attachments.push(thumbnail.clone());
        }

        if let Some(data) = image {
            let image = PageAttachment::new(self.image_filename.clone(), data);
            embed = embed.image(image.url());
            attachments.push(image);
        }

        let page_label = match page {
            Some(page) if self.show_page_numbers => {
                let label = page.label();
                embed = embed.footer(serenity::CreateEmbedFooter::new(label.clone()));
                Some(label)
            }
            _ => None,
        };

        PagePayload {
            embed,
            attachments,
            components,
            page_label,
        }
    }
}

/// Render `items` (the slice of `page`) into a payload.
pub async fn render_page<T, R>(
    renderer: &R,
    items: &[T],
    page: PageContext,
    options: &RenderOptions,
    components: NavComponents,
) -> anyhow::Result<PagePayload>
where
    T: Send + Sync,
    R: PageRenderer<T> + ?Sized,
{
    let embed = renderer.render_embed(items, page).await?;
    let image = renderer.render_image(items, page).await?;
    Ok(options.assemble(embed, image, components, Some(page)))
}
