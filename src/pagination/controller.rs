//! Interaction collector and dispatch loop.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::components::{build_components, NavComponents};
use super::error::{PaginationError, TransportError};
use super::render::{render_page, PageAttachment, PagePayload, PageRenderer, RenderOptions};
use super::session::{PaginationSession, SessionState};
use super::token::{ActionKind, ComponentToken};
use super::transport::{ComponentEvent, InteractionTransport};
use super::DEFAULT_IDLE_TIMEOUT;

const DEFAULT_UNAUTHORIZED_NOTICE: &str = "This menu belongs to someone else.";

/// Maps the clicker's locale to the text of the unauthorized notice.
pub type NoticeFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Everything a command hands to [`start_pagination`].
pub struct PaginationConfig<T, R> {
    pub items: Vec<T>,
    pub items_per_page: usize,
    pub renderer: R,
    pub owner_id: u64,
    pub idle_timeout: Duration,
    pub show_page_numbers: bool,
    pub show_stop_button: bool,
    /// Static attachment re-sent with every page.
    pub thumbnail: Option<PageAttachment>,
    pub image_filename: String,
    /// Ephemeral reply for anyone but the owner, in their locale.
    pub unauthorized_notice: NoticeFn,
}

impl<T, R> PaginationConfig<T, R> {
    pub fn new(items: Vec<T>, renderer: R, owner_id: u64) -> Self {
        let defaults = RenderOptions::default();
        Self {
            items,
            items_per_page: 1,
            renderer,
            owner_id,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            show_page_numbers: defaults.show_page_numbers,
            show_stop_button: false,
            thumbnail: None,
            image_filename: defaults.image_filename,
            unauthorized_notice: Box::new(|_| DEFAULT_UNAUTHORIZED_NOTICE.to_string()),
        }
    }

    pub fn items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    pub fn idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn show_page_numbers(mut self, show: bool) -> Self {
        self.show_page_numbers = show;
        self
    }

    pub fn show_stop_button(mut self, show: bool) -> Self {
        self.show_stop_button = show;
        self
    }

    pub fn thumbnail(mut self, thumbnail: PageAttachment) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn image_filename(mut self, filename: impl Into<String>) -> Self {
        self.image_filename = filename.into();
        self
    }

    pub fn unauthorized_notice<F>(mut self, notice: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.unauthorized_notice = Box::new(notice);
        self
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Nothing to interact with; no collector was attached.
    Static,
    /// The owner pressed stop.
    Stopped,
    /// The idle deadline passed.
    Expired,
    /// An edit failed; the message is gone or out of reach.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub end: SessionEnd,
    pub final_page: usize,
    pub accepted_events: usize,
}

enum Authorization {
    Accepted(ActionKind),
    Unauthorized,
    Foreign(String),
}

/// Drives one paginated message from first render to teardown.
pub struct Paginator<T, R> {
    session: PaginationSession<T>,
    renderer: R,
    options: RenderOptions,
    idle_timeout: Duration,
    show_stop_button: bool,
    unauthorized_notice: NoticeFn,
    session_key: String,
    components: NavComponents,
    accepted_events: usize,
}

impl<T, R> Paginator<T, R>
where
    T: Send + Sync,
    R: PageRenderer<T>,
{
    /// Validate `config`. Nothing is sent yet.
    pub fn new(config: PaginationConfig<T, R>) -> Result<Self, PaginationError> {
        if config.idle_timeout.is_zero() {
            return Err(PaginationError::ZeroIdleTimeout);
        }
        let session =
            PaginationSession::new(config.items, config.items_per_page, config.owner_id)?;

        Ok(Self {
            session,
            renderer: config.renderer,
            options: RenderOptions {
                show_page_numbers: config.show_page_numbers,
                image_filename: config.image_filename,
                thumbnail: config.thumbnail,
            },
            idle_timeout: config.idle_timeout,
            show_stop_button: config.show_stop_button,
            unauthorized_notice: config.unauthorized_notice,
            session_key: String::new(),
            components: NavComponents::default(),
            accepted_events: 0,
        })
    }

    /// Send the first page and wait until the session ends.
    pub async fn run<Tr>(mut self, transport: &mut Tr) -> Result<SessionOutcome, PaginationError>
    where
        Tr: InteractionTransport,
    {
        self.open(transport).await?;
        Ok(self.drive(transport).await)
    }

    async fn render(&self, page: usize) -> anyhow::Result<PagePayload> {
        let context = self.session.context(page);
        let items = self.session.page_items(page);
        let components = build_components(
            &self.session_key,
            self.session.owner_id(),
            context,
            self.renderer.render_select_menu(items),
            self.show_stop_button,
        );
        render_page(&self.renderer, items, context, &self.options, components).await
    }

    async fn open<Tr>(&mut self, transport: &mut Tr) -> Result<(), PaginationError>
    where
        Tr: InteractionTransport,
    {
        self.session_key = transport.session_key();

        let payload = self.render(0).await.map_err(PaginationError::Render)?;
        let components = payload.components.clone();
        transport
            .send(payload)
            .await
            .map_err(PaginationError::InitialSend)?;

        self.components = components;
        self.session.activate();
        info!(
            "Pagination session {} opened for user {} ({} pages)",
            self.session_key,
            self.session.owner_id(),
            self.session.total_pages()
        );
        Ok(())
    }

    async fn drive<Tr>(mut self, transport: &mut Tr) -> SessionOutcome
    where
        Tr: InteractionTransport,
    {
        if self.components.is_empty() {
            return self.finish(SessionEnd::Static);
        }

        let mut deadline = Instant::now() + self.idle_timeout;
        let mut last_accepted: Option<ComponentEvent<Tr::Interaction>> = None;

        loop {
            let Some(event) = transport.next_event(deadline).await else {
                return self.expire(transport, last_accepted.as_ref()).await;
            };

            let action = match self.authorize(&event) {
                Authorization::Accepted(action) => action,
                Authorization::Unauthorized => {
                    debug!(
                        "User {} tried to drive pagination session {}",
                        event.actor_id, self.session_key
                    );
                    let notice = (self.unauthorized_notice)(&event.locale);
                    if let Err(e) = transport.answer_ephemeral(&event, &notice).await {
                        warn!("Failed to answer unauthorized interaction: {}", e);
                    }
                    continue;
                }
                Authorization::Foreign(reason) => {
                    debug!(
                        "Ignoring component {} on session {}: {}",
                        event.custom_id, self.session_key, reason
                    );
                    self.acknowledge(transport, &event).await;
                    continue;
                }
            };

            deadline = Instant::now() + self.idle_timeout;
            self.accepted_events += 1;

            let applied = match action {
                ActionKind::Stop => return self.terminate(transport, &event).await,
                ActionKind::Prev | ActionKind::Next => {
                    self.navigate(transport, &event, action).await
                }
                ActionKind::Select => self.select(transport, &event).await,
            };

            if let Err(e) = applied {
                warn!(
                    "Pagination session {} lost its message: {}",
                    self.session_key, e
                );
                self.session.end(SessionState::Expired);
                return self.finish(SessionEnd::Detached);
            }
            last_accepted = Some(event);
        }
    }

    fn authorize<I>(&self, event: &ComponentEvent<I>) -> Authorization {
        let token: ComponentToken = match event.custom_id.parse() {
            Ok(token) => token,
            Err(e) => return Authorization::Foreign(format!("{e}")),
        };

        if token.session != self.session_key {
            return Authorization::Foreign("token minted for another session".to_string());
        }

        let owner = self.session.owner_id();
        if event.actor_id != owner || token.owner_id != owner {
            return Authorization::Unauthorized;
        }

        Authorization::Accepted(token.kind)
    }

    async fn navigate<Tr>(
        &mut self,
        transport: &mut Tr,
        event: &ComponentEvent<Tr::Interaction>,
        action: ActionKind,
    ) -> Result<(), TransportError>
    where
        Tr: InteractionTransport,
    {
        // Answer before rendering; a render may outlast the 3 second window.
        self.acknowledge(transport, event).await;

        let target = self.session.target_page(action);
        if target == self.session.current_page() {
            return Ok(());
        }

        let payload = match self.render(target).await {
            Ok(payload) => payload,
            Err(e) => {
                error!(
                    "Failed to render page {} of session {}: {:#}",
                    target + 1,
                    self.session_key,
                    e
                );
                return Ok(());
            }
        };

        let components = payload.components.clone();
        transport.update(event, payload).await?;

        self.session.set_page(target);
        self.components = components;
        Ok(())
    }

    async fn select<Tr>(
        &mut self,
        transport: &mut Tr,
        event: &ComponentEvent<Tr::Interaction>,
    ) -> Result<(), TransportError>
    where
        Tr: InteractionTransport,
    {
        self.acknowledge(transport, event).await;
        let Some(value) = event.values.first() else {
            return Ok(());
        };

        let items = self.session.page_items(self.session.current_page());
        let view = match self.renderer.resolve_selection(value, items).await {
            Ok(Some(view)) => view,
            Ok(None) => return Ok(()),
            Err(e) => {
                error!(
                    "Failed to resolve selection `{}` in session {}: {:#}",
                    value, self.session_key, e
                );
                return Ok(());
            }
        };

        let payload = self
            .options
            .assemble(view.embed, view.image, self.components.clone(), None);
        transport.update(event, payload).await
    }

    async fn terminate<Tr>(
        mut self,
        transport: &mut Tr,
        event: &ComponentEvent<Tr::Interaction>,
    ) -> SessionOutcome
    where
        Tr: InteractionTransport,
    {
        self.session.end(SessionState::Terminated);
        self.acknowledge(transport, event).await;
        if let Err(e) = transport
            .disable(Some(event), self.components.disabled())
            .await
        {
            debug!(
                "Could not disable components of session {}: {}",
                self.session_key, e
            );
        }
        self.finish(SessionEnd::Stopped)
    }

    async fn expire<Tr>(
        mut self,
        transport: &mut Tr,
        last_accepted: Option<&ComponentEvent<Tr::Interaction>>,
    ) -> SessionOutcome
    where
        Tr: InteractionTransport,
    {
        self.session.end(SessionState::Expired);
        if let Err(e) = transport
            .disable(last_accepted, self.components.disabled())
            .await
        {
            debug!(
                "Could not disable components of expired session {}: {}",
                self.session_key, e
            );
        }
        self.finish(SessionEnd::Expired)
    }

    async fn acknowledge<Tr>(&self, transport: &mut Tr, event: &ComponentEvent<Tr::Interaction>)
    where
        Tr: InteractionTransport,
    {
        if let Err(e) = transport.acknowledge(event).await {
            warn!(
                "Failed to acknowledge interaction on session {}: {}",
                self.session_key, e
            );
        }
    }

    fn finish(self, end: SessionEnd) -> SessionOutcome {
        info!(
            "Pagination session {} ended ({:?}) after {} events",
            self.session_key, end, self.accepted_events
        );
        SessionOutcome {
            end,
            final_page: self.session.current_page(),
            accepted_events: self.accepted_events,
        }
    }
}

/// Validate `config`, send the first page and drive the session to its end.
pub async fn start_pagination<T, R, Tr>(
    config: PaginationConfig<T, R>,
    transport: &mut Tr,
) -> Result<SessionOutcome, PaginationError>
where
    T: Send + Sync,
    R: PageRenderer<T>,
    Tr: InteractionTransport,
{
    Paginator::new(config)?.run(transport).await
}

/// Like [`start_pagination`] but returns as soon as the first page is on screen.
pub async fn spawn_pagination<T, R, Tr>(
    config: PaginationConfig<T, R>,
    mut transport: Tr,
) -> Result<JoinHandle<SessionOutcome>, PaginationError>
where
    T: Send + Sync + 'static,
    R: PageRenderer<T> + 'static,
    Tr: InteractionTransport + 'static,
{
    let mut paginator = Paginator::new(config)?;
    paginator.open(&mut transport).await?;
    Ok(tokio::spawn(async move {
        paginator.drive(&mut transport).await
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use poise::serenity_prelude as serenity;
    use tokio::sync::mpsc;

    use super::*;
    use crate::pagination::components::{SelectMenuSpec, SelectOption};
    use crate::pagination::render::SelectionView;
    use crate::pagination::session::PageContext;

    const OWNER: u64 = 1001;
    const STRANGER: u64 = 2002;
    const SESSION: &str = "sess";
    const IDLE: Duration = Duration::from_millis(1000);

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Sent(Option<String>),
        Updated(u32, Option<String>),
        Acknowledged(u32),
        Ephemeral(u32, String),
        /// Disabled through the given event, or the command when `None`.
        Disabled(Option<u32>),
    }

    #[derive(Default)]
    struct Log {
        calls: Vec<Call>,
        components: Vec<NavComponents>,
    }

    type Shared<V> = Arc<Mutex<V>>;

    struct FakeTransport {
        events: mpsc::UnboundedReceiver<ComponentEvent<u32>>,
        log: Shared<Log>,
        fail_send: bool,
        fail_update: bool,
    }

    impl FakeTransport {
        fn new() -> (Self, mpsc::UnboundedSender<ComponentEvent<u32>>, Shared<Log>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let log = Arc::new(Mutex::new(Log::default()));
            let transport = Self {
                events: rx,
                log: Arc::clone(&log),
                fail_send: false,
                fail_update: false,
            };
            (transport, tx, log)
        }

        fn record(&self, call: Call, components: Option<NavComponents>) {
            let mut log = self.log.lock().unwrap();
            log.calls.push(call);
            if let Some(components) = components {
                log.components.push(components);
            }
        }
    }

    #[async_trait]
    impl InteractionTransport for FakeTransport {
        type Interaction = u32;

        fn session_key(&self) -> String {
            SESSION.to_string()
        }

        async fn send(&mut self, payload: PagePayload) -> Result<(), TransportError> {
            if self.fail_send {
                return Err(TransportError::Other("missing access".to_string()));
            }
            self.record(Call::Sent(payload.page_label), Some(payload.components));
            Ok(())
        }

        async fn next_event(&mut self, deadline: Instant) -> Option<ComponentEvent<u32>> {
            tokio::time::timeout_at(deadline, self.events.recv())
                .await
                .ok()
                .flatten()
        }

        async fn update(
            &mut self,
            event: &ComponentEvent<u32>,
            payload: PagePayload,
        ) -> Result<(), TransportError> {
            if self.fail_update {
                return Err(TransportError::Other("unknown message".to_string()));
            }
            self.record(
                Call::Updated(event.interaction, payload.page_label),
                Some(payload.components),
            );
            Ok(())
        }

        async fn acknowledge(&mut self, event: &ComponentEvent<u32>) -> Result<(), TransportError> {
            self.record(Call::Acknowledged(event.interaction), None);
            Ok(())
        }

        async fn answer_ephemeral(
            &mut self,
            event: &ComponentEvent<u32>,
            message: &str,
        ) -> Result<(), TransportError> {
            self.record(Call::Ephemeral(event.interaction, message.to_string()), None);
            Ok(())
        }

        async fn disable(
            &mut self,
            via: Option<&ComponentEvent<u32>>,
            components: NavComponents,
        ) -> Result<(), TransportError> {
            self.record(Call::Disabled(via.map(|e| e.interaction)), Some(components));
            Ok(())
        }
    }

    #[derive(Default)]
    struct Letters {
        rendered: Shared<Vec<String>>,
        fail_on_page: Option<usize>,
        slow_page: Option<(usize, Duration)>,
        with_menu: bool,
        fail_selection: bool,
    }

    #[async_trait]
    impl PageRenderer<char> for Letters {
        async fn render_embed(
            &self,
            items: &[char],
            page: PageContext,
        ) -> anyhow::Result<serenity::CreateEmbed> {
            if self.fail_on_page == Some(page.index) {
                anyhow::bail!("backend unavailable");
            }
            if let Some((slow, delay)) = self.slow_page {
                if slow == page.index {
                    tokio::time::sleep(delay).await;
                }
            }
            let text: String = items.iter().collect();
            self.rendered.lock().unwrap().push(text.clone());
            Ok(serenity::CreateEmbed::new().description(text))
        }

        fn render_select_menu(&self, items: &[char]) -> Option<SelectMenuSpec> {
            self.with_menu.then(|| {
                SelectMenuSpec::new(
                    "Pick a letter",
                    items
                        .iter()
                        .map(|c| SelectOption::new(c.to_string(), c.to_string()))
                        .collect(),
                )
            })
        }

        async fn resolve_selection(
            &self,
            value: &str,
            items: &[char],
        ) -> anyhow::Result<Option<SelectionView>> {
            if self.fail_selection {
                anyhow::bail!("detail lookup timed out");
            }
            let found = items.iter().any(|c| c.to_string() == value);
            Ok(found.then(|| {
                SelectionView::new(serenity::CreateEmbed::new().title(value.to_string()))
            }))
        }
    }

    fn letters(n: usize) -> Vec<char> {
        ('A'..='Z').take(n).collect()
    }

    fn config(items: Vec<char>, renderer: Letters) -> PaginationConfig<char, Letters> {
        PaginationConfig::new(items, renderer, OWNER)
            .items_per_page(3)
            .idle_timeout(IDLE)
            .unauthorized_notice(|_| "not yours".to_string())
    }

    fn click(id: u32, actor: u64, kind: ActionKind) -> ComponentEvent<u32> {
        ComponentEvent {
            actor_id: actor,
            custom_id: ComponentToken::new(kind, OWNER, SESSION).custom_id(),
            values: Vec::new(),
            locale: "en-US".to_string(),
            interaction: id,
        }
    }

    fn choose(id: u32, value: &str) -> ComponentEvent<u32> {
        ComponentEvent {
            values: vec![value.to_string()],
            ..click(id, OWNER, ActionKind::Select)
        }
    }

    fn calls(log: &Shared<Log>) -> Vec<Call> {
        log.lock().unwrap().calls.clone()
    }

    fn disabled_count(log: &Shared<Log>) -> usize {
        calls(log)
            .iter()
            .filter(|c| matches!(c, Call::Disabled(_)))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn walks_nine_items_in_three_pages() {
        let (mut transport, tx, log) = FakeTransport::new();
        let renderer = Letters::default();
        let rendered = Arc::clone(&renderer.rendered);

        tx.send(click(1, OWNER, ActionKind::Next)).unwrap();
        tx.send(click(2, OWNER, ActionKind::Next)).unwrap();

        let outcome = start_pagination(config(letters(9), renderer), &mut transport)
            .await
            .unwrap();

        assert_eq!(*rendered.lock().unwrap(), ["ABC", "DEF", "GHI"]);
        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/3".to_string())),
                Call::Acknowledged(1),
                Call::Updated(1, Some("2/3".to_string())),
                Call::Acknowledged(2),
                Call::Updated(2, Some("3/3".to_string())),
                Call::Disabled(Some(2)),
            ]
        );

        let log = log.lock().unwrap();
        let last_page = &log.components[2];
        assert!(last_page.button(ActionKind::Next).unwrap().disabled);
        assert!(!last_page.button(ActionKind::Prev).unwrap().disabled);
        assert!(log.components[3].all_disabled());

        assert_eq!(outcome.end, SessionEnd::Expired);
        assert_eq!(outcome.final_page, 2);
        assert_eq!(outcome.accepted_events, 2);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_items_are_rejected_before_sending() {
        let (mut transport, _tx, log) = FakeTransport::new();

        let result = start_pagination(config(Vec::new(), Letters::default()), &mut transport).await;

        assert!(matches!(result, Err(PaginationError::EmptyItems)));
        assert!(calls(&log).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_page_size_and_timeout_are_rejected() {
        let (mut transport, _tx, log) = FakeTransport::new();

        let result = start_pagination(
            config(letters(3), Letters::default()).items_per_page(0),
            &mut transport,
        )
        .await;
        assert!(matches!(result, Err(PaginationError::ZeroItemsPerPage)));

        let result = start_pagination(
            config(letters(3), Letters::default()).idle_timeout(Duration::ZERO),
            &mut transport,
        )
        .await;
        assert!(matches!(result, Err(PaginationError::ZeroIdleTimeout)));
        assert!(calls(&log).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn boundary_presses_do_not_move_the_page() {
        let (mut transport, tx, log) = FakeTransport::new();

        tx.send(click(1, OWNER, ActionKind::Prev)).unwrap();
        tx.send(click(2, OWNER, ActionKind::Next)).unwrap();
        tx.send(click(3, OWNER, ActionKind::Next)).unwrap();

        let outcome = start_pagination(config(letters(6), Letters::default()), &mut transport)
            .await
            .unwrap();

        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/2".to_string())),
                Call::Acknowledged(1),
                Call::Acknowledged(2),
                Call::Updated(2, Some("2/2".to_string())),
                Call::Acknowledged(3),
                Call::Disabled(Some(3)),
            ]
        );
        assert_eq!(outcome.final_page, 1);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn strangers_get_one_ephemeral_notice_each() {
        let (mut transport, tx, log) = FakeTransport::new();

        tx.send(click(1, STRANGER, ActionKind::Next)).unwrap();
        tx.send(click(2, STRANGER, ActionKind::Stop)).unwrap();

        let outcome = start_pagination(config(letters(9), Letters::default()), &mut transport)
            .await
            .unwrap();

        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/3".to_string())),
                Call::Ephemeral(1, "not yours".to_string()),
                Call::Ephemeral(2, "not yours".to_string()),
                Call::Disabled(None),
            ]
        );
        assert_eq!(outcome.end, SessionEnd::Expired);
        assert_eq!(outcome.final_page, 0);
        assert_eq!(outcome.accepted_events, 0);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn tokens_naming_another_owner_are_unauthorized() {
        let (mut transport, tx, log) = FakeTransport::new();

        tx.send(ComponentEvent {
            actor_id: STRANGER,
            custom_id: ComponentToken::new(ActionKind::Next, STRANGER, SESSION).custom_id(),
            values: Vec::new(),
            locale: "en-US".to_string(),
            interaction: 1,
        })
        .unwrap();

        start_pagination(config(letters(9), Letters::default()), &mut transport)
            .await
            .unwrap();

        assert_eq!(calls(&log)[1], Call::Ephemeral(1, "not yours".to_string()));
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_is_disabled_exactly_once() {
        let (mut transport, tx, log) = FakeTransport::new();
        let started = Instant::now();

        let outcome = start_pagination(config(letters(9), Letters::default()), &mut transport)
            .await
            .unwrap();

        assert_eq!(outcome.end, SessionEnd::Expired);
        assert!(started.elapsed() >= IDLE);
        assert_eq!(
            calls(&log),
            [Call::Sent(Some("1/3".to_string())), Call::Disabled(None)]
        );

        // Late events are never seen.
        tx.send(click(9, OWNER, ActionKind::Next)).unwrap();
        tokio::time::sleep(IDLE * 3).await;
        assert_eq!(disabled_count(&log), 1);
        assert_eq!(calls(&log).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_events_push_the_deadline_back() {
        let (transport, tx, log) = FakeTransport::new();
        let handle = spawn_pagination(config(letters(9), Letters::default()), transport)
            .await
            .unwrap();

        tx.send(click(1, OWNER, ActionKind::Next)).unwrap();
        tokio::time::sleep(IDLE - Duration::from_millis(1)).await;
        tx.send(click(2, OWNER, ActionKind::Prev)).unwrap();

        // 2 * IDLE - 2ms after the start.
        tokio::time::sleep(IDLE - Duration::from_millis(1)).await;
        assert_eq!(disabled_count(&log), 0);
        assert!(!handle.is_finished());

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(disabled_count(&log), 1);

        let outcome = handle.await.unwrap();
        assert_eq!(outcome.end, SessionEnd::Expired);
        assert_eq!(outcome.accepted_events, 2);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn stranger_clicks_do_not_extend_the_deadline() {
        let (transport, tx, log) = FakeTransport::new();
        let handle = spawn_pagination(config(letters(9), Letters::default()), transport)
            .await
            .unwrap();

        tokio::time::sleep(IDLE / 2).await;
        tx.send(click(1, STRANGER, ActionKind::Next)).unwrap();

        tokio::time::sleep(IDLE / 2 - Duration::from_millis(2)).await;
        assert_eq!(disabled_count(&log), 0);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(disabled_count(&log), 1);
        assert_eq!(handle.await.unwrap().accepted_events, 0);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_tears_down_immediately_and_ignores_later_clicks() {
        let (mut transport, tx, log) = FakeTransport::new();
        let config = config(letters(9), Letters::default()).show_stop_button(true);

        tx.send(click(1, OWNER, ActionKind::Next)).unwrap();
        tx.send(click(2, OWNER, ActionKind::Stop)).unwrap();
        tx.send(click(3, OWNER, ActionKind::Next)).unwrap();
        tx.send(click(4, STRANGER, ActionKind::Next)).unwrap();

        let started = Instant::now();
        let outcome = start_pagination(config, &mut transport).await.unwrap();

        assert!(started.elapsed() < IDLE);
        assert_eq!(outcome.end, SessionEnd::Stopped);
        assert_eq!(outcome.final_page, 1);
        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/3".to_string())),
                Call::Acknowledged(1),
                Call::Updated(1, Some("2/3".to_string())),
                Call::Acknowledged(2),
                Call::Disabled(Some(2)),
            ]
        );

        let log = log.lock().unwrap();
        let terminal = log.components.last().unwrap();
        assert!(terminal.all_disabled());
        assert!(terminal.button(ActionKind::Stop).is_some());
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_initial_send_propagates_without_a_session() {
        let (mut transport, _tx, log) = FakeTransport::new();
        transport.fail_send = true;

        let result = start_pagination(config(letters(9), Letters::default()), &mut transport).await;

        assert!(matches!(result, Err(PaginationError::InitialSend(_))));
        assert!(calls(&log).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_edit_detaches_without_another_edit() {
        let (mut transport, tx, log) = FakeTransport::new();
        transport.fail_update = true;

        tx.send(click(1, OWNER, ActionKind::Next)).unwrap();

        let outcome = start_pagination(config(letters(9), Letters::default()), &mut transport)
            .await
            .unwrap();

        assert_eq!(outcome.end, SessionEnd::Detached);
        assert_eq!(outcome.final_page, 0);
        assert_eq!(
            calls(&log),
            [Call::Sent(Some("1/3".to_string())), Call::Acknowledged(1)]
        );
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn render_failure_keeps_the_last_good_page() {
        let (mut transport, tx, log) = FakeTransport::new();
        let renderer = Letters {
            fail_on_page: Some(1),
            ..Letters::default()
        };

        tx.send(click(1, OWNER, ActionKind::Next)).unwrap();

        let outcome = start_pagination(config(letters(9), renderer), &mut transport)
            .await
            .unwrap();

        assert_eq!(outcome.end, SessionEnd::Expired);
        assert_eq!(outcome.final_page, 0);
        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/3".to_string())),
                Call::Acknowledged(1),
                Call::Disabled(Some(1)),
            ]
        );
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_first_render_is_reported() {
        let (mut transport, _tx, log) = FakeTransport::new();
        let renderer = Letters {
            fail_on_page: Some(0),
            ..Letters::default()
        };

        let result = start_pagination(config(letters(9), renderer), &mut transport).await;

        assert!(matches!(result, Err(PaginationError::Render(_))));
        assert!(calls(&log).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn selection_replaces_the_view_but_not_the_page() {
        let (mut transport, tx, log) = FakeTransport::new();
        let renderer = Letters {
            with_menu: true,
            ..Letters::default()
        };

        tx.send(click(1, OWNER, ActionKind::Next)).unwrap();
        tx.send(choose(2, "E")).unwrap();
        tx.send(choose(3, "A")).unwrap();

        let outcome = start_pagination(config(letters(9), renderer), &mut transport)
            .await
            .unwrap();

        assert_eq!(outcome.final_page, 1);
        assert_eq!(outcome.accepted_events, 3);
        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/3".to_string())),
                Call::Acknowledged(1),
                Call::Updated(1, Some("2/3".to_string())),
                Call::Acknowledged(2),
                Call::Updated(2, None),
                Call::Acknowledged(3),
                Call::Disabled(Some(3)),
            ]
        );

        let log = log.lock().unwrap();
        let menu = log.components[1].select.as_ref().unwrap();
        let values: Vec<_> = menu.spec.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["D", "E", "F"]);
        assert!(log.components[3].select.is_none());
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn foreign_components_are_acknowledged_and_ignored() {
        let (mut transport, tx, log) = FakeTransport::new();

        tx.send(ComponentEvent {
            actor_id: OWNER,
            custom_id: "confirm_tool".to_string(),
            values: Vec::new(),
            locale: "en-US".to_string(),
            interaction: 1,
        })
        .unwrap();
        tx.send(ComponentEvent {
            actor_id: OWNER,
            custom_id: ComponentToken::new(ActionKind::Next, OWNER, "other").custom_id(),
            values: Vec::new(),
            locale: "en-US".to_string(),
            interaction: 2,
        })
        .unwrap();

        let outcome = start_pagination(config(letters(9), Letters::default()), &mut transport)
            .await
            .unwrap();

        assert_eq!(outcome.accepted_events, 0);
        assert_eq!(outcome.final_page, 0);
        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/3".to_string())),
                Call::Acknowledged(1),
                Call::Acknowledged(2),
                Call::Disabled(None),
            ]
        );
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn single_page_without_controls_is_static() {
        let (mut transport, _tx, log) = FakeTransport::new();

        let outcome = start_pagination(config(letters(2), Letters::default()), &mut transport)
            .await
            .unwrap();

        assert_eq!(outcome.end, SessionEnd::Static);
        assert_eq!(calls(&log), [Call::Sent(Some("1/1".to_string()))]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_renders_are_acknowledged_first() {
        let (transport, tx, log) = FakeTransport::new();
        let renderer = Letters {
            slow_page: Some((1, Duration::from_secs(5))),
            ..Letters::default()
        };
        let config = config(letters(9), renderer).idle_timeout(Duration::from_secs(30));
        let handle = spawn_pagination(config, transport).await.unwrap();

        tx.send(click(1, OWNER, ActionKind::Next)).unwrap();

        // Well inside the 3 second response window, the page is still rendering.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(
            calls(&log),
            [Call::Sent(Some("1/3".to_string())), Call::Acknowledged(1)]
        );

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/3".to_string())),
                Call::Acknowledged(1),
                Call::Updated(1, Some("2/3".to_string())),
            ]
        );
        assert!(!handle.is_finished());

        let outcome = handle.await.unwrap();
        assert_eq!(outcome.end, SessionEnd::Expired);
        assert_eq!(outcome.final_page, 1);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_disables_through_the_latest_owner_interaction() {
        let (mut transport, tx, log) = FakeTransport::new();

        tx.send(click(1, OWNER, ActionKind::Next)).unwrap();
        tx.send(click(2, OWNER, ActionKind::Prev)).unwrap();
        tx.send(click(3, STRANGER, ActionKind::Next)).unwrap();
        tx.send(ComponentEvent {
            actor_id: OWNER,
            custom_id: "confirm_tool".to_string(),
            values: Vec::new(),
            locale: "en-US".to_string(),
            interaction: 4,
        })
        .unwrap();

        let outcome = start_pagination(config(letters(9), Letters::default()), &mut transport)
            .await
            .unwrap();

        assert_eq!(outcome.end, SessionEnd::Expired);
        assert_eq!(outcome.accepted_events, 2);
        // Neither the stranger nor the foreign component counts.
        assert_eq!(calls(&log).last(), Some(&Call::Disabled(Some(2))));
        assert_eq!(disabled_count(&log), 1);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn strangers_are_answered_in_their_own_locale() {
        let (mut transport, tx, log) = FakeTransport::new();
        let config = config(letters(9), Letters::default()).unauthorized_notice(|locale| {
            if locale.starts_with("de") {
                "Nicht dein Menü".to_string()
            } else {
                "not yours".to_string()
            }
        });

        tx.send(ComponentEvent {
            locale: "de".to_string(),
            ..click(1, STRANGER, ActionKind::Next)
        })
        .unwrap();
        tx.send(click(2, STRANGER, ActionKind::Next)).unwrap();

        start_pagination(config, &mut transport).await.unwrap();

        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/3".to_string())),
                Call::Ephemeral(1, "Nicht dein Menü".to_string()),
                Call::Ephemeral(2, "not yours".to_string()),
                Call::Disabled(None),
            ]
        );
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_selection_keeps_the_page_and_the_session() {
        let (mut transport, tx, log) = FakeTransport::new();
        let renderer = Letters {
            with_menu: true,
            fail_selection: true,
            ..Letters::default()
        };

        tx.send(choose(1, "B")).unwrap();
        tx.send(click(2, OWNER, ActionKind::Next)).unwrap();

        let outcome = start_pagination(config(letters(9), renderer), &mut transport)
            .await
            .unwrap();

        assert_eq!(outcome.end, SessionEnd::Expired);
        assert_eq!(outcome.final_page, 1);
        assert_eq!(outcome.accepted_events, 2);
        assert_eq!(
            calls(&log),
            [
                Call::Sent(Some("1/3".to_string())),
                Call::Acknowledged(1),
                Call::Acknowledged(2),
                Call::Updated(2, Some("2/3".to_string())),
                Call::Disabled(Some(2)),
            ]
        );
        drop(tx);
    }
}
