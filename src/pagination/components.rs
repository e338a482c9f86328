//! Navigation component builder (previous/next/stop buttons and select menu).

use poise::serenity_prelude as serenity;

use super::session::PageContext;
use super::token::{ActionKind, ComponentToken};

/// Discord allows at most this many options in one select menu.
pub const MAX_SELECT_OPTIONS: usize = 25;
const MAX_OPTION_TEXT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavButton {
    pub kind: ActionKind,
    pub custom_id: String,
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub description: Option<String>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Select menu requested by a renderer for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectMenuSpec {
    pub placeholder: String,
    pub options: Vec<SelectOption>,
}

impl SelectMenuSpec {
    pub fn new(placeholder: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            placeholder: placeholder.into(),
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSelect {
    pub custom_id: String,
    pub spec: SelectMenuSpec,
}

/// Interactive controls attached to a paginated message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavComponents {
    pub buttons: Vec<NavButton>,
    pub select: Option<NavSelect>,
}

impl NavComponents {
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty() && self.select.is_none()
    }

    pub fn button(&self, kind: ActionKind) -> Option<&NavButton> {
        self.buttons.iter().find(|b| b.kind == kind)
    }

    /// Terminal form: every button greyed out, select menu removed.
    pub fn disabled(&self) -> Self {
        Self {
            buttons: self
                .buttons
                .iter()
                .cloned()
                .map(|b| NavButton {
                    disabled: true,
                    ..b
                })
                .collect(),
            select: None,
        }
    }

    pub fn all_disabled(&self) -> bool {
        self.select.is_none() && self.buttons.iter().all(|b| b.disabled)
    }

    pub fn to_action_rows(&self) -> Vec<serenity::CreateActionRow> {
        let mut rows = Vec::new();

        if let Some(select) = &self.select {
            let options = select
                .spec
                .options
                .iter()
                .take(MAX_SELECT_OPTIONS)
                .map(|option| {
                    let mut created = serenity::CreateSelectMenuOption::new(
                        clip(&option.label),
                        option.value.clone(),
                    );
                    if let Some(description) = &option.description {
                        created = created.description(clip(description));
                    }
                    created
                })
                .collect();

            rows.push(serenity::CreateActionRow::SelectMenu(
                serenity::CreateSelectMenu::new(
                    select.custom_id.clone(),
                    serenity::CreateSelectMenuKind::String { options },
                )
                .placeholder(clip(&select.spec.placeholder)),
            ));
        }

        if !self.buttons.is_empty() {
            let buttons = self
                .buttons
                .iter()
                .map(|b| {
                    let style = match b.kind {
                        ActionKind::Stop => serenity::ButtonStyle::Danger,
                        _ => serenity::ButtonStyle::Secondary,
                    };
                    serenity::CreateButton::new(b.custom_id.clone())
                        .label(b.label)
                        .style(style)
                        .disabled(b.disabled)
                })
                .collect();
            rows.push(serenity::CreateActionRow::Buttons(buttons));
        }

        rows
    }
}

/// Build the controls for `page`.
///
/// Navigation buttons are only emitted when there is more than one page.
pub fn build_components(
    session_key: &str,
    owner_id: u64,
    page: PageContext,
    select: Option<SelectMenuSpec>,
    show_stop: bool,
) -> NavComponents {
    let token = |kind| ComponentToken::new(kind, owner_id, session_key).custom_id();
    let mut buttons = Vec::new();

    if page.total > 1 {
        buttons.push(NavButton {
            kind: ActionKind::Prev,
            custom_id: token(ActionKind::Prev),
            label: "◀ Prev",
            disabled: page.is_first(),
        });
        buttons.push(NavButton {
            kind: ActionKind::Next,
            custom_id: token(ActionKind::Next),
            label: "Next ▶",
            disabled: page.is_last(),
        });
    }

    if show_stop {
        buttons.push(NavButton {
            kind: ActionKind::Stop,
            custom_id: token(ActionKind::Stop),
            label: "✖ Close",
            disabled: false,
        });
    }

    let select = select
        .filter(|spec| !spec.options.is_empty())
        .map(|spec| NavSelect {
            custom_id: token(ActionKind::Select),
            spec,
        });

    NavComponents { buttons, select }
}

fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_OPTION_TEXT {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(MAX_OPTION_TEXT - 1).collect();
    clipped.push('…');
    clipped
}
