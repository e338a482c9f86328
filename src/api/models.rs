use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Killer,
    Survivor,
}

impl Role {
    pub fn label_key(self) -> &'static str {
        match self {
            Role::Killer => "role.killer",
            Role::Survivor => "role.survivor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Killer => write!(f, "killer"),
            Role::Survivor => write!(f, "survivor"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Character {
    /// Numeric index the backend keys characters by; perks refer to it.
    #[serde(skip)]
    pub index: String,
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Item id of the killer power; add-ons list it as their parent.
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub perks: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub dlc: Option<String>,
}

impl Character {
    /// Name without the article killers carry, e.g. "Trapper" for "The Trapper".
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("The ").unwrap_or(&self.name)
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.id.eq_ignore_ascii_case(query)
            || self.index == query
            || self.name.eq_ignore_ascii_case(query)
            || self.short_name().eq_ignore_ascii_case(query)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Perk {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role: Option<Role>,
    /// Index of the owning character; `None` for general perks.
    #[serde(default)]
    pub character: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Bloodweb level at which the perk becomes teachable.
    #[serde(default)]
    pub teachable: Option<u32>,
}

impl Perk {
    pub fn belongs_to(&self, character: &Character) -> bool {
        self.character
            .map(|index| index.to_string() == character.index)
            .unwrap_or(false)
    }
}

/// Add-on rarities, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    VeryRare,
    UltraRare,
    Event,
    #[serde(other)]
    Unknown,
}

impl Rarity {
    /// Embed colour used by the game for this rarity.
    pub fn color(self) -> u32 {
        match self {
            Rarity::Common => 0x6b_5a_48,
            Rarity::Uncommon => 0xb6_a0_3c,
            Rarity::Rare => 0x2b_6e_3b,
            Rarity::VeryRare => 0x5c_2d_91,
            Rarity::UltraRare => 0xa6_1d_4c,
            Rarity::Event => 0xd6_8a_1b,
            Rarity::Unknown => 0x4f_54_5c,
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Rarity::Common => "rarity.common",
            Rarity::Uncommon => "rarity.uncommon",
            Rarity::Rare => "rarity.rare",
            Rarity::VeryRare => "rarity.very_rare",
            Rarity::UltraRare => "rarity.ultra_rare",
            Rarity::Event => "rarity.event",
            Rarity::Unknown => "rarity.unknown",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Addon {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role: Option<Role>,
    pub rarity: Rarity,
    /// Item ids (killer powers or survivor items) the add-on attaches to.
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Addon {
    pub fn fits(&self, character: &Character) -> bool {
        character
            .power
            .as_deref()
            .map(|power| self.parents.iter().any(|parent| parent == power))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShrinePerk {
    pub id: String,
    #[serde(default)]
    pub shards: u32,
    #[serde(default)]
    pub bloodpoints: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Shrine {
    pub id: i64,
    pub perks: Vec<ShrinePerk>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    /// Markdown body.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub published: DateTime<Utc>,
}

/// The backend returns catalogues as objects keyed by id; flatten them into
/// vectors sorted by key so listings are stable across calls.
pub(crate) fn flatten_keyed<T>(
    map: HashMap<String, T>,
    mut set_key: impl FnMut(&mut T, String),
) -> Vec<T> {
    let mut entries: Vec<(String, T)> = map.into_iter().collect();
    entries.sort_by(|a, b| natural_key(&a.0).cmp(&natural_key(&b.0)));
    entries
        .into_iter()
        .map(|(key, mut value)| {
            set_key(&mut value, key);
            value
        })
        .collect()
}

/// Numeric keys sort numerically, others after them alphabetically.
fn natural_key(key: &str) -> (u8, u64, &str) {
    match key.parse::<u64>() {
        Ok(n) => (0, n, key),
        Err(_) => (1, 0, key),
    }
}
