use std::fmt;

use clap::ValueEnum;

pub type Rating = u8;

/// Highest score bucket; bucket 0 counts unrated items.
pub const MAX_RATING: Rating = 10;

/// Catalog section a listing is drawn from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Category {
    Anime,
    Book,
    Music,
    Game,
    Real,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Anime => "anime",
            Category::Book => "book",
            Category::Music => "music",
            Category::Game => "game",
            Category::Real => "real",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection state a listing is filtered by.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum State {
    Wish,
    Collect,
    Do,
    OnHold,
    Dropped,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Wish => "wish",
            State::Collect => "collect",
            State::Do => "do",
            State::OnHold => "on_hold",
            State::Dropped => "dropped",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One catalog entry, a score in 0..=10 (0 means unrated) and the raw
/// tag spellings attached to it, in catalog order.
#[derive(Clone, Debug, Default)]
pub struct Item {
    pub score: Rating,
    pub tags: Vec<String>,
}
