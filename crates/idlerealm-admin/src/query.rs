//! Admin view state mirrored into the URL query string
//!
//! Read direction: recognized keys present in the query overwrite the local
//! state only when they differ. Write direction: the query is rebuilt from
//! the state with default-valued keys omitted, and only published when it
//! changed. `QuerySync` remembers its own last write so the navigation event
//! it triggers is not mistaken for an external one.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;
use std::str::FromStr;

/// Characters escaped in query values (RFC 3986 unreserved are kept)
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Top-level admin tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Realms,
    Resources,
    Factories,
    Skills,
    RealmUnlockCosts,
    Endgame,
    Players,
    Tickets,
    Logs,
}

impl AdminTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminTab::Realms => "realms",
            AdminTab::Resources => "resources",
            AdminTab::Factories => "factories",
            AdminTab::Skills => "skills",
            AdminTab::RealmUnlockCosts => "unlock-costs",
            AdminTab::Endgame => "endgame",
            AdminTab::Players => "players",
            AdminTab::Tickets => "tickets",
            AdminTab::Logs => "logs",
        }
    }
}

impl fmt::Display for AdminTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminTab {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "realms" => Ok(AdminTab::Realms),
            "resources" => Ok(AdminTab::Resources),
            "factories" => Ok(AdminTab::Factories),
            "skills" => Ok(AdminTab::Skills),
            "unlock-costs" => Ok(AdminTab::RealmUnlockCosts),
            "endgame" => Ok(AdminTab::Endgame),
            "players" => Ok(AdminTab::Players),
            "tickets" => Ok(AdminTab::Tickets),
            "logs" => Ok(AdminTab::Logs),
            _ => Err(()),
        }
    }
}

/// Sort direction of a paged table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        })
    }
}

impl FromStr for SortDir {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            _ => Err(()),
        }
    }
}

macro_rules! view_state {
    ($($field:ident: $ty:ty = $key:literal => $default:expr;)*) => {
        /// Admin UI state that survives reloads through the URL
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct AdminViewState {
            $(pub $field: $ty,)*
        }

        impl Default for AdminViewState {
            fn default() -> Self {
                Self {
                    $($field: $default,)*
                }
            }
        }

        impl AdminViewState {
            /// Query keys, in the order they are written
            pub const KEYS: &'static [&'static str] = &[$($key),*];

            /// Current value of a key as query text
            pub fn get(&self, key: &str) -> Option<String> {
                match key {
                    $($key => Some(self.$field.to_string()),)*
                    _ => None,
                }
            }

            /// Set a key from query text; returns whether anything changed
            ///
            /// Unknown keys and unparsable values leave the state untouched.
            pub fn set(&mut self, key: &str, raw: &str) -> bool {
                match key {
                    $($key => match raw.parse::<$ty>() {
                        Ok(value) if value != self.$field => {
                            self.$field = value;
                            true
                        }
                        _ => false,
                    },)*
                    _ => false,
                }
            }

            fn non_default_pairs(&self) -> Vec<(&'static str, String)> {
                let defaults = Self::default();
                let mut pairs = Vec::new();
                $(
                    if self.$field != defaults.$field {
                        pairs.push(($key, self.$field.to_string()));
                    }
                )*
                pairs
            }
        }
    };
}

view_state! {
    tab: AdminTab = "tab" => AdminTab::Realms;
    realm_search: String = "realmSearch" => String::new();
    resource_search: String = "resourceSearch" => String::new();
    resource_realm: String = "resourceRealm" => String::new();
    factory_search: String = "factorySearch" => String::new();
    factory_realm: String = "factoryRealm" => String::new();
    skill_search: String = "skillSearch" => String::new();
    skill_realm: String = "skillRealm" => String::new();
    unlock_search: String = "unlockSearch" => String::new();
    endgame_search: String = "endgameSearch" => String::new();
    player_search: String = "playerSearch" => String::new();
    player_page: u32 = "playerPage" => 1;
    player_page_size: u32 = "playerPageSize" => 25;
    player_sort: String = "playerSort" => "createdAt".to_string();
    player_sort_dir: SortDir = "playerSortDir" => SortDir::Desc;
    ticket_search: String = "ticketSearch" => String::new();
    ticket_status: String = "ticketStatus" => String::new();
    ticket_page: u32 = "ticketPage" => 1;
    ticket_page_size: u32 = "ticketPageSize" => 25;
    log_search: String = "logSearch" => String::new();
    log_level: String = "logLevel" => String::new();
    log_page: u32 = "logPage" => 1;
    log_page_size: u32 = "logPageSize" => 50;
}

impl AdminViewState {
    /// Parse a full query string into a fresh state
    pub fn from_query(query: &str) -> Self {
        let mut state = Self::default();
        state.apply_query(query);
        state
    }

    /// Push recognized keys from a query into the state
    ///
    /// Keys absent from the query keep their current value.
    pub fn apply_query(&mut self, query: &str) -> bool {
        let mut changed = false;
        for (key, value) in parse_query(query) {
            changed |= self.set(&key, &value);
        }
        changed
    }

    /// Query string for this state, without the leading `?`
    pub fn to_query(&self) -> String {
        self.non_default_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", utf8_percent_encode(&value, QUERY_VALUE)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Decode `a=1&b=x+y` into pairs; a leading `?` is accepted
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Two-way binding between [`AdminViewState`] and the page URL
#[derive(Debug, Clone, Default)]
pub struct QuerySync {
    state: AdminViewState,
    current_query: String,
    ignore_next_external: bool,
}

impl QuerySync {
    /// Start from the query the page was loaded with
    pub fn new(initial_query: &str) -> Self {
        let query = initial_query.trim_start_matches('?');
        Self {
            state: AdminViewState::from_query(query),
            current_query: query.to_string(),
            ignore_next_external: false,
        }
    }

    pub fn state(&self) -> &AdminViewState {
        &self.state
    }

    /// Mutate the state; follow with [`QuerySync::on_state_change`]
    pub fn state_mut(&mut self) -> &mut AdminViewState {
        &mut self.state
    }

    /// The query string the URL currently carries
    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    /// The URL changed; returns whether local state was updated
    ///
    /// The echo of this component's own last write is skipped once.
    pub fn on_external_navigation(&mut self, query: &str) -> bool {
        let query = query.trim_start_matches('?');
        if std::mem::take(&mut self.ignore_next_external) && query == self.current_query {
            return false;
        }
        self.current_query = query.to_string();
        self.state.apply_query(query)
    }

    /// Local state changed; returns the query to replace the URL with, if any
    pub fn on_state_change(&mut self) -> Option<String> {
        let next = self.state.to_query();
        if next == self.current_query {
            return None;
        }
        self.current_query = next.clone();
        self.ignore_next_external = true;
        Some(next)
    }
}
