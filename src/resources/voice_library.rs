//! Shared voice library (`/shared-voices`).

use futures::{Stream, TryStreamExt};
use serde_json::{json, Value};

use super::validate_presence;
use crate::callbacks::VoiceAddedEvent;
use crate::transport::{HttpTransport, Query};
use crate::types::{LibraryVoice, LibraryVoicePage, Voice};
use crate::Result;

pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 30;
pub const CATEGORIES: &[&str] = &["professional", "famous", "high_quality"];

/// Search filters. Unset filters are left out of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct LibrarySearch {
    pub page_size: u32,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub accent: Option<String>,
    pub language: Option<String>,
    pub locale: Option<String>,
    pub search: Option<String>,
    pub use_cases: Vec<String>,
    pub featured: Option<bool>,
    pub reader_app_enabled: Option<bool>,
    pub owner_id: Option<String>,
    pub sort: Option<String>,
    /// `last_sort_id` of the previous page.
    pub cursor: Option<String>,
}

impl Default for LibrarySearch {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            category: None,
            gender: None,
            age: None,
            accent: None,
            language: None,
            locale: None,
            search: None,
            use_cases: Vec::new(),
            featured: None,
            reader_app_enabled: None,
            owner_id: None,
            sort: None,
            cursor: None,
        }
    }
}

macro_rules! string_filter {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name(mut self, value: impl Into<String>) -> Self {
                self.$name = Some(value.into());
                self
            }
        )*
    };
}

impl LibrarySearch {
    pub fn new() -> Self {
        Self::default()
    }

    string_filter!(category, gender, age, accent, language, locale, search, owner_id, sort, cursor);

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    pub fn use_cases<I, S>(mut self, cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.use_cases = cases.into_iter().map(Into::into).collect();
        self
    }

    pub fn featured(mut self, featured: bool) -> Self {
        self.featured = Some(featured);
        self
    }

    pub fn reader_app_enabled(mut self, enabled: bool) -> Self {
        self.reader_app_enabled = Some(enabled);
        self
    }

    pub fn to_query(&self) -> Query {
        let mut query = vec![(
            "page_size".to_string(),
            self.page_size.min(MAX_PAGE_SIZE).to_string(),
        )];
        let mut push = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                query.push((key.to_string(), v));
            }
        };
        push("category", self.category.clone());
        push("gender", self.gender.clone());
        push("age", self.age.clone());
        push("accent", self.accent.clone());
        push("language", self.language.clone());
        push("locale", self.locale.clone());
        push("search", self.search.clone());
        push(
            "use_cases",
            (!self.use_cases.is_empty()).then(|| self.use_cases.join(",")),
        );
        push("featured", self.featured.map(|b| b.to_string()));
        push("reader_app_enabled", self.reader_app_enabled.map(|b| b.to_string()));
        push("owner_id", self.owner_id.clone());
        push("sort", self.sort.clone());
        push("cursor", self.cursor.clone());
        query
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VoiceLibrary<'a> {
    transport: &'a HttpTransport,
}

impl<'a> VoiceLibrary<'a> {
    pub(crate) fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    /// Fetch one page of matching voices.
    pub async fn search(&self, search: &LibrarySearch) -> Result<LibraryVoicePage> {
        let response = self.transport.get("/shared-voices", search.to_query()).await?;
        LibraryVoicePage::from_value(response)
    }

    /// Full-text search on top of other filters.
    pub async fn find(&self, query: &str, search: LibrarySearch) -> Result<LibraryVoicePage> {
        self.search(&search.search(query)).await
    }

    pub async fn professional(&self, search: LibrarySearch) -> Result<LibraryVoicePage> {
        self.search(&search.category("professional")).await
    }

    /// Copy a library voice into the account under `name`.
    ///
    /// Occupies a voice slot on success.
    pub async fn add(&self, public_user_id: &str, voice_id: &str, name: &str) -> Result<Voice> {
        validate_presence(public_user_id, "public_user_id")?;
        validate_presence(voice_id, "voice_id")?;
        validate_presence(name, "name")?;

        let response = self
            .transport
            .post_json(
                &format!("/voices/add/{}/{}", public_user_id, voice_id),
                json!({ "new_name": name }),
            )
            .await?;

        let added_id = response.get("voice_id").and_then(Value::as_str);
        self.transport
            .config()
            .callbacks
            .emit_voice_added(&VoiceAddedEvent {
                voice_id: added_id,
                name,
            });
        Ok(Voice::new(added_id.unwrap_or(voice_id), name))
    }

    /// Pages in order, following `last_sort_id` while the server reports more.
    pub fn pages(&self, search: LibrarySearch) -> impl Stream<Item = Result<LibraryVoicePage>> + 'a {
        let library = *self;
        futures::stream::try_unfold(Some(search), move |state| async move {
            let Some(search) = state else {
                return Ok::<_, crate::Error>(None);
            };
            let page = library.search(&search).await?;
            // A page claiming more results without a cursor ends the walk.
            let next = match (page.has_more, page.next_cursor()) {
                (true, Some(cursor)) => Some(search.cursor(cursor)),
                _ => None,
            };
            Ok::<_, crate::Error>(Some((page, next)))
        })
    }

    /// Collect voices across at most `max_pages` pages.
    pub async fn all(&self, search: LibrarySearch, max_pages: usize) -> Result<Vec<LibraryVoice>> {
        let pages = self.pages(search);
        futures::pin_mut!(pages);
        let mut voices = Vec::new();
        let mut fetched = 0;
        while fetched < max_pages {
            match pages.try_next().await? {
                Some(page) => {
                    voices.extend(page.voices);
                    fetched += 1;
                }
                None => break,
            }
        }
        Ok(voices)
    }
}
