use std::{
    fmt,
    sync::LazyLock,
};

use regex::Regex;
use serde_json::{
    Map,
    Value,
};
use tracing::info;

use crate::{
    archive::{
        base_name,
        ExportArchive,
    },
    error::LoadError,
};

/// `TikTok_Data_1700000000.zip`
pub static ARCHIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^TikTok_Data_.*\.zip$").expect("valid regex"));

/// The single JSON file holding the whole account export
pub static USER_DATA_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^user_data.*\.json$").expect("valid regex"));

const PREFERRED_USER_DATA: &[&str] = &["user_data_tiktok.json", "user_data.json"];

const NOT_AVAILABLE: &str = "N/A";

mod path {
    pub const PROFILE: &[&str] = &["Profile", "Profile Info", "ProfileMap"];
    pub const SETTINGS: &[&str] = &["App Settings", "Settings", "SettingsMap"];

    pub const FYP_KEYWORD_FILTERS: &[&str] = &["Content Preferences", "Keyword filters for videos in For You feed"];

    pub const WATCH_HISTORY: &[&str] = &["Your Activity", "Watch History", "VideoList"];
    pub const LIKE_LIST: &[&str] = &["Your Activity", "Like List", "ItemFavoriteList"];
    pub const COMMENTS: &[&str] = &["Comment", "Comments", "CommentsList"];
    pub const SEARCHES: &[&str] = &["Your Activity", "Searches", "SearchList"];
    pub const SHARES: &[&str] = &["Your Activity", "Share History", "ShareHistoryList"];
    pub const LOGINS: &[&str] = &["Your Activity", "Login History", "LoginHistoryList"];
    pub const FOLLOWERS: &[&str] = &["Your Activity", "Follower", "FansList"];
    pub const FOLLOWING: &[&str] = &["Your Activity", "Following", "Following"];
    pub const FAVORITE_VIDEOS: &[&str] = &["Your Activity", "Favorite Videos", "FavoriteVideoList"];
    pub const FAVORITE_SOUNDS: &[&str] = &["Your Activity", "Favorite Sounds", "FavoriteSoundList"];
    pub const BLOCKED_USERS: &[&str] = &["App Settings", "Block List", "BlockList"];

    pub const ORDERS: &[&str] = &["TikTok Shop", "Order History", "OrderHistories"];
    pub const PRODUCT_BROWSING: &[&str] = &["TikTok Shop", "Product Browsing History", "ProductBrowsingHistories"];
    pub const SHOPPING_CART: &[&str] = &["TikTok Shop", "Shopping Cart List", "ShoppingCart"];
    pub const SAVED_ADDRESSES: &[&str] = &["TikTok Shop", "Saved Address Information", "SavedAddress"];
    pub const PAYMENT_CARDS: &[&str] = &["TikTok Shop", "Current Payment Information", "PayCard"];

    pub const WATCH_LIVE: &[&str] = &["Tiktok Live", "Watch Live History", "WatchLiveMap"];
    pub const OFF_TIKTOK: &[&str] = &["Ads and data", "Off TikTok Activity", "OffTikTokActivityDataList"];
    pub const CHAT_HISTORY: &[&str] = &["Direct Message", "Direct Messages", "ChatHistory"];
}


/// Walks `path` through nested objects. Missing keys and explicit nulls both yield `None`.
pub fn lookup<'v>(data: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter()
        .try_fold(data, |node, key| node.as_object().and_then(|m| m.get(*key)))
        .filter(|v| !v.is_null())
}

fn lookup_in<'v>(data: &'v Value, base: &[&str], rest: &[&str]) -> Option<&'v Value> {
    lookup(data, base).and_then(|node| lookup(node, rest))
}

/// Number of entries in a list or map, 0 for anything else
fn entry_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Array(a)) => a.len() as u64,
        Some(Value::Object(m)) => m.len() as u64,
        _ => 0,
    }
}

fn text(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::String(_)) | None => default.to_owned(),
        Some(other) => other.to_string(),
    }
}

/// A live comment is kept when it has content or a real timestamp
/// Missing keys do not count; any present value other than `""` or `-1` does, `null` included
fn is_live_comment(comment: &Value) -> bool {
    let has_content = comment.get("CommentContent").is_some_and(|c| *c != "");
    let has_time = comment.get("RawTime").is_some_and(|t| t.as_f64() != Some(-1.0));
    has_content || has_time
}

fn live_comments(session: &Value) -> impl Iterator<Item = &Value> {
    lookup(session, &["Comments"])
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|c| is_live_comment(c))
}


/// Parsed `user_data*.json` from a TikTok export
#[derive(Debug, Clone)]
pub struct TikTokData {
    /// Archive entry or file the data was read from
    pub source: String,
    pub data: Value,
}

impl TikTokData {
    pub fn from_archive(archive: &mut ExportArchive) -> Result<Self, LoadError> {
        let candidates = archive.require_entries(&USER_DATA_REGEX)?;
        let chosen = candidates
            .iter()
            .find(|name| PREFERRED_USER_DATA.contains(&base_name(name).to_lowercase().as_str()))
            .unwrap_or(&candidates[0])
            .clone();
        info!(archive = %archive.path().display(), entry = %chosen, "Loading TikTok user data");

        Ok(Self {
            data: archive.read_json(&chosen)?,
            source: chosen,
        })
    }

    pub fn insights(&self) -> Insights { Insights::extract(&self.data) }

    pub fn detail_tables(&self) -> Vec<DetailTable> { detail_tables(&self.data) }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightValue {
    Text(String),
    Count(u64),
}

impl fmt::Display for InsightValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsightSection {
    pub title: &'static str,
    pub rows: Vec<(&'static str, InsightValue)>,
}

/// Headline numbers derived from a TikTok export
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Insights {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub birth_date: String,
    pub likes_received: String,

    pub app_language: String,
    pub private_account: String,
    pub personalized_ads: String,
    pub fyp_keyword_filters: u64,

    pub videos_watched: u64,
    pub videos_liked: u64,
    pub comments: u64,
    pub searches: u64,
    pub shares: u64,
    pub logins: u64,
    pub followers: u64,
    pub following: u64,
    pub favorite_videos: u64,
    pub favorite_sounds: u64,
    pub blocked_users: u64,

    pub shop_orders: u64,
    pub shop_products_browsed: u64,
    pub shop_cart_items: u64,
    pub shop_saved_addresses: u64,
    pub shop_saved_cards: u64,

    pub live_sessions_watched: u64,
    pub live_comments: u64,

    pub off_tiktok_events: u64,

    pub dm_chats: u64,
    pub dm_messages: u64,
}

impl Insights {
    pub fn extract(data: &Value) -> Self {
        let profile = |key: &str| text(lookup_in(data, path::PROFILE, &[key]), NOT_AVAILABLE);
        let setting = |key: &str| text(lookup_in(data, path::SETTINGS, &[key]), NOT_AVAILABLE);
        let count = |p: &[&str]| entry_count(lookup(data, p));

        let fyp_keyword_filters = match lookup_in(data, path::SETTINGS, path::FYP_KEYWORD_FILTERS) {
            Some(Value::Array(a)) => a.len() as u64,
            _ => 0,
        };

        let live = lookup(data, path::WATCH_LIVE).and_then(Value::as_object);
        let chats = lookup(data, path::CHAT_HISTORY).and_then(Value::as_object);

        Self {
            username: profile("userName"),
            email: profile("emailAddress"),
            phone: profile("telephoneNumber"),
            bio: profile("bioDescription"),
            birth_date: profile("birthDate"),
            likes_received: text(lookup_in(data, path::PROFILE, &["likesReceived"]), "0"),

            app_language: setting("App Language"),
            private_account: setting("Private Account"),
            personalized_ads: setting("PersonalizedAds"),
            fyp_keyword_filters,

            videos_watched: count(path::WATCH_HISTORY),
            videos_liked: count(path::LIKE_LIST),
            comments: count(path::COMMENTS),
            searches: count(path::SEARCHES),
            shares: count(path::SHARES),
            logins: count(path::LOGINS),
            followers: count(path::FOLLOWERS),
            following: count(path::FOLLOWING),
            favorite_videos: count(path::FAVORITE_VIDEOS),
            favorite_sounds: count(path::FAVORITE_SOUNDS),
            blocked_users: count(path::BLOCKED_USERS),

            shop_orders: lookup(data, path::ORDERS).and_then(Value::as_object).map_or(0, |m| m.len() as u64),
            shop_products_browsed: count(path::PRODUCT_BROWSING),
            shop_cart_items: count(path::SHOPPING_CART),
            shop_saved_addresses: count(path::SAVED_ADDRESSES),
            shop_saved_cards: count(path::PAYMENT_CARDS),

            live_sessions_watched: live.map_or(0, |m| m.len() as u64),
            live_comments: live.map_or(0, |m| m.values().map(|s| live_comments(s).count() as u64).sum::<u64>()),

            off_tiktok_events: count(path::OFF_TIKTOK),

            dm_chats: chats.map_or(0, |m| m.len() as u64),
            dm_messages: chats.map_or(0, |m| m.values().filter_map(Value::as_array).map(|msgs| msgs.len() as u64).sum::<u64>()),
        }
    }

    pub fn sections(&self) -> Vec<InsightSection> {
        use InsightValue::{
            Count,
            Text,
        };

        vec![
            InsightSection {
                title: "Profile",
                rows: vec![
                    ("Username", Text(self.username.clone())),
                    ("Email", Text(self.email.clone())),
                    ("Phone Number", Text(self.phone.clone())),
                    ("Bio Description", Text(self.bio.clone())),
                    ("Birth Date", Text(self.birth_date.clone())),
                    ("Likes Received", Text(self.likes_received.clone())),
                ],
            },
            InsightSection {
                title: "Activity",
                rows: vec![
                    ("Videos Watched Count", Count(self.videos_watched)),
                    ("Liked Videos Count", Count(self.videos_liked)),
                    ("Comments Made Count", Count(self.comments)),
                    ("Searches Made Count", Count(self.searches)),
                    ("Shares Made Count", Count(self.shares)),
                    ("Login Sessions Count", Count(self.logins)),
                    ("Followers Count", Count(self.followers)),
                    ("Following Count", Count(self.following)),
                    ("Favorite Videos Count", Count(self.favorite_videos)),
                    ("Favorite Sounds Count", Count(self.favorite_sounds)),
                    ("Blocked Users Count", Count(self.blocked_users)),
                ],
            },
            InsightSection {
                title: "Direct Messages",
                rows: vec![
                    ("DM Chats Count", Count(self.dm_chats)),
                    ("DM Total Messages Count", Count(self.dm_messages)),
                ],
            },
            InsightSection {
                title: "TikTok Shop",
                rows: vec![
                    ("Shop Orders Count", Count(self.shop_orders)),
                    ("Shop Product Browsing Count", Count(self.shop_products_browsed)),
                    ("Shop Shopping Cart Items Count", Count(self.shop_cart_items)),
                    ("Shop Saved Addresses Count", Count(self.shop_saved_addresses)),
                    ("Shop Saved Payment Cards Count", Count(self.shop_saved_cards)),
                ],
            },
            InsightSection {
                title: "TikTok Live",
                rows: vec![
                    ("Live Sessions Watched Count", Count(self.live_sessions_watched)),
                    ("Live Comments Made Count", Count(self.live_comments)),
                ],
            },
            InsightSection {
                title: "Settings & Other Data",
                rows: vec![
                    ("App Language", Text(self.app_language.clone())),
                    ("Private Account", Text(self.private_account.clone())),
                    ("Personalized Ads", Text(self.personalized_ads.clone())),
                    ("FYP Keyword Filters Count", Count(self.fyp_keyword_filters)),
                    ("Off-TikTok Activity Events Count", Count(self.off_tiktok_events)),
                ],
            },
        ]
    }
}


/// Raw records from one part of the export, flattened into rows
#[derive(Debug, Clone, PartialEq)]
pub struct DetailTable {
    pub name: &'static str,
    /// Union of the record keys in first-seen order
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl DetailTable {
    /// `None` when there are no records
    pub fn from_records(name: &'static str, records: impl IntoIterator<Item = Map<String, Value>>) -> Option<Self> {
        let records: Vec<_> = records.into_iter().collect();
        if records.is_empty() {
            return None;
        }

        let mut columns: Vec<String> = Vec::new();
        for key in records.iter().flat_map(Map::keys) {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        let rows = records
            .into_iter()
            .map(|mut rec| columns.iter().map(|c| rec.remove(c).unwrap_or(Value::Null)).collect())
            .collect();

        Some(Self { name, columns, rows })
    }
}

fn as_record(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(m) => m.clone(),
        other => Map::from_iter([("value".to_owned(), other.clone())]),
    }
}

fn list_records<'v>(data: &'v Value, path: &[&str]) -> impl Iterator<Item = Map<String, Value>> + 'v {
    lookup(data, path).and_then(Value::as_array).into_iter().flatten().map(as_record)
}

/// Every non-empty list in the export as its own table
pub fn detail_tables(data: &Value) -> Vec<DetailTable> {
    const LISTS: &[(&str, &[&str])] = &[
        ("Watch History", path::WATCH_HISTORY),
        ("Liked Videos", path::LIKE_LIST),
        ("Comments Made", path::COMMENTS),
        ("Search History", path::SEARCHES),
        ("Login History", path::LOGINS),
        ("Blocked Users", path::BLOCKED_USERS),
        ("Followers", path::FOLLOWERS),
        ("Following", path::FOLLOWING),
        ("Favorite Videos", path::FAVORITE_VIDEOS),
        ("Favorite Sounds", path::FAVORITE_SOUNDS),
    ];

    let mut tables: Vec<_> = LISTS
        .iter()
        .filter_map(|&(name, p)| DetailTable::from_records(name, list_records(data, p)))
        .collect();

    let orders = lookup(data, path::ORDERS).and_then(Value::as_object).into_iter().flatten().map(|(id, details)| {
        let mut rec = as_record(details);
        rec.insert("order_id_from_key".to_owned(), Value::String(id.clone()));
        rec
    });
    tables.extend(DetailTable::from_records("Shop Order History", orders));
    tables.extend(DetailTable::from_records("Shop Product Browsing", list_records(data, path::PRODUCT_BROWSING)));
    tables.extend(DetailTable::from_records("Shop Shopping Cart", list_records(data, path::SHOPPING_CART)));

    let live = lookup(data, path::WATCH_LIVE).and_then(Value::as_object).into_iter().flatten().map(|(id, session)| {
        let comments: Vec<_> = live_comments(session)
            .filter_map(|c| c.get("CommentContent").and_then(Value::as_str))
            .filter(|c| !c.is_empty())
            .collect();
        Map::from_iter([
            ("LiveSessionID".to_owned(), Value::String(id.clone())),
            ("WatchTime".to_owned(), session.get("WatchTime").cloned().unwrap_or(Value::Null)),
            ("CommentsInLive".to_owned(), Value::String(comments.join("; "))),
        ])
    });
    tables.extend(DetailTable::from_records("Watch Live History", live));

    let messages = lookup(data, path::CHAT_HISTORY).and_then(Value::as_object).into_iter().flatten().flat_map(|(chat, msgs)| {
        let chat_with = chat.replace("Chat History with ", "").replace(':', "");
        msgs.as_array().into_iter().flatten().map(move |msg| {
            let mut rec = as_record(msg);
            rec.insert("ChatWith".to_owned(), Value::String(chat_with.clone()));
            rec
        })
    });
    tables.extend(DetailTable::from_records("Direct Messages", messages));

    tables
}
