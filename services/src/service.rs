//! Per-service export formats

pub mod spotify;
pub mod tiktok;

pub use spotify::{
    SpotifyListen,
    SpotifyListenVec,
};
pub use tiktok::{
    detail_tables,
    DetailTable,
    InsightSection,
    InsightValue,
    Insights,
    TikTokData,
};
