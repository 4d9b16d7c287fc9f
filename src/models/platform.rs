//! Social platform classification for URLs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A social or storefront platform a URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Bluesky,
    TikTok,
    X,
    Instagram,
    YouTube,
    Facebook,
    Etsy,
    Carrd,
    Website,
}

/// Ordered `(needle, platform)` table, first match wins.
///
/// `x.com` is anchored with a leading `//` or `.` so hosts such as
/// `box.com` do not match.
const PLATFORM_TABLE: &[(&str, Platform)] = &[
    ("bsky.app", Platform::Bluesky),
    ("tiktok.com", Platform::TikTok),
    ("twitter.com", Platform::X),
    ("//x.com", Platform::X),
    (".x.com", Platform::X),
    ("instagram.com", Platform::Instagram),
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("facebook.com", Platform::Facebook),
    ("etsy.com", Platform::Etsy),
    ("carrd.co", Platform::Carrd),
];

impl Platform {
    /// Classify a URL by substring match against known hosts.
    pub fn classify(url: &str) -> Self {
        let url = url.to_ascii_lowercase();
        PLATFORM_TABLE
            .iter()
            .find(|(needle, _)| url.contains(needle))
            .map(|(_, platform)| *platform)
            .unwrap_or(Platform::Website)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Bluesky => "Bluesky",
            Platform::TikTok => "TikTok",
            Platform::X => "X",
            Platform::Instagram => "Instagram",
            Platform::YouTube => "YouTube",
            Platform::Facebook => "Facebook",
            Platform::Etsy => "Etsy",
            Platform::Carrd => "Carrd",
            Platform::Website => "Website",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A profile link with the platform it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialLink<'a> {
    pub platform: Platform,
    pub url: &'a str,
}

/// Label every URL in a `name -> url` socials map, in key order.
pub fn social_links(socials: &BTreeMap<String, String>) -> Vec<SocialLink<'_>> {
    socials
        .values()
        .map(|url| SocialLink {
            platform: Platform::classify(url),
            url: url.as_str(),
        })
        .collect()
}
