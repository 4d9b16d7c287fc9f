//! Service layer for the site build.
//!
//! This module contains the business logic for:
//! - Outbound request pacing (`RateLimitedQueue`)
//! - Embed resolution (`ResolverRegistry`, `BlueskyResolver`, `TikTokResolver`)
//! - Exchange rates and price conversion (`RateLoader`)

pub mod currency;
mod queue;
mod resolvers;

pub use currency::{RateLoader, convert_hadatai, convert_maker, convert_price_example};
pub use queue::RateLimitedQueue;
pub use resolvers::{
    BlueskyResolver, EmbedAttribute, EmbedResolver, ResolverRegistry, TikTokResolver,
    parse_bluesky_post,
};
