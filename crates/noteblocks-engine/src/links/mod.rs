//! The wikilink dialect: `[[id:<id>|<display>]]` canonical links and legacy
//! `[[<Title>]]` links, plus the autocomplete trigger and the pass that
//! upgrades legacy links once their titles resolve.

pub mod cursor;
pub mod kinds;
pub mod parser;
pub mod query;
pub mod resolve;

pub use parser::{
    ParsedWikilink, WikilinkKind, WikilinkTarget, canonical_link, mask_wikilinks,
    parse_wikilinks, replace_range,
};
pub use query::{LinkQuery, clamp_offset, unterminated_link_query};
pub use resolve::{
    LinkResolutionPass, legacy_titles, partition_results, resolve_titles, upgrade_legacy_links,
};
