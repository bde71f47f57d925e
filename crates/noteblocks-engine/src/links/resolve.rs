use std::collections::{HashMap, HashSet};

use futures_util::future::join_all;
use log::{debug, warn};

use crate::host::{NoteDirectory, Resolution};
use crate::models::{Block, BlockType};

use super::parser::{WikilinkKind, canonical_link, parse_wikilinks, replace_range};

/// A pending upgrade of legacy `[[Title]]` links, tagged with the document
/// generation it was started against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolutionPass {
    pub generation: u64,
    pub titles: Vec<String>,
}

/// Blocks whose text may carry live links. Code is verbatim.
fn carries_links(block: &Block) -> bool {
    block.is_textual() && block.block_type() != BlockType::Code
}

/// Distinct titles of every legacy link in the document, in first-seen order.
pub fn legacy_titles(blocks: &[Block]) -> Vec<String> {
    let mut seen = HashSet::new();
    blocks
        .iter()
        .filter(|block| carries_links(block))
        .flat_map(|block| parse_wikilinks(&block.text))
        .filter_map(|link| link.title().map(str::to_string))
        .filter(|title| seen.insert(title.clone()))
        .collect()
}

/// Resolves every title concurrently, one host call per title.
///
/// A failed lookup counts as not found for that title.
pub async fn resolve_titles<D: NoteDirectory>(
    directory: &D,
    titles: &[String],
) -> Vec<(String, Resolution)> {
    let lookups = titles.iter().map(|title| async move {
        let resolution = match directory.resolve_title_to_id(title).await {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!("resolving link title {title:?} failed: {err}");
                Resolution::NotFound
            }
        };
        (title.clone(), resolution)
    });
    let results = join_all(lookups).await;
    debug!("resolved {} link titles", results.len());
    results
}

/// Rewrites legacy links whose title resolved to a single note into
/// canonical links. Returns the indices of the blocks that changed.
///
/// Splices are applied per block in descending start order so earlier
/// offsets stay valid.
pub fn upgrade_legacy_links(blocks: &mut [Block], resolved: &HashMap<String, String>) -> Vec<usize> {
    let mut changed = vec![];
    for (index, block) in blocks.iter_mut().enumerate() {
        if !carries_links(block) {
            continue;
        }
        let mut links: Vec<_> = parse_wikilinks(&block.text)
            .into_iter()
            .filter(|link| link.kind() == WikilinkKind::Title)
            .filter_map(|link| {
                let title = link.title()?;
                let id = resolved.get(title)?;
                Some((link.start, link.end, canonical_link(id, title)))
            })
            .collect();
        if links.is_empty() {
            continue;
        }
        links.sort_by(|a, b| b.0.cmp(&a.0));

        let mut text = block.text.clone();
        for (start, end, replacement) in links {
            text = replace_range(&text, start, end, &replacement);
        }
        block.text = text;
        changed.push(index);
    }
    changed
}

/// Splits resolution results into the id map used for upgrading and the
/// titles that matched more than one note.
pub fn partition_results(results: Vec<(String, Resolution)>) -> (HashMap<String, String>, Vec<String>) {
    let mut resolved = HashMap::new();
    let mut ambiguous = vec![];
    for (title, resolution) in results {
        match resolution {
            Resolution::Ok(id) => {
                resolved.insert(title, id);
            }
            Resolution::Ambiguous(_) => ambiguous.push(title),
            Resolution::NotFound => {}
        }
    }
    (resolved, ambiguous)
}
