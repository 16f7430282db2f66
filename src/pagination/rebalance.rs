// Offset correction after a single-item transition leaves a state
//
// Only single-item batches are rebalanced: the exact remaining count decides
// whether the current page just became empty. Multi-item batches skip the
// recomputation and reload with no offset arguments instead.

use std::collections::BTreeMap;

use url::Url;

use crate::execution::executor::CompletionToken;
use crate::pagination::offset::OffsetStore;
use crate::workflow::traits::Workflow;

/// Instruction for the presentation layer to reload the view, optionally
/// carrying one offset per workflow state so every pane stays consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshPlan {
    pub url_arguments: BTreeMap<String, String>,
}

impl RefreshPlan {
    /// Build the reload URL from the raw request URL: `reload=1` plus the
    /// planned arguments, overriding any query keys already present.
    pub fn apply_to(&self, raw: &Url) -> Url {
        let mut pairs: BTreeMap<String, String> = raw
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        pairs.insert("reload".to_string(), "1".to_string());
        for (key, value) in &self.url_arguments {
            pairs.insert(key.clone(), value.clone());
        }
        let mut url = raw.clone();
        url.query_pairs_mut().clear().extend_pairs(pairs.iter());
        url
    }
}

/// Recompute the source state's item count after a single-item transition
/// and correct its stored offset so the next render shows neither a phantom
/// nor a truncated page.
///
/// When the remaining count lands exactly on a page boundary, the page the
/// view was on may no longer exist: with more than one full page left and a
/// positive offset, the offset steps back one page (clamped to the last page
/// start); otherwise it resets to 0.
pub fn on_single_item_complete(
    token: &CompletionToken,
    workflow: &dyn Workflow,
    offsets: &OffsetStore<'_>,
    page_size: usize,
) -> RefreshPlan {
    let state = &token.previous_state;
    let item_count = workflow.item_count(state);
    if page_size > 0 && item_count % page_size == 0 {
        let current = offsets.get(state);
        if item_count / page_size > 1 && current > 0 {
            let last_page_start = item_count - page_size;
            offsets.set(state, current.saturating_sub(page_size).min(last_page_start));
        } else {
            offsets.set(state, 0);
        }
        tracing::debug!(
            state = %state,
            item_count,
            offset = offsets.get(state),
            "rebalanced offset after single-item transition"
        );
    }
    let url_arguments = workflow
        .states()
        .iter()
        .map(|s| (s.id.to_string(), offsets.get(&s.id).to_string()))
        .collect();
    RefreshPlan { url_arguments }
}
