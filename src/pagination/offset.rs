// Per-state scroll offsets, session-backed with a URL fallback

use url::Url;

use crate::workflow::traits::SessionState;
use crate::workflow::types::StateId;

fn offset_key(state: &StateId) -> String {
    format!("workbox/offset/{state}")
}

/// Per-(user, workflow-state) scroll offset store.
///
/// Reads prefer a value written earlier in the session over one carried in
/// the raw request URL; absence of both yields 0. A value that fails integer
/// parsing is treated as 0, never an error. Writes go to the session store
/// and persist across requests until overwritten.
pub struct OffsetStore<'a> {
    session: &'a dyn SessionState,
    raw_url: Option<&'a Url>,
}

impl<'a> OffsetStore<'a> {
    pub fn new(session: &'a dyn SessionState, raw_url: Option<&'a Url>) -> Self {
        Self { session, raw_url }
    }

    pub fn get(&self, state: &StateId) -> usize {
        if let Some(stored) = self.session.get(&offset_key(state)) {
            return stored.parse().unwrap_or(0);
        }
        if let Some(url) = self.raw_url {
            if let Some(value) = url
                .query_pairs()
                .find(|(key, _)| key == state.as_str())
                .map(|(_, value)| value.into_owned())
            {
                return value.parse().unwrap_or(0);
            }
        }
        0
    }

    pub fn set(&self, state: &StateId, offset: usize) {
        self.session.set(&offset_key(state), offset.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::mocks::MockSessionState;

    fn url(query: &str) -> Url {
        Url::parse(&format!("http://host/workbox?{query}")).unwrap()
    }

    #[test]
    fn absent_everywhere_yields_zero() {
        let session = MockSessionState::new();
        let offsets = OffsetStore::new(&session, None);
        assert_eq!(offsets.get(&StateId::from("draft")), 0);
    }

    #[test]
    fn falls_back_to_url_value() {
        let session = MockSessionState::new();
        let raw = url("draft=30&other=5");
        let offsets = OffsetStore::new(&session, Some(&raw));
        assert_eq!(offsets.get(&StateId::from("draft")), 30);
        assert_eq!(offsets.get(&StateId::from("other")), 5);
    }

    #[test]
    fn unparseable_url_value_is_zero() {
        let session = MockSessionState::new();
        let raw = url("draft=banana");
        let offsets = OffsetStore::new(&session, Some(&raw));
        assert_eq!(offsets.get(&StateId::from("draft")), 0);
    }

    #[test]
    fn negative_url_value_is_zero() {
        let session = MockSessionState::new();
        let raw = url("draft=-4");
        let offsets = OffsetStore::new(&session, Some(&raw));
        assert_eq!(offsets.get(&StateId::from("draft")), 0);
    }

    #[test]
    fn session_write_takes_precedence_over_url() {
        let session = MockSessionState::new();
        let raw = url("draft=30");
        let offsets = OffsetStore::new(&session, Some(&raw));
        offsets.set(&StateId::from("draft"), 10);
        assert_eq!(offsets.get(&StateId::from("draft")), 10);
    }

    #[test]
    fn writes_survive_a_new_store_over_the_same_session() {
        let session = MockSessionState::new();
        OffsetStore::new(&session, None).set(&StateId::from("draft"), 20);
        let offsets = OffsetStore::new(&session, None);
        assert_eq!(offsets.get(&StateId::from("draft")), 20);
    }
}
