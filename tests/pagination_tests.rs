//! Pagination and view behavior through the workbox controller
//!
//! Exercises offset resolution from the request URL and session, page
//! slicing, pane visibility, the page size preference, and offset
//! rebalancing after a single-item transition.

use proptest::prelude::*;
use url::Url;

use workbox::workflow::mocks::{
    command, sample_item, MockCommandFilter, MockItemStore, MockSessionState, MockUserSettings,
    MockWorkflow, MockWorkflowProvider,
};
use workbox::{
    slice_page, ActionEffect, Actor, CommandId, Item, ItemOutcome, StateId, Workbox,
    WorkboxAction, WorkboxConfig, WorkflowCommand, WorkflowEvent, WorkflowHandle,
};

/// Capture controller logs in test output, filtered by RUST_LOG.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Harness {
    provider: MockWorkflowProvider,
    workflow: std::sync::Arc<MockWorkflow>,
    store: MockItemStore,
    filter: MockCommandFilter,
    settings: MockUserSettings,
    session: MockSessionState,
    config: WorkboxConfig,
}

impl Harness {
    /// A draft/done workflow: "submit" prompts for a comment, "publish"
    /// suppresses the prompt.
    fn new() -> Self {
        init_tracing();
        let mut workflow = MockWorkflow::new("wf-content", "Content workflow");
        workflow.add_state("draft", "Draft", false);
        workflow.add_state("done", "Done", true);
        workflow.add_command("draft", command("submit", "Submit"));
        workflow.add_command(
            "draft",
            WorkflowCommand {
                id: CommandId::from("publish"),
                display_name: "Publish".to_string(),
                icon: "publish.png".to_string(),
                has_ui: false,
                suppress_comment: true,
            },
        );
        workflow.add_transition("draft", "submit", "done");
        workflow.add_transition("draft", "publish", "done");

        let mut provider = MockWorkflowProvider::new();
        let workflow = provider.add(workflow);

        Self {
            provider,
            workflow,
            store: MockItemStore::new(),
            filter: MockCommandFilter::new(),
            settings: MockUserSettings::new(),
            session: MockSessionState::new(),
            config: WorkboxConfig::default(),
        }
    }

    fn workbox(&self) -> Workbox<'_> {
        Workbox::new(
            &self.provider,
            &self.store,
            &self.filter,
            &self.settings,
            &self.session,
            Actor::new("author"),
            self.config.clone(),
        )
    }

    fn workbox_at(&self, url: &str) -> Workbox<'_> {
        self.workbox().with_raw_url(Url::parse(url).unwrap())
    }

    fn place_many(&self, count: usize) -> Vec<Item> {
        (0..count)
            .map(|i| {
                let item = sample_item(&format!("item-{i}"));
                self.store.add(item.clone());
                self.workflow.place_item(&item.reference, "draft");
                item
            })
            .collect()
    }

    fn handle(&self) -> WorkflowHandle {
        WorkflowHandle::from("wf-content")
    }

    fn draft(&self) -> StateId {
        StateId::from("draft")
    }
}

proptest! {
    #[test]
    fn page_slices_stay_within_bounds(
        len in 0usize..200,
        offset in 0usize..300,
        page_size in 0usize..50,
    ) {
        let items: Vec<usize> = (0..len).collect();
        let page = slice_page(&items, offset, page_size);

        prop_assert!(page.len() <= page_size);
        if let Some(first) = page.first() {
            // The window is contiguous and anchored at the offset.
            prop_assert!(offset + page.len() <= len);
            prop_assert_eq!(*first, offset);
            prop_assert_eq!(*page.last().unwrap(), offset + page.len() - 1);
        } else {
            prop_assert!(offset >= len || page_size == 0);
        }
    }
}

#[test]
fn url_offset_seeds_the_view_when_the_session_is_cold() {
    let harness = Harness::new();
    let items = harness.place_many(15);

    let workbox = harness.workbox_at("http://host/workbox?draft=10");
    let pane = workbox.build_workflow_pane(&*harness.workflow);

    assert_eq!(pane.states.len(), 1);
    let draft = &pane.states[0];
    assert_eq!(draft.navigator.offset, 10);
    assert_eq!(draft.navigator.count, 15);
    assert_eq!(draft.rows.len(), 5);
    assert_eq!(draft.rows[0].reference, items[10].reference);
    assert!(draft.navigator.has_previous());
    assert!(!draft.navigator.has_next());
}

#[test]
fn session_offset_wins_over_the_url() {
    let harness = Harness::new();
    harness.place_many(15);
    harness
        .workbox()
        .dispatch(WorkboxAction::Jump {
            workflow: harness.handle(),
            state: harness.draft(),
            offset: 10,
        })
        .unwrap();

    let workbox = harness.workbox_at("http://host/workbox?draft=5");
    let pane = workbox.build_workflow_pane(&*harness.workflow);
    assert_eq!(pane.states[0].navigator.offset, 10);
}

#[test]
fn jump_rerenders_the_pane_and_persists_the_offset() {
    let harness = Harness::new();
    let items = harness.place_many(15);

    let effect = harness
        .workbox()
        .dispatch(WorkboxAction::Jump {
            workflow: harness.handle(),
            state: harness.draft(),
            offset: 10,
        })
        .unwrap();

    let ActionEffect::Pane(pane) = effect else {
        panic!("expected a re-rendered pane");
    };
    assert_eq!(pane.navigator.offset, 10);
    assert_eq!(pane.rows.len(), 5);
    assert_eq!(pane.rows[0].reference, items[10].reference);
    assert_eq!(harness.workbox().offsets().get(&harness.draft()), 10);
}

#[test]
fn sole_workflow_defaults_to_visible_on_first_open() {
    let harness = Harness::new();
    harness.place_many(1);

    let panes = harness.workbox().load();

    assert_eq!(panes.len(), 1);
    assert_eq!(panes[0].pane_id, "Pwfcontent");
    assert_eq!(panes[0].display_name, "Content workflow");
}

#[test]
fn reload_does_not_seed_pane_visibility() {
    let harness = Harness::new();
    harness.place_many(1);

    let panes = harness.workbox_at("http://host/workbox?reload=1").load();
    assert!(panes.is_empty());
}

#[test]
fn toggling_a_pane_flips_visibility() {
    let harness = Harness::new();
    harness.place_many(1);

    let effect = harness
        .workbox()
        .dispatch(WorkboxAction::TogglePane {
            workflow: harness.handle(),
        })
        .unwrap();
    let ActionEffect::PaneVisibility { pane_id, visible } = effect else {
        panic!("expected a visibility change");
    };
    assert_eq!(pane_id, "Pwfcontent");
    assert!(visible);
    assert_eq!(harness.workbox().load().len(), 1);

    let effect = harness
        .workbox()
        .dispatch(WorkboxAction::TogglePane {
            workflow: harness.handle(),
        })
        .unwrap();
    let ActionEffect::PaneVisibility { visible, .. } = effect else {
        panic!("expected a visibility change");
    };
    assert!(!visible);
    assert!(harness.workbox().load().is_empty());
}

#[test]
fn page_size_preference_is_stored_and_applied() {
    let harness = Harness::new();
    harness.place_many(12);

    let effect = harness
        .workbox()
        .dispatch(WorkboxAction::SetPageSize { size: 5 })
        .unwrap();
    assert!(matches!(effect, ActionEffect::Refresh(_)));

    let workbox = harness.workbox();
    assert_eq!(workbox.page_size(), 5);
    let pane = workbox.build_workflow_pane(&*harness.workflow);
    assert_eq!(pane.states[0].rows.len(), 5);
    assert!(pane.states[0].navigator.has_next());
}

#[test]
fn state_footer_lists_only_visible_commands() {
    let harness = Harness::new();
    harness.place_many(1);
    harness.filter.hide("submit");

    let pane = harness.workbox().build_workflow_pane(&*harness.workflow);

    let footer: Vec<&CommandId> = pane.states[0].commands.iter().map(|c| &c.id).collect();
    assert_eq!(footer, vec![&CommandId::from("publish")]);
}

#[test]
fn rows_carry_the_most_recent_history_event() {
    let harness = Harness::new();
    let item = harness.place_many(1).remove(0);
    for user in ["alice", "bob"] {
        harness.workflow.add_history(
            &item.reference,
            WorkflowEvent {
                user: user.to_string(),
                old_state: StateId::from("draft"),
                new_state: StateId::from("done"),
                text: String::new(),
                date: chrono::Utc::now(),
            },
        );
    }

    let pane = harness.workbox().build_workflow_pane(&*harness.workflow);
    let last = pane.states[0].rows[0].last_event.as_ref().unwrap();
    assert_eq!(last.user, "bob");
}

#[test]
fn empty_final_states_are_suppressed() {
    let harness = Harness::new();
    harness.place_many(1);

    let pane = harness.workbox().build_workflow_pane(&*harness.workflow);

    assert_eq!(pane.states.len(), 1);
    assert_eq!(pane.states[0].state.id, StateId::from("draft"));
}

#[test]
fn show_empty_states_keeps_nonfinal_states_visible() {
    let mut harness = Harness::new();
    harness.config.display.show_empty_states = true;

    // No items anywhere: draft still renders, the final state does not.
    let pane = harness.workbox().build_workflow_pane(&*harness.workflow);

    assert_eq!(pane.states.len(), 1);
    assert_eq!(pane.states[0].state.id, StateId::from("draft"));
}

#[test]
fn completing_the_last_item_of_a_lone_second_page_resets_the_view() {
    let harness = Harness::new();
    let items = harness.place_many(11);
    harness
        .workbox()
        .dispatch(WorkboxAction::Jump {
            workflow: harness.handle(),
            state: harness.draft(),
            offset: 10,
        })
        .unwrap();

    let effect = harness
        .workbox()
        .dispatch(WorkboxAction::Send {
            item: items[10].reference.clone(),
            command: CommandId::from("publish"),
            workflow: harness.handle(),
        })
        .unwrap();

    let ActionEffect::Executed { outcome, refresh } = effect else {
        panic!("expected an executed batch");
    };
    assert_eq!(outcome.results[0].1, ItemOutcome::Applied);
    // Ten items remain, exactly one page: back to the start.
    assert_eq!(
        refresh.url_arguments.get("draft").map(String::as_str),
        Some("0")
    );
    assert_eq!(harness.workbox().offsets().get(&harness.draft()), 0);
}

#[test]
fn completing_the_last_item_of_a_trailing_page_steps_back_one_page() {
    let harness = Harness::new();
    let items = harness.place_many(21);
    harness
        .workbox()
        .dispatch(WorkboxAction::Jump {
            workflow: harness.handle(),
            state: harness.draft(),
            offset: 20,
        })
        .unwrap();

    let effect = harness
        .workbox()
        .dispatch(WorkboxAction::Send {
            item: items[20].reference.clone(),
            command: CommandId::from("publish"),
            workflow: harness.handle(),
        })
        .unwrap();

    let ActionEffect::Executed { refresh, .. } = effect else {
        panic!("expected an executed batch");
    };
    // Twenty items remain; the view lands on the new last page.
    assert_eq!(
        refresh.url_arguments.get("draft").map(String::as_str),
        Some("10")
    );
}
