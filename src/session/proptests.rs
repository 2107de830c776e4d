//! Property-based tests for the session store
//!
//! The log only ever grows, and only the last assistant message can change.

use super::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AppendUser(String),
    AppendAssistant(String),
    UpdateLast(String),
    UpdateAt(usize, String),
    SetText(String),
    SetSpecies(Species),
    Attach,
    Detach,
    SnapshotClear,
    TakeIfReady,
}

fn arb_species() -> impl Strategy<Value = Species> {
    prop_oneof![
        Just(Species::General),
        Just(Species::Dog),
        Just(Species::Cat),
        Just(Species::Cow),
        Just(Species::Goat),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z ]{0,12}".prop_map(Op::AppendUser),
        "[a-z ]{0,12}".prop_map(Op::AppendAssistant),
        "[a-z ]{0,12}".prop_map(Op::UpdateLast),
        (0usize..8, "[a-z]{0,6}").prop_map(|(i, t)| Op::UpdateAt(i, t)),
        "[a-z ]{0,8}".prop_map(Op::SetText),
        arb_species().prop_map(Op::SetSpecies),
        Just(Op::Attach),
        Just(Op::Detach),
        Just(Op::SnapshotClear),
        Just(Op::TakeIfReady),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_log_is_append_only(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let store = SessionStore::with_greeting("Hello!");

        for op in ops {
            let before = store.messages();

            match op {
                Op::AppendUser(text) => {
                    let index = store.append_message(Message::user(text, None));
                    prop_assert_eq!(index, before.len());
                }
                Op::AppendAssistant(text) => {
                    let index = store.append_message(Message::assistant(text));
                    prop_assert_eq!(index, before.len());
                }
                Op::UpdateLast(text) => {
                    let result = store.update_message_text(before.len() - 1, text);
                    let last_is_assistant = before.last().is_some_and(Message::is_assistant);
                    prop_assert_eq!(result.is_ok(), last_is_assistant);
                }
                Op::UpdateAt(index, text) => {
                    let result = store.update_message_text(index, text);
                    if index + 1 != before.len() {
                        let is_out_of_range = matches!(result, Err(StoreError::IndexOutOfRange { .. }));
                        prop_assert!(is_out_of_range);
                    }
                }
                Op::SetText(text) => store.set_draft_text(text),
                Op::SetSpecies(species) => store.set_draft_species(species),
                Op::Attach => store.set_draft_attachment(Some(Attachment::guessed("x.png", vec![1]))),
                Op::Detach => store.set_draft_attachment(None),
                Op::SnapshotClear => {
                    let species = store.draft().species;
                    store.snapshot_clear_draft();
                    let draft = store.draft();
                    prop_assert!(draft.text.is_empty() && draft.attachment.is_none());
                    prop_assert_eq!(draft.species, species);
                }
                Op::TakeIfReady => {
                    let draft = store.draft();
                    let taken = store.take_draft_if_ready();
                    prop_assert_eq!(taken.is_some(), !draft.is_empty());
                    if taken.is_none() {
                        prop_assert_eq!(store.draft(), draft);
                    }
                }
            }

            let after = store.messages();
            prop_assert!(after.len() >= before.len());
            // Earlier messages keep their role; only the last one may change text
            for (i, (old, new)) in before.iter().zip(after.iter()).enumerate() {
                prop_assert_eq!(old.role, new.role);
                if i + 1 < before.len() {
                    prop_assert_eq!(&old.text, &new.text);
                }
            }
        }
    }
}
