// Persistence round trips over parsed and generated phrase trees

use carpet_core::{
    normalize_tree, to_document, to_json, LanguageContext, LanguageId, Lexicon, PhraseChild,
    PhraseNode, PitchChange, Suffix, TerminalRef,
};
use carpet_notation::{format, Dictionary, Parser};
use carpet_store::{compose, load, save, CompositionRead, MemoryStore, StoreError};
use proptest::prelude::*;

fn lexicon() -> Lexicon {
    Lexicon::with_words(&LanguageId::new("en"), ["big", "dog", "cat", "run", "fast"])
}

fn en() -> LanguageContext {
    LanguageContext::new("en")
}

#[test]
fn test_parsed_phrase_round_trips() {
    let lexicon = lexicon();
    let dict = Dictionary::new();
    let parser = Parser::new(&lexicon, &dict);

    for input in ["dog", "dog#2*3?", "(run [fast])*2", "+big (dog cat)#3 [run]!"] {
        let tree = parser.parse(input, &en()).unwrap();
        let mut store = MemoryStore::new();
        let id = save(&mut store, &tree).unwrap();
        let loaded = load(&store, id).unwrap();

        assert_eq!(to_document(&loaded), to_document(&tree), "{}", input);
        assert_eq!(format(&loaded), format(&tree));
        assert_eq!(store.node_count(), tree.size());
    }
}

#[test]
fn test_dictionary_reference_is_stored_once() {
    let lexicon = lexicon();
    let mut dict = Dictionary::new();
    dict.define_text("hound", "(big dog)", &lexicon, &en()).unwrap();
    let parser = Parser::new(&lexicon, &dict);
    let tree = parser.parse("@hound cat @hound*2", &en()).unwrap();

    let mut store = MemoryStore::new();
    let id = save(&mut store, &tree).unwrap();

    // root, cat, two wrappers, and one copy of (big dog)
    assert_eq!(store.node_count(), 7);
    let loaded = load(&store, id).unwrap();
    assert_eq!(
        serde_json::to_value(to_document(&loaded)).unwrap(),
        serde_json::to_value(to_document(&tree)).unwrap()
    );
}

#[test]
fn test_failed_save_leaves_store_unchanged() {
    let lexicon = lexicon();
    let dict = Dictionary::new();
    let tree = Parser::new(&lexicon, &dict).parse("big dog", &en()).unwrap();

    let mut store = MemoryStore::new();
    save(&mut store, &tree).unwrap();
    let before: Vec<_> = store.nodes().cloned().collect();

    let mut broken = tree.clone();
    if let PhraseChild::Owned(dog) = &mut broken.children[1] {
        dog.children.push(PhraseNode::leaf(TerminalRef::new(9, "cat")).into());
    }
    assert!(matches!(
        save(&mut store, &broken),
        Err(StoreError::InvalidComposition(_))
    ));

    let after: Vec<_> = store.nodes().cloned().collect();
    assert_eq!(before, after);
    assert_eq!(store.edge_count(), 2);
}

#[test]
fn test_loaded_tree_normalizes_like_the_original() {
    let lexicon = lexicon();
    let dict = Dictionary::new();
    let mut tree = Parser::new(&lexicon, &dict)
        .parse("(run [fast])*3#2?", &en())
        .unwrap();

    let mut store = MemoryStore::new();
    let id = save(&mut store, &tree).unwrap();
    let mut loaded = load(&store, id).unwrap();

    normalize_tree(&mut tree);
    normalize_tree(&mut loaded);
    assert_eq!(to_json(&loaded).unwrap(), to_json(&tree).unwrap());
    assert_eq!(loaded.children[1].multiplier, 3);
    assert_eq!(loaded.children[1].count, Some(2));
}

#[test]
fn test_compose_links_definitions_into_new_phrases() {
    let lexicon = lexicon();
    let dict = Dictionary::new();
    let parser = Parser::new(&lexicon, &dict);

    let mut store = MemoryStore::new();
    let hound = save(&mut store, &parser.parse("(big dog)", &en()).unwrap()).unwrap();
    let chase = save(&mut store, &parser.parse("(run fast)", &en()).unwrap()).unwrap();
    compose(&mut store, chase, &[(hound, true)]).unwrap();

    let loaded = load(&store, chase).unwrap();
    assert_eq!(format(&loaded), "(run fast [big dog])");
    assert_eq!(
        compose(&mut store, hound, &[(chase, false)]),
        Err(StoreError::CyclicComposition(chase))
    );
    assert_eq!(store.child_edges(hound).len(), 2);
}

fn arb_modifiers(node: PhraseNode) -> impl Strategy<Value = PhraseNode> {
    (
        1u32..6,
        proptest::option::of(0u32..6),
        proptest::option::of(prop_oneof![Just(Suffix::What), Just(Suffix::Not)]),
        proptest::option::of(prop_oneof![
            Just(PitchChange::Up),
            Just(PitchChange::Down),
            Just(PitchChange::Last)
        ]),
        any::<bool>(),
    )
        .prop_map(move |(multiplier, count, suffix, pitch_change, is_primary)| PhraseNode {
            multiplier,
            count,
            suffix,
            pitch_change,
            is_primary,
            ..node.clone()
        })
}

fn arb_tree() -> impl Strategy<Value = PhraseNode> {
    let leaf = (1u64..50, "[a-z]{1,6}")
        .prop_flat_map(|(id, word)| arb_modifiers(PhraseNode::leaf(TerminalRef::new(id, word))));
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 1..4).prop_flat_map(|children| {
            arb_modifiers(PhraseNode::group(
                children.into_iter().map(PhraseChild::Owned).collect(),
            ))
        })
    })
}

proptest! {
    #[test]
    fn prop_load_inverts_save(mut tree in arb_tree()) {
        tree.is_primary = false;
        let mut store = MemoryStore::new();
        let id = save(&mut store, &tree).unwrap();
        prop_assert_eq!(store.node_count(), tree.size());
        prop_assert_eq!(load(&store, id).unwrap(), tree);
    }
}
