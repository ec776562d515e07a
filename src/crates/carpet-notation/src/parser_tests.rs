// Notation cases covering the scanner, the error offsets and the formatter

#[cfg(test)]
mod tests {
    use crate::error::ParseError;
    use crate::formatter::format;
    use crate::parser::{parse, ParseOptions, Parser};
    use crate::span::Span;
    use carpet_core::{
        normalize_children, normalize_tree, to_document, LanguageContext, LanguageId, Lexicon,
        NoReferences, NotFound, PhraseChild, PhraseNode, PitchChange, ReferenceLookup, Suffix,
        TerminalRef,
    };
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::rc::Rc;

    const WORDS: [&str; 6] = ["dog", "cat", "run", "fast", "big", "wolf"];

    fn lexicon() -> Lexicon {
        Lexicon::with_words(&LanguageId::new("en"), WORDS)
    }

    fn en() -> LanguageContext {
        LanguageContext::new("en")
    }

    // Helper to parse and check the tree invariants
    fn parse_ok(input: &str) -> PhraseNode {
        let lexicon = lexicon();
        match parse(input, &en(), &lexicon, &NoReferences) {
            Ok(node) => {
                if let Err(e) = node.validate() {
                    panic!("'{}' parsed to an invalid tree: {}", input, e);
                }
                node
            }
            Err(e) => panic!("Failed to parse '{}': {}", input, e),
        }
    }

    fn parse_err(input: &str) -> ParseError {
        let lexicon = lexicon();
        match parse(input, &en(), &lexicon, &NoReferences) {
            Ok(node) => panic!("Expected parse to fail for '{}', got {}", input, node),
            Err(e) => e,
        }
    }

    fn word(node: &PhraseNode) -> Option<&str> {
        node.terminal.as_ref().map(|t| t.word.as_str())
    }

    struct Definitions(HashMap<String, Rc<PhraseNode>>);

    impl ReferenceLookup for Definitions {
        fn lookup_reference(&self, name: &str) -> Result<Rc<PhraseNode>, NotFound> {
            self.0.get(name).cloned().ok_or_else(|| NotFound::new(name))
        }
    }

    #[test]
    fn test_simple_leaf() {
        let node = parse_ok("dog");
        assert_eq!(word(&node), Some("dog"));
        assert_eq!(node.multiplier, 1);
        assert_eq!(node.count, None);
        assert_eq!(node.suffix, None);
        assert_eq!(format(&node), "dog");
    }

    #[test]
    fn test_multiplier_and_count() {
        let node = parse_ok("dog*3#2");
        assert_eq!(node.multiplier, 3);
        assert_eq!(node.count, Some(2));
        assert_eq!(format(&node), "dog#2*3");
    }

    #[test]
    fn test_primary_absorbs_multiplier() {
        let mut node = parse_ok("(run [fast])");
        assert_eq!(node.children.len(), 2);
        assert!(!node.children[0].is_primary);
        assert!(node.children[1].is_primary);

        node.multiplier = 2;
        let children = normalize_children(&mut node);
        assert_eq!(children[0].multiplier, 1);
        assert_eq!(children[1].multiplier, 2);
        assert_eq!(node.multiplier, 1);
    }

    #[test]
    fn test_whitespace_separates_siblings() {
        let node = parse_ok(" dog \t cat\n");
        let words: Vec<_> = node.child_nodes().filter_map(word).collect();
        assert_eq!(words, vec!["dog", "cat"]);
        assert_eq!(format(&node), "(dog cat)");
    }

    #[test]
    fn test_pitch_and_suffix() {
        let node = parse_ok("+dog");
        assert_eq!(node.pitch_change, Some(PitchChange::Up));

        let node = parse_ok("$dog!");
        assert_eq!(node.pitch_change, Some(PitchChange::Last));
        assert_eq!(node.suffix, Some(Suffix::Not));
        assert_eq!(format(&node), "$dog!");

        let node = parse_ok("-(dog cat)?");
        assert_eq!(node.pitch_change, Some(PitchChange::Down));
        assert_eq!(node.suffix, Some(Suffix::What));
        assert_eq!(node.children.len(), 2);
    }

    #[test]
    fn test_unclosed_group() {
        let err = parse_err("(run fast");
        assert_eq!(
            err,
            ParseError::UnclosedGroup {
                span: Span::new(0, 1),
                token: "(run fast".to_string(),
            }
        );
        assert!(err.to_string().contains("unclosed '('"));
    }

    #[test]
    fn test_unclosed_primary() {
        let err = parse_err("[dog (cat]");
        assert!(matches!(err, ParseError::UnclosedPrimary { span, .. } if span == Span::new(0, 1)));
    }

    #[test]
    fn test_duplicate_suffix() {
        let err = parse_err("dog??");
        assert_eq!(err.span(), Span::new(4, 5));
        assert_eq!(err.token(), Some("dog??"));
        assert!(matches!(err, ParseError::DuplicateSuffix { .. }));
    }

    #[test]
    fn test_duplicate_markers() {
        assert!(matches!(
            parse_err("++dog"),
            ParseError::DuplicatePitchChange { span, .. } if span == Span::new(1, 2)
        ));
        assert!(matches!(
            parse_err("dog**2"),
            ParseError::DuplicateMultiplierMarker { span, .. } if span == Span::new(4, 5)
        ));
        assert!(matches!(
            parse_err("dog#2#3"),
            ParseError::DuplicateCountMarker { span, .. } if span == Span::new(5, 6)
        ));
        assert!(matches!(
            parse_err("@@hound"),
            ParseError::DuplicateReferenceMarker { span, ref token } if span == Span::new(1, 2) && token == "@@"
        ));
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(
            parse_err("dog*"),
            ParseError::InvalidNumber {
                marker: '*',
                value: String::new(),
                span: Span::new(3, 4),
                token: "dog*".to_string(),
            }
        );
        assert!(matches!(
            parse_err("dog*0"),
            ParseError::InvalidNumber { marker: '*', span, .. } if span == Span::new(3, 5)
        ));
        assert!(matches!(
            parse_err("dog#99999999999"),
            ParseError::InvalidNumber { marker: '#', .. }
        ));
    }

    #[test]
    fn test_zero_count_is_kept_but_not_printed() {
        let node = parse_ok("dog#0");
        assert_eq!(node.count, Some(0));
        assert_eq!(format(&node), "dog");
    }

    #[test]
    fn test_unopened_brackets() {
        assert!(matches!(
            parse_err("dog)"),
            ParseError::UnopenedGroup { span, .. } if span == Span::new(3, 4)
        ));
        assert!(matches!(
            parse_err("dog]"),
            ParseError::UnopenedPrimary { span, .. } if span == Span::new(3, 4)
        ));
        assert!(matches!(
            parse_err("[dog)"),
            ParseError::UnopenedGroup { span, .. } if span == Span::new(4, 5)
        ));
    }

    #[test]
    fn test_nested_primary() {
        let err = parse_err("[a [b]]");
        assert_eq!(
            err,
            ParseError::NestedPrimary {
                span: Span::new(3, 4),
                token: "[a [".to_string(),
            }
        );
    }

    #[test]
    fn test_primary_inside_group_inside_primary() {
        let node = parse_ok("[(run [fast]) dog]");
        assert_eq!(node.children.len(), 2);
        assert!(node.children[0].children[1].is_primary);
    }

    #[test]
    fn test_undefined_and_invalid_words() {
        assert_eq!(
            parse_err("wolfish"),
            ParseError::UndefinedTerminal {
                word: "wolfish".to_string(),
                span: Span::new(0, 7),
            }
        );
        assert_eq!(
            parse_err("ice-cream"),
            ParseError::InvalidWord {
                word: "ice-cream".to_string(),
                span: Span::new(0, 9),
            }
        );
        assert!(matches!(parse_err("dog2"), ParseError::InvalidWord { .. }));
    }

    #[test]
    fn test_misplaced_text() {
        assert!(matches!(
            parse_err("dog(cat)"),
            ParseError::MisplacedText { span, .. } if span == Span::new(3, 4)
        ));
        assert!(matches!(
            parse_err("(cat)dog"),
            ParseError::MisplacedText { span, .. } if span == Span::new(5, 8)
        ));
        assert!(matches!(parse_err("dog*2cat"), ParseError::MisplacedText { .. }));
    }

    #[test]
    fn test_single_word_groups_are_leaves() {
        let node = parse_ok("(dog)");
        assert_eq!(word(&node), Some("dog"));

        let node = parse_ok("cat [dog]");
        let primary = &node.children[1];
        assert_eq!(word(primary), Some("dog"));
        assert!(primary.is_primary);
        assert!(primary.children.is_empty());
    }

    #[test]
    fn test_root_is_never_primary() {
        let node = parse_ok("[dog cat]");
        assert!(!node.is_primary);
        assert_eq!(node.children.len(), 2);
    }

    #[test]
    fn test_error_offsets_inside_groups() {
        assert_eq!(
            parse_err("(dog (cat wolfish))"),
            ParseError::UndefinedTerminal {
                word: "wolfish".to_string(),
                span: Span::new(10, 17),
            }
        );
        assert_eq!(parse_err("(dog ice-cream)").span(), Span::new(5, 14));
        assert!(matches!(
            parse_err("(dog [cat)"),
            ParseError::UnclosedPrimary { span, .. } if span == Span::new(5, 6)
        ));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(parse_err(""), ParseError::EmptyPhrase { span: Span::new(0, 0) });
        assert_eq!(parse_err("   "), ParseError::EmptyPhrase { span: Span::new(0, 3) });
        assert_eq!(parse_err("()"), ParseError::EmptyPhrase { span: Span::new(0, 2) });
        assert_eq!(parse_err("(*2)"), ParseError::EmptyPhrase { span: Span::new(0, 4) });
        assert_eq!(parse_ok("dog ()").children.len(), 0);
    }

    #[test]
    fn test_depth_limit() {
        let lexicon = lexicon();
        let parser = Parser::new(&lexicon, &NoReferences).with_options(ParseOptions { max_depth: 2 });
        assert_eq!(
            parser.parse("(((dog cat)))", &en()),
            Err(ParseError::DepthLimitExceeded {
                limit: 2,
                span: Span::new(3, 10),
            })
        );
        assert!(parser.parse("((dog cat))", &en()).is_ok());
        assert_eq!(format(&parse_ok("(((dog cat)))")), "(dog cat)");
    }

    #[test]
    fn test_language_is_explicit() {
        let lexicon = lexicon();
        let fr = LanguageContext::new("fr");
        assert!(matches!(
            parse("dog", &fr, &lexicon, &NoReferences),
            Err(ParseError::UndefinedTerminal { .. })
        ));
    }

    #[test]
    fn test_reference_is_shared() {
        let lexicon = lexicon();
        let pup = Rc::new(parse_ok("(big dog)"));
        let defs = Definitions(HashMap::from([("pup".to_string(), Rc::clone(&pup))]));
        let parser = Parser::new(&lexicon, &defs);

        let mut node = parser.parse("@pup*2", &en()).unwrap();
        assert_eq!(node.multiplier, 2);
        match &node.children[0] {
            PhraseChild::Shared(shared) => assert!(Rc::ptr_eq(shared, &pup)),
            other => panic!("expected a shared child, got {:?}", other),
        }

        normalize_tree(&mut node);
        assert_eq!(node.children[0].multiplier, 2);
        assert!(!node.children[0].is_shared());
        assert_eq!(pup.multiplier, 1);
        assert_eq!(pup.children[0].multiplier, 1);
    }

    #[test]
    fn test_undefined_reference() {
        assert_eq!(
            parse_err("dog @unknown"),
            ParseError::UndefinedReference {
                name: "unknown".to_string(),
                span: Span::new(5, 12),
            }
        );
    }

    #[test]
    fn test_format_round_trips() {
        for input in ["dog", "dog#2*3", "(dog cat)", "(run [fast])*2?", "+(dog cat)#3", "$dog!"] {
            let node = parse_ok(input);
            let printed = format(&node);
            assert_eq!(printed, input);
            assert_eq!(to_document(&parse_ok(&printed)), to_document(&node));
        }
    }

    fn arb_modifiers(node: PhraseNode) -> impl Strategy<Value = PhraseNode> {
        (
            1u32..5,
            proptest::option::of(1u32..5),
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

    // Trees the notation can express exactly: groups of two or more, and no
    // primary directly inside a primary.
    fn arb_tree() -> impl Strategy<Value = PhraseNode> {
        let leaf = (0..WORDS.len()).prop_flat_map(|i| {
            arb_modifiers(PhraseNode::leaf(TerminalRef::new(i as u64 + 1, WORDS[i])))
        });
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop::collection::vec(inner, 2..4).prop_flat_map(|children| {
                arb_modifiers(PhraseNode::group(
                    children.into_iter().map(PhraseChild::Owned).collect(),
                ))
                .prop_map(|mut group| {
                    if group.is_primary {
                        for child in group.children.iter_mut() {
                            child.make_owned().is_primary = false;
                        }
                    }
                    group
                })
            })
        })
    }

    proptest! {
        #[test]
        fn prop_format_then_parse_is_lossless(mut tree in arb_tree()) {
            tree.is_primary = false;
            let printed = format(&tree);
            let lexicon = lexicon();
            let parsed = parse(&printed, &en(), &lexicon, &NoReferences)
                .map_err(|e| TestCaseError::fail(format!("{}: {}", printed, e)))?;
            prop_assert_eq!(to_document(&parsed), to_document(&tree));
        }
    }
}
