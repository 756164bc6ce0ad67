#![no_main]
use libfuzzer_sys::fuzz_target;

use rill_cst::{parse, tokenize};

fuzz_target!(|data: &[u8]| {
    // The lexer reads raw bytes, so any input is fair game.
    // We are looking for panics: lex, parse, copy and drop everything.
    if let Ok(tokens) = tokenize(data) {
        let parsed = parse(&tokens);
        if let Some(tree) = parsed.tree {
            let copy = tree.clone();
            assert_eq!(copy, tree);
            let _ = copy.to_string();
        }
    }
});
