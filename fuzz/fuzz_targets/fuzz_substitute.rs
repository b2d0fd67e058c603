#![no_main]

use libfuzzer_sys::fuzz_target;

use bakery::{substitute, EnvSnapshot};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // The substitution pass is total - this should never panic
        let env = EnvSnapshot::from_pairs([("FUZZ_KEY", "fuzz \"value\"\\")]);
        let (once, _) = substitute(text, &env);
        let _ = substitute(&once, &env);
    }
});
