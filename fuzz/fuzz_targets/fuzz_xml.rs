#![no_main]

use libfuzzer_sys::fuzz_target;

use beerxml::xml::{self, WriteOptions};

fuzz_target!(|contents: &str| {
    if let Ok(steps) = xml::from_str(contents) {
        let _ = steps.to_json();
        let _ = xml::to_string(&steps, &WriteOptions::default());
    }
});
