#![no_main]

use libfuzzer_sys::fuzz_target;
use offsetdump::{index_bytes, Schema};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either index or fail cleanly, never panic
    if let Ok(index) = index_bytes(data) {
        for request in Schema::cpython().requests() {
            let _ = request.resolve(&index);
        }
    }
});
