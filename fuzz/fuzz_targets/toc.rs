#![no_main]

use annostream::{AnnotatedConfig, AnnotatedStream, MemoryStream, OpenMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = AnnotatedConfig::lenient().with_mode(OpenMode::Read);
    if let Ok(mut reader) = AnnotatedStream::with_config(MemoryStream::from_vec(data.to_vec()), config) {
        let entries = reader.entries().to_vec();
        for entry in &entries {
            let _ = reader.read_entry(entry);
        }
    }
});
