#![no_main]
use libfuzzer_sys::fuzz_target;
use ppm_model::{compress, decompress, ContextSearch, PpmConfig};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Byte 0: max context length (1-64) and search mode (high bit)
    let config = PpmConfig {
        max_context_length: 1 + (data[0] & 0x3F) as usize,
        search: if data[0] & 0x80 != 0 {
            ContextSearch::LongestFirst
        } else {
            ContextSearch::Binary
        },
    };

    let input = &data[1..];
    let frame = compress(input, &config).expect("compress failed");
    let output = decompress(&frame).expect("decompress failed");
    assert_eq!(output, input);
});
