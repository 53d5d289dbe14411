#![no_main]
use imgcodec::huffman::{compress_channel, decompress_channel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let (encoded, valid_bits, freq) = compress_channel(data).expect("non-empty input must compress");
    let decoded = decompress_channel(&encoded, valid_bits, &freq).expect("encoder output must always decode");
    assert_eq!(decoded, data);
});
