#![no_main]
use imgcodec::lzw::{decode_channel, encode_channel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let codes = encode_channel(data);
    let decoded = decode_channel(&codes).expect("encoder output must always decode");
    assert_eq!(decoded, data);
});
