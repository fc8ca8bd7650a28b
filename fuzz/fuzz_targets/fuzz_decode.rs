#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lineproto::{Decoder, Precision, Source, SourceError};

#[derive(Debug, Arbitrary)]
struct Input {
    data: Vec<u8>,
    chunk: u8,
    lax: bool,
}

/// Hands the data out in fixed-size chunks so refill paths get exercised.
struct Chunked {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl Source for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn drain(mut dec: Decoder<'_>, lax: bool) {
    dec.set_lax(lax);
    while dec.next_entry() {
        let _ = dec.measurement();
        while let Ok(Some(_)) = dec.next_tag() {}
        while let Ok(Some(_)) = dec.next_field() {}
        let _ = dec.time(Precision::Millisecond, Some(0));
    }
    let _ = dec.err();
    let _ = dec.stats();
}

fuzz_target!(|input: Input| {
    drain(Decoder::new(&input.data), input.lax);
    drain(
        Decoder::with_source(Chunked {
            data: input.data.clone(),
            pos: 0,
            chunk: input.chunk.max(1) as usize,
        }),
        input.lax,
    );
});
