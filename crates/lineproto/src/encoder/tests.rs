use alloc::string::ToString;
use alloc::vec;

use super::*;
use crate::decoder::Decoder;
use crate::error::EncodeErrorKind;

#[test]
fn encodes_a_full_entry() {
    let mut enc = Encoder::new();
    enc.start_line("weather");
    enc.add_tag("city", "SF");
    enc.add_tag("country", "US");
    enc.add_field("temp", Value::Float(20.5));
    enc.add_field("count", Value::Int(3));
    enc.add_field("frac", Value::Uint(7));
    enc.add_field("ok", Value::Bool(true));
    enc.add_field("desc", Value::from("cl\"oudy"));
    enc.end_line(Some(1_602_841_605_822_791_506));
    assert!(enc.err().is_none());
    assert_eq!(
        enc.bytes(),
        &b"weather,city=SF,country=US temp=20.5,count=3i,frac=7u,ok=true,desc=\"cl\\\"oudy\" 1602841605822791506"[..]
    );
}

#[test]
fn escapes_names_and_tag_values() {
    let mut enc = Encoder::new();
    enc.start_line("cpu load,1");
    enc.add_tag("host name", "a,b=c");
    enc.add_field("usage idle", Value::Float(1.0));
    enc.end_line(None);
    assert!(enc.err().is_none());
    assert_eq!(
        enc.bytes(),
        &b"cpu\\ load\\,1,host\\ name=a\\,b\\=c usage\\ idle=1"[..]
    );
}

#[test]
fn lines_are_newline_separated_without_trailing_newline() {
    let mut enc = Encoder::new();
    enc.start_line("m1");
    enc.add_field("f", Value::Int(1));
    enc.end_line(None);
    enc.start_line("m2");
    enc.add_field("f", Value::Int(2));
    enc.end_line(None);
    assert_eq!(enc.bytes(), b"m1 f=1i\nm2 f=2i");
}

#[test]
fn first_error_omits_point_index() {
    let mut enc = Encoder::new();
    enc.start_line("m1");
    enc.add_field(&b"\x01"[..], Value::Int(1));
    assert_eq!(
        enc.err().unwrap().to_string(),
        "invalid field key \"\\x01\""
    );
    assert_eq!(enc.bytes(), b"");
    enc.clear_err();

    // An error after the first line does not erase everything.
    enc.start_line("m1");
    enc.add_field("f", Value::Int(1));
    enc.start_line("m2");
    assert!(enc.err().is_none());
    assert_eq!(enc.bytes(), b"m1 f=1i\nm2");
    enc.add_field("g", Value::Int(3));
    enc.add_field("\\", Value::Int(4));
    assert_eq!(
        enc.err().unwrap().to_string(),
        "encoding point 2: invalid field key \"\\\\\""
    );
    assert_eq!(enc.bytes(), b"m1 f=1i");

    // A new line can still be added while the first error is retained.
    enc.start_line("m3");
    enc.add_field("f", Value::Int(3));
    assert_eq!(enc.bytes(), b"m1 f=1i\nm3 f=3i");
    assert_eq!(
        enc.err().unwrap().to_string(),
        "encoding point 2: invalid field key \"\\\\\""
    );
}

#[test]
fn out_of_order_tags() {
    let mut enc = Encoder::new();
    enc.start_line("m1");
    enc.add_tag("b", "1");
    assert!(enc.err().is_none());
    enc.add_tag("a", "1");
    assert_eq!(
        enc.err().unwrap().to_string(),
        "tag key \"a\" out of order (previous key \"b\")"
    );
    // The failing tag leaks nothing into the output.
    assert!(!enc
        .bytes()
        .windows(2)
        .any(|w| w == b"a="));
}

#[test]
fn duplicate_tag_key_is_out_of_order() {
    let mut enc = Encoder::new();
    enc.start_line("m");
    enc.add_tag("a", "1");
    enc.add_tag("a", "2");
    assert_eq!(
        enc.err().unwrap().kind,
        EncodeErrorKind::TagOutOfOrder {
            key: b"a".to_vec(),
            previous: b"a".to_vec(),
        }
    );
}

#[test]
fn add_field_before_measurement() {
    let mut enc = Encoder::new();
    enc.add_field("hello", Value::Int(1));
    assert_eq!(
        enc.err().unwrap().to_string(),
        "field must be added after tag or measurement section"
    );
}

#[test]
fn end_line_with_no_field() {
    let mut enc = Encoder::new();
    enc.start_line("hello");
    enc.end_line(None);
    assert_eq!(
        enc.err().unwrap().to_string(),
        "timestamp must be added after adding at least one field"
    );
    assert_eq!(enc.bytes(), b"");
}

#[test]
fn add_tag_before_start_line() {
    let mut enc = Encoder::new();
    enc.add_tag("a", "b");
    assert_eq!(
        enc.err().unwrap().to_string(),
        "tag must be added after adding a measurement and before adding fields"
    );
}

#[test]
fn add_tag_after_add_field() {
    let mut enc = Encoder::new();
    enc.start_line("m");
    enc.add_field("f", Value::Int(12));
    enc.add_tag("a", "b");
    assert_eq!(
        enc.err().unwrap().to_string(),
        "tag must be added after adding a measurement and before adding fields"
    );
}

#[test]
fn start_line_with_no_fields_on_previous_line() {
    let mut enc = Encoder::new();
    enc.start_line("m");
    enc.start_line("n");
    assert_eq!(
        enc.err().unwrap().to_string(),
        "encoding point 1: cannot start line without adding at least one field to previous line"
    );
    assert_eq!(enc.bytes(), b"");
}

#[test]
fn invalid_measurement_after_empty_line() {
    let mut enc = Encoder::new();
    enc.start_line("m");
    enc.start_line("");
    assert_eq!(
        enc.err().unwrap().to_string(),
        "encoding point 1: cannot start line without adding at least one field to previous line"
    );

    // The current line is in an error state, so fields are dropped.
    enc.add_field("f", Value::Int(1));
    assert_eq!(enc.bytes(), b"");

    // The next line is added fine.
    enc.start_line("m");
    enc.add_field("f", Value::Int(1));
    assert_eq!(enc.bytes(), b"m f=1i");
}

#[test]
fn precision_scales_timestamps() {
    let mut enc = Encoder::new();
    enc.start_line("x");
    enc.set_precision(Precision::Second);
    enc.add_field("f", Value::Int(1));
    enc.end_line(Some(1_615_196_563_299_053_942));
    assert_eq!(enc.bytes(), b"x f=1i 1615196563");

    enc.reset();
    enc.set_precision(Precision::Microsecond);
    enc.start_line("x");
    enc.add_field("f", Value::Int(1));
    enc.end_line(Some(1_615_196_563_299_053_942));
    assert_eq!(enc.bytes(), b"x f=1i 1615196563299053");
}

/// Mirrors the per-point rollback checks: each bad point leaves the
/// buffer as it was, and encoding can continue after `clear_err`.
#[test]
fn data_errors_roll_back_the_point() {
    struct Case {
        name: &'static str,
        encode: fn(&mut Encoder),
        expect: &'static str,
    }
    let cases = [
        Case {
            name: "empty measurement",
            encode: |e| {
                e.start_line("");
                e.add_field("f", Value::Int(1));
            },
            expect: "encoding point 1: invalid measurement \"\"",
        },
        Case {
            name: "non-printable measurement",
            encode: |e| {
                e.start_line(&b"\x01"[..]);
                e.add_field("f", Value::Int(1));
            },
            expect: "encoding point 1: invalid measurement \"\\x01\"",
        },
        Case {
            name: "measurement with trailing backslash",
            encode: |e| {
                e.start_line("x\\");
                e.add_field("f", Value::Int(1));
            },
            expect: "encoding point 1: invalid measurement \"x\\\\\"",
        },
        Case {
            name: "empty tag key",
            encode: |e| {
                e.start_line("m");
                e.add_tag("", "x");
                e.add_tag("b", "x");
                e.add_field("f", Value::Int(1));
            },
            expect: "encoding point 1: invalid tag key \"\"",
        },
        Case {
            name: "empty tag value",
            encode: |e| {
                e.start_line("m");
                e.add_tag("x", "");
                e.add_field("f", Value::Int(1));
            },
            expect: "encoding point 1: invalid tag value x=\"\"",
        },
        Case {
            name: "out of order tag",
            encode: |e| {
                e.start_line("m");
                e.add_tag("x", "1");
                e.add_tag("a", "1");
                e.add_field("f", Value::Int(1));
            },
            expect: "encoding point 1: tag key \"a\" out of order (previous key \"x\")",
        },
        Case {
            name: "empty field key",
            encode: |e| {
                e.start_line("m");
                e.add_field("", Value::Int(1));
                e.end_line(Some(123_456));
            },
            expect: "encoding point 1: invalid field key \"\"",
        },
    ];
    for case in cases {
        let mut enc = Encoder::new();
        enc.start_line("m");
        enc.add_field("f", Value::Int(1));
        assert!(enc.err().is_none(), "{}", case.name);
        let before = enc.bytes().to_vec();
        (case.encode)(&mut enc);
        assert_eq!(enc.err().unwrap().to_string(), case.expect, "{}", case.name);
        assert_eq!(enc.bytes(), &before[..], "{}", case.name);

        enc.clear_err();
        enc.start_line("n");
        enc.add_field("g", Value::Int(1));
        assert!(enc.err().is_none(), "{}", case.name);
        assert_eq!(enc.bytes(), b"m f=1i\nn g=1i", "{}", case.name);
    }
}

#[test]
fn lax_mode_skips_validation_but_not_ordering() {
    let mut enc = Encoder::new();
    enc.set_lax(true);
    enc.start_line(&b"\x01"[..]);
    enc.add_tag("b", "1");
    enc.add_field("f", Value::Int(1));
    enc.end_line(None);
    assert!(enc.err().is_none());
    assert_eq!(enc.bytes(), b"\x01,b=1 f=1i");

    enc.reset();
    enc.set_lax(true);
    enc.start_line("m");
    enc.add_tag("b", "1");
    enc.add_tag("a", "1");
    assert_eq!(
        enc.err().unwrap().kind,
        EncodeErrorKind::TagOutOfOrder {
            key: b"a".to_vec(),
            previous: b"b".to_vec(),
        }
    );
}

#[test]
fn reset_reuses_the_encoder() {
    let encode = |enc: &mut Encoder| {
        enc.start_line("m");
        enc.add_tag("t", "v");
        enc.add_field("f", Value::Float(2.25));
        enc.end_line(Some(42));
    };
    let mut enc = Encoder::new();
    encode(&mut enc);
    let first = enc.bytes().to_vec();
    enc.reset();
    encode(&mut enc);
    assert_eq!(enc.bytes(), &first[..]);

    let mut fresh = Encoder::new();
    encode(&mut fresh);
    assert_eq!(fresh.bytes(), &first[..]);
}

#[test]
fn no_timestamp_when_none_given() {
    let mut enc = Encoder::new();
    enc.start_line("m");
    enc.add_field("f", Value::Int(1));
    enc.end_line(None);
    assert_eq!(enc.bytes(), b"m f=1i");
}

#[test]
fn max_line_bytes_splits_points() {
    let mut enc = Encoder::new();
    enc.set_max_line_bytes(16);
    enc.start_line("m");
    enc.add_tag("t", "1");
    enc.add_field("a", Value::Int(1));
    enc.add_field("b", Value::Int(2));
    enc.add_field("c", Value::Int(3));
    enc.end_line(Some(100));
    assert!(enc.err().is_none());
    assert_eq!(
        enc.bytes(),
        &b"m,t=1 a=1i 100\nm,t=1 b=2i 100\nm,t=1 c=3i 100"[..]
    );
    for line in enc.bytes().split(|&b| b == b'\n') {
        assert!(line.len() <= 16);
    }
}

#[test]
fn max_line_bytes_packs_fields_greedily() {
    let mut enc = Encoder::new();
    enc.set_max_line_bytes(24);
    enc.start_line("m");
    enc.add_field("a", Value::Int(1));
    enc.add_field("b", Value::Int(2));
    enc.add_field("c", Value::Int(3));
    enc.add_field("d", Value::Int(4));
    enc.end_line(None);
    assert!(enc.err().is_none());
    // Header "m" is 1 byte, each pair 4; "m a=1i,b=2i,c=3i,d=4i" is 21,
    // within the limit, so no splitting happens at all.
    assert_eq!(enc.bytes(), b"m a=1i,b=2i,c=3i,d=4i");

    enc.reset();
    enc.set_max_line_bytes(12);
    enc.start_line("m");
    enc.add_field("a", Value::Int(1));
    enc.add_field("b", Value::Int(2));
    enc.add_field("c", Value::Int(3));
    enc.add_field("d", Value::Int(4));
    enc.end_line(None);
    assert!(enc.err().is_none());
    // Two pairs fit per line: "m a=1i,b=2i" is 11 bytes.
    assert_eq!(enc.bytes(), b"m a=1i,b=2i\nm c=3i,d=4i");
}

#[test]
fn max_line_bytes_needs_more_space() {
    let mut enc = Encoder::new();
    enc.set_max_line_bytes(8);
    enc.start_line("m");
    enc.add_field("somewhatlong", Value::Int(1));
    enc.end_line(None);
    assert_eq!(enc.err().unwrap().to_string(), "need more space");
    // No partial line is left behind.
    assert_eq!(enc.bytes(), b"");

    // Later points encode fine.
    enc.clear_err();
    enc.start_line("n");
    enc.add_field("f", Value::Int(1));
    enc.end_line(None);
    assert_eq!(enc.bytes(), b"n f=1i");
}

#[test]
fn encoded_output_decodes_back() {
    let mut enc = Encoder::new();
    enc.start_line("cpu load");
    enc.add_tag("data center", "us,west");
    enc.add_tag("host", "server=1");
    enc.add_field("free mem", Value::Int(2048));
    enc.add_field("note", Value::from("a \"quoted\" value\nwith newline"));
    enc.end_line(Some(1_700_000_000_000_000_000));
    assert!(enc.err().is_none());

    let mut dec = Decoder::new(enc.bytes());
    assert!(dec.next_entry());
    assert_eq!(dec.measurement().unwrap(), Some(&b"cpu load"[..]));
    assert_eq!(
        dec.next_tag().unwrap(),
        Some((&b"data center"[..], &b"us,west"[..]))
    );
    assert_eq!(
        dec.next_tag().unwrap(),
        Some((&b"host"[..], &b"server=1"[..]))
    );
    assert_eq!(dec.next_tag().unwrap(), None);
    let (key, value) = dec.next_field().unwrap().unwrap();
    assert_eq!(key, b"free mem");
    assert_eq!(value, Value::Int(2048));
    let (key, value) = dec.next_field().unwrap().unwrap();
    assert_eq!(key, b"note");
    assert_eq!(value, Value::from("a \"quoted\" value\nwith newline"));
    assert_eq!(dec.next_field().unwrap(), None);
    assert_eq!(
        dec.time(crate::Precision::Nanosecond, None).unwrap(),
        Some(1_700_000_000_000_000_000)
    );
    assert!(!dec.next_entry());
}

#[test]
fn split_lines_decode_back() {
    let mut enc = Encoder::new();
    enc.set_max_line_bytes(20);
    enc.start_line("m");
    enc.add_tag("t", "x");
    enc.add_field("aa", Value::Int(1));
    enc.add_field("bb", Value::Int(2));
    enc.add_field("cc", Value::Int(3));
    enc.end_line(Some(99));
    assert!(enc.err().is_none());

    let mut dec = Decoder::new(enc.bytes());
    let mut fields = vec![];
    let mut entries = 0;
    while dec.next_entry() {
        entries += 1;
        assert_eq!(dec.measurement().unwrap(), Some(&b"m"[..]));
        assert_eq!(dec.next_tag().unwrap(), Some((&b"t"[..], &b"x"[..])));
        assert_eq!(dec.next_tag().unwrap(), None);
        while let Some((k, v)) = dec.next_field().unwrap() {
            fields.push((k.to_vec(), v.into_owned()));
        }
        assert_eq!(dec.time_bytes().unwrap(), Some(&b"99"[..]));
    }
    assert!(entries > 1);
    assert_eq!(
        fields,
        vec![
            (b"aa".to_vec(), Value::Int(1)),
            (b"bb".to_vec(), Value::Int(2)),
            (b"cc".to_vec(), Value::Int(3)),
        ]
    );
}

#[test]
fn negative_timestamp_at_coarser_precision_rounds_down() {
    let mut enc = Encoder::new();
    enc.set_precision(Precision::Second);
    enc.start_line("m");
    enc.add_field("f", Value::Int(1));
    enc.end_line(Some(-1_500_000_000));
    assert_eq!(enc.bytes(), b"m f=1i -2");
}
