//! Board identification from cpuinfo text through to peripheral layout.
// Test file: unwrap/panic/indexing/arithmetic are the assertion mechanism here.
#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]

use platform::revision::{self, BoardFamily, RevisionError};

/// Revision codes taken from real boards.
const KNOWN: &[(u32, BoardFamily)] = &[
    (0x00a0_1041, BoardFamily::Pi2), // Pi 2B 1.1
    (0x00a0_2082, BoardFamily::Pi3), // Pi 3B
    (0x00a0_20d3, BoardFamily::Pi3), // Pi 3B+
    (0x00b0_3111, BoardFamily::Pi4), // Pi 4B 2GB
    (0x00c0_3114, BoardFamily::Pi4), // Pi 4B 4GB 1.4
    (0x00d0_3114, BoardFamily::Pi4), // Pi 4B 8GB
];

#[test]
fn known_boards_resolve() {
    for &(raw, family) in KNOWN {
        let layout = revision::resolve(revision::family_code(raw)).unwrap();
        assert_eq!(layout.family, family, "revision {raw:#x}");
    }
}

#[test]
fn pi_zero_and_pi1_are_unsupported() {
    // BCM2835 family code 0
    for raw in [0x0000_0002u32, 0x0090_0092] {
        assert!(matches!(
            revision::resolve(revision::family_code(raw)),
            Err(RevisionError::Unsupported { code: 0 })
        ));
    }
}

#[test]
fn cpuinfo_file_on_pi3() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        "processor\t: 3\nmodel name\t: ARMv7 Processor rev 4 (v7l)\n\
         Hardware\t: BCM2835\nRevision\t: a02082\nSerial\t\t: 00000000deadbeef\n",
    )
    .unwrap();
    let layout = revision::detect(file.path()).unwrap();
    assert_eq!(layout.family.to_string(), "Raspberry Pi 2/3");
    assert_eq!(layout.peripheral_base, 0x3F00_0000);
    assert_eq!(layout.pll_source_khz, 500_000);
}

proptest::proptest! {
    /// Only family codes 1..=3 resolve, and the layout depends only on them.
    #[test]
    fn resolution_depends_only_on_family_field(raw in 0u32..=u32::MAX) {
        let code = revision::family_code(raw);
        assert!(code <= 0xF);
        match revision::resolve(code) {
            Ok(layout) => {
                assert!((1..=3).contains(&code));
                let expected = if code == 3 { (0xFE00_0000, 750_000) } else { (0x3F00_0000, 500_000) };
                assert_eq!((layout.peripheral_base, layout.pll_source_khz), expected);
            }
            Err(RevisionError::Unsupported { code: c }) => {
                assert_eq!(c, code);
                assert!(!(1..=3).contains(&code));
            }
            Err(other) => panic!("unexpected error {other}"),
        }
    }

    /// Any well-formed revision line round-trips through the scanner.
    #[test]
    fn well_formed_line_is_parsed(raw in 0u32..=0x00FF_FFFF, upper in proptest::bool::ANY) {
        let value = if upper { format!("{raw:X}") } else { format!("{raw:x}") };
        let text = format!("Hardware\t: BCM2835\nRevision\t: {value}\nModel\t\t: x\n");
        assert_eq!(revision::parse_cpuinfo(&text), Some(raw));
    }
}
