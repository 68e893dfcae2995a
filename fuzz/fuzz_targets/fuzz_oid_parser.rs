#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_watch::oid::Oid;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(oid) = Oid::parse(s) else {
        return;
    };

    // Display must round-trip through the parser
    let reparsed = Oid::parse(&oid.to_string()).expect("display output must parse");
    assert_eq!(reparsed, oid);

    // Path arithmetic must stay in bounds at every level
    for level in 0..=oid.levels() + 1 {
        let cut = oid.cut_after_level(level);
        assert!(cut.levels() <= oid.levels());
        assert!(oid.starts_with(&cut));
        if let Ok(suffix) = oid.cut_common_root(&cut) {
            assert_eq!(cut.concat(&suffix), oid);
        }
        let _ = oid.level_value(level);
    }
});
