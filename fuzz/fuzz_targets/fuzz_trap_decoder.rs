#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_watch::trap::{Snmp2TrapDecoder, TrapDecoder, read_version};

fuzz_target!(|data: &[u8]| {
    let header = read_version(data);
    let source = "127.0.0.1:162".parse().unwrap();

    // Anything the decoder accepts must carry a readable header
    if let Ok(pdu) = Snmp2TrapDecoder.decode(data, source) {
        assert_eq!(header, Ok(pdu.version));
    }
});
