mod property_roundtrip;
mod skim_bad;
mod skim_good;

use alloc::{string::String, vec::Vec};

use crate::{JsonMatcher, SkimOptions};

/// Relaxed inventory document shared by the matcher tests.
pub(crate) const DEVICES: &str = r#"[{
type: ENCHARGE,
devices: [
	{
		part_num: 830-00703-r84,
		serial_num: "32131444",
		installed: 17519017,
		device_status: [
			envoy.global.ok,
			prop.done
		],
		percentFull: 100,
		temperature: 31.4,
		dc_switch_off: null,
		child: { value: 1 },
		phase: ph-a,
		object: {}
	},
	{
		part_num: 830-00703-r84,
		installed: 17518704,
		percentFull: 75,
		serial_num: "234234211",
		child: { value: 2 },
		device_status: [
			envoy.global.failure,
			prop.waiting
		]
	}
]},{
type: ENPOWER,
devices: [{
	serial_num: "9834711",
}]
}]"#;

/// Runs `patterns` over `json` and renders every delivery as JSON.
pub(crate) fn matches(patterns: &[&str], json: &str) -> Vec<String> {
    use alloc::string::ToString;

    let mut out = Vec::new();
    {
        let mut matcher = JsonMatcher::with_options(SkimOptions::default());
        for pattern in patterns {
            matcher.add_pattern(pattern).unwrap();
        }
        matcher.set_processor(|capture, _| {
            out.push(capture.to_string());
            Ok(())
        });
        matcher.parse(json).unwrap();
    }
    out
}
