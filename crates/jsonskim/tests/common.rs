#![allow(missing_docs)]
#![allow(dead_code)]

use jsonskim::JsonMatcher;

/// Hand-edited inventory: unquoted names and values, a trailing comma.
pub const DEVICES: &str = r#"[{
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

/// The same inventory as standard JSON.
pub const DEVICES_STRICT: &str = r#"[
  {
    "type": "ENCHARGE",
    "devices": [
      {
        "part_num": "830-00703-r84",
        "serial_num": "32131444",
        "installed": 17519017,
        "device_status": ["envoy.global.ok", "prop.done"],
        "percentFull": 100,
        "temperature": 31.4,
        "dc_switch_off": null,
        "child": { "value": 1 },
        "phase": "ph-a",
        "object": {}
      },
      {
        "part_num": "830-00703-r84",
        "installed": 17518704,
        "percentFull": 75,
        "serial_num": "234234211",
        "child": { "value": 2 },
        "device_status": ["envoy.global.failure", "prop.waiting"]
      }
    ]
  },
  {
    "type": "ENPOWER",
    "devices": [{ "serial_num": "9834711" }]
  }
]"#;

/// Runs `patterns` over `json`, one line per delivery: the pattern index,
/// the open path (`(end)` once the scan is over) and the capture.
pub fn render(patterns: &[&str], json: &str) -> String {
    let mut lines = Vec::new();
    {
        let mut matcher = JsonMatcher::new();
        for pattern in patterns {
            matcher.add_pattern(pattern).unwrap();
        }
        matcher.set_processor(|capture, control| {
            let path = control.path();
            let path = if path.is_empty() { "(end)" } else { path.as_str() };
            lines.push(format!("#{} {path} {capture}", control.pattern()));
            Ok(())
        });
        matcher.parse(json).unwrap();
    }
    lines.join("\n")
}

#[test]
fn relaxed_and_strict_inventories_agree() {
    let mut matcher = JsonMatcher::new();
    let relaxed = matcher.parse_value(DEVICES).unwrap().unwrap();

    let value: serde_json::Value = serde_json::from_str(DEVICES_STRICT).unwrap();
    assert_eq!(relaxed.to_string(), serde_json::to_string(&value).unwrap());
}
