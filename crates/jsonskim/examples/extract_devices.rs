//! Pulls a handful of fields out of a hand-edited device inventory without
//! building the whole document.
//!
//! The inventory uses relaxed JSON: unquoted names and values, comments, and
//! a trailing comma. Three patterns run over it in a single pass:
//!
//! - `*/devices/*@/(serial_num,percentFull)` groups two fields per device and
//!   delivers them as each device object closes;
//! - `*@/(type)` names the kind of each group as the group closes;
//! - `**/(temperature[])` collects every temperature, wherever it appears.
//!
//! Devices reporting a failure are skipped with [`Control::reject_all`].
//!
//! Run with
//!
//! ```bash
//! cargo run -p jsonskim --example extract_devices
//! ```

use jsonskim::{Capture, Control, JsonMatcher, MatcherError, ProcessError};

const INVENTORY: &str = r#"
// Exported by the gateway, then edited by hand.
[{
  type: ENCHARGE,
  devices: [
    { serial_num: "32131444", percentFull: 100, temperature: 31.4, status: ok },
    { serial_num: "234234211", status: failure, percentFull: 75, temperature: 29 },
    { serial_num: "9834711", percentFull: 12, temperature: 33.0, status: ok, },
  ]
}, {
  type: ENPOWER,
  /* one device only */
  devices: [{ serial_num: "55501", temperature: 40, status: ok }]
}]
"#;

/// Drops the device being scanned if `capture` reports a failure.
fn skip_failures(
    devices: usize,
) -> impl FnMut(&Capture, &mut Control<'_>) -> Result<(), ProcessError> {
    move |capture: &Capture, control: &mut Control<'_>| {
        if capture.value().as_str() == Some("failure") {
            // Nothing else in this device object is delivered, and the fields
            // already held for it are dropped.
            control.reject_all();
            control.clear_pattern(devices)?;
        }
        Ok(())
    }
}

fn main() -> Result<(), MatcherError> {
    let mut report = Vec::new();
    {
        let mut matcher = JsonMatcher::new();
        let devices = matcher.add_pattern("*/devices/*@/(serial_num,percentFull)")?;
        let kinds = matcher.add_pattern("*@/(type)")?;
        let temperatures = matcher.add_pattern("**/(temperature[])")?;
        matcher.add_pattern_with("*/devices/*/(status@)", skip_failures(devices))?;

        let report = &mut report;
        matcher.set_processor(move |capture, control| {
            let pattern = control.pattern();
            if pattern == devices {
                report.push(format!("device {capture} at {}", control.path()));
            } else if pattern == kinds {
                report.push(format!("group {capture}"));
            } else if pattern == temperatures {
                report.push(format!("temperatures {capture}"));
            }
            Ok(())
        });
        matcher.parse(INVENTORY)?;
    }

    for line in report {
        println!("{line}");
    }
    Ok(())
}
