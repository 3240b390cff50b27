//! One-shot dump of what the bridge would see: local controllers, then the
//! target process, its module and the shared region contents.

#[cfg(target_os = "windows")]
fn main() {
    use pinput::backends::windows::{Win32Processes, XInputGamepads};
    use pinput::bridge::SharedRegion;
    use pinput::gamepad::Gamepads;
    use pinput::layout::MAX_SLOTS;
    use pinput::locator::{find_module, find_target};
    use pinput::scanner::find_shared_region;
    use pinput::Config;

    let config = Config::from_env().expect("load config");
    let pattern = config.pattern();

    let mut pads = XInputGamepads::new();
    for slot in 0..MAX_SLOTS {
        match pads.state(slot) {
            Ok(Some(state)) => println!(
                "player {}: packet={} input={:?} caps={:?} battery={:?}",
                slot + 1,
                state.packet_number,
                state.input,
                pads.capabilities(slot),
                pads.battery(slot),
            ),
            Ok(None) => println!("player {}: not connected", slot + 1),
            Err(e) => println!("player {}: {e}", slot + 1),
        }
    }

    let api = Win32Processes::new();
    let process = match find_target(&api, &pattern) {
        Ok(process) => process,
        Err(e) => return println!("{e}"),
    };
    let module = match find_module(&api, &process, &pattern) {
        Ok(module) => module,
        Err(e) => return println!("{e}"),
    };
    println!("module base={:#x} size={:#x}", module.base, module.size);

    let address = match find_shared_region(&process, module) {
        Ok(address) => address,
        Err(e) => return println!("{e}"),
    };
    println!("region at {address:#x}");
    match SharedRegion::new(&process, address).read_record() {
        Ok(record) => {
            for (i, slot) in record.slots.iter().enumerate() {
                println!("slot {i}: {slot:?}");
            }
        }
        Err(e) => println!("{e}"),
    }
}

#[cfg(not(target_os = "windows"))]
fn main() {
    println!("{}", pinput::Error::Unsupported);
}
