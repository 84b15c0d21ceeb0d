//! Unit tests for the default handler.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};

use super::validation::{check_get_key, check_set_key, check_sub_command};
use super::*;
use crate::command::{
    CecCommand, CecCommandArg, GetConfigRequest, PayloadEntry, ScanRequest, SendCommandRequest,
    SetConfigRequest,
};
use crate::handler::ScanObserver;
use crate::hardware::HardwareResponse;
use crate::tests::support::{MockHardware, ScriptedAdapter, await_result, command_with_channel};

const TV_DUMP: [&str; 4] = [
    "device #0: TV",
    "address: 0",
    "vendor: LG",
    "power status: standby",
];

#[derive(Default)]
struct RecordingObserver {
    scans: Mutex<Vec<Vec<CecDevice>>>,
}

impl ScanObserver for RecordingObserver {
    fn devices_scanned(&self, devices: &[CecDevice]) {
        self.scans.lock().expect("scans lock").push(devices.to_vec());
    }
}

struct Harness {
    adapter: ScriptedAdapter,
    handler: DefaultHandler,
}

impl Harness {
    fn run(&self, payload: CommandPayload) -> CommandResult {
        let (command, receiver) = command_with_channel(payload);
        assert!(matches!(
            self.handler.handle_command(command),
            HandleOutcome::Claimed
        ));
        await_result(&receiver)
    }

    fn scan_tv(&self) {
        self.adapter.reply("scan", &TV_DUMP);
        let result = self.run(CommandPayload::Scan(ScanRequest::default()));
        assert!(result.is_success());
    }

    fn send(&self, name: &str, args: Vec<CecCommandArg>) -> CommandResult {
        self.run(CommandPayload::SendCommand(SendCommandRequest::new(
            "0",
            CecCommand::new(name, args),
        )))
    }
}

#[fixture]
fn harness() -> Harness {
    let adapter = ScriptedAdapter::default();
    let handler = DefaultHandler::start(Box::new(adapter.clone()), "cec0", ScanNotifier::default())
        .expect("handler starts");
    Harness { adapter, handler }
}

// ----------------------------------------------------------------------------
// Registries
// ----------------------------------------------------------------------------

#[rstest]
fn list_adapters_replaces_registry(harness: Harness) {
    harness
        .adapter
        .reply("listAdapters", &["com port: RPI", "com port: /dev/ttyACM0"]);

    let result = harness.run(CommandPayload::ListAdapters);

    assert_eq!(
        result.data(),
        Some(&ResultData::Adapters {
            names: vec![String::from("cec0"), String::from("/dev/ttyACM0")],
        })
    );
    assert_eq!(harness.handler.adapters(), vec!["cec0", "/dev/ttyACM0"]);

    harness.adapter.reply("listAdapters", &["com port: /dev/ttyACM1"]);
    harness.run(CommandPayload::ListAdapters);
    assert_eq!(harness.handler.adapters(), vec!["/dev/ttyACM1"]);
}

#[test]
fn scan_updates_registry_and_notifies_observers() {
    let adapter = ScriptedAdapter::default();
    let notifier = ScanNotifier::default();
    let observer = Arc::new(RecordingObserver::default());
    notifier.subscribe(Arc::clone(&observer) as Arc<dyn ScanObserver>);
    let handler =
        DefaultHandler::start(Box::new(adapter.clone()), "cec0", notifier).expect("handler starts");
    let harness = Harness { adapter, handler };

    harness.scan_tv();

    let tv = harness.handler.device_info("0").expect("tv registered");
    assert_eq!(tv.vendor, "LG");
    let scans = observer.scans.lock().expect("scans lock");
    assert_eq!(scans.len(), 1);
    assert_eq!(scans.first().map(Vec::len), Some(1));
}

#[rstest]
fn repeated_scan_replaces_rather_than_duplicates(harness: Harness) {
    harness.scan_tv();
    harness.scan_tv();
    assert_eq!(harness.handler.devices().len(), 1);

    harness
        .adapter
        .reply("scan", &["device #0: TV", "address: 0", "power status: on"]);
    harness.run(CommandPayload::Scan(ScanRequest::default()));

    let devices = harness.handler.devices();
    assert_eq!(devices.len(), 1);
    assert_eq!(
        devices.first().map(|device| device.power_status.as_str()),
        Some("on")
    );
}

// ----------------------------------------------------------------------------
// Validation
// ----------------------------------------------------------------------------

#[rstest]
fn unknown_destination_fails_synchronously(harness: Harness) {
    let (command, receiver) = command_with_channel(CommandPayload::SendCommand(
        SendCommandRequest::new("4", CecCommand::new("active", Vec::new())),
    ));

    harness.handler.handle_command(command);

    let result = receiver.try_recv().expect("completed before returning");
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidDestination));
    assert!(harness.adapter.received().is_empty());
    assert_eq!(harness.handler.pending_len(), 0);
}

#[rstest]
fn unknown_adapter_is_rejected(harness: Harness) {
    let (command, receiver) = command_with_channel(CommandPayload::Scan(ScanRequest {
        adapter: Some(String::from("cec9")),
    }));

    harness.handler.handle_command(command);

    let result = receiver.try_recv().expect("completed before returning");
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidAdapter));
    assert!(harness.adapter.received().is_empty());
}

#[rstest]
#[case::empty("", None)]
#[case::on("on", None)]
#[case::standby("standby", None)]
#[case::off("off", Some(ErrorKind::InvalidParameters))]
fn report_power_status_values(
    harness: Harness,
    #[case] value: &str,
    #[case] expected: Option<ErrorKind>,
) {
    harness.scan_tv();
    let result = harness.send(
        "report-power-status",
        vec![CecCommandArg::with_value("pwr-state", value)],
    );
    assert_eq!(result.error_kind(), expected);
}

fn args(pairs: &[(&str, &str)]) -> Vec<CecCommandArg> {
    pairs
        .iter()
        .map(|(arg, value)| CecCommandArg::with_value(*arg, *value))
        .collect()
}

#[rstest]
#[case::audio("report-audio-status", args(&[("audio-status", "")]), Ok(()))]
#[case::audio_value("report-audio-status", args(&[("audio-status", "loud")]), Err(ErrorKind::InvalidParameters))]
#[case::volume_up("set-volume", args(&[("volume", "up")]), Ok(()))]
#[case::volume_unmute("set-volume", args(&[("volume", "unmute")]), Ok(()))]
#[case::volume_bad("set-volume", args(&[("volume", "11")]), Err(ErrorKind::InvalidParameters))]
#[case::osd("osd-display", args(&[("display-text", "Hello")]), Ok(()))]
#[case::osd_wrong_arg("osd-display", args(&[("text", "Hello")]), Err(ErrorKind::InvalidParameters))]
#[case::active("active", Vec::new(), Ok(()))]
#[case::active_with_arg("active", args(&[("x", "")]), Err(ErrorKind::InvalidParameters))]
#[case::one_touch("one-touch-play", Vec::new(), Ok(()))]
#[case::vendor("vendor-commands", args(&[("vendor-command", "0x01")]), Ok(()))]
#[case::vendor_extra(
    "vendor-commands",
    args(&[("vendor-command", "0x01"), ("vendor-command", "0x02")]),
    Err(ErrorKind::InvalidParameters)
)]
#[case::sysinfo("system-information", args(&[("vendor-id", ""), ("is-active", "")]), Ok(()))]
#[case::sysinfo_empty("system-information", Vec::new(), Err(ErrorKind::InvalidParameters))]
#[case::sysinfo_duplicate(
    "system-information",
    args(&[("name", ""), ("name", "")]),
    Err(ErrorKind::InvalidParameters)
)]
#[case::sysinfo_value("system-information", args(&[("name", "TV")]), Err(ErrorKind::InvalidParameters))]
#[case::sysinfo_unknown("system-information", args(&[("colour", "")]), Err(ErrorKind::InvalidParameters))]
#[case::unknown("reboot", Vec::new(), Err(ErrorKind::InvalidCommand))]
fn sub_command_contracts(
    #[case] name: &str,
    #[case] args: Vec<CecCommandArg>,
    #[case] expected: Result<(), ErrorKind>,
) {
    assert_eq!(check_sub_command(&CecCommand::new(name, args)), expected);
}

#[rstest]
#[case::vendor("vendorId", true, true)]
#[case::osd("osd", true, true)]
#[case::device_type("deviceType", false, true)]
#[case::power("powerState", true, false)]
#[case::logical("logicalAddress", true, false)]
#[case::unknown("colour", false, false)]
fn config_keys(#[case] key: &str, #[case] gettable: bool, #[case] settable: bool) {
    assert_eq!(check_get_key(key).is_ok(), gettable);
    assert_eq!(check_set_key(key).is_ok(), settable);
}

#[rstest]
fn oversized_osd_text_is_invalid(harness: Harness) {
    harness.scan_tv();
    let result = harness.send(
        "osd-display",
        vec![CecCommandArg::with_value("display-text", "x".repeat(65))],
    );
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidParameters));
}

#[rstest]
#[case::newline("Hello\nsetConfig osd=on")]
#[case::tab("Hello\tWorld")]
fn osd_text_with_control_characters_is_invalid(harness: Harness, #[case] text: &str) {
    harness.scan_tv();
    let result = harness.send(
        "osd-display",
        vec![CecCommandArg::with_value("display-text", text)],
    );
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidParameters));
    assert_eq!(harness.adapter.received_names(), vec![String::from("scan")]);
}

#[rstest]
fn osd_text_with_spaces_is_escaped_on_the_request_line(harness: Harness) {
    harness.scan_tv();
    let result = harness.send(
        "osd-display",
        vec![CecCommandArg::with_value("display-text", "Hello World")],
    );
    assert!(result.is_success());
    let sent = harness.adapter.received();
    assert_eq!(
        sent.last().map(NativeCommand::to_request_line).as_deref(),
        Some(
            "osd-display adapter=cec0 destAddress=0 timeout=1000 \
             name=osd-display display-text=Hello%20World"
        )
    );
}

// ----------------------------------------------------------------------------
// Translation and replies
// ----------------------------------------------------------------------------

#[rstest]
fn send_command_is_translated_in_order(harness: Harness) {
    harness.scan_tv();
    harness.adapter.reply("report-power-status", &["power status: on"]);

    let result = harness.send(
        "report-power-status",
        vec![CecCommandArg::named("pwr-state")],
    );

    assert_eq!(
        result.data(),
        Some(&ResultData::SendCommand {
            payload: vec![PayloadEntry::new("pwr-state", "on")],
        })
    );
    let sent = harness.adapter.received();
    let native = sent.last().expect("command sent");
    assert_eq!(
        native.to_request_line(),
        "report-power-status adapter=cec0 destAddress=0 timeout=1000 \
         name=report-power-status pwr-state="
    );
}

#[rstest]
fn get_config_reports_logical_address(harness: Harness) {
    harness.adapter.reply("getConfig", &["logical address 4"]);

    let result = harness.run(CommandPayload::GetConfig(GetConfigRequest {
        key: String::from("logicalAddress"),
        adapter: None,
    }));

    assert_eq!(
        result.data(),
        Some(&ResultData::ConfigValue {
            key: String::from("logicalAddress"),
            value: String::from("4"),
        })
    );
    let sent = harness.adapter.received();
    assert_eq!(
        sent.last().map(NativeCommand::to_request_line).as_deref(),
        Some("getConfig logicalAddress= adapter=cec0")
    );
}

#[rstest]
fn set_config_places_key_before_adapter(harness: Harness) {
    let result = harness.run(CommandPayload::SetConfig(SetConfigRequest {
        key: String::from("osd"),
        value: String::from("Lounge"),
        adapter: None,
    }));

    assert_eq!(result.data(), Some(&ResultData::Applied {}));
    let sent = harness.adapter.received();
    assert_eq!(
        sent.last().map(NativeCommand::to_request_line).as_deref(),
        Some("setConfig osd=Lounge adapter=cec0")
    );
}

#[rstest]
#[case::failed(Err(CecError::Timeout { command: "scan".into(), timeout_ms: 5 }))]
#[case::not_implemented(Ok(HardwareResponse::NotImplemented))]
fn adapter_failures_surface_as_hardware_unavailable(
    #[case] reply: Result<HardwareResponse, CecError>,
) {
    let mut hardware = MockHardware::new();
    hardware.expect_open().returning(|| Ok(()));
    hardware
        .expect_execute()
        .return_once(move |_| reply);
    hardware.expect_close().returning(|| ());
    let handler = DefaultHandler::start(Box::new(hardware), "cec0", ScanNotifier::default())
        .expect("handler starts");

    let (command, receiver) = command_with_channel(CommandPayload::ListAdapters);
    handler.handle_command(command);

    let result = await_result(&receiver);
    assert_eq!(result.error_kind(), Some(ErrorKind::HardwareUnavailable));
    assert_eq!(handler.pending_len(), 0);
}

#[test]
fn completions_fire_in_submission_order() {
    let mut hardware = MockHardware::new();
    hardware.expect_open().returning(|| Ok(()));
    hardware.expect_execute().returning(|command| {
        if command.name() == "scan" {
            thread::sleep(Duration::from_millis(100));
            Ok(HardwareResponse::Lines(
                TV_DUMP.iter().map(|line| (*line).to_owned()).collect(),
            ))
        } else {
            Ok(HardwareResponse::Lines(vec![String::from("logical address 4")]))
        }
    });
    hardware.expect_close().returning(|| ());
    let handler = DefaultHandler::start(Box::new(hardware), "cec0", ScanNotifier::default())
        .expect("handler starts");

    let order = Arc::new(Mutex::new(Vec::new()));
    let (done_sender, done_receiver) = std::sync::mpsc::channel();
    let record = |label: &'static str| {
        let completed = Arc::clone(&order);
        let done = done_sender.clone();
        move |result: CommandResult| {
            assert!(result.is_success(), "{label} failed: {result:?}");
            completed.lock().expect("order lock").push(label);
            drop(done.send(()));
        }
    };
    let scan = crate::command::Command::new(
        CommandPayload::Scan(ScanRequest::default()),
        record("scan"),
    );
    let get_config = crate::command::Command::new(
        CommandPayload::GetConfig(GetConfigRequest {
            key: String::from("logicalAddress"),
            adapter: None,
        }),
        record("getConfig"),
    );

    assert!(matches!(handler.handle_command(scan), HandleOutcome::Claimed));
    assert!(matches!(
        handler.handle_command(get_config),
        HandleOutcome::Claimed
    ));
    for _ in 0..2 {
        done_receiver
            .recv_timeout(crate::tests::support::COMPLETION_TIMEOUT)
            .expect("completion delivered");
    }

    assert_eq!(*order.lock().expect("order lock"), vec!["scan", "getConfig"]);
}

#[test]
fn dropping_handler_completes_every_pending_command() {
    let mut hardware = MockHardware::new();
    hardware.expect_open().returning(|| Ok(()));
    hardware.expect_execute().returning(|_| {
        thread::sleep(Duration::from_millis(100));
        Ok(HardwareResponse::Lines(Vec::new()))
    });
    hardware.expect_close().returning(|| ());
    let handler = DefaultHandler::start(Box::new(hardware), "cec0", ScanNotifier::default())
        .expect("handler starts");

    let (first, first_receiver) = command_with_channel(CommandPayload::ListAdapters);
    let (second, second_receiver) = command_with_channel(CommandPayload::ListAdapters);
    handler.handle_command(first);
    handler.handle_command(second);
    drop(handler);

    await_result(&first_receiver);
    let second_result = await_result(&second_receiver);
    assert_eq!(second_result.kind(), CommandKind::ListAdapters);
    assert!(first_receiver.try_recv().is_err(), "completed exactly once");
    assert!(second_receiver.try_recv().is_err(), "completed exactly once");
}
