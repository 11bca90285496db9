use std::sync::{Arc, Mutex};

use mdtp::protocol::{decode_frame, make_container, make_value};
use mdtp::{
    ABI_VERSION, Error, Host, LogLevel, Module, ModuleApi, ModuleContext, Node, NodeRef,
    ReportingModule, Result,
};

#[derive(Default)]
struct RecordingHost {
    abi_version: u32,
    logs: Mutex<Vec<(String, LogLevel, String)>>,
}

impl RecordingHost {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            abi_version: ABI_VERSION,
            ..Self::default()
        })
    }

    fn logs(&self) -> Vec<(String, LogLevel, String)> {
        self.logs.lock().unwrap().clone()
    }
}

impl Host for RecordingHost {
    fn abi_version(&self, _context: &ModuleContext) -> u32 {
        self.abi_version
    }

    fn log(&self, context: &ModuleContext, level: LogLevel, message: &str) {
        self.logs
            .lock()
            .unwrap()
            .push((context.name().to_owned(), level, message.to_owned()));
    }
}

fn ram_report(context: &ModuleContext) -> Result<Vec<Node>> {
    Ok(vec![make_container(
        context.name(),
        [make_value("use", "12", "gb")?, make_value("free", "4", "gb")?],
    )?])
}

#[test]
fn host_drives_module_through_table() {
    let host = RecordingHost::new();
    let module = Module::init(
        "ram",
        "RAM usage",
        Arc::clone(&host),
        r#"{"poll_ratio": 2, "unit": "gb"}"#,
    )
    .unwrap();
    assert_eq!(module.config().get("unit").and_then(|v| v.as_str()), Some("gb"));

    let mut table: Box<dyn ModuleApi> = Box::new(ReportingModule::new(module, ram_report));
    assert_eq!(table.name(), "ram");
    assert_eq!(table.description(), "RAM usage");
    assert_eq!(table.context().name(), "ram");
    assert_eq!(table.poll_ratio(), 2);
    assert!(table.is_enabled());

    let bytes = table.get_data().unwrap().to_bytes();
    let frame = decode_frame(&bytes).unwrap();
    let top = frame.nodes().collect::<std::result::Result<Vec<_>, _>>().unwrap();
    assert_eq!(top.len(), 1);
    let NodeRef::Container(ram) = top[0] else {
        panic!("report should be a container");
    };
    assert_eq!(ram.name, b"ram");
    assert_eq!(ram.children().count(), 2);

    assert!(host.logs().is_empty());
}

#[test]
fn disabled_module_keeps_last_frame() {
    let mut reporting = ReportingModule::new(
        Module::init("ram", "RAM usage", RecordingHost::new(), "").unwrap(),
        ram_report,
    );
    let first = reporting.get_data().unwrap().to_bytes();

    reporting.disable();
    assert!(matches!(
        reporting.get_data(),
        Err(Error::ModuleDisabled { .. })
    ));
    assert_eq!(reporting.module().data().unwrap().as_bytes(), &first[..]);

    let config = reporting.configuration().unwrap();
    assert!(config.contains("\"enabled\":false"));
}

#[test]
fn collector_failure_is_logged_to_host() {
    let host = RecordingHost::new();
    let module = Module::init("disk", "Disk usage", Arc::clone(&host), "").unwrap();
    let failing = |_: &ModuleContext| -> Result<Vec<Node>> {
        Ok(vec![make_container("sda", Vec::new())?])
    };
    let mut reporting = ReportingModule::new(module, failing);

    assert!(reporting.get_data().is_err());

    let logs = host.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].0, "disk");
    assert_eq!(logs[0].1, LogLevel::Error);
    assert!(logs[0].2.starts_with("collection failed"));
}

#[test]
fn module_log_reaches_host() {
    let host = RecordingHost::new();
    let module = Module::init("net", "Network", Arc::clone(&host), "").unwrap();
    module.log(LogLevel::Warning, "interface eth1 missing");
    assert_eq!(module.server_abi_version(), ABI_VERSION);

    assert_eq!(
        host.logs(),
        vec![(
            "net".to_owned(),
            LogLevel::Warning,
            "interface eth1 missing".to_owned()
        )]
    );
}

#[test]
fn init_rejects_foreign_abi() {
    let host = Arc::new(RecordingHost {
        abi_version: ABI_VERSION + 7,
        ..RecordingHost::default()
    });
    let err = Module::init("ram", "RAM usage", host, "").unwrap_err();
    assert!(matches!(
        err,
        Error::AbiMismatch { expected, found } if expected == ABI_VERSION && found == ABI_VERSION + 7
    ));
}

#[test]
fn init_rejects_bad_configuration() {
    let err = Module::init("ram", "RAM usage", RecordingHost::new(), "[1, 2").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn each_module_owns_its_frame() {
    let mut cpu = Module::init("cpu", "CPU usage", RecordingHost::new(), "").unwrap();
    let mut ram = Module::init("ram", "RAM usage", RecordingHost::new(), "").unwrap();

    cpu.make_root([make_value("load", "0.5", "").unwrap()])
        .unwrap();
    ram.make_root(Vec::new()).unwrap();

    assert_eq!(cpu.data().unwrap().payload_size(), 13 + 4 + 3);
    assert_eq!(ram.data().unwrap().payload_size(), 0);
}
