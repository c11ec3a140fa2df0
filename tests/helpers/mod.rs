#![allow(dead_code)]
pub mod mock_presenter;

use logalert::core::{NotifierRule, PresentationType};
use logalert::processor::EntryProcessor;
use logalert::store::NotifierStore;
use mock_presenter::RecordingPresenter;
use std::sync::Arc;

pub const USB_EVENT: &str = "pack_hardware_usb_devices";

pub const USB_ENTRY: &str = r#"{"name":"pack_hardware_usb_devices","action":"added","calendarTime":"T1","columns":{"vendor":"Acme","model":"X1","serial":"123"}}"#;

/// The USB device rule used across the pipeline tests.
pub fn usb_rule() -> NotifierRule {
    NotifierRule {
        name: "USB Device Connection".to_string(),
        enabled: true,
        presentation_type: PresentationType::Dialog,
        fields: vec!["vendor".into(), "model".into(), "serial".into()],
        template: "Vendor: {{vendor}}\nModel: {{model}}\nSerial: {{serial}}".to_string(),
    }
}

/// Creates a processor over `rules` that presents through a recording mock.
pub fn pipeline(rules: Vec<(&str, NotifierRule)>) -> (EntryProcessor, Arc<RecordingPresenter>) {
    pipeline_with(rules, RecordingPresenter::new())
}

pub fn pipeline_with(
    rules: Vec<(&str, NotifierRule)>,
    presenter: RecordingPresenter,
) -> (EntryProcessor, Arc<RecordingPresenter>) {
    let presenter = Arc::new(presenter);
    let store = NotifierStore::new(
        rules
            .into_iter()
            .map(|(name, rule)| (name.to_string(), rule))
            .collect(),
    );
    let processor = logalert::build_processor(store, presenter.clone());
    (processor, presenter)
}
