use crate::embedded;
use crate::quagga::QuaggaDecoder;
use dioxus::prelude::*;
use futures::channel::mpsc;
use shelf_core::scanner::detection_channel;
use shelf_core::{drive, run_scanner, HttpBookApi, Msg, ScannerCommand, ScannerController, UiState};
use shelf_ui::LibraryView;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};

type CommandReceiver = Rc<RefCell<Option<mpsc::UnboundedReceiver<ScannerCommand>>>>;

#[component]
pub fn Library() -> Element {
    let config = use_hook(embedded::load_config);
    let api = use_hook(|| Rc::new(HttpBookApi::from_config(&config)));
    let state = use_signal(|| UiState::new(embedded::load_snapshot()));
    let (commands, receiver) = use_hook(|| {
        let (tx, rx) = mpsc::unbounded::<ScannerCommand>();
        (tx, CommandReceiver::new(RefCell::new(Some(rx))))
    });

    use_hook(|| {
        info!(
            "Library opened with {} books, API at {}",
            state.peek().table.len(),
            api.base_url()
        );
    });

    // Each message drives its own task, so several requests can be in flight
    let dispatch = use_callback({
        let api = api.clone();
        move |msg: Msg| {
            let api = api.clone();
            let commands = commands.clone();
            let mut state = state;
            spawn(async move {
                drive(
                    &*api,
                    msg,
                    move |msg| state.write().update(msg),
                    move |command| {
                        if commands.unbounded_send(command).is_err() {
                            warn!("Scanner task is gone, dropping {:?}", command);
                        }
                    },
                )
                .await;
            });
        }
    });

    use_future({
        let api = api.clone();
        let scanner_config = config.scanner.clone();
        move || {
            let api = api.clone();
            let scanner_config = scanner_config.clone();
            let commands = receiver.borrow_mut().take();
            async move {
                let Some(commands) = commands else {
                    return;
                };
                let (sink, detections) = detection_channel();
                let controller = ScannerController::new(QuaggaDecoder::new(), scanner_config, sink);
                run_scanner(controller, &*api, commands, detections, move |msg| {
                    dispatch.call(msg)
                })
                .await;
            }
        }
    });

    rsx! {
        LibraryView {
            state,
            scanner_target: config.scanner.target_id.clone(),
            on_msg: move |msg: Msg| dispatch.call(msg),
        }
    }
}
