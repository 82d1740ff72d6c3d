//! Camera barcode scanning
//!
//! The decoder itself lives behind [`Decoder`] (in the browser it is a
//! JavaScript library loaded on first use). [`ScannerController`] owns one
//! decoder and tracks the session state; [`run_scanner`] is the task that
//! owns the controller, reacts to open/close commands and decoded codes, and
//! turns each fresh code into an ISBN lookup.

use crate::api::{ApiError, BookApi};
use crate::config::ScannerConfig;
use crate::controller::Msg;
use crate::form::normalize_isbn;
use crate::model::BookFields;
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::stream::FuturesUnordered;
use futures::{select_biased, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Barcode formats the decoder is asked to recognize
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Ean13,
    Ean8,
}

impl Symbology {
    /// Reader name understood by the browser decoder
    pub fn reader_name(self) -> &'static str {
        match self {
            Self::Ean13 => "ean_reader",
            Self::Ean8 => "ean_8_reader",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScannerError {
    #[error("could not load the barcode library: {0}")]
    LibraryLoad(String),
    #[error("camera access was denied")]
    PermissionDenied,
    #[error("could not start the camera: {0}")]
    Init(String),
    #[error("barcode library is not loaded")]
    NotReady,
}

impl ScannerError {
    /// Text suitable for showing to the user
    pub fn notice(&self) -> String {
        match self {
            Self::PermissionDenied => {
                "Camera access was denied. Allow camera access to scan barcodes.".to_string()
            }
            Self::LibraryLoad(_) => "The barcode scanner could not be loaded.".to_string(),
            Self::Init(_) | Self::NotReady => "The camera could not be started.".to_string(),
        }
    }
}

/// Sending half the decoder pushes decoded codes into
pub type DetectionSink = mpsc::UnboundedSender<String>;
pub type DetectionStream = mpsc::UnboundedReceiver<String>;

pub fn detection_channel() -> (DetectionSink, DetectionStream) {
    mpsc::unbounded()
}

/// A barcode decoder bound to a camera
#[async_trait(?Send)]
pub trait Decoder {
    /// Fetch the decoder implementation. Called at most once per success.
    async fn load_library(&mut self, url: &str) -> Result<(), ScannerError>;

    /// Ask for camera access without starting the decoding pipeline
    async fn request_camera(&mut self, config: &ScannerConfig) -> Result<(), ScannerError>;

    /// Set up the video input and decoder for a new session
    async fn configure(&mut self, config: &ScannerConfig) -> Result<(), ScannerError>;

    /// Begin capture, delivering every decoded code to `sink`
    fn start(&mut self, sink: DetectionSink) -> Result<(), ScannerError>;

    /// Halt capture and remove any drawing left on the preview
    fn stop(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScannerState {
    NotLoaded,
    LoadingLibrary,
    Idle,
    Scanning,
}

/// What to do with a decoded code
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Detection {
    /// No session is running
    Ignored,
    /// Same code as the previous detection
    Suppressed,
    /// A fresh code to look up
    Lookup(String),
}

/// Scanning session state around one [`Decoder`]
pub struct ScannerController<D> {
    decoder: D,
    config: ScannerConfig,
    sink: DetectionSink,
    state: ScannerState,
    last_code: Option<String>,
    /// Bumped by every successful start; tags lookups with their session
    session: u64,
}

impl<D: Decoder> ScannerController<D> {
    pub fn new(decoder: D, config: ScannerConfig, sink: DetectionSink) -> Self {
        Self {
            decoder,
            config,
            sink,
            state: ScannerState::NotLoaded,
            last_code: None,
            session: 0,
        }
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScannerState::Scanning
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Whether a lookup started in `session` still belongs to a running one
    pub fn is_current(&self, session: u64) -> bool {
        self.is_scanning() && self.session == session
    }

    /// Load the decoder library once. A failed load can be retried.
    pub async fn ensure_library_loaded(&mut self) -> Result<(), ScannerError> {
        if self.state != ScannerState::NotLoaded {
            return Ok(());
        }

        self.state = ScannerState::LoadingLibrary;
        match self.decoder.load_library(&self.config.library_url).await {
            Ok(()) => {
                info!("Barcode library loaded from {}", self.config.library_url);
                self.state = ScannerState::Idle;
                Ok(())
            }
            Err(e) => {
                warn!("Barcode library failed to load: {}", e);
                self.state = ScannerState::NotLoaded;
                Err(e)
            }
        }
    }

    pub async fn request_camera_permission(&mut self) -> Result<(), ScannerError> {
        self.decoder
            .request_camera(&self.config)
            .await
            .inspect_err(|e| warn!("Camera request failed: {}", e))
    }

    /// Start a new session, stopping the current one first
    pub async fn start(&mut self) -> Result<(), ScannerError> {
        self.stop();
        if self.state == ScannerState::NotLoaded || self.state == ScannerState::LoadingLibrary {
            return Err(ScannerError::NotReady);
        }

        let init = |e: ScannerError| match e {
            ScannerError::Init(_) => e,
            other => ScannerError::Init(other.to_string()),
        };
        self.decoder.configure(&self.config).await.map_err(init)?;
        if let Err(e) = self.decoder.start(self.sink.clone()) {
            // configure may already hold the camera
            self.decoder.stop();
            return Err(init(e));
        }

        self.state = ScannerState::Scanning;
        self.last_code = None;
        self.session += 1;
        debug!("Scanning started");
        Ok(())
    }

    pub fn on_decoded(&mut self, raw: &str) -> Detection {
        if !self.is_scanning() {
            return Detection::Ignored;
        }
        let code = normalize_isbn(raw);
        if code.is_empty() {
            return Detection::Ignored;
        }
        if self.last_code.as_deref() == Some(code.as_str()) {
            return Detection::Suppressed;
        }
        debug!("Decoded {}", code);
        self.last_code = Some(code.clone());
        Detection::Lookup(code)
    }

    pub fn lookup_succeeded(&mut self) {
        self.stop();
    }

    /// Forget the failed code so that scanning it again retries the lookup.
    /// A newer code stays remembered.
    pub fn lookup_failed(&mut self, code: &str) {
        if self.last_code.as_deref() == Some(code) {
            self.last_code = None;
        }
    }

    pub fn stop(&mut self) {
        if self.state == ScannerState::Scanning {
            self.decoder.stop();
            self.state = ScannerState::Idle;
            debug!("Scanning stopped");
        }
        self.last_code = None;
    }

    /// Everything opening the scanner view needs, in order
    pub async fn open(&mut self) -> Result<(), ScannerError> {
        self.stop();
        self.ensure_library_loaded().await?;
        self.request_camera_permission().await?;
        self.start().await
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScannerCommand {
    Open,
    Close,
}

struct Lookup {
    session: u64,
    code: String,
    result: Result<BookFields, ApiError>,
}

async fn lookup<A: BookApi + ?Sized>(api: &A, session: u64, code: String) -> Lookup {
    let result = api.read_by_isbn(&code).await;
    Lookup {
        session,
        code,
        result,
    }
}

/// Run the scanner until the command channel closes.
///
/// Decoded codes are handled before lookup results, so a repeat of the code
/// being looked up is suppressed even while the lookup is in flight. Results
/// of lookups started in an earlier session are dropped.
pub async fn run_scanner<D, A>(
    mut controller: ScannerController<D>,
    api: &A,
    commands: mpsc::UnboundedReceiver<ScannerCommand>,
    detections: DetectionStream,
    mut emit: impl FnMut(Msg),
) where
    D: Decoder,
    A: BookApi + ?Sized,
{
    let mut commands = commands.fuse();
    let mut detections = detections.fuse();
    let mut lookups = FuturesUnordered::new();

    loop {
        select_biased! {
            code = detections.select_next_some() => {
                if let Detection::Lookup(code) = controller.on_decoded(&code) {
                    lookups.push(lookup(api, controller.session(), code));
                }
            }
            Lookup { session, code, result } = lookups.select_next_some() => {
                if !controller.is_current(session) {
                    debug!("Dropping lookup for {} from scan session {}", code, session);
                } else {
                    match result {
                        Ok(fields) => {
                            controller.lookup_succeeded();
                            emit(Msg::BookScanned(fields));
                        }
                        Err(error) => {
                            controller.lookup_failed(&code);
                            emit(Msg::ScanMissed { code, error });
                        }
                    }
                }
            }
            command = commands.next() => match command {
                Some(ScannerCommand::Open) => {
                    if let Err(e) = controller.open().await {
                        emit(Msg::ScannerFailed(e));
                    }
                }
                Some(ScannerCommand::Close) => controller.stop(),
                None => break,
            },
        }
    }

    controller.stop();
    debug!("Scanner task finished");
}
