//! [`Decoder`] backed by the Quagga2 barcode library
//!
//! Quagga2 is a plain browser script exposing a global `Quagga` object. It is
//! injected on first use and driven through `js_sys::Reflect`, the same way
//! the modal drives `<dialog>` methods.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use shelf_core::scanner::{Decoder, DetectionSink};
use shelf_core::{ScannerConfig, ScannerError};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[derive(Default)]
pub struct QuaggaDecoder {
    /// Registered with `Quagga.onDetected` while a session runs
    on_detected: Option<Closure<dyn FnMut(JsValue)>>,
}

impl QuaggaDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

fn describe(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

fn quagga() -> Option<JsValue> {
    Reflect::get(&js_sys::global(), &"Quagga".into())
        .ok()
        .filter(|q| !q.is_undefined() && !q.is_null())
}

fn call(target: &JsValue, method: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let function: Function = Reflect::get(target, &method.into())?.dyn_into()?;
    let args: Array = args.iter().copied().collect();
    function.apply(target, &args)
}

/// Build a JS object from key/value pairs
fn object(entries: &[(&str, JsValue)]) -> Result<Object, JsValue> {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &(*key).into(), value)?;
    }
    Ok(object)
}

fn video_constraints(config: &ScannerConfig) -> Result<Object, JsValue> {
    object(&[
        ("width", config.width.into()),
        ("height", config.height.into()),
        ("facingMode", config.facing_mode.as_str().into()),
    ])
}

fn quagga_config(config: &ScannerConfig, target: web_sys::Element) -> Result<Object, JsValue> {
    let readers: Array = config
        .symbologies
        .iter()
        .map(|s| JsValue::from_str(s.reader_name()))
        .collect();

    let input_stream = object(&[
        ("name", "Live".into()),
        ("type", "LiveStream".into()),
        ("target", target.into()),
        ("constraints", video_constraints(config)?.into()),
    ])?;
    let decoder = object(&[("readers", readers.into())])?;

    object(&[
        ("inputStream", input_stream.into()),
        ("decoder", decoder.into()),
        ("locate", true.into()),
        ("numOfWorkers", config.workers.into()),
        ("frequency", config.frequency.into()),
    ])
}

/// Await a script element's load or error event
async fn inject_script(url: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let script: web_sys::HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    script.set_src(url);
    script.set_async(true);

    let loaded = Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });

    document
        .head()
        .ok_or_else(|| JsValue::from_str("no document head"))?
        .append_child(&script)?;
    JsFuture::from(loaded).await?;
    Ok(())
}

/// Clear the boxes Quagga draws over the preview
fn clear_overlay(quagga: &JsValue) {
    let ctx = Reflect::get(quagga, &"canvas".into())
        .and_then(|c| Reflect::get(&c, &"ctx".into()))
        .and_then(|c| Reflect::get(&c, &"overlay".into()));
    let canvas = Reflect::get(quagga, &"canvas".into())
        .and_then(|c| Reflect::get(&c, &"dom".into()))
        .and_then(|d| Reflect::get(&d, &"overlay".into()));

    if let (Ok(ctx), Ok(canvas)) = (ctx, canvas) {
        if ctx.is_undefined() || canvas.is_undefined() {
            return;
        }
        let width = Reflect::get(&canvas, &"width".into()).unwrap_or(JsValue::from(0));
        let height = Reflect::get(&canvas, &"height".into()).unwrap_or(JsValue::from(0));
        if let Err(e) = call(&ctx, "clearRect", &[&0.into(), &0.into(), &width, &height]) {
            debug!("Could not clear scanner overlay: {}", describe(&e));
        }
    }
}

#[async_trait(?Send)]
impl Decoder for QuaggaDecoder {
    async fn load_library(&mut self, url: &str) -> Result<(), ScannerError> {
        if quagga().is_some() {
            return Ok(());
        }
        inject_script(url)
            .await
            .map_err(|e| ScannerError::LibraryLoad(describe(&e)))?;
        quagga()
            .map(|_| ())
            .ok_or_else(|| ScannerError::LibraryLoad(format!("{url} did not define Quagga")))
    }

    async fn request_camera(&mut self, config: &ScannerConfig) -> Result<(), ScannerError> {
        let devices = web_sys::window()
            .ok_or_else(|| ScannerError::Init("no window".to_string()))?
            .navigator()
            .media_devices()
            .map_err(|e| ScannerError::Init(describe(&e)))?;

        let constraints = video_constraints(config)
            .and_then(|video| object(&[("video", video.into())]))
            .map_err(|e| ScannerError::Init(describe(&e)))?
            .unchecked_into::<web_sys::MediaStreamConstraints>();
        let request = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| ScannerError::Init(describe(&e)))?;

        let stream = match JsFuture::from(request).await {
            Ok(stream) => stream,
            Err(e) => {
                let name = e
                    .dyn_ref::<web_sys::DomException>()
                    .map(|d| d.name())
                    .unwrap_or_default();
                return Err(match name.as_str() {
                    "NotAllowedError" | "SecurityError" => ScannerError::PermissionDenied,
                    _ => ScannerError::Init(describe(&e)),
                });
            }
        };

        // Only the permission was wanted; Quagga opens its own stream
        if let Ok(stream) = stream.dyn_into::<web_sys::MediaStream>() {
            for track in stream.get_tracks().iter() {
                track.unchecked_into::<web_sys::MediaStreamTrack>().stop();
            }
        }
        Ok(())
    }

    async fn configure(&mut self, config: &ScannerConfig) -> Result<(), ScannerError> {
        let quagga = quagga().ok_or(ScannerError::NotReady)?;
        let target = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&config.target_id))
            .ok_or_else(|| ScannerError::Init(format!("no #{} element", config.target_id)))?;
        let options = quagga_config(config, target).map_err(|e| ScannerError::Init(describe(&e)))?;

        let initialized = Promise::new(&mut |resolve, reject| {
            let on_error = reject.clone();
            let done = Closure::once_into_js(move |err: JsValue| {
                let _ = if err.is_undefined() || err.is_null() {
                    resolve.call0(&JsValue::NULL)
                } else {
                    on_error.call1(&JsValue::NULL, &err)
                };
            });
            if let Err(e) = call(&quagga, "init", &[&options, &done]) {
                let _ = reject.call1(&JsValue::NULL, &e);
            }
        });

        JsFuture::from(initialized)
            .await
            .map(|_| ())
            .map_err(|e| ScannerError::Init(describe(&e)))
    }

    fn start(&mut self, sink: DetectionSink) -> Result<(), ScannerError> {
        let quagga = quagga().ok_or(ScannerError::NotReady)?;

        let on_detected = Closure::<dyn FnMut(JsValue)>::new(move |result: JsValue| {
            let code = Reflect::get(&result, &"codeResult".into())
                .and_then(|r| Reflect::get(&r, &"code".into()))
                .ok()
                .and_then(|c| c.as_string());
            if let Some(code) = code {
                let _ = sink.unbounded_send(code);
            }
        });

        // Kept before Quagga can call it; stop() unregisters it on failure too
        let on_detected: &Closure<dyn FnMut(JsValue)> = self.on_detected.insert(on_detected);
        call(&quagga, "onDetected", &[on_detected.as_ref()])
            .and_then(|_| call(&quagga, "start", &[]))
            .map(|_| ())
            .map_err(|e| ScannerError::Init(describe(&e)))
    }

    fn stop(&mut self) {
        let Some(quagga) = quagga() else {
            return;
        };
        if let Err(e) = call(&quagga, "stop", &[]) {
            warn!("Quagga.stop failed: {}", describe(&e));
        }
        if let Some(on_detected) = self.on_detected.take() {
            let _ = call(&quagga, "offDetected", &[on_detected.as_ref()]);
        }
        clear_overlay(&quagga);
    }
}
