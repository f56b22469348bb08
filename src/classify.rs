//! Optional image classification capability
//!
//! The lab treats classification as a black box: `classify(image)` either
//! yields ranked labels or fails. Implementations are swappable so the lab
//! runs (and is tested) without a browser or a model.

use std::cell::Cell;

use thiserror::Error;

/// Image fed to the demo classification
pub const DEMO_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1518779578993-ec3579fee39f?w=512&q=60";

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Probability in `[0, 1]`
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
}

impl ImageSource {
    pub fn demo() -> Self {
        ImageSource::Url(DEMO_IMAGE_URL.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapabilityError {
    #[error("classification is not available here")]
    Unavailable,
    #[error("failed to load {0}")]
    LoadFailed(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed result: {0}")]
    Malformed(String),
}

/// Something that can label an image
#[allow(async_fn_in_trait)]
pub trait Classifier {
    async fn classify(&self, image: &ImageSource) -> Result<Vec<Prediction>, CapabilityError>;
}

/// Validate and sort predictions by descending confidence
pub fn rank_predictions(mut preds: Vec<Prediction>) -> Result<Vec<Prediction>, CapabilityError> {
    if let Some(bad) = preds
        .iter()
        .find(|p| !p.confidence.is_finite() || !(0.0..=1.0).contains(&p.confidence))
    {
        return Err(CapabilityError::Malformed(format!(
            "confidence {} for '{}'",
            bad.confidence, bad.label
        )));
    }
    preds.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(preds)
}

/// `AI Prediction:` followed by one `label (p%)` line per prediction
pub fn format_predictions(preds: &[Prediction]) -> String {
    let mut text = String::from("AI Prediction:");
    for p in preds {
        text.push_str(&format!("\n{} ({:.1}%)", p.label, p.confidence * 100.0));
    }
    text
}

/// Canned answers, loaded lazily like a real model
#[derive(Debug, Default)]
pub struct FixedClassifier {
    predictions: Vec<Prediction>,
    loads: Cell<u32>,
    loaded: Cell<bool>,
}

impl FixedClassifier {
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self {
            predictions,
            loads: Cell::new(0),
            loaded: Cell::new(false),
        }
    }

    /// What the demo image usually comes back as
    pub fn demo() -> Self {
        Self::new(vec![
            Prediction::new("desktop computer", 0.41),
            Prediction::new("monitor", 0.27),
            Prediction::new("screen, CRT screen", 0.12),
        ])
    }

    /// Number of times the "model" was initialised
    pub fn loads(&self) -> u32 {
        self.loads.get()
    }
}

impl Classifier for FixedClassifier {
    async fn classify(&self, _image: &ImageSource) -> Result<Vec<Prediction>, CapabilityError> {
        if !self.loaded.get() {
            self.loaded.set(true);
            self.loads.set(self.loads.get() + 1);
        }
        rank_predictions(self.predictions.clone())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableClassifier;

impl Classifier for UnavailableClassifier {
    async fn classify(&self, _image: &ImageSource) -> Result<Vec<Prediction>, CapabilityError> {
        Err(CapabilityError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use script::ScriptClassifier;

#[cfg(target_arch = "wasm32")]
mod script {
    //! TF.js + MobileNet through injected script tags

    use std::cell::{Cell, RefCell};

    use js_sys::{Array, Function, Promise, Reflect};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{HtmlImageElement, HtmlScriptElement};

    use super::{CapabilityError, Classifier, ImageSource, Prediction, rank_predictions};

    const TFJS_URL: &str = "https://cdn.jsdelivr.net/npm/@tensorflow/tfjs@4.10.0/dist/tf.min.js";
    const MOBILENET_URL: &str = "https://cdn.jsdelivr.net/npm/@tensorflow-models/mobilenet@2.1.1";

    #[derive(Debug, Default)]
    pub struct ScriptClassifier {
        scripts_loaded: Cell<bool>,
        model: RefCell<Option<JsValue>>,
    }

    impl ScriptClassifier {
        pub fn new() -> Self {
            Self::default()
        }

        async fn ensure_scripts(&self) -> Result<(), CapabilityError> {
            if self.scripts_loaded.get() {
                return Ok(());
            }
            load_script(TFJS_URL).await?;
            load_script(MOBILENET_URL).await?;
            self.scripts_loaded.set(true);
            log::info!("Classification scripts loaded");
            Ok(())
        }

        /// The MobileNet model, loaded on first use
        async fn model(&self) -> Result<JsValue, CapabilityError> {
            if let Some(model) = self.model.borrow().as_ref() {
                return Ok(model.clone());
            }
            self.ensure_scripts().await?;

            let global: JsValue = js_sys::global().into();
            let mobilenet = Reflect::get(&global, &JsValue::from_str("mobilenet"))
                .map_err(|_| CapabilityError::LoadFailed("mobilenet".into()))?;
            let load = method(&mobilenet, "load")?;
            let pending = load
                .call0(&mobilenet)
                .map_err(|e| CapabilityError::LoadFailed(js_message(&e)))?;
            let model = JsFuture::from(Promise::from(pending))
                .await
                .map_err(|e| CapabilityError::LoadFailed(js_message(&e)))?;

            log::info!("MobileNet model ready");
            *self.model.borrow_mut() = Some(model.clone());
            Ok(model)
        }
    }

    fn js_message(err: &JsValue) -> String {
        Reflect::get(err, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .or_else(|| err.as_string())
            .unwrap_or_else(|| format!("{:?}", err))
    }

    /// Promise resolved by an element's load event, rejected by its error event
    fn load_promise(target: &web_sys::HtmlElement) -> Promise {
        Promise::new(&mut |resolve, reject| {
            target.set_onload(Some(&resolve));
            target.set_onerror(Some(&reject));
        })
    }

    async fn load_script(src: &str) -> Result<(), CapabilityError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(CapabilityError::Unavailable)?;
        let body = document.body().ok_or(CapabilityError::Unavailable)?;
        let script: HtmlScriptElement = document
            .create_element("script")
            .map_err(|_| CapabilityError::LoadFailed(src.to_string()))?
            .dyn_into()
            .map_err(|_| CapabilityError::LoadFailed(src.to_string()))?;
        script.set_src(src);

        let loaded = load_promise(&script);
        body.append_child(&script)
            .map_err(|_| CapabilityError::LoadFailed(src.to_string()))?;
        JsFuture::from(loaded)
            .await
            .map_err(|_| CapabilityError::LoadFailed(src.to_string()))?;
        Ok(())
    }

    async fn load_image(url: &str) -> Result<HtmlImageElement, CapabilityError> {
        let img = HtmlImageElement::new().map_err(|e| CapabilityError::Network(js_message(&e)))?;
        img.set_cross_origin(Some("anonymous"));
        let loaded = load_promise(&img);
        img.set_src(url);
        JsFuture::from(loaded)
            .await
            .map_err(|_| CapabilityError::Network(format!("image {} failed to load", url)))?;
        Ok(img)
    }

    fn method(target: &JsValue, name: &str) -> Result<Function, CapabilityError> {
        Reflect::get(target, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| CapabilityError::LoadFailed(format!("{} is missing", name)))
    }

    fn parse_predictions(value: JsValue) -> Result<Vec<Prediction>, CapabilityError> {
        let array: Array = value
            .dyn_into()
            .map_err(|_| CapabilityError::Malformed("expected an array".into()))?;
        array
            .iter()
            .map(|item| {
                let label = Reflect::get(&item, &JsValue::from_str("className"))
                    .ok()
                    .and_then(|v| v.as_string())
                    .ok_or_else(|| CapabilityError::Malformed("missing className".into()))?;
                let confidence = Reflect::get(&item, &JsValue::from_str("probability"))
                    .ok()
                    .and_then(|v| v.as_f64())
                    .ok_or_else(|| CapabilityError::Malformed("missing probability".into()))?;
                Ok(Prediction::new(label, confidence as f32))
            })
            .collect()
    }

    impl Classifier for ScriptClassifier {
        async fn classify(&self, image: &ImageSource) -> Result<Vec<Prediction>, CapabilityError> {
            let model = self.model().await?;

            let ImageSource::Url(url) = image;
            let img = load_image(url).await?;

            let classify = method(&model, "classify")?;
            let pending = classify
                .call1(&model, &img)
                .map_err(|e| CapabilityError::Malformed(js_message(&e)))?;
            let result = JsFuture::from(Promise::from(pending))
                .await
                .map_err(|e| CapabilityError::Malformed(js_message(&e)))?;

            rank_predictions(parse_predictions(result)?)
        }
    }
}
