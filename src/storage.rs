use crate::model::PersistedPoint;
use crate::payload::{PayloadError, SavePayload};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("bad payload: {0}")]
    Payload(#[from] PayloadError),
    #[error("HTTP error: {0}")]
    Http(String),
}

// ── Sidecar file ────────────────────────────────────────────────────────────

/// Annotations stored next to an image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sidecar {
    #[serde(default)]
    pub annotations: Vec<PersistedPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub machine_annotations: Vec<PersistedPoint>,
}

pub fn sidecar_path(image_path: &Path) -> PathBuf {
    match image_path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => image_path.with_extension(format!("{ext}.stomata.json")),
        _ => image_path.with_extension("stomata.json"),
    }
}

impl Sidecar {
    /// A missing sidecar is an unannotated image.
    pub fn load(image_path: &Path) -> Result<Self, SubmitError> {
        let path = sidecar_path(image_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, image_path: &Path) -> Result<(), SubmitError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(sidecar_path(image_path), data)?;
        Ok(())
    }

    /// Human annotations, or machine ones in differential mode when no human
    /// annotations exist yet.
    pub fn hydration_points(&self, differential: bool) -> &[PersistedPoint] {
        if differential && self.annotations.is_empty() {
            &self.machine_annotations
        } else {
            &self.annotations
        }
    }

    pub fn is_human_annotated(&self) -> bool {
        self.margin.is_some() || !self.annotations.is_empty()
    }
}

// ── Submission targets ──────────────────────────────────────────────────────

/// Receiver of the save form.
pub trait SubmitTarget {
    fn submit(&mut self, payload: &SavePayload) -> Result<(), SubmitError>;
}

/// Stores submissions in the image's sidecar, keeping machine annotations.
pub struct SidecarTarget {
    image_path: PathBuf,
}

impl SidecarTarget {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
        }
    }
}

impl SubmitTarget for SidecarTarget {
    fn submit(&mut self, payload: &SavePayload) -> Result<(), SubmitError> {
        let mut sidecar = Sidecar::load(&self.image_path)?;
        sidecar.annotations = payload.points()?;
        sidecar.margin = Some(payload.margin_value()?);
        sidecar.save(&self.image_path)?;
        log::info!(
            "saved {} annotations to {}",
            sidecar.annotations.len(),
            sidecar_path(&self.image_path).display()
        );
        Ok(())
    }
}

/// Posts the save form to `<base>/save_annotations/<sample>`.
///
/// Accepted submissions are mirrored into the local sidecar, which is what
/// the editor hydrates from and what "save and continue" skips over.
pub struct HttpFormTarget {
    agent: ureq::Agent,
    url: String,
    mirror: SidecarTarget,
}

impl HttpFormTarget {
    pub fn new(
        base_url: &str,
        sample_id: &str,
        differential: bool,
        image_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            agent: ureq::agent(),
            url: save_url(base_url, sample_id, differential),
            mirror: SidecarTarget::new(image_path),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn save_url(base_url: &str, sample_id: &str, differential: bool) -> String {
    let mut url = format!(
        "{}/save_annotations/{}",
        base_url.trim_end_matches('/'),
        sample_id
    );
    if differential {
        url.push_str("?differential=1");
    }
    url
}

impl SubmitTarget for HttpFormTarget {
    fn submit(&mut self, payload: &SavePayload) -> Result<(), SubmitError> {
        // ureq reports non-2xx statuses as errors, so the mirror only sees
        // accepted saves.
        let resp = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/x-www-form-urlencoded")
            .send_string(&payload.to_form_urlencoded())
            .map_err(|e| SubmitError::Http(e.to_string()))?;
        log::info!("posted annotations to {} ({})", self.url, resp.status());
        self.mirror.submit(payload)
    }
}
