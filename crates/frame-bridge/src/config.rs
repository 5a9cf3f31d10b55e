#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Origin of the vendor frame; both the postMessage recipient and the
    /// only accepted message source.
    pub origin: String,
    /// Path of the embed document under `origin`.
    pub frame_path: String,
    /// Vendor project the embed is keyed to.
    pub project_id: String,
    pub api_key: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            origin: "https://frames.adweave.example".to_string(),
            frame_path: "/embed/frame.html".to_string(),
            project_id: "demo-project".to_string(),
            api_key: "demo-key".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn frame_url(&self) -> String {
        format!(
            "{}{}?project={}&key={}",
            self.origin, self.frame_path, self.project_id, self.api_key
        )
    }
}
