use pkagraph::core::features::{DEFAULT_EDGE_FEATURES, DEFAULT_NODE_FEATURES};
use pkagraph::pipeline::conjugate::ProtonToggle;

pub struct DefaultsConfig {
    pub node_features: Vec<String>,
    pub edge_features: Vec<String>,
    pub paired: bool,
    pub mode: String,
    pub ph: f64,
    pub ignore_danger: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            node_features: DEFAULT_NODE_FEATURES.iter().map(|s| s.to_string()).collect(),
            edge_features: DEFAULT_EDGE_FEATURES.iter().map(|s| s.to_string()).collect(),
            paired: true,
            mode: "protonated".to_string(),
            ph: ProtonToggle::PHYSIOLOGICAL_PH,
            ignore_danger: true,
        }
    }
}
