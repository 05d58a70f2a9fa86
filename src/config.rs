use serde::{Deserialize, Serialize};

/// Which rule decides that a ring is aromatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AromaticityModel {
    /// All bonds carry the explicit aromatic order, or the ring's bond
    /// orders alternate single/double. Bonds of an already aromatic fused
    /// ring may stand for either.
    #[default]
    Alternating,
    /// π-electron count satisfies 4n+2.
    Huckel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AromaticityConfig {
    pub model: AromaticityModel,
    /// Rings smaller than this are never aromatic.
    pub min_ring_size: usize,
}

impl Default for AromaticityConfig {
    fn default() -> Self {
        Self {
            model: AromaticityModel::Alternating,
            min_ring_size: 5,
        }
    }
}

/// Per-document settings. Every field has a default, so a partial JSON
/// object is enough:
///
/// ```
/// use sketchcrab::{AromaticityModel, Preferences};
///
/// let prefs = Preferences::from_json(r#"{"aromaticity": {"model": "huckel"}}"#).unwrap();
/// assert_eq!(prefs.aromaticity.model, AromaticityModel::Huckel);
/// assert_eq!(prefs.aromaticity.min_ring_size, 5);
/// assert!(prefs.sweep_before_save);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub aromaticity: AromaticityConfig,
    /// Seed for generated ids; `None` draws from system entropy.
    pub id_seed: Option<u64>,
    /// Remove inconsistent fragments before writing a document.
    pub sweep_before_save: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            aromaticity: AromaticityConfig::default(),
            id_seed: None,
            sweep_before_save: true,
        }
    }
}

impl Preferences {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
