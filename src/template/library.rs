//! Template registry and the JSON-backed template library.
//!
//! Template files are JSON documents with a character palette and a list of
//! horizontal layers, bottom first. Each layer is a list of rows (one per z),
//! each row a string with one palette character per x:
//!
//! ```json
//! {
//!   "name": "well",
//!   "variants": ["surface"],
//!   "anchor": [1, 1, 1],
//!   "palette": { "#": "cobblestone", ".": "air",
//!                "C": { "material": "chest", "state": "facing=north" } },
//!   "layers": [["###", "#C#", "###"], ["#.#", "...", "#.#"]]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::model::{EntityMarker, Template, ThirdPartyMarker};
use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::generation::variant::StructureVariant;
use crate::math::pick_weighted;
use crate::voxel::{BlockState, Environment, Location, Material};

/// File extension of template files
pub const TEMPLATE_FILE_EXTENSION: &str = "json";

/// Source of templates for the placement engine
pub trait TemplateRegistry {
    /// Choose a template for a placement attempt, or `None` if nothing fits
    fn lookup(
        &self,
        variant: StructureVariant,
        location: &Location,
        environment: Environment,
        rng: &mut dyn RngCore,
    ) -> Option<Arc<Template>>;

    /// Whether any template is registered for the variant
    fn has_templates(&self, variant: StructureVariant) -> bool;
}

/// Palette value: a bare material name or a full block state
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PaletteEntry {
    Name(Material),
    Full(BlockState),
}

impl From<PaletteEntry> for BlockState {
    fn from(entry: PaletteEntry) -> Self {
        match entry {
            PaletteEntry::Name(material) => BlockState::new(material),
            PaletteEntry::Full(state) => state,
        }
    }
}

/// On-disk template description
#[derive(Clone, Debug, Serialize, Deserialize)]
struct TemplateFile {
    name: String,
    #[serde(default = "default_weight")]
    weight: f64,
    variants: Vec<StructureVariant>,
    #[serde(default)]
    environments: Vec<Environment>,
    #[serde(default)]
    pedestal: Option<Material>,
    #[serde(default)]
    anchor: [i32; 3],
    palette: HashMap<String, PaletteEntry>,
    layers: Vec<Vec<String>>,
    #[serde(default)]
    entities: Vec<EntityMarker>,
    #[serde(default)]
    third_party_entities: Vec<ThirdPartyMarker>,
}

fn default_weight() -> f64 {
    1.0
}

impl TemplateFile {
    fn into_template(self) -> Result<Template> {
        let mut palette = HashMap::with_capacity(self.palette.len());
        for (key, entry) in self.palette {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    palette.insert(c, BlockState::from(entry));
                }
                _ => {
                    return Err(Error::Template(format!(
                        "{}: palette key '{}' must be a single character",
                        self.name, key
                    )));
                }
            }
        }

        let height = self.layers.len() as i32;
        let depth = self.layers.first().map_or(0, |l| l.len()) as i32;
        let width = self
            .layers
            .first()
            .and_then(|l| l.first())
            .map_or(0, |row| row.chars().count()) as i32;

        let mut blocks = Vec::with_capacity((width * height * depth) as usize);
        for (y, layer) in self.layers.iter().enumerate() {
            if layer.len() as i32 != depth {
                return Err(Error::Template(format!("{}: layer {} has {} rows, expected {}", self.name, y, layer.len(), depth)));
            }
            for (z, row) in layer.iter().enumerate() {
                if row.chars().count() as i32 != width {
                    return Err(Error::Template(format!("{}: row {} of layer {} is not {} wide", self.name, z, y, width)));
                }
                for c in row.chars() {
                    let block = palette.get(&c).cloned().ok_or_else(|| {
                        Error::Template(format!("{}: character '{}' is not in the palette", self.name, c))
                    })?;
                    blocks.push(block);
                }
            }
        }

        let template = Template::new(self.name, IVec3::new(width, height, depth), blocks, IVec3::from_array(self.anchor))?
            .with_weight(self.weight)
            .with_variants(self.variants)
            .with_environments(self.environments)
            .with_entities(self.entities)
            .with_third_party(self.third_party_entities);
        Ok(match self.pedestal {
            Some(material) => template.with_pedestal(material),
            None => template,
        })
    }
}

/// In-memory template collection indexed by variant
#[derive(Default)]
pub struct TemplateLibrary {
    by_variant: HashMap<StructureVariant, Vec<Arc<Template>>>,
}

impl TemplateLibrary {
    /// Create a new empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under every variant it declares
    pub fn insert(&mut self, template: Template) {
        if template.variants().is_empty() {
            log::warn!("Template '{}' declares no variants, ignoring", template.name());
            return;
        }
        let template = Arc::new(template);
        for &variant in template.variants() {
            self.by_variant.entry(variant).or_default().push(Arc::clone(&template));
        }
    }

    /// Parse a single template file
    pub fn load_file(path: &Path) -> Result<Template> {
        let json = std::fs::read_to_string(path)?;
        let file: TemplateFile = serde_json::from_str(&json)?;
        file.into_template()
    }

    /// Load every `.json` template in a directory.
    ///
    /// Files that fail to parse are logged and skipped. Only failure to read
    /// the directory itself is an error.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut library = Self::new();
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == TEMPLATE_FILE_EXTENSION))
            .collect();
        paths.sort();

        for path in paths {
            match Self::load_file(&path) {
                Ok(template) => library.insert(template),
                Err(e) => log::warn!("Skipping template {}: {}", path.display(), e),
            }
        }

        log::info!("Loaded {} templates from {}", library.len(), dir.display());
        Ok(library)
    }

    /// Templates registered for a variant
    pub fn templates(&self, variant: StructureVariant) -> &[Arc<Template>] {
        self.by_variant.get(&variant).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct templates
    pub fn len(&self) -> usize {
        let mut names: Vec<&str> = self.by_variant.values().flatten().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_variant.is_empty()
    }
}

impl TemplateRegistry for TemplateLibrary {
    fn lookup(
        &self,
        variant: StructureVariant,
        location: &Location,
        environment: Environment,
        rng: &mut dyn RngCore,
    ) -> Option<Arc<Template>> {
        let candidates: Vec<(Arc<Template>, f64)> = self
            .templates(variant)
            .iter()
            .filter(|t| t.allows_environment(environment))
            .map(|t| (Arc::clone(t), t.weight()))
            .collect();

        let picked = pick_weighted(&candidates, rng);
        if picked.is_none() {
            log::debug!("No {} template valid for {:?} at {}", variant, environment, location);
        }
        picked
    }

    fn has_templates(&self, variant: StructureVariant) -> bool {
        !self.templates(variant).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::WorldId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const WELL: &str = r####"{
        "name": "well",
        "variants": ["surface", "underground_shallow"],
        "environments": ["overworld"],
        "pedestal": "cobblestone",
        "anchor": [1, 1, 1],
        "palette": { "#": "cobblestone", ".": "air",
                     "C": { "material": "chest", "state": "facing=north" } },
        "layers": [["###", "#C#", "###"], ["#.#", "...", "#.#"]],
        "entities": [{ "pos": [1, 1, 1], "kind": "zombie" }],
        "third_party_entities": [{ "pos": [0, 1, 0], "id": "guardian" }]
    }"####;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_parse_template_file() {
        let file: TemplateFile = serde_json::from_str(WELL).unwrap();
        let t = file.into_template().unwrap();

        assert_eq!(t.size(), IVec3::new(3, 2, 3));
        assert_eq!(t.anchor(), IVec3::ONE);
        assert_eq!(t.pedestal(), Some(Material::Cobblestone));
        assert_eq!(t.material(IVec3::new(1, 0, 1)), Material::Chest);
        assert_eq!(t.get(IVec3::new(1, 0, 1)).unwrap().state.as_deref(), Some("facing=north"));
        assert_eq!(t.material(IVec3::new(1, 1, 1)), Material::Air);
        assert_eq!(t.chest_markers(), &[IVec3::new(1, 0, 1)]);
        assert_eq!(t.entity_markers().len(), 1);
        assert_eq!(t.third_party_markers()[0].id, "guardian");
    }

    #[test]
    fn test_ragged_layers_rejected() {
        let json = r###"{ "name": "bad", "variants": ["sky"], "palette": { "#": "stone" },
                        "layers": [["##", "#"]] }"###;
        let file: TemplateFile = serde_json::from_str(json).unwrap();
        assert!(matches!(file.into_template(), Err(Error::Template(_))));
    }

    #[test]
    fn test_load_dir_skips_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "well.json", WELL);
        write(dir.path(), "broken.json", "{ not json");
        write(dir.path(), "unknown_char.json",
            r#"{ "name": "x", "variants": ["sky"], "palette": {}, "layers": [["?"]] }"#);
        write(dir.path(), "notes.txt", "ignored");

        let library = TemplateLibrary::load_dir(dir.path()).unwrap();
        assert_eq!(library.len(), 1);
        assert!(library.has_templates(StructureVariant::Surface));
        assert!(library.has_templates(StructureVariant::UndergroundShallow));
        assert!(!library.has_templates(StructureVariant::Sky));
    }

    #[test]
    fn test_load_dir_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(TemplateLibrary::load_dir(&missing), Err(Error::Io(_))));
    }

    #[test]
    fn test_lookup_respects_environment_and_weight() {
        let mut library = TemplateLibrary::new();
        let cube = |name: &str| {
            Template::solid(name, IVec3::ONE, IVec3::ZERO, Material::Stone)
                .unwrap()
                .with_variants(vec![StructureVariant::Surface])
        };
        library.insert(cube("nether_only").with_environments(vec![Environment::Nether]));
        library.insert(cube("never").with_weight(0.0));
        library.insert(cube("everywhere"));

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let loc = Location::new(WorldId(0), 8.0, 64, 8.0);
        for _ in 0..50 {
            let t = library
                .lookup(StructureVariant::Surface, &loc, Environment::Overworld, &mut rng)
                .unwrap();
            assert_eq!(t.name(), "everywhere");
        }
        assert!(library
            .lookup(StructureVariant::Sky, &loc, Environment::Overworld, &mut rng)
            .is_none());
    }
}
