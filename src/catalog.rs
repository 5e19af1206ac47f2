use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::{
    error::{NanoError, Result},
    models::PromptUnit,
};

const BUILTIN_PROMPTS: [(&str, &str); 12] = [
    (
        "new_angle_01",
        "change the camera angle of the given image. Editorial architectural photograph. Daylight scene with diffuse neutral sky, soft contrast, realistic reflections on glass and metallic materials. Keep all proportions and materials identical to the reference image.",
    ),
    (
        "new_angle_02",
        "close-up editorial photograph with a 50mm lens, zoomed on façade and volumetric articulation. Warm evening light (4000 K), long shadows, natural contrast. Maintain strict consistency with materials, color, and geometry from the original image. Slight tilt-up camera framing for a dynamic architectural feel.",
    ),
    (
        "model_axo_white",
        "High-resolution totally white architectural model, axonometric view from above, on urban context white base, showing all volumetric details, window openings, terraces, circulation paths, and structural articulation. Maintain consistent details and proportions from the image reference. Uniform matte white material with soft shadows. Neutral daylight environment, seamless white background. Style of museum architectural model photography from SANAA or OMA exhibitions.",
    ),
    (
        "model_axo_wood",
        "Detailed architectural model totally made of light balsa wood, viewed from above in axonometric projection, on urban context wood base, Fine-grain wood textures showing contour lines, volumetric recesses, terraces, and façade articulation. Maintain consistent details and proportions from the image reference. Neutral studio lighting with soft white background. Shot in editorial model photography style, precise and tactile realism.",
    ),
    (
        "night_view",
        "Night-time editorial photograph of the same architectural scene, identical composition and camera angle as reference. Warm interior lighting (2800 K), cool exterior reflections, visible depth of field and subtle atmospheric haze. Consistent proportions, materials, and façade rhythm. Urban ambient light and reflections on glass surfaces; cinematic realism.",
    ),
    (
        "sketch_b&w",
        "Hand-drawn architectural sketch from the reference image, 2-point perspective. keeping proportions, geometry, and materials consistent. Drawn with a fine black ink pen on a white textured paper, with soft gray pencil shading. Expressive linework, architectural perspective, and clear massing. Captures the essence of the project in a spontaneous design moment.",
    ),
    (
        "technical_detail",
        "Highly detailed architectural technical drawing of a key construction detail — façade joint, structural connection, or sunshade system. Drawn with precise linework, hatching, and material indications. Black ink on white background, 1:5 scale representation. Realistic shadows and textures, like a competition presentation board detail.",
    ),
    (
        "interior_01",
        "Interior photography consistent with the building from the base image. Furniture layout coherent with the project’s geometry. Editorial realism, camera at 1.5 m height, 35 mm lens.",
    ),
    (
        "interior_02",
        "Alternative interior photography focusing on spatial depth and light quality. Material consistency (same palette and texture fidelity as base image). Subtle human presence, volumetric clarity, and precise architectural lighting. Editorial composition in the style of Architectural Digest or Wallpaper magazine.",
    ),
    (
        "detailed_section",
        "Architectural section drawing through the main volume, precise structure, slabs, and circulation paths. Realistic materials and textures (concrete, glazing, vegetation). Hybrid style combining linework and shaded volumes. Editorial layout with light gray background and graphic scale. Same geometry and proportions as base image.",
    ),
    (
        "watercolor",
        "Hand-drawn architectural sketch of the same project, fine ink lines with soft watercolor wash. Slight paper texture visible, light touches of color for shadows and glazing. Perspective view capturing essence of form and massing. Artistic representation in the style of Álvaro Siza or Toyo Ito sketchbooks.",
    ),
    (
        "facade_details",
        "Perspective section of the building’s façade, showing only a cropped portion with full constructive realism. Cut through structure, glazing, mullions, and cladding layers, exposing insulation, shading devices, and fixings in precise alignment. Keep all materials, colors, and proportions identical to the reference image. Depict accurate junctions between floor slabs, curtain wall, and façade panels. Soft daylight (5500 K), neutral white background, subtle ambient shadows. Presented in the style of MVRDV or BIG competition boards — a didactic yet photorealistic perspective detail revealing architectural logic and tectonic beauty.",
    ),
];

/// The read-only list of named prompts callers can pick from.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    prompts: Vec<PromptUnit>,
}

#[derive(Deserialize)]
struct CatalogEntry {
    name: String,
    prompt: String,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptCatalog {
    pub fn builtin() -> Self {
        Self {
            prompts: BUILTIN_PROMPTS
                .iter()
                .map(|(name, text)| PromptUnit::new(*name, *text))
                .collect(),
        }
    }

    pub fn new(prompts: Vec<PromptUnit>) -> Result<Self> {
        if prompts.is_empty() {
            return Err(NanoError::ConfigError("prompt catalog is empty".into()));
        }
        if let Some(dup) = first_duplicate(&prompts) {
            return Err(NanoError::ConfigError(format!(
                "prompt catalog has duplicate name '{}'",
                dup
            )));
        }
        Ok(Self { prompts })
    }

    /// Load a `[{name, prompt}]` JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            NanoError::ConfigError(format!("cannot read catalog {}: {}", path.display(), e))
        })?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw).map_err(|e| {
            NanoError::ConfigError(format!("invalid catalog {}: {}", path.display(), e))
        })?;
        Self::new(
            entries
                .into_iter()
                .map(|e| PromptUnit::new(e.name, e.prompt))
                .collect(),
        )
    }

    /// Built-in catalog unless a path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn prompts(&self) -> &[PromptUnit] {
        &self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Catalog entries whose names appear in `names`, in catalog order.
    /// An empty `names` selects everything; unknown names are ignored.
    pub fn select(&self, names: &[String]) -> Vec<PromptUnit> {
        if names.is_empty() {
            return self.prompts.clone();
        }
        self.prompts
            .iter()
            .filter(|p| names.iter().any(|n| n == &p.name))
            .cloned()
            .collect()
    }
}

pub(crate) fn first_duplicate(prompts: &[PromptUnit]) -> Option<&str> {
    prompts.iter().enumerate().find_map(|(i, p)| {
        prompts[..i]
            .iter()
            .any(|earlier| earlier.name == p.name)
            .then_some(p.name.as_str())
    })
}
