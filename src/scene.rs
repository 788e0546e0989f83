//! Scene definition handed to the rendering service.
//!
//! Describes the map, the layers and their renderers, the legend, the
//! timeline slider and the initial camera flight. The rendering service
//! builds its scene from this once; afterwards only the definition
//! expressions of the two building layers change, which is why
//! [`SceneDefinition`] is itself a [`FilterSink`].
//!
//! Defaults reproduce the building-age map of the BAG 3D service with the
//! `bouwjaar` attribute and the BRT TOP10NL water bodies.

use serde::{Deserialize, Serialize};

use crate::config::AppSettings;
use crate::core::filter::FilterExpr;
use crate::core::sinks::{FilterSink, LayerRole};
use crate::core::year::YearRange;

pub const WATER_SERVICE_URL: &str =
    "https://basisregistraties.arcgisonline.nl/arcgis/rest/services/BRT/BRT_TOP10NL/FeatureServer/120";

/// Accent color shared by the color ramp start and the water bodies
const ACCENT: &str = "#2887a1";

/// Slider marks between the range ends
const SLIDER_PIPS: &[i32] = &[1900, 1920, 1940, 1960, 1980, 2000];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    pub basemap: String,
    pub ground: String,
    pub quality_profile: String,
    pub lighting: Lighting,
    pub layers: Vec<LayerSpec>,
    pub legend: Vec<LegendEntry>,
    pub slider: SliderSpec,
    pub camera: CameraSpec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    pub ambient_occlusion: bool,
    pub direct_shadows: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Scene,
    Feature,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    pub kind: LayerKind,
    /// Building layer driven by the timeline, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<LayerRole>,
    pub url: String,
    pub opacity: f32,
    pub visible: bool,
    pub popup_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_mode: Option<String>,
    pub renderer: RendererSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_expression: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    Solid,
    Sketch,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub style: EdgeStyle,
    /// RGBA, alpha in 0..=1
    pub color: [f32; 4],
    pub size: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub value: i32,
    pub color: String,
    pub label: String,
}

/// Continuous color over an attribute
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    pub field: String,
    pub title: String,
    pub stops: Vec<ColorStop>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RendererSpec {
    Mesh {
        color: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color_mix_mode: Option<String>,
        edges: Edges,
        #[serde(skip_serializing_if = "Option::is_none")]
        color_ramp: Option<ColorRamp>,
    },
    Water {
        color: String,
        wave_direction: f32,
        wave_strength: String,
        waterbody_size: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub layer: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliderSpec {
    pub start: i32,
    pub min: i32,
    pub max: i32,
    pub pips: Vec<i32>,
    pub pip_density: u32,
    pub decimals: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub wkid: u32,
    pub latest_wkid: u32,
    pub heading: f64,
    pub tilt: f64,
    /// Flight duration multiplier (higher is slower)
    pub speed_factor: f64,
    pub easing: String,
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            x: 519883.0,
            y: 6760000.0,
            z: 2000.0,
            wkid: 102100,
            latest_wkid: 3857,
            heading: 0.0,
            tilt: 60.0,
            speed_factor: 5.0,
            easing: "linear".to_string(),
        }
    }
}

impl SceneDefinition {
    /// Build the scene for the configured service, year field and range.
    pub fn from_settings(settings: &AppSettings) -> Self {
        let (min, max) = (settings.range_min, settings.range_max);
        let start = YearRange::new(min, max)
            .and_then(|range| settings.start_year_in(range))
            .unwrap_or(min);
        let field = settings.year_field.clone();

        let built = LayerSpec {
            id: "buildings".to_string(),
            kind: LayerKind::Scene,
            role: Some(LayerRole::Built),
            url: settings.service_url.clone(),
            opacity: 1.0,
            visible: true,
            popup_enabled: false,
            elevation_mode: None,
            renderer: RendererSpec::Mesh {
                color: "white".to_string(),
                color_mix_mode: Some("replace".to_string()),
                edges: Edges {
                    style: EdgeStyle::Solid,
                    color: [0.0, 0.0, 0.0, 0.6],
                    size: 1.0,
                },
                color_ramp: Some(ColorRamp {
                    field,
                    title: "Bouwjaar".to_string(),
                    stops: vec![
                        ColorStop {
                            value: min,
                            color: ACCENT.to_string(),
                            label: min.to_string(),
                        },
                        ColorStop {
                            value: max,
                            color: "#f8fcfd".to_string(),
                            label: max.to_string(),
                        },
                    ],
                }),
            },
            definition_expression: None,
        };

        let current = LayerSpec {
            id: "buildings-current".to_string(),
            role: Some(LayerRole::UnderConstruction),
            renderer: RendererSpec::Mesh {
                color: "#ffffff".to_string(),
                color_mix_mode: None,
                edges: Edges {
                    style: EdgeStyle::Sketch,
                    color: [0.0, 0.0, 0.0, 0.8],
                    size: 2.5,
                },
                color_ramp: None,
            },
            ..built.clone()
        };

        let water = LayerSpec {
            id: "water".to_string(),
            kind: LayerKind::Feature,
            role: None,
            url: WATER_SERVICE_URL.to_string(),
            opacity: 1.0,
            visible: true,
            popup_enabled: false,
            elevation_mode: Some("on-the-ground".to_string()),
            renderer: RendererSpec::Water {
                color: ACCENT.to_string(),
                wave_direction: 260.0,
                wave_strength: "moderate".to_string(),
                waterbody_size: "medium".to_string(),
            },
            definition_expression: None,
        };

        let mut pips = vec![min];
        pips.extend(SLIDER_PIPS.iter().copied().filter(|&y| y > min && y < max));
        if max > min {
            pips.push(max);
        }

        Self {
            basemap: "topo".to_string(),
            ground: "world-elevation".to_string(),
            quality_profile: "high".to_string(),
            lighting: Lighting {
                ambient_occlusion: true,
                direct_shadows: true,
            },
            legend: vec![
                LegendEntry {
                    layer: built.id.clone(),
                    title: "Bestaande gebouwen".to_string(),
                },
                LegendEntry {
                    layer: current.id.clone(),
                    title: "Gebouw in aanbouw".to_string(),
                },
            ],
            layers: vec![built, current, water],
            slider: SliderSpec {
                start,
                min,
                max,
                pips,
                pip_density: 50,
                decimals: 0,
            },
            camera: CameraSpec::default(),
        }
    }

    pub fn layer(&self, role: LayerRole) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.role == Some(role))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl FilterSink for SceneDefinition {
    fn apply_filter(&mut self, layer: LayerRole, filter: &FilterExpr) {
        for spec in self.layers.iter_mut().filter(|l| l.role == Some(layer)) {
            spec.definition_expression = Some(filter.expression());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::YearField;

    fn scene() -> SceneDefinition {
        SceneDefinition::from_settings(&AppSettings::default())
    }

    #[test]
    fn test_default_layers() {
        let scene = scene();
        let ids: Vec<&str> = scene.layers.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["buildings", "buildings-current", "water"]);
        assert_eq!(scene.layer(LayerRole::Built).map(|l| l.id.as_str()), Some("buildings"));
        assert_eq!(
            scene.layer(LayerRole::UnderConstruction).map(|l| l.id.as_str()),
            Some("buildings-current")
        );
        assert_eq!(scene.legend.len(), 2);
        assert!(scene.layers.iter().all(|l| l.definition_expression.is_none()));
    }

    #[test]
    fn test_color_ramp_follows_range() {
        let settings = AppSettings {
            range_min: 1850,
            range_max: 1950,
            ..Default::default()
        };
        let scene = SceneDefinition::from_settings(&settings);
        let Some(RendererSpec::Mesh { color_ramp: Some(ramp), .. }) =
            scene.layer(LayerRole::Built).map(|l| &l.renderer)
        else {
            panic!("built layer has no color ramp");
        };
        assert_eq!(ramp.field, "bouwjaar");
        assert_eq!(ramp.stops[0].value, 1850);
        assert_eq!(ramp.stops[1].value, 1950);
        assert_eq!(scene.slider.pips, vec![1850, 1900, 1920, 1940, 1950]);
    }

    #[test]
    fn test_default_slider_pips() {
        assert_eq!(
            scene().slider.pips,
            vec![1800, 1900, 1920, 1940, 1960, 1980, 2000, 2020]
        );
    }

    #[test]
    fn test_slider_start_follows_range() {
        assert_eq!(scene().slider.start, 1900);
        let settings = AppSettings {
            range_min: 2018,
            range_max: 2020,
            ..Default::default()
        };
        assert_eq!(SceneDefinition::from_settings(&settings).slider.start, 2018);
    }

    #[test]
    fn test_apply_filter_targets_role() {
        let mut scene = scene();
        let field = YearField::default();
        scene.apply_filter(LayerRole::UnderConstruction, &FilterExpr::built_in(&field, 1930));

        assert_eq!(
            scene.layer(LayerRole::UnderConstruction).and_then(|l| l.definition_expression.as_deref()),
            Some("bouwjaar IS NOT NULL AND bouwjaar > 0 AND bouwjaar = 1930")
        );
        assert!(scene.layer(LayerRole::Built).and_then(|l| l.definition_expression.as_ref()).is_none());
        assert!(scene.layers[2].definition_expression.is_none());
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&scene().to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["layers"][0]["renderer"]["type"], "mesh");
        assert_eq!(json["layers"][0]["role"], "built");
        assert_eq!(json["layers"][1]["renderer"]["edges"]["style"], "sketch");
        assert_eq!(json["layers"][2]["renderer"]["type"], "water");
        assert!(json["layers"][2].get("role").is_none());
        assert_eq!(json["camera"]["tilt"], 60.0);
    }
}
