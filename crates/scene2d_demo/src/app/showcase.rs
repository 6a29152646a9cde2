use std::time::Duration;

use scene2d::{
    ActiveObject2D, ActiveObjectSettings, ActiveSource, Background2D, CanvasColor, DrawingSurface,
    Engine, Grid2D, GridSettings, Layer2D, LoadStatus, Map2D, PassiveObject2D,
    PassiveObjectSettings, Point2D, Rotation2D, Vector2D,
};
use serde_json::{json, Value};
use tracing::{info, warn};

const IMAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(5);
const SPRITE_SPACING_PX: f64 = 140.0;

const BADGE_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="96" height="96">
<circle cx="48" cy="48" r="44" fill="#e0a030"/>
<rect x="28" y="28" width="40" height="40" fill="#303848"/>
</svg>"##;

/// Builds the demo map: a flat color floor, a grid overlay and a sprite layer
/// holding every image from `sources` plus one vector badge.
pub(crate) fn populate<S: DrawingSurface>(engine: &mut Engine<S>, sources: &[String]) {
    let mut map = Map2D::new(engine.width() as f64, engine.height() as f64);

    let mut floor = Layer2D::new("floor", 0);
    floor.set_background(Background2D::new(CanvasColor::new("#1c2430")));
    map.add_layer(floor);

    let mut grid = Layer2D::new("grid", 1);
    grid.set_background(Background2D::new(Grid2D::new(GridSettings {
        line_color: CanvasColor::new("rgba(255, 255, 255, 0.15)"),
        size: Vector2D::new(32.0, 32.0),
        ..GridSettings::default()
    })));
    map.add_layer(grid);

    let mut sprites = Layer2D::new("sprites", 2);
    match ActiveSource::from_svg(BADGE_SVG) {
        Ok(source) => {
            sprites.add_object(ActiveObject2D::new(ActiveObjectSettings {
                source,
                id: "badge".to_string(),
                position: Point2D::new(40.0, 40.0),
                rotation: Rotation2D::new(0.0),
                ..ActiveObjectSettings::default()
            }));
        }
        Err(err) => warn!(error = %err, "badge_svg_invalid"),
    }

    let loaded = load_images(engine, sources);
    for (index, (id, image)) in loaded.into_iter().enumerate() {
        sprites.add_object(PassiveObject2D::new(PassiveObjectSettings {
            image: Some(image),
            id,
            position: Point2D::new(40.0 + SPRITE_SPACING_PX * (index + 1) as f64, 40.0),
            ..PassiveObjectSettings::default()
        }));
    }
    map.add_layer(sprites);

    info!(layers = map.layers().len(), "showcase_map_built");
    engine.set_map(map);
}

fn load_images<S: DrawingSurface>(
    engine: &mut Engine<S>,
    sources: &[String],
) -> Vec<(String, std::sync::Arc<scene2d::RgbaImage>)> {
    if sources.is_empty() {
        return Vec::new();
    }
    let list = data_list(sources);
    let cache = engine.data_cache_mut();
    cache.load_data_list(
        &list,
        |progress| {
            if progress.status == LoadStatus::Error {
                warn!(id = progress.id.as_str(), "showcase_image_failed");
            } else {
                info!(
                    id = progress.id.as_str(),
                    done = progress.index + 1,
                    total = progress.total_expected,
                    "showcase_image_loaded"
                );
            }
        },
        || info!("showcase_images_ready"),
    );
    if !cache.wait_for_loads(IMAGE_LOAD_TIMEOUT) {
        warn!(
            timeout_ms = IMAGE_LOAD_TIMEOUT.as_millis() as u64,
            "showcase_image_load_timed_out"
        );
    }

    (0..sources.len())
        .filter_map(|index| {
            let id = image_id(index);
            let lookup = cache.get_object(id.as_str());
            let usable = lookup.valid && lookup.data.width() > 0 && lookup.data.height() > 0;
            usable.then_some((id, lookup.data))
        })
        .collect()
}

fn data_list(sources: &[String]) -> Value {
    Value::Array(
        sources
            .iter()
            .enumerate()
            .map(|(index, src)| json!({ "id": image_id(index), "src": src }))
            .collect(),
    )
}

fn image_id(index: usize) -> String {
    format!("image_{index}")
}
