//! Map style reference rewriting.

use serde_json::Value;

use super::MountPath;

/// Make every asset reference in a style document absolute.
///
/// Covers `glyphs`, `sprite` (string or `[{id, url}]`), and for every source
/// its `url`, each `tiles[]` entry and a string `data`. Returns how many
/// references were rewritten.
pub fn rewrite_style(style: &mut Value, mount: &MountPath) -> usize {
    let mut count = 0;
    let mut fix = |value: &mut Value| {
        if let Value::String(s) = value {
            *s = mount.to_absolute(s);
            count += 1;
        }
    };

    if let Some(glyphs) = style.get_mut("glyphs") {
        fix(glyphs);
    }

    match style.get_mut("sprite") {
        Some(Value::Array(sprites)) => {
            for sprite in sprites {
                if let Some(url) = sprite.get_mut("url") {
                    fix(url);
                }
            }
        }
        Some(sprite) => fix(sprite),
        None => {}
    }

    if let Some(Value::Object(sources)) = style.get_mut("sources") {
        for source in sources.values_mut() {
            if let Some(url) = source.get_mut("url") {
                fix(url);
            }
            if let Some(Value::Array(tiles)) = source.get_mut("tiles") {
                tiles.iter_mut().for_each(&mut fix);
            }
            // inline GeoJSON objects stay as they are
            if let Some(data) = source.get_mut("data") {
                fix(data);
            }
        }
    }
    count
}
