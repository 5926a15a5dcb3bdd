//! Dungeon background images compiled into the binary and served under `/img`.

use crate::season::DEFAULT_IMAGE_KEY;

pub const IMAGE_ROUTE_PREFIX: &str = "/img";
pub const IMAGE_CONTENT_TYPE: &str = "image/svg+xml";

const DUNGEON_IMAGES: [(&str, &str); 5] = [
    ("grimraildepot", include_str!("../assets/img/grimraildepot.svg")),
    ("irondocks", include_str!("../assets/img/irondocks.svg")),
    ("karazhan", include_str!("../assets/img/karazhan.svg")),
    ("mechagon", include_str!("../assets/img/mechagon.svg")),
    ("tazavesh", include_str!("../assets/img/tazavesh.svg")),
];

pub fn dungeon_image(image_key: &str) -> Option<&'static str> {
    DUNGEON_IMAGES
        .iter()
        .find(|(key, _)| *key == image_key)
        .map(|(_, svg)| *svg)
}

/// URL path of a card background. Keys without a bundled image fall back to
/// the default key.
pub fn dungeon_image_path(image_key: &str) -> String {
    let key = if dungeon_image(image_key).is_some() {
        image_key
    } else {
        DEFAULT_IMAGE_KEY
    };
    format!("{IMAGE_ROUTE_PREFIX}/{key}.svg")
}
