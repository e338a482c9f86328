use image::{imageops, imageops::FilterType, ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Gap between tiles, in pixels.
const TILE_GAP: u32 = 4;

/// Lay `icons` out left to right on a transparent canvas, each scaled to a
/// `tile`-pixel square, and return the PNG bytes.
///
/// Icons that fail to decode leave their tile empty so the strip still lines
/// up with the embed text.
pub fn compose_icon_row<B: AsRef<[u8]>>(icons: &[B], tile: u32) -> anyhow::Result<Vec<u8>> {
    if icons.is_empty() {
        anyhow::bail!("no icons to compose");
    }
    if tile == 0 {
        anyhow::bail!("tile size must be positive");
    }

    let count = icons.len() as u32;
    let width = count * tile + (count - 1) * TILE_GAP;
    let mut canvas = RgbaImage::new(width, tile);

    for (i, bytes) in icons.iter().enumerate() {
        let decoded = match image::load_from_memory(bytes.as_ref()) {
            Ok(img) => img,
            Err(e) => {
                debug!("Skipping undecodable icon {}: {}", i, e);
                continue;
            }
        };

        let scaled = decoded.resize(tile, tile, FilterType::Lanczos3).to_rgba8();
        // Center non-square icons within their tile.
        let x = i as u32 * (tile + TILE_GAP) + (tile - scaled.width()) / 2;
        let y = (tile - scaled.height()) / 2;
        imageops::overlay(&mut canvas, &scaled, x.into(), y.into());
    }

    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
