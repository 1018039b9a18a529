//! The icon served at `/favicon.ico`.

use axum::http::header;
use axum::response::IntoResponse;
use std::sync::OnceLock;

const SIZE: u32 = 16;
const ICON_DIR_LEN: u32 = 6 + 16;
const BITMAP_HEADER_LEN: u32 = 40;

static FAVICON: OnceLock<Vec<u8>> = OnceLock::new();

pub async fn handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/x-icon")], bytes())
}

/// The encoded icon, built on first use.
pub fn bytes() -> &'static [u8] {
    FAVICON.get_or_init(encode)
}

/// Encodes a 16x16 32bpp ICO: a filled disc on a transparent background.
fn encode() -> Vec<u8> {
    let pixels_len = SIZE * SIZE * 4;
    // One bit per pixel, rows padded to 32 bits.
    let mask_len = SIZE * 4;
    let image_len = BITMAP_HEADER_LEN + pixels_len + mask_len;

    let mut out = Vec::with_capacity((ICON_DIR_LEN + image_len) as usize);

    // ICONDIR
    push_u16(&mut out, 0);
    push_u16(&mut out, 1);
    push_u16(&mut out, 1);

    // ICONDIRENTRY
    out.push(SIZE as u8);
    out.push(SIZE as u8);
    out.push(0);
    out.push(0);
    push_u16(&mut out, 1);
    push_u16(&mut out, 32);
    push_u32(&mut out, image_len);
    push_u32(&mut out, ICON_DIR_LEN);

    // BITMAPINFOHEADER; height covers both the color and mask planes.
    push_u32(&mut out, BITMAP_HEADER_LEN);
    push_u32(&mut out, SIZE);
    push_u32(&mut out, SIZE * 2);
    push_u16(&mut out, 1);
    push_u16(&mut out, 32);
    push_u32(&mut out, 0);
    push_u32(&mut out, pixels_len + mask_len);
    push_u32(&mut out, 0);
    push_u32(&mut out, 0);
    push_u32(&mut out, 0);
    push_u32(&mut out, 0);

    // BGRA rows, bottom-up.
    let center = (SIZE as f32 - 1.0) / 2.0;
    let radius = SIZE as f32 / 2.0 - 0.5;
    for y in (0..SIZE).rev() {
        for x in 0..SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if (dx * dx + dy * dy).sqrt() <= radius {
                out.extend_from_slice(&[0xC0, 0x70, 0x20, 0xFF]);
            } else {
                out.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }

    out.resize(out.len() + mask_len as usize, 0);
    out
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
