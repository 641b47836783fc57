//! Debug overlays drawn on a copy of the source texture

use image::{Rgb, RgbImage};

use super::rects::PixelRect;
use crate::geometry::{Face, TextureVertex};

pub const UV_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const RECT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

fn put(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line, clipped to the image
pub fn draw_line(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(image, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn uv_to_pixel(uv: TextureVertex, width: u32, height: u32) -> (i64, i64) {
    (
        (uv.u * width as f64) as i64,
        ((1.0 - uv.v) * height as f64) as i64,
    )
}

/// Outline every face's UV polygon
pub fn draw_uv_faces<'a>(
    image: &mut RgbImage,
    uvs: &[TextureVertex],
    faces: impl IntoIterator<Item = &'a Face>,
) {
    let (width, height) = image.dimensions();

    for face in faces {
        let corners: Vec<(i64, i64)> = face
            .uvs()
            .iter()
            .map(|&i| uv_to_pixel(uvs[i as usize - 1], width, height))
            .collect();

        for (i, &from) in corners.iter().enumerate() {
            let to = corners[(i + 1) % corners.len()];
            draw_line(image, from, to, UV_COLOR);
        }
    }
}

/// Outline pixel rectangles
pub fn draw_rects(image: &mut RgbImage, rects: &[PixelRect]) {
    for rect in rects {
        let (l, t) = (rect.left() as i64, rect.top() as i64);
        let (r, b) = (rect.right() as i64 - 1, rect.bottom() as i64 - 1);

        draw_line(image, (l, t), (r, t), RECT_COLOR);
        draw_line(image, (r, t), (r, b), RECT_COLOR);
        draw_line(image, (r, b), (l, b), RECT_COLOR);
        draw_line(image, (l, b), (l, t), RECT_COLOR);
    }
}
