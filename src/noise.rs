//! CPU reference of the warp shader's math.
//!
//! [`simplex3`] and [`warp_uv`] follow `pipelines/warp.wgsl` operation for operation, and
//! [`sample_mirrored`] reproduces what a mirrored-repeat, linearly filtered sampler returns.
//! Together they answer "what colour does the shader produce at this UV" without a GPU.

use crate::data_structures::params::ParameterSet;

fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: f32) -> f32 {
    mod289((x * 34.0 + 1.0) * x)
}

fn taylor_inv_sqrt(r: f32) -> f32 {
    1.79284291400159 - 0.85373472095314 * r
}

/// WGSL `step(edge, x)`.
fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

fn dot3(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 3D simplex noise, continuous in value and gradient, roughly in `[-1, 1]`.
pub fn simplex3(v: [f32; 3]) -> f32 {
    const C: [f32; 2] = [1.0 / 6.0, 1.0 / 3.0];

    let skew = (v[0] + v[1] + v[2]) * C[1];
    let i = v.map(|a| (a + skew).floor());
    let unskew = (i[0] + i[1] + i[2]) * C[0];
    let x0 = [v[0] - i[0] + unskew, v[1] - i[1] + unskew, v[2] - i[2] + unskew];

    let g = [step(x0[1], x0[0]), step(x0[2], x0[1]), step(x0[0], x0[2])];
    let l = g.map(|a| 1.0 - a);
    let i1 = [g[0].min(l[2]), g[1].min(l[0]), g[2].min(l[1])];
    let i2 = [g[0].max(l[2]), g[1].max(l[0]), g[2].max(l[1])];

    let offsets = [[0.0; 3], i1, i2, [1.0; 3]];
    let corners = [
        x0,
        [0, 1, 2].map(|k| x0[k] - i1[k] + C[0]),
        [0, 1, 2].map(|k| x0[k] - i2[k] + C[1]),
        x0.map(|a| a - 0.5),
    ];

    let i = i.map(mod289);
    let ns = [2.0 * 0.142857142857, 0.5 * 0.142857142857 - 1.0, 0.142857142857];

    let mut total = 0.0;
    for (offset, x) in offsets.iter().zip(corners.iter()) {
        let p = permute(permute(permute(i[2] + offset[2]) + i[1] + offset[1]) + i[0] + offset[0]);

        let j = p - 49.0 * (p * ns[2] * ns[2]).floor();
        let cell_x = (j * ns[2]).floor();
        let cell_y = (j - 7.0 * cell_x).floor();
        let gx = cell_x * ns[0] + ns[1];
        let gy = cell_y * ns[0] + ns[1];
        let h = 1.0 - gx.abs() - gy.abs();

        let sh = -step(h, 0.0);
        let gradient = [
            gx + (gx.floor() * 2.0 + 1.0) * sh,
            gy + (gy.floor() * 2.0 + 1.0) * sh,
            h,
        ];
        let norm = taylor_inv_sqrt(dot3(gradient, gradient));
        let gradient = gradient.map(|a| a * norm);

        let m = (0.6 - dot3(*x, *x)).max(0.0);
        let m = m * m;
        total += m * m * dot3(gradient, *x);
    }
    42.0 * total
}

/// The displacement field at `uv` for `time` seconds.
pub fn noise_at(uv: [f32; 2], time: f32, params: &ParameterSet) -> f32 {
    simplex3([
        uv[0] * params.frequency,
        uv[1] * params.frequency,
        time * params.speed,
    ])
}

/// Displaced texture coordinate, before wrapping. Both axes share one noise channel.
pub fn warp_uv(uv: [f32; 2], time: f32, params: &ParameterSet) -> [f32; 2] {
    let n = noise_at(uv, time, params);
    [uv[0] + n * params.distortion, uv[1] + n * params.distortion]
}

/// Fold a coordinate into `[0, 1]` the way `AddressMode::MirrorRepeat` does.
pub fn mirrored_repeat(x: f32) -> f32 {
    let t = x.rem_euclid(2.0);
    if t > 1.0 { 2.0 - t } else { t }
}

fn mirrored_texel(index: i64, size: u32) -> u32 {
    let size = size as i64;
    let t = index.rem_euclid(2 * size);
    (if t >= size { 2 * size - 1 - t } else { t }) as u32
}

/// Bilinear sample of `image` at `uv` with mirrored-repeat wrapping, channels in `[0, 1]`.
pub fn sample_mirrored(image: &image::RgbaImage, uv: [f32; 2]) -> [f32; 4] {
    let (width, height) = image.dimensions();
    let x = uv[0] * width as f32 - 0.5;
    let y = uv[1] * height as f32 - 0.5;
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);

    let texel = |dx: i64, dy: i64| {
        let px = mirrored_texel(x0 as i64 + dx, width);
        let py = mirrored_texel(y0 as i64 + dy, height);
        image.get_pixel(px, py).0.map(|c| c as f32 / 255.0)
    };
    let (a, b, c, d) = (texel(0, 0), texel(1, 0), texel(0, 1), texel(1, 1));

    let mut out = [0.0; 4];
    for k in 0..4 {
        let top = a[k] + (b[k] - a[k]) * fx;
        let bottom = c[k] + (d[k] - c[k]) * fx;
        out[k] = top + (bottom - top) * fy;
    }
    out
}

/// The colour the warp shader writes for the fragment at `uv`.
pub fn sample_warped(
    image: &image::RgbaImage,
    uv: [f32; 2],
    time: f32,
    params: &ParameterSet,
) -> [f32; 4] {
    sample_mirrored(image, warp_uv(uv, time, params))
}
