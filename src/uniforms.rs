//! Per-frame uniform values handed to the renderer alongside the compiled sources.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::graph::{Node, Uniform, UniformKind};
use crate::node_compiler::Registry;

/// Clock state of the frame being drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameState {
    /// Seconds since the preview started.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

/// Parse a colour as linear `[r, g, b]` in `0..=1`.
///
/// Accepts `#rgb`, `#rrggbb`, an integer `0xRRGGBB` and a `[r, g, b]` array.
pub fn parse_color(value: &Value) -> Option<[f32; 3]> {
    match value {
        Value::String(s) => parse_hex_color(s),
        Value::Number(n) => {
            let rgb = u32::try_from(n.as_u64()?).ok()?;
            if rgb > 0xFF_FFFF {
                return None;
            }
            Some(rgb_from_u32(rgb))
        }
        Value::Array(_) => floats::<3>(value),
        _ => None,
    }
}

fn parse_hex_color(s: &str) -> Option<[f32; 3]> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = match hex.len() {
        3 => {
            let short = u32::from_str_radix(hex, 16).ok()?;
            let (r, g, b) = ((short >> 8) & 0xF, (short >> 4) & 0xF, short & 0xF);
            (r * 17) << 16 | (g * 17) << 8 | b * 17
        }
        6 => u32::from_str_radix(hex, 16).ok()?,
        _ => return None,
    };
    Some(rgb_from_u32(rgb))
}

fn rgb_from_u32(rgb: u32) -> [f32; 3] {
    [
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
    ]
}

fn floats<const N: usize>(value: &Value) -> Option<[f32; N]> {
    let items = value.as_array()?;
    if items.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()? as f32;
    }
    Some(out)
}

/// Colour of `uniform`, or black when its value is not a colour.
pub(crate) fn color_or_black(uniform: &Uniform) -> [f32; 3] {
    parse_color(&uniform.value).unwrap_or_else(|| {
        log::warn!(
            "uniform {} has invalid colour {}, using black",
            uniform.name,
            uniform.value
        );
        [0.0; 3]
    })
}

/// The stored value of `uniform` coerced to its kind. Missing or mistyped
/// values fall back to the kind's zero.
pub fn static_value(uniform: &Uniform) -> UniformValue {
    match uniform.kind {
        UniformKind::Float | UniformKind::Time => {
            UniformValue::Float(uniform.value.as_f64().unwrap_or_default() as f32)
        }
        UniformKind::Vec2 => UniformValue::Vec2(floats(&uniform.value).unwrap_or_default()),
        UniformKind::Vec3 => UniformValue::Vec3(floats(&uniform.value).unwrap_or_default()),
        UniformKind::Color => UniformValue::Vec3(color_or_black(uniform)),
    }
}

/// Values of every uniform for one frame, keyed by uniform name.
///
/// A kind with a live value (time, colour) supplies it; every other uniform
/// uses its stored value.
pub fn resolve_uniform_values(
    registry: &Registry,
    node: &Node,
    uniforms: &[Uniform],
    frame: &FrameState,
) -> BTreeMap<String, UniformValue> {
    uniforms
        .iter()
        .map(|uniform| {
            let value = registry
                .get(uniform.kind.as_str())
                .and_then(|kind| kind.live_value(node, uniform, frame))
                .unwrap_or_else(|| static_value(uniform));
            (uniform.name.clone(), value)
        })
        .collect()
}
