//! Web viewer export.
//!
//! Each blockstate becomes one compact JSON file:
//!
//! ```text
//! {"data":[{"when":{"conditionalOr":false,"states":[{"facing":"north"}]},
//!           "apply":{"data":[[x,y,z,u,v,nx,ny,nz,r,g,b,...]],"tintindex":false}}]}
//! ```
//!
//! with one `data` entry per compiled placement, and the atlas is written
//! next to them as a PNG.

use crate::assets::{blockstate::variant_key_pairs, StateList};
use crate::error::{CompileError, Result};
use crate::mesher::{CompileOutput, CompiledBlockState, RenderableModel, StateCondition};
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::path::{Component, Path, PathBuf};

#[derive(Serialize)]
struct BlockStateFile<'a> {
    data: Vec<WebEntry<'a>>,
}

#[derive(Serialize)]
struct WebEntry<'a> {
    when: WebCondition,
    apply: WebModel<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebCondition {
    conditional_or: bool,
    states: Vec<StateMap>,
}

#[derive(Serialize)]
struct WebModel<'a> {
    /// The viewer reads the buffer wrapped in a one-element array.
    data: [VertexData<'a>; 1],
    tintindex: bool,
}

/// Buffer floats, widened to double precision and written by
/// [`format_number`].
struct VertexData<'a>(&'a [f32]);

impl Serialize for VertexData<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut text = String::with_capacity(self.0.len() * 8 + 2);
        text.push('[');
        for (i, &value) in self.0.iter().enumerate() {
            if i > 0 {
                text.push(',');
            }
            text.push_str(&format_number(value as f64));
        }
        text.push(']');

        RawValue::from_string(text)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

/// Format a number the way the viewer data writes it: shortest round-trip
/// digits, plain decimal for magnitudes in `[1e-3, 1e7)` and `d.dddE<n>`
/// otherwise, always with a fractional digit (`1.0`, `9.765625E-4`, `1.0E7`).
///
/// Non-finite values have no JSON form and are written as `null`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_string();
    }
    if value == 0.0 {
        let zero = if value.is_sign_negative() { "-0.0" } else { "0.0" };
        return zero.to_string();
    }

    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::with_capacity(digits.len() + 8);
    if value < 0.0 {
        out.push('-');
    }

    if (-3..7).contains(&exponent) {
        if exponent < 0 {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take((-exponent - 1) as usize));
            out.push_str(&digits);
        } else {
            let int_len = exponent as usize + 1;
            if digits.len() > int_len {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            } else {
                out.push_str(&digits);
                out.extend(std::iter::repeat('0').take(int_len - digits.len()));
                out.push_str(".0");
            }
        }
    } else {
        out.push_str(&digits[..1]);
        out.push('.');
        out.push_str(if digits.len() > 1 { &digits[1..] } else { "0" });
        out.push('E');
        out.push_str(&exponent.to_string());
    }
    out
}

/// Property pairs written as a JSON object in their original order.
struct StateMap(StateList);

impl Serialize for StateMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn web_condition(condition: &StateCondition) -> WebCondition {
    match condition {
        StateCondition::Variant(key) => WebCondition {
            conditional_or: false,
            states: vec![StateMap(variant_key_pairs(key))],
        },
        StateCondition::Multipart(Some(when)) => WebCondition {
            conditional_or: when.is_or(),
            states: when
                .state_lists()
                .into_iter()
                .map(|states| StateMap(states.clone()))
                .collect(),
        },
        StateCondition::Multipart(None) => WebCondition {
            conditional_or: false,
            states: Vec::new(),
        },
    }
}

fn web_model(model: &RenderableModel) -> WebModel<'_> {
    WebModel {
        data: [VertexData(model.buffer.data())],
        tintindex: model.buffer.has_tint(),
    }
}

/// Serialize one compiled blockstate to its web JSON.
pub fn block_state_json(state: &CompiledBlockState) -> Result<String> {
    let data = state
        .entries
        .iter()
        .flat_map(|entry| {
            entry.models.iter().map(move |model| WebEntry {
                when: web_condition(&entry.condition),
                apply: web_model(model),
            })
        })
        .collect();

    Ok(serde_json::to_string(&BlockStateFile { data })?)
}

/// Write `blockstates/<name>.json` for every blockstate and
/// `textures/atlas.png` under `dir`.
pub fn write_web_export<P: AsRef<Path>>(output: &CompileOutput, dir: P) -> Result<()> {
    let dir = dir.as_ref();
    let blockstates_dir = dir.join("blockstates");
    let textures_dir = dir.join("textures");
    std::fs::create_dir_all(&blockstates_dir)?;
    std::fs::create_dir_all(&textures_dir)?;

    for state in &output.block_states {
        let path = block_state_path(&blockstates_dir, &state.name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, block_state_json(state)?)?;
        log::debug!("Wrote {}", path.display());
    }

    std::fs::write(textures_dir.join("atlas.png"), output.atlas.to_png()?)?;

    log::info!(
        "Exported {} blockstates and a {}x{} atlas to {}",
        output.block_states.len(),
        output.atlas.side(),
        output.atlas.side(),
        dir.display()
    );
    Ok(())
}

/// Output path of a blockstate; names may contain folders but never leave
/// the blockstates directory.
fn block_state_path(base: &Path, name: &str) -> Result<PathBuf> {
    let relative = Path::new(name);
    let stays_inside = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if name.is_empty() || !stays_inside {
        return Err(CompileError::Export(format!(
            "blockstate name '{}' is not a relative file name",
            name
        )));
    }
    Ok(base.join(format!("{}.json", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{BlockstateDefinition, MultipartCondition};
    use crate::atlas::pack;
    use crate::mesher::{CompiledEntry, Vertex, VertexBuffer};
    use crate::resolver::ModelId;
    use crate::types::PlacementTransform;

    fn renderable(buffer: VertexBuffer) -> RenderableModel {
        RenderableModel {
            model: "block/test".to_string(),
            model_id: ModelId(0),
            transform: PlacementTransform::default(),
            weight: 1,
            buffer,
        }
    }

    fn state(name: &str, entries: Vec<(StateCondition, usize)>) -> CompiledBlockState {
        CompiledBlockState {
            name: name.to_string(),
            entries: entries
                .into_iter()
                .map(|(condition, count)| CompiledEntry {
                    condition,
                    models: (0..count).map(|_| renderable(VertexBuffer::new())).collect(),
                })
                .collect(),
        }
    }

    fn multipart_when(json: &str) -> MultipartCondition {
        let definition: BlockstateDefinition = serde_json::from_str(&format!(
            r#"{{ "multipart": [{{ "when": {}, "apply": {{ "model": "block/test" }} }}] }}"#,
            json
        ))
        .unwrap();
        match definition {
            BlockstateDefinition::Multipart(mut cases) => cases.remove(0).when.unwrap(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_variant_json_layout() {
        let state = state(
            "furnace",
            vec![
                (StateCondition::Variant("facing=north,lit".to_string()), 1),
                (StateCondition::Variant(String::new()), 2),
            ],
        );

        assert_eq!(
            block_state_json(&state).unwrap(),
            concat!(
                r#"{"data":["#,
                r#"{"when":{"conditionalOr":false,"states":[{"facing":"north","lit":"<n/a>"}]},"apply":{"data":[[]],"tintindex":false}},"#,
                r#"{"when":{"conditionalOr":false,"states":[{"":"<n/a>"}]},"apply":{"data":[[]],"tintindex":false}},"#,
                r#"{"when":{"conditionalOr":false,"states":[{"":"<n/a>"}]},"apply":{"data":[[]],"tintindex":false}}"#,
                r#"]}"#
            )
        );
    }

    #[test]
    fn test_multipart_json_layout() {
        let state = state(
            "fence",
            vec![
                (StateCondition::Multipart(None), 1),
                (
                    StateCondition::Multipart(Some(multipart_when(
                        r#"{ "OR": [{ "north": "true" }, { "east": true }] }"#,
                    ))),
                    1,
                ),
                (
                    StateCondition::Multipart(Some(multipart_when(
                        r#"{ "west": "true", "up": "false" }"#,
                    ))),
                    1,
                ),
            ],
        );

        assert_eq!(
            block_state_json(&state).unwrap(),
            concat!(
                r#"{"data":["#,
                r#"{"when":{"conditionalOr":false,"states":[]},"apply":{"data":[[]],"tintindex":false}},"#,
                r#"{"when":{"conditionalOr":true,"states":[{"north":"true"},{"east":"true"}]},"apply":{"data":[[]],"tintindex":false}},"#,
                r#"{"when":{"conditionalOr":false,"states":[{"west":"true","up":"false"}]},"apply":{"data":[[]],"tintindex":false}}"#,
                r#"]}"#
            )
        );
    }

    #[test]
    fn test_float_data_and_tint() {
        let normal = [0.0, 1.0, 0.0];
        let mut buffer = VertexBuffer::new();
        buffer.push_face(
            [
                Vertex::new([-0.5, 1.0, -0.5], [0.0, 0.0], normal),
                Vertex::new([-0.5, 1.0, 0.5], [0.0, 0.25], normal),
                Vertex::new([0.5, 1.0, 0.5], [0.25, 0.25], normal),
                Vertex::new([0.5, 1.0, -0.5], [0.25, 0.0], normal),
            ],
            0,
        );

        let state = CompiledBlockState {
            name: "grass".to_string(),
            entries: vec![CompiledEntry {
                condition: StateCondition::Variant(String::new()),
                models: vec![renderable(buffer)],
            }],
        };
        let json = block_state_json(&state).unwrap();

        assert!(json.contains(r#""data":[[-0.5,1.0,-0.5,0.0,0.0,0.0,1.0,0.0,1.0,1.0,1.0,-0.5,1.0,0.5,0.0,0.25,"#));
        assert!(json.ends_with(r#"]],"tintindex":true}}]}"#));

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["data"][0]["apply"]["data"][0].as_array().unwrap().len(), 66);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(-0.0), "-0.0");
        assert_eq!(format_number(1.0), "1.0");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(100.0), "100.0");
        assert_eq!(format_number(0.001), "0.001");
        assert_eq!(format_number(0.0625), "0.0625");
        assert_eq!(format_number(1234567.0), "1234567.0");
        assert_eq!(format_number(1.0e7), "1.0E7");
        assert_eq!(format_number(1.5e10), "1.5E10");
        assert_eq!(format_number(9.765625e-4), "9.765625E-4");
        assert_eq!(format_number(1.0e-8), "1.0E-8");
        assert_eq!(format_number(-2.5e-5), "-2.5E-5");
        assert_eq!(format_number(f64::NAN), "null");

        // f32 buffer values keep their widened digits
        assert_eq!(format_number(1.0e-8_f32 as f64), "9.99999993922529E-9");
        assert_eq!(format_number(1.0e-4_f32 as f64), "9.999999747378752E-5");
        assert_eq!(format_number(2.9802322e-8_f32 as f64), "2.9802322387695312E-8");
    }

    #[test]
    fn test_small_floats_in_vertex_data() {
        let data = [1.0 / 1024.0, 1.0e-8, 0.25];
        let json = serde_json::to_string(&VertexData(&data)).unwrap();
        assert_eq!(json, "[9.765625E-4,9.99999993922529E-9,0.25]");

        let parsed: Vec<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0], 1.0 / 1024.0);
    }

    #[test]
    fn test_write_web_export() {
        let red = crate::assets::TextureData::solid(16, 16, [255, 0, 0, 255]);
        let output = CompileOutput {
            atlas: pack([("red", &red)], 1024).atlas,
            block_states: vec![
                state("stone", vec![(StateCondition::Variant(String::new()), 1)]),
                state("nested/slab", vec![(StateCondition::Multipart(None), 1)]),
            ],
            diagnostics: Vec::new(),
            misses: Vec::new(),
        };

        let dir = tempfile::tempdir().unwrap();
        output.write_web_export(dir.path()).unwrap();

        let stone = std::fs::read_to_string(dir.path().join("blockstates/stone.json")).unwrap();
        assert_eq!(stone, block_state_json(&output.block_states[0]).unwrap());
        assert!(dir.path().join("blockstates/nested/slab.json").is_file());

        let png = std::fs::read(dir.path().join("textures/atlas.png")).unwrap();
        let atlas = crate::assets::texture::load_texture_from_bytes(&png).unwrap();
        assert_eq!((atlas.width, atlas.height), (16, 16));
    }

    #[test]
    fn test_rejects_escaping_names() {
        let base = Path::new("out");
        assert!(block_state_path(base, "../evil").is_err());
        assert!(block_state_path(base, "").is_err());
        assert_eq!(
            block_state_path(base, "stone").unwrap(),
            base.join("stone.json")
        );
    }
}
