//! Blockstate definition parsing.
//!
//! Blockstates define how block properties map to model placements.
//! There are two formats: "variants" and "multipart". Both keep the order
//! the entries appear in the file, since exported data follows it.

use crate::error::{CompileError, Result};
use crate::types::{BlockProperties, PlacementTransform};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Value written for a variant key piece that is not a `key=value` pair.
pub const MISSING_VALUE: &str = "<n/a>";

/// A blockstate definition from blockstates/*.json.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockstateDefinition {
    /// Variant key (e.g. "facing=north,lit=true") to its placements.
    Variants(Vec<(String, Vec<Placement>)>),
    /// Conditional model application.
    Multipart(Vec<MultipartCase>),
}

impl<'de> Deserialize<'de> for BlockstateDefinition {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawBlockstate {
            variants: Option<Map<String, Value>>,
            multipart: Option<Vec<RawCase>>,
        }

        #[derive(Deserialize)]
        struct RawCase {
            #[serde(default)]
            when: Option<Map<String, Value>>,
            apply: OneOrMany,
        }

        let raw = RawBlockstate::deserialize(deserializer)?;

        if let Some(multipart) = raw.multipart {
            let cases = multipart
                .into_iter()
                .map(|case| MultipartCase {
                    when: case.when.map(MultipartCondition::from_json),
                    apply: case.apply.into_vec(),
                })
                .collect();
            return Ok(BlockstateDefinition::Multipart(cases));
        }

        let mut variants = Vec::new();
        for (key, value) in raw.variants.unwrap_or_default() {
            let placements = OneOrMany::deserialize(value)
                .map_err(|e| D::Error::custom(format!("variant '{}': {}", key, e)))?;
            variants.push((key, placements.into_vec()));
        }
        Ok(BlockstateDefinition::Variants(variants))
    }
}

impl BlockstateDefinition {
    /// Every placement in document order.
    pub fn placements(&self) -> Vec<&Placement> {
        match self {
            BlockstateDefinition::Variants(variants) => {
                variants.iter().flat_map(|(_, p)| p.iter()).collect()
            }
            BlockstateDefinition::Multipart(cases) => {
                cases.iter().flat_map(|c| c.apply.iter()).collect()
            }
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, BlockstateDefinition::Multipart(_))
    }
}

/// A variant value or multipart `apply` can be a single model or an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Single(Placement),
    Multiple(Vec<Placement>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<Placement> {
        match self {
            OneOrMany::Single(p) => vec![p],
            OneOrMany::Multiple(p) => p,
        }
    }
}

/// One concrete, oriented use of a block model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Model name (e.g., "block/stone" or "minecraft:block/stone").
    pub model: String,
    /// X rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub x: i32,
    /// Y rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub y: i32,
    /// If true, UV coordinates don't rotate with the block.
    #[serde(default)]
    pub uvlock: bool,
    /// Weight for random selection (default 1).
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl Placement {
    pub fn transform(&self) -> PlacementTransform {
        PlacementTransform::new(self.x, self.y, self.uvlock)
    }

    /// Reject a zero weight or a rotation off the 90 degree grid.
    pub fn validate(&self) -> Result<()> {
        if self.weight == 0 {
            return Err(CompileError::InvalidPlacement(format!(
                "{} has weight 0",
                self.model
            )));
        }
        self.transform().validate()
    }
}

/// A multipart case with optional condition.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartCase {
    /// Condition for when this case applies; `None` always applies.
    pub when: Option<MultipartCondition>,
    /// Placements to apply when the condition is met.
    pub apply: Vec<Placement>,
}

impl MultipartCase {
    pub fn matches(&self, properties: &BlockProperties) -> bool {
        self.when
            .as_ref()
            .map(|when| when.matches(properties))
            .unwrap_or(true)
    }
}

/// Property/value pairs in the order they were written.
pub type StateList = Vec<(String, String)>;

/// Multipart condition for when a case applies.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartCondition {
    /// All properties must match.
    Simple(StateList),
    /// Any of the sub-conditions must match.
    Or(Vec<StateList>),
    /// All of the sub-conditions must match.
    And(Vec<StateList>),
}

impl MultipartCondition {
    fn from_json(when: Map<String, Value>) -> Self {
        let nested = |value: &Value| -> Vec<StateList> {
            value
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_object)
                        .map(|obj| state_list(obj.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        if let Some(or) = when.get("OR") {
            MultipartCondition::Or(nested(or))
        } else if let Some(and) = when.get("AND") {
            MultipartCondition::And(nested(and))
        } else {
            MultipartCondition::Simple(state_list(when))
        }
    }

    /// Check if the condition matches the given block properties.
    pub fn matches(&self, properties: &BlockProperties) -> bool {
        match self {
            MultipartCondition::Simple(states) => Self::matches_simple(states, properties),
            MultipartCondition::Or(any) => {
                any.iter().any(|states| Self::matches_simple(states, properties))
            }
            MultipartCondition::And(all) => {
                all.iter().all(|states| Self::matches_simple(states, properties))
            }
        }
    }

    /// Check if a simple condition (property list) matches.
    /// Values may list alternatives separated by `|` (e.g. "north|south").
    fn matches_simple(states: &StateList, properties: &BlockProperties) -> bool {
        states.iter().all(|(key, expected)| {
            properties
                .get(key)
                .map(|actual| expected.split('|').any(|allowed| allowed == actual))
                .unwrap_or(false)
        })
    }

    /// Whether the sub-conditions are combined with OR.
    pub fn is_or(&self) -> bool {
        matches!(self, MultipartCondition::Or(_))
    }

    /// The property lists making up this condition.
    pub fn state_lists(&self) -> Vec<&StateList> {
        match self {
            MultipartCondition::Simple(states) => vec![states],
            MultipartCondition::Or(lists) | MultipartCondition::And(lists) => {
                lists.iter().collect()
            }
        }
    }
}

/// Non-string values (`true`, `1`) are kept as their JSON text.
fn state_list(map: Map<String, Value>) -> StateList {
    map.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}

/// Split a variant key into the pairs written to exported data.
///
/// Pieces are separated by `,` and split once more on `=`; a piece that is
/// not exactly one `key=value` pair keeps its first part as the key with
/// [`MISSING_VALUE`]. Trailing empty pieces are dropped, so `""` yields a
/// single `("", "<n/a>")` pair.
pub fn variant_key_pairs(key: &str) -> StateList {
    split_dropping_trailing(key, ',')
        .into_iter()
        .map(|piece| {
            let parts = split_dropping_trailing(piece, '=');
            let name = parts.first().copied().unwrap_or_default().to_string();
            let value = if parts.len() == 2 {
                parts[1].to_string()
            } else {
                MISSING_VALUE.to_string()
            };
            (name, value)
        })
        .collect()
}

fn split_dropping_trailing(s: &str, separator: char) -> Vec<&str> {
    if s.is_empty() {
        return vec![s];
    }
    let mut parts: Vec<&str> = s.split(separator).collect();
    while parts.last().map(|p| p.is_empty()).unwrap_or(false) {
        parts.pop();
    }
    parts
}

/// Whether a variant key selects the given properties.
///
/// The empty key matches every state; otherwise each `key=value` piece must
/// be present in `properties`.
pub fn variant_matches(key: &str, properties: &BlockProperties) -> bool {
    key.split(',')
        .filter(|piece| !piece.is_empty())
        .all(|piece| match crate::types::parse_property(piece) {
            Some((name, value)) => properties.get(&name) == Some(&value),
            None => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> BlockProperties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_simple_variants() {
        let json = r#"{
            "variants": {
                "": { "model": "block/stone" }
            }
        }"#;

        let def: BlockstateDefinition = serde_json::from_str(json).unwrap();
        match def {
            BlockstateDefinition::Variants(variants) => {
                assert_eq!(variants.len(), 1);
                assert_eq!(variants[0].0, "");
                assert_eq!(variants[0].1[0].model, "block/stone");
                assert_eq!(variants[0].1[0].weight, 1);
            }
            _ => panic!("Expected Variants"),
        }
    }

    #[test]
    fn test_variants_keep_document_order() {
        let json = r#"{
            "variants": {
                "facing=west": { "model": "block/furnace", "y": 270 },
                "facing=east": { "model": "block/furnace", "y": 90 },
                "facing=north": [
                    { "model": "block/furnace" },
                    { "model": "block/furnace_alt", "weight": 3, "uvlock": true }
                ]
            }
        }"#;

        let def: BlockstateDefinition = serde_json::from_str(json).unwrap();
        let BlockstateDefinition::Variants(variants) = &def else {
            panic!("Expected Variants");
        };
        let keys: Vec<_> = variants.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["facing=west", "facing=east", "facing=north"]);
        assert_eq!(variants[0].1[0].transform(), PlacementTransform::new(0, 270, false));
        assert_eq!(variants[2].1.len(), 2);
        assert_eq!(variants[2].1[1].weight, 3);
        assert!(variants[2].1[1].uvlock);
        assert_eq!(def.placements().len(), 4);
    }

    #[test]
    fn test_parse_multipart() {
        let json = r#"{
            "multipart": [
                { "apply": { "model": "block/fence_post" } },
                {
                    "when": { "north": "true" },
                    "apply": { "model": "block/fence_side", "uvlock": true }
                },
                {
                    "when": { "OR": [ { "east": true }, { "west": "true", "up": "false" } ] },
                    "apply": [ { "model": "block/fence_side", "y": 90 } ]
                },
                {
                    "when": { "AND": [ { "east": "true" }, { "south": "low|tall" } ] },
                    "apply": { "model": "block/fence_cap" }
                }
            ]
        }"#;

        let def: BlockstateDefinition = serde_json::from_str(json).unwrap();
        assert!(def.is_multipart());
        let BlockstateDefinition::Multipart(cases) = def else {
            panic!("Expected Multipart");
        };
        assert_eq!(cases.len(), 4);
        assert!(cases[0].when.is_none());
        assert!(cases[0].matches(&props(&[])));

        let simple = cases[1].when.as_ref().unwrap();
        assert!(!simple.is_or());
        assert!(simple.matches(&props(&[("north", "true")])));
        assert!(!simple.matches(&props(&[("north", "false")])));

        let or = cases[2].when.as_ref().unwrap();
        assert!(or.is_or());
        assert_eq!(
            or.state_lists()[0],
            &vec![("east".to_string(), "true".to_string())]
        );
        let second: Vec<_> = or.state_lists()[1].iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(second, ["west", "up"]);
        assert!(or.matches(&props(&[("east", "true")])));
        assert!(or.matches(&props(&[("west", "true"), ("up", "false")])));
        assert!(!or.matches(&props(&[("west", "true"), ("up", "true")])));

        let and = cases[3].when.as_ref().unwrap();
        assert!(!and.is_or());
        assert!(and.matches(&props(&[("east", "true"), ("south", "tall")])));
        assert!(!and.matches(&props(&[("east", "true"), ("south", "none")])));
    }

    #[test]
    fn test_non_string_condition_values() {
        let json = r#"{
            "multipart": [
                { "when": { "level": 3, "lit": false }, "apply": { "model": "block/x" } }
            ]
        }"#;
        let def: BlockstateDefinition = serde_json::from_str(json).unwrap();
        let BlockstateDefinition::Multipart(cases) = def else {
            panic!("Expected Multipart");
        };
        assert!(cases[0].matches(&props(&[("level", "3"), ("lit", "false")])));
    }

    #[test]
    fn test_invalid_variant_is_error() {
        let json = r#"{ "variants": { "": { "x": 90 } } }"#;
        assert!(serde_json::from_str::<BlockstateDefinition>(json).is_err());
    }

    #[test]
    fn test_variant_key_pairs() {
        let pairs = |key: &str| -> Vec<(String, String)> { variant_key_pairs(key) };
        let owned = |items: &[(&str, &str)]| -> Vec<(String, String)> {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        assert_eq!(pairs(""), owned(&[("", "<n/a>")]));
        assert_eq!(pairs("normal"), owned(&[("normal", "<n/a>")]));
        assert_eq!(
            pairs("facing=north,lit=true"),
            owned(&[("facing", "north"), ("lit", "true")])
        );
        assert_eq!(pairs("a=b=c"), owned(&[("a", "<n/a>")]));
        assert_eq!(pairs("a="), owned(&[("a", "<n/a>")]));
        assert_eq!(pairs("a=1,"), owned(&[("a", "1")]));
    }

    #[test]
    fn test_variant_matches() {
        let state = props(&[("facing", "north"), ("lit", "true")]);
        assert!(variant_matches("", &state));
        assert!(variant_matches("facing=north", &state));
        assert!(variant_matches("facing=north,lit=true", &state));
        assert!(!variant_matches("facing=south", &state));
        assert!(!variant_matches("normal", &state));
    }

    #[test]
    fn test_placement_validation() {
        let placement = |json: &str| -> Placement { serde_json::from_str(json).unwrap() };

        assert!(placement(r#"{ "model": "block/stone", "y": 270 }"#).validate().is_ok());
        assert!(matches!(
            placement(r#"{ "model": "block/stone", "weight": 0 }"#).validate(),
            Err(CompileError::InvalidPlacement(_))
        ));
        assert!(placement(r#"{ "model": "block/stone", "x": 45 }"#).validate().is_err());
    }
}
