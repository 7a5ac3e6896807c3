//! Wire shapes for nets and markings, with JSON and RON readers/writers.
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::structure::Weight;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sparse marking keyed by place name; absent places hold zero tokens.
pub type MarkingDescription = IndexMap<String, Weight>;

/// Structural description of a net, as accepted by [`Net::from_description`].
///
/// ```json
/// { "places": ["p0", "p1"],
///   "transitions": [{ "name": "t1", "preconditions": {"p0": 1}, "postconditions": {"p1": 2} }],
///   "state": {"p0": 1} }
/// ```
///
/// `state` is an optional embedded initial marking.
///
/// [`Net::from_description`]: crate::net::Net::from_description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDescription {
    pub places: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<TransitionDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<MarkingDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescription {
    pub name: String,
    #[serde(default)]
    pub preconditions: IndexMap<String, Weight>,
    #[serde(default)]
    pub postconditions: IndexMap<String, Weight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inhibitors: Vec<String>,
}

impl TransitionDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn pre(mut self, place: impl Into<String>, weight: Weight) -> Self {
        self.preconditions.insert(place.into(), weight);
        self
    }

    pub fn post(mut self, place: impl Into<String>, weight: Weight) -> Self {
        self.postconditions.insert(place.into(), weight);
        self
    }

    pub fn inhibit(mut self, place: impl Into<String>) -> Self {
        self.inhibitors.push(place.into());
        self
    }
}

/// Serialisation format of a description file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Ron,
}

impl Format {
    /// Picks the format from a file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Format::Json),
            "ron" => Some(Format::Ron),
            _ => None,
        }
    }
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

pub fn from_str<T>(s: &str, format: Format) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    match format {
        Format::Json => from_json_str(s),
        Format::Ron => from_ron_str(s),
    }
}

pub fn to_string<T>(value: &T, format: Format) -> Result<String, IoError>
where
    T: Serialize,
{
    match format {
        Format::Json => to_json_string(value),
        Format::Ron => to_ron_string(value),
    }
}

/// Reads `path`, using its extension to pick the format and `fallback` otherwise.
pub fn read<P: AsRef<Path>, T: DeserializeOwned>(path: P, fallback: Format) -> Result<T, IoError> {
    let path = path.as_ref();
    let format = Format::from_path(path).unwrap_or(fallback);
    let content = fs::read_to_string(path)?;
    from_str(&content, format)
}

pub fn write<P: AsRef<Path>, T: Serialize>(
    path: P,
    value: &T,
    fallback: Format,
) -> Result<(), IoError> {
    let path = path.as_ref();
    let format = Format::from_path(path).unwrap_or(fallback);
    fs::write(path, to_string(value, format)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"{
        "places": ["p0", "p1"],
        "transitions": [
            { "name": "t1", "preconditions": { "p0": 1 }, "postconditions": { "p1": 2 } },
            { "name": "t0", "preconditions": { "p1": 1 }, "postconditions": { "p0": 1 },
              "inhibitors": ["p0"] }
        ],
        "state": { "p0": 1, "p1": 0 }
    }"#;

    #[test]
    fn parses_the_canonical_json_shape() {
        let desc: NetDescription = from_json_str(EXAMPLE).unwrap();
        assert_eq!(desc.places, vec!["p0", "p1"]);
        assert_eq!(desc.transitions.len(), 2);
        assert!(desc.transitions[0].inhibitors.is_empty());
        assert_eq!(desc.transitions[1].inhibitors, vec!["p0"]);
        assert_eq!(desc.state.unwrap().get("p0"), Some(&1));
    }

    #[test]
    fn negative_weight_is_rejected_while_parsing() {
        let raw = r#"{ "places": ["p"], "transitions": [
            { "name": "t", "preconditions": { "p": -1 } }
        ] }"#;
        assert!(matches!(
            from_json_str::<NetDescription>(raw),
            Err(IoError::Json(_))
        ));
    }

    #[test]
    fn ron_output_reads_back() {
        let desc = NetDescription {
            places: vec!["a".into()],
            transitions: vec![TransitionDescription::new("t").post("a", 1)],
            state: None,
        };
        let text = to_ron_string(&desc).unwrap();
        let back: NetDescription = from_ron_str(&text).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn written_file_reads_back_in_its_extension_format() {
        let desc: NetDescription = from_json_str(EXAMPLE).unwrap();
        let path = std::env::temp_dir().join(format!("pn-io-{}.ron", std::process::id()));

        write(&path, &desc, Format::Json).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let back: NetDescription = read(&path, Format::Json).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(from_json_str::<NetDescription>(&text).is_err());
        assert_eq!(back, desc);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_path(Path::new("net.ron")), Some(Format::Ron));
        assert_eq!(Format::from_path(Path::new("net.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("net")), None);
    }
}
