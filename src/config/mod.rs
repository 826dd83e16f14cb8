use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parsers::{Tag, TagSet};

///
/// One entry of an ordered tag rule list. Without a value the rule matches
/// every tag with the given key.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub include: bool,
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl TagRule {
    fn matches(&self, tag: &Tag) -> bool {
        self.key == tag.key
            && self
                .value
                .as_ref()
                .map_or(true, |value| *value == tag.value)
    }
}

///
/// Ordered list of tag rules. For each tag the first matching rule decides
/// whether the tag is included; tags no rule matches are excluded.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagRules(Vec<TagRule>);

impl TagRules {
    pub fn new() -> Self {
        TagRules(Vec::new())
    }

    pub fn add(mut self, include: bool, key: &str) -> Self {
        self.0.push(TagRule {
            include,
            key: key.to_string(),
            value: None,
        });
        self
    }

    pub fn add_value(mut self, include: bool, key: &str, value: &str) -> Self {
        self.0.push(TagRule {
            include,
            key: key.to_string(),
            value: Some(value.to_string()),
        });
        self
    }

    pub fn includes(&self, tag: &Tag) -> bool {
        self.0
            .iter()
            .find(|rule| rule.matches(tag))
            .map_or(false, |rule| rule.include)
    }

    pub fn matches_any(&self, tags: &TagSet) -> bool {
        tags.iter().any(|tag| self.includes(tag))
    }
}

/// Keys that carry no information about the geometry type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyDenyList(Vec<String>);

impl KeyDenyList {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyDenyList(keys.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    /// Number of tags left once denied keys are removed.
    pub fn count_interesting(&self, tags: &TagSet) -> usize {
        tags.iter().filter(|tag| !self.contains(&tag.key)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MpType {
    Multipolygon,
    Boundary,
}

/// Values of the `type` tag that mark a relation as an area relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaTypes {
    pub multipolygon: Vec<String>,
    pub boundary: Vec<String>,
}

impl Default for AreaTypes {
    fn default() -> Self {
        AreaTypes {
            multipolygon: vec!["multipolygon".to_string()],
            boundary: vec!["boundary".to_string()],
        }
    }
}

impl AreaTypes {
    pub fn classify(&self, type_value: &str) -> Option<MpType> {
        if self.multipolygon.iter().any(|t| t == type_value) {
            Some(MpType::Multipolygon)
        } else if self.boundary.iter().any(|t| t == type_value) {
            Some(MpType::Boundary)
        } else {
            None
        }
    }
}

///
/// Everything the classifiers need to know about tags. Built once and handed
/// to every classifier call by reference.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub uninteresting_keys: KeyDenyList,
    pub linestring_rules: TagRules,
    pub polygon_rules: TagRules,
    pub area_types: AreaTypes,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let linestring_rules = TagRules::new()
            .add(true, "highway")
            .add_value(true, "leisure", "slipway")
            .add_value(false, "waterway", "riverbank")
            .add_value(false, "waterway", "dock")
            .add(true, "waterway");

        let polygon_rules = TagRules::new()
            .add(true, "building")
            .add(true, "building:part")
            .add(true, "landuse")
            .add(true, "natural")
            .add_value(true, "waterway", "dock")
            .add_value(true, "waterway", "riverbank")
            .add_value(false, "leisure", "slipway")
            .add(true, "leisure")
            .add_value(true, "amenity", "parking")
            .add_value(true, "amenity", "bicycle_parking")
            .add_value(true, "aeroway", "apron");

        ClassifierConfig {
            uninteresting_keys: KeyDenyList::new(vec!["created_by", "source", "note", "name"]),
            linestring_rules,
            polygon_rules,
            area_types: AreaTypes::default(),
        }
    }
}

impl ClassifierConfig {
    ///
    /// Read a configuration from a JSON file. Missing fields keep their
    /// default value.
    ///
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Area relation type of a relation, if it is one.
    pub fn mp_type(&self, tags: &TagSet) -> Option<MpType> {
        tags.get("type")
            .and_then(|value| self.area_types.classify(value))
    }
}
