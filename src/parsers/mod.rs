pub(crate) mod pbfparser;

use std::fmt;

use osmpbfreader;

use crate::error::Result;

pub use osmpbfreader::{NodeId, RelationId, WayId};

/// Raw id of a relation member. Its meaning depends on the member type.
pub type OsmRef = i64;

pub use pbfparser::PbfSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Tag {
            key: key.into(),
            value: value.into(),
        }
    }
}

///
/// Ordered tags of a way or relation. Lookups return the first tag with a
/// matching key.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn new() -> Self {
        TagSet(Vec::new())
    }

    pub fn push(&mut self, tag: Tag) {
        self.0.push(tag);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    /// Copy of the tags with every tag of the given key removed.
    pub fn without(&self, key: &str) -> TagSet {
        TagSet(self.0.iter().filter(|tag| tag.key != key).cloned().collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> std::iter::FromIterator<(K, V)> for TagSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TagSet(iter.into_iter().map(|(k, v)| Tag::new(k, v)).collect())
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Way {
    pub id: WayId,
    pub nodes: Vec<NodeId>,
    pub tags: TagSet,
}

impl Way {
    /// A way is closed if it has more than one node and ends where it starts.
    pub fn is_closed(&self) -> bool {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(first), Some(last)) => self.nodes.len() > 1 && first == last,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberType {
    Node,
    Way,
    Relation,
}

impl MemberType {
    pub fn as_char(self) -> char {
        match self {
            MemberType::Node => 'n',
            MemberType::Way => 'w',
            MemberType::Relation => 'r',
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationMember {
    pub member_type: MemberType,
    pub member_ref: OsmRef,
    pub role: String,
}

impl RelationMember {
    pub fn new<R: Into<String>>(member_type: MemberType, member_ref: OsmRef, role: R) -> Self {
        RelationMember {
            member_type,
            member_ref,
            role: role.into(),
        }
    }

    pub fn way(&self) -> Option<WayId> {
        match self.member_type {
            MemberType::Way => Some(WayId(self.member_ref)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub id: RelationId,
    pub tags: TagSet,
    pub members: Vec<RelationMember>,
}

impl Relation {
    /// Ids of all way members in member order, duplicates included.
    pub fn way_members(&self) -> impl Iterator<Item = WayId> + '_ {
        self.members.iter().filter_map(RelationMember::way)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Node(NodeId),
    Way(Way),
    Relation(Relation),
}

///
/// A stream of OSM entities that can be read more than once.
///
pub trait EntitySource {
    ///
    /// Start a new pass over the stream. Entities are yielded in stream
    /// order; a source that cannot be rewound yields a single error.
    ///
    fn entities<'a>(&'a mut self) -> Box<dyn Iterator<Item = Result<Entity>> + 'a>;
}

impl EntitySource for Vec<Entity> {
    fn entities<'a>(&'a mut self) -> Box<dyn Iterator<Item = Result<Entity>> + 'a> {
        Box::new(self.iter().cloned().map(Ok))
    }
}
