use std::fs::File;
use std::path::Path;

use log::debug;
use osmpbfreader::{OsmId, OsmObj, OsmPbfReader, Tags};

use crate::error::{Error, Result};
use crate::parsers::{Entity, EntitySource, MemberType, Relation, RelationMember, TagSet, Way};

///
/// Entity source backed by an OSM PBF file. Every pass rewinds the reader
/// and decodes the blobs in parallel; objects still come out in file order.
///
pub struct PbfSource {
    reader: OsmPbfReader<File>,
}

impl PbfSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Opened {}", path.display());

        Ok(PbfSource {
            reader: OsmPbfReader::new(file),
        })
    }
}

impl EntitySource for PbfSource {
    fn entities<'a>(&'a mut self) -> Box<dyn Iterator<Item = Result<Entity>> + 'a> {
        if let Err(err) = self.reader.rewind() {
            return Box::new(std::iter::once(Err(Error::from(err))));
        }

        Box::new(
            self.reader
                .par_iter()
                .map(|obj| obj.map(Entity::from).map_err(Error::from)),
        )
    }
}

fn to_tag_set(tags: &Tags) -> TagSet {
    tags.iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Ways keep their node list as read, an empty one included.
impl From<OsmObj> for Entity {
    fn from(obj: OsmObj) -> Entity {
        match obj {
            OsmObj::Node(node) => Entity::Node(node.id),
            OsmObj::Way(way) => Entity::Way(Way {
                id: way.id,
                tags: to_tag_set(&way.tags),
                nodes: way.nodes,
            }),
            OsmObj::Relation(rel) => {
                let members = rel
                    .refs
                    .iter()
                    .map(|r| {
                        let (member_type, member_ref) = match r.member {
                            OsmId::Node(id) => (MemberType::Node, id.0),
                            OsmId::Way(id) => (MemberType::Way, id.0),
                            OsmId::Relation(id) => (MemberType::Relation, id.0),
                        };
                        RelationMember::new(member_type, member_ref, r.role.to_string())
                    })
                    .collect();

                Entity::Relation(Relation {
                    id: rel.id,
                    tags: to_tag_set(&rel.tags),
                    members,
                })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parsers::{NodeId, RelationId, WayId};

    #[test]
    fn test_open_missing_file() {
        match PbfSource::open("/nonexistent/planet.osm.pbf") {
            Err(Error::Open { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/planet.osm.pbf"))
            }
            _ => panic!("expected an open error"),
        }
    }

    #[test]
    fn test_convert_way() {
        let mut tags = Tags::new();
        tags.insert("building".into(), "yes".into());
        let obj = OsmObj::Way(osmpbfreader::Way {
            id: WayId(10),
            tags,
            nodes: vec![NodeId(1), NodeId(2), NodeId(3), NodeId(1)],
        });

        match Entity::from(obj) {
            Entity::Way(way) => {
                assert_eq!(way.id, WayId(10));
                assert!(way.is_closed());
                assert_eq!(way.tags.get("building"), Some("yes"));
            }
            other => panic!("unexpected conversion result {:?}", other),
        }
    }

    #[test]
    fn test_convert_way_without_nodes() {
        let obj = OsmObj::Way(osmpbfreader::Way {
            id: WayId(11),
            tags: Tags::new(),
            nodes: vec![],
        });

        match Entity::from(obj) {
            Entity::Way(way) => {
                assert_eq!(way.id, WayId(11));
                assert!(way.nodes.is_empty());
                assert!(!way.is_closed());
            }
            other => panic!("unexpected conversion result {:?}", other),
        }
    }

    #[test]
    fn test_convert_relation_members() {
        let obj = OsmObj::Relation(osmpbfreader::Relation {
            id: RelationId(5),
            tags: Tags::new(),
            refs: vec![
                osmpbfreader::Ref {
                    member: OsmId::Way(WayId(3)),
                    role: "outer".into(),
                },
                osmpbfreader::Ref {
                    member: OsmId::Node(NodeId(4)),
                    role: "".into(),
                },
            ],
        });

        match Entity::from(obj) {
            Entity::Relation(rel) => {
                assert_eq!(
                    rel.members,
                    vec![
                        RelationMember::new(MemberType::Way, 3, "outer"),
                        RelationMember::new(MemberType::Node, 4, ""),
                    ]
                );
            }
            other => panic!("unexpected conversion result {:?}", other),
        }
    }
}
