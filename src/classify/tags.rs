use std::fmt;
use std::ops::AddAssign;

use crate::config::ClassifierConfig;
use crate::parsers::TagSet;

/// What the tags of a way or relation say about its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Unknown,
    NoTags,
    Linestring,
    Polygon,
    Both,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Unknown,
        Category::NoTags,
        Category::Linestring,
        Category::Polygon,
        Category::Both,
    ];

    /// Label used in output file names.
    pub fn label(self) -> &'static str {
        match self {
            Category::Unknown => "unknown",
            Category::NoTags => "notags",
            Category::Linestring => "linestring",
            Category::Polygon => "polygon",
            Category::Both => "both",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

///
/// Classify a tag set.
///
/// Tags with uninteresting keys are ignored. An `area=yes` or `area=no` tag
/// decides on its own; otherwise the linestring and polygon rule lists are
/// matched independently and combined.
///
pub fn classify_tags(tags: &TagSet, config: &ClassifierConfig) -> Category {
    if config.uninteresting_keys.count_interesting(tags) == 0 {
        return Category::NoTags;
    }

    match tags.get("area") {
        Some("yes") => return Category::Polygon,
        Some("no") => return Category::Linestring,
        _ => (),
    }

    let any_linestring = config.linestring_rules.matches_any(tags);
    let any_polygon = config.polygon_rules.matches_any(tags);

    match (any_linestring, any_polygon) {
        (true, true) => Category::Both,
        (true, false) => Category::Linestring,
        (false, true) => Category::Polygon,
        (false, false) => Category::Unknown,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCounts([u64; 5]);

impl CategoryCounts {
    pub fn increment(&mut self, category: Category) {
        self.0[category.index()] += 1;
    }

    pub fn get(&self, category: Category) -> u64 {
        self.0[category.index()]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }
}

impl AddAssign for CategoryCounts {
    fn add_assign(&mut self, other: Self) {
        for (count, other) in self.0.iter_mut().zip(other.0.iter()) {
            *count += other;
        }
    }
}

impl fmt::Display for CategoryCounts {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "unknown:    {}\n\
             no tags:    {}\n\
             linestring: {}\n\
             polygon:    {}\n\
             both:       {}",
            self.get(Category::Unknown),
            self.get(Category::NoTags),
            self.get(Category::Linestring),
            self.get(Category::Polygon),
            self.get(Category::Both)
        )
    }
}
