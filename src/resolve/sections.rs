//! Top-level template sections.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::document::node::NodeRef;
use crate::document::DocumentType;
use crate::resolve::classify::{extract_key_from_pair, is_mapping_node, is_pair_node};
use crate::resolve::structure::find_all_pairs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopLevelSection {
    AWSTemplateFormatVersion,
    Description,
    Metadata,
    Parameters,
    Rules,
    Mappings,
    Conditions,
    Transform,
    Resources,
    Outputs,
    Hooks,
}

impl TopLevelSection {
    pub const ALL: [TopLevelSection; 11] = [
        TopLevelSection::AWSTemplateFormatVersion,
        TopLevelSection::Description,
        TopLevelSection::Metadata,
        TopLevelSection::Parameters,
        TopLevelSection::Rules,
        TopLevelSection::Mappings,
        TopLevelSection::Conditions,
        TopLevelSection::Transform,
        TopLevelSection::Resources,
        TopLevelSection::Outputs,
        TopLevelSection::Hooks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TopLevelSection::AWSTemplateFormatVersion => "AWSTemplateFormatVersion",
            TopLevelSection::Description => "Description",
            TopLevelSection::Metadata => "Metadata",
            TopLevelSection::Parameters => "Parameters",
            TopLevelSection::Rules => "Rules",
            TopLevelSection::Mappings => "Mappings",
            TopLevelSection::Conditions => "Conditions",
            TopLevelSection::Transform => "Transform",
            TopLevelSection::Resources => "Resources",
            TopLevelSection::Outputs => "Outputs",
            TopLevelSection::Hooks => "Hooks",
        }
    }
}

impl FromStr for TopLevelSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TopLevelSection::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| format!("unknown template section: {s}"))
    }
}

impl fmt::Display for TopLevelSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finds the pair node of each requested section, in document order.
///
/// JSON sections are the pairs of the root object. YAML sections are the
/// column-0 pairs found by the indentation indexer, so they survive parse
/// errors elsewhere in the document. The first occurrence of a duplicated
/// section wins.
pub fn find_top_level_sections(
    root: &NodeRef,
    document_type: DocumentType,
    sections: &[TopLevelSection],
    max_depth: usize,
) -> IndexMap<TopLevelSection, NodeRef> {
    let candidates: Vec<(String, NodeRef)> = match document_type {
        DocumentType::Json => root
            .named_children()
            .find(|child| is_mapping_node(child, document_type))
            .map(|object| {
                object
                    .named_children()
                    .filter(|child| is_pair_node(child, document_type))
                    .filter_map(|pair| Some((extract_key_from_pair(&pair, document_type)?, pair)))
                    .collect()
            })
            .unwrap_or_default(),
        DocumentType::Yaml => find_all_pairs(root, document_type, max_depth)
            .into_iter()
            .filter(|pair| pair.indent_level == 0)
            .map(|pair| (pair.key, pair.node))
            .collect(),
    };

    let mut found = IndexMap::new();
    for (key, node) in candidates {
        let Ok(section) = key.parse::<TopLevelSection>() else {
            continue;
        };
        if sections.contains(&section) && !found.contains_key(&section) {
            found.insert(section, node);
        }
    }
    found
}
