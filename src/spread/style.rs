//! Box descriptors handed to the style sink
//!
//! Every descriptor keeps its fields in insertion order; consumers build style
//! strings from them and rely on that order.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::layout::{LayoutConfig, SpreadGeometry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleValue {
    Px(i64),
    Number(i64),
    Keyword(&'static str),
    /// Field present but cleared (the sink removes any previous value)
    Unset,
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Px(v) => write!(f, "{v}px"),
            StyleValue::Number(v) => write!(f, "{v}"),
            StyleValue::Keyword(k) => f.write_str(k),
            StyleValue::Unset => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxStyle {
    fields: Vec<(&'static str, StyleValue)>,
}

impl BoxStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, keeping its original position when it already exists
    pub fn with(mut self, name: &'static str, value: StyleValue) -> Self {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn extend(self, other: &BoxStyle) -> Self {
        other
            .fields
            .iter()
            .fold(self, |acc, (name, value)| acc.with(*name, value.clone()))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn px(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(StyleValue::Px(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &StyleValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Inline CSS declaration list; unset fields are skipped
    pub fn to_css(&self) -> String {
        self.fields
            .iter()
            .filter(|(_, value)| *value != StyleValue::Unset)
            .map(|(name, value)| format!("{}: {value};", kebab_case(name)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Serialize for BoxStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            match value {
                StyleValue::Number(n) => map.serialize_entry(name, n)?,
                StyleValue::Unset => map.serialize_entry(name, &Option::<String>::None)?,
                other => map.serialize_entry(name, &other.to_string())?,
            }
        }
        map.end()
    }
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// On-screen elements of a spread that receive a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpreadElement {
    MainContainer,
    SpreadCover,
    LeafEdgeLeft,
    LeafEdgeRight,
    Spine,
    LeftLeaf,
    RightLeaf,
}

impl SpreadElement {
    pub const ALL: [SpreadElement; 7] = [
        SpreadElement::MainContainer,
        SpreadElement::SpreadCover,
        SpreadElement::LeafEdgeLeft,
        SpreadElement::LeafEdgeRight,
        SpreadElement::Spine,
        SpreadElement::LeftLeaf,
        SpreadElement::RightLeaf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpreadElement::MainContainer => "main-container",
            SpreadElement::SpreadCover => "spread-cover",
            SpreadElement::LeafEdgeLeft => "leaf-edge-left",
            SpreadElement::LeafEdgeRight => "leaf-edge-right",
            SpreadElement::Spine => "spine",
            SpreadElement::LeftLeaf => "left-leaf",
            SpreadElement::RightLeaf => "right-leaf",
        }
    }
}

/// The full descriptor set for one computed spread
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SpreadStyles {
    pub base_leaf: BoxStyle,
    pub height: BoxStyle,
    pub left_leaf: BoxStyle,
    pub right_leaf: BoxStyle,
    pub leaf_edge_left: BoxStyle,
    pub leaf_edge_right: BoxStyle,
    pub main_container: BoxStyle,
    pub spread_cover: BoxStyle,
    pub spine: BoxStyle,
}

impl SpreadStyles {
    pub fn from_geometry(geo: &SpreadGeometry, config: &LayoutConfig) -> Self {
        let base_leaf = BoxStyle::new()
            .with("position", StyleValue::Keyword("absolute"))
            .with("right", StyleValue::Unset)
            .with(
                "top",
                StyleValue::Px(config.cover_external_padding + config.cover_internal_padding),
            )
            .with("zIndex", StyleValue::Number(2));

        let height = BoxStyle::new().with("height", StyleValue::Px(geo.height));

        let left_leaf = base_leaf
            .clone()
            .extend(&height)
            .with("left", StyleValue::Px(geo.gutter - geo.scaled_wl))
            .with("width", StyleValue::Px(geo.scaled_wl));

        let right_leaf = base_leaf
            .clone()
            .extend(&height)
            .with("left", StyleValue::Px(geo.gutter))
            .with("width", StyleValue::Px(geo.scaled_wr));

        let edge_top = geo.cover_top + config.cover_internal_padding;
        let leaf_edge_left = leaf_edge(
            geo.height,
            geo.leaf_edge_width_l,
            geo.cover_left + config.cover_internal_padding,
            edge_top,
        );
        let leaf_edge_right = leaf_edge(
            geo.height,
            geo.leaf_edge_width_r,
            geo.gutter + geo.scaled_wr,
            edge_top,
        );

        let main_container = BoxStyle::new()
            .with("height", StyleValue::Px(geo.total_height))
            .with("width", StyleValue::Px(geo.total_width))
            .with("position", StyleValue::Keyword("absolute"));

        let spread_cover = BoxStyle::new()
            .with("width", StyleValue::Px(geo.cover_width))
            .with("height", StyleValue::Px(geo.cover_height))
            .with("visibility", StyleValue::Keyword("visible"));

        let spine = BoxStyle::new()
            .with("width", StyleValue::Px(geo.spine_width))
            .with("height", StyleValue::Px(geo.spine_height))
            .with("left", StyleValue::Px(geo.spine_left))
            .with("top", StyleValue::Px(geo.spine_top));

        Self {
            base_leaf,
            height,
            left_leaf,
            right_leaf,
            leaf_edge_left,
            leaf_edge_right,
            main_container,
            spread_cover,
            spine,
        }
    }

    pub fn for_element(&self, element: SpreadElement) -> &BoxStyle {
        match element {
            SpreadElement::MainContainer => &self.main_container,
            SpreadElement::SpreadCover => &self.spread_cover,
            SpreadElement::LeafEdgeLeft => &self.leaf_edge_left,
            SpreadElement::LeafEdgeRight => &self.leaf_edge_right,
            SpreadElement::Spine => &self.spine,
            SpreadElement::LeftLeaf => &self.left_leaf,
            SpreadElement::RightLeaf => &self.right_leaf,
        }
    }
}

fn leaf_edge(height: i64, width: i64, left: i64, top: i64) -> BoxStyle {
    BoxStyle::new()
        .with("height", StyleValue::Px(height))
        .with("width", StyleValue::Px(width))
        .with("left", StyleValue::Px(left))
        .with("top", StyleValue::Px(top))
        .with(
            "border",
            if width == 0 {
                StyleValue::Keyword("none")
            } else {
                StyleValue::Unset
            },
        )
}
