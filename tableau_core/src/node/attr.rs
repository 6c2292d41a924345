// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named node attributes.
//!
//! Every built-in attribute has a [`NodeAttr`] tag and a string name. The
//! tag's [`AttrCategory`] says which setter family a write goes through, and
//! so what it invalidates:
//!
//! - [`Transform`](AttrCategory::Transform): world matrices of the subtree.
//! - [`Visual`](AttrCategory::Visual): a redraw only.
//! - [`Size`](AttrCategory::Size): the layout of the node and its ancestors.
//!
//! Names that are not built in address user attributes, which can hold any
//! [`Value`] (for example a `#rrggbb` colour read by custom drawing code).

use crate::error::{Error, Result};
use crate::tween::{Animatable, Value};

use super::id::NodeId;
use super::props::Insets;
use super::store::NodeStore;

/// One edge of an [`Insets`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

impl Edge {
    const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    fn suffix(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    fn get(self, insets: &Insets) -> f64 {
        match self {
            Self::Top => insets.top,
            Self::Right => insets.right,
            Self::Bottom => insets.bottom,
            Self::Left => insets.left,
        }
    }

    fn set(self, insets: &mut Insets, v: f64) {
        match self {
            Self::Top => insets.top = v,
            Self::Right => insets.right = v,
            Self::Bottom => insets.bottom = v,
            Self::Left => insets.left = v,
        }
    }
}

/// Which setter family an attribute belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrCategory {
    /// Position, rotation, scale and pivot.
    Transform,
    /// Opacity, visibility and stacking.
    Visual,
    /// Inputs of the layout solver.
    Size,
}

/// A built-in node attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeAttr {
    /// `x`
    X,
    /// `y`
    Y,
    /// `rotation`, in radians.
    Rotation,
    /// `scale_x`
    ScaleX,
    /// `scale_y`
    ScaleY,
    /// `pivot_x`
    PivotX,
    /// `pivot_y`
    PivotY,
    /// `opacity`
    Opacity,
    /// `z_order`
    ZOrder,
    /// `visible`
    Visible,
    /// `min_width`
    MinWidth,
    /// `min_height`
    MinHeight,
    /// `expand`
    Expand,
    /// `fill`
    Fill,
    /// `x_align`
    XAlign,
    /// `y_align`
    YAlign,
    /// `padding_top`, `padding_right`, `padding_bottom`, `padding_left`
    Padding(Edge),
    /// `margin_top`, `margin_right`, `margin_bottom`, `margin_left`
    Margin(Edge),
}

impl NodeAttr {
    /// Looks up a built-in attribute by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let attr = match name {
            "x" => Self::X,
            "y" => Self::Y,
            "rotation" => Self::Rotation,
            "scale_x" => Self::ScaleX,
            "scale_y" => Self::ScaleY,
            "pivot_x" => Self::PivotX,
            "pivot_y" => Self::PivotY,
            "opacity" => Self::Opacity,
            "z_order" => Self::ZOrder,
            "visible" => Self::Visible,
            "min_width" => Self::MinWidth,
            "min_height" => Self::MinHeight,
            "expand" => Self::Expand,
            "fill" => Self::Fill,
            "x_align" => Self::XAlign,
            "y_align" => Self::YAlign,
            _ => {
                if let Some(edge) = name.strip_prefix("padding_") {
                    return Edge::ALL
                        .into_iter()
                        .find(|e| e.suffix() == edge)
                        .map(Self::Padding);
                }
                let edge = name.strip_prefix("margin_")?;
                return Edge::ALL
                    .into_iter()
                    .find(|e| e.suffix() == edge)
                    .map(Self::Margin);
            }
        };
        Some(attr)
    }

    /// Returns the attribute's name.
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::X => "x".into(),
            Self::Y => "y".into(),
            Self::Rotation => "rotation".into(),
            Self::ScaleX => "scale_x".into(),
            Self::ScaleY => "scale_y".into(),
            Self::PivotX => "pivot_x".into(),
            Self::PivotY => "pivot_y".into(),
            Self::Opacity => "opacity".into(),
            Self::ZOrder => "z_order".into(),
            Self::Visible => "visible".into(),
            Self::MinWidth => "min_width".into(),
            Self::MinHeight => "min_height".into(),
            Self::Expand => "expand".into(),
            Self::Fill => "fill".into(),
            Self::XAlign => "x_align".into(),
            Self::YAlign => "y_align".into(),
            Self::Padding(edge) => format!("padding_{}", edge.suffix()),
            Self::Margin(edge) => format!("margin_{}", edge.suffix()),
        }
    }

    /// Returns the setter family of the attribute.
    #[must_use]
    pub fn category(self) -> AttrCategory {
        match self {
            Self::X
            | Self::Y
            | Self::Rotation
            | Self::ScaleX
            | Self::ScaleY
            | Self::PivotX
            | Self::PivotY => AttrCategory::Transform,
            Self::Opacity | Self::ZOrder | Self::Visible => AttrCategory::Visual,
            Self::MinWidth
            | Self::MinHeight
            | Self::Expand
            | Self::Fill
            | Self::XAlign
            | Self::YAlign
            | Self::Padding(_)
            | Self::Margin(_) => AttrCategory::Size,
        }
    }
}

impl NodeStore {
    /// Reads a built-in attribute.
    #[must_use]
    pub fn node_attr(&self, id: NodeId, attr: NodeAttr) -> Option<Value> {
        let t = self.transform(id)?;
        let props = self.layout_props(id)?;
        let value = match attr {
            NodeAttr::X => t.x.into(),
            NodeAttr::Y => t.y.into(),
            NodeAttr::Rotation => t.rotation.into(),
            NodeAttr::ScaleX => t.scale_x.into(),
            NodeAttr::ScaleY => t.scale_y.into(),
            NodeAttr::PivotX => t.pivot_x.into(),
            NodeAttr::PivotY => t.pivot_y.into(),
            NodeAttr::Opacity => self.opacity(id)?.into(),
            NodeAttr::ZOrder => self.z_order(id)?.into(),
            NodeAttr::Visible => self.visible(id)?.into(),
            NodeAttr::MinWidth => props.min_width.into(),
            NodeAttr::MinHeight => props.min_height.into(),
            NodeAttr::Expand => props.expand.into(),
            NodeAttr::Fill => props.fill.into(),
            NodeAttr::XAlign => props.x_align.into(),
            NodeAttr::YAlign => props.y_align.into(),
            NodeAttr::Padding(edge) => edge.get(&props.padding).into(),
            NodeAttr::Margin(edge) => edge.get(&props.margin).into(),
        };
        Some(value)
    }

    /// Writes a built-in attribute through its category's setter.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownAttribute`] if `value` has the wrong kind for `attr`,
    /// [`Error::StaleNode`] for a stale handle.
    pub fn set_node_attr(&mut self, id: NodeId, attr: NodeAttr, value: &Value) -> Result<()> {
        self.check(id)?;
        let mismatch = || Error::UnknownAttribute {
            attribute: attr.name(),
        };
        match attr {
            NodeAttr::Visible => {
                let visible = value.as_bool().ok_or_else(mismatch)?;
                self.set_visible(id, visible)
            }
            NodeAttr::Expand => {
                let expand = value.as_bool().ok_or_else(mismatch)?;
                self.set_expand(id, expand)
            }
            NodeAttr::Fill => {
                let fill = value.as_bool().ok_or_else(mismatch)?;
                self.set_fill(id, fill)
            }
            _ => {
                let v = value.as_number().ok_or_else(mismatch)?;
                self.set_number_attr(id, attr, v)
            }
        }
    }

    /// Reads a built-in attribute or, failing that, a user attribute.
    #[must_use]
    pub fn attr_by_name(&self, id: NodeId, name: &str) -> Option<Value> {
        match NodeAttr::from_name(name) {
            Some(attr) => self.node_attr(id, attr),
            None => self.custom_attr(id, name).cloned(),
        }
    }

    /// Writes a built-in attribute or, failing that, a user attribute.
    pub fn set_attr_by_name(&mut self, id: NodeId, name: &str, value: Value) -> Result<()> {
        match NodeAttr::from_name(name) {
            Some(attr) => self.set_node_attr(id, attr, &value),
            None => self.set_custom_attr(id, name, value),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "z-order is rounded and saturates"
    )]
    fn set_number_attr(&mut self, id: NodeId, attr: NodeAttr, v: f64) -> Result<()> {
        match attr {
            NodeAttr::X => self.update_transform(id, |t| t.x = v),
            NodeAttr::Y => self.update_transform(id, |t| t.y = v),
            NodeAttr::Rotation => self.update_transform(id, |t| t.rotation = v),
            NodeAttr::ScaleX => self.update_transform(id, |t| t.scale_x = v),
            NodeAttr::ScaleY => self.update_transform(id, |t| t.scale_y = v),
            NodeAttr::PivotX => self.update_transform(id, |t| t.pivot_x = v),
            NodeAttr::PivotY => self.update_transform(id, |t| t.pivot_y = v),
            NodeAttr::Opacity => self.set_opacity(id, v),
            NodeAttr::ZOrder => self.set_z_order(id, v.round() as i32),
            NodeAttr::MinWidth => self.update_layout_props(id, |p| p.min_width = v.max(0.0)),
            NodeAttr::MinHeight => self.update_layout_props(id, |p| p.min_height = v.max(0.0)),
            NodeAttr::XAlign => self.update_layout_props(id, |p| p.x_align = v.clamp(0.0, 1.0)),
            NodeAttr::YAlign => self.update_layout_props(id, |p| p.y_align = v.clamp(0.0, 1.0)),
            NodeAttr::Padding(edge) => self.update_layout_props(id, |p| edge.set(&mut p.padding, v)),
            NodeAttr::Margin(edge) => self.update_layout_props(id, |p| edge.set(&mut p.margin, v)),
            NodeAttr::Visible | NodeAttr::Expand | NodeAttr::Fill => Err(Error::UnknownAttribute {
                attribute: attr.name(),
            }),
        }
    }
}

impl Animatable<NodeId> for NodeStore {
    fn get_attr(&self, target: NodeId, name: &str) -> Option<Value> {
        self.attr_by_name(target, name)
    }

    fn set_attr(&mut self, target: NodeId, name: &str, value: Value) {
        if let Err(err) = self.set_attr_by_name(target, name, value) {
            log::debug!("tween write to {target:?}.{name} dropped: {err}");
        }
    }

    fn is_alive(&self, target: NodeId) -> bool {
        Self::is_alive(self, target)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;

    #[test]
    fn names_round_trip() {
        for attr in [
            NodeAttr::X,
            NodeAttr::Opacity,
            NodeAttr::ZOrder,
            NodeAttr::Padding(Edge::Left),
            NodeAttr::Margin(Edge::Bottom),
        ] {
            assert_eq!(NodeAttr::from_name(&attr.name()), Some(attr));
        }
        assert_eq!(NodeAttr::from_name("padding_middle"), None);
        assert_eq!(NodeAttr::from_name("colour"), None);
    }

    #[test]
    fn categories() {
        assert_eq!(NodeAttr::Rotation.category(), AttrCategory::Transform);
        assert_eq!(NodeAttr::Visible.category(), AttrCategory::Visual);
        assert_eq!(NodeAttr::Margin(Edge::Top).category(), AttrCategory::Size);
    }

    #[test]
    fn writes_go_through_setters() {
        let mut store = NodeStore::new();
        let n = store.create_node();
        store.set_node_attr(n, NodeAttr::X, &Value::Number(12.0)).unwrap();
        store.set_node_attr(n, NodeAttr::Opacity, &Value::Number(3.0)).unwrap();
        store
            .set_node_attr(n, NodeAttr::Padding(Edge::Top), &Value::Number(4.0))
            .unwrap();
        assert_eq!(store.position(n), Some(Point::new(12.0, 0.0)));
        assert_eq!(store.opacity(n), Some(1.0), "clamped like the setter");
        assert_eq!(store.layout_props(n).map(|p| p.padding.top), Some(4.0));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut store = NodeStore::new();
        let n = store.create_node();
        assert_eq!(
            store.set_node_attr(n, NodeAttr::Visible, &Value::Number(1.0)),
            Err(Error::UnknownAttribute {
                attribute: "visible".into()
            })
        );
    }

    #[test]
    fn unknown_names_are_user_attributes() {
        let mut store = NodeStore::new();
        let n = store.create_node();
        assert_eq!(store.attr_by_name(n, "color"), None);
        store.set_attr_by_name(n, "color", "#ff0000".into()).unwrap();
        assert_eq!(store.attr_by_name(n, "color"), Some(Value::from("#ff0000")));
        assert_eq!(store.attr_by_name(n, "y"), Some(Value::Number(0.0)));
    }
}
