//! Resolve pointer interactions to palette colors.

use std::collections::HashMap;
use std::fmt;

use resvg::usvg;

use crate::backends::raster::parse_owned;
use crate::color::Color;
use crate::document::{Document, Element, NodeId};
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::pipeline::extract::Channel;
use crate::style::StyleDecls;

/// Id prefix given to elements that carry none, so usvg nodes can be
/// traced back to the document.
const NODE_TAG: &str = "svgtint-node-";

/// Paint declared directly on an element: the attribute first, then the
/// inline style.
fn declared(el: &Element, channel: Channel) -> Option<String> {
    if let Some(v) = el.attr(channel.property()) {
        return Some(v.to_string());
    }
    let style = StyleDecls::parse(el.attr("style")?);
    style.get(channel.property()).map(str::to_string)
}

/// Effective paint for one channel, walking up through `ancestors`
/// (nearest first) while the channel is undeclared.
fn effective(el: &Element, ancestors: &[&Element], channel: Channel) -> Option<Color> {
    std::iter::once(el)
        .chain(ancestors.iter().copied())
        .find_map(|e| declared(e, channel))
        .and_then(|v| Color::parse(&v))
}

/// Color shown by an element: its fill when that is a real paint, else its
/// stroke, else `None`. Undeclared paints are inherited.
pub fn resolve_paint(el: &Element, ancestors: &[&Element]) -> Option<Color> {
    effective(el, ancestors, Channel::Fill).or_else(|| effective(el, ancestors, Channel::Stroke))
}

/// [`resolve_paint`] for an element addressed by id.
pub fn resolve_color_at(doc: &Document, target: NodeId) -> Option<Color> {
    let (el, ancestors) = doc.element_with_ancestors(target)?;
    resolve_paint(el, &ancestors)
}

/// The document as usvg lays it out, with every rendered node traced back
/// to the element that produced it.
pub struct Scene {
    tree: usvg::Tree,
    owners: HashMap<String, NodeId>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("canvas", &self.canvas())
            .field("owners", &self.owners.len())
            .finish_non_exhaustive()
    }
}

impl Scene {
    pub fn build(doc: &Document) -> Result<Self> {
        let mut copy = doc.clone();
        let mut owners = HashMap::new();
        copy.walk_mut(|id, el| {
            match el.attr("id").filter(|v| !v.is_empty()).map(str::to_string) {
                // first element wins, as in url(#..) lookups
                Some(existing) => {
                    owners.entry(existing).or_insert(id);
                }
                None => {
                    let tag = format!("{NODE_TAG}{}", id.0);
                    el.set_attr("id", &tag);
                    owners.insert(tag, id);
                }
            }
        });
        let tree = parse_owned(copy)?;
        Ok(Self { tree, owners })
    }

    /// Rendered canvas in pixels.
    pub fn canvas(&self) -> Rect {
        let size = self.tree.size();
        Rect::new(0.0, 0.0, size.width(), size.height())
    }

    /// Elements whose rendered stroke bounds contain `point`, in paint order.
    pub fn hits(&self, point: Point) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect(self.tree.root(), None, point, &mut out);
        out
    }

    fn collect(
        &self,
        group: &usvg::Group,
        owner: Option<NodeId>,
        point: Point,
        out: &mut Vec<NodeId>,
    ) {
        for node in group.children() {
            // wrapper groups and generated paths may carry no id
            let owner = self.owners.get(node.id()).copied().or(owner);
            if let usvg::Node::Group(nested) = node {
                self.collect(nested, owner, point, out);
                continue;
            }
            let Some(owner) = owner else { continue };
            let b = node.abs_stroke_bounding_box();
            let bounds = Rect::new(b.x(), b.y(), b.width(), b.height());
            if bounds.contains(point) && out.last() != Some(&owner) {
                out.push(owner);
            }
        }
    }

    /// Topmost element under `point` (canvas pixels) that shows a real color.
    pub fn pick(&self, doc: &Document, point: Point) -> Option<NodeId> {
        self.hits(point)
            .into_iter()
            .rev()
            .find(|&id| resolve_color_at(doc, id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Document {
        Document::parse(&format!(
            r#"<svg width="100" height="100" viewBox="0 0 100 100">{body}</svg>"#
        ))
        .unwrap()
    }

    fn pick_at(doc: &Document, point: Point) -> Option<NodeId> {
        Scene::build(doc).unwrap().pick(doc, point)
    }

    #[test]
    fn fill_preferred_over_stroke() {
        let d = doc(r#"<rect fill="red" stroke="blue"/>"#);
        assert_eq!(resolve_color_at(&d, NodeId(1)), Some(Color::new(255, 0, 0)));
    }

    #[test]
    fn stroke_used_when_fill_is_none() {
        let d = doc(r#"<rect fill="none" stroke="blue"/>"#);
        assert_eq!(resolve_color_at(&d, NodeId(1)), Some(Color::new(0, 0, 255)));
    }

    #[test]
    fn style_paint_is_read() {
        let d = doc(r#"<rect style="fill:none;stroke:#0f0"/>"#);
        assert_eq!(resolve_color_at(&d, NodeId(1)), Some(Color::new(0, 255, 0)));
    }

    #[test]
    fn no_real_paint_resolves_to_none() {
        let d = doc(r#"<rect fill="none" stroke="none"/>"#);
        assert_eq!(resolve_color_at(&d, NodeId(1)), None);
        assert_eq!(resolve_color_at(&d, NodeId(9)), None);
    }

    #[test]
    fn undeclared_paint_is_inherited() {
        let d = doc(r#"<g fill="teal"><rect/></g>"#);
        assert_eq!(resolve_color_at(&d, NodeId(2)), Some(Color::new(0, 128, 128)));
    }

    #[test]
    fn explicit_none_blocks_inheritance() {
        let d = doc(r#"<g fill="teal" stroke="red"><rect fill="none"/></g>"#);
        assert_eq!(resolve_color_at(&d, NodeId(2)), Some(Color::new(255, 0, 0)));
    }

    #[test]
    fn pick_returns_topmost_shape() {
        let d = doc(
            r#"<rect x="0" y="0" width="50" height="50" fill="red"/>
               <circle cx="25" cy="25" r="10" fill="blue"/>"#,
        );
        assert_eq!(pick_at(&d, Point::new(25.0, 25.0)), Some(NodeId(2)));
        assert_eq!(pick_at(&d, Point::new(2.0, 2.0)), Some(NodeId(1)));
        assert_eq!(pick_at(&d, Point::new(90.0, 90.0)), None);
    }

    #[test]
    fn pick_honors_transforms() {
        let d = doc(r#"<g transform="translate(50 50)"><rect width="10" height="10" fill="red" stroke-width="0"/></g>"#);
        assert_eq!(pick_at(&d, Point::new(55.0, 55.0)), Some(NodeId(2)));
        assert_eq!(pick_at(&d, Point::new(5.0, 5.0)), None);
    }

    #[test]
    fn pick_skips_defs_and_unpainted_shapes() {
        let d = doc(
            r#"<defs><rect width="100" height="100" fill="red"/></defs>
               <rect width="100" height="100" fill="none"/>"#,
        );
        assert_eq!(pick_at(&d, Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn pick_resolves_relative_lengths() {
        let d = Document::parse(
            r#"<svg width="100" height="100"><rect width="50%" height="50%" fill="red"/><circle cx="80" cy="80" r="1em" fill="blue"/></svg>"#,
        )
        .unwrap();
        assert_eq!(pick_at(&d, Point::new(10.0, 10.0)), Some(NodeId(1)));
        assert_eq!(pick_at(&d, Point::new(80.0, 80.0)), Some(NodeId(2)));
        assert_eq!(pick_at(&d, Point::new(60.0, 20.0)), None);
    }

    #[test]
    fn scene_reports_canvas_and_paint_order() {
        let d = doc(
            r#"<rect width="50" height="50" fill="red"/>
               <rect width="20" height="20" fill="none" stroke="none"/>
               <circle cx="10" cy="10" r="5" fill="blue"/>"#,
        );
        let scene = Scene::build(&d).unwrap();
        assert_eq!(scene.canvas(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(scene.pick(&d, Point::new(10.0, 10.0)), Some(NodeId(3)));
        assert_eq!(scene.hits(Point::new(40.0, 40.0)), vec![NodeId(1)]);
    }

    #[test]
    fn existing_ids_are_kept() {
        let d = doc(r##"<linearGradient id="g"><stop offset="0" stop-color="red"/></linearGradient><rect id="box" width="10" height="10" fill="url(#g)" stroke="blue"/>"##);
        let scene = Scene::build(&d).unwrap();
        assert_eq!(scene.hits(Point::new(5.0, 5.0)), vec![NodeId(3)]);
        assert_eq!(scene.pick(&d, Point::new(5.0, 5.0)), Some(NodeId(3)));
    }

    #[test]
    fn pick_maps_view_box_to_canvas() {
        let d = Document::parse(
            r#"<svg width="200" height="200" viewBox="0 0 100 100"><rect x="50" y="50" width="10" height="10" fill="red"/></svg>"#,
        )
        .unwrap();
        assert_eq!(pick_at(&d, Point::new(110.0, 110.0)), Some(NodeId(1)));
        assert_eq!(pick_at(&d, Point::new(55.0, 55.0)), None);
    }
}
