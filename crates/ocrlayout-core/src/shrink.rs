//! Shrink outlines to their children
//!
//! Engines report loose block boxes. After segmentation every element with
//! children can take the joined outline of those children instead, clipped to
//! its original outline. Runs bottom-up so lines shrink before their regions.

use crate::error::Result;
use crate::model::{LayoutElement, Page};
use ocrlayout_geometry::{clip_polygon, join, Polygon};

/// Replace each non-leaf outline by the join of its children's outlines
///
/// # Errors
///
/// [`crate::LayoutError::Geometry`] when a join does not collapse to one polygon.
pub fn shrink_to_children(page: &mut Page, bridge_width: f64) -> Result<()> {
    for region in &mut page.regions {
        shrink_element(region, bridge_width)?;
    }
    Ok(())
}

fn shrink_element(element: &mut LayoutElement, bridge_width: f64) -> Result<()> {
    if element.children.is_empty() {
        return Ok(());
    }
    for child in &mut element.children {
        shrink_element(child, bridge_width)?;
    }

    let outlines: Vec<Polygon> = element
        .children
        .iter()
        .map(|child| child.polygon().clone())
        .collect();
    let joined = join(&outlines, bridge_width)?;
    match clip_polygon(&joined, element.polygon(), bridge_width)? {
        Some(shrunk) => element.set_polygon(shrunk),
        None => log::debug!("Children of {} lie outside it, keeping outline", element.id()),
    }
    Ok(())
}
