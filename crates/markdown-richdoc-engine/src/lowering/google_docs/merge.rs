use std::collections::HashMap;

use super::requests::{DocRange, Request};

/// Collapse text-style requests that target the same range into one.
///
/// A node such as a bold link is visited once but yields two independent
/// style facts over an identical range. The merged request keeps the
/// position of the first one; fields of later requests win on collision.
/// Paragraph styles and bullet presets pass through untouched.
pub fn merge_text_styles(formats: Vec<Request>) -> Vec<Request> {
    let mut out: Vec<Request> = Vec::with_capacity(formats.len());
    let mut by_range: HashMap<DocRange, usize> = HashMap::new();

    for format in formats {
        if let Request::UpdateTextStyle {
            text_style, range, ..
        } = &format
        {
            if let Some(&at) = by_range.get(range) {
                if let Request::UpdateTextStyle {
                    text_style: existing,
                    ..
                } = &mut out[at]
                {
                    existing.merge(text_style);
                }
                continue;
            }
            by_range.insert(*range, out.len());
        }
        out.push(format);
    }

    out
}
