//! Badge Rendering
//!
//! Inline SVG progress bar for a [`WordCount`].

use crate::wordcount::WordCount;

/// Content type of rendered badges
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

const WIDTH: f64 = 200.0;
const HEIGHT: f64 = 20.0;

/// Renders a progress bar filled to `count.progress()` labelled with the
/// word total.
pub fn render_badge(count: &WordCount) -> String {
    let fill = (WIDTH * count.progress()).round();
    let label = format!("{} words", count.words);
    let percent = (count.progress() * 100.0).floor();

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" role="img" aria-label="{label}">
  <title>{label} of {goal} ({percent}%)</title>
  <rect width="{WIDTH}" height="{HEIGHT}" rx="3" fill="#555"/>
  <rect width="{fill}" height="{HEIGHT}" rx="3" fill="#4c1"/>
  <text x="{cx}" y="14" fill="#fff" font-family="Verdana,DejaVu Sans,sans-serif" font-size="11" text-anchor="middle">{label}</text>
</svg>
"##,
        goal = count.goal,
        cx = WIDTH / 2.0,
    )
}
