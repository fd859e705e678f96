use crate::viewport::{Vec2, ViewTransform};

pub const HEADER_HEIGHT: f32 = 72.0;        // Slide title bar
pub const FOOTER_HEIGHT: f32 = 48.0;        // Counter, hints and carousel dots
pub const MARGIN: f32 = 24.0;
pub const MEDIA_SHARE: f32 = 0.6;           // Width of the media column on split slides

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { origin: Vec2::new(x, y), size: Vec2::new(w.max(0.0), h.max(0.0)) }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x < self.origin.x + self.size.x
            && p.y < self.origin.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// `p` relative to the top-left corner.
    pub fn to_local(&self, p: Vec2) -> Vec2 {
        p - self.origin
    }
}

/// Largest rect with the aspect of `content` that fits `area`, centered.
pub fn fit_within(content: Vec2, area: Rect) -> Rect {
    if content.x <= 0.0 || content.y <= 0.0 {
        return Rect { origin: area.origin, size: Vec2::ZERO };
    }
    let scale = (area.size.x / content.x).min(area.size.y / content.y);
    let size = content * scale;
    Rect {
        origin: area.origin + Vec2::new((area.size.x - size.x) / 2.0, (area.size.y - size.y) / 2.0),
        size,
    }
}

/// Where `fitted` ends up on screen under `transform`, which scales about
/// the centre of `area`.
pub fn apply_transform(fitted: Rect, area: Rect, transform: ViewTransform) -> Rect {
    let s = transform.scale();
    let centre = area.center();
    Rect {
        origin: centre + transform.translation() + (fitted.origin - centre) * s,
        size: fitted.size * s,
    }
}

/// Screen regions of one slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideLayout {
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
    /// Media column and text column on split slides.
    pub media: Rect,
    pub text: Rect,
}

impl SlideLayout {
    pub fn new(width: f32, height: f32) -> Self {
        let body_height = height - HEADER_HEIGHT - FOOTER_HEIGHT;
        let body = Rect::new(MARGIN, HEADER_HEIGHT, width - 2.0 * MARGIN, body_height);
        let media_width = body.size.x * MEDIA_SHARE;
        Self {
            header: Rect::new(0.0, 0.0, width, HEADER_HEIGHT),
            body,
            footer: Rect::new(0.0, height - FOOTER_HEIGHT, width, FOOTER_HEIGHT),
            media: Rect::new(body.origin.x, body.origin.y, media_width - MARGIN / 2.0, body.size.y),
            text: Rect::new(
                body.origin.x + media_width + MARGIN / 2.0,
                body.origin.y,
                body.size.x - media_width - MARGIN / 2.0,
                body.size.y,
            ),
        }
    }
}

/// Greedy word wrap. `measure` returns the rendered width of a string.
/// Explicit newlines are kept; an empty line stays empty.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() { word.to_string() } else { format!("{line} {word}") };
            if !line.is_empty() && measure(&candidate) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_keeps_aspect_and_centers() {
        let area = Rect::new(0.0, 0.0, 800.0, 400.0);
        let fitted = fit_within(Vec2::new(1920.0, 1080.0), area);
        assert!((fitted.size.y - 400.0).abs() < 1e-3);
        assert!((fitted.size.x - 711.111).abs() < 1e-2);
        assert!((fitted.origin.x - 44.444).abs() < 1e-2);
        assert_eq!(fitted.origin.y, 0.0);

        assert_eq!(fit_within(Vec2::ZERO, area).size, Vec2::ZERO);
    }

    #[test]
    fn identity_transform_leaves_rect_alone() {
        let area = Rect::new(10.0, 20.0, 400.0, 300.0);
        let fitted = Rect::new(10.0, 20.0, 400.0, 300.0);
        assert_eq!(apply_transform(fitted, area, ViewTransform::IDENTITY), fitted);
    }

    #[test]
    fn transform_anchor_stays_put() {
        let area = Rect::new(100.0, 100.0, 400.0, 300.0);
        let fitted = Rect::new(100.0, 100.0, 400.0, 300.0);
        // Screen point (150, 150) is (-150, -100) from the area centre
        let anchor = Vec2::new(-150.0, -100.0);
        let zoomed = ViewTransform::IDENTITY.zoom_about(2.0, anchor);
        let rect = apply_transform(fitted, area, zoomed);
        // Content point (50, 50) was under the anchor before zooming
        let screen = rect.origin + Vec2::new(50.0, 50.0) * 2.0;
        assert_eq!(screen, Vec2::new(150.0, 150.0));
    }

    #[test]
    fn double_tap_zoom_is_centred() {
        let area = Rect::new(0.0, 0.0, 400.0, 300.0);
        let rect = apply_transform(area, area, ViewTransform::new(2.0, Vec2::ZERO));
        assert_eq!(rect, Rect::new(-200.0, -150.0, 800.0, 600.0));
    }

    #[test]
    fn panned_content_still_covers_the_area() {
        let area = Rect::new(24.0, 72.0, 400.0, 300.0);
        let fitted = fit_within(Vec2::new(400.0, 300.0), area);
        for scale in [1.5, 2.0, 4.0] {
            let base = ViewTransform::new(scale, Vec2::ZERO);
            for far in [Vec2::new(1e4, 1e4), Vec2::new(-1e4, -1e4)] {
                let t = base.panned_to(far, fitted.size, area.size);
                let rect = apply_transform(fitted, area, t);
                let eps = 1e-3;
                assert!(rect.origin.x <= area.origin.x + eps, "{scale} {rect:?}");
                assert!(rect.origin.y <= area.origin.y + eps, "{scale} {rect:?}");
                assert!(rect.origin.x + rect.size.x >= area.origin.x + area.size.x - eps, "{scale} {rect:?}");
                assert!(rect.origin.y + rect.size.y >= area.origin.y + area.size.y - eps, "{scale} {rect:?}");
            }
        }
    }

    #[test]
    fn layout_columns_do_not_overlap() {
        let layout = SlideLayout::new(1280.0, 720.0);
        assert!(layout.media.origin.x + layout.media.size.x < layout.text.origin.x);
        assert_eq!(layout.body.size.y, 720.0 - HEADER_HEIGHT - FOOTER_HEIGHT);
        assert!(layout.body.contains(Vec2::new(640.0, 360.0)));
        assert!(!layout.body.contains(Vec2::new(640.0, 10.0)));
    }

    #[test]
    fn wrap_splits_on_width_and_newlines() {
        let measure = |s: &str| s.chars().count() as f32;
        let lines = wrap_text("one two three\n\nfour", 7.0, measure);
        assert_eq!(lines, ["one two", "three", "", "four"]);
        // A single long word is never split
        assert_eq!(wrap_text("abcdefghij", 4.0, measure), ["abcdefghij"]);
    }
}
