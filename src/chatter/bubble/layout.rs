//! Pure layout of a bubble on screen: box, text area and colours.
use bevy::prelude::*;

use super::components::Bubble;

/// Box styling shared by every bubble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleStyle {
    pub max_width: f32,
    pub padding: Vec2,
    pub font_size: f32,
}

impl Default for BubbleStyle {
    fn default() -> Self {
        Self {
            max_width: 200.0,
            padding: Vec2::new(10.0, 5.0),
            font_size: 13.0,
        }
    }
}

/// Measures text wrapped to a maximum line width, in pixels.
pub trait TextMeasure {
    fn measure(&self, text: &str, max_width: f32) -> Vec2;
}

/// Fixed-advance estimate of glyph metrics; good enough to size a UI box
/// before the text pipeline has run.
#[derive(Debug, Clone, Copy)]
pub struct GlyphEstimate {
    advance: f32,
    line_height: f32,
}

impl GlyphEstimate {
    pub fn for_font_size(font_size: f32) -> Self {
        let font_size = font_size.max(1.0);
        Self {
            advance: font_size * 0.55,
            line_height: font_size * 1.2,
        }
    }
}

impl TextMeasure for GlyphEstimate {
    /// Greedy word wrap; words wider than a line are split across lines.
    fn measure(&self, text: &str, max_width: f32) -> Vec2 {
        let max_width = max_width.max(self.advance);
        let mut widest: f32 = 0.0;
        let mut lines = 0u32;
        let mut current: Option<f32> = None;

        for word in text.split_whitespace() {
            let mut word_width = word.chars().count() as f32 * self.advance;

            if let Some(line_width) = current {
                let candidate = line_width + self.advance + word_width;
                if candidate <= max_width {
                    current = Some(candidate);
                    continue;
                }
                widest = widest.max(line_width);
                lines += 1;
            }

            while word_width > max_width {
                widest = max_width;
                lines += 1;
                word_width -= max_width;
            }
            current = Some(word_width);
        }

        if let Some(line_width) = current {
            widest = widest.max(line_width);
            lines += 1;
        }

        Vec2::new(widest, lines as f32 * self.line_height)
    }
}

/// Where and how to draw one bubble this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleLayout {
    /// Outer box in screen pixels, origin top-left.
    pub rect: Rect,
    /// Text area inside the padding; text is centred within it.
    pub text_rect: Rect,
    pub background: Color,
    pub foreground: Color,
    pub alpha: f32,
}

/// Lays out `bubble` with its bottom-centre at `anchor` (screen pixels, y down).
///
/// Returns `None` when the bubble is expired or fully transparent. Never mutates.
pub fn render_bubble(
    bubble: &Bubble,
    anchor: Vec2,
    now: f32,
    style: &BubbleStyle,
    measure: &impl TextMeasure,
) -> Option<BubbleLayout> {
    if !bubble.is_active(now) {
        return None;
    }
    let alpha = bubble.alpha_at(now);
    if alpha <= 0.0 {
        return None;
    }

    let text_size = measure.measure(bubble.text(), style.max_width);
    let text_width = text_size.x.min(style.max_width);
    let half_width = text_width / 2.0 + style.padding.x;
    let height = text_size.y + style.padding.y * 2.0;

    let rect = Rect::from_corners(
        Vec2::new(anchor.x - half_width, anchor.y - height),
        Vec2::new(anchor.x + half_width, anchor.y),
    );
    let text_rect = Rect::from_corners(rect.min + style.padding, rect.max - style.padding);

    Some(BubbleLayout {
        rect,
        text_rect,
        background: bubble.category().background_color().with_alpha(alpha),
        foreground: Color::BLACK.with_alpha(alpha),
        alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatter::bubble::components::{BubbleCategory, BubbleId, BubbleProfile};
    use crate::colony::components::ColonistId;

    struct FixedMeasure(Vec2);

    impl TextMeasure for FixedMeasure {
        fn measure(&self, _text: &str, _max_width: f32) -> Vec2 {
            self.0
        }
    }

    fn bubble(category: BubbleCategory, text: &str) -> Bubble {
        Bubble::new(
            BubbleId::new(0),
            Entity::PLACEHOLDER,
            ColonistId::new(0),
            text,
            category,
            0.0,
            BubbleProfile::default(),
        )
    }

    #[test]
    fn box_is_centred_above_anchor() {
        let style = BubbleStyle::default();
        let layout = render_bubble(
            &bubble(BubbleCategory::Chat, "Hi"),
            Vec2::new(400.0, 300.0),
            2.0,
            &style,
            &FixedMeasure(Vec2::new(60.0, 16.0)),
        )
        .expect("bubble is visible at t=2");

        assert_eq!(layout.rect.center().x, 400.0);
        assert_eq!(layout.rect.max.y, 300.0);
        assert_eq!(layout.rect.width(), 80.0);
        assert_eq!(layout.rect.height(), 26.0);
        assert_eq!(layout.text_rect.width(), 60.0);
        assert_eq!(layout.text_rect.height(), 16.0);
        assert_eq!(layout.alpha, 1.0);
    }

    #[test]
    fn width_is_clamped_to_style() {
        let style = BubbleStyle::default();
        let layout = render_bubble(
            &bubble(BubbleCategory::Joke, "long"),
            Vec2::ZERO,
            1.0,
            &style,
            &FixedMeasure(Vec2::new(900.0, 16.0)),
        )
        .unwrap();
        assert_eq!(layout.text_rect.width(), style.max_width);
    }

    #[test]
    fn colours_follow_category_and_alpha() {
        let style = BubbleStyle::default();
        let measure = GlyphEstimate::for_font_size(13.0);
        let layout = render_bubble(
            &bubble(BubbleCategory::Enthusiastic, "Yay"),
            Vec2::ZERO,
            0.075,
            &style,
            &measure,
        )
        .unwrap();
        assert!((layout.background.alpha() - 0.5).abs() < 1e-4);
        assert!((layout.foreground.alpha() - 0.5).abs() < 1e-4);

        let expected = Color::srgb(1.0, 0.7, 0.7).to_srgba();
        let actual = layout.background.to_srgba();
        assert!((actual.green - expected.green).abs() < 1e-4);
    }

    #[test]
    fn hidden_bubbles_have_no_layout() {
        let style = BubbleStyle::default();
        let measure = GlyphEstimate::for_font_size(13.0);
        let subject = bubble(BubbleCategory::Chat, "Hi");
        assert!(render_bubble(&subject, Vec2::ZERO, 0.0, &style, &measure).is_none());
        assert!(render_bubble(&subject, Vec2::ZERO, 4.5, &style, &measure).is_none());
    }

    #[test]
    fn estimate_wraps_words() {
        let measure = GlyphEstimate::for_font_size(10.0);
        // advance 5.5, line height 12
        let single = measure.measure("Hi", 200.0);
        assert!(single.abs_diff_eq(Vec2::new(11.0, 12.0), 1e-3));

        let wrapped = measure.measure("aaaa bbbb", 30.0);
        assert!(wrapped.abs_diff_eq(Vec2::new(22.0, 24.0), 1e-3));

        let empty = measure.measure("", 200.0);
        assert_eq!(empty, Vec2::ZERO);
    }

    #[test]
    fn estimate_splits_overlong_words() {
        let measure = GlyphEstimate::for_font_size(10.0);
        let split = measure.measure(&"x".repeat(20), 55.0);
        // 110px of glyphs over 55px lines.
        assert!((split.y - 24.0).abs() < 1e-3);
        assert!(split.x <= 55.0 + 1e-3);
    }
}
