//! Window front end: module grid and full-screen presentation.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

use raylib::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::content::Curriculum;
use crate::engine::Engine;
use crate::ffmpeg::FfmpegVideo;
use crate::i18n::{Language, LanguageSession};
use crate::media::{MediaCatalog, MediaItem};
use crate::presentation::{KeyOutcome, Presentation, PresentationKey, Slide, build_deck};
use crate::slide::{FOOTER_HEIGHT, MARGIN, Rect, SlideLayout, apply_transform, fit_within, wrap_text};
use crate::stage::MediaStage;
use crate::state::ScreenState;
use crate::texture_loader::load_texture_with_exif_rotation;
use crate::viewport::Vec2;

const BACKGROUND: Color = Color { r: 15, g: 23, b: 42, a: 255 };
const PANEL: Color = Color { r: 30, g: 41, b: 59, a: 255 };
const ACCENT: Color = Color { r: 59, g: 130, b: 246, a: 255 };
const TEXT: Color = Color { r: 241, g: 245, b: 249, a: 255 };
const MUTED: Color = Color { r: 148, g: 163, b: 184, a: 255 };

const TITLE_SIZE: f32 = 36.0;
const BODY_SIZE: f32 = 22.0;
const SMALL_SIZE: f32 = 16.0;
const FONT_SPACING: f32 = 1.0;
const LINE_GAP: f32 = 6.0;

const FADE_DURATION: f32 = 0.25;            // Slide change fade-in (seconds)
const ARROW_ZONE: f32 = 48.0;               // Clickable carousel arrow strip width
const PLACEHOLDER_SIZE: Vec2 = Vec2::new(16.0, 9.0);
const GRID_COLUMNS: usize = 4;

// Held with the wheel to zoom: Ctrl, or Cmd on macOS
const ZOOM_MODIFIERS: [KeyboardKey; 4] = [
    KeyboardKey::KEY_LEFT_CONTROL,
    KeyboardKey::KEY_RIGHT_CONTROL,
    KeyboardKey::KEY_LEFT_SUPER,
    KeyboardKey::KEY_RIGHT_SUPER,
];

fn to_vec2(v: Vector2) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn to_rectangle(r: Rect) -> Rectangle {
    Rectangle::new(r.origin.x, r.origin.y, r.size.x, r.size.y)
}

/// Characters the custom font must cover.
fn glyph_set(curriculum: &Curriculum, language: &LanguageSession) -> String {
    let mut glyphs: BTreeSet<char> = (' '..='~').collect();
    let mut add = |s: &str| glyphs.extend(s.chars());
    language.translator().all_strings().for_each(&mut add);
    for module in curriculum.modules() {
        add(&module.display_text());
    }
    glyphs.into_iter().collect()
}

pub struct Presenter {
    settings: Settings,
    curriculum: Curriculum,
    catalog: MediaCatalog,
    language: LanguageSession,

    state: ScreenState,
    opened_from_grid: bool,
    module: Option<usize>,
    presentation: Option<Presentation<FfmpegVideo>>,

    font: Option<Font>,
    images: HashMap<String, Option<Texture2D>>,
    video_frames: HashMap<String, Texture2D>,
    failed_videos: HashSet<String>,

    clock: Duration,                // Monotonic time for double tap detection
    touch_count: usize,
    fade: Option<ease::Tween>,
}

impl Presenter {
    pub fn new(
        settings: Settings,
        curriculum: Curriculum,
        catalog: MediaCatalog,
        language: LanguageSession,
        start_module: Option<usize>,
    ) -> Self {
        Self {
            settings,
            curriculum,
            catalog,
            language,
            state: ScreenState::ModuleGrid,
            opened_from_grid: start_module.is_none(),
            module: start_module,
            presentation: None,
            font: None,
            images: HashMap::new(),
            video_frames: HashMap::new(),
            failed_videos: HashSet::new(),
            clock: Duration::ZERO,
            touch_count: 0,
            fade: None,
        }
    }

    fn open_module(&mut self, index: usize) {
        let Some(module) = self.curriculum.modules().get(index) else {
            return;
        };
        let deck = build_deck(module, &self.catalog, self.language.translator());
        let carousel = &self.settings.carousel;
        match Presentation::new(deck, carousel.interval(), carousel.auto_play) {
            Ok(presentation) => {
                info!(module = %module.id, "Presenting module");
                self.presentation = Some(presentation);
                self.module = Some(index);
                self.state = ScreenState::Presenting;
                self.start_fade();
            }
            Err(e) => warn!(module = %module.id, error = %e, "Cannot open presentation"),
        }
    }

    fn close_presentation(&mut self) {
        // Dropping the presentation stops its decoders
        self.presentation = None;
        self.video_frames.clear();
        self.failed_videos.clear();
        self.state = self.state.after_close(self.opened_from_grid);
        debug!(state = ?self.state, "Presentation closed");
    }

    fn toggle_language(&mut self) {
        match self.language.toggle() {
            Ok(language) => info!(%language, "Language switched"),
            Err(e) => warn!(error = %e, "Language switched but could not be saved"),
        }
        if self.language.language() == Language::Chinese && self.font.is_none() {
            warn!("No font configured, Chinese text needs [window] font");
        }
        let (Some(presentation), Some(module)) =
            (self.presentation.as_mut(), self.module.and_then(|i| self.curriculum.modules().get(i)))
        else {
            return;
        };
        presentation.relabel(build_deck(module, &self.catalog, self.language.translator()));
    }

    fn start_fade(&mut self) {
        self.fade = Some(ease::Tween::new(ease::cubic_out, 0.0, 1.0, FADE_DURATION));
    }

    // --- Text helpers ---

    fn measure(&self, rl: &RaylibHandle, text: &str, size: f32) -> f32 {
        match &self.font {
            Some(font) => font.measure_text(text, size, FONT_SPACING).x,
            None => rl.get_font_default().measure_text(text, size, FONT_SPACING).x,
        }
    }

    fn draw_text(&self, d: &mut RaylibDrawHandle, text: &str, pos: Vec2, size: f32, color: Color) {
        let pos = Vector2::new(pos.x, pos.y);
        match &self.font {
            Some(font) => d.draw_text_ex(font, text, pos, size, FONT_SPACING, color),
            None => {
                let font = d.get_font_default();
                d.draw_text_ex(&font, text, pos, size, FONT_SPACING, color);
            }
        }
    }

    /// Wrapped paragraph inside `area`. Returns the y below the last line.
    fn draw_paragraph(&self, d: &mut RaylibDrawHandle, text: &str, area: Rect, y: f32, size: f32, color: Color) -> f32 {
        let lines = wrap_text(text, area.size.x, |s| self.measure(d, s, size));
        let mut y = y;
        for line in lines {
            if y + size > area.origin.y + area.size.y {
                break;
            }
            self.draw_text(d, &line, Vec2::new(area.origin.x, y), size, color);
            y += size + LINE_GAP;
        }
        y
    }

    fn draw_bullets(&self, d: &mut RaylibDrawHandle, items: &[String], area: Rect, y: f32, size: f32) -> f32 {
        let indent = size;
        let inner = Rect::new(area.origin.x + indent, area.origin.y, area.size.x - indent, area.size.y);
        let mut y = y;
        for item in items {
            self.draw_text(d, "•", Vec2::new(area.origin.x, y), size, ACCENT);
            y = self.draw_paragraph(d, item, inner, y, size, TEXT) + LINE_GAP;
        }
        y
    }

    fn draw_centered(&self, d: &mut RaylibDrawHandle, text: &str, center_x: f32, y: f32, size: f32, color: Color) {
        let width = self.measure(d, text, size);
        self.draw_text(d, text, Vec2::new(center_x - width / 2.0, y), size, color);
    }

    // --- Media ---

    fn ensure_image(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread, item: &MediaItem) {
        if item.is_video() || self.images.contains_key(item.path()) {
            return;
        }
        let path = self.settings.content.resolve_media(item.path());
        let texture = match load_texture_with_exif_rotation(rl, thread, &path) {
            Ok(texture) => Some(texture),
            Err(e) => {
                warn!(path = item.path(), error = %e, "Image unavailable");
                None
            }
        };
        self.images.insert(item.path().to_string(), texture);
    }

    fn ensure_video(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread, item: &MediaItem) {
        let path = item.path();
        let Some(stage) = self.presentation.as_mut().and_then(Presentation::stage_mut) else {
            return;
        };
        if stage.carousel().has_video(path) || self.failed_videos.contains(path) {
            return;
        }
        let video = match FfmpegVideo::open(self.settings.content.resolve_media(path)) {
            Ok(video) => video,
            Err(e) => {
                warn!(path, error = %e, "Video unavailable");
                self.failed_videos.insert(path.to_string());
                return;
            }
        };
        let (w, h) = video.size();
        let blank = Image::gen_image_color(w as i32, h as i32, Color::BLACK);
        match rl.load_texture_from_image(thread, &blank) {
            Ok(texture) => {
                self.video_frames.insert(path.to_string(), texture);
                stage.carousel_mut().attach_video(path, video);
            }
            Err(e) => {
                warn!(path, error = %e, "Cannot allocate video texture");
                self.failed_videos.insert(path.to_string());
            }
        }
    }

    fn upload_video_frame(&mut self) {
        let Some(stage) = self.presentation.as_mut().and_then(Presentation::stage_mut) else {
            return;
        };
        let path = stage.active_item().path().to_string();
        let Some(video) = stage.carousel_mut().video_mut(&path) else {
            return;
        };
        if !video.poll() {
            return;
        }
        if let (Some(frame), Some(texture)) = (video.frame(), self.video_frames.get_mut(&path)) {
            if let Err(e) = texture.update_texture(frame) {
                debug!(%path, error = %e, "Dropped video frame");
            }
        }
    }

    /// Size of the active media at its natural resolution.
    fn media_size(&self, stage: &MediaStage<FfmpegVideo>) -> Vec2 {
        let item = stage.active_item();
        if item.is_video() {
            return match stage.carousel().video(item.path()) {
                Some(video) => Vec2::new(video.size().0 as f32, video.size().1 as f32),
                None => PLACEHOLDER_SIZE,
            };
        }
        match self.images.get(item.path()) {
            Some(Some(texture)) => Vec2::new(texture.width() as f32, texture.height() as f32),
            _ => PLACEHOLDER_SIZE,
        }
    }

    fn media_texture(&self, item: &MediaItem) -> Option<&Texture2D> {
        if item.is_video() {
            self.video_frames.get(item.path())
        } else {
            self.images.get(item.path()).and_then(Option::as_ref)
        }
    }

    // --- Input ---

    fn presentation_key(rl: &RaylibHandle) -> Option<PresentationKey> {
        use KeyboardKey::*;
        let pressed = |keys: &[KeyboardKey]| keys.iter().any(|k| rl.is_key_pressed(*k));
        if pressed(&[KEY_RIGHT, KEY_PAGE_DOWN]) {
            Some(PresentationKey::Next)
        } else if pressed(&[KEY_LEFT, KEY_PAGE_UP]) {
            Some(PresentationKey::Previous)
        } else if pressed(&[KEY_ESCAPE]) {
            Some(PresentationKey::Escape)
        } else if pressed(&[KEY_L]) {
            Some(PresentationKey::ToggleLanguage)
        } else if pressed(&[KEY_SPACE]) {
            Some(PresentationKey::TogglePlayback)
        } else if pressed(&[KEY_EQUAL, KEY_KP_ADD]) {
            Some(PresentationKey::ZoomIn)
        } else if pressed(&[KEY_MINUS, KEY_KP_SUBTRACT]) {
            Some(PresentationKey::ZoomOut)
        } else if pressed(&[KEY_ZERO, KEY_KP_0]) {
            Some(PresentationKey::ZoomReset)
        } else {
            None
        }
    }

    fn handle_presentation_input(&mut self, rl: &RaylibHandle, layout: &SlideLayout) {
        if let Some(key) = Self::presentation_key(rl) {
            let outcome = match self.presentation.as_mut() {
                Some(presentation) => presentation.handle_key(key),
                None => KeyOutcome::Ignored,
            };
            match outcome {
                KeyOutcome::Handled => {
                    if matches!(key, PresentationKey::Next | PresentationKey::Previous) {
                        self.start_fade();
                    }
                }
                KeyOutcome::LanguageRequested => self.toggle_language(),
                KeyOutcome::Close => {
                    self.close_presentation();
                    return;
                }
                KeyOutcome::Ignored => {}
            }
        }

        let clock = self.clock;
        let Some(presentation) = self.presentation.as_mut() else {
            return;
        };
        let area = layout.media;
        let mouse = to_vec2(rl.get_mouse_position());
        let Some(stage) = presentation.stage_mut() else {
            return;
        };

        stage.set_hovered(area.contains(mouse));

        // Two or more fingers: pinch. Single touches arrive as mouse events.
        let touch_count = rl.get_touch_point_count() as usize;
        if touch_count >= 2 {
            let touches: Vec<Vec2> = (0..touch_count)
                .map(|i| area.to_local(to_vec2(rl.get_touch_position(i as u32))))
                .collect();
            if self.touch_count < 2 {
                stage.viewport_mut().touch_start(&touches, clock);
            } else {
                stage.viewport_mut().touch_move(&touches);
            }
            self.touch_count = touch_count;
            return;
        } else if self.touch_count >= 2 {
            stage.viewport_mut().touch_end();
        }
        self.touch_count = touch_count;

        let local = area.to_local(mouse);
        if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) && area.contains(mouse) {
            if stage.carousel().has_controls() && local.x < ARROW_ZONE {
                stage.previous();
            } else if stage.carousel().has_controls() && local.x > area.size.x - ARROW_ZONE {
                stage.next();
            } else {
                stage.viewport_mut().pointer_down(local, clock);
            }
        } else if rl.is_mouse_button_down(MouseButton::MOUSE_BUTTON_LEFT) {
            stage.viewport_mut().pointer_move(local);
        } else if rl.is_mouse_button_released(MouseButton::MOUSE_BUTTON_LEFT) {
            stage.viewport_mut().pointer_up();
        }

        let modifier = ZOOM_MODIFIERS.iter().any(|k| rl.is_key_down(*k));
        let wheel = rl.get_mouse_wheel_move();
        if area.contains(mouse) {
            // raylib reports wheel-up as positive, the viewport expects DOM deltaY
            stage.viewport_mut().wheel(-wheel, local, modifier);
        }
    }

    fn card_rects(&self, width: f32, height: f32) -> Vec<Rect> {
        let count = self.curriculum.modules().len();
        let rows = count.div_ceil(GRID_COLUMNS).max(1);
        let top = 120.0;
        let cell_w = (width - MARGIN * (GRID_COLUMNS as f32 + 1.0)) / GRID_COLUMNS as f32;
        let cell_h = (height - top - FOOTER_HEIGHT - MARGIN * rows as f32) / rows as f32;
        (0..count)
            .map(|i| {
                let (row, col) = (i / GRID_COLUMNS, i % GRID_COLUMNS);
                Rect::new(
                    MARGIN + col as f32 * (cell_w + MARGIN),
                    top + row as f32 * (cell_h + MARGIN),
                    cell_w,
                    cell_h,
                )
            })
            .collect()
    }

    fn handle_grid_input(&mut self, rl: &RaylibHandle) {
        if rl.is_key_pressed(KeyboardKey::KEY_ESCAPE) {
            self.state = ScreenState::Closing;
            return;
        }
        if rl.is_key_pressed(KeyboardKey::KEY_L) {
            self.toggle_language();
        }
        let digits = [
            KeyboardKey::KEY_ONE,
            KeyboardKey::KEY_TWO,
            KeyboardKey::KEY_THREE,
            KeyboardKey::KEY_FOUR,
            KeyboardKey::KEY_FIVE,
            KeyboardKey::KEY_SIX,
            KeyboardKey::KEY_SEVEN,
            KeyboardKey::KEY_EIGHT,
            KeyboardKey::KEY_NINE,
        ];
        if let Some(index) = digits.iter().position(|k| rl.is_key_pressed(*k)) {
            self.opened_from_grid = true;
            self.open_module(index);
            return;
        }
        if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
            let mouse = to_vec2(rl.get_mouse_position());
            let cards = self.card_rects(rl.get_screen_width() as f32, rl.get_screen_height() as f32);
            if let Some(index) = cards.iter().position(|r| r.contains(mouse)) {
                self.opened_from_grid = true;
                self.open_module(index);
            }
        }
    }

    // --- Update ---

    fn update_presentation(&mut self, dt: f32, rl: &mut RaylibHandle, thread: &RaylibThread, layout: &SlideLayout) {
        let Some(presentation) = self.presentation.as_mut() else {
            return;
        };
        presentation.tick(Duration::from_secs_f32(dt));
        let Some(stage) = presentation.stage() else {
            return;
        };
        let items: Vec<MediaItem> = stage.carousel().sequence().items().to_vec();
        let active = stage.active_item().clone();

        for item in &items {
            self.ensure_image(rl, thread, item);
        }
        if active.is_video() {
            self.ensure_video(rl, thread, &active);
            self.upload_video_frame();
        }

        let size = self.presentation.as_ref().and_then(Presentation::stage).map(|s| self.media_size(s));
        if let (Some(size), Some(stage)) = (size, self.presentation.as_mut().and_then(Presentation::stage_mut)) {
            let fitted = fit_within(size, layout.media);
            stage.set_geometry(fitted.size, layout.media.size);
        }
    }

    // --- Drawing ---

    fn draw_media(&self, d: &mut RaylibDrawHandle, stage: &MediaStage<FfmpegVideo>, area: Rect) {
        d.draw_rectangle_rec(to_rectangle(area), PANEL);
        let item = stage.active_item();
        let fitted = fit_within(self.media_size(stage), area);
        let dest = apply_transform(fitted, area, stage.viewport().transform());

        match self.media_texture(item) {
            Some(texture) => {
                let mut s = d.begin_scissor_mode(
                    area.origin.x as i32,
                    area.origin.y as i32,
                    area.size.x as i32,
                    area.size.y as i32,
                );
                s.draw_texture_pro(
                    texture,
                    Rectangle::new(0.0, 0.0, texture.width() as f32, texture.height() as f32),
                    to_rectangle(dest),
                    Vector2::zero(),
                    0.0,
                    Color::WHITE,
                );
            }
            None => {
                let center_x = area.origin.x + area.size.x / 2.0;
                let y = area.origin.y + area.size.y / 2.0 - BODY_SIZE / 2.0;
                self.draw_centered(d, self.language.t("viewer.unavailable"), center_x, y, BODY_SIZE, MUTED);
            }
        }

        let carousel = stage.carousel();
        if item.is_video() && !carousel.state().is_playing {
            self.draw_text(d, self.language.t("viewer.paused"), area.origin + Vec2::new(12.0, 12.0), SMALL_SIZE, TEXT);
        }
        if carousel.has_controls() {
            let mid_y = area.origin.y + area.size.y / 2.0 - TITLE_SIZE / 2.0;
            self.draw_text(d, "<", Vec2::new(area.origin.x + 14.0, mid_y), TITLE_SIZE, TEXT);
            self.draw_text(d, ">", Vec2::new(area.origin.x + area.size.x - 30.0, mid_y), TITLE_SIZE, TEXT);

            let len = carousel.sequence().len();
            let dots_y = area.origin.y + area.size.y - 16.0;
            let start_x = area.origin.x + area.size.x / 2.0 - (len as f32 - 1.0) * 9.0;
            for i in 0..len {
                let color = if i == carousel.active_index() { TEXT } else { MUTED };
                d.draw_circle_v(Vector2::new(start_x + i as f32 * 18.0, dots_y), 4.0, color);
            }
            let label = carousel.position_label();
            let width = self.measure(d, &label, SMALL_SIZE);
            self.draw_text(
                d,
                &label,
                Vec2::new(area.origin.x + area.size.x - width - 12.0, area.origin.y + 12.0),
                SMALL_SIZE,
                TEXT,
            );
        }
    }

    fn draw_header(&self, d: &mut RaylibDrawHandle, layout: &SlideLayout, title: &str) {
        d.draw_rectangle_rec(to_rectangle(layout.header), PANEL);
        let y = layout.header.origin.y + (layout.header.size.y - TITLE_SIZE) / 2.0;
        self.draw_text(d, title, Vec2::new(MARGIN, y), TITLE_SIZE, TEXT);
    }

    fn draw_slide(&self, d: &mut RaylibDrawHandle, layout: &SlideLayout, presentation: &Presentation<FfmpegVideo>) {
        let Some(slide) = presentation.deck().active() else {
            return;
        };
        let center_x = layout.body.origin.x + layout.body.size.x / 2.0;
        match slide {
            Slide::Cover { title, description } => {
                let y = layout.body.origin.y + layout.body.size.y / 3.0;
                self.draw_centered(d, title, center_x, y, TITLE_SIZE * 1.4, TEXT);
                let text = Rect::new(
                    layout.body.origin.x + layout.body.size.x * 0.15,
                    layout.body.origin.y,
                    layout.body.size.x * 0.7,
                    layout.body.size.y,
                );
                self.draw_paragraph(d, description, text, y + TITLE_SIZE * 2.0, BODY_SIZE, MUTED);
            }
            Slide::Title { title } => {
                let y = layout.body.origin.y + layout.body.size.y / 2.0 - TITLE_SIZE;
                self.draw_centered(d, title, center_x, y, TITLE_SIZE * 1.4, TEXT);
            }
            Slide::Content { title, body } => {
                self.draw_header(d, layout, title);
                self.draw_paragraph(d, body, layout.body, layout.body.origin.y + MARGIN, BODY_SIZE, TEXT);
            }
            Slide::List { title, items } => {
                self.draw_header(d, layout, title);
                self.draw_bullets(d, items, layout.body, layout.body.origin.y + MARGIN, BODY_SIZE);
            }
            Slide::Image { title, caption, body, .. } => {
                self.draw_header(d, layout, title);
                if let Some(stage) = presentation.stage() {
                    self.draw_media(d, stage, layout.media);
                }
                let y = self.draw_paragraph(d, caption, layout.text, layout.text.origin.y, SMALL_SIZE, MUTED);
                if body != caption {
                    self.draw_paragraph(d, body, layout.text, y + LINE_GAP, BODY_SIZE, TEXT);
                }
            }
            Slide::LedType(led) => {
                self.draw_header(d, layout, &led.name);
                if let Some(stage) = presentation.stage() {
                    self.draw_media(d, stage, layout.media);
                }
                let area = layout.text;
                let mut y = area.origin.y;
                if let Some(caption) = &led.caption {
                    y = self.draw_paragraph(d, caption, area, y, SMALL_SIZE, MUTED) + LINE_GAP;
                }
                y = self.draw_paragraph(d, &led.description, area, y, SMALL_SIZE, TEXT) + LINE_GAP;
                self.draw_text(d, self.language.t("deck.keyFeatures"), Vec2::new(area.origin.x, y), BODY_SIZE, ACCENT);
                y = self.draw_bullets(d, &led.features, area, y + BODY_SIZE + LINE_GAP, SMALL_SIZE);
                self.draw_text(d, self.language.t("deck.applications"), Vec2::new(area.origin.x, y), BODY_SIZE, ACCENT);
                self.draw_bullets(d, &led.applications, area, y + BODY_SIZE + LINE_GAP, SMALL_SIZE);
            }
        }

        // Footer: close hint, gesture hint, counter
        let footer = layout.footer;
        let y = footer.origin.y + (footer.size.y - SMALL_SIZE) / 2.0;
        self.draw_text(d, self.language.t("deck.close"), Vec2::new(MARGIN, y), SMALL_SIZE, MUTED);
        if presentation.stage().is_some() {
            self.draw_centered(d, self.language.t("viewer.hint"), footer.size.x / 2.0, y, SMALL_SIZE, MUTED);
        }
        let (position, total) = presentation.deck().counter();
        let counter = format!("{position} / {total}");
        let width = self.measure(d, &counter, SMALL_SIZE);
        self.draw_text(d, &counter, Vec2::new(footer.size.x - width - MARGIN, y), SMALL_SIZE, TEXT);
    }

    fn draw_grid(&self, d: &mut RaylibDrawHandle, width: f32, height: f32) {
        let t = self.language.translator();
        self.draw_centered(d, t.t("modules.title"), width / 2.0, 28.0, TITLE_SIZE, TEXT);
        self.draw_centered(d, t.t("modules.clickToLearn"), width / 2.0, 28.0 + TITLE_SIZE + 12.0, SMALL_SIZE, MUTED);

        for (i, (module, card)) in self.curriculum.modules().iter().zip(self.card_rects(width, height)).enumerate() {
            d.draw_rectangle_rounded(to_rectangle(card), 0.08, 8, PANEL);
            let inner = Rect::new(card.origin.x + 14.0, card.origin.y + 14.0, card.size.x - 28.0, card.size.y - 28.0);
            let title = format!("{}. {}", i + 1, module.title);
            let mut y = self.draw_paragraph(d, &title, inner, inner.origin.y, BODY_SIZE, TEXT) + LINE_GAP;
            y = self.draw_paragraph(d, &module.description, inner, y, SMALL_SIZE, MUTED) + LINE_GAP;
            let (shown, more) = module.preview_topics();
            y = self.draw_bullets(d, shown, inner, y, SMALL_SIZE);
            if more > 0 {
                let line = format!("+{more} {}", t.t("modules.moreTopics"));
                self.draw_text(d, &line, Vec2::new(inner.origin.x, y), SMALL_SIZE, ACCENT);
            }
        }

        let hint = format!("L: {}", self.language.language().other());
        let y = height - FOOTER_HEIGHT + (FOOTER_HEIGHT - SMALL_SIZE) / 2.0;
        self.draw_text(d, &hint, Vec2::new(MARGIN, y), SMALL_SIZE, MUTED);
    }
}

impl Engine for Presenter {
    fn initialize(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread) -> anyhow::Result<()> {
        // Escape unzooms and closes presentations, never the window
        rl.set_exit_key(None);

        if let Some(path) = self.settings.window.font.clone() {
            let glyphs = glyph_set(&self.curriculum, &self.language);
            let path_str = path.to_string_lossy();
            match rl.load_font_ex(thread, &path_str, TITLE_SIZE as i32 * 2, Some(glyphs.as_str())) {
                Ok(font) => {
                    info!(path = %path.display(), glyphs = glyphs.chars().count(), "Loaded font");
                    self.font = Some(font);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Falling back to the built-in font"),
            }
        } else if self.language.language() == Language::Chinese {
            warn!("No font configured, Chinese text needs [window] font");
        }

        if let Some(index) = self.module {
            self.open_module(index);
        }
        Ok(())
    }

    fn render_frame(&mut self, dt: f32, rl: &mut RaylibHandle, thread: &RaylibThread) -> bool {
        self.clock += Duration::from_secs_f32(dt);
        let (width, height) = (rl.get_screen_width() as f32, rl.get_screen_height() as f32);
        let layout = SlideLayout::new(width, height);

        match self.state {
            ScreenState::ModuleGrid => self.handle_grid_input(rl),
            ScreenState::Presenting => {
                self.handle_presentation_input(rl, &layout);
                self.update_presentation(dt, rl, thread, &layout);
            }
            ScreenState::Closing => {}
        }
        if self.state == ScreenState::Closing {
            return false;
        }

        let alpha = self.fade.as_mut().map_or(1.0, |fade| fade.apply(dt)).clamp(0.0, 1.0);

        let mut d = rl.begin_drawing(thread);
        d.clear_background(BACKGROUND);
        match (&self.state, &self.presentation) {
            (ScreenState::Presenting, Some(presentation)) => self.draw_slide(&mut d, &layout, presentation),
            _ => self.draw_grid(&mut d, width, height),
        }
        if alpha < 1.0 {
            let shade = ((1.0 - alpha) * 255.0) as u8;
            d.draw_rectangle(0, 0, width as i32, height as i32, Color::new(BACKGROUND.r, BACKGROUND.g, BACKGROUND.b, shade));
        }
        true
    }
}

/// Open the window and run until it is closed.
pub fn run(
    settings: Settings,
    curriculum: Curriculum,
    catalog: MediaCatalog,
    language: LanguageSession,
    start_module: Option<usize>,
) -> anyhow::Result<()> {
    let (mut rl, thread) = raylib::init()
        .size(settings.window.width, settings.window.height)
        .title(language.t("nav.title"))
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(settings.window.fps);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    let mut presenter = Presenter::new(settings, curriculum, catalog, language, start_module);
    presenter.initialize(&mut rl, &thread)?;

    while !rl.window_should_close() {
        let dt = rl.get_frame_time();
        if !presenter.render_frame(dt, &mut rl, &thread) {
            break;
        }
    }
    info!("Window closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_zoom_accepts_control_and_command() {
        for key in [KeyboardKey::KEY_LEFT_CONTROL, KeyboardKey::KEY_RIGHT_SUPER, KeyboardKey::KEY_LEFT_SUPER] {
            assert!(ZOOM_MODIFIERS.contains(&key), "{key:?}");
        }
        assert!(!ZOOM_MODIFIERS.contains(&KeyboardKey::KEY_LEFT_SHIFT));
    }
}
