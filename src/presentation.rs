//! Full-screen slide deck built from one training module.

use std::time::Duration;

use tracing::{debug, info};

use crate::carousel::{CarouselError, VideoHandle};
use crate::content::{DetailSection, LedType, TrainingModule};
use crate::i18n::Translator;
use crate::media::{MediaCatalog, MediaSequence};
use crate::stage::MediaStage;

#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    Cover {
        title: String,
        description: String,
    },
    Title {
        title: String,
    },
    Content {
        title: String,
        body: String,
    },
    Image {
        title: String,
        caption: String,
        body: String,
        media: MediaSequence,
    },
    List {
        title: String,
        items: Vec<String>,
    },
    LedType(LedType),
}

impl Slide {
    pub fn title(&self) -> &str {
        match self {
            Slide::Cover { title, .. }
            | Slide::Title { title }
            | Slide::Content { title, .. }
            | Slide::Image { title, .. }
            | Slide::List { title, .. } => title,
            Slide::LedType(led) => &led.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Slide::Cover { .. } => "cover",
            Slide::Title { .. } => "title",
            Slide::Content { .. } => "content",
            Slide::Image { .. } => "image",
            Slide::List { .. } => "list",
            Slide::LedType(_) => "led-type",
        }
    }

    /// Media shown by this slide, if any. LED type slides show a single
    /// picture.
    pub fn media(&self) -> Option<MediaSequence> {
        match self {
            Slide::Image { media, .. } => Some(media.clone()),
            Slide::LedType(led) => led.media.as_ref().and_then(|m| MediaSequence::from_paths([m.as_str()])),
            _ => None,
        }
    }
}

fn section_slides(section: &DetailSection, catalog: &MediaCatalog, t: &Translator, out: &mut Vec<Slide>) {
    if let Some(media) = section.media() {
        let (description, caption) = match section {
            DetailSection::OverviewOnly { description, .. }
            | DetailSection::WithPixelPitchTable { description, .. }
            | DetailSection::WithComponentTable { description, .. } => {
                let caption = if description.is_empty() { section.title() } else { description.as_str() };
                (description.clone(), caption.to_string())
            }
            DetailSection::WithLedTypes { .. } => (String::new(), section.title().to_string()),
        };
        out.push(Slide::Image {
            title: section.title().to_string(),
            caption,
            body: description,
            media: catalog.sequence_for(media),
        });
    }

    match section {
        DetailSection::WithPixelPitchTable { title, rows, .. } => {
            out.push(Slide::Title { title: title.clone() });
            let (apps, distance) = (t.t("deck.applications"), t.t("deck.viewingDistance"));
            out.extend(rows.iter().map(|row| Slide::Content {
                title: row.pitch.clone(),
                body: row.summary(apps, distance),
            }));
        }
        DetailSection::WithComponentTable { title, components, .. } => {
            out.push(Slide::Title { title: title.clone() });
            let function = t.t("deck.function");
            out.extend(components.iter().map(|c| Slide::Content {
                title: c.name.clone(),
                body: c.summary(function),
            }));
        }
        DetailSection::OverviewOnly { title, description, media: None } if !description.is_empty() => {
            out.push(Slide::Content { title: title.clone(), body: description.clone() });
        }
        _ => {}
    }
}

/// Lay out the slides for `module`. Labels come from `t`, carousels from
/// `catalog`.
pub fn build_deck(module: &TrainingModule, catalog: &MediaCatalog, t: &Translator) -> Deck {
    let detail = module.detail();
    let mut slides = vec![Slide::Cover {
        title: module.title.clone(),
        description: module.description.clone(),
    }];

    if let Some(visual) = &detail.visual_overview {
        slides.push(Slide::Image {
            title: format!("{} - {}", module.title, t.t("deck.visualOverview")),
            caption: t.t("deck.visualOverviewCaption").to_string(),
            body: t.t("deck.visualOverviewBody").to_string(),
            media: catalog.sequence_for(visual),
        });
    }

    slides.push(Slide::Content {
        title: t.t("deck.overview").to_string(),
        body: detail.overview.clone(),
    });

    if !detail.key_points.is_empty() {
        slides.push(Slide::List {
            title: t.t("deck.keyPoints").to_string(),
            items: detail.key_points.clone(),
        });
    }

    for section in &detail.sections {
        if let DetailSection::WithLedTypes { title, types } = section {
            slides.push(Slide::Title { title: title.clone() });
            slides.extend(types.iter().cloned().map(Slide::LedType));
        }
    }

    let applications: Vec<&DetailSection> = detail
        .sections
        .iter()
        .filter(|s| !matches!(s, DetailSection::WithLedTypes { .. }))
        .collect();
    if !applications.is_empty() {
        let illustrated = applications.iter().any(|s| s.media().is_some() || s.has_table());
        if illustrated {
            slides.push(Slide::Title { title: t.t("deck.realWorld").to_string() });
            for section in &applications {
                section_slides(section, catalog, t, &mut slides);
            }
        } else {
            slides.push(Slide::List {
                title: t.t("deck.applications").to_string(),
                items: applications.iter().map(|s| s.title().to_string()).collect(),
            });
        }
    }

    slides.push(Slide::List {
        title: t.t("deck.topicsCovered").to_string(),
        items: module.topics.clone(),
    });

    debug!(module = %module.id, slides = slides.len(), "Built presentation deck");
    Deck::new(slides)
}

/// Slides plus the active position. Navigation stops at both ends.
#[derive(Debug, Clone)]
pub struct Deck {
    slides: Vec<Slide>,
    active: usize,
}

impl Deck {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides, active: 0 }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&Slide> {
        self.slides.get(self.active)
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.active + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.active.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    /// Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.slides.len() || index == self.active {
            return false;
        }
        self.active = index;
        true
    }

    pub fn is_first(&self) -> bool {
        self.active == 0
    }

    pub fn is_last(&self) -> bool {
        self.active + 1 >= self.slides.len()
    }

    /// One-based position and total, for the `n / total` counter.
    pub fn counter(&self) -> (usize, usize) {
        (self.active + 1, self.slides.len())
    }
}

/// Keys the presentation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationKey {
    Next,
    Previous,
    Escape,
    ToggleLanguage,
    TogglePlayback,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    /// Caller switches language and hands a relabelled deck to
    /// [`Presentation::relabel`].
    LanguageRequested,
    Close,
}

/// A deck with one live media stage per slide that shows media.
///
/// Only the active slide's stage receives time; stages of other slides are
/// silenced so their videos do not keep playing off screen.
pub struct Presentation<V> {
    deck: Deck,
    stages: Vec<Option<MediaStage<V>>>,
}

impl<V: VideoHandle> Presentation<V> {
    pub fn new(deck: Deck, interval: Duration, auto_play: bool) -> Result<Self, CarouselError> {
        let mut stages = Vec::with_capacity(deck.len());
        for slide in deck.slides() {
            let stage = match slide.media() {
                Some(sequence) => {
                    let mut stage = MediaStage::new(sequence);
                    stage.start(interval, auto_play)?;
                    Some(stage)
                }
                None => None,
            };
            stages.push(stage);
        }
        info!(slides = deck.len(), "Presentation opened");
        Ok(Self { deck, stages })
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn stage(&self) -> Option<&MediaStage<V>> {
        self.stages.get(self.deck.active_index()).and_then(Option::as_ref)
    }

    pub fn stage_mut(&mut self) -> Option<&mut MediaStage<V>> {
        let index = self.deck.active_index();
        self.stages.get_mut(index).and_then(Option::as_mut)
    }

    /// Swap in the same deck with new labels, keeping position and stages.
    /// A deck with a different shape is ignored.
    pub fn relabel(&mut self, deck: Deck) -> bool {
        if deck.len() != self.deck.len() {
            debug!(old = self.deck.len(), new = deck.len(), "Relabelled deck has a different shape");
            return false;
        }
        let active = self.deck.active_index();
        self.deck = deck;
        self.deck.go_to(active);
        true
    }

    fn navigate(&mut self, move_deck: impl FnOnce(&mut Deck) -> bool) -> bool {
        let before = self.deck.active_index();
        if !move_deck(&mut self.deck) {
            return false;
        }
        if let Some(Some(stage)) = self.stages.get_mut(before) {
            stage.viewport_mut().reset();
            stage.carousel_mut().silence();
        }
        if let Some(stage) = self.stage_mut() {
            stage.carousel_mut().wake();
        }
        debug!(slide = self.deck.active_index(), "Presentation slide changed");
        true
    }

    pub fn next(&mut self) -> bool {
        self.navigate(Deck::next)
    }

    pub fn previous(&mut self) -> bool {
        self.navigate(Deck::previous)
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        self.navigate(|deck| deck.go_to(index))
    }

    pub fn tick(&mut self, dt: Duration) {
        if let Some(stage) = self.stage_mut() {
            stage.tick(dt);
        }
    }

    pub fn handle_key(&mut self, key: PresentationKey) -> KeyOutcome {
        let handled = |done: bool| if done { KeyOutcome::Handled } else { KeyOutcome::Ignored };
        match key {
            PresentationKey::Next => handled(self.next()),
            PresentationKey::Previous => handled(self.previous()),
            PresentationKey::Escape => {
                let unzoomed = self.stage_mut().is_some_and(|stage| stage.viewport_mut().escape());
                if unzoomed { KeyOutcome::Handled } else { KeyOutcome::Close }
            }
            PresentationKey::ToggleLanguage => KeyOutcome::LanguageRequested,
            PresentationKey::TogglePlayback => match self.stage_mut() {
                Some(stage) if stage.active_item().is_video() => {
                    stage.carousel_mut().toggle_play_pause();
                    KeyOutcome::Handled
                }
                _ => KeyOutcome::Ignored,
            },
            PresentationKey::ZoomIn | PresentationKey::ZoomOut | PresentationKey::ZoomReset => {
                let Some(stage) = self.stage_mut() else {
                    return KeyOutcome::Ignored;
                };
                let viewport = stage.viewport_mut();
                match key {
                    PresentationKey::ZoomIn => viewport.zoom_in(),
                    PresentationKey::ZoomOut => viewport.zoom_out(),
                    _ => viewport.reset(),
                }
                KeyOutcome::Handled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::video::fake::RecordingVideo;
    use crate::content::Curriculum;
    use crate::i18n::Language;
    use crate::viewport::Vec2;

    const CATALOG: &str = include_str!("../assets/catalog.toml");
    const INTERVAL: Duration = Duration::from_millis(5000);

    fn fundamentals_deck(language: Language) -> Deck {
        let curriculum = Curriculum::builtin().unwrap();
        let catalog = MediaCatalog::from_toml(CATALOG).unwrap();
        build_deck(curriculum.find("fundamentals").unwrap(), &catalog, &Translator::new(language))
    }

    fn titles(deck: &Deck) -> Vec<&str> {
        deck.slides().iter().map(Slide::title).collect()
    }

    #[test]
    fn fundamentals_deck_order() {
        let deck = fundamentals_deck(Language::English);
        let titles = titles(&deck);
        assert_eq!(
            &titles[..9],
            [
                "LED Display Fundamentals",
                "LED Display Fundamentals - Visual Overview",
                "Overview",
                "Key Points",
                "Types of LEDs",
                "SMD (Surface Mount Device)",
                "COB (Chip on Board)",
                "GOB (Glue on Board)",
                "Real-World Applications",
            ]
        );
        assert_eq!(titles.last(), Some(&"Topics Covered"));
        assert!(matches!(deck.slides()[0], Slide::Cover { .. }));
    }

    #[test]
    fn application_sections_expand_into_slides() {
        let deck = fundamentals_deck(Language::English);
        let slides = deck.slides();

        let walls = slides.iter().find(|s| s.title() == "Indoor and outdoor video walls").unwrap();
        let Slide::Image { media, .. } = walls else { panic!("expected image slide") };
        assert_eq!(media.len(), 5);
        assert_eq!(media.items()[0].path(), "/Indoor and outdoor video walls.jpeg");

        let pitch = slides.iter().position(|s| s.title() == "Pixel Pitch & Resolution").unwrap();
        assert!(matches!(slides[pitch], Slide::Title { .. }));
        assert_eq!(
            slides[pitch + 1],
            Slide::Content {
                title: "P0.7–P1.2 mm".into(),
                body: "Ultra-fine pixel pitch displays provide exceptional image quality for close viewing \
                       applications where detail and clarity are paramount.\n\nApplications: Broadcast, \
                       control rooms, luxury retail\nViewing Distance: Very close (1–3 m)"
                    .into(),
            }
        );

        // Component section: carousel first, then title and one slide per component
        let structure: Vec<_> = slides
            .iter()
            .filter(|s| s.title() == "LED Display Structure & Components")
            .collect();
        assert_eq!(structure.len(), 2);
        assert!(matches!(structure[0], Slide::Image { media, .. } if media.len() == 7));
        assert!(matches!(structure[1], Slide::Title { .. }));
        assert!(slides.iter().any(|s| matches!(
            s,
            Slide::Content { title, body } if title == "Black Coating" && body.ends_with("Function: Contrast enhancement and surface protection")
        )));
    }

    #[test]
    fn plain_applications_become_a_list() {
        let curriculum = Curriculum::builtin().unwrap();
        let catalog = MediaCatalog::default();
        let deck = build_deck(curriculum.find("safety").unwrap(), &catalog, &Translator::new(Language::English));
        assert_eq!(titles(&deck), ["Safety Standards", "Overview", "Key Points", "Applications", "Topics Covered"]);
        assert!(matches!(&deck.slides()[3], Slide::List { items, .. } if items.len() == 4));
    }

    #[test]
    fn module_without_detail_uses_topics() {
        let curriculum = Curriculum::from_toml(
            "[[module]]\nid = \"x\"\ntitle = \"X\"\ndescription = \"About X\"\ntopics = [\"a\", \"b\"]\n",
        )
        .unwrap();
        let deck = build_deck(&curriculum.modules()[0], &MediaCatalog::default(), &Translator::new(Language::English));
        assert_eq!(titles(&deck), ["X", "Overview", "Key Points", "Topics Covered"]);
        assert_eq!(deck.slides()[1], Slide::Content { title: "Overview".into(), body: "About X".into() });
    }

    #[test]
    fn labels_follow_language() {
        let deck = fundamentals_deck(Language::Chinese);
        assert_eq!(deck.slides()[2].title(), "概述");
        assert_eq!(deck.len(), fundamentals_deck(Language::English).len());
    }

    #[test]
    fn deck_navigation_clamps() {
        let mut deck = Deck::new(vec![
            Slide::Title { title: "a".into() },
            Slide::Title { title: "b".into() },
            Slide::Title { title: "c".into() },
        ]);
        assert!(!deck.previous());
        assert_eq!(deck.counter(), (1, 3));
        assert!(deck.next());
        assert!(deck.next());
        assert!(!deck.next());
        assert!(deck.is_last());
        assert_eq!(deck.counter(), (3, 3));
        assert!(!deck.go_to(3));
        assert!(deck.go_to(0));
        assert!(deck.is_first());
    }

    fn presentation() -> Presentation<RecordingVideo> {
        Presentation::new(fundamentals_deck(Language::English), INTERVAL, true).unwrap()
    }

    #[test]
    fn only_media_slides_get_stages() {
        let mut p = presentation();
        assert!(p.stage().is_none());
        p.next();
        assert!(p.stage().is_some());
        p.next();
        assert!(p.stage().is_none());
    }

    #[test]
    fn escape_unzooms_before_closing() {
        let mut p = presentation();
        p.go_to(1);
        p.stage_mut().unwrap().set_geometry(Vec2::new(400.0, 300.0), Vec2::new(400.0, 300.0));
        assert_eq!(p.handle_key(PresentationKey::ZoomIn), KeyOutcome::Handled);
        assert!(p.stage().unwrap().viewport().is_zoomed());

        assert_eq!(p.handle_key(PresentationKey::Escape), KeyOutcome::Handled);
        assert!(!p.stage().unwrap().viewport().is_zoomed());
        assert_eq!(p.handle_key(PresentationKey::Escape), KeyOutcome::Close);
    }

    #[test]
    fn leaving_a_slide_resets_zoom_and_silences_videos() {
        let mut p = presentation();
        let structure = p
            .deck()
            .slides()
            .iter()
            .position(|s| matches!(s, Slide::Image { title, .. } if title == "LED Display Structure & Components"))
            .unwrap();
        p.go_to(structure);
        let stage = p.stage_mut().unwrap();
        let path = stage.active_item().path().to_string();
        stage.carousel_mut().attach_video(path.clone(), RecordingVideo::default());
        stage.viewport_mut().toggle_zoom();
        assert!(stage.carousel().state().is_playing);

        assert_eq!(p.handle_key(PresentationKey::Next), KeyOutcome::Handled);
        p.go_to(structure);
        let stage = p.stage().unwrap();
        assert!(!stage.viewport().is_zoomed());
        // Back on screen, the active video plays again
        assert!(stage.carousel().video(&path).unwrap().playing);
    }

    #[test]
    fn only_the_active_stage_advances() {
        let mut p = presentation();
        let walls = p
            .deck()
            .slides()
            .iter()
            .position(|s| s.title() == "Indoor and outdoor video walls")
            .unwrap();
        p.go_to(walls);
        p.tick(INTERVAL);
        assert_eq!(p.stage().unwrap().carousel().active_index(), 1);
        p.next();
        p.tick(INTERVAL * 3);
        p.previous();
        assert_eq!(p.stage().unwrap().carousel().active_index(), 1);
    }

    #[test]
    fn relabel_keeps_position() {
        let mut p = presentation();
        p.go_to(2);
        assert_eq!(p.handle_key(PresentationKey::ToggleLanguage), KeyOutcome::LanguageRequested);
        assert!(p.relabel(fundamentals_deck(Language::Chinese)));
        assert_eq!(p.deck().active_index(), 2);
        assert_eq!(p.deck().active().unwrap().title(), "概述");
        assert!(!p.relabel(Deck::new(Vec::new())));
    }

    #[test]
    fn playback_key_needs_a_video() {
        let mut p = presentation();
        assert_eq!(p.handle_key(PresentationKey::TogglePlayback), KeyOutcome::Ignored);
        assert_eq!(p.handle_key(PresentationKey::ZoomOut), KeyOutcome::Ignored);
    }
}
