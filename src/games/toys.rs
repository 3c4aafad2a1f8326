use crate::dragdrop::{DragDrop, DraggableItem, DropHandler, DropTarget, Gesture, GestureOutcome, InputSource};
use crate::games::Feedback;
use crate::modal::{Dialog, DialogAction};
use crate::scene::{Element, ElementId, Point, Rect, Scene};
use crate::sound::Cue;
use rand::Rng;
use rand::seq::SliceRandom;

const COPIES_PER_KIND: usize = 2;
const TOY_WIDTH: i32 = 6;
const TOY_HEIGHT: i32 = 3;
const BOX_WIDTH: i32 = 14;
const BOX_HEIGHT: i32 = 4;
const GAP: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToyKind
{
    Ball,
    Car,
    Doll,
    Block,
}

impl ToyKind
{
    pub const ALL: [ToyKind; 4] = [ToyKind::Ball, ToyKind::Car, ToyKind::Doll, ToyKind::Block];

    pub fn shape(self) -> &'static str
    {
        match self {
            ToyKind::Ball => "bola",
            ToyKind::Car => "mobil",
            ToyKind::Doll => "boneka",
            ToyKind::Block => "balok",
        }
    }

    pub fn emoji(self) -> &'static str
    {
        match self {
            ToyKind::Ball => "⚽",
            ToyKind::Car => "🚗",
            ToyKind::Doll => "🧸",
            ToyKind::Block => "🧱",
        }
    }

    pub fn box_emoji(self) -> &'static str
    {
        match self {
            ToyKind::Ball => "🥅",
            ToyKind::Car => "🏠",
            ToyKind::Doll => "🛏️",
            ToyKind::Block => "📦",
        }
    }
}

/// Decides what happens to a toy dropped on a box.
struct SortingRules
{
    toys_area: ElementId,
    finished: bool,
    feedback: Feedback,
}

impl DropHandler<ToyKind> for SortingRules
{
    fn on_drop(&mut self, scene: &mut Scene<ToyKind>, item: DraggableItem<ToyKind>, target: DropTarget<ToyKind>)
    {
        if target.key != Some(item.key) {
            log::debug!("{} rejected by box {:?}", item.key.shape(), target.key.map(ToyKind::shape));
            self.feedback.cue(Cue::Failure);
            return;
        }

        self.feedback.cue(Cue::Success);
        scene.remove(item.id);
        log::debug!("{} sorted, {} left", item.key.shape(), scene.children(self.toys_area).len());
        if scene.children(self.toys_area).is_empty() && !self.finished {
            self.finished = true;
            log::info!("all toys sorted");
            self.feedback.cue(Cue::Win);
            self.feedback.dialog(Dialog {
                emoji: "🏆",
                title: "Hore!",
                message: "Semua mainan sudah rapi!",
                button: "Main Lagi",
                action: DialogAction::ResetToys,
            });
        }
    }
}

pub struct ToysGame
{
    origin: Point,
    scene: Scene<ToyKind>,
    toys_area: ElementId,
    drag: DragDrop,
    rules: SortingRules,
}

impl ToysGame
{
    pub fn new(origin: Point, rng: &mut impl Rng) -> Self
    {
        let (scene, toys_area, boxes) = populate(origin, rng);
        Self {
            origin,
            scene,
            toys_area,
            drag: DragDrop::register(toys_area, boxes),
            rules: SortingRules {
                toys_area,
                finished: false,
                feedback: Feedback::default(),
            },
        }
    }

    /// Repopulates both areas with a fresh shuffle.
    pub fn reset(&mut self, rng: &mut impl Rng)
    {
        *self = Self::new(self.origin, rng);
    }

    pub fn handle_gesture(&mut self, source: InputSource, gesture: Gesture) -> GestureOutcome
    {
        self.drag.handle(&mut self.scene, source, gesture, &mut self.rules)
    }

    pub fn scene(&self) -> &Scene<ToyKind>
    {
        &self.scene
    }

    pub fn drag(&self) -> &DragDrop
    {
        &self.drag
    }

    /// Drops a drag whose release never arrived.
    pub fn cancel_drag(&mut self)
    {
        self.drag.cancel(&mut self.scene);
    }

    /// Toys still waiting in the source area.
    pub fn remaining(&self) -> Vec<(ElementId, ToyKind)>
    {
        self.scene
            .children(self.toys_area)
            .iter()
            .filter_map(|&id| Some((id, self.scene.get(id)?.key?)))
            .collect()
    }

    pub fn is_complete(&self) -> bool
    {
        self.scene.children(self.toys_area).is_empty()
    }

    pub fn take_feedback(&mut self) -> Feedback
    {
        std::mem::take(&mut self.rules.feedback)
    }
}

fn populate(origin: Point, rng: &mut impl Rng) -> (Scene<ToyKind>, ElementId, Vec<ElementId>)
{
    let mut toys: Vec<ToyKind> = ToyKind::ALL
        .iter()
        .copied()
        .cycle()
        .take(ToyKind::ALL.len() * COPIES_PER_KIND)
        .collect();
    toys.shuffle(rng);

    let mut scene = Scene::new();
    let root = scene.root();
    let toys_width = toys.len() as i32 * (TOY_WIDTH + GAP) + GAP + 1;
    let toys_area = scene.insert(
        root,
        Element::area(Rect::new(origin.x, origin.y, toys_width, TOY_HEIGHT + 2), "Mainan"),
    );
    for (idx, kind) in toys.iter().enumerate() {
        let rect = Rect::new(
            origin.x + 1 + GAP + idx as i32 * (TOY_WIDTH + GAP),
            origin.y + 1,
            TOY_WIDTH,
            TOY_HEIGHT,
        );
        scene.insert(toys_area, Element::item(rect, kind.emoji(), *kind));
    }

    let boxes_y = origin.y + TOY_HEIGHT + 3;
    let boxes_width = ToyKind::ALL.len() as i32 * (BOX_WIDTH + GAP) + GAP + 1;
    let boxes_area = scene.insert(
        root,
        Element::area(Rect::new(origin.x, boxes_y, boxes_width, BOX_HEIGHT + 2), "Kotak"),
    );
    let boxes = ToyKind::ALL
        .iter()
        .enumerate()
        .map(|(idx, kind)| {
            let rect = Rect::new(
                origin.x + 1 + GAP + idx as i32 * (BOX_WIDTH + GAP),
                boxes_y + 1,
                BOX_WIDTH,
                BOX_HEIGHT,
            );
            let label = format!("{}\nKotak {}", kind.box_emoji(), kind.shape());
            scene.insert(boxes_area, Element::target(rect, label, Some(*kind)))
        })
        .collect();

    (scene, toys_area, boxes)
}
