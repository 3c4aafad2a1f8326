use crate::dragdrop::{DragDrop, DraggableItem, DropHandler, DropTarget, Gesture, GestureOutcome, InputSource};
use crate::games::Feedback;
use crate::modal::{Dialog, DialogAction};
use crate::scene::{DIMMED_OPACITY, Element, ElementId, Emphasis, FULL_OPACITY, Point, Rect, Scene};
use crate::sound::Cue;
use rand::Rng;
use rand::seq::SliceRandom;

const INGREDIENT_WIDTH: i32 = 7;
const INGREDIENT_HEIGHT: i32 = 3;
const STEPS_WIDTH: i32 = 22;
const CAULDRON_WIDTH: i32 = 12;
const CAULDRON_HEIGHT: i32 = 5;
const EMPTY_CAULDRON: &str = "🥣";
const FULL_CAULDRON: &str = "✨";
const CAKE: &str = "🎂";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ingredient
{
    Flour,
    Egg,
    Sugar,
    Milk,
}

impl Ingredient
{
    pub fn name(self) -> &'static str
    {
        match self {
            Ingredient::Flour => "Tepung",
            Ingredient::Egg => "Telur",
            Ingredient::Sugar => "Gula",
            Ingredient::Milk => "Susu",
        }
    }

    pub fn emoji(self) -> &'static str
    {
        match self {
            Ingredient::Flour => "🍚",
            Ingredient::Egg => "🥚",
            Ingredient::Sugar => "🍬",
            Ingredient::Milk => "🥛",
        }
    }
}

/// Ingredients in the order they go into the cauldron.
pub const RECIPE: [Ingredient; 4] = [Ingredient::Flour, Ingredient::Egg, Ingredient::Sugar, Ingredient::Milk];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus
{
    Done,
    Current,
    Pending,
}

pub fn step_status(index: usize, cursor: usize) -> StepStatus
{
    if index < cursor {
        StepStatus::Done
    } else if index == cursor {
        StepStatus::Current
    } else {
        StepStatus::Pending
    }
}

struct RecipeRules
{
    cursor: usize,
    steps: Vec<ElementId>,
    cauldron: ElementId,
    cake: ElementId,
    feedback: Feedback,
}

impl RecipeRules
{
    fn refresh_steps(&self, scene: &mut Scene<Ingredient>)
    {
        for (idx, &id) in self.steps.iter().enumerate() {
            if let Some(element) = scene.get_mut(id) {
                element.emphasis = match step_status(idx, self.cursor) {
                    StepStatus::Done => Emphasis::CrossedOut,
                    StepStatus::Current => Emphasis::Bold,
                    StepStatus::Pending => Emphasis::Normal,
                };
                element.opacity = if idx < self.cursor { DIMMED_OPACITY } else { FULL_OPACITY };
            }
        }
    }
}

impl DropHandler<Ingredient> for RecipeRules
{
    fn on_drop(&mut self, scene: &mut Scene<Ingredient>, item: DraggableItem<Ingredient>, _target: DropTarget<Ingredient>)
    {
        let Some(&expected) = RECIPE.get(self.cursor) else {
            return;
        };
        if item.key != expected {
            log::debug!("wrong ingredient {}, expected {}", item.key.name(), expected.name());
            self.feedback.cue(Cue::Failure);
            self.feedback.dialog(Dialog {
                emoji: "🤨",
                title: "Hmm...",
                message: "Bukan bahan yang benar. Coba lihat resepnya!",
                button: "Oke",
                action: DialogAction::None,
            });
            return;
        }

        self.feedback.cue(Cue::Success);
        self.cursor += 1;
        if let Some(element) = scene.get_mut(item.id) {
            element.draggable = false;
            element.opacity = DIMMED_OPACITY;
        }
        self.refresh_steps(scene);
        log::debug!("{} added, step {}/{}", item.key.name(), self.cursor, RECIPE.len());

        if self.cursor == RECIPE.len() {
            log::info!("recipe complete");
            self.feedback.cue(Cue::Win);
            if let Some(element) = scene.get_mut(self.cauldron) {
                element.label = FULL_CAULDRON.to_string();
            }
            if let Some(element) = scene.get_mut(self.cake) {
                element.label = CAKE.to_string();
            }
            self.feedback.dialog(Dialog {
                emoji: "🎂",
                title: "Yummy!",
                message: "Kue ajaib berhasil dibuat!",
                button: "Buat Lagi",
                action: DialogAction::ResetRecipe,
            });
        }
    }
}

pub struct RecipeGame
{
    origin: Point,
    scene: Scene<Ingredient>,
    drag: DragDrop,
    rules: RecipeRules,
}

impl RecipeGame
{
    pub fn new(origin: Point, rng: &mut impl Rng) -> Self
    {
        let mut ingredients = RECIPE.to_vec();
        ingredients.shuffle(rng);

        let mut scene = Scene::new();
        let root = scene.root();

        let steps_rect = Rect::new(origin.x, origin.y, STEPS_WIDTH, RECIPE.len() as i32 + 2);
        let steps_area = scene.insert(root, Element::area(steps_rect, "Resep"));
        let steps = RECIPE
            .iter()
            .enumerate()
            .map(|(idx, ingredient)| {
                let rect = Rect::new(origin.x + 2, origin.y + 1 + idx as i32, STEPS_WIDTH - 4, 1);
                scene.insert(steps_area, Element::text(rect, format!("Masukkan {}", ingredient.name())))
            })
            .collect();

        let cauldron_x = origin.x + STEPS_WIDTH + 3;
        let cauldron = scene.insert(
            root,
            Element::target(
                Rect::new(cauldron_x, origin.y, CAULDRON_WIDTH, CAULDRON_HEIGHT),
                EMPTY_CAULDRON,
                None,
            ),
        );
        let cake = scene.insert(
            root,
            Element::text(
                Rect::new(cauldron_x + CAULDRON_WIDTH + 2, origin.y + CAULDRON_HEIGHT / 2, 4, 1),
                "",
            ),
        );

        let area_y = origin.y + steps_rect.height.max(CAULDRON_HEIGHT) + 1;
        let area_width = RECIPE.len() as i32 * (INGREDIENT_WIDTH + 1) + 3;
        let ingredients_area = scene.insert(
            root,
            Element::area(Rect::new(origin.x, area_y, area_width, INGREDIENT_HEIGHT + 2), "Bahan"),
        );
        for (idx, ingredient) in ingredients.iter().enumerate() {
            let rect = Rect::new(
                origin.x + 2 + idx as i32 * (INGREDIENT_WIDTH + 1),
                area_y + 1,
                INGREDIENT_WIDTH,
                INGREDIENT_HEIGHT,
            );
            scene.insert(ingredients_area, Element::item(rect, ingredient.emoji(), *ingredient));
        }

        let rules = RecipeRules {
            cursor: 0,
            steps,
            cauldron,
            cake,
            feedback: Feedback::default(),
        };
        rules.refresh_steps(&mut scene);

        Self {
            origin,
            scene,
            drag: DragDrop::register(ingredients_area, [cauldron]),
            rules,
        }
    }

    pub fn reset(&mut self, rng: &mut impl Rng)
    {
        *self = Self::new(self.origin, rng);
    }

    pub fn handle_gesture(&mut self, source: InputSource, gesture: Gesture) -> GestureOutcome
    {
        self.drag.handle(&mut self.scene, source, gesture, &mut self.rules)
    }

    pub fn scene(&self) -> &Scene<Ingredient>
    {
        &self.scene
    }

    pub fn drag(&self) -> &DragDrop
    {
        &self.drag
    }

    pub fn cursor(&self) -> usize
    {
        self.rules.cursor
    }

    pub fn is_complete(&self) -> bool
    {
        self.rules.cursor == RECIPE.len()
    }

    /// Drops a drag whose release never arrived.
    pub fn cancel_drag(&mut self)
    {
        self.drag.cancel(&mut self.scene);
    }

    #[cfg(test)]
    pub fn cauldron(&self) -> ElementId
    {
        self.rules.cauldron
    }

    /// The visible element carrying `ingredient`, excluding drag proxies.
    #[cfg(test)]
    pub fn ingredient(&self, ingredient: Ingredient) -> Option<ElementId>
    {
        self.scene.paint_order().into_iter().find(|&id| {
            self.scene
                .get(id)
                .is_some_and(|element| !element.is_proxy() && element.key == Some(ingredient))
        })
    }

    pub fn take_feedback(&mut self) -> Feedback
    {
        std::mem::take(&mut self.rules.feedback)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn game() -> RecipeGame
    {
        RecipeGame::new(Point::new(0, 2), &mut StdRng::seed_from_u64(5))
    }

    fn drop_in(game: &mut RecipeGame, ingredient: Ingredient, source: InputSource) -> GestureOutcome
    {
        let item = game.ingredient(ingredient).unwrap();
        let from = game.scene().get(item).unwrap().rect.center();
        let to = game.scene().get(game.cauldron()).unwrap().rect.center();
        game.handle_gesture(source, Gesture::Start(from));
        game.handle_gesture(source, Gesture::Move(to));
        game.handle_gesture(source, Gesture::End(to))
    }

    #[test]
    fn source_holds_every_ingredient_once()
    {
        let game = game();
        for ingredient in RECIPE {
            assert!(game.ingredient(ingredient).is_some());
        }
        assert_eq!(game.cursor(), 0);
        assert_eq!(game.scene().get(game.cauldron()).unwrap().label, EMPTY_CAULDRON);
    }

    #[test]
    fn step_status_tracks_cursor()
    {
        assert_eq!(step_status(0, 1), StepStatus::Done);
        assert_eq!(step_status(1, 1), StepStatus::Current);
        assert_eq!(step_status(3, 1), StepStatus::Pending);
    }

    #[test]
    fn correct_ingredient_advances_and_locks_item()
    {
        let mut game = game();
        let outcome = drop_in(&mut game, Ingredient::Flour, InputSource::Touch);
        assert!(matches!(outcome, GestureOutcome::Dropped { .. }));
        assert_eq!(game.cursor(), 1);

        let flour = game.ingredient(Ingredient::Flour).unwrap();
        let element = game.scene().get(flour).unwrap();
        assert!(!element.draggable);
        assert_eq!(element.opacity, DIMMED_OPACITY);
        assert_eq!(game.take_feedback().cues, vec![Cue::Success]);

        let again = drop_in(&mut game, Ingredient::Flour, InputSource::Touch);
        assert_eq!(again, GestureOutcome::Ignored);
        assert_eq!(game.cursor(), 1);
    }

    #[test]
    fn wrong_ingredient_keeps_cursor_and_explains()
    {
        let mut game = game();
        drop_in(&mut game, Ingredient::Flour, InputSource::Pointer);
        game.take_feedback();

        drop_in(&mut game, Ingredient::Milk, InputSource::Pointer);
        assert_eq!(game.cursor(), 1);
        let milk = game.ingredient(Ingredient::Milk).unwrap();
        assert!(game.scene().get(milk).unwrap().draggable);
        assert!(game.scene().get(milk).unwrap().visible);

        let feedback = game.take_feedback();
        assert_eq!(feedback.cues, vec![Cue::Failure]);
        let dialog = feedback.dialog.unwrap();
        assert_eq!(dialog.title, "Hmm...");
        assert_eq!(dialog.action, DialogAction::None);
    }

    #[test]
    fn full_recipe_completes_exactly_once()
    {
        let mut game = game();
        for (idx, ingredient) in RECIPE.iter().enumerate() {
            drop_in(&mut game, *ingredient, InputSource::Touch);
            assert_eq!(game.cursor(), idx + 1);
        }
        assert!(game.is_complete());
        assert_eq!(game.scene().get(game.cauldron()).unwrap().label, FULL_CAULDRON);

        let feedback = game.take_feedback();
        assert_eq!(feedback.cues.iter().filter(|cue| **cue == Cue::Win).count(), 1);
        assert_eq!(feedback.dialog.map(|dialog| dialog.action), Some(DialogAction::ResetRecipe));

        for ingredient in RECIPE {
            assert_eq!(drop_in(&mut game, ingredient, InputSource::Pointer), GestureOutcome::Ignored);
        }
        assert!(game.take_feedback().is_empty());
        assert_eq!(game.cursor(), RECIPE.len());
    }

    #[test]
    fn steps_are_emphasised_by_progress()
    {
        let mut game = game();
        drop_in(&mut game, Ingredient::Flour, InputSource::Touch);
        let emphasis: Vec<_> = game
            .rules
            .steps
            .iter()
            .map(|id| game.scene().get(*id).unwrap().emphasis)
            .collect();
        assert_eq!(
            emphasis,
            vec![Emphasis::CrossedOut, Emphasis::Bold, Emphasis::Normal, Emphasis::Normal]
        );
    }

    #[test]
    fn reset_clears_progress()
    {
        let mut game = game();
        drop_in(&mut game, Ingredient::Flour, InputSource::Touch);
        drop_in(&mut game, Ingredient::Egg, InputSource::Touch);
        game.reset(&mut StdRng::seed_from_u64(9));

        assert_eq!(game.cursor(), 0);
        assert!(game.take_feedback().is_empty());
        for ingredient in RECIPE {
            let id = game.ingredient(ingredient).unwrap();
            assert!(game.scene().get(id).unwrap().draggable);
        }
        assert_eq!(game.scene().get(game.rules.cake).unwrap().label, "");
    }
}
