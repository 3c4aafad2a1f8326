//! Drag input unifier.
//!
//! Pointer drags and touch drags behave differently on screen but both end in
//! the same report: "item X was released over target Y". [`DragDrop`] tracks
//! the single active gesture, does the visual bookkeeping for each input style
//! and calls a [`DropHandler`] once the release resolves to a registered
//! destination. It knows nothing about game rules.

use crate::scene::{DIMMED_OPACITY, ElementId, Point, Rect, Scene};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource
{
    /// Mouse-style drag: the item is hidden while it travels.
    Pointer,
    /// Touch-style drag: a proxy follows the finger and the item is dimmed.
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture
{
    Start(Point),
    Move(Point),
    End(Point),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DraggableItem<K>
{
    pub id: ElementId,
    pub key: K,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DropTarget<K>
{
    pub id: ElementId,
    /// Accepted category, if the target has one.
    pub key: Option<K>,
}

pub trait DropHandler<K>
{
    fn on_drop(&mut self, scene: &mut Scene<K>, item: DraggableItem<K>, target: DropTarget<K>);
}

impl<K, F> DropHandler<K> for F
where
    F: FnMut(&mut Scene<K>, DraggableItem<K>, DropTarget<K>),
{
    fn on_drop(&mut self, scene: &mut Scene<K>, item: DraggableItem<K>, target: DropTarget<K>)
    {
        (self)(scene, item, target)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureOutcome
{
    /// Nothing happened; the event did not belong to a drag.
    Ignored,
    Started(ElementId),
    /// The drag moved. The host must cancel its own scroll/pan handling when
    /// `suppress_default` is set.
    Moved
    {
        suppress_default: bool,
    },
    Dropped
    {
        item: ElementId,
        target: ElementId,
    },
    /// The drag ended away from every destination.
    Aborted(ElementId),
}

struct DragSession
{
    source: InputSource,
    item: ElementId,
    proxy: Option<ElementId>,
    was_visible: bool,
    opacity_before: f32,
    last_position: Point,
}

pub struct DragDrop
{
    source_area: ElementId,
    destinations: Vec<ElementId>,
    session: Option<DragSession>,
}

impl DragDrop
{
    /// Items inside `source_area` become draggable onto any of `destinations`.
    pub fn register(source_area: ElementId, destinations: impl IntoIterator<Item = ElementId>) -> Self
    {
        Self {
            source_area,
            destinations: destinations.into_iter().collect(),
            session: None,
        }
    }

    pub fn is_dragging(&self) -> bool
    {
        self.session.is_some()
    }

    pub fn current_item(&self) -> Option<ElementId>
    {
        self.session.as_ref().map(|session| session.item)
    }

    pub fn proxy(&self) -> Option<ElementId>
    {
        self.session.as_ref().and_then(|session| session.proxy)
    }

    pub fn last_position(&self) -> Option<Point>
    {
        self.session.as_ref().map(|session| session.last_position)
    }

    pub fn handle<K, H>(
        &mut self,
        scene: &mut Scene<K>,
        source: InputSource,
        gesture: Gesture,
        handler: &mut H,
    ) -> GestureOutcome
    where
        K: Clone,
        H: DropHandler<K> + ?Sized,
    {
        match gesture {
            Gesture::Start(point) => self.start(scene, source, point),
            Gesture::Move(point) => self.track(scene, source, point),
            Gesture::End(point) => self.finish(scene, source, point, handler),
        }
    }

    /// Ends the active session without a drop, putting the item back as it
    /// was. Returns the item that was being dragged.
    pub fn cancel<K: Clone>(&mut self, scene: &mut Scene<K>) -> Option<ElementId>
    {
        let session = self.session.take()?;
        if let Some(proxy) = session.proxy {
            scene.remove(proxy);
        }
        restore(scene, &session);
        log::debug!("drag of {:?} cancelled", session.item);
        Some(session.item)
    }

    fn start<K: Clone>(&mut self, scene: &mut Scene<K>, source: InputSource, point: Point) -> GestureOutcome
    {
        if self.session.is_some() {
            return GestureOutcome::Ignored;
        }
        let Some(item) = self.draggable_at(scene, point) else {
            return GestureOutcome::Ignored;
        };
        let Some(element) = scene.get(item) else {
            return GestureOutcome::Ignored;
        };
        let was_visible = element.visible;
        let opacity_before = element.opacity;
        let size = (element.rect.width, element.rect.height);

        let proxy = match source {
            InputSource::Pointer => {
                if let Some(element) = scene.get_mut(item) {
                    element.visible = false;
                }
                None
            }
            InputSource::Touch => {
                let rect = Rect::centered_on(point, size.0, size.1);
                let proxy = scene.spawn_proxy(item, rect);
                if let Some(element) = scene.get_mut(item) {
                    element.opacity = DIMMED_OPACITY;
                }
                proxy
            }
        };

        log::debug!("drag started on {item:?} via {source:?}");
        self.session = Some(DragSession {
            source,
            item,
            proxy,
            was_visible,
            opacity_before,
            last_position: point,
        });
        GestureOutcome::Started(item)
    }

    fn track<K: Clone>(&mut self, scene: &mut Scene<K>, source: InputSource, point: Point) -> GestureOutcome
    {
        let Some(session) = self.session.as_mut().filter(|session| session.source == source) else {
            return GestureOutcome::Ignored;
        };
        session.last_position = point;

        match session.proxy {
            Some(proxy) => {
                if let Some(element) = scene.get_mut(proxy) {
                    let rect = element.rect;
                    element.rect = Rect::centered_on(point, rect.width, rect.height);
                }
                GestureOutcome::Moved {
                    suppress_default: true,
                }
            }
            None => GestureOutcome::Moved {
                suppress_default: false,
            },
        }
    }

    fn finish<K, H>(
        &mut self,
        scene: &mut Scene<K>,
        source: InputSource,
        point: Point,
        handler: &mut H,
    ) -> GestureOutcome
    where
        K: Clone,
        H: DropHandler<K> + ?Sized,
    {
        if self.session.as_ref().is_none_or(|session| session.source != source) {
            return GestureOutcome::Ignored;
        }
        let Some(session) = self.session.take() else {
            return GestureOutcome::Ignored;
        };

        if let Some(proxy) = session.proxy {
            if let Some(element) = scene.get_mut(proxy) {
                element.visible = false;
            }
        }
        let target = self.destination_at(scene, point);
        if let Some(proxy) = session.proxy {
            scene.remove(proxy);
        }

        // Visuals are restored before the handler runs so its changes stick.
        let key = restore(scene, &session);

        match (target, key) {
            (Some(target), Some(key)) => {
                log::debug!("{:?} dropped on {target:?}", session.item);
                let target_key = scene.get(target).and_then(|element| element.key.clone());
                handler.on_drop(
                    scene,
                    DraggableItem {
                        id: session.item,
                        key,
                    },
                    DropTarget {
                        id: target,
                        key: target_key,
                    },
                );
                GestureOutcome::Dropped {
                    item: session.item,
                    target,
                }
            }
            _ => {
                log::debug!("drag of {:?} ended without a destination", session.item);
                GestureOutcome::Aborted(session.item)
            }
        }
    }

    fn draggable_at<K: Clone>(&self, scene: &Scene<K>, point: Point) -> Option<ElementId>
    {
        let hit = scene.hit_test(point)?;
        let element = scene.get(hit)?;
        let eligible = element.draggable
            && element.key.is_some()
            && scene.is_inside(hit, self.source_area);
        eligible.then_some(hit)
    }

    /// Walks up from the element under `point` to the nearest registered
    /// destination.
    fn destination_at<K: Clone>(&self, scene: &Scene<K>, point: Point) -> Option<ElementId>
    {
        let hit = scene.hit_test(point)?;
        scene
            .containment_chain(hit)
            .find(|id| self.destinations.contains(id))
    }
}

/// Puts the dragged item's visibility and opacity back and returns its key.
fn restore<K: Clone>(scene: &mut Scene<K>, session: &DragSession) -> Option<K>
{
    let element = scene.get_mut(session.item)?;
    element.visible = session.was_visible;
    element.opacity = session.opacity_before;
    element.key.clone()
}
