//! Element tree the games render into and read gestures from.
//!
//! Every on-screen thing (play areas, draggable items, drop targets, labels and
//! touch proxies) is an [`Element`] stored in a slot map and linked to its
//! parent. Children are kept in paint order: the last child is drawn last and
//! is therefore the topmost one for hit testing.

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Identifies an element inside a [`Scene`].
    pub struct ElementId;
}

pub const FULL_OPACITY: f32 = 1.0;
pub const DIMMED_OPACITY: f32 = 0.5;

/// A terminal cell coordinate. Signed so proxies may hang off the screen edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point
{
    pub x: i32,
    pub y: i32,
}

impl Point
{
    pub fn new(x: i32, y: i32) -> Self
    {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect
{
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect
{
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self
    {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle of the given size whose center cell is `center`.
    pub fn centered_on(center: Point, width: i32, height: i32) -> Self
    {
        Self::new(center.x - width / 2, center.y - height / 2, width, height)
    }

    pub fn contains(&self, point: Point) -> bool
    {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    #[cfg(test)]
    pub fn center(&self) -> Point
    {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Text treatment for an element's label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Emphasis
{
    #[default]
    Normal,
    Bold,
    CrossedOut,
}

#[derive(Clone, Debug)]
pub struct Element<K>
{
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    pub rect: Rect,
    /// May span several lines separated by `\n`.
    pub label: String,
    pub framed: bool,
    /// Label sits on the top border instead of in the middle.
    titled: bool,
    pub visible: bool,
    pub opacity: f32,
    pub emphasis: Emphasis,
    pub draggable: bool,
    /// Category carried by items and targets.
    pub key: Option<K>,
    proxy: bool,
}

impl<K> Element<K>
{
    fn bare(rect: Rect, label: impl Into<String>) -> Self
    {
        Self {
            parent: None,
            children: Vec::new(),
            rect,
            label: label.into(),
            framed: false,
            titled: false,
            visible: true,
            opacity: FULL_OPACITY,
            emphasis: Emphasis::Normal,
            draggable: false,
            key: None,
            proxy: false,
        }
    }

    /// A framed container such as a play area.
    pub fn area(rect: Rect, title: impl Into<String>) -> Self
    {
        Self {
            framed: true,
            titled: true,
            ..Self::bare(rect, title)
        }
    }

    /// Plain text without a frame.
    pub fn text(rect: Rect, label: impl Into<String>) -> Self
    {
        Self::bare(rect, label)
    }

    pub fn item(rect: Rect, label: impl Into<String>, key: K) -> Self
    {
        Self {
            framed: true,
            draggable: true,
            key: Some(key),
            ..Self::bare(rect, label)
        }
    }

    pub fn target(rect: Rect, label: impl Into<String>, key: Option<K>) -> Self
    {
        Self {
            framed: true,
            key,
            ..Self::bare(rect, label)
        }
    }

    /// A clickable control carrying `key`, never draggable.
    pub fn button(rect: Rect, label: impl Into<String>, key: K) -> Self
    {
        Self {
            framed: true,
            key: Some(key),
            ..Self::bare(rect, label)
        }
    }

    pub fn is_titled(&self) -> bool
    {
        self.titled
    }

    pub fn is_proxy(&self) -> bool
    {
        self.proxy
    }

    pub fn is_dimmed(&self) -> bool
    {
        self.opacity < FULL_OPACITY
    }
}

pub struct Scene<K>
{
    root: ElementId,
    elements: SlotMap<ElementId, Element<K>>,
}

impl<K: Clone> Scene<K>
{
    pub fn new() -> Self
    {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(Element::bare(Rect::default(), ""));
        Self { root, elements }
    }

    pub fn root(&self) -> ElementId
    {
        self.root
    }

    pub fn get(&self, id: ElementId) -> Option<&Element<K>>
    {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element<K>>
    {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: ElementId) -> bool
    {
        self.elements.contains_key(id)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId]
    {
        self.elements
            .get(id)
            .map(|element| element.children.as_slice())
            .unwrap_or(&[])
    }

    /// Attaches `element` as the topmost child of `parent` (the root when
    /// `parent` no longer exists).
    pub fn insert(&mut self, parent: ElementId, mut element: Element<K>) -> ElementId
    {
        let parent = if self.contains(parent) {
            parent
        } else {
            self.root
        };
        element.parent = Some(parent);
        element.children.clear();
        let id = self.elements.insert(element);
        if let Some(parent_element) = self.elements.get_mut(parent) {
            parent_element.children.push(id);
        }
        id
    }

    /// Removes `id` and its whole subtree. The root cannot be removed.
    pub fn remove(&mut self, id: ElementId) -> bool
    {
        if id == self.root || !self.contains(id) {
            return false;
        }
        if let Some(parent_id) = self.elements.get(id).and_then(|element| element.parent) {
            if let Some(parent) = self.elements.get_mut(parent_id) {
                parent.children.retain(|&child| child != id);
            }
        }

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(element) = self.elements.remove(next) {
                pending.extend(element.children);
            }
        }
        true
    }

    /// Copies the look of `id` into a new proxy element on top of everything.
    pub fn spawn_proxy(&mut self, id: ElementId, rect: Rect) -> Option<ElementId>
    {
        let source = self.elements.get(id)?;
        let proxy = Element {
            framed: source.framed,
            key: source.key.clone(),
            emphasis: source.emphasis,
            proxy: true,
            ..Element::bare(rect, source.label.clone())
        };
        let root = self.root;
        Some(self.insert(root, proxy))
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn containment_chain(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_
    {
        let mut current = self.contains(id).then_some(id);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.elements.get(id).and_then(|element| element.parent);
            Some(id)
        })
    }

    /// True when `ancestor` is a strict ancestor of `id`.
    pub fn is_inside(&self, id: ElementId, ancestor: ElementId) -> bool
    {
        id != ancestor && self.containment_chain(id).any(|step| step == ancestor)
    }

    /// The topmost visible element under `point`, ignoring drag proxies and the
    /// root. Hidden elements hide their whole subtree.
    pub fn hit_test(&self, point: Point) -> Option<ElementId>
    {
        self.hit_children(self.root, point)
    }

    fn hit_children(&self, id: ElementId, point: Point) -> Option<ElementId>
    {
        for &child in self.children(id).iter().rev() {
            let Some(element) = self.elements.get(child) else {
                continue;
            };
            if !element.visible || element.is_proxy() {
                continue;
            }
            if let Some(hit) = self.hit_children(child, point) {
                return Some(hit);
            }
            if element.rect.contains(point) {
                return Some(child);
            }
        }
        None
    }

    /// Visible elements in paint order (parents before children, bottom to top).
    pub fn paint_order(&self) -> Vec<ElementId>
    {
        let mut order = Vec::new();
        let mut stack: Vec<ElementId> = self.children(self.root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            if !element.visible {
                continue;
            }
            order.push(id);
            stack.extend(element.children.iter().rev().copied());
        }
        order
    }
}

impl<K: Clone> Default for Scene<K>
{
    fn default() -> Self
    {
        Self::new()
    }
}
